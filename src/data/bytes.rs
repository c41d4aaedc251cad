//! Human-readable byte sizes for memory titles.

const UNITS: &[(&str, u64)] = &[
    ("GB", 1 << 30),
    ("MB", 1 << 20),
    ("KB", 1 << 10),
];

/// Format a byte count for display: `"512 B"`, `"1.50 KB"`, `"4.00 GB"`.
pub fn format_size(bytes: u64) -> String {
    for (unit, scale) in UNITS {
        if bytes >= *scale {
            return format!("{:.2} {}", bytes as f64 / *scale as f64, unit);
        }
    }
    format!("{} B", bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
    }

    #[test]
    fn test_kilobytes() {
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
    }

    #[test]
    fn test_megabytes() {
        assert_eq!(format_size(52_428_800), "50.00 MB");
    }

    #[test]
    fn test_gigabytes() {
        assert_eq!(format_size(4_294_967_296), "4.00 GB");
    }
}
