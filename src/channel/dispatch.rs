//! Command dispatch with a bounded wait and the "already handled" contract.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::warn;

use super::{AgentCommand, CommandChannel};
use crate::store::AgentRef;

/// Outcome of one dispatch.
///
/// A timeout or transport failure is not an error the business logic can
/// recover from: by the time the dispatcher reports it, the boundary layer
/// has already produced the client-visible failure response. Callers must
/// treat [`Dispatch::AlreadyHandled`] as "stop now, emit nothing further".
/// Genuine caller-side failures (a payload that fails to parse, an
/// unsupported action) stay ordinary `Err` values, so the full call chain is
/// the tri-state `Result<Dispatch<T>, Error>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch<T> {
    /// The agent replied; the payload is yours to parse.
    Completed(T),
    /// The channel timed out or failed and the failure was already surfaced.
    AlreadyHandled,
}

impl<T> Dispatch<T> {
    /// Apply `f` to the payload of a completed dispatch.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Dispatch<U> {
        match self {
            Dispatch::Completed(value) => Dispatch::Completed(f(value)),
            Dispatch::AlreadyHandled => Dispatch::AlreadyHandled,
        }
    }

    /// Apply a fallible `f` to the payload of a completed dispatch.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Dispatch<U>, E> {
        match self {
            Dispatch::Completed(value) => Ok(Dispatch::Completed(f(value)?)),
            Dispatch::AlreadyHandled => Ok(Dispatch::AlreadyHandled),
        }
    }

    /// The payload, if the dispatch completed.
    pub fn completed(self) -> Option<T> {
        match self {
            Dispatch::Completed(value) => Some(value),
            Dispatch::AlreadyHandled => None,
        }
    }

    /// True when the failure was already surfaced to the caller.
    pub fn is_already_handled(&self) -> bool {
        matches!(self, Dispatch::AlreadyHandled)
    }
}

/// Wraps a [`CommandChannel`] with the uniform request/response contract:
/// send, wait up to the bound, and fold timeouts and transport failures into
/// [`Dispatch::AlreadyHandled`].
///
/// Commands with remote side effects (profiling, heap dumps) are never
/// retried here: a retry after a timeout could start the same session twice.
#[derive(Clone)]
pub struct Dispatcher {
    channel: Arc<dyn CommandChannel>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(channel: Arc<dyn CommandChannel>, timeout: Duration) -> Self {
        Self { channel, timeout }
    }

    /// One command/reply round trip to one agent.
    pub async fn dispatch(&self, agent: &AgentRef, command: AgentCommand) -> Dispatch<String> {
        match time::timeout(self.timeout, self.channel.send(agent, &command)).await {
            Ok(Ok(payload)) => Dispatch::Completed(payload),
            Ok(Err(err)) => {
                warn!(agent = %agent, command = command.name(), %err, "command channel failed");
                Dispatch::AlreadyHandled
            }
            Err(_) => {
                warn!(agent = %agent, command = command.name(), "command timed out");
                Dispatch::AlreadyHandled
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted channel for exercising the dispatcher.
    #[derive(Debug)]
    enum Behavior {
        Reply(&'static str),
        Fail,
        Hang,
    }

    #[derive(Debug)]
    struct ScriptedChannel {
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl ScriptedChannel {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CommandChannel for ScriptedChannel {
        async fn send(
            &self,
            _agent: &AgentRef,
            _command: &AgentCommand,
        ) -> crate::error::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Reply(payload) => Ok(payload.to_string()),
                Behavior::Fail => Err(Error::Channel("connection reset".to_string())),
                Behavior::Hang => std::future::pending().await,
            }
        }
    }

    fn agent() -> AgentRef {
        AgentRef::new("demo-app", "demo-agent")
    }

    #[tokio::test]
    async fn test_dispatch_completed() {
        let channel = ScriptedChannel::new(Behavior::Reply("pong"));
        let dispatcher = Dispatcher::new(channel.clone(), Duration::from_secs(1));

        let result = dispatcher
            .dispatch(&agent(), AgentCommand::ListNodeProcesses)
            .await;
        assert_eq!(result, Dispatch::Completed("pong".to_string()));
        assert_eq!(channel.calls(), 1);
    }

    #[tokio::test]
    async fn test_channel_failure_is_already_handled() {
        let channel = ScriptedChannel::new(Behavior::Fail);
        let dispatcher = Dispatcher::new(channel.clone(), Duration::from_secs(1));

        let result = dispatcher
            .dispatch(&agent(), AgentCommand::CheckProcessStatus { pid: 7 })
            .await;
        assert!(result.is_already_handled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_already_handled_without_retry() {
        let channel = ScriptedChannel::new(Behavior::Hang);
        let dispatcher = Dispatcher::new(channel.clone(), Duration::from_secs(15));

        let result = dispatcher
            .dispatch(&agent(), AgentCommand::HeapDump { pid: 7 })
            .await;
        assert!(result.is_already_handled());
        // The side-effecting command was sent exactly once.
        assert_eq!(channel.calls(), 1);
    }

    #[test]
    fn test_dispatch_map_and_try_map() {
        let completed = Dispatch::Completed("41");
        assert_eq!(
            completed.clone().map(|s| s.len()),
            Dispatch::Completed(2usize)
        );
        assert_eq!(
            completed.try_map(|s| s.parse::<u32>()).unwrap(),
            Dispatch::Completed(41)
        );

        let handled: Dispatch<&str> = Dispatch::AlreadyHandled;
        assert_eq!(handled.clone().map(|s| s.len()), Dispatch::AlreadyHandled);
        assert!(handled.completed().is_none());
    }
}
