//! Interaction sessions
//!
//! Every message that currently offers a selector has a session. Sessions are
//! opened when a selector is rendered and torn down as soon as the message
//! reaches a terminal state, so abandoned selectors don't accumulate.

use crate::chat::{MessageId, UserId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Lifecycle state of a rendered message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// A selector is shown and waits for input
    AwaitingSelection,
    /// An item without children was rendered
    Resolved,
    /// The user pressed cancel
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionState::AwaitingSelection)
    }
}

/// The interaction state of one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionSession {
    pub message: MessageId,
    /// Suffix of the component custom ids on the message
    pub correlation: String,
    /// The user whose command or selection rendered the current selector
    pub requester: UserId,
    pub state: SessionState,
}

/// Sessions keyed by message id
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<MessageId, InteractionSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `message` into `AwaitingSelection`
    ///
    /// An existing session for the message is replaced, which is how a
    /// resolved show re-enters selection with its season selector.
    pub fn open(&self, message: MessageId, correlation: &str, requester: UserId) {
        tracing::debug!(message = %message, correlation, "awaiting selection");

        self.lock().insert(
            message.clone(),
            InteractionSession {
                message,
                correlation: correlation.to_string(),
                requester,
                state: SessionState::AwaitingSelection,
            },
        );
    }

    /// Tears down the session of `message` with a terminal `state`
    ///
    /// Returns the closed session, if there was one.
    pub fn finish(&self, message: &MessageId, state: SessionState) -> Option<InteractionSession> {
        debug_assert!(state.is_terminal());

        let closed = self.lock().remove(message).map(|mut session| {
            session.state = state;
            session
        });

        if closed.is_some() {
            tracing::debug!(message = %message, ?state, "session closed");
        }
        closed
    }

    pub fn get(&self, message: &MessageId) -> Option<InteractionSession> {
        self.lock().get(message).cloned()
    }

    /// Whether `message` has a selector waiting for input
    pub fn is_awaiting(&self, message: &MessageId) -> bool {
        self.get(message)
            .is_some_and(|session| session.state == SessionState::AwaitingSelection)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MessageId, InteractionSession>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_finish() {
        let registry = SessionRegistry::new();
        let message = MessageId::from("m1");

        registry.open(message.clone(), "c1", UserId::from("u1"));
        assert!(registry.is_awaiting(&message));
        assert_eq!(registry.get(&message).unwrap().correlation, "c1");

        let closed = registry.finish(&message, SessionState::Cancelled).unwrap();
        assert_eq!(closed.state, SessionState::Cancelled);
        assert!(!registry.is_awaiting(&message));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_finish_without_session() {
        let registry = SessionRegistry::new();

        assert!(registry.finish(&MessageId::from("m1"), SessionState::Resolved).is_none());
    }

    #[test]
    fn test_reopen_replaces_session() {
        let registry = SessionRegistry::new();
        let message = MessageId::from("m1");

        registry.open(message.clone(), "command", UserId::from("u1"));
        registry.open(message.clone(), "m1", UserId::from("u2"));

        assert_eq!(registry.len(), 1);
        let session = registry.get(&message).unwrap();
        assert_eq!(session.correlation, "m1");
        assert_eq!(session.requester, UserId::from("u2"));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SessionState::AwaitingSelection.is_terminal());
        assert!(SessionState::Resolved.is_terminal());
        assert!(SessionState::Cancelled.is_terminal());
    }
}
