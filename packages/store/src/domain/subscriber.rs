//! Subscribers of the live stream.

use std::fmt;

use tokio::sync::mpsc;
use uuid::Uuid;

use super::error::TransitionError;

/// Outbound queue of one subscriber; drained by that subscriber's socket writer
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Unique identifier of a live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of a subscriber connection
///
/// ```text
/// Connecting ──► Open ──► Closing
///     │            │
///     └────────────┴────► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Upgrade in progress, not yet in the subscriber set
    Connecting,
    /// In the subscriber set, receiving pushes
    Open,
    /// Closed by the peer or by the server
    Closing,
    /// A push or the transport failed
    Failed,
}

impl ConnectionState {
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Connecting, Open) | (Connecting, Failed) | (Open, Closing) | (Open, Failed)
        )
    }

    pub fn transition(self, next: ConnectionState) -> Result<ConnectionState, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Closing | ConnectionState::Failed)
    }
}
