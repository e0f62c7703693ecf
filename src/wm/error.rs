//! Error taxonomy for requests issued through the display backend.

use thiserror::Error;
use x11rb::errors::{ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::x11_utils::X11Error;

use crate::wm::client::WindowHandle;

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The display connection is gone; nothing further can be done.
    #[error("display connection lost: {0}")]
    Disconnected(#[from] ConnectionError),

    #[error("ran out of X11 resource ids")]
    IdsExhausted,

    /// The server rejected a request.
    #[error("X11 request failed: {0:?}")]
    Server(X11Error),

    /// The window vanished between the notification and our request.
    #[error("window {0} no longer exists")]
    StaleWindow(WindowHandle),

    #[error("pointer grab refused: {0}")]
    PointerGrabRefused(String),
}

impl ProtocolError {
    /// Fatal errors end the dispatch loop; everything else is logged and
    /// absorbed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Disconnected(_) | Self::IdsExhausted)
    }

    /// Reinterpret a server error as the window having disappeared.
    pub fn for_window(self, handle: WindowHandle) -> Self {
        match self {
            Self::Server(_) => Self::StaleWindow(handle),
            other => other,
        }
    }
}

impl From<ReplyError> for ProtocolError {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::ConnectionError(e) => Self::Disconnected(e),
            ReplyError::X11Error(e) => Self::Server(e),
        }
    }
}

impl From<ReplyOrIdError> for ProtocolError {
    fn from(err: ReplyOrIdError) -> Self {
        match err {
            ReplyOrIdError::IdsExhausted => Self::IdsExhausted,
            ReplyOrIdError::ConnectionError(e) => Self::Disconnected(e),
            ReplyOrIdError::X11Error(e) => Self::Server(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_connection_level_errors_are_fatal() {
        assert!(ProtocolError::Disconnected(ConnectionError::UnknownError).is_fatal());
        assert!(ProtocolError::IdsExhausted.is_fatal());
        assert!(!ProtocolError::StaleWindow(WindowHandle::new(3)).is_fatal());
        assert!(!ProtocolError::PointerGrabRefused("frozen".into()).is_fatal());
    }

    #[test]
    fn test_for_window_keeps_connection_errors() {
        let err = ProtocolError::Disconnected(ConnectionError::UnknownError)
            .for_window(WindowHandle::new(3));
        assert!(err.is_fatal());
    }
}
