//! Terminate Module
//!
//! Closing windows: the polite WM_DELETE_WINDOW request, the forced
//! client kill, and the combination that falls back from one to the
//! other.

use tracing::{info, warn};

use crate::wm::client::WindowHandle;
use crate::wm::protocol::{ProtocolResult, WindowSystem};

/// What a close attempt ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Delete request delivered; the client decides when to go.
    Requested,
    /// The window does not support polite close and nothing was done.
    Unsupported,
    Killed,
}

/// Ask `window` to close. Report-only if it does not support it.
pub fn request_close<W: WindowSystem>(ws: &mut W, window: WindowHandle) -> ProtocolResult<CloseOutcome> {
    if ws.send_close_request(window)? {
        info!("Sent delete request to {}", window);
        Ok(CloseOutcome::Requested)
    } else {
        warn!("Window {} does not support WM_DELETE_WINDOW", window);
        Ok(CloseOutcome::Unsupported)
    }
}

/// Kill the client owning `window`, whatever it supports.
pub fn force_kill<W: WindowSystem>(ws: &mut W, window: WindowHandle) -> ProtocolResult<CloseOutcome> {
    info!("Killing client of {}", window);
    ws.force_terminate(window)?;
    Ok(CloseOutcome::Killed)
}

/// Polite close where supported, forced kill otherwise.
pub fn close_or_kill<W: WindowSystem>(ws: &mut W, window: WindowHandle) -> ProtocolResult<CloseOutcome> {
    if ws.send_close_request(window)? {
        info!("Sent delete request to {}", window);
        return Ok(CloseOutcome::Requested);
    }
    force_kill(ws, window)
}
