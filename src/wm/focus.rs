//! Focus Module
//!
//! Tracks the focused window and keeps borders and input focus in step
//! with it. At most one window is focused at a time.

use tracing::{debug, warn};

use crate::wm::client::WindowHandle;
use crate::wm::protocol::{ProtocolResult, WindowSystem};

/// Focus manager
#[derive(Debug, Default)]
pub struct FocusManager {
    focused: Option<WindowHandle>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<WindowHandle> {
        self.focused
    }

    /// Give `window` the focused border and input focus.
    ///
    /// The previous window's border is reset first. If that window has
    /// already vanished the reset is skipped and focusing continues.
    pub fn focus<W: WindowSystem>(&mut self, ws: &mut W, window: WindowHandle) -> ProtocolResult<()> {
        if let Some(previous) = self.focused.filter(|&p| p != window) {
            if let Err(e) = ws.set_border_color(previous, false) {
                if e.is_fatal() {
                    return Err(e);
                }
                warn!("Could not reset border of {}: {}", previous, e);
            }
        }

        debug!("Focusing window {}", window);
        // recorded before the requests: a stale window stays focused until
        // its destroy notification clears it
        self.focused = Some(window);
        ws.set_border_color(window, true)?;
        ws.set_input_focus(window)?;
        ws.publish_active(Some(window))
    }

    /// Forget `window` if it is the focused one. No requests are issued:
    /// the window no longer exists.
    pub fn clear_if(&mut self, window: WindowHandle) -> bool {
        if self.focused == Some(window) {
            self.focused = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::protocol::mock::{Call, MockWindowSystem};

    fn h(id: u32) -> WindowHandle {
        WindowHandle::new(id)
    }

    #[test]
    fn test_focus_unfocuses_previous_first() {
        let mut ws = MockWindowSystem::new();
        let mut focus = FocusManager::new();

        focus.focus(&mut ws, h(10)).unwrap();
        ws.take_calls();
        focus.focus(&mut ws, h(11)).unwrap();

        assert_eq!(
            ws.take_calls(),
            vec![
                Call::BorderColor(h(10), false),
                Call::BorderColor(h(11), true),
                Call::InputFocus(h(11)),
                Call::Active(Some(h(11))),
            ]
        );
        assert_eq!(focus.focused(), Some(h(11)));
    }

    #[test]
    fn test_refocus_same_window_keeps_border() {
        let mut ws = MockWindowSystem::new();
        let mut focus = FocusManager::new();

        focus.focus(&mut ws, h(10)).unwrap();
        focus.focus(&mut ws, h(10)).unwrap();

        assert_eq!(ws.count(&Call::BorderColor(h(10), false)), 0);
    }

    #[test]
    fn test_stale_previous_window_is_skipped() {
        let mut ws = MockWindowSystem::new();
        let mut focus = FocusManager::new();
        focus.focus(&mut ws, h(10)).unwrap();
        ws.stale.insert(h(10));

        focus.focus(&mut ws, h(11)).unwrap();

        assert_eq!(focus.focused(), Some(h(11)));
        assert_eq!(ws.count(&Call::InputFocus(h(11))), 1);
    }

    #[test]
    fn test_clear_if_only_matches_focused() {
        let mut ws = MockWindowSystem::new();
        let mut focus = FocusManager::new();
        focus.focus(&mut ws, h(10)).unwrap();

        assert!(!focus.clear_if(h(11)));
        assert_eq!(focus.focused(), Some(h(10)));
        assert!(focus.clear_if(h(10)));
        assert_eq!(focus.focused(), None);
    }
}
