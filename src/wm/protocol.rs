//! Display-server boundary.
//!
//! Everything the manager core asks of the display server goes through
//! [`WindowSystem`]. The x11rb backend lives in `display.rs`; tests drive
//! the core with the recording mock below.

use crate::shared::Geometry;
use crate::wm::client::WindowHandle;
use crate::wm::error::ProtocolError;
use crate::wm::events::{Notification, WindowChanges};

pub type ProtocolResult<T> = Result<T, ProtocolError>;

pub trait WindowSystem {
    fn root(&self) -> WindowHandle;

    /// Block until the server delivers something the core cares about.
    fn next_notification(&mut self) -> ProtocolResult<Notification>;

    /// Width and height of the managed screen.
    fn screen_size(&self) -> ProtocolResult<(u32, u32)>;

    /// Select structural and crossing events on a client window.
    fn subscribe(&mut self, window: WindowHandle) -> ProtocolResult<()>;

    fn map(&mut self, window: WindowHandle) -> ProtocolResult<()>;
    fn move_resize(&mut self, window: WindowHandle, geometry: Geometry) -> ProtocolResult<()>;
    fn move_to(&mut self, window: WindowHandle, x: i32, y: i32) -> ProtocolResult<()>;

    /// Apply a client's configure request as-is.
    fn configure(&mut self, window: WindowHandle, changes: &WindowChanges) -> ProtocolResult<()>;

    fn set_border_width(&mut self, window: WindowHandle, width: u32) -> ProtocolResult<()>;
    fn set_border_color(&mut self, window: WindowHandle, focused: bool) -> ProtocolResult<()>;
    fn set_input_focus(&mut self, window: WindowHandle) -> ProtocolResult<()>;

    /// Current on-screen origin of `window`.
    fn window_origin(&mut self, window: WindowHandle) -> ProtocolResult<(i32, i32)>;

    /// Exclusive pointer grab for button-release and motion events.
    fn grab_pointer(&mut self) -> ProtocolResult<()>;
    fn ungrab_pointer(&mut self) -> ProtocolResult<()>;

    /// Deliver a polite delete request.
    ///
    /// Returns `false` without sending anything if the window does not
    /// advertise support for it.
    fn send_close_request(&mut self, window: WindowHandle) -> ProtocolResult<bool>;
    fn force_terminate(&mut self, window: WindowHandle) -> ProtocolResult<()>;

    fn redraw_status(&mut self) -> ProtocolResult<()>;

    fn publish_client_list(&mut self, windows: &[WindowHandle]) -> ProtocolResult<()>;
    fn publish_active(&mut self, window: Option<WindowHandle>) -> ProtocolResult<()>;
}
