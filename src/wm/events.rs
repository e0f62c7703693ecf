//! Events Module
//!
//! Structured notifications delivered by the display backend, already
//! stripped of wire details the core does not need.

use crate::wm::client::WindowHandle;
use crate::wm::keyboard::Action;

/// One notification from the display server.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A window was created. Nothing is managed yet.
    WindowCreated {
        window: WindowHandle,
        override_redirect: bool,
    },
    /// A client asks for its window to be shown.
    MapRequested { window: WindowHandle },
    /// A client asks for specific geometry or stacking.
    ConfigureRequested {
        window: WindowHandle,
        changes: WindowChanges,
    },
    Destroyed { window: WindowHandle },
    PointerEntered { window: WindowHandle },
    ButtonPressed {
        button: u8,
        /// Top-level window under the pointer, if any
        subwindow: Option<WindowHandle>,
        root_x: i32,
        root_y: i32,
    },
    PointerMoved { root_x: i32, root_y: i32 },
    ButtonReleased { button: u8 },
    /// A bound key combination, resolved to its action.
    Key(Action),
    /// Status text changed or the status surface needs repainting.
    StatusChanged,
}

/// Primary pointer button
pub const BUTTON_PRIMARY: u8 = 1;

/// Fields of a configure request; `None` means "not requested".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowChanges {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub border_width: Option<u32>,
    pub sibling: Option<WindowHandle>,
    pub stack_mode: Option<Stacking>,
}

impl WindowChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Requested restacking, mirroring the X11 stack modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stacking {
    Above,
    Below,
    TopIf,
    BottomIf,
    Opposite,
}

/// What the dispatcher does after handling a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}
