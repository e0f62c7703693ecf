use std::fmt;

/// Server-assigned identifier of a client window.
///
/// The core only stores and compares handles; whether the window still
/// exists is the display backend's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(u32);

impl WindowHandle {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw X11 window id
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl From<u32> for WindowHandle {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Registry entry for a mapped, tiled window.
///
/// Position, size and border are recomputed by every tiling pass and are
/// deliberately not cached here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedWindow {
    pub handle: WindowHandle,
}

impl ManagedWindow {
    pub fn new(handle: WindowHandle) -> Self {
        Self { handle }
    }
}
