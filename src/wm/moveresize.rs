//! MoveResize Module
//!
//! Pointer-driven window moves. A drag holds an exclusive pointer grab
//! for its whole lifetime; the grab is represented by a [`PointerGrab`]
//! token that can only be given back through the display backend.

use std::mem;

use tracing::{debug, error};

use crate::wm::client::WindowHandle;
use crate::wm::protocol::{ProtocolResult, WindowSystem};

/// Proof that this process holds the pointer grab.
#[must_use = "the pointer stays grabbed until the token is released"]
#[derive(Debug)]
pub struct PointerGrab {
    released: bool,
}

impl PointerGrab {
    pub fn acquire<W: WindowSystem>(ws: &mut W) -> ProtocolResult<Self> {
        ws.grab_pointer()?;
        Ok(Self { released: false })
    }

    pub fn release<W: WindowSystem>(mut self, ws: &mut W) -> ProtocolResult<()> {
        self.released = true;
        ws.ungrab_pointer()
    }
}

impl Drop for PointerGrab {
    fn drop(&mut self) {
        if !self.released {
            error!("Pointer grab dropped while still held");
        }
    }
}

/// An in-progress move.
#[derive(Debug)]
pub struct Drag {
    pub target: WindowHandle,
    /// Pointer root position at button press
    pub anchor_pointer: (i32, i32),
    /// Window origin at button press
    pub anchor_origin: (i32, i32),
    grab: PointerGrab,
}

impl Drag {
    /// Window origin for the pointer at (`root_x`, `root_y`).
    pub fn origin_for(&self, root_x: i32, root_y: i32) -> (i32, i32) {
        (
            self.anchor_origin.0 + (root_x - self.anchor_pointer.0),
            self.anchor_origin.1 + (root_y - self.anchor_pointer.1),
        )
    }
}

#[derive(Debug, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(Drag),
}

/// Move/resize manager
#[derive(Debug, Default)]
pub struct MoveResizeManager {
    state: DragState,
}

impl MoveResizeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn target(&self) -> Option<WindowHandle> {
        match &self.state {
            DragState::Dragging(drag) => Some(drag.target),
            DragState::Idle => None,
        }
    }

    /// Start moving `target` with the pointer at `pointer`.
    ///
    /// Returns `false` if a drag is already running. On error the state
    /// stays `Idle` and no grab is held.
    pub fn begin<W: WindowSystem>(
        &mut self,
        ws: &mut W,
        target: WindowHandle,
        pointer: (i32, i32),
    ) -> ProtocolResult<bool> {
        if self.is_dragging() {
            return Ok(false);
        }

        let origin = ws.window_origin(target)?;
        let grab = PointerGrab::acquire(ws)?;
        debug!("Starting move of {} from {:?}", target, origin);

        self.state = DragState::Dragging(Drag {
            target,
            anchor_pointer: pointer,
            anchor_origin: origin,
            grab,
        });
        Ok(true)
    }

    /// Follow the pointer. Only the origin changes, never the size.
    pub fn motion<W: WindowSystem>(&self, ws: &mut W, root_x: i32, root_y: i32) -> ProtocolResult<()> {
        let DragState::Dragging(drag) = &self.state else {
            return Ok(());
        };
        let (x, y) = drag.origin_for(root_x, root_y);
        ws.move_to(drag.target, x, y)
    }

    /// Finish the drag and release the grab.
    ///
    /// The state is `Idle` afterwards even if the ungrab request fails.
    pub fn end<W: WindowSystem>(&mut self, ws: &mut W) -> ProtocolResult<Option<WindowHandle>> {
        match mem::take(&mut self.state) {
            DragState::Dragging(drag) => {
                debug!("Finished move of {}", drag.target);
                drag.grab.release(ws)?;
                Ok(Some(drag.target))
            }
            DragState::Idle => Ok(None),
        }
    }

    /// Drop the drag if `window` is its target. The target is not touched.
    pub fn abandon_if<W: WindowSystem>(&mut self, ws: &mut W, window: WindowHandle) -> ProtocolResult<bool> {
        if self.target() != Some(window) {
            return Ok(false);
        }
        debug!("Drag target {} went away", window);
        self.end(ws)?;
        Ok(true)
    }
}
