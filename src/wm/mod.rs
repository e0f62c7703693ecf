//! Window Manager Module
//!
//! [`WindowManager`] owns all manager state (registry, focus, drag) and
//! runs the dispatch loop over a [`WindowSystem`]. Nothing here talks to
//! X11 directly; `display.rs` provides the real backend.

pub mod client;
pub mod display;
pub mod error;
pub mod events;
pub mod ewmh;
pub mod focus;
pub mod keyboard;
pub mod moveresize;
pub mod protocol;
pub mod registry;
pub mod spawn;
pub mod statusbar;
pub mod terminate;
pub mod tiling;

use tracing::{debug, error, info, warn};

use crate::wm::client::WindowHandle;
use crate::wm::events::{BUTTON_PRIMARY, Flow, Notification};
use crate::wm::focus::FocusManager;
use crate::wm::keyboard::Action;
use crate::wm::moveresize::MoveResizeManager;
use crate::wm::protocol::{ProtocolResult, WindowSystem};
use crate::wm::registry::WindowRegistry;
use crate::wm::spawn::Spawner;
use crate::wm::terminate::CloseOutcome;
use crate::wm::tiling::{LayoutParams, compute_layout};

pub struct WindowManager {
    params: LayoutParams,
    registry: WindowRegistry,
    focus: FocusManager,
    drag: MoveResizeManager,
}

impl WindowManager {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            params,
            registry: WindowRegistry::new(),
            focus: FocusManager::new(),
            drag: MoveResizeManager::new(),
        }
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    pub fn focused(&self) -> Option<WindowHandle> {
        self.focus.focused()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Take over windows that were already mapped before we started.
    ///
    /// They are tiled in the given order; focus is left alone.
    pub fn adopt<W: WindowSystem>(&mut self, ws: &mut W, windows: &[WindowHandle]) -> ProtocolResult<()> {
        for &window in windows {
            let decorated = self.decorate(ws, window);
            if let Err(e) = decorated {
                if e.is_fatal() {
                    return Err(e);
                }
                warn!("Skipping existing window {}: {}", window, e);
                continue;
            }
            self.registry.insert(window);
        }
        info!("Adopted {} existing windows", self.registry.len());

        ws.publish_client_list(&self.registry.handles())?;
        self.retile(ws)
    }

    /// Dispatch notifications until the exit action or a fatal error.
    ///
    /// Non-fatal errors are logged and the loop carries on. Any drag in
    /// progress is ended before returning, whatever the reason.
    pub fn run<W: WindowSystem, S: Spawner>(&mut self, ws: &mut W, spawner: &S) -> ProtocolResult<()> {
        let result = loop {
            let step = ws
                .next_notification()
                .and_then(|notification| self.handle(ws, spawner, notification));

            match step {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break Ok(()),
                Err(e) if e.is_fatal() => {
                    error!("Stopping event loop: {}", e);
                    break Err(e);
                }
                Err(e) => warn!("Ignoring failed request: {}", e),
            }
        };

        if self.is_dragging() {
            if let Err(e) = self.drag.end(ws) {
                debug!("Could not release pointer grab on shutdown: {}", e);
            }
        }
        info!(
            "Event loop ended with {} managed windows, focused {:?}",
            self.registry().len(),
            self.focused()
        );
        result
    }

    /// Route a single notification.
    pub fn handle<W: WindowSystem, S: Spawner>(
        &mut self,
        ws: &mut W,
        spawner: &S,
        notification: Notification,
    ) -> ProtocolResult<Flow> {
        debug!("Handling {:?}", notification);

        match notification {
            Notification::WindowCreated {
                window,
                override_redirect,
            } => {
                if override_redirect {
                    debug!("Not decorating override-redirect window {}", window);
                } else {
                    self.decorate(ws, window)?;
                }
            }
            Notification::MapRequested { window } => self.on_map_request(ws, window)?,
            Notification::ConfigureRequested { window, changes } => {
                if !changes.is_empty() {
                    ws.configure(window, &changes)?;
                }
            }
            Notification::Destroyed { window } => self.on_destroyed(ws, window)?,
            Notification::PointerEntered { window } => {
                if window != ws.root() && self.focus.focused() != Some(window) {
                    self.focus.focus(ws, window)?;
                }
            }
            Notification::ButtonPressed {
                button,
                subwindow,
                root_x,
                root_y,
            } => self.on_button_press(ws, button, subwindow, (root_x, root_y))?,
            Notification::PointerMoved { root_x, root_y } => self.drag.motion(ws, root_x, root_y)?,
            Notification::ButtonReleased { button } => {
                if let Some(window) = self.drag.end(ws)? {
                    debug!("Button {} released, snapping {} back", button, window);
                    self.retile(ws)?;
                }
            }
            Notification::Key(action) => return self.on_action(ws, spawner, action),
            Notification::StatusChanged => ws.redraw_status()?,
        }

        Ok(Flow::Continue)
    }

    fn decorate<W: WindowSystem>(&self, ws: &mut W, window: WindowHandle) -> ProtocolResult<()> {
        ws.subscribe(window)?;
        ws.set_border_width(window, self.params.border_width)?;
        ws.set_border_color(window, false)
    }

    fn on_map_request<W: WindowSystem>(&mut self, ws: &mut W, window: WindowHandle) -> ProtocolResult<()> {
        if self.registry.insert(window) {
            info!("Managing window {} ({} total)", window, self.registry.len());
            ws.publish_client_list(&self.registry.handles())?;
        }
        ws.map(window)?;
        self.retile(ws)?;
        self.focus.focus(ws, window)
    }

    fn on_destroyed<W: WindowSystem>(&mut self, ws: &mut W, window: WindowHandle) -> ProtocolResult<()> {
        let removed = self.registry.remove(window);
        if self.focus.clear_if(window) {
            ws.publish_active(None)?;
        }
        self.drag.abandon_if(ws, window)?;

        if removed {
            info!("Window {} destroyed ({} left)", window, self.registry.len());
            ws.publish_client_list(&self.registry.handles())?;
            self.retile(ws)?;
        }
        Ok(())
    }

    fn on_button_press<W: WindowSystem>(
        &mut self,
        ws: &mut W,
        button: u8,
        subwindow: Option<WindowHandle>,
        pointer: (i32, i32),
    ) -> ProtocolResult<()> {
        if button != BUTTON_PRIMARY {
            return Ok(());
        }
        match subwindow {
            Some(window) if self.registry.contains(window) => {
                self.drag.begin(ws, window, pointer)?;
            }
            Some(window) => debug!("Press over unmanaged window {}", window),
            None => debug!("Press on root background"),
        }
        Ok(())
    }

    fn on_action<W: WindowSystem, S: Spawner>(
        &mut self,
        ws: &mut W,
        spawner: &S,
        action: Action,
    ) -> ProtocolResult<Flow> {
        let close: fn(&mut W, WindowHandle) -> ProtocolResult<CloseOutcome> = match action {
            Action::Launch(argv) => {
                spawner.spawn(&argv);
                return Ok(Flow::Continue);
            }
            Action::ExitManager => {
                info!("Exit requested");
                return Ok(Flow::Exit);
            }
            Action::RequestCloseFocused => terminate::request_close,
            Action::ForceKillFocused => terminate::force_kill,
            Action::CloseOrKillFocused => terminate::close_or_kill,
        };

        match self.focus.focused() {
            Some(window) => {
                close(ws, window)?;
            }
            None => info!("No focused window to close"),
        }
        Ok(Flow::Continue)
    }

    /// Reapply the master/stack layout to every managed window.
    fn retile<W: WindowSystem>(&self, ws: &mut W) -> ProtocolResult<()> {
        if self.registry.is_empty() {
            return Ok(());
        }

        let (width, height) = ws.screen_size()?;
        let layout = compute_layout(&self.registry.handles(), width, height, &self.params);
        for (window, geometry) in layout {
            match ws.move_resize(window, geometry) {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!("Could not place {}: {}", window, e),
            }
        }
        Ok(())
    }
}
