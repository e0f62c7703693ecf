//! Display Module
//!
//! The x11rb backend: claims the window-manager role on the default
//! screen, grabs the configured keys and drag button, and turns X events
//! into [`Notification`]s for the dispatcher.

use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::{COPY_FROM_PARENT, CURRENT_TIME, NONE};

use crate::config::Config;
use crate::shared::Geometry;
use crate::wm::client::WindowHandle;
use crate::wm::error::ProtocolError;
use crate::wm::events::{Notification, Stacking, WindowChanges};
use crate::wm::ewmh::Atoms;
use crate::wm::keyboard::{Action, KeyCombo, Modifiers, keycodes_for};
use crate::wm::protocol::{ProtocolResult, WindowSystem};
use crate::wm::statusbar::StatusBar;

const WM_NAME: &str = "slate";

/// Live connection to the X server, acting as its window manager.
pub struct X11Display {
    conn: RustConnection,
    root: Window,
    atoms: Atoms,
    check_window: Window,
    status_bar: Option<StatusBar>,
    focused_pixel: u32,
    unfocused_pixel: u32,
    drag_modifiers: Modifiers,
    bindings: Vec<(KeyCombo, Action)>,
    /// (keycode, modifiers) -> action, rebuilt on keyboard remaps
    keymap: HashMap<(u8, Modifiers), Action>,
}

impl X11Display {
    /// Connect and become the window manager.
    ///
    /// Fails if another client already holds substructure redirection on
    /// the root window.
    pub fn connect(config: &Config) -> Result<Self> {
        let (conn, screen_num) = RustConnection::connect(None).context("Failed to connect to X server")?;
        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .cloned()
            .context("X server reported no screens")?;
        let root = screen.root;
        info!(
            "Connected to X server, screen {} ({}x{})",
            screen_num, screen.width_in_pixels, screen.height_in_pixels
        );

        let mask = EventMask::SUBSTRUCTURE_REDIRECT
            | EventMask::SUBSTRUCTURE_NOTIFY
            | EventMask::ENTER_WINDOW
            | EventMask::PROPERTY_CHANGE;
        conn.change_window_attributes(root, &ChangeWindowAttributesAux::new().event_mask(mask))?
            .check()
            .context("Another window manager is already running")?;
        info!("Registered as window manager");

        let atoms = Atoms::new(&conn)?;
        atoms.setup_supported(&conn, root)?;

        let check_window = conn.generate_id()?;
        conn.create_window(
            COPY_FROM_PARENT as u8,
            check_window,
            root,
            -1,
            -1,
            1,
            1,
            0,
            WindowClass::INPUT_ONLY,
            COPY_FROM_PARENT,
            &CreateWindowAux::new().override_redirect(1u32),
        )?;
        atoms.setup_supporting_wm_check(&conn, root, check_window, WM_NAME)?;

        let status_bar = if config.status_bar.enabled {
            let bar = StatusBar::create(&conn, &screen, config.status_bar.height, &config.status_bar.font)?;
            info!("Status bar created ({} px)", bar.height());
            Some(bar)
        } else {
            None
        };

        let mut display = Self {
            conn,
            root,
            atoms,
            check_window,
            status_bar,
            focused_pixel: config.colors.focused_pixel()?,
            unfocused_pixel: config.colors.unfocused_pixel()?,
            drag_modifiers: config.input.drag_mask()?,
            bindings: config.bindings()?,
            keymap: HashMap::new(),
        };
        display.grab_keys()?;
        display.grab_drag_button()?;
        display.atoms.update_client_list(&display.conn, root, &[])?;
        display.atoms.update_active_window(&display.conn, root, None)?;
        display.conn.flush()?;

        Ok(display)
    }

    /// Viewable top-level windows that were mapped before we started, in
    /// stacking order (bottom first).
    pub fn existing_windows(&self) -> Result<Vec<WindowHandle>> {
        let tree = self
            .conn
            .query_tree(self.root)?
            .reply()
            .context("Failed to query existing windows")?;

        let mut windows = Vec::new();
        for &child in &tree.children {
            if child == self.check_window || Some(child) == self.status_bar.as_ref().map(StatusBar::window) {
                continue;
            }
            // windows can vanish while we look at them
            let Ok(attrs) = self.conn.get_window_attributes(child)?.reply() else {
                continue;
            };
            if attrs.map_state == MapState::VIEWABLE && !attrs.override_redirect {
                windows.push(WindowHandle::new(child));
            }
        }
        debug!("Found {} existing windows", windows.len());
        Ok(windows)
    }

    /// (Re)grab every bound key under the current keyboard mapping.
    fn grab_keys(&mut self) -> ProtocolResult<()> {
        self.conn.ungrab_key(Grab::ANY, self.root, ModMask::ANY)?;
        self.keymap.clear();

        let setup = self.conn.setup();
        let (min_keycode, max_keycode) = (setup.min_keycode, setup.max_keycode);
        let mapping = self
            .conn
            .get_keyboard_mapping(min_keycode, max_keycode - min_keycode + 1)?
            .reply()?;

        for (combo, action) in &self.bindings {
            let keycodes = keycodes_for(
                combo.keysym,
                min_keycode,
                mapping.keysyms_per_keycode,
                &mapping.keysyms,
            );
            if keycodes.is_empty() {
                warn!("No keycode produces keysym {:#x}; binding {:?} is inactive", combo.keysym, action);
            }
            for keycode in keycodes {
                for modifiers in combo.modifiers.lock_variants() {
                    self.conn.grab_key(
                        true,
                        self.root,
                        ModMask::from(modifiers.bits()),
                        keycode,
                        GrabMode::ASYNC,
                        GrabMode::ASYNC,
                    )?;
                }
                self.keymap.insert((keycode, combo.modifiers), action.clone());
            }
        }

        info!("Grabbed {} key combinations", self.keymap.len());
        Ok(())
    }

    fn grab_drag_button(&self) -> ProtocolResult<()> {
        for modifiers in self.drag_modifiers.lock_variants() {
            self.conn.grab_button(
                false,
                self.root,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                NONE,
                NONE,
                ButtonIndex::M1,
                ModMask::from(modifiers.bits()),
            )?;
        }
        Ok(())
    }

    fn is_status_bar(&self, window: Window) -> bool {
        self.status_bar.as_ref().is_some_and(|bar| bar.window() == window)
    }

    /// Translate one X event; `None` for events the core does not need.
    fn translate(&mut self, event: Event) -> ProtocolResult<Option<Notification>> {
        let notification = match event {
            Event::CreateNotify(e) => Notification::WindowCreated {
                window: WindowHandle::new(e.window),
                override_redirect: e.override_redirect,
            },
            Event::MapRequest(e) => Notification::MapRequested {
                window: WindowHandle::new(e.window),
            },
            Event::ConfigureRequest(e) => Notification::ConfigureRequested {
                window: WindowHandle::new(e.window),
                changes: window_changes(&e),
            },
            Event::DestroyNotify(e) => Notification::Destroyed {
                window: WindowHandle::new(e.window),
            },
            Event::EnterNotify(e) => {
                // crossings caused by grabs are not the user moving the pointer
                if e.mode != NotifyMode::NORMAL {
                    return Ok(None);
                }
                Notification::PointerEntered {
                    window: WindowHandle::new(e.event),
                }
            }
            Event::ButtonPress(e) => Notification::ButtonPressed {
                button: e.detail,
                subwindow: (e.child != NONE).then(|| WindowHandle::new(e.child)),
                root_x: i32::from(e.root_x),
                root_y: i32::from(e.root_y),
            },
            Event::MotionNotify(e) => Notification::PointerMoved {
                root_x: i32::from(e.root_x),
                root_y: i32::from(e.root_y),
            },
            Event::ButtonRelease(e) => Notification::ButtonReleased { button: e.detail },
            Event::KeyPress(e) => {
                let modifiers = Modifiers::from_state(u16::from(e.state));
                match self.keymap.get(&(e.detail, modifiers)) {
                    Some(action) => Notification::Key(action.clone()),
                    None => return Ok(None),
                }
            }
            Event::PropertyNotify(e) => {
                if e.window != self.root || e.atom != self.atoms.net_wm_name || self.status_bar.is_none() {
                    return Ok(None);
                }
                Notification::StatusChanged
            }
            Event::Expose(e) => {
                if e.count != 0 || !self.is_status_bar(e.window) {
                    return Ok(None);
                }
                Notification::StatusChanged
            }
            Event::MappingNotify(e) => {
                if e.request == Mapping::KEYBOARD {
                    debug!("Keyboard mapping changed, regrabbing keys");
                    self.grab_keys()?;
                }
                return Ok(None);
            }
            Event::Error(e) => {
                warn!("X11 error: {:?}", e);
                return Ok(None);
            }
            _ => return Ok(None),
        };
        Ok(Some(notification))
    }
}

impl WindowSystem for X11Display {
    fn root(&self) -> WindowHandle {
        WindowHandle::new(self.root)
    }

    fn next_notification(&mut self) -> ProtocolResult<Notification> {
        loop {
            self.conn.flush()?;
            let event = self.conn.wait_for_event()?;
            if let Some(notification) = self.translate(event)? {
                return Ok(notification);
            }
        }
    }

    fn screen_size(&self) -> ProtocolResult<(u32, u32)> {
        let geometry = self.conn.get_geometry(self.root)?.reply()?;
        Ok((u32::from(geometry.width), u32::from(geometry.height)))
    }

    fn subscribe(&mut self, window: WindowHandle) -> ProtocolResult<()> {
        self.conn.change_window_attributes(
            window.id(),
            &ChangeWindowAttributesAux::new().event_mask(EventMask::ENTER_WINDOW),
        )?;
        Ok(())
    }

    fn map(&mut self, window: WindowHandle) -> ProtocolResult<()> {
        self.conn.map_window(window.id())?;
        Ok(())
    }

    fn move_resize(&mut self, window: WindowHandle, geometry: Geometry) -> ProtocolResult<()> {
        let aux = ConfigureWindowAux::new()
            .x(geometry.x)
            .y(geometry.y)
            .width(geometry.width)
            .height(geometry.height);
        self.conn.configure_window(window.id(), &aux)?;
        Ok(())
    }

    fn move_to(&mut self, window: WindowHandle, x: i32, y: i32) -> ProtocolResult<()> {
        self.conn
            .configure_window(window.id(), &ConfigureWindowAux::new().x(x).y(y))?;
        Ok(())
    }

    fn configure(&mut self, window: WindowHandle, changes: &WindowChanges) -> ProtocolResult<()> {
        self.conn.configure_window(window.id(), &configure_aux(changes))?;
        Ok(())
    }

    fn set_border_width(&mut self, window: WindowHandle, width: u32) -> ProtocolResult<()> {
        self.conn
            .configure_window(window.id(), &ConfigureWindowAux::new().border_width(width))?;
        Ok(())
    }

    fn set_border_color(&mut self, window: WindowHandle, focused: bool) -> ProtocolResult<()> {
        let pixel = if focused {
            self.focused_pixel
        } else {
            self.unfocused_pixel
        };
        self.conn.change_window_attributes(
            window.id(),
            &ChangeWindowAttributesAux::new().border_pixel(pixel),
        )?;
        Ok(())
    }

    fn set_input_focus(&mut self, window: WindowHandle) -> ProtocolResult<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, window.id(), CURRENT_TIME)?;
        Ok(())
    }

    fn window_origin(&mut self, window: WindowHandle) -> ProtocolResult<(i32, i32)> {
        let geometry = self
            .conn
            .get_geometry(window.id())?
            .reply()
            .map_err(|e| ProtocolError::from(e).for_window(window))?;
        Ok((i32::from(geometry.x), i32::from(geometry.y)))
    }

    fn grab_pointer(&mut self) -> ProtocolResult<()> {
        let reply = self
            .conn
            .grab_pointer(
                false,
                self.root,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                self.root,
                NONE,
                CURRENT_TIME,
            )?
            .reply()?;
        if reply.status != GrabStatus::SUCCESS {
            return Err(ProtocolError::PointerGrabRefused(format!("{:?}", reply.status)));
        }
        Ok(())
    }

    fn ungrab_pointer(&mut self) -> ProtocolResult<()> {
        self.conn.ungrab_pointer(CURRENT_TIME)?;
        self.conn.flush()?;
        Ok(())
    }

    fn send_close_request(&mut self, window: WindowHandle) -> ProtocolResult<bool> {
        let supported = self
            .atoms
            .supports_delete(&self.conn, window.id())
            .map_err(|e| e.for_window(window))?;
        if !supported {
            return Ok(false);
        }

        let event = ClientMessageEvent::new(
            32,
            window.id(),
            self.atoms.wm_protocols,
            [self.atoms.wm_delete_window, CURRENT_TIME, 0, 0, 0],
        );
        self.conn.send_event(false, window.id(), EventMask::NO_EVENT, event)?;
        Ok(true)
    }

    fn force_terminate(&mut self, window: WindowHandle) -> ProtocolResult<()> {
        self.conn.kill_client(window.id())?;
        self.conn.flush()?;
        Ok(())
    }

    fn redraw_status(&mut self) -> ProtocolResult<()> {
        let Some(bar) = &self.status_bar else {
            return Ok(());
        };
        let text = self.atoms.window_name(&self.conn, self.root)?;
        bar.draw(&self.conn, &text)
    }

    fn publish_client_list(&mut self, windows: &[WindowHandle]) -> ProtocolResult<()> {
        let ids: Vec<u32> = windows.iter().map(|w| w.id()).collect();
        self.atoms.update_client_list(&self.conn, self.root, &ids)
    }

    fn publish_active(&mut self, window: Option<WindowHandle>) -> ProtocolResult<()> {
        self.atoms
            .update_active_window(&self.conn, self.root, window.map(WindowHandle::id))
    }
}

fn has(mask: ConfigWindow, flag: ConfigWindow) -> bool {
    u16::from(mask) & u16::from(flag) != 0
}

/// Only the fields named in the request's value mask.
fn window_changes(e: &ConfigureRequestEvent) -> WindowChanges {
    let mask = e.value_mask;
    WindowChanges {
        x: has(mask, ConfigWindow::X).then_some(i32::from(e.x)),
        y: has(mask, ConfigWindow::Y).then_some(i32::from(e.y)),
        width: has(mask, ConfigWindow::WIDTH).then_some(u32::from(e.width)),
        height: has(mask, ConfigWindow::HEIGHT).then_some(u32::from(e.height)),
        border_width: has(mask, ConfigWindow::BORDER_WIDTH).then_some(u32::from(e.border_width)),
        sibling: has(mask, ConfigWindow::SIBLING).then_some(WindowHandle::new(e.sibling)),
        stack_mode: if has(mask, ConfigWindow::STACK_MODE) {
            stacking(e.stack_mode)
        } else {
            None
        },
    }
}

fn stacking(mode: StackMode) -> Option<Stacking> {
    match mode {
        StackMode::ABOVE => Some(Stacking::Above),
        StackMode::BELOW => Some(Stacking::Below),
        StackMode::TOP_IF => Some(Stacking::TopIf),
        StackMode::BOTTOM_IF => Some(Stacking::BottomIf),
        StackMode::OPPOSITE => Some(Stacking::Opposite),
        _ => None,
    }
}

fn stack_mode(stacking: Stacking) -> StackMode {
    match stacking {
        Stacking::Above => StackMode::ABOVE,
        Stacking::Below => StackMode::BELOW,
        Stacking::TopIf => StackMode::TOP_IF,
        Stacking::BottomIf => StackMode::BOTTOM_IF,
        Stacking::Opposite => StackMode::OPPOSITE,
    }
}

fn configure_aux(changes: &WindowChanges) -> ConfigureWindowAux {
    ConfigureWindowAux::new()
        .x(changes.x)
        .y(changes.y)
        .width(changes.width)
        .height(changes.height)
        .border_width(changes.border_width)
        .sibling(changes.sibling.map(WindowHandle::id))
        .stack_mode(changes.stack_mode.map(stack_mode))
}
