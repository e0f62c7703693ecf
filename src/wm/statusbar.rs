//! Status bar
//!
//! A strip across the top of the screen showing the root window's
//! `_NET_WM_NAME`. Status scripts update it with something like
//! `xprop -root -set _NET_WM_NAME "text"`; plain `WM_NAME` (what
//! `xsetroot -name` writes) is not read. It is override-redirect, so the manager never tiles it.

use anyhow::{Context, Result};
use x11rb::connection::Connection;
use x11rb::COPY_FROM_PARENT;
use x11rb::protocol::xproto::*;

use crate::wm::protocol::ProtocolResult;

const TEXT_X: i16 = 5;
/// Core-protocol text requests carry at most 255 bytes
const MAX_TEXT_LEN: usize = 255;

#[derive(Debug)]
pub struct StatusBar {
    window: Window,
    gc: Gcontext,
    height: u16,
}

impl StatusBar {
    /// Create and map the bar on `screen`.
    pub fn create<C: Connection>(conn: &C, screen: &Screen, height: u16, font_name: &str) -> Result<Self> {
        let window = conn.generate_id()?;
        conn.create_window(
            COPY_FROM_PARENT as u8,
            window,
            screen.root,
            0,
            0,
            screen.width_in_pixels,
            height,
            0,
            WindowClass::INPUT_OUTPUT,
            screen.root_visual,
            &CreateWindowAux::new()
                .background_pixel(screen.black_pixel)
                .override_redirect(1u32)
                .event_mask(EventMask::EXPOSURE),
        )?;

        let font = conn.generate_id()?;
        conn.open_font(font, font_name.as_bytes())?
            .check()
            .with_context(|| format!("Failed to open font '{}'", font_name))?;

        let gc = conn.generate_id()?;
        conn.create_gc(
            gc,
            window,
            &CreateGCAux::new()
                .foreground(screen.white_pixel)
                .background(screen.black_pixel)
                .font(font),
        )?;
        // the GC keeps its own reference
        conn.close_font(font)?;

        conn.map_window(window)?;
        Ok(Self { window, gc, height })
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Repaint the bar with `text`.
    pub fn draw<C: Connection>(&self, conn: &C, text: &str) -> ProtocolResult<()> {
        conn.clear_area(false, self.window, 0, 0, 0, 0)?;
        conn.image_text8(self.window, self.gc, TEXT_X, baseline(self.height), &latin1(text))?;
        Ok(())
    }
}

/// Baseline 5 px above the bottom edge.
fn baseline(height: u16) -> i16 {
    i16::try_from(height.saturating_sub(5).max(1)).unwrap_or(i16::MAX)
}

/// Core fonts are Latin-1; anything outside it is shown as `?`.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .take(MAX_TEXT_LEN)
        .collect()
}
