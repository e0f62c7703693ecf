//! EWMH and ICCCM properties
//!
//! Atoms the manager needs, plus the few root-window properties it
//! publishes so pagers, panels and `wmctrl` can see what is managed.

use anyhow::Result;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::wrapper::ConnectionExt as _;

use crate::wm::protocol::ProtocolResult;

/// Holds all interned atoms
#[derive(Debug, Clone, Copy)]
pub struct Atoms {
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
    pub net_supported: Atom,
    pub net_supporting_wm_check: Atom,
    pub net_client_list: Atom,
    pub net_active_window: Atom,
    pub net_wm_name: Atom,
    pub utf8_string: Atom,
}

impl Atoms {
    /// Intern all required atoms
    pub fn new<C: Connection>(conn: &C) -> Result<Self> {
        let intern = |name: &str| -> Result<Atom> {
            Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
        };

        Ok(Self {
            wm_protocols: intern("WM_PROTOCOLS")?,
            wm_delete_window: intern("WM_DELETE_WINDOW")?,
            net_supported: intern("_NET_SUPPORTED")?,
            net_supporting_wm_check: intern("_NET_SUPPORTING_WM_CHECK")?,
            net_client_list: intern("_NET_CLIENT_LIST")?,
            net_active_window: intern("_NET_ACTIVE_WINDOW")?,
            net_wm_name: intern("_NET_WM_NAME")?,
            utf8_string: intern("UTF8_STRING")?,
        })
    }

    /// Advertise the hints we maintain in _NET_SUPPORTED
    pub fn setup_supported<C: Connection>(&self, conn: &C, root: Window) -> Result<()> {
        let supported = [
            self.net_supported,
            self.net_supporting_wm_check,
            self.net_client_list,
            self.net_active_window,
            self.net_wm_name,
        ];
        conn.change_property32(PropMode::REPLACE, root, self.net_supported, AtomEnum::ATOM, &supported)?;
        Ok(())
    }

    /// Point _NET_SUPPORTING_WM_CHECK at `child` from both windows and
    /// name it
    pub fn setup_supporting_wm_check<C: Connection>(
        &self,
        conn: &C,
        root: Window,
        child: Window,
        name: &str,
    ) -> Result<()> {
        for window in [root, child] {
            conn.change_property32(
                PropMode::REPLACE,
                window,
                self.net_supporting_wm_check,
                AtomEnum::WINDOW,
                &[child],
            )?;
        }
        conn.change_property8(
            PropMode::REPLACE,
            child,
            self.net_wm_name,
            self.utf8_string,
            name.as_bytes(),
        )?;
        Ok(())
    }

    /// Update _NET_CLIENT_LIST
    pub fn update_client_list<C: Connection>(&self, conn: &C, root: Window, windows: &[u32]) -> ProtocolResult<()> {
        conn.change_property32(
            PropMode::REPLACE,
            root,
            self.net_client_list,
            AtomEnum::WINDOW,
            windows,
        )?;
        Ok(())
    }

    /// Update _NET_ACTIVE_WINDOW; `None` is published as 0
    pub fn update_active_window<C: Connection>(
        &self,
        conn: &C,
        root: Window,
        window: Option<u32>,
    ) -> ProtocolResult<()> {
        conn.change_property32(
            PropMode::REPLACE,
            root,
            self.net_active_window,
            AtomEnum::WINDOW,
            &[window.unwrap_or(x11rb::NONE)],
        )?;
        Ok(())
    }

    /// Whether `window` lists WM_DELETE_WINDOW in its WM_PROTOCOLS
    pub fn supports_delete<C: Connection>(&self, conn: &C, window: Window) -> ProtocolResult<bool> {
        let reply = conn
            .get_property(false, window, self.wm_protocols, AtomEnum::ATOM, 0, 64)?
            .reply()?;
        let protocols: Vec<Atom> = reply.value32().map(Iterator::collect).unwrap_or_default();
        Ok(protocols.contains(&self.wm_delete_window))
    }

    /// Read a window's _NET_WM_NAME, empty if unset
    pub fn window_name<C: Connection>(&self, conn: &C, window: Window) -> ProtocolResult<String> {
        let reply = conn
            .get_property(false, window, self.net_wm_name, self.utf8_string, 0, 1024)?
            .reply()?;
        Ok(decode_name(&reply.value))
    }
}

/// Decode a UTF-8 text property, stopping at the first NUL.
pub fn decode_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_name_stops_at_nul() {
        assert_eq!(decode_name(b"12:30 | bat 80%\0junk"), "12:30 | bat 80%");
        assert_eq!(decode_name(b""), "");
    }

    #[test]
    fn test_decode_name_replaces_invalid_utf8() {
        assert_eq!(decode_name(&[b'o', b'k', 0xff]), "ok\u{fffd}");
    }
}
