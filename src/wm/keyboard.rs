//! Keyboard Module
//!
//! Bindable actions, modifier sets and key-name resolution. Turning
//! keysyms into keycodes needs the server's keyboard mapping, so the
//! lookup here works on the raw mapping table the backend fetched.

use anyhow::{Context, Result, bail};
use bitflags::bitflags;

/// Window-management action bound to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run an external program with this argv.
    Launch(Vec<String>),
    /// Ask the focused window to close; report-only if it can't.
    RequestCloseFocused,
    /// Kill the focused window's client unconditionally.
    ForceKillFocused,
    /// Ask politely, kill if the window doesn't support it.
    CloseOrKillFocused,
    ExitManager,
}

bitflags! {
    /// Modifier set, using the X11 core protocol mask bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const ALT = 1 << 3;
        const NUM_LOCK = 1 << 4;
        const SUPER = 1 << 6;
    }
}

impl Modifiers {
    /// Lock modifiers that must not affect binding lookup.
    pub const IGNORED: Self = Self::LOCK.union(Self::NUM_LOCK);

    pub fn parse(name: &str) -> Result<Self> {
        let modifier = match name.to_ascii_lowercase().as_str() {
            "shift" => Self::SHIFT,
            "control" | "ctrl" => Self::CONTROL,
            "alt" | "mod1" => Self::ALT,
            "super" | "mod4" | "logo" => Self::SUPER,
            _ => bail!("unknown modifier '{}'", name),
        };
        Ok(modifier)
    }

    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        names
            .iter()
            .try_fold(Self::empty(), |acc, name| Ok(acc | Self::parse(name.as_ref())?))
    }

    /// Strip Caps Lock / Num Lock and any bits we never bind.
    pub fn from_state(state: u16) -> Self {
        Self::from_bits_truncate(state) - Self::IGNORED
    }

    /// Every lock combination a grab must be registered for.
    pub fn lock_variants(self) -> [Self; 4] {
        [
            self,
            self | Self::LOCK,
            self | Self::NUM_LOCK,
            self | Self::LOCK | Self::NUM_LOCK,
        ]
    }
}

/// A modifier set plus a keysym.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub modifiers: Modifiers,
    pub keysym: u32,
}

impl KeyCombo {
    pub fn parse<S: AsRef<str>>(modifiers: &[S], key: &str) -> Result<Self> {
        let modifiers = Modifiers::parse_all(modifiers)?;
        let keysym = keysym_from_name(key).with_context(|| format!("unknown key '{}'", key))?;
        Ok(Self { modifiers, keysym })
    }
}

const NAMED_KEYSYMS: &[(&str, u32)] = &[
    ("return", 0xff0d),
    ("enter", 0xff0d),
    ("space", 0x0020),
    ("tab", 0xff09),
    ("escape", 0xff1b),
    ("backspace", 0xff08),
    ("delete", 0xffff),
    ("print", 0xff61),
    ("home", 0xff50),
    ("left", 0xff51),
    ("up", 0xff52),
    ("right", 0xff53),
    ("down", 0xff54),
    ("end", 0xff57),
    ("minus", 0x002d),
    ("equal", 0x003d),
];

/// Resolve a key name (`q`, `Return`, `F5`, ...) to its X keysym.
pub fn keysym_from_name(name: &str) -> Option<u32> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        // Latin-1 keysyms equal their code points; bind the unshifted form
        if c.is_ascii_graphic() {
            return Some(u32::from(c.to_ascii_lowercase()));
        }
        return None;
    }

    let lower = name.to_ascii_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u32>().ok()) {
        return (1..=24).contains(&n).then(|| 0xffbe + n - 1);
    }

    NAMED_KEYSYMS
        .iter()
        .find(|(key, _)| *key == lower)
        .map(|&(_, keysym)| keysym)
}

/// Keycodes whose mapping row contains `keysym`.
///
/// `keysyms` is the flattened reply of GetKeyboardMapping starting at
/// `min_keycode`, `per_keycode` entries per row.
pub fn keycodes_for(keysym: u32, min_keycode: u8, per_keycode: u8, keysyms: &[u32]) -> Vec<u8> {
    if per_keycode == 0 {
        return Vec::new();
    }
    keysyms
        .chunks(usize::from(per_keycode))
        .enumerate()
        .filter(|(_, row)| row.contains(&keysym))
        .filter_map(|(i, _)| u8::try_from(usize::from(min_keycode) + i).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modifier_names() {
        let mods = Modifiers::parse_all(&["Super", "shift"]).unwrap();
        assert_eq!(mods, Modifiers::SUPER | Modifiers::SHIFT);
        assert!(Modifiers::parse("hyper").is_err());
    }

    #[test]
    fn test_from_state_strips_locks() {
        let state = (Modifiers::SUPER | Modifiers::LOCK | Modifiers::NUM_LOCK).bits();
        assert_eq!(Modifiers::from_state(state), Modifiers::SUPER);
    }

    #[test]
    fn test_lock_variants_cover_all_combinations() {
        let variants = Modifiers::SUPER.lock_variants();
        assert!(variants.iter().all(|m| m.contains(Modifiers::SUPER)));
        assert!(variants.iter().all(|&m| Modifiers::from_state(m.bits()) == Modifiers::SUPER));
    }

    #[test]
    fn test_keysym_names() {
        assert_eq!(keysym_from_name("q"), Some(0x71));
        assert_eq!(keysym_from_name("Q"), Some(0x71));
        assert_eq!(keysym_from_name("Return"), Some(0xff0d));
        assert_eq!(keysym_from_name("F1"), Some(0xffbe));
        assert_eq!(keysym_from_name("F12"), Some(0xffc9));
        assert_eq!(keysym_from_name("F30"), None);
        assert_eq!(keysym_from_name("nope"), None);
    }

    #[test]
    fn test_keycodes_from_mapping() {
        // rows for keycodes 8, 9, 10 with two keysyms each
        let mapping = [0x61, 0x41, 0xff0d, 0, 0x71, 0x51];
        assert_eq!(keycodes_for(0x71, 8, 2, &mapping), vec![10]);
        assert_eq!(keycodes_for(0xff0d, 8, 2, &mapping), vec![9]);
        assert!(keycodes_for(0x7a, 8, 2, &mapping).is_empty());
    }

    #[test]
    fn test_combo_rejects_unknown_key() {
        assert!(KeyCombo::parse(&["super"], "m").is_ok());
        assert!(KeyCombo::parse(&["super"], "nosuchkey").is_err());
    }
}
