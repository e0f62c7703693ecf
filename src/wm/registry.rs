//! Window Registry
//!
//! Ordered list of managed windows. Insertion order is map order: index 0
//! is the master, everything after it is the stack from top to bottom.

use crate::wm::client::{ManagedWindow, WindowHandle};

#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: Vec<ManagedWindow>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handle` unless it is already managed.
    ///
    /// Returns `true` if the registry changed.
    pub fn insert(&mut self, handle: WindowHandle) -> bool {
        if self.contains(handle) {
            return false;
        }
        self.windows.push(ManagedWindow::new(handle));
        true
    }

    /// Remove `handle` if present. Removing an unknown handle is a no-op.
    pub fn remove(&mut self, handle: WindowHandle) -> bool {
        match self.windows.iter().position(|w| w.handle == handle) {
            Some(index) => {
                self.windows.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.windows.iter().any(|w| w.handle == handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManagedWindow> {
        self.windows.iter()
    }

    /// Handles in tiling order
    pub fn handles(&self) -> Vec<WindowHandle> {
        self.iter().map(|w| w.handle).collect()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(id: u32) -> WindowHandle {
        WindowHandle::new(id)
    }

    #[test]
    fn test_insert_appends_in_map_order() {
        let mut registry = WindowRegistry::new();
        assert!(registry.insert(h(1)));
        assert!(registry.insert(h(2)));
        assert!(registry.insert(h(3)));
        assert_eq!(registry.handles(), vec![h(1), h(2), h(3)]);
    }

    #[test]
    fn test_insert_existing_is_noop() {
        let mut registry = WindowRegistry::new();
        registry.insert(h(1));
        registry.insert(h(2));

        assert!(!registry.insert(h(1)));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.handles(), vec![h(1), h(2)]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut registry = WindowRegistry::new();
        registry.insert(h(1));

        assert!(!registry.remove(h(9)));
        assert_eq!(registry.handles(), vec![h(1)]);
    }

    #[test]
    fn test_remove_master_promotes_next() {
        let mut registry = WindowRegistry::new();
        registry.insert(h(1));
        registry.insert(h(2));
        registry.insert(h(3));

        assert!(registry.remove(h(1)));
        assert_eq!(registry.handles(), vec![h(2), h(3)]);
        assert!(!registry.contains(h(1)));
    }

    #[test]
    fn test_insert_then_remove_leaves_empty() {
        let mut registry = WindowRegistry::new();
        registry.insert(h(5));
        registry.remove(h(5));
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }
}
