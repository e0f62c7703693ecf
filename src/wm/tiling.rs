//! Tiling Engine
//!
//! Master/stack layout. The first window takes the left `master_ratio` of
//! the screen at full usable height, the rest share the right-hand column
//! in equal slices.

use crate::shared::Geometry;
use crate::wm::client::WindowHandle;

/// Per-session layout configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Fraction of the screen width given to the master, in (0, 1)
    pub master_ratio: f64,
    pub border_width: u32,
    /// Rows at the top of the screen taken by the status surface
    pub reserved_top: u32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            master_ratio: 0.6,
            border_width: 2,
            reserved_top: 0,
        }
    }
}

/// Compute the rectangle of every window in `windows`, in the same order.
///
/// Stack slice height uses integer division, so up to `N - 2` rows at the
/// bottom of the stack column can stay uncovered. Sizes never drop below
/// one pixel; X rejects zero-sized windows.
pub fn compute_layout(
    windows: &[WindowHandle],
    screen_width: u32,
    screen_height: u32,
    params: &LayoutParams,
) -> Vec<(WindowHandle, Geometry)> {
    let Some((&master, stack)) = windows.split_first() else {
        return Vec::new();
    };

    let top = params.reserved_top.min(screen_height);
    let usable_height = screen_height - top;
    let border = params.border_width.saturating_mul(2);
    let shrink = |len: u32| len.saturating_sub(border).max(1);

    if stack.is_empty() {
        return vec![(
            master,
            Geometry::new(0, top as i32, shrink(screen_width), shrink(usable_height)),
        )];
    }

    let master_width = ((f64::from(screen_width) * params.master_ratio) as u32).min(screen_width);
    let stack_width = screen_width - master_width;
    let slot_height = usable_height / stack.len() as u32;

    let mut layout = Vec::with_capacity(windows.len());
    layout.push((
        master,
        Geometry::new(0, top as i32, shrink(master_width), shrink(usable_height)),
    ));

    for (i, &handle) in stack.iter().enumerate() {
        let y = top + i as u32 * slot_height;
        layout.push((
            handle,
            Geometry::new(
                master_width as i32,
                y as i32,
                shrink(stack_width),
                shrink(slot_height),
            ),
        ));
    }

    layout
}
