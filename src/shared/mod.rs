//! Plain value types shared between the window manager core and the
//! display backend.

mod geometry;

pub use geometry::Geometry;
