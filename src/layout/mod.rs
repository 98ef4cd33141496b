//! Layout module: Cell extents reported to the host's layout pass.
//!
//! The animation core never lays anything out itself. It only measures its
//! frames and tells the host how much room the largest one needs.

mod size;

pub use size::Size;
