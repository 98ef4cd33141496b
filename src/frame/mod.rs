//! Frame data for animated labels.
//!
//! A frame is just the lines of text to show; the sequence owns the order,
//! the cursor and the running maximum of frame bounds.

mod sequence;

pub use sequence::{split_lines, Frame, FrameSequence};
