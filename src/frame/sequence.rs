//! Frame sequence: the ordered frames of an animation and the cursor into them.

use crate::layout::Size;

/// One discrete content state, as an ordered list of text lines.
pub type Frame = Vec<String>;

/// Split label text into lines.
///
/// Carriage returns are dropped and the text is split on `\n`. An empty
/// string produces a single empty line.
pub fn split_lines(text: &str) -> Frame {
    text.replace('\r', "").split('\n').map(str::to_owned).collect()
}

/// Ordered, never-empty list of frames with a wrapping cursor.
///
/// The sequence also tracks the largest bounds seen across every frame added
/// so far, so the host can reserve room for the biggest one.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    /// All frames, in display order.
    frames: Vec<Frame>,
    /// Index of the frame currently shown. Always `< frames.len()`.
    current: usize,
    /// Running maximum of all frame bounds. Never shrinks.
    bounds: Size,
}

impl FrameSequence {
    /// Create a sequence holding a single frame.
    pub fn new(first_frame: &str) -> Self {
        let frame = split_lines(first_frame);
        let bounds = Size::of_lines(&frame);
        Self {
            frames: vec![frame],
            current: 0,
            bounds,
        }
    }

    /// Append a frame at the end and grow the aggregate bounds to fit it.
    pub fn add_frame(&mut self, text: &str) {
        let frame = split_lines(text);
        self.bounds = self.bounds.max(Size::of_lines(&frame));
        self.frames.push(frame);
    }

    /// Move to the next frame, wrapping to the first after the last.
    pub fn advance(&mut self) {
        self.current += 1;
        if self.current >= self.frames.len() {
            self.current = 0;
        }
    }

    /// Lines of the current frame.
    #[inline]
    pub fn current(&self) -> &[String] {
        &self.frames[self.current]
    }

    /// Index of the current frame.
    #[inline]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Number of frames. Always at least one.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; a sequence is created with one frame and only grows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Aggregate bounds of every frame added so far.
    #[inline]
    pub const fn bounds(&self) -> Size {
        self.bounds
    }

    /// Preferred size: the current frame's bounds grown to the aggregate.
    pub fn preferred_size(&self) -> Size {
        Size::of_lines(self.current()).max(self.bounds)
    }
}
