//! Host capabilities: the narrow interface to the display tree.
//!
//! The animation core never walks a widget tree or paints anything. It only
//! needs to know whether its host node is currently part of a live display,
//! to be told when that changes, and somewhere to push frames and bounds.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  subscribe / current_attachment  ┌──────────────┐
//! │  Controller  │ ───────────────────────────────▶ │              │
//! │  (monitor +  │                                  │     Host     │
//! │  scheduler)  │ ◀─────── AttachmentState ─────── │              │
//! │              │ ─── render_frame / bounds ─────▶ │              │
//! └──────────────┘                                  └──────────────┘
//! ```

mod node;
mod signal;

pub use node::{DisplayNode, RenderRecord, DEFAULT_RENDER_HISTORY};
pub use signal::AttachmentSignal;

use crate::layout::Size;

/// Whether a host node is part of a live, displayed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachmentState {
    /// Not part of any displayed tree.
    #[default]
    Detached,
    /// Part of a displayed tree.
    Attached,
}

impl AttachmentState {
    /// Check if this is [`AttachmentState::Attached`].
    #[inline]
    pub const fn is_attached(self) -> bool {
        matches!(self, Self::Attached)
    }
}

/// Identifies one attachment subscription so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Callback invoked with the new state on every attachment change.
pub type AttachmentListener = Box<dyn Fn(AttachmentState) + Send + Sync>;

/// The display-tree node an animated label lives in.
///
/// Implementations must be cheap and non-blocking: every method is called
/// from animation worker threads. Listeners may be invoked from any thread.
pub trait Host: Send + Sync {
    /// Current attachment of this node.
    fn current_attachment(&self) -> AttachmentState;

    /// Register a listener for attachment changes.
    ///
    /// Several subscriptions may coexist.
    fn subscribe(&self, listener: AttachmentListener) -> SubscriptionId;

    /// Remove a listener registered with [`Host::subscribe`].
    ///
    /// Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);

    /// Display the lines of the newly current frame.
    fn render_frame(&self, lines: &[String]);

    /// Tell the layout pass how much room the largest frame needs.
    fn report_preferred_bounds(&self, size: Size);
}
