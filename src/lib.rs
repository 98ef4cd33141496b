//! # Animated Label
//!
//! A label that cycles through text frames on a timer, but only while it is
//! part of a live display.
//!
//! The timer is started when the host node attaches and stopped the moment
//! it detaches, with no polling and no reliance on the label being dropped.
//! Detaching and re-attaching resumes the animation with no leaked threads.
//!
//! ## Core Concepts
//!
//! - **Frames**: ordered text blocks with a wrapping cursor and a running
//!   maximum of their bounds
//! - **Host**: the display-tree node, reached only through the [`Host`] trait
//! - **Actor model**: one coordination thread per run that sleeps until an
//!   attach or detach edge, plus one ticker thread while attached
//! - **Explicit lifecycle**: `Idle → Waiting → Running`, torn down
//!   deterministically by [`AnimationController::stop_animation`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use animated_label::{AnimationController, DisplayNode};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let node = Arc::new(DisplayNode::new());
//! let label = AnimationController::new(&node, "-");
//! label.add_frame("\\").add_frame("|").add_frame("/");
//! label.start_animation(Duration::from_millis(150))?;
//!
//! // Nothing ticks until the node is displayed
//! node.attach();
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod error;
pub mod frame;
pub mod host;
pub mod layout;
pub mod terminal;

// Re-exports for convenience
pub use actor::{
    AnimationController, AnimationScheduler, AnimationState, AttachmentMonitor, ControllerConfig,
    CLASSIC_SPINNER_FRAMES, CLASSIC_SPINNER_INTERVAL,
};
pub use error::{AnimationError, Result};
pub use frame::{Frame, FrameSequence};
pub use host::{AttachmentSignal, AttachmentState, DisplayNode, Host, SubscriptionId};
pub use layout::Size;
pub use terminal::TerminalHost;
