//! Actor Model: Worker threads that drive an animated label.
//!
//! Each running animation is made of two cooperating threads:
//! - **Coordination thread**: owns an [`AttachmentMonitor`] and sleeps until
//!   the host attaches or detaches
//! - **Ticker thread**: an [`AnimationScheduler`] that exists only while the
//!   host is attached and advances one frame per tick
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  attach / detach   ┌──────────────────┐
//! │     Host     │ ─────────────────▶ │ Coordination     │
//! └──────────────┘                    │ thread (monitor) │
//!        ▲                            └──────────────────┘
//!        │ render_frame                  │ start / stop
//!        │                               ▼
//!        │                            ┌──────────────────┐
//!        └─────────────────────────── │  Ticker thread   │
//!                                     └──────────────────┘
//! ```
//!
//! The [`AnimationController`] owns both and is the only public entry point
//! most callers need.

mod controller;
mod monitor;
mod scheduler;

pub use controller::{
    AnimationController, AnimationState, ControllerConfig, CLASSIC_SPINNER_FRAMES,
    CLASSIC_SPINNER_INTERVAL,
};
pub use monitor::AttachmentMonitor;
pub use scheduler::AnimationScheduler;
