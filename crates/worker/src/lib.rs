//! Timer primitives for the quire bridge.
//!
//! Wraps tokio's delayed and periodic primitives into cancellable handles:
//! * [`Scheduler`]: creates [`ScheduledTask`]s from one monotonic id clock
//! * [`ScheduledTask`]: a delayed or periodic callback, cancelled on drop
//! * [`Debouncer`]: restart-on-event slot for delay-and-coalesce scheduling
//!
//! Callbacks run on tokio tasks and receive their own [`TaskId`], which lets a
//! single-threaded owner post the fire into its inbox and drop it later if the
//! task was replaced in the meantime.

#![warn(missing_docs)]

mod class;
mod debounce;
mod spawn;
mod timer;
mod token;

pub use class::TaskClass;
pub use debounce::Debouncer;
pub use spawn::spawn;
pub use timer::{ScheduledTask, Scheduler, TaskKind};
pub use token::TaskId;
