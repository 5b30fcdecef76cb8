//! Reel materialization
//!
//! Turns a channel's template reel into the concrete programs that should
//! exist for a requested time window.
//!
//! # Modules
//!
//! - [`window`] - validated `[start, end]` windows in epoch milliseconds
//! - [`generator`] - one-shot filtering and epoch-anchored looping of reels
//! - [`ads`] - advertisement re-anchoring for looped instances
//! - [`error`] - schedule error taxonomy
//!
//! # Example
//!
//! ```
//! use reelsync::models::Program;
//! use reelsync::schedule::{ScheduleWindowGenerator, TimeWindow};
//!
//! let reel = vec![Program::new("P1", 0, 1000), Program::new("P2", 1000, 2500)];
//! let window = TimeWindow::new(500, 3000).unwrap();
//!
//! let programs = ScheduleWindowGenerator::new()
//!     .generate(42, &reel, true, window)
//!     .unwrap();
//! assert_eq!(programs.len(), 3);
//! assert_eq!(programs[2].start_time_ms, 2500);
//! ```
//!
//! The generator and shifter hold no state and can be shared freely
//! between threads.

pub mod ads;
pub mod error;
pub mod generator;
pub mod window;

pub use ads::{shift_advertisements, shift_program_ads};
pub use error::{ScheduleError, ScheduleResult};
pub use generator::ScheduleWindowGenerator;
pub use window::TimeWindow;
