//! Job outcome histories and the DBP distance metric.
//!
//! Each (m,k)-firm task carries a window of its last `k` outcomes
//! (`true` = deadline met). The window is seeded from configuration,
//! updated once per job termination, and read by [`distance`] to decide
//! how close the task is to violating its contract.
//!
//! # Usage
//!
//! ```
//! use u_mkfirm::history::{Distance, HistoryTracker};
//! use u_mkfirm::models::Task;
//!
//! let task = Task::new(1, 10).with_firmness(2, 4).with_initial_sequence("1010");
//! let mut tracker = HistoryTracker::new();
//! assert_eq!(tracker.distance(&task), Distance::Finite(0));
//!
//! tracker.record_outcome(&task, true);
//! assert_eq!(tracker.distance(&task), Distance::Finite(1));
//! ```

mod distance;
mod seed;
mod tracker;
mod window;

pub use distance::{distance, Distance};
pub use seed::{normalize_seed, SeedSequence};
pub use tracker::HistoryTracker;
pub use window::History;
