//! Real-time scheduling domain models.
//!
//! Provides the data types the scheduling core reads and mutates.
//!
//! | Type | Owner | Lifetime |
//! |------|-------|----------|
//! | `Task` | workload model | whole run |
//! | `Job` | host engine | activation → termination |
//! | `Processor` | scheduler | whole run |

mod job;
mod processor;
mod task;

pub use job::{Job, JobId, JobState, Outcome};
pub use processor::{Processor, ProcessorId};
pub use task::{Criticality, Firmness, Task, TaskId};
