//! Priority policies for (m,k)-firm scheduling.
//!
//! A policy supplies two orderings to the shared scheduling framework:
//! the **priority key** of a job (lower = more urgent) used to pick the
//! next ready job, and the **eviction key** of a running job (higher =
//! more eligible for preemption) used to pick the target processor.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use u_mkfirm::dispatching::{rules, PriorityPolicy};
//! use u_mkfirm::models::{Job, Task};
//!
//! let short = Arc::new(Task::new(1, 10));
//! let long = Arc::new(Task::new(2, 20));
//! let mut rms = rules::MkRms;
//!
//! let a = Job::activate(1, &short, 0);
//! let b = Job::activate(2, &long, 0);
//! assert!(rms.priority_key(&a) < rms.priority_key(&b));
//! ```
//!
//! # References
//!
//! - Hamdaoui & Ramanathan (1995), "A Dynamic Priority Assignment Technique
//!   for Streams with (m,k)-Firm Deadlines"
//! - Liu & Layland (1973), "Scheduling Algorithms for Multiprogramming in a
//!   Hard-Real-Time Environment"

pub mod rules;

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{Job, Task};

/// A pluggable priority ordering.
///
/// # Key Convention
/// **Lower priority key = more urgent.** Every built-in key starts with
/// the job's "is optional" flag, so mandatory work always sorts first.
/// **Higher eviction key = less urgent running job**, i.e. the better
/// preemption target.
///
/// Both methods take `&mut self` so stateful policies can initialize
/// per-task state on first access.
pub trait PriorityPolicy: Send + Debug {
    /// Total order over ready jobs.
    type Key: Ord + Debug;
    /// Order over running jobs for processor selection.
    type Eviction: Ord + Debug;

    /// Policy name (e.g., "MK_DBP").
    fn name(&self) -> &'static str;

    /// One-time setup before any job activity.
    fn init(&mut self, _tasks: &[Arc<Task>]) {}

    /// Urgency of a job. Lower = dispatched first.
    fn priority_key(&mut self, job: &Job) -> Self::Key;

    /// Preemption eligibility of a running job. Higher = evicted first.
    fn eviction_key(&mut self, running: &Job) -> Self::Eviction;

    /// Observes a job termination. Stateless policies ignore it.
    fn record_outcome(&mut self, _job: &Job) {}

    /// Policy description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Runtime selection of a built-in policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Distance-based priority.
    #[default]
    #[serde(alias = "mk_dbp")]
    Dbp,
    /// Earliest deadline first.
    #[serde(alias = "mk_edf")]
    Edf,
    /// Rate monotonic (shortest period first).
    #[serde(alias = "mk_rms")]
    Rms,
}

impl PolicyKind {
    /// Canonical name of the policy.
    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Dbp => "MK_DBP",
            PolicyKind::Edf => "MK_EDF",
            PolicyKind::Rms => "MK_RMS",
        }
    }
}

/// Error returned when a policy name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scheduling policy '{0}' (expected dbp, edf or rms)")]
pub struct UnknownPolicy(pub String);

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dbp" | "mk_dbp" => Ok(PolicyKind::Dbp),
            "edf" | "mk_edf" => Ok(PolicyKind::Edf),
            "rms" | "mk_rms" => Ok(PolicyKind::Rms),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}
