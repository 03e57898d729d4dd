//! Recurring task model.
//!
//! A task is the static descriptor of a periodic workload: its period,
//! relative deadline, (m,k)-firm contract and criticality class. The
//! workload model owns tasks; the scheduling core only reads them.
//!
//! # Reference
//! Hamdaoui & Ramanathan (1995), "A Dynamic Priority Assignment Technique
//! for Streams with (m,k)-Firm Deadlines"

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::history::SeedSequence;

/// Stable identifier of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Criticality class of a task or job.
///
/// Optional work may never preempt mandatory work, under any policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    /// Must run; counts towards the (m,k) contract.
    #[default]
    Mandatory,
    /// Best-effort work.
    Optional,
}

impl Criticality {
    /// Whether this is mandatory work.
    pub fn is_mandatory(self) -> bool {
        self == Criticality::Mandatory
    }

    /// Whether this is optional work.
    pub fn is_optional(self) -> bool {
        self == Criticality::Optional
    }
}

/// An (m,k)-firm contract: at least `m` met deadlines among every `k`
/// consecutive job completions.
///
/// `m <= 0` disables the constraint. Values are stored as configured;
/// [`Firmness::window_len`] gives the normalized window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firmness {
    /// Required successes per window.
    pub m: i64,
    /// Window length.
    pub k: i64,
}

impl Firmness {
    /// Creates an (m,k) contract.
    pub fn new(m: i64, k: i64) -> Self {
        Self { m, k }
    }

    /// Window length used for history tracking: `max(1, k)`.
    pub fn window_len(&self) -> usize {
        self.k.max(1) as usize
    }

    /// Whether the contract imposes any requirement (`m > 0`).
    pub fn is_constrained(&self) -> bool {
        self.m > 0
    }

    /// Whether `m` successes can fit in a window at all.
    pub fn is_satisfiable(&self) -> bool {
        self.m <= self.k.max(1)
    }
}

impl Default for Firmness {
    fn default() -> Self {
        Self { m: 1, k: 1 }
    }
}

impl fmt::Display for Firmness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.m, self.k)
    }
}

/// A recurring real-time task.
///
/// # Time Representation
/// Periods and deadlines are integer ticks of the host engine's clock.
/// The core never advances time; it only compares these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Human-readable name.
    pub name: String,
    /// Activation period.
    pub period: i64,
    /// Deadline relative to each activation.
    pub relative_deadline: i64,
    /// (m,k)-firm contract.
    pub firmness: Firmness,
    /// Default criticality of the task's jobs.
    pub criticality: Criticality,
    /// Seed for the outcome history. `None` = a single success.
    pub initial_sequence: Option<SeedSequence>,
}

impl Task {
    /// Creates a mandatory task with an implicit deadline (deadline = period)
    /// and the default (1,1) contract.
    pub fn new(id: u32, period: i64) -> Self {
        Self {
            id: TaskId(id),
            name: format!("T{id}"),
            period,
            relative_deadline: period,
            firmness: Firmness::default(),
            criticality: Criticality::Mandatory,
            initial_sequence: None,
        }
    }

    /// Sets the task name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the relative deadline.
    pub fn with_deadline(mut self, relative_deadline: i64) -> Self {
        self.relative_deadline = relative_deadline;
        self
    }

    /// Sets the (m,k) contract.
    pub fn with_firmness(mut self, m: i64, k: i64) -> Self {
        self.firmness = Firmness::new(m, k);
        self
    }

    /// Sets the criticality class.
    pub fn with_criticality(mut self, criticality: Criticality) -> Self {
        self.criticality = criticality;
        self
    }

    /// Marks the task's jobs as optional by default.
    pub fn optional(self) -> Self {
        self.with_criticality(Criticality::Optional)
    }

    /// Sets the initial history seed.
    pub fn with_initial_sequence(mut self, seed: impl Into<SeedSequence>) -> Self {
        self.initial_sequence = Some(seed.into());
        self
    }
}
