//! Decision core for (m,k)-firm real-time scheduling.
//!
//! Every recurring task must meet at least `m` deadlines out of every `k`
//! consecutive jobs. At each scheduling instant this crate decides which
//! ready job runs on which processor, and whether a running job is
//! preempted. Time, job execution and job generation belong to the host
//! simulation engine, which drives the core through callbacks.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `Job`, `Processor`, `Firmness`, `Criticality`
//! - **`history`**: Outcome windows, seed normalization, and the DBP distance metric
//! - **`dispatching`**: The `PriorityPolicy` trait and the DBP / EDF / RMS policies
//! - **`scheduler`**: The shared dispatch framework and engine callback contract
//! - **`observer`**: Decision hooks (no-op, `tracing`, in-memory)
//! - **`config`**: JSON configuration of a scheduler and its task set
//! - **`validation`**: Host-side workload checks
//!
//! # Invariants
//!
//! - A job appears in the ready list at most once.
//! - Each history holds exactly `k` outcomes after initialization.
//! - Optional work never preempts mandatory work, under every policy.
//!
//! # References
//!
//! - Hamdaoui & Ramanathan (1995), "A Dynamic Priority Assignment Technique
//!   for Streams with (m,k)-Firm Deadlines"
//! - Goossens (2008), "(m,k)-firm constraints and DBP scheduling: impact of
//!   the initial k-sequence and exact schedulability test"

pub mod config;
pub mod dispatching;
pub mod history;
pub mod models;
pub mod observer;
pub mod scheduler;
pub mod validation;
