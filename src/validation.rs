//! Workload validation for (m,k)-firm task sets.
//!
//! The scheduling core normalizes every input instead of failing; this
//! module lets the host reject malformed workloads before they reach it.
//! Detects:
//! - Duplicate task IDs
//! - Non-positive periods or relative deadlines
//! - Window lengths below one
//! - Unsatisfiable contracts (`m > k`)
//! - Seed patterns with no binary digits

use std::collections::HashSet;
use std::fmt;

use crate::history::SeedSequence;
use crate::models::Task;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two tasks share the same ID.
    DuplicateId,
    /// Period is zero or negative.
    InvalidPeriod,
    /// Relative deadline is zero or negative.
    InvalidDeadline,
    /// `k` is below one.
    InvalidWindow,
    /// `m` exceeds `k`; no outcome sequence can satisfy the contract.
    UnsatisfiableContract,
    /// The seed pattern contains no usable outcome.
    EmptySeed,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a task set.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for task in tasks {
        if !ids.insert(task.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task ID: {}", task.id),
            ));
        }

        if task.period <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPeriod,
                format!("Task '{}' has non-positive period {}", task.id, task.period),
            ));
        }

        if task.relative_deadline <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDeadline,
                format!(
                    "Task '{}' has non-positive deadline {}",
                    task.id, task.relative_deadline
                ),
            ));
        }

        if task.firmness.k < 1 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWindow,
                format!("Task '{}' has window k = {}", task.id, task.firmness.k),
            ));
        }

        if !task.firmness.is_satisfiable() {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnsatisfiableContract,
                format!(
                    "Task '{}' requires {} successes in a window of {}",
                    task.id, task.firmness.m, task.firmness.k
                ),
            ));
        }

        if let Some(seed) = &task.initial_sequence {
            if seed_is_empty(seed) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::EmptySeed,
                    format!("Task '{}' has an initial sequence with no outcomes", task.id),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn seed_is_empty(seed: &SeedSequence) -> bool {
    match seed {
        SeedSequence::Pattern(pattern) => !pattern.chars().any(|c| c == '0' || c == '1'),
        SeedSequence::Values(values) => values.is_empty(),
        _ => false,
    }
}
