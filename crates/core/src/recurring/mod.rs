//! Recurring transaction definitions and schedule math.
//!
//! A definition is a template that periodically generates a journal entry.
//! The pure parts live here: frequency advancement, template expansion with
//! frozen tax snapshots, and the per-instance state machine types. Claiming
//! and persistence live in `tally-db`.

pub mod error;
pub mod schedule;
pub mod template;
pub mod types;

pub use error::RecurringError;
pub use schedule::next_occurrence;
pub use template::expand_template;
pub use types::{Frequency, RunStatus, TemplateLine, TriggerOutcome};
