//! Double-entry ledger posting logic.
//!
//! Validation of line sets, fiscal period gating, and reversal building.
//! Persistence lives in `tally-db`; everything here is pure.

pub mod error;
pub mod period;
pub mod reversal;
pub mod types;
pub mod validation;

pub use error::LedgerError;
pub use period::{FiscalPeriod, PeriodStatus};
pub use reversal::{PostedLine, Reversal, ReversalBuilder};
pub use types::{EntrySource, EntryStatus, LineInput, LineSide, PostingTotals};
pub use validation::PostingValidator;
