//! Running balance engine.

mod engine;

pub use engine::{BalanceEngine, LedgerRow, PostedLineRef, RunningLedger};
