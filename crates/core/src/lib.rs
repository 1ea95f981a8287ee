//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live
//! here.
//!
//! # Modules
//!
//! - `account` - Chart of accounts registry types
//! - `ledger` - Double-entry posting validation and reversal building
//! - `balance` - Running balance engine
//! - `recurring` - Recurring definition templates and schedule math
//! - `tax` - Tax snapshot provider contract
//! - `capability` - Role/tier capability gate

pub mod account;
pub mod balance;
pub mod capability;
pub mod ledger;
pub mod recurring;
pub mod tax;
