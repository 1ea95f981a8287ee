//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Business rules stay in `tally-core`; repositories load
//! the data those rules need and persist their results.

pub mod account;
pub mod journal;
pub mod recurring;

pub use account::{AccountRepository, CreateAccountInput};
pub use journal::{EntryWithLines, JournalRepository, PostEntryInput, VoidResult};
pub use recurring::{
    CreateDefinitionInput, DefinitionWithTemplate, RecurringRepository, TemplateLineInput,
};
