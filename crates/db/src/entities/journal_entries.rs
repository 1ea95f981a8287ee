//! `SeaORM` Entity for the journal entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{EntrySource, EntryStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    /// Assigned when the entry is posted; `None` for drafts.
    pub entry_number: Option<i64>,
    pub entry_date: Date,
    pub description: String,
    pub status: EntryStatus,
    pub source: EntrySource,
    pub recurring_definition_id: Option<Uuid>,
    /// For a reversing entry, the entry it voids.
    pub reverses_entry_id: Option<Uuid>,
    /// For a voided entry, the entry that reversed it.
    pub reversed_by_entry_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id"
    )]
    Companies,
    #[sea_orm(has_many = "super::journal_lines::Entity")]
    JournalLines,
    #[sea_orm(
        belongs_to = "super::recurring_definitions::Entity",
        from = "Column::RecurringDefinitionId",
        to = "super::recurring_definitions::Column::Id"
    )]
    RecurringDefinitions,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLines.def()
    }
}

impl Related<super::recurring_definitions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringDefinitions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
