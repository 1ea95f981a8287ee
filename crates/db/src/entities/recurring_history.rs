//! `SeaORM` Entity for the recurring execution history table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RecurringRunStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub definition_id: Uuid,
    /// The occurrence date this run covered. Unique per definition.
    pub scheduled_date: Date,
    pub executed_at: DateTimeWithTimeZone,
    pub status: RecurringRunStatus,
    pub entry_id: Option<Uuid>,
    pub error_message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recurring_definitions::Entity",
        from = "Column::DefinitionId",
        to = "super::recurring_definitions::Column::Id"
    )]
    RecurringDefinitions,
    #[sea_orm(
        belongs_to = "super::journal_entries::Entity",
        from = "Column::EntryId",
        to = "super::journal_entries::Column::Id"
    )]
    JournalEntries,
}

impl Related<super::recurring_definitions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringDefinitions.def()
    }
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
