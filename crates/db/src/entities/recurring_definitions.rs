//! `SeaORM` Entity for the recurring definitions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RecurringFrequency;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_definitions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    /// Unique per company.
    pub code: String,
    pub name: String,
    pub description: String,
    pub frequency: RecurringFrequency,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub next_execution_date: Date,
    pub is_active: bool,
    /// Post generated entries directly; when false they land as drafts
    /// awaiting manual confirmation.
    pub auto_posting: bool,
    pub execution_count: i64,
    pub success_count: i64,
    pub failure_count: i64,
    /// Lease expiry for the worker currently processing this definition.
    pub claimed_until: Option<DateTimeWithTimeZone>,
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
    #[sea_orm(has_many = "super::recurring_lines::Entity")]
    RecurringLines,
    #[sea_orm(has_many = "super::recurring_history::Entity")]
    RecurringHistory,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::recurring_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringLines.def()
    }
}

impl Related<super::recurring_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
