//! `SeaORM` Entity for the recurring template lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LineSide;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub definition_id: Uuid,
    pub account_id: Uuid,
    pub line_order: i32,
    pub side: LineSide,
    pub amount: Decimal,
    /// Resolved to a concrete rate at each execution.
    pub tax_rate_id: Option<Uuid>,
    pub memo: Option<String>,
    pub created_at: DateTimeWithTimeZone,
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
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::recurring_definitions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringDefinitions.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row into the core template line.
    #[must_use]
    pub fn to_domain(&self) -> tally_core::recurring::TemplateLine {
        use tally_shared::types::{AccountId, TaxRateId};

        tally_core::recurring::TemplateLine {
            account_id: AccountId::from_uuid(self.account_id),
            side: self.side.clone().into(),
            amount: self.amount,
            tax_rate_id: self.tax_rate_id.map(TaxRateId::from_uuid),
            memo: self.memo.clone(),
        }
    }
}
