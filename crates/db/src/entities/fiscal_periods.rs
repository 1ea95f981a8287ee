//! `SeaORM` Entity for the fiscal periods table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::FiscalPeriodStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fiscal_periods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub status: FiscalPeriodStatus,
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
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row into the core domain fiscal period.
    #[must_use]
    pub fn to_domain(&self) -> tally_core::ledger::FiscalPeriod {
        use tally_core::ledger::PeriodStatus;
        use tally_shared::types::{CompanyId, FiscalPeriodId};

        tally_core::ledger::FiscalPeriod {
            id: FiscalPeriodId::from_uuid(self.id),
            company_id: CompanyId::from_uuid(self.company_id),
            name: self.name.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            status: match self.status {
                FiscalPeriodStatus::Open => PeriodStatus::Open,
                FiscalPeriodStatus::Closed => PeriodStatus::Closed,
            },
        }
    }
}
