//! Account repository for chart of accounts database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use tally_core::ledger::LedgerError;
use tally_shared::types::{AccountId, CompanyId};

use crate::entities::accounts;

fn db_err(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Owning company.
    pub company_id: CompanyId,
    /// Account code, unique within the company.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account classification.
    pub account_type: tally_core::account::AccountType,
    /// Optional parent for hierarchy display.
    pub parent_id: Option<AccountId>,
    /// Header accounts group children and reject postings.
    pub is_header: bool,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account in the company's chart.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(&self, input: CreateAccountInput) -> Result<accounts::Model, LedgerError> {
        let now = Utc::now().into();

        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(input.company_id.into_inner()),
            code: Set(input.code),
            name: Set(input.name),
            account_type: Set(input.account_type.into()),
            parent_id: Set(input.parent_id.map(AccountId::into_inner)),
            is_header: Set(input.is_header),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        account.insert(&self.db).await.map_err(db_err)
    }

    /// Finds an account by id within a company.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` when no matching row exists.
    pub async fn find(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<accounts::Model, LedgerError> {
        find_in(&self.db, company_id, account_id).await
    }

    /// Lists all accounts of a company ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list(&self, company_id: CompanyId) -> Result<Vec<accounts::Model>, LedgerError> {
        accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Deactivates an account. Existing postings are unaffected.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` when no matching row exists.
    pub async fn deactivate(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<accounts::Model, LedgerError> {
        let account = find_in(&self.db, company_id, account_id).await?;

        let mut active: accounts::ActiveModel = account.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await.map_err(db_err)
    }
}

/// Finds an account on any connection, scoped to a company.
pub(crate) async fn find_in<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    account_id: AccountId,
) -> Result<accounts::Model, LedgerError> {
    accounts::Entity::find_by_id(account_id.into_inner())
        .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or(LedgerError::AccountNotFound(account_id.into_inner()))
}
