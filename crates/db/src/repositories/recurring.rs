//! Recurring definition repository and claim management.
//!
//! The claim is a lease: `claimed_until` on the definition row. A worker
//! claims a due definition with a conditional update and owns it until the
//! lease expires or the run completes. Completion writes the history row,
//! bumps the counters, advances the schedule, and clears the claim in one
//! transaction with the generated entry.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use uuid::Uuid;

use tally_core::recurring::{Frequency, RecurringError};
use tally_shared::types::{AccountId, CompanyId, RecurringDefinitionId, TaxRateId, UserId};

use crate::entities::{
    recurring_definitions, recurring_history, recurring_lines,
    sea_orm_active_enums::{LineSide as DbLineSide, RecurringRunStatus},
};

fn db_err(err: DbErr) -> RecurringError {
    RecurringError::Database(err.to_string())
}

/// Returns true when the error is the unique violation on
/// (definition, scheduled date) in history.
pub(crate) fn is_duplicate_run(err: &RecurringError) -> bool {
    matches!(err, RecurringError::Database(msg) if msg.contains("uq_recurring_history_occurrence"))
}

fn history_err(err: DbErr) -> RecurringError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg))
            if msg.contains("uq_recurring_history_occurrence") =>
        {
            RecurringError::Database(format!("uq_recurring_history_occurrence: {msg}"))
        }
        _ => db_err(err),
    }
}

/// Input for one template line.
#[derive(Debug, Clone)]
pub struct TemplateLineInput {
    /// Account to post to.
    pub account_id: AccountId,
    /// Debit or credit.
    pub side: tally_core::ledger::LineSide,
    /// Base amount before tax gross-up.
    pub amount: Decimal,
    /// Tax rate to snapshot at each execution, if tax-bearing.
    pub tax_rate_id: Option<TaxRateId>,
    /// Optional memo.
    pub memo: Option<String>,
}

/// Input for creating a recurring definition.
#[derive(Debug, Clone)]
pub struct CreateDefinitionInput {
    /// Owning company.
    pub company_id: CompanyId,
    /// Short code, unique per company.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Description copied onto generated entries.
    pub description: String,
    /// How often the definition fires.
    pub frequency: Frequency,
    /// First occurrence date.
    pub start_date: NaiveDate,
    /// Last date the definition may fire, if bounded.
    pub end_date: Option<NaiveDate>,
    /// Post generated entries directly; false leaves them as drafts.
    pub auto_posting: bool,
    /// Template lines.
    pub lines: Vec<TemplateLineInput>,
    /// Creating user.
    pub created_by: UserId,
}

/// A definition with its template lines.
#[derive(Debug, Clone)]
pub struct DefinitionWithTemplate {
    /// Definition row.
    pub definition: recurring_definitions::Model,
    /// Template lines in order.
    pub lines: Vec<recurring_lines::Model>,
}

/// Recurring definition repository.
#[derive(Debug, Clone)]
pub struct RecurringRepository {
    db: DatabaseConnection,
}

impl RecurringRepository {
    /// Creates a new recurring repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a definition with its template lines.
    ///
    /// The first occurrence is the start date.
    ///
    /// # Errors
    ///
    /// Returns `EmptyTemplate` for a definition without lines, a ledger
    /// error for non-positive amounts, or a database error.
    pub async fn create_definition(
        &self,
        input: CreateDefinitionInput,
    ) -> Result<DefinitionWithTemplate, RecurringError> {
        if input.lines.is_empty() {
            return Err(RecurringError::EmptyTemplate(Uuid::nil()));
        }
        for line in &input.lines {
            if line.amount <= Decimal::ZERO {
                return Err(tally_core::ledger::LedgerError::ZeroAmount.into());
            }
        }

        let txn = self.db.begin().await.map_err(db_err)?;
        let now = Utc::now().into();
        let definition = recurring_definitions::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(input.company_id.into_inner()),
            code: Set(input.code),
            name: Set(input.name),
            description: Set(input.description),
            frequency: Set(input.frequency.into()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            next_execution_date: Set(input.start_date),
            is_active: Set(true),
            auto_posting: Set(input.auto_posting),
            execution_count: Set(0),
            success_count: Set(0),
            failure_count: Set(0),
            claimed_until: Set(None),
            created_by: Set(input.created_by.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let definition = definition.insert(&txn).await.map_err(db_err)?;

        let mut lines = Vec::with_capacity(input.lines.len());
        let mut order: i32 = 0;
        for line in &input.lines {
            let model = recurring_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                definition_id: Set(definition.id),
                account_id: Set(line.account_id.into_inner()),
                line_order: Set(order),
                side: Set(match line.side {
                    tally_core::ledger::LineSide::Debit => DbLineSide::Debit,
                    tally_core::ledger::LineSide::Credit => DbLineSide::Credit,
                }),
                amount: Set(line.amount),
                tax_rate_id: Set(line.tax_rate_id.map(TaxRateId::into_inner)),
                memo: Set(line.memo.clone()),
                created_at: Set(now),
            };
            lines.push(model.insert(&txn).await.map_err(db_err)?);
            order += 1;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(DefinitionWithTemplate { definition, lines })
    }

    /// Loads a definition with its template, scoped to a company.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionNotFound` or a database error.
    pub async fn get_definition(
        &self,
        company_id: CompanyId,
        definition_id: RecurringDefinitionId,
    ) -> Result<DefinitionWithTemplate, RecurringError> {
        let definition = recurring_definitions::Entity::find_by_id(definition_id.into_inner())
            .filter(recurring_definitions::Column::CompanyId.eq(company_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(RecurringError::DefinitionNotFound(
                definition_id.into_inner(),
            ))?;
        let lines = load_template(&self.db, definition.id).await?;
        Ok(DefinitionWithTemplate { definition, lines })
    }

    /// Lists a company's definitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_definitions(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<recurring_definitions::Model>, RecurringError> {
        recurring_definitions::Entity::find()
            .filter(recurring_definitions::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_asc(recurring_definitions::Column::NextExecutionDate)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Activates or deactivates a definition.
    ///
    /// # Errors
    ///
    /// Returns `DefinitionNotFound` or a database error.
    pub async fn set_active(
        &self,
        company_id: CompanyId,
        definition_id: RecurringDefinitionId,
        is_active: bool,
    ) -> Result<recurring_definitions::Model, RecurringError> {
        let definition = recurring_definitions::Entity::find_by_id(definition_id.into_inner())
            .filter(recurring_definitions::Column::CompanyId.eq(company_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(RecurringError::DefinitionNotFound(
                definition_id.into_inner(),
            ))?;

        let mut active: recurring_definitions::ActiveModel = definition.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await.map_err(db_err)
    }

    /// Lists execution history for a definition, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn history(
        &self,
        definition_id: RecurringDefinitionId,
    ) -> Result<Vec<recurring_history::Model>, RecurringError> {
        recurring_history::Entity::find()
            .filter(recurring_history::Column::DefinitionId.eq(definition_id.into_inner()))
            .order_by_desc(recurring_history::Column::ExecutedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Finds definitions due at `today` and not under a live claim,
    /// optionally scoped to one company.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn due_definitions(
        &self,
        company_id: Option<CompanyId>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<recurring_definitions::Model>, RecurringError> {
        let mut query = recurring_definitions::Entity::find();
        if let Some(company_id) = company_id {
            query =
                query.filter(recurring_definitions::Column::CompanyId.eq(company_id.into_inner()));
        }
        query
            .filter(recurring_definitions::Column::IsActive.eq(true))
            .filter(recurring_definitions::Column::NextExecutionDate.lte(today))
            .filter(
                Condition::any()
                    .add(recurring_definitions::Column::ClaimedUntil.is_null())
                    .add(recurring_definitions::Column::ClaimedUntil.lt(now.fixed_offset())),
            )
            .order_by_asc(recurring_definitions::Column::NextExecutionDate)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Attempts to claim a definition until `lease_until`.
    ///
    /// The conditional update succeeds for exactly one caller; a false
    /// return means another worker holds the claim or the definition was
    /// deactivated in the meantime.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn claim(
        &self,
        definition_id: RecurringDefinitionId,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> Result<bool, RecurringError> {
        let result = recurring_definitions::Entity::update_many()
            .col_expr(
                recurring_definitions::Column::ClaimedUntil,
                Expr::value(Some(lease_until.fixed_offset())),
            )
            .col_expr(
                recurring_definitions::Column::UpdatedAt,
                Expr::value(now.fixed_offset()),
            )
            .filter(recurring_definitions::Column::Id.eq(definition_id.into_inner()))
            .filter(recurring_definitions::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(recurring_definitions::Column::ClaimedUntil.is_null())
                    .add(recurring_definitions::Column::ClaimedUntil.lt(now.fixed_offset())),
            )
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected == 1)
    }

    /// Records a successful run inside `txn`.
    ///
    /// Writes the SUCCESS history row, bumps the counters, advances
    /// the schedule, deactivates past the end date, and clears the claim.
    /// The unique (definition, scheduled date) index makes a duplicate run
    /// fail here, rolling back the generated entry with it.
    ///
    /// # Errors
    ///
    /// Returns a database error; a unique violation on the history index
    /// means this occurrence was already executed.
    pub(crate) async fn record_success(
        &self,
        txn: &DatabaseTransaction,
        definition: &recurring_definitions::Model,
        scheduled_date: NaiveDate,
        entry_id: Uuid,
        next_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(), RecurringError> {
        let history = recurring_history::ActiveModel {
            id: Set(Uuid::now_v7()),
            definition_id: Set(definition.id),
            scheduled_date: Set(scheduled_date),
            executed_at: Set(now.fixed_offset()),
            status: Set(RecurringRunStatus::Success),
            entry_id: Set(Some(entry_id)),
            error_message: Set(None),
        };
        history.insert(txn).await.map_err(history_err)?;

        self.advance(txn, definition, next_date, now, true).await
    }

    /// Records a failed run in its own transaction.
    ///
    /// The schedule still advances so one bad occurrence cannot wedge the
    /// definition; the failure is queryable in history.
    ///
    /// # Errors
    ///
    /// Returns a database error; a unique violation on the history index
    /// means this occurrence was already recorded.
    pub async fn record_failure(
        &self,
        definition: &recurring_definitions::Model,
        scheduled_date: NaiveDate,
        message: &str,
        next_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(), RecurringError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let history = recurring_history::ActiveModel {
            id: Set(Uuid::now_v7()),
            definition_id: Set(definition.id),
            scheduled_date: Set(scheduled_date),
            executed_at: Set(now.fixed_offset()),
            status: Set(RecurringRunStatus::Failed),
            entry_id: Set(None),
            error_message: Set(Some(message.to_string())),
        };
        history.insert(&txn).await.map_err(history_err)?;

        self.advance(&txn, definition, next_date, now, false).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    /// Clears the claim without recording anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn release_claim(
        &self,
        definition_id: RecurringDefinitionId,
    ) -> Result<(), RecurringError> {
        recurring_definitions::Entity::update_many()
            .col_expr(
                recurring_definitions::Column::ClaimedUntil,
                Expr::value(None::<chrono::DateTime<chrono::FixedOffset>>),
            )
            .filter(recurring_definitions::Column::Id.eq(definition_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Advances the schedule and clears the claim on the definition row.
    async fn advance(
        &self,
        txn: &DatabaseTransaction,
        definition: &recurring_definitions::Model,
        next_date: NaiveDate,
        now: DateTime<Utc>,
        succeeded: bool,
    ) -> Result<(), RecurringError> {
        let past_end = definition.end_date.is_some_and(|end| next_date > end);

        let mut active: recurring_definitions::ActiveModel = definition.clone().into();
        active.next_execution_date = Set(next_date);
        active.is_active = Set(definition.is_active && !past_end);
        active.claimed_until = Set(None);
        active.updated_at = Set(now.fixed_offset());
        active.execution_count = Set(definition.execution_count + 1);
        if succeeded {
            active.success_count = Set(definition.success_count + 1);
        } else {
            active.failure_count = Set(definition.failure_count + 1);
        }
        active.update(txn).await.map_err(db_err)?;
        Ok(())
    }
}

/// Loads the template lines of a definition in order.
pub(crate) async fn load_template<C: ConnectionTrait>(
    conn: &C,
    definition_id: Uuid,
) -> Result<Vec<recurring_lines::Model>, RecurringError> {
    recurring_lines::Entity::find()
        .filter(recurring_lines::Column::DefinitionId.eq(definition_id))
        .order_by_asc(recurring_lines::Column::LineOrder)
        .all(conn)
        .await
        .map_err(db_err)
}
