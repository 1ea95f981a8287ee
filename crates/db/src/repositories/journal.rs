//! Journal repository for ledger posting database operations.
//!
//! All writes happen inside database transactions: an entry and its lines
//! are committed together or not at all. Entry numbers come from a
//! per-company counter row updated inside the same transaction, so the row
//! lock serializes concurrent postings per company.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select, SqlErr, Statement, TransactionTrait,
};
use uuid::Uuid;

use tally_core::balance::{BalanceEngine, PostedLineRef, RunningLedger};
use tally_core::ledger::{
    EntrySource, LedgerError, LineInput, PostedLine, PostingValidator, ReversalBuilder,
};
use tally_shared::types::{AccountId, CompanyId, JournalEntryId, RecurringDefinitionId, UserId};

use crate::entities::{
    fiscal_periods, journal_entries, journal_lines,
    sea_orm_active_enums::{EntrySource as DbEntrySource, EntryStatus, FiscalPeriodStatus},
};
use crate::repositories::account;

use sea_orm::Set;

fn db_err(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}

/// Maps a unique violation on the entry number index to the concurrency
/// error; everything else stays a database error.
fn map_write_err(err: DbErr) -> LedgerError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg))
            if msg.contains("uq_journal_entries_company_number") =>
        {
            LedgerError::ConcurrentNumberAssignment
        }
        _ => db_err(err),
    }
}

/// Input for posting a journal entry.
#[derive(Debug, Clone)]
pub struct PostEntryInput {
    /// Company posting the entry.
    pub company_id: CompanyId,
    /// Entry date; must fall in an open fiscal period to post.
    pub entry_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Lines; validated as a balanced set before anything is written.
    pub lines: Vec<LineInput>,
    /// Where the entry originated.
    pub source: EntrySource,
    /// The recurring definition that generated this entry, if any.
    pub recurring_definition_id: Option<RecurringDefinitionId>,
    /// User who created the entry.
    pub created_by: UserId,
}

/// An entry with its lines, as written.
#[derive(Debug, Clone)]
pub struct EntryWithLines {
    /// Entry header.
    pub entry: journal_entries::Model,
    /// Lines in order.
    pub lines: Vec<journal_lines::Model>,
}

/// Result of voiding an entry.
#[derive(Debug, Clone)]
pub struct VoidResult {
    /// The original entry, now marked void.
    pub voided: journal_entries::Model,
    /// The reversing entry that offsets it.
    pub reversing: EntryWithLines,
}

/// Journal repository for posting, promoting, voiding, and reading entries.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    numbering_retries: u32,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            numbering_retries: 3,
        }
    }

    /// Overrides the number of retries on entry number contention.
    #[must_use]
    pub const fn with_numbering_retries(mut self, retries: u32) -> Self {
        self.numbering_retries = retries;
        self
    }

    /// Validates and posts a journal entry atomically.
    ///
    /// The entry receives the next sequential number for its company. On
    /// number contention the posting is retried on a fresh transaction; the
    /// concurrency error surfaces only when retries exhaust.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the line set is rejected, a fiscal
    /// period error when the date is not in an open period, or a database
    /// error.
    pub async fn post_entry(&self, input: PostEntryInput) -> Result<EntryWithLines, LedgerError> {
        let mut attempt = 0;
        loop {
            let txn = self.db.begin().await.map_err(db_err)?;
            match self.post_in_txn(&txn, &input, false).await {
                Ok(result) => {
                    txn.commit().await.map_err(map_write_err)?;
                    return Ok(result);
                }
                Err(err) => {
                    txn.rollback().await.map_err(db_err)?;
                    if err.is_retryable() && attempt < self.numbering_retries {
                        attempt += 1;
                        tracing::warn!(attempt, "entry number contention, retrying posting");
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Validates and stores a draft entry.
    ///
    /// Drafts carry no entry number and are not gated by fiscal periods;
    /// both apply when the draft is promoted.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the line set is rejected, or a
    /// database error.
    pub async fn create_draft(&self, input: PostEntryInput) -> Result<EntryWithLines, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let result = self.post_in_txn(&txn, &input, true).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(result)
    }

    /// Promotes a draft to posted, assigning its entry number.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, `NotADraft`, a fiscal period error, or a
    /// database error.
    pub async fn promote_draft(
        &self,
        company_id: CompanyId,
        entry_id: JournalEntryId,
    ) -> Result<EntryWithLines, LedgerError> {
        let mut attempt = 0;
        loop {
            let txn = self.db.begin().await.map_err(db_err)?;
            match self.promote_in_txn(&txn, company_id, entry_id).await {
                Ok(result) => {
                    txn.commit().await.map_err(map_write_err)?;
                    return Ok(result);
                }
                Err(err) => {
                    txn.rollback().await.map_err(db_err)?;
                    if err.is_retryable() && attempt < self.numbering_retries {
                        attempt += 1;
                        tracing::warn!(attempt, "entry number contention, retrying promote");
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Voids a posted entry by creating a reversing entry.
    ///
    /// The original is never edited: a new entry with debits and credits
    /// swapped is posted, dated `void_date`, and both entries are linked.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, `CannotVoidUnposted`, a fiscal period error
    /// for the void date, or a database error.
    pub async fn void_entry(
        &self,
        company_id: CompanyId,
        entry_id: JournalEntryId,
        reason: &str,
        voided_by: UserId,
        void_date: NaiveDate,
    ) -> Result<VoidResult, LedgerError> {
        let mut attempt = 0;
        loop {
            let txn = self.db.begin().await.map_err(db_err)?;
            match self
                .void_in_txn(&txn, company_id, entry_id, reason, voided_by, void_date)
                .await
            {
                Ok(result) => {
                    txn.commit().await.map_err(map_write_err)?;
                    return Ok(result);
                }
                Err(err) => {
                    txn.rollback().await.map_err(db_err)?;
                    if err.is_retryable() && attempt < self.numbering_retries {
                        attempt += 1;
                        tracing::warn!(attempt, "entry number contention, retrying void");
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Loads an entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` or a database error.
    pub async fn get_entry(
        &self,
        company_id: CompanyId,
        entry_id: JournalEntryId,
    ) -> Result<EntryWithLines, LedgerError> {
        let entry = find_entry(&self.db, company_id, entry_id).await?;
        let lines = load_lines(&self.db, entry.id).await?;
        Ok(EntryWithLines { entry, lines })
    }

    /// Lists entries of a company, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_entries(
        &self,
        company_id: CompanyId,
        limit: u64,
    ) -> Result<Vec<journal_entries::Model>, LedgerError> {
        journal_entries::Entity::find()
            .filter(journal_entries::Column::CompanyId.eq(company_id.into_inner()))
            .order_by_desc(journal_entries::Column::EntryDate)
            .order_by_desc(journal_entries::Column::EntryNumber)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Computes the running ledger of one account over a date window.
    ///
    /// The opening balance is the signed sum of all posted lines strictly
    /// before `from`; rows are ordered by (date, entry number). Draft lines
    /// never appear; voided entries and their reversals both do.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or a database error.
    pub async fn account_ledger(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<RunningLedger, LedgerError> {
        let account = account::find_in(&self.db, company_id, account_id).await?;
        let normal = account.to_domain().account_type.normal_balance();

        let opening = match from {
            Some(from_date) => {
                let prior = ledger_lines(company_id, account_id)
                    .filter(journal_entries::Column::EntryDate.lt(from_date))
                    .into_model::<LedgerLineRow>()
                    .all(&self.db)
                    .await
                    .map_err(db_err)?;
                let prior: Vec<PostedLineRef> =
                    prior.into_iter().map(LedgerLineRow::into_domain).collect();
                BalanceEngine::opening_balance(normal, &prior)
            }
            None => Decimal::ZERO,
        };

        let mut window = ledger_lines(company_id, account_id);
        if let Some(from_date) = from {
            window = window.filter(journal_entries::Column::EntryDate.gte(from_date));
        }
        if let Some(to_date) = to {
            window = window.filter(journal_entries::Column::EntryDate.lte(to_date));
        }
        let rows = window
            .into_model::<LedgerLineRow>()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let rows: Vec<PostedLineRef> = rows.into_iter().map(LedgerLineRow::into_domain).collect();

        Ok(BalanceEngine::running_ledger(normal, opening, rows))
    }

    /// Validates the line set and writes the entry inside `txn`.
    ///
    /// Posted entries get a number and are gated by the fiscal period of
    /// their date; drafts skip both.
    pub(crate) async fn post_in_txn(
        &self,
        txn: &DatabaseTransaction,
        input: &PostEntryInput,
        as_draft: bool,
    ) -> Result<EntryWithLines, LedgerError> {
        let accounts = load_accounts(txn, &input.lines).await?;
        PostingValidator::validate(input.company_id, &input.lines, |id: AccountId| {
            accounts
                .get(&id.into_inner())
                .cloned()
                .ok_or(LedgerError::AccountNotFound(id.into_inner()))
        })?;

        let entry_number = if as_draft {
            None
        } else {
            require_open_period(txn, input.company_id, input.entry_date).await?;
            Some(allocate_entry_number(txn, input.company_id).await?)
        };

        let status = if as_draft {
            EntryStatus::Draft
        } else {
            EntryStatus::Posted
        };

        let now = Utc::now().into();
        let entry = journal_entries::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(input.company_id.into_inner()),
            entry_number: Set(entry_number),
            entry_date: Set(input.entry_date),
            description: Set(input.description.clone()),
            status: Set(status),
            source: Set(match input.source {
                EntrySource::Manual => DbEntrySource::Manual,
                EntrySource::Recurring => DbEntrySource::Recurring,
            }),
            recurring_definition_id: Set(input
                .recurring_definition_id
                .map(RecurringDefinitionId::into_inner)),
            reverses_entry_id: Set(None),
            reversed_by_entry_id: Set(None),
            created_by: Set(input.created_by.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let entry = entry.insert(txn).await.map_err(map_write_err)?;

        let lines = insert_lines(txn, entry.id, &input.lines).await?;
        Ok(EntryWithLines { entry, lines })
    }

    async fn promote_in_txn(
        &self,
        txn: &DatabaseTransaction,
        company_id: CompanyId,
        entry_id: JournalEntryId,
    ) -> Result<EntryWithLines, LedgerError> {
        let entry = find_entry(txn, company_id, entry_id).await?;
        if entry.status != EntryStatus::Draft {
            return Err(LedgerError::NotADraft);
        }

        require_open_period(txn, company_id, entry.entry_date).await?;
        let number = allocate_entry_number(txn, company_id).await?;

        let mut active: journal_entries::ActiveModel = entry.into();
        active.status = Set(EntryStatus::Posted);
        active.entry_number = Set(Some(number));
        active.updated_at = Set(Utc::now().into());
        let entry = active.update(txn).await.map_err(map_write_err)?;

        let lines = load_lines(txn, entry.id).await?;
        Ok(EntryWithLines { entry, lines })
    }

    async fn void_in_txn(
        &self,
        txn: &DatabaseTransaction,
        company_id: CompanyId,
        entry_id: JournalEntryId,
        reason: &str,
        voided_by: UserId,
        void_date: NaiveDate,
    ) -> Result<VoidResult, LedgerError> {
        let original = find_entry(txn, company_id, entry_id).await?;
        if original.status != EntryStatus::Posted {
            return Err(LedgerError::CannotVoidUnposted);
        }

        let original_lines = load_lines(txn, original.id).await?;
        let posted: Vec<PostedLine> = original_lines
            .iter()
            .map(|l| PostedLine {
                account_id: AccountId::from_uuid(l.account_id),
                debit: l.debit,
                credit: l.credit,
                tax_rate: l.tax_rate,
                memo: l.memo.clone(),
            })
            .collect();
        let reversal = ReversalBuilder::build(entry_id, &posted, reason);

        require_open_period(txn, company_id, void_date).await?;
        let number = allocate_entry_number(txn, company_id).await?;

        let now = Utc::now().into();
        let reversing = journal_entries::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(company_id.into_inner()),
            entry_number: Set(Some(number)),
            entry_date: Set(void_date),
            description: Set(reversal.description),
            status: Set(EntryStatus::Posted),
            source: Set(original.source.clone()),
            recurring_definition_id: Set(original.recurring_definition_id),
            reverses_entry_id: Set(Some(original.id)),
            reversed_by_entry_id: Set(None),
            created_by: Set(voided_by.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let reversing = reversing.insert(txn).await.map_err(map_write_err)?;
        let reversing_lines = insert_lines(txn, reversing.id, &reversal.lines).await?;

        let mut active: journal_entries::ActiveModel = original.into();
        active.status = Set(EntryStatus::Void);
        active.reversed_by_entry_id = Set(Some(reversing.id));
        active.updated_at = Set(now);
        let voided = active.update(txn).await.map_err(db_err)?;

        Ok(VoidResult {
            voided,
            reversing: EntryWithLines {
                entry: reversing,
                lines: reversing_lines,
            },
        })
    }
}

/// One ledger row as selected from the lines/entries join.
#[derive(Debug, FromQueryResult)]
struct LedgerLineRow {
    entry_id: Uuid,
    entry_number: i64,
    entry_date: NaiveDate,
    description: String,
    debit: Decimal,
    credit: Decimal,
}

impl LedgerLineRow {
    fn into_domain(self) -> PostedLineRef {
        PostedLineRef {
            entry_id: JournalEntryId::from_uuid(self.entry_id),
            entry_number: self.entry_number,
            entry_date: self.entry_date,
            description: self.description,
            debit: self.debit,
            credit: self.credit,
        }
    }
}

/// Base query for one account's non-draft lines joined with entry metadata.
fn ledger_lines(company_id: CompanyId, account_id: AccountId) -> Select<journal_lines::Entity> {
    journal_lines::Entity::find()
        .select_only()
        .column_as(journal_entries::Column::Id, "entry_id")
        .column_as(journal_entries::Column::EntryNumber, "entry_number")
        .column_as(journal_entries::Column::EntryDate, "entry_date")
        .column_as(journal_entries::Column::Description, "description")
        .column(journal_lines::Column::Debit)
        .column(journal_lines::Column::Credit)
        .join(
            JoinType::InnerJoin,
            journal_lines::Relation::JournalEntries.def(),
        )
        .filter(journal_lines::Column::AccountId.eq(account_id.into_inner()))
        .filter(journal_entries::Column::CompanyId.eq(company_id.into_inner()))
        .filter(journal_entries::Column::EntryNumber.is_not_null())
}

/// Loads the referenced accounts into a map keyed by id.
async fn load_accounts<C: ConnectionTrait>(
    conn: &C,
    lines: &[LineInput],
) -> Result<std::collections::HashMap<Uuid, tally_core::account::Account>, LedgerError> {
    let ids: Vec<Uuid> = lines.iter().map(|l| l.account_id.into_inner()).collect();
    let rows = crate::entities::accounts::Entity::find()
        .filter(crate::entities::accounts::Column::Id.is_in(ids))
        .all(conn)
        .await
        .map_err(db_err)?;
    Ok(rows.iter().map(|m| (m.id, m.to_domain())).collect())
}

/// The fiscal period covering `date` must exist and be open.
async fn require_open_period<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    date: NaiveDate,
) -> Result<fiscal_periods::Model, LedgerError> {
    let period = fiscal_periods::Entity::find()
        .filter(fiscal_periods::Column::CompanyId.eq(company_id.into_inner()))
        .filter(fiscal_periods::Column::StartDate.lte(date))
        .filter(fiscal_periods::Column::EndDate.gte(date))
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or(LedgerError::NoFiscalPeriod(date))?;

    if period.status == FiscalPeriodStatus::Closed {
        return Err(LedgerError::PeriodClosed);
    }
    Ok(period)
}

/// Takes the next sequential entry number for the company.
///
/// The counter row is seeded on first use; the UPDATE takes a row lock that
/// serializes concurrent postings for the same company until commit.
async fn allocate_entry_number(
    txn: &DatabaseTransaction,
    company_id: CompanyId,
) -> Result<i64, LedgerError> {
    txn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "INSERT INTO entry_counters (company_id, next_number) VALUES ($1, 1) \
         ON CONFLICT (company_id) DO NOTHING",
        [company_id.into_inner().into()],
    ))
    .await
    .map_err(db_err)?;

    let row = txn
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE entry_counters SET next_number = next_number + 1 \
             WHERE company_id = $1 RETURNING next_number - 1 AS entry_number",
            [company_id.into_inner().into()],
        ))
        .await
        .map_err(db_err)?
        .ok_or_else(|| LedgerError::Internal("entry counter row missing".to_string()))?;

    row.try_get("", "entry_number").map_err(db_err)
}

async fn insert_lines<C: ConnectionTrait>(
    conn: &C,
    entry_id: Uuid,
    lines: &[LineInput],
) -> Result<Vec<journal_lines::Model>, LedgerError> {
    let now = Utc::now().into();
    let mut written = Vec::with_capacity(lines.len());
    let mut order: i32 = 0;
    for line in lines {
        let model = journal_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            entry_id: Set(entry_id),
            account_id: Set(line.account_id.into_inner()),
            line_order: Set(order),
            debit: Set(line.debit),
            credit: Set(line.credit),
            tax_rate: Set(line.tax_rate),
            memo: Set(line.memo.clone()),
            created_at: Set(now),
        };
        written.push(model.insert(conn).await.map_err(db_err)?);
        order += 1;
    }
    Ok(written)
}

async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    entry_id: Uuid,
) -> Result<Vec<journal_lines::Model>, LedgerError> {
    journal_lines::Entity::find()
        .filter(journal_lines::Column::EntryId.eq(entry_id))
        .order_by_asc(journal_lines::Column::LineOrder)
        .all(conn)
        .await
        .map_err(db_err)
}

async fn find_entry<C: ConnectionTrait>(
    conn: &C,
    company_id: CompanyId,
    entry_id: JournalEntryId,
) -> Result<journal_entries::Model, LedgerError> {
    journal_entries::Entity::find_by_id(entry_id.into_inner())
        .filter(journal_entries::Column::CompanyId.eq(company_id.into_inner()))
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or(LedgerError::EntryNotFound(entry_id.into_inner()))
}
