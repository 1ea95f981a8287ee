//! Recurring transaction scheduler.
//!
//! `trigger()` finds due definitions, claims each with a lease, and executes
//! them independently. One failing instance never aborts the batch: its
//! failure is recorded in history and the schedule advances, while the
//! generated entry, the history row, the counters, and the claim release of
//! a successful instance commit in a single transaction. The unique
//! (definition, scheduled date) history index makes duplicate triggers
//! harmless.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use tally_core::ledger::EntrySource;
use tally_core::recurring::{
    RecurringError, TemplateLine, TriggerOutcome, expand_template, next_occurrence,
};
use tally_core::tax::{TaxError, TaxRateProvider};
use tally_shared::config::SchedulerConfig;
use tally_shared::types::{
    CompanyId, JournalEntryId, RecurringDefinitionId, TaxRateId, UserId,
};

use crate::entities::recurring_definitions;
use crate::repositories::journal::{JournalRepository, PostEntryInput};
use crate::repositories::recurring::{self, RecurringRepository};

fn db_err(err: sea_orm::DbErr) -> RecurringError {
    RecurringError::Database(err.to_string())
}

/// Executes due recurring definitions on demand.
#[derive(Clone)]
pub struct Scheduler {
    db: DatabaseConnection,
    journal: JournalRepository,
    recurring: RecurringRepository,
    tax: Arc<dyn TaxRateProvider>,
    claim_lease: Duration,
}

impl Scheduler {
    /// Creates a scheduler over the shared connection pool.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        tax: Arc<dyn TaxRateProvider>,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            journal: JournalRepository::new(db.clone())
                .with_numbering_retries(config.numbering_retries),
            recurring: RecurringRepository::new(db.clone()),
            db,
            tax,
            claim_lease: Duration::from_secs(config.claim_lease_secs),
        }
    }

    /// Executes every due definition once and reports the aggregate.
    ///
    /// # Errors
    ///
    /// Returns an error if the due-definition query fails.
    pub async fn trigger(&self, now: DateTime<Utc>) -> Result<TriggerOutcome, RecurringError> {
        self.trigger_scoped(None, now).await
    }

    /// Executes one company's due definitions once and reports the
    /// aggregate.
    ///
    /// # Errors
    ///
    /// Returns an error if the due-definition query fails.
    pub async fn trigger_for(
        &self,
        company_id: CompanyId,
        now: DateTime<Utc>,
    ) -> Result<TriggerOutcome, RecurringError> {
        self.trigger_scoped(Some(company_id), now).await
    }

    /// Per-instance failures are data in the outcome, not errors; only a
    /// failure to even list the due definitions escapes.
    async fn trigger_scoped(
        &self,
        company_id: Option<CompanyId>,
        now: DateTime<Utc>,
    ) -> Result<TriggerOutcome, RecurringError> {
        let today = now.date_naive();
        let due = self.recurring.due_definitions(company_id, today, now).await?;

        let mut outcome = TriggerOutcome::default();
        for definition in due {
            let definition_id = RecurringDefinitionId::from_uuid(definition.id);
            let lease_until = now
                + chrono::Duration::from_std(self.claim_lease)
                    .unwrap_or_else(|_| chrono::Duration::seconds(300));

            match self.recurring.claim(definition_id, now, lease_until).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(%definition_id, "definition claimed elsewhere, skipping");
                    continue;
                }
                Err(err) => {
                    tracing::warn!(%definition_id, error = %err, "claim failed, skipping");
                    continue;
                }
            }

            let scheduled_date = definition.next_execution_date;
            match self.execute_instance(&definition, now).await {
                Ok(entry_id) => {
                    tracing::info!(%definition_id, %scheduled_date, %entry_id, "recurring instance executed");
                    outcome.record_success();
                }
                Err(err) if recurring::is_duplicate_run(&err) => {
                    // Another trigger already ran this occurrence; its
                    // transaction advanced the schedule and cleared the claim.
                    tracing::debug!(%definition_id, %scheduled_date, "occurrence already executed");
                }
                Err(err) => {
                    tracing::warn!(%definition_id, %scheduled_date, error = %err, "recurring instance failed");
                    self.record_failure(&definition, &err, now).await;
                    outcome.record_failure();
                }
            }
        }

        tracing::info!(
            attempted = outcome.attempted,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "recurring trigger complete"
        );
        Ok(outcome)
    }

    /// Runs one claimed definition: expand, post, record, advance.
    async fn execute_instance(
        &self,
        definition: &recurring_definitions::Model,
        now: DateTime<Utc>,
    ) -> Result<JournalEntryId, RecurringError> {
        let scheduled_date = definition.next_execution_date;
        let definition_id = RecurringDefinitionId::from_uuid(definition.id);

        let template: Vec<TemplateLine> = recurring::load_template(&self.db, definition.id)
            .await?
            .iter()
            .map(crate::entities::recurring_lines::Model::to_domain)
            .collect();

        let rates = self.resolve_rates(&template, scheduled_date).await?;
        let lines = expand_template(definition_id, &template, |id: TaxRateId| {
            rates
                .get(&id)
                .copied()
                .ok_or_else(|| RecurringError::TaxLookup {
                    tax_rate_id: id.into_inner(),
                    message: "rate not prefetched".to_string(),
                })
        })?;

        let input = PostEntryInput {
            company_id: CompanyId::from_uuid(definition.company_id),
            entry_date: scheduled_date,
            description: definition.description.clone(),
            lines,
            source: EntrySource::Recurring,
            recurring_definition_id: Some(definition_id),
            created_by: UserId::from_uuid(definition.created_by),
        };

        let next_date = next_occurrence(scheduled_date, definition.frequency.clone().into());

        let txn = self.db.begin().await.map_err(db_err)?;
        let written = self
            .journal
            .post_in_txn(&txn, &input, !definition.auto_posting)
            .await
            .map_err(RecurringError::from)?;
        self.recurring
            .record_success(&txn, definition, scheduled_date, written.entry.id, next_date, now)
            .await?;
        txn.commit().await.map_err(db_err)?;

        Ok(JournalEntryId::from_uuid(written.entry.id))
    }

    /// Resolves every distinct tax rate the template references.
    async fn resolve_rates(
        &self,
        template: &[TemplateLine],
        as_of: chrono::NaiveDate,
    ) -> Result<HashMap<TaxRateId, Decimal>, RecurringError> {
        let mut rates = HashMap::new();
        for tax_rate_id in template.iter().filter_map(|l| l.tax_rate_id) {
            if rates.contains_key(&tax_rate_id) {
                continue;
            }
            let rate = self
                .tax
                .rate_for(tax_rate_id, as_of)
                .await
                .map_err(|err| tax_err(tax_rate_id.into_inner(), &err))?;
            rates.insert(tax_rate_id, rate);
        }
        Ok(rates)
    }

    /// Writes the FAILED history row and advances the schedule.
    ///
    /// Best effort: if even this write fails, the lease expiry frees the
    /// definition for the next trigger.
    async fn record_failure(
        &self,
        definition: &recurring_definitions::Model,
        err: &RecurringError,
        now: DateTime<Utc>,
    ) {
        let scheduled_date = definition.next_execution_date;
        let next_date = next_occurrence(scheduled_date, definition.frequency.clone().into());

        if let Err(record_err) = self
            .recurring
            .record_failure(definition, scheduled_date, &err.to_string(), next_date, now)
            .await
        {
            tracing::error!(
                definition_id = %definition.id,
                error = %record_err,
                "failed to record recurring failure"
            );
        }
    }
}

fn tax_err(tax_rate_id: Uuid, err: &TaxError) -> RecurringError {
    RecurringError::TaxLookup {
        tax_rate_id,
        message: err.to_string(),
    }
}
