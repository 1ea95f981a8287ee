//! Recurring definition routes and the manual trigger.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use crate::extractors::Actor;
use crate::routes::{error_response, foreign_company, forbidden, recurring_error};
use crate::AppState;
use tally_core::capability::Action;
use tally_core::ledger::LineSide;
use tally_core::recurring::Frequency;
use tally_db::RecurringRepository;
use tally_db::repositories::recurring::{CreateDefinitionInput, TemplateLineInput};
use tally_shared::types::{AccountId, CompanyId, RecurringDefinitionId, TaxRateId};

/// Creates the recurring routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/recurring", get(list_definitions))
        .route("/companies/{company_id}/recurring", post(create_definition))
        .route(
            "/companies/{company_id}/recurring/trigger",
            post(trigger),
        )
        .route(
            "/companies/{company_id}/recurring/{definition_id}",
            get(get_definition),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a template line.
#[derive(Debug, Deserialize)]
pub struct TemplateLineRequest {
    /// Account to post to.
    pub account_id: Uuid,
    /// "debit" or "credit".
    pub side: LineSide,
    /// Positive decimal base amount as a string.
    pub amount: String,
    /// Tax rate id to snapshot at each execution.
    pub tax_rate_id: Option<Uuid>,
    /// Optional memo.
    pub memo: Option<String>,
}

/// Request body for creating a definition.
#[derive(Debug, Deserialize)]
pub struct CreateDefinitionRequest {
    /// Short code, unique per company.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Description copied onto generated entries.
    pub description: String,
    /// daily, weekly, monthly, quarterly, or annual.
    pub frequency: Frequency,
    /// First occurrence date.
    pub start_date: NaiveDate,
    /// Last date the definition may fire.
    pub end_date: Option<NaiveDate>,
    /// Post generated entries directly; false leaves them as drafts.
    #[serde(default = "default_auto_posting")]
    pub auto_posting: bool,
    /// Template lines.
    pub lines: Vec<TemplateLineRequest>,
}

/// Serialized definition summary.
#[derive(Debug, Serialize)]
struct DefinitionResponse {
    id: Uuid,
    code: String,
    name: String,
    description: String,
    frequency: String,
    start_date: String,
    end_date: Option<String>,
    next_execution_date: String,
    is_active: bool,
    auto_posting: bool,
    execution_count: i64,
    success_count: i64,
    failure_count: i64,
}

fn default_auto_posting() -> bool {
    true
}

fn definition_response(
    model: &tally_db::entities::recurring_definitions::Model,
) -> DefinitionResponse {
    DefinitionResponse {
        id: model.id,
        code: model.code.clone(),
        name: model.name.clone(),
        description: model.description.clone(),
        frequency: format!("{:?}", model.frequency).to_lowercase(),
        start_date: model.start_date.to_string(),
        end_date: model.end_date.map(|d| d.to_string()),
        next_execution_date: model.next_execution_date.to_string(),
        is_active: model.is_active,
        auto_posting: model.auto_posting,
        execution_count: model.execution_count,
        success_count: model.success_count,
        failure_count: model.failure_count,
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/companies/{company_id}/recurring` - Create a definition.
async fn create_definition(
    State(state): State<AppState>,
    actor: Actor,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<CreateDefinitionRequest>,
) -> impl IntoResponse {
    let company_id = CompanyId::from_uuid(company_id);
    if !actor.in_company(company_id) {
        return foreign_company();
    }
    if !actor.may(state.gate.as_ref(), Action::ManageRecurring) {
        return forbidden("Recurring automation requires the manage_recurring capability");
    }

    let mut lines = Vec::with_capacity(payload.lines.len());
    for line in &payload.lines {
        let Ok(amount) = Decimal::from_str(&line.amount) else {
            return error_response(
                StatusCode::BAD_REQUEST,
                "INVALID_AMOUNT",
                &format!("'{}' is not a valid decimal amount", line.amount),
            );
        };
        lines.push(TemplateLineInput {
            account_id: AccountId::from_uuid(line.account_id),
            side: line.side,
            amount,
            tax_rate_id: line.tax_rate_id.map(TaxRateId::from_uuid),
            memo: line.memo.clone(),
        });
    }

    let repo = RecurringRepository::new(state.db.clone());
    let input = CreateDefinitionInput {
        company_id,
        code: payload.code,
        name: payload.name,
        description: payload.description,
        frequency: payload.frequency,
        start_date: payload.start_date,
        end_date: payload.end_date,
        auto_posting: payload.auto_posting,
        lines,
        created_by: actor.user_id,
    };

    match repo.create_definition(input).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(json!({ "definition": definition_response(&created.definition) })),
        )
            .into_response(),
        Err(err) => recurring_error(&err),
    }
}

/// GET `/companies/{company_id}/recurring` - Definitions with counters.
async fn list_definitions(
    State(state): State<AppState>,
    actor: Actor,
    Path(company_id): Path<Uuid>,
) -> impl IntoResponse {
    let company_id = CompanyId::from_uuid(company_id);
    if !actor.in_company(company_id) {
        return foreign_company();
    }
    if !actor.may(state.gate.as_ref(), Action::ViewLedger) {
        return forbidden("Ledger access denied");
    }

    let repo = RecurringRepository::new(state.db.clone());
    match repo.list_definitions(company_id).await {
        Ok(definitions) => {
            let items: Vec<DefinitionResponse> =
                definitions.iter().map(definition_response).collect();
            (StatusCode::OK, Json(json!({ "definitions": items }))).into_response()
        }
        Err(err) => recurring_error(&err),
    }
}

/// GET `/companies/{company_id}/recurring/{definition_id}` - One definition
/// with its template and recent history.
async fn get_definition(
    State(state): State<AppState>,
    actor: Actor,
    Path((company_id, definition_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let company_id = CompanyId::from_uuid(company_id);
    if !actor.in_company(company_id) {
        return foreign_company();
    }
    if !actor.may(state.gate.as_ref(), Action::ViewLedger) {
        return forbidden("Ledger access denied");
    }

    let repo = RecurringRepository::new(state.db.clone());
    let definition_id = RecurringDefinitionId::from_uuid(definition_id);
    let found = match repo.get_definition(company_id, definition_id).await {
        Ok(found) => found,
        Err(err) => return recurring_error(&err),
    };
    let history = match repo.history(definition_id).await {
        Ok(history) => history,
        Err(err) => return recurring_error(&err),
    };

    (
        StatusCode::OK,
        Json(json!({
            "definition": definition_response(&found.definition),
            "template": found.lines,
            "history": history,
        })),
    )
        .into_response()
}

/// POST `/companies/{company_id}/recurring/trigger` - Execute every due
/// definition once. Always 200 when the batch ran; per-instance failures
/// are counters in the body.
async fn trigger(
    State(state): State<AppState>,
    actor: Actor,
    Path(company_id): Path<Uuid>,
) -> impl IntoResponse {
    let company_id = CompanyId::from_uuid(company_id);
    if !actor.in_company(company_id) {
        return foreign_company();
    }
    if !actor.may(state.gate.as_ref(), Action::TriggerRecurring) {
        return forbidden("Triggering requires the trigger_recurring capability");
    }

    match state.scheduler().trigger_for(company_id, Utc::now()).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "attempted": outcome.attempted,
                "succeeded": outcome.succeeded,
                "failed": outcome.failed,
            })),
        )
            .into_response(),
        Err(err) => recurring_error(&err),
    }
}
