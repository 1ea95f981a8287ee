//! Transaction routes: posting, drafts, promotion, and voiding.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
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
use crate::routes::{error_response, foreign_company, forbidden, ledger_error};
use crate::AppState;
use tally_core::capability::Action;
use tally_core::ledger::{EntrySource, LineInput, LineSide};
use tally_db::repositories::journal::{EntryWithLines, JournalRepository, PostEntryInput};
use tally_shared::types::{AccountId, CompanyId, JournalEntryId};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/transactions", get(list_entries))
        .route("/companies/{company_id}/transactions", post(create_entry))
        .route(
            "/companies/{company_id}/transactions/{entry_id}",
            get(get_entry),
        )
        .route(
            "/companies/{company_id}/transactions/{entry_id}/post",
            post(promote_entry),
        )
        .route(
            "/companies/{company_id}/transactions/{entry_id}/void",
            post(void_entry),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a single line.
#[derive(Debug, Deserialize)]
pub struct CreateLineRequest {
    /// Account to post to.
    pub account_id: Uuid,
    /// "debit" or "credit".
    pub side: LineSide,
    /// Positive decimal amount as a string.
    pub amount: String,
    /// Optional fractional tax rate to freeze into the line.
    pub tax_rate: Option<String>,
    /// Optional memo.
    pub memo: Option<String>,
}

/// Request body for creating an entry.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    /// Entry date (YYYY-MM-DD).
    pub entry_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Lines; must balance.
    pub lines: Vec<CreateLineRequest>,
    /// Post directly (default) or store as a draft.
    #[serde(default = "default_post")]
    pub post: bool,
}

const fn default_post() -> bool {
    true
}

/// Request body for voiding an entry.
#[derive(Debug, Deserialize)]
pub struct VoidRequest {
    /// Reason recorded on the reversing entry.
    pub reason: String,
}

/// Query parameters for listing entries.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Maximum entries returned (default 50, capped at 200).
    pub limit: Option<u64>,
}

/// Serialized entry with lines.
#[derive(Debug, Serialize)]
struct EntryResponse {
    id: Uuid,
    entry_number: Option<i64>,
    entry_date: String,
    description: String,
    status: String,
    source: String,
    reverses_entry_id: Option<Uuid>,
    reversed_by_entry_id: Option<Uuid>,
    lines: Vec<LineResponse>,
}

/// Serialized line.
#[derive(Debug, Serialize)]
struct LineResponse {
    account_id: Uuid,
    debit: String,
    credit: String,
    tax_rate: Option<String>,
    memo: Option<String>,
}

fn entry_response(written: &EntryWithLines) -> EntryResponse {
    EntryResponse {
        id: written.entry.id,
        entry_number: written.entry.entry_number,
        entry_date: written.entry.entry_date.to_string(),
        description: written.entry.description.clone(),
        status: format!("{:?}", written.entry.status).to_lowercase(),
        source: format!("{:?}", written.entry.source).to_lowercase(),
        reverses_entry_id: written.entry.reverses_entry_id,
        reversed_by_entry_id: written.entry.reversed_by_entry_id,
        lines: written
            .lines
            .iter()
            .map(|l| LineResponse {
                account_id: l.account_id,
                debit: l.debit.to_string(),
                credit: l.credit.to_string(),
                tax_rate: l.tax_rate.map(|r| r.to_string()),
                memo: l.memo.clone(),
            })
            .collect(),
    }
}

fn parse_lines(requests: &[CreateLineRequest]) -> Result<Vec<LineInput>, axum::response::Response> {
    let mut lines = Vec::with_capacity(requests.len());
    for request in requests {
        let Ok(amount) = Decimal::from_str(&request.amount) else {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "INVALID_AMOUNT",
                &format!("'{}' is not a valid decimal amount", request.amount),
            ));
        };
        let tax_rate = match &request.tax_rate {
            Some(raw) => match Decimal::from_str(raw) {
                Ok(rate) => Some(rate),
                Err(_) => {
                    return Err(error_response(
                        StatusCode::BAD_REQUEST,
                        "INVALID_TAX_RATE",
                        &format!("'{raw}' is not a valid decimal rate"),
                    ));
                }
            },
            None => None,
        };

        let mut line = LineInput::new(AccountId::from_uuid(request.account_id), request.side, amount);
        line.tax_rate = tax_rate;
        line.memo.clone_from(&request.memo);
        lines.push(line);
    }
    Ok(lines)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/companies/{company_id}/transactions` - Post an entry or store a
/// draft, per the `post` flag.
async fn create_entry(
    State(state): State<AppState>,
    actor: Actor,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<CreateEntryRequest>,
) -> impl IntoResponse {
    let company_id = CompanyId::from_uuid(company_id);
    if !actor.in_company(company_id) {
        return foreign_company();
    }
    if !actor.may(state.gate.as_ref(), Action::PostEntry) {
        return forbidden("Posting requires the post_entry capability");
    }

    let lines = match parse_lines(&payload.lines) {
        Ok(lines) => lines,
        Err(response) => return response,
    };

    let repo = JournalRepository::new(state.db.clone())
        .with_numbering_retries(state.scheduler_config.numbering_retries);
    let input = PostEntryInput {
        company_id,
        entry_date: payload.entry_date,
        description: payload.description,
        lines,
        source: EntrySource::Manual,
        recurring_definition_id: None,
        created_by: actor.user_id,
    };

    let result = if payload.post {
        repo.post_entry(input).await
    } else {
        repo.create_draft(input).await
    };

    match result {
        Ok(written) => (
            StatusCode::CREATED,
            Json(json!({ "entry": entry_response(&written) })),
        )
            .into_response(),
        Err(err) => ledger_error(&err),
    }
}

/// GET `/companies/{company_id}/transactions` - List entries, newest first.
async fn list_entries(
    State(state): State<AppState>,
    actor: Actor,
    Path(company_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let company_id = CompanyId::from_uuid(company_id);
    if !actor.in_company(company_id) {
        return foreign_company();
    }
    if !actor.may(state.gate.as_ref(), Action::ViewLedger) {
        return forbidden("Ledger access denied");
    }

    let limit = query.limit.unwrap_or(50).min(200);
    let repo = JournalRepository::new(state.db.clone());
    match repo.list_entries(company_id, limit).await {
        Ok(entries) => (StatusCode::OK, Json(json!({ "entries": entries }))).into_response(),
        Err(err) => ledger_error(&err),
    }
}

/// GET `/companies/{company_id}/transactions/{entry_id}` - One entry with
/// its lines.
async fn get_entry(
    State(state): State<AppState>,
    actor: Actor,
    Path((company_id, entry_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let company_id = CompanyId::from_uuid(company_id);
    if !actor.in_company(company_id) {
        return foreign_company();
    }
    if !actor.may(state.gate.as_ref(), Action::ViewLedger) {
        return forbidden("Ledger access denied");
    }

    let repo = JournalRepository::new(state.db.clone());
    match repo
        .get_entry(company_id, JournalEntryId::from_uuid(entry_id))
        .await
    {
        Ok(written) => (
            StatusCode::OK,
            Json(json!({ "entry": entry_response(&written) })),
        )
            .into_response(),
        Err(err) => ledger_error(&err),
    }
}

/// POST `/companies/{company_id}/transactions/{entry_id}/post` - Promote a
/// draft, assigning its entry number.
async fn promote_entry(
    State(state): State<AppState>,
    actor: Actor,
    Path((company_id, entry_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let company_id = CompanyId::from_uuid(company_id);
    if !actor.in_company(company_id) {
        return foreign_company();
    }
    if !actor.may(state.gate.as_ref(), Action::PostEntry) {
        return forbidden("Posting requires the post_entry capability");
    }

    let repo = JournalRepository::new(state.db.clone())
        .with_numbering_retries(state.scheduler_config.numbering_retries);
    match repo
        .promote_draft(company_id, JournalEntryId::from_uuid(entry_id))
        .await
    {
        Ok(written) => (
            StatusCode::OK,
            Json(json!({ "entry": entry_response(&written) })),
        )
            .into_response(),
        Err(err) => ledger_error(&err),
    }
}

/// POST `/companies/{company_id}/transactions/{entry_id}/void` - Void a
/// posted entry with a reversing entry.
async fn void_entry(
    State(state): State<AppState>,
    actor: Actor,
    Path((company_id, entry_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<VoidRequest>,
) -> impl IntoResponse {
    let company_id = CompanyId::from_uuid(company_id);
    if !actor.in_company(company_id) {
        return foreign_company();
    }
    if !actor.may(state.gate.as_ref(), Action::VoidEntry) {
        return forbidden("Voiding requires the void_entry capability");
    }
    if payload.reason.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "MISSING_REASON",
            "A void reason is required",
        );
    }

    let repo = JournalRepository::new(state.db.clone())
        .with_numbering_retries(state.scheduler_config.numbering_retries);
    match repo
        .void_entry(
            company_id,
            JournalEntryId::from_uuid(entry_id),
            &payload.reason,
            actor.user_id,
            Utc::now().date_naive(),
        )
        .await
    {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "voided_entry_id": result.voided.id,
                "reversing_entry": entry_response(&result.reversing),
            })),
        )
            .into_response(),
        Err(err) => ledger_error(&err),
    }
}
