//! Chart of accounts and account ledger routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::extractors::Actor;
use crate::routes::{error_response, foreign_company, forbidden, ledger_error};
use crate::AppState;
use tally_core::capability::Action;
use tally_db::AccountRepository;
use tally_db::repositories::account::CreateAccountInput;
use tally_db::repositories::journal::JournalRepository;
use tally_shared::types::{AccountId, CompanyId};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/accounts", get(list_accounts))
        .route("/companies/{company_id}/accounts", post(create_account))
        .route(
            "/companies/{company_id}/accounts/{account_id}/ledger",
            get(account_ledger),
        )
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Account code, unique within the company.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification: asset, liability, equity, revenue, expense.
    pub account_type: tally_core::account::AccountType,
    /// Optional parent account.
    pub parent_id: Option<Uuid>,
    /// Header accounts group children and reject postings.
    #[serde(default)]
    pub is_header: bool,
}

/// Query parameters for the ledger window.
#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    /// Window start (inclusive); lines before it form the opening balance.
    pub from: Option<NaiveDate>,
    /// Window end (inclusive).
    pub to: Option<NaiveDate>,
}

/// One serialized ledger row.
#[derive(Debug, Serialize)]
struct LedgerRowResponse {
    date: String,
    entry_number: Option<i64>,
    description: String,
    debit: String,
    credit: String,
    running_balance: String,
}

/// POST `/companies/{company_id}/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    actor: Actor,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    let company_id = CompanyId::from_uuid(company_id);
    if !actor.in_company(company_id) {
        return foreign_company();
    }
    if !actor.may(state.gate.as_ref(), Action::PostEntry) {
        return forbidden("Account management requires posting permission");
    }

    let repo = AccountRepository::new(state.db.clone());
    let input = CreateAccountInput {
        company_id,
        code: payload.code,
        name: payload.name,
        account_type: payload.account_type,
        parent_id: payload.parent_id.map(AccountId::from_uuid),
        is_header: payload.is_header,
    };

    match repo.create(input).await {
        Ok(account) => (StatusCode::CREATED, Json(json!({ "account": account }))).into_response(),
        Err(err) => ledger_error(&err),
    }
}

/// GET `/companies/{company_id}/accounts` - List the chart of accounts.
async fn list_accounts(
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

    let repo = AccountRepository::new(state.db.clone());
    match repo.list(company_id).await {
        Ok(accounts) => (StatusCode::OK, Json(json!({ "accounts": accounts }))).into_response(),
        Err(err) => ledger_error(&err),
    }
}

/// GET `/companies/{company_id}/accounts/{account_id}/ledger` - Running
/// balance rows, preceded by a synthetic opening-balance row.
async fn account_ledger(
    State(state): State<AppState>,
    actor: Actor,
    Path((company_id, account_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<LedgerQuery>,
) -> impl IntoResponse {
    let company_id = CompanyId::from_uuid(company_id);
    if !actor.in_company(company_id) {
        return foreign_company();
    }
    if !actor.may(state.gate.as_ref(), Action::ViewLedger) {
        return forbidden("Ledger access denied");
    }

    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return error_response(
                StatusCode::BAD_REQUEST,
                "INVALID_WINDOW",
                "from must not be after to",
            );
        }
    }

    let repo = JournalRepository::new(state.db.clone());
    match repo
        .account_ledger(company_id, AccountId::from_uuid(account_id), query.from, query.to)
        .await
    {
        Ok(ledger) => {
            let mut rows = Vec::with_capacity(ledger.rows.len() + 1);
            rows.push(LedgerRowResponse {
                date: query
                    .from
                    .map_or_else(|| "opening".to_string(), |d| d.to_string()),
                entry_number: None,
                description: "Opening balance".to_string(),
                debit: "0".to_string(),
                credit: "0".to_string(),
                running_balance: ledger.opening_balance.to_string(),
            });
            for row in &ledger.rows {
                rows.push(LedgerRowResponse {
                    date: row.date.to_string(),
                    entry_number: Some(row.entry_number),
                    description: row.description.clone(),
                    debit: row.debit.to_string(),
                    credit: row.credit.to_string(),
                    running_balance: row.running_balance.to_string(),
                });
            }
            (
                StatusCode::OK,
                Json(json!({
                    "opening_balance": ledger.opening_balance.to_string(),
                    "closing_balance": ledger.closing_balance().to_string(),
                    "rows": rows,
                })),
            )
                .into_response()
        }
        Err(err) => ledger_error(&err),
    }
}
