//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::AppState;
use tally_core::ledger::LedgerError;
use tally_core::recurring::RecurringError;

pub mod accounts;
pub mod health;
pub mod recurring;
pub mod transactions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(recurring::routes())
}

/// Builds the standard error envelope.
pub(crate) fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": code, "message": message } })),
    )
        .into_response()
}

/// Company-scope violation: the path company is not the actor's company.
pub(crate) fn foreign_company() -> Response {
    error_response(
        StatusCode::FORBIDDEN,
        "FOREIGN_COMPANY",
        "The requested company is not accessible to this actor",
    )
}

/// Capability denial.
pub(crate) fn forbidden(message: &str) -> Response {
    error_response(StatusCode::FORBIDDEN, "FORBIDDEN", message)
}

/// Maps a ledger error to the envelope, hiding internals on 5xx.
pub(crate) fn ledger_error(err: &LedgerError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %err, "ledger operation failed");
        error_response(status, err.error_code(), "An internal error occurred")
    } else {
        error_response(status, err.error_code(), &err.to_string())
    }
}

/// Maps a recurring error to the envelope.
pub(crate) fn recurring_error(err: &RecurringError) -> Response {
    match err {
        RecurringError::DefinitionNotFound(_) => error_response(
            StatusCode::NOT_FOUND,
            "DEFINITION_NOT_FOUND",
            &err.to_string(),
        ),
        RecurringError::EmptyTemplate(_) => {
            error_response(StatusCode::BAD_REQUEST, "EMPTY_TEMPLATE", &err.to_string())
        }
        RecurringError::InactiveDefinition(_) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "INACTIVE_DEFINITION",
            &err.to_string(),
        ),
        RecurringError::ClaimContention => error_response(
            StatusCode::CONFLICT,
            "CLAIM_CONTENTION",
            &err.to_string(),
        ),
        RecurringError::TaxLookup { .. } => {
            error_response(StatusCode::BAD_GATEWAY, "TAX_LOOKUP", &err.to_string())
        }
        RecurringError::Ledger(inner) => ledger_error(inner),
        RecurringError::Database(_) => {
            tracing::error!(error = %err, "recurring operation failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "An internal error occurred",
            )
        }
    }
}
