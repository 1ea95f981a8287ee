//! Actor extraction from gateway-injected identity headers.
//!
//! Requests arrive from a trusted gateway that authenticates the user and
//! injects `x-user-id`, `x-company-id`, `x-role`, and `x-tier`. The
//! extractor parses them into a typed [`Actor`]; missing or malformed
//! headers reject with the standard error envelope.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde_json::json;
use uuid::Uuid;

use tally_core::capability::{Action, CapabilityGate, Role, Tier};
use tally_shared::types::{CompanyId, UserId};

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    /// Acting user.
    pub user_id: UserId,
    /// Company the actor is operating in.
    pub company_id: CompanyId,
    /// Role within the company.
    pub role: Role,
    /// Subscription tier of the company.
    pub tier: Tier,
}

impl Actor {
    /// The actor may only touch its own company's resources.
    #[must_use]
    pub fn in_company(&self, company_id: CompanyId) -> bool {
        self.company_id == company_id
    }

    /// Checks the capability gate for an action.
    #[must_use]
    pub fn may(&self, gate: &dyn CapabilityGate, action: Action) -> bool {
        gate.is_allowed(self.role, self.tier, action)
    }
}

fn rejection(status: StatusCode, code: &str, message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        status,
        Json(json!({ "error": { "code": code, "message": message } })),
    )
}

fn header<'p>(
    parts: &'p Parts,
    name: &str,
) -> Result<&'p str, (StatusCode, Json<serde_json::Value>)> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            rejection(
                StatusCode::BAD_REQUEST,
                "MISSING_IDENTITY",
                &format!("Missing or malformed {name} header"),
            )
        })
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, "x-user-id")?
            .parse::<Uuid>()
            .map_err(|_| {
                rejection(
                    StatusCode::BAD_REQUEST,
                    "MISSING_IDENTITY",
                    "x-user-id is not a valid UUID",
                )
            })?;
        let company_id = header(parts, "x-company-id")?
            .parse::<Uuid>()
            .map_err(|_| {
                rejection(
                    StatusCode::BAD_REQUEST,
                    "MISSING_IDENTITY",
                    "x-company-id is not a valid UUID",
                )
            })?;
        let role = Role::parse(header(parts, "x-role")?).ok_or_else(|| {
            rejection(
                StatusCode::BAD_REQUEST,
                "UNKNOWN_ROLE",
                "x-role is not a recognized role",
            )
        })?;
        let tier = Tier::parse(header(parts, "x-tier")?).ok_or_else(|| {
            rejection(
                StatusCode::BAD_REQUEST,
                "UNKNOWN_TIER",
                "x-tier is not a recognized tier",
            )
        })?;

        Ok(Self {
            user_id: UserId::from_uuid(user_id),
            company_id: CompanyId::from_uuid(company_id),
            role,
            tier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_valid_headers_extract() {
        let user = Uuid::now_v7().to_string();
        let company = Uuid::now_v7().to_string();
        let mut parts = parts_with(&[
            ("x-user-id", &user),
            ("x-company-id", &company),
            ("x-role", "accountant"),
            ("x-tier", "business"),
        ]);

        let actor = Actor::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(actor.role, Role::Accountant);
        assert_eq!(actor.tier, Tier::Business);
        assert_eq!(actor.company_id.to_string(), company);
    }

    #[tokio::test]
    async fn test_missing_header_rejects() {
        let mut parts = parts_with(&[("x-user-id", &Uuid::now_v7().to_string())]);
        let result = Actor::from_request_parts(&mut parts, &()).await;
        let (status, _) = result.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_role_rejects() {
        let mut parts = parts_with(&[
            ("x-user-id", &Uuid::now_v7().to_string()),
            ("x-company-id", &Uuid::now_v7().to_string()),
            ("x-role", "superuser"),
            ("x-tier", "business"),
        ]);
        let result = Actor::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }
}
