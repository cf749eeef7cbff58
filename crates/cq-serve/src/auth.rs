use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use cq_core::Actor;
use cq_core::types::enums::Role;
use cq_core::types::ids::UserId;

use crate::routes::error::ErrorEnvelope;

/// Caller identity, taken from headers set by the gateway after it has
/// verified the bearer token. Requests that reach this service without them
/// are rejected outright.
pub struct AuthActor(pub Actor);

const USER_HEADER: &str = "x-user-id";
const ROLE_HEADER: &str = "x-role";

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorEnvelope>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorEnvelope {
            code: "unauthorized",
            message: message.to_string(),
        }),
    )
}

impl<S> FromRequestParts<S> for AuthActor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorEnvelope>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("missing user identity"))?;
        let user_id = UserId::new(user_id.to_string())
            .map_err(|_| unauthorized("malformed user identity"))?;

        let role = match parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            None | Some("Citizen") => Role::Citizen,
            Some("Operator") => Role::Operator,
            Some("Admin") => Role::Admin,
            Some(_) => return Err(unauthorized("unknown role")),
        };

        Ok(AuthActor(Actor::new(user_id, role)))
    }
}
