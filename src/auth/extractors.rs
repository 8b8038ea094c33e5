use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde_json::json;
use uuid::Uuid;

use super::claims::Claims;
use crate::state::AppState;

/// Extracts and validates the bearer JWT, yielding the caller's user ID.
pub struct AuthUser(pub Uuid);

#[derive(Debug)]
pub struct AuthRejection(&'static str);

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": self.0 }))).into_response()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthRejection("Missing Authorization header"))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(AuthRejection("Invalid auth scheme"))?;

        let cfg = &state.config.jwt;
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&cfg.audience));
        validation.set_issuer(std::slice::from_ref(&cfg.issuer));
        let decoding = DecodingKey::from_secret(cfg.secret.as_bytes());

        let data = decode::<Claims>(token, &decoding, &validation)
            .map_err(|_| AuthRejection("Invalid or expired token"))?;

        Ok(AuthUser(data.claims.sub))
    }
}
