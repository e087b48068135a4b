//! Caller identity.
//!
//! Authentication happens upstream (the auth proxy terminates the session
//! and stamps the request with the user's id).  This module only resolves
//! that id against the directory; the single authorization rule of the
//! subsystem -- recipient-only mark-read -- lives in the store.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use vitrine_shared::constants::IDENTITY_HEADER;
use vitrine_shared::UserId;
use vitrine_store::{StoreError, User};

use crate::api::AppState;
use crate::error::ServerError;

/// The authenticated caller, resolved to a directory record.
pub struct AuthedUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(IDENTITY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ServerError::Unauthorized(format!("Missing {IDENTITY_HEADER} header"))
            })?;

        let id = UserId::parse(raw.trim()).map_err(|_| {
            ServerError::Unauthorized(format!("Malformed {IDENTITY_HEADER} header"))
        })?;

        let db = state.db.lock().await;
        match db.get_user(id) {
            Ok(user) => Ok(AuthedUser(user)),
            Err(StoreError::NotFound) => Err(ServerError::Unauthorized(format!(
                "Unknown caller: {id}"
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
