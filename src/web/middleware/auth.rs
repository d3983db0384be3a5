use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose, Engine as _};
use cookie::Cookie;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ACCESS_TOKEN_COOKIE;
use crate::database::user_repo;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JwtPayload {
    jwt_id: String,
}

fn access_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|hv| hv.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
}

/// Reads the session id out of the JWT payload (middle part).
///
/// The signature is checked by the credential service that issued the token;
/// here the id only has to match a live session in `users.jwt_id`.
fn session_id(token: &str) -> Option<String> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .ok()?;
    let payload = serde_json::from_slice::<JwtPayload>(&payload_bytes).ok()?;
    Some(payload.jwt_id).filter(|id| !id.is_empty())
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(jwt_id) = access_token(&request).as_deref().and_then(session_id) else {
        debug!(path = %request.uri().path(), "request without a usable access token");
        return AppError::Unauthorized.into_response();
    };

    match user_repo::find_user_by_jwt_id(&state.pool, &jwt_id).await {
        Ok(Some(user)) => {
            request
                .extensions_mut()
                .insert(AuthenticatedUser { id: user.id });
            next.run(request).await
        }
        Ok(None) => {
            debug!("access token does not match a live session");
            AppError::Unauthorized.into_response()
        }
        Err(e) => {
            warn!("Session lookup failed: {}", e);
            AppError::Database(e).into_response()
        }
    }
}
