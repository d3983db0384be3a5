use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use cookie::{Cookie, SameSite};

use crate::config::ACCESS_TOKEN_COOKIE;
use crate::error::{AppError, AppResult};
use crate::services::user_service;
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

fn expired_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name.to_string(), "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.make_removal();
    cookie
}

/// Ends the session server side and tells the browser to drop the cookie.
pub async fn logout_handler(
    actor: Option<Extension<AuthenticatedUser>>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let actor = actor.ok_or(AppError::Unauthorized)?;
    user_service::end_session(&state.pool, &actor.id).await?;

    let mut response = StatusCode::NO_CONTENT.into_response();
    if let Ok(value) = HeaderValue::from_str(&expired_cookie(ACCESS_TOKEN_COOKIE).to_string()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    Ok(response)
}
