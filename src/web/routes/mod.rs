pub mod auth;
pub mod friendship;
pub mod post;
pub mod travel;
pub mod user;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::state::AppState;
use crate::web::middleware::auth as auth_middleware;

/// Every `/api` route. All but registration sit behind the session middleware.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/user/:id",
            get(user::get_user_handler)
                .patch(user::update_user_handler)
                .delete(user::delete_user_handler),
        )
        .route("/user/:id/stats", get(user::user_stats_handler))
        .route("/user/:id/index", get(user::user_feed_handler))
        .route(
            "/user/:id/travel",
            get(user::list_travels_handler).post(user::create_travel_handler),
        )
        .route(
            "/user/:id/friend",
            get(friendship::list_friends_handler).post(friendship::invite_friend_handler),
        )
        .route(
            "/user/:id/friend/search",
            get(friendship::search_friends_handler),
        )
        .route(
            "/friend/:id",
            patch(friendship::accept_friend_handler).delete(friendship::remove_friend_handler),
        )
        .route(
            "/travel/:id",
            get(travel::get_travel_handler)
                .patch(travel::update_travel_handler)
                .delete(travel::delete_travel_handler),
        )
        .route(
            "/travel/:id/post",
            get(travel::list_posts_handler).post(travel::create_post_handler),
        )
        .route(
            "/post/:id",
            get(post::get_post_handler)
                .patch(post::update_post_handler)
                .delete(post::delete_post_handler),
        )
        .route("/auth/logout", post(auth::logout_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_auth,
        ))
        .route("/user", post(user::create_user_handler));

    Router::new()
        .nest("/api", api)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
