// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        analytics_handlers, auth_handlers, mw_admin, mw_auth, settings_handlers, user_handlers,
        weight_record_handlers,
    },
};
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Rotas Públicas ---
    let public_routes = Router::new()
        .route("/auth/login", post(auth_handlers::handle_login))
        .route("/auth/admin-login", post(auth_handlers::handle_admin_login))
        .route("/auth/user-login", post(auth_handlers::handle_user_login))
        .route("/auth/logout", post(auth_handlers::handle_logout));

    // --- Rotas de Admin ---
    // mw_auth é aplicado no router pai, portanto corre antes de mw_admin
    let admin_routes = Router::new()
        .route("/users", get(user_handlers::list_users).post(user_handlers::create_user))
        .route("/users/active", get(user_handlers::list_active_users))
        .route(
            "/users/{id}",
            patch(user_handlers::update_user).delete(user_handlers::delete_user),
        )
        .route("/analytics/daily-stats", get(analytics_handlers::daily_stats))
        .route("/earnings/users", get(analytics_handlers::all_users_earnings))
        .route(
            "/settings",
            get(settings_handlers::list_settings).put(settings_handlers::put_settings),
        )
        .route(
            "/settings/{key}",
            get(settings_handlers::get_setting).put(settings_handlers::put_setting),
        )
        .route_layer(middleware::from_fn(mw_admin::require_admin));

    // --- Rotas Autenticadas ---
    // Posse (admin ou o próprio) é verificada nos handlers
    let authenticated_routes = Router::new()
        .route("/auth/user", get(auth_handlers::current_user))
        .route("/users/{id}/stats", get(user_handlers::user_stats))
        .route(
            "/weight-records",
            get(weight_record_handlers::list_records).post(weight_record_handlers::create_record),
        )
        .route(
            "/weight-records/{id}",
            patch(weight_record_handlers::update_record).delete(weight_record_handlers::delete_record),
        )
        .route("/earnings/user/{user_id}", get(analytics_handlers::user_earnings))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    // --- Router Final ---
    Router::new()
        .nest("/api", public_routes.merge(authenticated_routes))
        .with_state(app_state)
}
