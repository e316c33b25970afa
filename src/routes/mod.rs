//! HTTP surface: router assembly and the dashboard.

pub mod auth;
pub mod clients;
pub mod invoices;

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::middleware;
use axum::response::Html;
use axum::routing::{get, post};
use tera::Context;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::render;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/", get(index))
        .route("/clients/new", get(clients::new_form))
        .route("/clients/create", post(clients::create))
        .route("/clients/{id}/edit", get(clients::edit_form))
        .route("/clients/{id}/update", post(clients::update))
        .route("/clients/{id}/delete", post(clients::delete))
        .route("/invoices/new", get(invoices::new_form))
        .route("/invoices/create", post(invoices::create))
        .route("/invoices/{id}", get(invoices::show))
        .route("/invoices/{id}/edit", get(invoices::edit_form))
        .route("/invoices/{id}/update", post(invoices::update))
        .route("/invoices/{id}/delete", post(invoices::delete))
        .route("/invoices/{id}/pdf", get(invoices::pdf))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_login,
        ));

    Router::new()
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .nest_service("/static", ServeDir::new("static"))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let invoices = state.db.list_invoices().await?;
    let clients = state.db.list_clients().await?;

    let mut ctx = Context::new();
    ctx.insert("invoices", &invoices);
    ctx.insert("clients", &clients);
    render::page(&state.templates, "index.html", &ctx)
}

/// Trimmed form value: empty or whitespace-only input becomes `None`.
pub(crate) fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
