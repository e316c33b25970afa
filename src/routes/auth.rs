//! Login, logout and the session gate in front of everything else.

use std::sync::Arc;

use axum::Form;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tera::Context;

use crate::config::Config;
use crate::error::AppError;
use crate::render;
use crate::session;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

/// Check the credential pair against configuration.
pub fn verify(config: &Config, username: &str, password: &str) -> bool {
    ct_eq(username.as_bytes(), config.admin_username.as_bytes())
        & ct_eq(password.as_bytes(), config.admin_password.as_bytes())
}

/// Constant-time byte comparison so the response time leaks nothing about
/// how much of a guess matched.
fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Middleware guarding the protected routes: no live session, no handler.
pub async fn require_login(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(sid) = session::session_id(request.headers()) {
        if state.sessions.user_for(&sid).is_some() {
            return next.run(request).await;
        }
    }
    Redirect::to("/login").into_response()
}

pub async fn login_form(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let page = render::page(&state.templates, "login.html", &Context::new())?;
    Ok(page.into_response())
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if verify(&state.config, &form.username, &form.password) {
        let sid = state.sessions.create(&form.username);
        tracing::info!(user = %form.username, "login");
        let response = (
            [(SET_COOKIE, session::set_cookie(&sid))],
            Redirect::to("/"),
        );
        return Ok(response.into_response());
    }

    // Failed login re-renders the form in place, no redirect, no session.
    let mut ctx = Context::new();
    ctx.insert("error", "Invalid username or password");
    let page = render::page(&state.templates, "login.html", &ctx)?;
    Ok(page.into_response())
}

pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(sid) = session::session_id(&headers) {
        state.sessions.remove(&sid);
    }
    (
        [(SET_COOKIE, session::clear_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            database_url: String::new(),
            bind_addr: String::new(),
            admin_username: "admin".into(),
            admin_password: "geheim".into(),
            reset_sequence_each_year: true,
            invoice_city: "Wien".into(),
            session_ttl_minutes: 60,
        }
    }

    #[test]
    fn accepts_the_configured_pair() {
        assert!(verify(&config(), "admin", "geheim"));
    }

    #[test]
    fn rejects_anything_else() {
        let cfg = config();
        assert!(!verify(&cfg, "admin", "wrong"));
        assert!(!verify(&cfg, "root", "geheim"));
        assert!(!verify(&cfg, "", ""));
        assert!(!verify(&cfg, "admin", "geheim "));
    }
}
