//! Client CRUD handlers.

use std::sync::Arc;

use axum::Form;
use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use serde::Deserialize;
use tera::Context;

use crate::error::AppError;
use crate::render;
use crate::routes::non_blank;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ClientForm {
    company_name: String,
    address: String,
    #[serde(default)]
    uid: String,
}

pub async fn new_form(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    render::page(&state.templates, "client_new.html", &Context::new())
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ClientForm>,
) -> Result<Redirect, AppError> {
    state
        .db
        .create_client(&form.company_name, &form.address, non_blank(&form.uid))
        .await?;
    Ok(Redirect::to("/"))
}

pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let client = state
        .db
        .get_client(id)
        .await?
        .ok_or(AppError::NotFound("Client"))?;

    let mut ctx = Context::new();
    ctx.insert("client", &client);
    render::page(&state.templates, "client_edit.html", &ctx)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Form(form): Form<ClientForm>,
) -> Result<Redirect, AppError> {
    let found = state
        .db
        .update_client(id, &form.company_name, &form.address, non_blank(&form.uid))
        .await?;
    if !found {
        return Err(AppError::NotFound("Client"));
    }
    Ok(Redirect::to("/"))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    if !state.db.delete_client(id).await? {
        return Err(AppError::NotFound("Client"));
    }
    Ok(Redirect::to("/"))
}
