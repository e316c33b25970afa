//! Invoice lifecycle handlers: create with nested items, show, edit with
//! wholesale item replacement, delete, PDF export.

use std::sync::Arc;

use axum::extract::{Path, RawForm, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::NaiveDate;
use tera::Context;

use crate::error::AppError;
use crate::render::{self, pdf};
use crate::routes::non_blank;
use crate::state::AppState;
use crate::totals::{ItemInput, parse_amount};

/// The invoice form decoded from its urlencoded body. The item columns come
/// in as repeated keys (`item_title=...&item_title=...`), one entry per form
/// row, which is why this is parsed by hand instead of through `Form`.
#[derive(Debug, Default)]
pub struct InvoiceForm {
    pub client_id: i64,
    pub date: Option<NaiveDate>,
    pub service_period: Option<String>,
    pub objekt: Option<String>,
    pub city: Option<String>,
    pub reverse_charge: bool,
    pub items: Vec<ItemInput>,
}

impl InvoiceForm {
    pub fn parse(body: &[u8]) -> Self {
        let mut form = Self::default();
        let mut titles: Vec<String> = Vec::new();
        let mut termins: Vec<String> = Vec::new();
        let mut quantities: Vec<String> = Vec::new();
        let mut unit_prices: Vec<String> = Vec::new();
        let mut nets: Vec<String> = Vec::new();

        for (key, value) in form_urlencoded::parse(body) {
            let value = value.into_owned();
            match key.as_ref() {
                "client_id" => form.client_id = value.trim().parse().unwrap_or(0),
                "date" => form.date = value.trim().parse().ok(),
                "service_period" => form.service_period = non_blank(&value).map(String::from),
                "objekt" => form.objekt = non_blank(&value).map(String::from),
                "city" => form.city = non_blank(&value).map(String::from),
                "reverse_charge" => {
                    form.reverse_charge = matches!(value.as_str(), "on" | "true" | "1")
                }
                "item_title" => titles.push(value),
                "item_termin" => termins.push(value),
                "item_quantity" => quantities.push(value),
                "item_unit_price" => unit_prices.push(value),
                "item_net" => nets.push(value),
                _ => {}
            }
        }

        let rows = titles
            .len()
            .max(termins.len())
            .max(quantities.len())
            .max(unit_prices.len())
            .max(nets.len());

        for i in 0..rows {
            let cell = |v: &[String]| v.get(i).map(|s| s.trim().to_string()).unwrap_or_default();

            let item = ItemInput {
                title: cell(&titles),
                termin: non_blank(&cell(&termins)).map(String::from),
                quantity: non_blank(&cell(&quantities)).map(parse_amount),
                unit_price: parse_amount(&cell(&unit_prices)),
                net: non_blank(&cell(&nets)).map(parse_amount),
            };
            // Rows the user added but left empty are dropped.
            if !item.is_blank() {
                form.items.push(item);
            }
        }

        form
    }
}

pub async fn new_form(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let clients = state.db.list_clients().await?;
    let company = state.db.get_company().await?;

    let mut ctx = Context::new();
    ctx.insert("clients", &clients);
    ctx.insert("company", &company);
    ctx.insert("today", &chrono::Local::now().date_naive());
    ctx.insert("default_city", &state.config.invoice_city);
    render::page(&state.templates, "invoice_new.html", &ctx)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    RawForm(body): RawForm,
) -> Result<Redirect, AppError> {
    let form = InvoiceForm::parse(&body);

    let client = state
        .db
        .get_client(form.client_id)
        .await?
        .ok_or(AppError::NotFound("Client"))?;

    let date = form.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let id = state
        .db
        .create_invoice_with_items(
            client.id,
            date,
            form.service_period.as_deref(),
            form.objekt.as_deref(),
            form.city.as_deref(),
            form.reverse_charge,
            state.config.reset_sequence_each_year,
            &form.items,
        )
        .await?;

    Ok(Redirect::to(&format!("/invoices/{id}")))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let (invoice, items, client, company) = load_invoice(&state, id).await?;

    let mut ctx = Context::new();
    ctx.insert("invoice", &invoice);
    ctx.insert("items", &items);
    ctx.insert("client", &client);
    ctx.insert("company", &company);
    render::page(&state.templates, "invoice_show.html", &ctx)
}

pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let (invoice, items, client, _) = load_invoice(&state, id).await?;

    let mut ctx = Context::new();
    ctx.insert("invoice", &invoice);
    ctx.insert("items", &items);
    ctx.insert("client", &client);
    render::page(&state.templates, "invoice_edit.html", &ctx)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    RawForm(body): RawForm,
) -> Result<Redirect, AppError> {
    let form = InvoiceForm::parse(&body);

    let found = state
        .db
        .update_invoice_with_items(
            id,
            form.service_period.as_deref(),
            form.reverse_charge,
            &form.items,
        )
        .await?;
    if !found {
        return Err(AppError::NotFound("Invoice"));
    }

    Ok(Redirect::to("/"))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    if !state.db.delete_invoice(id).await? {
        return Err(AppError::NotFound("Invoice"));
    }
    Ok(Redirect::to("/"))
}

pub async fn pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let (invoice, items, client, company) = load_invoice(&state, id).await?;

    let bytes = pdf::render_invoice(&company, &client, &invoice, &items)?;
    let headers = [
        (CONTENT_TYPE, "application/pdf".to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"invoice_{}.pdf\"", invoice.number),
        ),
    ];
    Ok((headers, bytes).into_response())
}

async fn load_invoice(
    state: &AppState,
    id: i64,
) -> Result<
    (
        crate::models::Invoice,
        Vec<crate::models::InvoiceItem>,
        crate::models::Client,
        crate::models::Company,
    ),
    AppError,
> {
    let invoice = state
        .db
        .get_invoice(id)
        .await?
        .ok_or(AppError::NotFound("Invoice"))?;
    let items = state.db.items_for_invoice(id).await?;
    let client = state
        .db
        .get_client(invoice.client_id)
        .await?
        .ok_or(AppError::NotFound("Client"))?;
    let company = state.db.get_company().await?;

    Ok((invoice, items, client, company))
}
