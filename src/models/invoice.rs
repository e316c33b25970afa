use serde::Serialize;

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Invoice {
    pub id: i64,
    /// Human-readable number, `{year}{seq:04}`. Unique across all years.
    pub number: String,
    pub date: chrono::NaiveDate,
    pub service_period: Option<String>,
    pub objekt: Option<String>,
    pub city: Option<String>,
    /// Sequence within the invoice's calendar year.
    pub year_seq: i64,
    pub client_id: i64,
    pub company_id: i64,
    pub total_net: f64,
    pub reverse_charge: bool,
}

/// Dashboard row: invoice joined with its client's name.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct InvoiceListRow {
    pub id: i64,
    pub number: String,
    pub date: chrono::NaiveDate,
    pub total_net: f64,
    pub reverse_charge: bool,
    pub client_name: String,
}
