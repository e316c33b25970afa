use serde::Serialize;

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub title: String,
    /// Free-form schedule/description text shown next to the title.
    pub termin: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: f64,
    pub net: f64,
}
