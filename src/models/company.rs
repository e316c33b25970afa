use serde::Serialize;

/// The invoice issuer. Exactly one row, seeded at startup if absent.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub uid: Option<String>,
    pub employer_no: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub reverse_charge_note: Option<String>,
}
