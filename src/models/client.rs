use serde::Serialize;

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Client {
    pub id: i64,
    pub company_name: String,
    pub address: String,
    pub uid: Option<String>,
}
