use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::config::{CompanySeed, Config};
use crate::models::{Client, Company, Invoice, InvoiceItem, InvoiceListRow};
use crate::numbering;
use crate::totals::{self, ItemInput};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    address TEXT NOT NULL,
    uid TEXT,
    employer_no TEXT,
    email TEXT,
    website TEXT,
    reverse_charge_note TEXT
);

CREATE TABLE IF NOT EXISTS clients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    company_name TEXT NOT NULL,
    address TEXT NOT NULL,
    uid TEXT
);

CREATE TABLE IF NOT EXISTS invoices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    number TEXT NOT NULL UNIQUE,
    date TEXT NOT NULL,
    service_period TEXT,
    objekt TEXT,
    city TEXT,
    year_seq INTEGER NOT NULL DEFAULT 0,
    client_id INTEGER NOT NULL REFERENCES clients(id),
    company_id INTEGER NOT NULL REFERENCES companies(id),
    total_net REAL NOT NULL DEFAULT 0,
    reverse_charge INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS invoice_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    invoice_id INTEGER NOT NULL REFERENCES invoices(id),
    title TEXT NOT NULL,
    termin TEXT,
    quantity REAL,
    unit_price REAL NOT NULL DEFAULT 0,
    net REAL NOT NULL DEFAULT 0
);
"#;

/// Database connection pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new Database instance with a connection pool and ensure the
    /// schema exists.
    pub async fn new(database_url: &str) -> Result<Self> {
        // An in-memory database exists per connection; a second connection
        // would see an empty schema.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .with_context(|| format!("connecting to {database_url}"))?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    // Company operations

    /// Insert the issuer row on first startup; later startups keep the
    /// (possibly edited) existing row.
    pub async fn seed_company(&self, seed: &CompanySeed) -> Result<Company> {
        if let Some(existing) =
            sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY id LIMIT 1")
                .fetch_optional(&self.pool)
                .await?
        {
            return Ok(existing);
        }

        sqlx::query(
            r#"
            INSERT INTO companies (name, address, uid, employer_no, email, website, reverse_charge_note)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(seed.name)
        .bind(seed.address)
        .bind(seed.uid)
        .bind(seed.employer_no)
        .bind(seed.email)
        .bind(seed.website)
        .bind(seed.reverse_charge_note)
        .execute(&self.pool)
        .await?;

        self.get_company().await
    }

    pub async fn get_company(&self) -> Result<Company> {
        let company =
            sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY id LIMIT 1")
                .fetch_optional(&self.pool)
                .await?
                .context("company row missing; database was not seeded")?;

        Ok(company)
    }

    // Client operations

    pub async fn list_clients(&self) -> Result<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients ORDER BY company_name COLLATE NOCASE ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    pub async fn get_client(&self, id: i64) -> Result<Option<Client>> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    pub async fn create_client(
        &self,
        company_name: &str,
        address: &str,
        uid: Option<&str>,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO clients (company_name, address, uid) VALUES (?1, ?2, ?3)",
        )
        .bind(company_name)
        .bind(address)
        .bind(uid)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Returns false when no client with this id exists.
    pub async fn update_client(
        &self,
        id: i64,
        company_name: &str,
        address: &str,
        uid: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE clients SET company_name = ?1, address = ?2, uid = ?3 WHERE id = ?4",
        )
        .bind(company_name)
        .bind(address)
        .bind(uid)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a client together with its invoices and their line items.
    pub async fn delete_client(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM invoice_items WHERE invoice_id IN (SELECT id FROM invoices WHERE client_id = ?1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM invoices WHERE client_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    // Invoice operations

    pub async fn list_invoices(&self) -> Result<Vec<InvoiceListRow>> {
        let invoices = sqlx::query_as::<_, InvoiceListRow>(
            r#"
            SELECT
                i.id,
                i.number,
                i.date,
                i.total_net,
                i.reverse_charge,
                c.company_name AS client_name
            FROM invoices i
            JOIN clients c ON c.id = i.client_id
            ORDER BY i.date DESC, i.number DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    pub async fn get_invoice(&self, id: i64) -> Result<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    pub async fn items_for_invoice(&self, invoice_id: i64) -> Result<Vec<InvoiceItem>> {
        let items = sqlx::query_as::<_, InvoiceItem>(
            "SELECT * FROM invoice_items WHERE invoice_id = ?1 ORDER BY id ASC",
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Derive the next invoice number for `date`.
    ///
    /// Read-then-write: a concurrent creation in the same year can race this
    /// lookup. The unique constraint on `invoices.number` turns that race
    /// into an insert error rather than a silent duplicate.
    pub async fn next_invoice_number(
        &self,
        date: NaiveDate,
        reset_each_year: bool,
    ) -> Result<(String, i64)> {
        let year = date.year();

        let last: i64 = if reset_each_year {
            sqlx::query_scalar(
                "SELECT COALESCE(MAX(year_seq), 0) FROM invoices WHERE strftime('%Y', date) = ?1",
            )
            .bind(format!("{year:04}"))
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
                .fetch_one(&self.pool)
                .await?
        };

        let seq = last + 1;
        Ok((numbering::format_number(year, seq), seq))
    }

    /// Create an invoice and its line items in one transaction. The number is
    /// assigned here and the total derived from the submitted items.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_invoice_with_items(
        &self,
        client_id: i64,
        date: NaiveDate,
        service_period: Option<&str>,
        objekt: Option<&str>,
        city: Option<&str>,
        reverse_charge: bool,
        reset_each_year: bool,
        items: &[ItemInput],
    ) -> Result<i64> {
        let company = self.get_company().await?;
        let (number, seq) = self.next_invoice_number(date, reset_each_year).await?;
        let total = totals::total_net(items);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO invoices
                (number, date, service_period, objekt, city, year_seq,
                 client_id, company_id, total_net, reverse_charge)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&number)
        .bind(date)
        .bind(service_period)
        .bind(objekt)
        .bind(city)
        .bind(seq)
        .bind(client_id)
        .bind(company.id)
        .bind(total)
        .bind(reverse_charge)
        .execute(&mut *tx)
        .await?;

        let invoice_id = result.last_insert_rowid();

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (invoice_id, title, termin, quantity, unit_price, net)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(invoice_id)
            .bind(&item.title)
            .bind(&item.termin)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.net_amount())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(invoice_id)
    }

    /// Update an invoice's header fields and replace its items wholesale,
    /// re-deriving the total. Returns false when the invoice does not exist.
    pub async fn update_invoice_with_items(
        &self,
        id: i64,
        service_period: Option<&str>,
        reverse_charge: bool,
        items: &[ItemInput],
    ) -> Result<bool> {
        let total = totals::total_net(items);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET service_period = ?1, reverse_charge = ?2, total_net = ?3
            WHERE id = ?4
            "#,
        )
        .bind(service_period)
        .bind(reverse_charge)
        .bind(total)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (invoice_id, title, termin, quantity, unit_price, net)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(id)
            .bind(&item.title)
            .bind(&item.termin)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.net_amount())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(true)
    }

    /// Delete an invoice and its line items in one transaction.
    pub async fn delete_invoice(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Initialize the database connection pool and schema
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config.database_url()).await?;

    Ok(db)
}
