//! HTML rendering: the shared tera environment and formatting helpers.

pub mod pdf;

use std::collections::HashMap;

use anyhow::Result;
use axum::response::Html;
use tera::{Context, Tera, Value};

use crate::error::AppError;

/// Build the template environment. Called once at startup.
pub fn templates() -> Result<Tera> {
    let mut tera = Tera::new("templates/**/*.html")?;
    tera.register_filter("eur", eur_filter);
    Ok(tera)
}

/// Render a template into an HTML response.
pub fn page(tera: &Tera, name: &str, ctx: &Context) -> Result<Html<String>, AppError> {
    Ok(Html(tera.render(name, ctx)?))
}

/// Format an amount the Austrian way: `1.234,56`.
pub fn format_eur(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let (whole, frac) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped},{frac:02}")
}

fn eur_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let amount = value
        .as_f64()
        .ok_or_else(|| tera::Error::msg("eur filter expects a number"))?;
    Ok(Value::String(format_eur(amount)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn austrian_money_format() {
        assert_eq!(format_eur(0.0), "0,00");
        assert_eq!(format_eur(7.5), "7,50");
        assert_eq!(format_eur(1234.56), "1.234,56");
        assert_eq!(format_eur(1234567.0), "1.234.567,00");
        assert_eq!(format_eur(-42.1), "-42,10");
    }
}
