//! Print-ready invoice rendering with printpdf.
//!
//! Draws an A4 page directly: issuer block, client block, invoice metadata,
//! item table, net total and the reverse-charge note. Long item lists flow
//! onto continuation pages.

use std::io::BufWriter;

use anyhow::Result;
use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};

use crate::models::{Client, Company, Invoice, InvoiceItem};
use crate::render::format_eur;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_X: f32 = 20.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 22.0;

// Table column right edges / left edges, in mm from the left page edge.
const COL_TITLE_X: f32 = MARGIN_X;
const COL_TERMIN_X: f32 = 95.0;
const COL_QTY_RIGHT: f32 = 138.0;
const COL_PRICE_RIGHT: f32 = 163.0;
const COL_NET_RIGHT: f32 = PAGE_W - MARGIN_X;

const LINE_H: f32 = 5.0;

/// Render `invoice` into PDF bytes.
pub fn render_invoice(
    company: &Company,
    client: &Client,
    invoice: &Invoice,
    items: &[InvoiceItem],
) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Rechnung {}", invoice.number),
        Mm(PAGE_W),
        Mm(PAGE_H),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow::anyhow!("pdf font: {e}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow::anyhow!("pdf font: {e}"))?;

    let mut layer = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_H - MARGIN_TOP;

    // Issuer block
    push_line(&layer, &bold, &company.name, 12.0, MARGIN_X, y);
    y -= LINE_H + 1.0;
    for line in company.address.lines() {
        push_line(&layer, &font, line.trim(), 9.0, MARGIN_X, y);
        y -= LINE_H - 0.8;
    }
    if let Some(uid) = &company.uid {
        push_line(&layer, &font, &format!("UID: {uid}"), 9.0, MARGIN_X, y);
        y -= LINE_H - 0.8;
    }

    // Invoice metadata, right-aligned block
    let mut meta_y = PAGE_H - MARGIN_TOP;
    push_line_right(
        &layer,
        &bold,
        &format!("Rechnung Nr. {}", invoice.number),
        12.0,
        COL_NET_RIGHT,
        meta_y,
    );
    meta_y -= LINE_H + 1.0;
    let city = invoice.city.as_deref().unwrap_or("");
    let dated = format!("{}, am {}", city, invoice.date.format("%d.%m.%Y"));
    push_line_right(&layer, &font, dated.trim_start_matches(", "), 9.0, COL_NET_RIGHT, meta_y);
    meta_y -= LINE_H - 0.8;
    if let Some(period) = &invoice.service_period {
        push_line_right(
            &layer,
            &font,
            &format!("Leistungszeitraum: {period}"),
            9.0,
            COL_NET_RIGHT,
            meta_y,
        );
        meta_y -= LINE_H - 0.8;
    }
    if let Some(objekt) = &invoice.objekt {
        push_line_right(
            &layer,
            &font,
            &format!("Bauvorhaben: {objekt}"),
            9.0,
            COL_NET_RIGHT,
            meta_y,
        );
    }

    y -= 10.0;

    // Client block
    push_line(&layer, &font, "An:", 9.0, MARGIN_X, y);
    y -= LINE_H;
    push_line(&layer, &bold, &client.company_name, 10.0, MARGIN_X, y);
    y -= LINE_H;
    for line in client.address.lines() {
        push_line(&layer, &font, line.trim(), 9.0, MARGIN_X, y);
        y -= LINE_H - 0.8;
    }
    if let Some(uid) = &client.uid {
        push_line(&layer, &font, &format!("UID: {uid}"), 9.0, MARGIN_X, y);
        y -= LINE_H - 0.8;
    }

    y -= 10.0;

    // Item table
    y = table_header(&layer, &bold, y);
    for item in items {
        if y < MARGIN_BOTTOM + 25.0 {
            let (next_page, next_layer) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
            layer = doc.get_page(next_page).get_layer(next_layer);
            y = table_header(&layer, &bold, PAGE_H - MARGIN_TOP);
        }

        push_line(&layer, &font, &item.title, 9.0, COL_TITLE_X, y);
        if let Some(termin) = &item.termin {
            push_line(&layer, &font, termin, 9.0, COL_TERMIN_X, y);
        }
        if let Some(quantity) = item.quantity {
            push_line_right(&layer, &font, &format_qty(quantity), 9.0, COL_QTY_RIGHT, y);
        }
        push_line_right(
            &layer,
            &font,
            &format_eur(item.unit_price),
            9.0,
            COL_PRICE_RIGHT,
            y,
        );
        push_line_right(&layer, &font, &format_eur(item.net), 9.0, COL_NET_RIGHT, y);
        y -= LINE_H + 1.0;
    }

    // Total
    y -= 2.0;
    draw_rule(&layer, MARGIN_X, COL_NET_RIGHT, y + 4.0, 0.4);
    push_line(&layer, &bold, "Gesamt netto", 10.0, COL_TERMIN_X, y);
    push_line_right(
        &layer,
        &bold,
        &format!("€ {}", format_eur(invoice.total_net)),
        10.0,
        COL_NET_RIGHT,
        y,
    );
    y -= LINE_H * 2.0;

    if invoice.reverse_charge {
        if let Some(note) = &company.reverse_charge_note {
            push_line(&layer, &font, note, 8.0, MARGIN_X, y);
        }
    }

    // Contact footer on the last page
    let mut footer = Vec::new();
    if let Some(email) = &company.email {
        footer.push(email.clone());
    }
    if let Some(website) = &company.website {
        footer.push(website.clone());
    }
    if let Some(employer_no) = &company.employer_no {
        footer.push(format!("DG-Nr. {employer_no}"));
    }
    if !footer.is_empty() {
        draw_rule(&layer, MARGIN_X, COL_NET_RIGHT, MARGIN_BOTTOM - 4.0, 0.3);
        push_line(&layer, &font, &footer.join("  ·  "), 8.0, MARGIN_X, MARGIN_BOTTOM - 9.0);
    }

    let mut bytes = Vec::new();
    doc.save(&mut BufWriter::new(&mut bytes))
        .map_err(|e| anyhow::anyhow!("pdf save: {e}"))?;

    Ok(bytes)
}

fn table_header(layer: &PdfLayerReference, bold: &IndirectFontRef, y: f32) -> f32 {
    push_line(layer, bold, "Bezeichnung", 9.0, COL_TITLE_X, y);
    push_line(layer, bold, "Termin", 9.0, COL_TERMIN_X, y);
    push_line_right(layer, bold, "Menge", 9.0, COL_QTY_RIGHT, y);
    push_line_right(layer, bold, "Einzelpreis", 9.0, COL_PRICE_RIGHT, y);
    push_line_right(layer, bold, "Netto", 9.0, COL_NET_RIGHT, y);
    draw_rule(layer, MARGIN_X, COL_NET_RIGHT, y - 2.0, 0.4);
    y - (LINE_H + 3.0)
}

fn push_line(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    font_size: f32,
    x: f32,
    y: f32,
) {
    layer.use_text(text, font_size, Mm(x), Mm(y), font);
}

fn push_line_right(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    font_size: f32,
    x_right: f32,
    y: f32,
) {
    // Builtin fonts expose no metrics; estimate the width from an average
    // glyph advance. Good enough for numeric columns.
    let width_est = (text.chars().count() as f32) * font_size * 0.18;
    let x = (x_right - width_est).max(0.0);
    push_line(layer, font, text, font_size, x, y);
}

fn draw_rule(layer: &PdfLayerReference, x1: f32, x2: f32, y: f32, thickness: f32) {
    layer.set_outline_thickness(thickness);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y)), false),
            (Point::new(Mm(x2), Mm(y)), false),
        ],
        is_closed: false,
    });
}

fn format_qty(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}").replace('.', ",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixtures() -> (Company, Client, Invoice, Vec<InvoiceItem>) {
        let company = Company {
            id: 1,
            name: "Muster e.U.".into(),
            address: "Hauptstraße 1\n1010 Wien".into(),
            uid: Some("ATU12345678".into()),
            employer_no: Some("123456789".into()),
            email: Some("office@muster.at".into()),
            website: Some("www.muster.at".into()),
            reverse_charge_note: Some("Übertrag der Steuerschuld gemäß § 19".into()),
        };
        let client = Client {
            id: 1,
            company_name: "Bau GmbH".into(),
            address: "Lange Gasse 5\n1080 Wien".into(),
            uid: None,
        };
        let invoice = Invoice {
            id: 1,
            number: "20250001".into(),
            date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            service_period: Some("Februar".into()),
            objekt: Some("BV Lange Gasse".into()),
            city: Some("Wien".into()),
            year_seq: 1,
            client_id: 1,
            company_id: 1,
            total_net: 150.0,
            reverse_charge: true,
        };
        let items = vec![InvoiceItem {
            id: 1,
            invoice_id: 1,
            title: "Regiearbeiten".into(),
            termin: Some("KW 7-8".into()),
            quantity: Some(10.0),
            unit_price: 15.0,
            net: 150.0,
        }];
        (company, client, invoice, items)
    }

    #[test]
    fn renders_a_pdf_document() {
        let (company, client, invoice, items) = fixtures();
        let bytes = render_invoice(&company, &client, &invoice, &items).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn long_item_lists_flow_onto_more_pages() {
        let (company, client, invoice, items) = fixtures();
        let many: Vec<InvoiceItem> = (0..80)
            .map(|i| InvoiceItem {
                id: i,
                title: format!("Position {i}"),
                ..items[0].clone()
            })
            .collect();
        let bytes = render_invoice(&company, &client, &invoice, &many).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn quantity_formatting() {
        assert_eq!(format_qty(10.0), "10");
        assert_eq!(format_qty(2.5), "2,50");
    }
}
