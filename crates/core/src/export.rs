//! CSV and PDF exports of daily analytics rows.

use std::fmt::Write as _;

use chrono::NaiveDate;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::aggregation::{DailyTally, WindowSummary};
use crate::error::CoreError;

/// Header line of the analytics CSV export.
pub const CSV_HEADER: &str = "date,total_detections,compliant_count,violation_count,partial_count,avg_confidence,compliance_rate";

/// Render `(date, tally)` rows as CSV, one line per day, header first.
///
/// All fields are dates or numbers, so no quoting is required.
pub fn daily_tallies_to_csv<'a>(rows: impl IntoIterator<Item = (NaiveDate, &'a DailyTally)>) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for (date, tally) in rows {
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{},{},{},{},{},{:.2},{:.1}",
            date.format("%Y-%m-%d"),
            tally.total_detections,
            tally.compliant_count,
            tally.violation_count,
            tally.partial_count,
            tally.avg_confidence,
            tally.compliance_rate(),
        );
    }
    out
}

// ---------------------------------------------------------------------------
// PDF report
// ---------------------------------------------------------------------------

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_MM: f32 = 20.0;
const LINE_MM: f32 = 6.0;
/// Table rows that fit below the heading on the first page.
const FIRST_PAGE_ROWS: usize = 32;
/// Table rows on each continuation page.
const PAGE_ROWS: usize = 40;
/// Left edge of each table column, in mm.
const COLUMNS_MM: [f32; 7] = [20.0, 48.0, 70.0, 95.0, 120.0, 142.0, 168.0];
const COLUMN_TITLES: [&str; 7] = ["Date", "Total", "Compliant", "Violation", "Partial", "Avg conf.", "Rate %"];

/// Title and window of a PDF analytics report.
#[derive(Debug, Clone, Copy)]
pub struct ReportHeading {
    pub generated_on: NaiveDate,
    pub window_days: i64,
}

/// Render the analytics window as an A4 PDF report.
///
/// The first page carries the heading and the window totals, followed by
/// one table row per day; long windows continue on further pages with the
/// column titles repeated.
pub fn daily_tallies_to_pdf<'a>(
    heading: ReportHeading,
    summary: &WindowSummary,
    rows: impl IntoIterator<Item = (NaiveDate, &'a DailyTally)>,
) -> Result<Vec<u8>, CoreError> {
    let (doc, page, layer) =
        PdfDocument::new("PPE Compliance Report", PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;

    let mut layer = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT.0 - MARGIN_MM;

    layer.use_text("PPE Compliance Report", 18.0, Mm(MARGIN_MM), Mm(y), &bold);
    y -= LINE_MM * 1.5;
    let subtitle = format!(
        "Last {} day(s), generated {}",
        heading.window_days,
        heading.generated_on.format("%Y-%m-%d")
    );
    layer.use_text(subtitle, 10.0, Mm(MARGIN_MM), Mm(y), &regular);
    y -= LINE_MM * 2.0;

    let totals = [
        format!("Total detections: {}", summary.total_detections),
        format!(
            "Compliant: {}   Violation: {}   Partial: {}",
            summary.compliant_count, summary.violation_count, summary.partial_count
        ),
        format!("Average confidence: {:.1}", summary.avg_confidence),
        format!("Compliance rate: {:.1}%", summary.compliance_rate),
    ];
    for line in totals {
        layer.use_text(line, 11.0, Mm(MARGIN_MM), Mm(y), &regular);
        y -= LINE_MM;
    }
    y -= LINE_MM;

    write_table_header(&layer, y, &bold);
    y -= LINE_MM;

    let mut room = FIRST_PAGE_ROWS;
    for (date, tally) in rows {
        if room == 0 {
            let (next_page, next_layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            layer = doc.get_page(next_page).get_layer(next_layer);
            y = PAGE_HEIGHT.0 - MARGIN_MM;
            write_table_header(&layer, y, &bold);
            y -= LINE_MM;
            room = PAGE_ROWS;
        }
        let cells = [
            date.format("%Y-%m-%d").to_string(),
            tally.total_detections.to_string(),
            tally.compliant_count.to_string(),
            tally.violation_count.to_string(),
            tally.partial_count.to_string(),
            format!("{:.2}", tally.avg_confidence),
            format!("{:.1}", tally.compliance_rate()),
        ];
        for (x, cell) in COLUMNS_MM.iter().zip(cells) {
            layer.use_text(cell, 10.0, Mm(*x), Mm(y), &regular);
        }
        y -= LINE_MM;
        room -= 1;
    }

    doc.save_to_bytes().map_err(pdf_error)
}

fn write_table_header(layer: &PdfLayerReference, y: f32, font: &IndirectFontRef) {
    for (x, title) in COLUMNS_MM.iter().zip(COLUMN_TITLES) {
        layer.use_text(title, 10.0, Mm(*x), Mm(y), font);
    }
}

fn pdf_error(err: printpdf::Error) -> CoreError {
    CoreError::Internal(format!("PDF rendering failed: {err}"))
}
