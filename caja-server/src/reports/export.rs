//! Day report export
//!
//! Serializes a day report plus its sales summary into downloadable
//! documents. All exporters return raw bytes; the handler layer attaches
//! content type and disposition headers.

use printpdf::{BuiltinFont, Mm, PdfDocument};
use rust_xlsxwriter::{Format, Workbook};

use shared::models::{DayReport, DaySummary};

use crate::utils::AppError;

use super::render::DayReportRenderer;

/// Supported download formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "excel" | "xlsx" => Some(Self::Excel),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Pdf => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
            Self::Pdf => "pdf",
        }
    }
}

/// Shift-wise rows plus a day total row, one block per report
pub fn to_csv(reports: &[(DayReport, DaySummary)]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "business_date",
            "shift_number",
            "operator",
            "orders",
            "total_sales",
            "cash",
            "card",
            "online",
            "counted_cash",
            "variance",
        ])
        .map_err(csv_err)?;

    for (report, summary) in reports {
        for shift in &summary.shift_wise {
            writer
                .write_record([
                    report.business_date.clone(),
                    shift.shift_number.to_string(),
                    shift.operator_name.clone(),
                    shift.order_count.to_string(),
                    format!("{:.2}", shift.total_sales),
                    format!("{:.2}", shift.cash_amount),
                    format!("{:.2}", shift.card_amount),
                    format!("{:.2}", shift.online_amount),
                    format!("{:.2}", shift.total_cash),
                    shift
                        .cash_variance
                        .map(|v| format!("{v:.2}"))
                        .unwrap_or_default(),
                ])
                .map_err(csv_err)?;
        }

        writer
            .write_record([
                report.business_date.clone(),
                "TOTAL".to_string(),
                String::new(),
                summary.day_wise.order_count.to_string(),
                format!("{:.2}", summary.day_wise.total_sales),
                format!("{:.2}", summary.day_wise.cash_amount),
                format!("{:.2}", summary.day_wise.card_amount),
                format!("{:.2}", summary.day_wise.online_amount),
                format!("{:.2}", report.total_cash),
                String::new(),
            ])
            .map_err(csv_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::internal(format!("CSV export failed: {e}")))
}

/// One worksheet per report: headers, shift-wise rows, bold day total
pub fn to_xlsx(reports: &[(DayReport, DaySummary)]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    for (report, summary) in reports {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&report.business_date)
            .map_err(xlsx_err)?;

        let headers = [
            "Shift", "Operator", "Orders", "Total", "Cash", "Card", "Online", "Counted",
            "Variance",
        ];
        for (col, header) in headers.iter().enumerate() {
            worksheet
                .write_with_format(0, col as u16, *header, &bold)
                .map_err(xlsx_err)?;
        }

        let mut row = 1u32;
        for shift in &summary.shift_wise {
            worksheet
                .write(row, 0, shift.shift_number)
                .map_err(xlsx_err)?;
            worksheet
                .write(row, 1, shift.operator_name.as_str())
                .map_err(xlsx_err)?;
            worksheet.write(row, 2, shift.order_count).map_err(xlsx_err)?;
            worksheet.write(row, 3, shift.total_sales).map_err(xlsx_err)?;
            worksheet.write(row, 4, shift.cash_amount).map_err(xlsx_err)?;
            worksheet.write(row, 5, shift.card_amount).map_err(xlsx_err)?;
            worksheet
                .write(row, 6, shift.online_amount)
                .map_err(xlsx_err)?;
            worksheet.write(row, 7, shift.total_cash).map_err(xlsx_err)?;
            if let Some(variance) = shift.cash_variance {
                worksheet.write(row, 8, variance).map_err(xlsx_err)?;
            }
            row += 1;
        }

        worksheet
            .write_with_format(row, 0, "TOTAL", &bold)
            .map_err(xlsx_err)?;
        worksheet
            .write_with_format(row, 2, summary.day_wise.order_count, &bold)
            .map_err(xlsx_err)?;
        worksheet
            .write_with_format(row, 3, summary.day_wise.total_sales, &bold)
            .map_err(xlsx_err)?;
        worksheet
            .write_with_format(row, 4, summary.day_wise.cash_amount, &bold)
            .map_err(xlsx_err)?;
        worksheet
            .write_with_format(row, 5, summary.day_wise.card_amount, &bold)
            .map_err(xlsx_err)?;
        worksheet
            .write_with_format(row, 6, summary.day_wise.online_amount, &bold)
            .map_err(xlsx_err)?;
        worksheet
            .write_with_format(row, 7, report.total_cash, &bold)
            .map_err(xlsx_err)?;
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}

/// Receipt layout re-set in monospace, one A4 page per report
pub fn to_pdf(reports: &[(DayReport, DaySummary)]) -> Result<Vec<u8>, AppError> {
    let title = match reports {
        [(report, _)] => format!("Day close {}", report.business_date),
        _ => "Day close reports".to_string(),
    };
    let (doc, first_page, first_layer) = PdfDocument::new(&title, Mm(210.0), Mm(297.0), "report");
    let font = doc.add_builtin_font(BuiltinFont::Courier).map_err(pdf_err)?;

    let renderer = DayReportRenderer::new(48, chrono_tz::UTC);

    for (i, (report, summary)) in reports.iter().enumerate() {
        let (page, layer) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(210.0), Mm(297.0), "report")
        };
        let layer = doc.get_page(page).get_layer(layer);

        let text = renderer.render(report, summary);
        let mut y = 280.0;
        for line in text.lines() {
            layer.use_text(line, 10.0, Mm(20.0), Mm(y), &font);
            y -= 5.0;
            if y < 15.0 {
                break;
            }
        }
    }

    doc.save_to_bytes().map_err(pdf_err)
}

fn csv_err(e: csv::Error) -> AppError {
    AppError::internal(format!("CSV export failed: {e}"))
}

fn xlsx_err(e: rust_xlsxwriter::XlsxError) -> AppError {
    AppError::internal(format!("Excel export failed: {e}"))
}

fn pdf_err(e: printpdf::Error) -> AppError {
    AppError::internal(format!("PDF export failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{DayWiseSales, ShiftSales};

    fn sample() -> (DayReport, DaySummary) {
        let report = DayReport {
            id: 1,
            branch_id: "main".into(),
            business_date: "2026-03-14".into(),
            total_orders: 2,
            total_sales: 750.0,
            cash_amount: 300.0,
            card_amount: 450.0,
            online_amount: 0.0,
            total_cash: 300.0,
            shift_count: 1,
            first_shift_time: None,
            last_shift_time: None,
            day_close_time: 1_750_031_000_000,
            closed_by: "mgr-1".into(),
            closed_by_name: "Marta".into(),
            note: None,
            created_at: 1_750_031_000_000,
        };
        let summary = DaySummary {
            day_wise: DayWiseSales {
                order_count: 2,
                total_sales: 750.0,
                cash_amount: 300.0,
                card_amount: 450.0,
                online_amount: 0.0,
            },
            shift_wise: vec![ShiftSales {
                shift_id: 10,
                shift_number: 1,
                operator_name: "Ana".into(),
                order_count: 2,
                total_sales: 750.0,
                cash_amount: 300.0,
                card_amount: 450.0,
                online_amount: 0.0,
                total_cash: 300.0,
                cash_variance: Some(0.0),
            }],
        };
        (report, summary)
    }

    #[test]
    fn format_parsing_is_case_insensitive() {
        assert_eq!(ExportFormat::parse("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse("xlsx"), Some(ExportFormat::Excel));
        assert_eq!(ExportFormat::parse("Pdf"), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::parse("doc"), None);
    }

    #[test]
    fn csv_has_header_total_and_shift_rows() {
        let bundle = vec![sample()];
        let bytes = to_csv(&bundle).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("business_date,shift_number"));
        assert!(lines[1].contains("Ana"));
        assert!(lines[2].contains("TOTAL"));
        assert!(lines[2].contains("750.00"));
    }

    #[test]
    fn csv_stacks_multiple_reports() {
        let (report, summary) = sample();
        let mut second = report.clone();
        second.business_date = "2026-03-15".into();
        let bundle = vec![(report, summary.clone()), (second, summary)];
        let bytes = to_csv(&bundle).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        // header + 2 x (shift row + total row)
        assert_eq!(text.lines().count(), 5);
        assert!(text.contains("2026-03-15"));
    }

    #[test]
    fn xlsx_produces_a_zip_container() {
        let bundle = vec![sample()];
        let bytes = to_xlsx(&bundle).unwrap();
        // XLSX is a ZIP archive
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn pdf_has_magic_prefix() {
        let bundle = vec![sample()];
        let bytes = to_pdf(&bundle).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
