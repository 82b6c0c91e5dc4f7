//! Day report receipt renderer
//!
//! Renders a day report plus its sales summary as fixed-width plain text,
//! suitable for an 80mm thermal printer or a terminal.

use chrono::TimeZone;
use chrono_tz::Tz;

use shared::models::{DayReport, DaySummary};

/// Day report renderer
///
/// Common widths:
/// - 58mm paper: 32 characters
/// - 80mm paper: 48 characters
pub struct DayReportRenderer {
    width: usize,
    timezone: Tz,
}

impl DayReportRenderer {
    pub fn new(width: usize, timezone: Tz) -> Self {
        Self { width, timezone }
    }

    /// Render a day report to receipt text
    pub fn render(&self, report: &DayReport, summary: &DaySummary) -> String {
        let mut out = String::new();

        self.render_header(&mut out, report);
        self.render_day_wise(&mut out, report, summary);
        self.render_shift_wise(&mut out, summary);
        self.render_footer(&mut out, report);

        out
    }

    fn render_header(&self, out: &mut String, report: &DayReport) {
        self.center_line(out, "DAY CLOSE REPORT");
        self.center_line(out, &report.business_date);
        self.center_line(out, &format!("Branch: {}", report.branch_id));
        self.sep_double(out);
    }

    fn render_day_wise(&self, out: &mut String, report: &DayReport, summary: &DaySummary) {
        self.pair(out, "Orders", &summary.day_wise.order_count.to_string());
        self.pair(out, "Total sales", &money(summary.day_wise.total_sales));
        self.pair(out, "  Cash", &money(summary.day_wise.cash_amount));
        self.pair(out, "  Card", &money(summary.day_wise.card_amount));
        self.pair(out, "  Online", &money(summary.day_wise.online_amount));
        self.pair(out, "Counted cash", &money(report.total_cash));
        self.sep_single(out);
    }

    fn render_shift_wise(&self, out: &mut String, summary: &DaySummary) {
        for shift in &summary.shift_wise {
            self.pair(
                out,
                &format!("Shift #{}", shift.shift_number),
                &shift.operator_name,
            );
            self.pair(
                out,
                &format!("  {} orders", shift.order_count),
                &money(shift.total_sales),
            );
            self.pair(out, "  Counted", &money(shift.total_cash));
            if let Some(variance) = shift.cash_variance {
                self.pair(out, "  Variance", &money(variance));
            }
        }
        if !summary.shift_wise.is_empty() {
            self.sep_single(out);
        }
    }

    fn render_footer(&self, out: &mut String, report: &DayReport) {
        self.pair(out, "Shifts", &report.shift_count.to_string());
        self.pair(out, "Closed by", &report.closed_by_name);
        self.pair(
            out,
            "Closed at",
            &format_timestamp(report.day_close_time, self.timezone),
        );
        if let Some(ref note) = report.note {
            self.line(out, &format!("Note: {note}"));
        }
        self.sep_double(out);
    }

    fn line(&self, out: &mut String, text: &str) {
        out.push_str(text);
        out.push('\n');
    }

    fn center_line(&self, out: &mut String, text: &str) {
        let pad = self.width.saturating_sub(text.chars().count()) / 2;
        out.push_str(&" ".repeat(pad));
        out.push_str(text);
        out.push('\n');
    }

    /// Left label, right-justified value
    fn pair(&self, out: &mut String, label: &str, value: &str) {
        let used = label.chars().count() + value.chars().count();
        let pad = self.width.saturating_sub(used).max(1);
        out.push_str(label);
        out.push_str(&" ".repeat(pad));
        out.push_str(value);
        out.push('\n');
    }

    fn sep_single(&self, out: &mut String) {
        out.push_str(&"-".repeat(self.width));
        out.push('\n');
    }

    fn sep_double(&self, out: &mut String) {
        out.push_str(&"=".repeat(self.width));
        out.push('\n');
    }
}

fn money(value: f64) -> String {
    format!("{value:.2}")
}

/// Unix millis to "YYYY-MM-DD HH:MM" in the business timezone
fn format_timestamp(millis: i64, tz: Tz) -> String {
    match tz.timestamp_millis_opt(millis) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        _ => String::from("--"),
    }
}
