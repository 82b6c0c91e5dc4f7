//! Reporting
//!
//! Sales aggregation plus the day report output formats: receipt text for
//! the printer, CSV/Excel/PDF for download.

pub mod aggregate;
pub mod export;
pub mod render;

pub use export::ExportFormat;
pub use render::DayReportRenderer;
