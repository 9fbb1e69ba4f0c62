/*!
 * Reporting for processed manifests
 *
 * Renders what a processing run produced as console tables using tabled.
 */

use std::path::Path;
use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::processor::ProcessReport;
use crate::utils::format_file_size;

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for processing runs
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Generate a report string for a processing run
    pub fn generate_report(&self, report: &ProcessReport, duration: Duration) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report, duration),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &ProcessReport, duration: Duration) {
        println!("\n{}", self.generate_report(report, duration));
    }

    fn create_summary_table(&self, report: &ProcessReport, duration: Duration) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let copied = report.batches.iter().filter(|b| b.copied).count();
        let mut rows = vec![
            SummaryRow {
                key: "Archive".to_string(),
                value: report.txtar_file.display().to_string(),
            },
            SummaryRow {
                key: "Process Time".to_string(),
                value: format!("{:.4?}", duration),
            },
            SummaryRow {
                key: "Files Packed".to_string(),
                value: report.files.to_string(),
            },
            SummaryRow {
                key: "Copied".to_string(),
                value: format!("{}/{}", copied, report.batches.len()),
            },
        ];

        if let Some(dir) = &report.kept_temp_dir {
            rows.push(SummaryRow {
                key: "Temp Dir".to_string(),
                value: dir.display().to_string(),
            });
        }

        style(Table::new(rows))
    }

    fn create_batches_table(&self, report: &ProcessReport) -> String {
        #[derive(Tabled)]
        struct BatchRow {
            #[tabled(rename = "#")]
            index: usize,

            #[tabled(rename = "Archive")]
            name: String,

            #[tabled(rename = "Files")]
            files: usize,

            #[tabled(rename = "Size")]
            size: String,

            #[tabled(rename = "Clipboard")]
            copied: &'static str,
        }

        let rows: Vec<BatchRow> = report
            .batches
            .iter()
            .enumerate()
            .map(|(i, batch)| BatchRow {
                index: i + 1,
                name: file_name(&batch.path),
                files: batch.files,
                size: format_file_size(batch.bytes),
                copied: if batch.copied { "copied" } else { "skipped" },
            })
            .collect();

        style(Table::new(rows))
    }

    fn generate_console_report(&self, report: &ProcessReport, duration: Duration) -> String {
        let batches_table = self.create_batches_table(report);
        let summary_table = self.create_summary_table(report, duration);

        let batches_title = if report.batches.len() > 1 {
            "BATCHES"
        } else {
            "ARCHIVE"
        };

        format!(
            "{}\n{}\n\n{}\n{}",
            batches_title, batches_table, "PROCESSING COMPLETE", summary_table
        )
    }
}

fn style(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Padding::new(1, 1, 0, 0))
        .with(Modify::new(Columns::new(..)).with(Alignment::left()));
    table.to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
