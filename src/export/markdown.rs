use std::fmt::Write;
use std::path::Path;

use crate::core::analyzer::Analyzer;
use crate::models::scan_result::{ScanOutcome, ScanReport};
use crate::models::size::human_readable_size;

pub fn render_markdown(report: &ScanReport) -> Result<String, std::fmt::Error> {
    let mut md = String::new();
    let stats = &report.statistics;

    writeln!(md, "# mediasweep Report")?;
    writeln!(md)?;
    writeln!(md, "- **Path:** {}", report.scan_path.display())?;
    writeln!(md, "- **Status:** {}", outcome_label(&report.outcome))?;
    writeln!(md, "- **Files scanned:** {}", stats.files_scanned)?;
    writeln!(md, "- **Directories scanned:** {}", stats.dirs_scanned)?;
    writeln!(
        md,
        "- **Unwanted files:** {} ({})",
        stats.unwanted_file_count,
        human_readable_size(stats.unwanted_total_size)
    )?;
    writeln!(md, "- **Scan Duration:** {:.2}s", report.scan_duration.as_secs_f64())?;
    writeln!(md)?;

    writeln!(md, "## Categories")?;
    writeln!(md)?;
    writeln!(md, "| File Type | Count | Total Size |")?;
    writeln!(md, "|-----------|-------|------------|")?;
    for row in Analyzer::category_rows(stats) {
        if row.is_total {
            writeln!(
                md,
                "| **{}** | **{}** | **{}** |",
                row.label,
                row.count,
                human_readable_size(row.size)
            )?;
        } else {
            writeln!(md, "| {} | {} | {} |", row.label, row.count, human_readable_size(row.size))?;
        }
    }

    if !report.errors.is_empty() {
        writeln!(md)?;
        writeln!(md, "## Skipped entries ({} total)", report.errors.len())?;
        writeln!(md)?;
        for err in &report.errors {
            writeln!(md, "- **{:?}**: {}", err.error_type, err.path.display())?;
        }
    }

    Ok(md)
}

pub fn export_markdown(report: &ScanReport, output_path: &Path) -> anyhow::Result<()> {
    let md = render_markdown(report)?;
    std::fs::write(output_path, md)?;
    Ok(())
}

fn outcome_label(outcome: &ScanOutcome) -> String {
    match outcome {
        ScanOutcome::Completed => "completed".to_string(),
        ScanOutcome::Cancelled => "cancelled".to_string(),
        ScanOutcome::Failed(err) => format!("failed ({})", err),
    }
}
