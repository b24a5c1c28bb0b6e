use crate::models::scan_result::ScanStatistics;

pub struct Analyzer;

impl Analyzer {
    /// One row per category, largest total size first, followed by a total
    /// row when anything unwanted was found.
    pub fn category_rows(stats: &ScanStatistics) -> Vec<CategoryRow> {
        let mut rows: Vec<CategoryRow> = stats
            .categories
            .iter()
            .map(|(key, cat)| CategoryRow {
                label: key.display_name(),
                count: cat.count,
                size: cat.total_size_bytes,
                percentage: percentage(cat.total_size_bytes, stats.unwanted_total_size),
                is_total: false,
            })
            .collect();

        // BTreeMap iteration is key-ordered, and the sort is stable.
        rows.sort_by(|a, b| b.size.cmp(&a.size));

        if stats.unwanted_file_count > 0 {
            rows.push(CategoryRow {
                label: String::from("TOTAL"),
                count: stats.unwanted_file_count,
                size: stats.unwanted_total_size,
                percentage: 100.0,
                is_total: true,
            });
        }

        rows
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64) * 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub label: String,
    pub count: u64,
    pub size: u64,
    pub percentage: f64,
    pub is_total: bool,
}
