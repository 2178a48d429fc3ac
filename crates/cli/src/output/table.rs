//! Tabular rendering of listing results

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use kv_core::ObjectSummary;

/// Render listed items as a table with key, size and modification time
pub fn summary_table(items: &[ObjectSummary], colors: bool) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Key", "Size", "Last Modified"]);

    if !colors {
        table.force_no_tty();
    }

    for item in items {
        let size = item.size_human.clone().unwrap_or_else(|| "-".to_string());
        let modified = item
            .last_modified
            .map(|ts| ts.strftime("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(&item.key),
            Cell::new(size).set_alignment(CellAlignment::Right),
            Cell::new(modified),
        ]);
    }

    table
}
