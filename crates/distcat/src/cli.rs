//! Terminal rendering for CLI commands
//!
//! Tables via comfy-table; every formatter returns a String so it can be tested.

use comfy_table::{Cell, Color, ContentArrangement, Table};
use distcat_core::{CacheStats, Distribution, IndexEntry, SplitReport};
use std::sync::Arc;

fn header(table: &mut Table, columns: &[&str], no_color: bool) {
    if no_color {
        table.set_header(columns.to_vec());
    } else {
        table.set_header(
            columns
                .iter()
                .map(|c| Cell::new(*c).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

/// Index listing
pub fn format_index_table(entries: &[IndexEntry], no_color: bool) -> String {
    if entries.is_empty() {
        return "Index is empty.".to_string();
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut table, &["ID", "Group", "Name", "Title"], no_color);

    for e in entries {
        table.add_row(vec![
            e.id.to_string(),
            e.group.to_string(),
            e.name.clone(),
            truncate(&e.title, 60),
        ]);
    }

    table.to_string()
}

/// Records of one group
pub fn format_group_table(group: u32, records: &[Arc<Distribution>], no_color: bool) -> String {
    if records.is_empty() {
        return format!("Group {} is empty.", group);
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut table, &["ID", "Name", "Parameters", "Takeaway"], no_color);

    for d in records {
        table.add_row(vec![
            d.id.to_string(),
            d.name.clone(),
            truncate(&d.parameters, 30),
            truncate(&d.takeaway, 50),
        ]);
    }

    format!("Group {} ({} distributions)\n{}", group, records.len(), table)
}

/// Full detail view of one distribution
pub fn format_distribution(d: &Distribution) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} - {}\n", d.name, d.title));
    out.push_str(&format!("ID: {}    Group: {}\n\n", d.id, d.group));
    out.push_str(&format!("{}\n\n", d.description));
    out.push_str(&format!("Parameters: {}\n", d.parameters));
    out.push_str(&format!("Formula:    {}\n", d.formula));

    if !d.application.is_empty() {
        out.push_str("\nApplications:\n");
        for app in &d.application {
            out.push_str(&format!("  • {}\n", app));
        }
    }

    out.push_str(&format!("\nTakeaway: {}\n", d.takeaway));

    if let Some(related) = d.related_models.as_ref().filter(|r| !r.is_empty()) {
        out.push_str("\nRelated:\n");
        for r in related {
            out.push_str(&format!("  #{} {}: {}\n", r.id, r.name, r.reason));
        }
    }

    out
}

pub fn format_cache_stats(stats: &CacheStats) -> String {
    let groups = stats
        .cached_groups
        .iter()
        .map(|g| g.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Groups cached:        {}\nDistributions cached: {}\nCached groups:        [{}]",
        stats.groups_cached, stats.distributions_cached, groups
    )
}

pub fn format_split_report(report: &SplitReport) -> String {
    let mut out = format!(
        "✓ {} ({} entries, {} bytes)\n",
        report.index.path.display(),
        report.index.entries,
        report.index.bytes
    );

    for (_, file) in &report.groups {
        out.push_str(&format!(
            "✓ {} ({} distributions, {} bytes)\n",
            file.path.display(),
            file.entries,
            file.bytes
        ));
    }

    out.push_str(&format!("Total: {} bytes", report.total_bytes()));
    out
}
