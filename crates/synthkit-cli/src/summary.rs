use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::{CheckReport, EntityResult, EntityStatus, SynthResult};

pub fn print_summary(result: &SynthResult) {
    println!("Project: {}", result.project.display());
    println!("Library: {}", result.library);
    println!("Flow: {}", result.flow);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Status"),
        header_cell("Part"),
        header_cell("Archive"),
        header_cell("Duration"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Right);
    for entity in &result.entities {
        table.add_row(vec![
            Cell::new(&entity.entity)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            status_cell(entity.status),
            optional_cell(entity.part.as_deref()),
            archive_cell(entity),
            Cell::new(format_duration(entity.duration_ms)),
        ]);
    }
    println!("{table}");

    let failures: Vec<&EntityResult> = result
        .entities
        .iter()
        .filter(|entity| entity.error.is_some())
        .collect();
    if !failures.is_empty() {
        eprintln!("Errors:");
        for entity in failures {
            if let Some(error) = &entity.error {
                eprintln!("- {}: {error}", entity.entity);
            }
        }
    }
}

pub fn print_check(report: &CheckReport) {
    println!("Project: {}", report.project.display());
    match &report.bin_dir {
        Some(dir) => println!("ISE bin directory: {}", dir.display()),
        None => println!("ISE bin directory: (PATH)"),
    }
    println!("Part: {}", report.part.as_deref().unwrap_or("-"));
    println!(
        "Synthesis directory: {}",
        report
            .synthesis_directory
            .as_deref()
            .map_or_else(|| "-".to_string(), |dir| dir.display().to_string())
    );

    let mut tools = Table::new();
    tools.set_header(vec![header_cell("Tool"), header_cell("Found"), header_cell("Path")]);
    apply_table_style(&mut tools);
    align_column(&mut tools, 1, CellAlignment::Center);
    for tool in &report.tools {
        let (found, path) = match &tool.path {
            Some(path) => (
                Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold),
                Cell::new(path.display()),
            ),
            None => (
                Cell::new("✗").fg(Color::Red).add_attribute(Attribute::Bold),
                dim_cell("-"),
            ),
        };
        tools.add_row(vec![Cell::new(&tool.name), found, path]);
    }
    println!("{tools}");

    let mut libraries = Table::new();
    libraries.set_header(vec![header_cell("Library"), header_cell("Files")]);
    apply_table_style(&mut libraries);
    align_column(&mut libraries, 1, CellAlignment::Right);
    for library in &report.libraries {
        let files = if library.files == 0 {
            Cell::new(0).fg(Color::Yellow)
        } else {
            Cell::new(library.files)
        };
        libraries.add_row(vec![Cell::new(&library.name), files]);
    }
    println!("{libraries}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: EntityStatus) -> Cell {
    match status {
        EntityStatus::Succeeded => Cell::new("OK")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        EntityStatus::Failed => Cell::new("FAILED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn archive_cell(entity: &EntityResult) -> Cell {
    match (&entity.archive, entity.status) {
        (Some(path), EntityStatus::Succeeded) => Cell::new(file_name(path)),
        (Some(path), EntityStatus::Failed) => Cell::new(file_name(path)).fg(Color::Red),
        (None, _) => dim_cell("-"),
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    value.map_or_else(|| dim_cell("-"), Cell::new)
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// `850ms`, `12.4s`, `3m 05s`.
fn format_duration(ms: u128) -> String {
    match ms {
        0..1_000 => format!("{ms}ms"),
        1_000..60_000 => format!("{:.1}s", ms as f64 / 1_000.0),
        _ => {
            let seconds = ms / 1_000;
            format!("{}m {:02}s", seconds / 60, seconds % 60)
        }
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_are_readable() {
        assert_eq!(format_duration(850), "850ms");
        assert_eq!(format_duration(12_400), "12.4s");
        assert_eq!(format_duration(185_000), "3m 05s");
    }
}
