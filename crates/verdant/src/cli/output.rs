//! Terminal rendering for command output

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use verdant_protocol::{MeasureResult, MeasureStatus, MessageLevel};

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let rows = rows
        .into_iter()
        .map(|row| row.into_iter().map(Cell::new).collect());
    println!("{}", build_table(headers, rows));
}

/// Like [`print_table`], with an optional foreground color per cell.
pub fn print_table_colored(headers: &[&str], rows: Vec<Vec<(String, Option<Color>)>>) {
    let rows = rows.into_iter().map(|row| {
        row.into_iter()
            .map(|(text, color)| match color {
                Some(color) => Cell::new(text).fg(color),
                None => Cell::new(text),
            })
            .collect()
    });
    println!("{}", build_table(headers, rows));
}

fn build_table(headers: &[&str], rows: impl IntoIterator<Item = Vec<Cell>>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    for row in rows {
        table.add_row(row);
    }
    table
}

pub fn status_color(status: MeasureStatus) -> Color {
    match status {
        MeasureStatus::Success => Color::Green,
        MeasureStatus::NotApplicable => Color::Yellow,
        MeasureStatus::Fail => Color::Red,
        MeasureStatus::Running => Color::Grey,
    }
}

/// Format milliseconds as "850ms" / "1.2s" / "2m 05s"
pub fn format_duration_ms(ms: i64) -> String {
    let ms = ms.max(0);
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{}m {:02}s", ms / 60_000, (ms % 60_000) / 1000)
    }
}

/// Human-readable rendering of one measure result.
pub fn print_measure_result(result: &MeasureResult) {
    println!(
        "{}  {}  ({})",
        result.measure_name,
        result.status.as_str().to_uppercase(),
        format_duration_ms(result.duration_ms())
    );

    if let Some(initial) = &result.initial_condition {
        println!("  Initial: {}", initial);
    }
    for message in &result.messages {
        let tag = match message.level {
            MessageLevel::Info => "INFO ",
            MessageLevel::Warning => "WARN ",
            MessageLevel::Error => "ERROR",
        };
        println!("  [{}] {}", tag, message.text);
    }
    if let Some(final_condition) = &result.final_condition {
        println!("  Final:   {}", final_condition);
    }

    if !result.values.is_empty() {
        let rows = result
            .values
            .iter()
            .map(|v| {
                vec![
                    v.name.clone(),
                    v.value.to_string(),
                    v.units.clone().unwrap_or_default(),
                ]
            })
            .collect();
        print_table(&["VALUE", "", "UNITS"], rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration_ms(0), "0ms");
        assert_eq!(format_duration_ms(850), "850ms");
        assert_eq!(format_duration_ms(1200), "1.2s");
        assert_eq!(format_duration_ms(125_000), "2m 05s");
        assert_eq!(format_duration_ms(-5), "0ms");
    }

    #[test]
    fn test_build_table_contains_cells() {
        let table = build_table(&["A", "B"], [vec![Cell::new("x"), Cell::new("y")]]);
        let rendered = table.to_string();
        assert!(rendered.contains('x'));
        assert!(rendered.contains('B'));
    }
}
