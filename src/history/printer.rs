use super::model::HistoryEntry;
use super::storage::HistoryStorage;
use crate::Result;
use crate::http::request::display_rows;
use crate::http::KeyValue;
use crate::settings::{StyleTokens, hex_to_rgb};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

pub fn list_history(storage: &HistoryStorage, limit: usize, tokens: &StyleTokens) -> Result<()> {
    let entries = storage.head(limit)?;
    println!("{}", history_table(&entries, tokens));
    Ok(())
}

pub fn history_table(entries: &[HistoryEntry], tokens: &StyleTokens) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Time", "Method", "URL", "Status", "Duration"]);

    for entry in entries {
        let status = if entry.response.is_failure() {
            "ERROR".to_string()
        } else {
            entry.response.status.to_string()
        };

        table.add_row(vec![
            Cell::new(entry.id),
            Cell::new(entry.timestamp.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(entry.request.method),
            Cell::new(&entry.request.url).add_attribute(Attribute::Dim),
            Cell::new(status).fg(table_color(tokens.status_color(entry.response.status))),
            Cell::new(format!("{}ms", entry.response.time)),
        ]);
    }

    table
}

/// 请求头/查询参数表；没有数据时保留一行空行，停用的行标记为暗色
pub fn key_value_table(rows: &[KeyValue]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["", "Key", "Value"]);

    for row in display_rows(rows, 1) {
        let mark = if row.enabled { "✓" } else { " " };
        let mut key = Cell::new(&row.key);
        let mut value = Cell::new(&row.value);
        if !row.enabled {
            key = key.add_attribute(Attribute::Dim);
            value = value.add_attribute(Attribute::Dim);
        }
        table.add_row(vec![Cell::new(mark), key, value]);
    }

    table
}

pub(crate) fn table_color(hex: &str) -> Color {
    hex_to_rgb(hex)
        .map(|(r, g, b)| Color::Rgb { r, g, b })
        .unwrap_or(Color::Reset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, RequestModel, ResponseRecord};
    use crate::settings::Theme;
    use std::time::Duration;

    #[test]
    fn test_failed_entry_shows_error() {
        let entry = HistoryEntry::new(
            RequestModel::new(Method::Delete, "http://unreachable.test/x"),
            ResponseRecord::failure("Error: dns", Duration::from_millis(5)),
        );

        let rendered = history_table(&[entry], &Theme::Light.tokens()).to_string();
        assert!(rendered.contains("ERROR"));
        assert!(rendered.contains("DELETE"));
        assert!(rendered.contains("5ms"));
    }

    #[test]
    fn test_key_value_table_pads_and_marks_disabled() {
        let empty = key_value_table(&[]);
        assert_eq!(empty.row_iter().count(), 1);

        let rows = vec![KeyValue::new("q", "1"), KeyValue::disabled("debug", "true")];
        let table = key_value_table(&rows);
        assert_eq!(table.row_iter().count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("✓"));
        assert!(rendered.contains("debug"));
    }
}
