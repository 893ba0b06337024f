//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Two-column label/value table; missing values show as "-"
pub fn key_value_table(rows: &[(&str, Option<&str>)]) -> Table {
    let mut table = create_table();
    for (label, value) in rows {
        table.add_row(vec![*label, value.unwrap_or("-")]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_value_table_fills_missing() {
        let table = key_value_table(&[("Name", Some("Asha")), ("Address", None)]);
        let rendered = table.to_string();
        assert!(rendered.contains("Asha"));
        assert!(rendered.contains('-'));
    }
}
