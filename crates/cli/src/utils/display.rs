//! Terminal output helpers

use colored::Colorize;

/// Bold, underlined heading preceded by a blank line
pub fn section_title(title: &str) -> String {
    format!("\n{}", title.bold().underline())
}

/// Green line for a completed operation
pub fn success(message: &str) -> String {
    format!("✅ {}", message.green().bold())
}

/// Yellow line for something the operator should look at
pub fn warning(message: &str) -> String {
    format!("⚠️  {}", message.yellow().bold())
}

/// Titled list of `key: value` lines with the keys aligned
pub fn key_value_box<K: AsRef<str>>(title: &str, items: &[(K, String)]) -> String {
    let width = items
        .iter()
        .map(|(key, _)| key.as_ref().len())
        .max()
        .unwrap_or_default();

    let mut lines = vec![title.bold().underline().to_string()];
    lines.extend(items.iter().map(|(key, value)| {
        let key = format!("{:<width$}", key.as_ref());
        format!("  {} : {value}", key.bold())
    }));
    lines.join("\n")
}

/// Hex dump in rows of 32 bytes
pub fn hex_block(bytes: &[u8]) -> String {
    bytes
        .chunks(32)
        .map(|row| format!("  {}", hex::encode_upper(row)))
        .collect::<Vec<_>>()
        .join("\n")
}
