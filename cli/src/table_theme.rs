use tabled::{
    settings::{
        format::Format,
        object::{Columns, Rows},
        Alignment, Modify, Style,
    },
    Table,
};

/// Emoji mappings for common values in Kubernetes resource tables
pub struct EmojiFormatter;

impl EmojiFormatter {
    /// Convert common boolean and status values to emojis
    pub fn format_value(value: &str) -> String {
        match value.to_lowercase().trim() {
            // Boolean states
            "true" => "✅ True".to_string(),
            "false" => "❌ False".to_string(),

            // Current context marker
            "*" => "👉".to_string(),

            // Pod and namespace phases
            "running" => "🟢 Running".to_string(),
            "pending" => "🟡 Pending".to_string(),
            "succeeded" => "✅ Succeeded".to_string(),
            "failed" => "❌ Failed".to_string(),
            "unknown" => "❓ Unknown".to_string(),
            "active" => "✅ Active".to_string(),
            "terminating" => "🟠 Terminating".to_string(),

            // Service types
            "clusterip" => format!("🔒 {value}"),
            "nodeport" => format!("🌐 {value}"),
            "loadbalancer" => format!("⚖️ {value}"),
            "externalname" => format!("🔗 {value}"),

            // Pod readiness patterns (e.g., "1/1", "2/3")
            s if s.contains('/') && s.chars().all(|c| c.is_ascii_digit() || c == '/') => {
                match s.split_once('/') {
                    Some((ready, total)) => match (ready.parse::<u32>(), total.parse::<u32>()) {
                        (Ok(ready), Ok(total)) if ready == total && ready > 0 => format!("✅ {s}"),
                        (Ok(0), Ok(_)) => format!("❌ {s}"),
                        (Ok(_), Ok(_)) => format!("🟡 {s}"),
                        _ => s.to_string(),
                    },
                    None => s.to_string(),
                }
            }

            // Restart counts
            "0" => "✅ 0".to_string(),
            s if s.parse::<u32>().is_ok() => format!("⚠️ {s}"),

            // Default case - return original value
            _ => value.to_string(),
        }
    }

    /// Apply emoji formatting to a table column by index
    pub fn apply_to_column(mut table: Table, column_index: usize) -> Table {
        table.with(
            Modify::new(Columns::new(column_index..=column_index))
                .with(Format::content(Self::format_value)),
        );
        table
    }
}

/// Centralized table theme configuration for consistent kubectl-like output
pub struct TableTheme;

impl TableTheme {
    /// Rounded borders, uppercase headers, left-aligned cells
    pub fn apply_default(mut table: Table) -> Table {
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Format::content(|s| s.to_uppercase())))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table
    }

    /// The default theme plus emoji decoration of the given columns
    pub fn apply_with_emoji(table: Table, columns: &[usize]) -> Table {
        let mut table = Self::apply_default(table);
        for column in columns {
            table = EmojiFormatter::apply_to_column(table, *column);
        }
        table
    }
}
