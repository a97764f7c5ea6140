use serde::Serialize;
use std::io::Write;
use tabled::{Table, Tabled};

use crate::cli::OutputFormat;
use crate::commands::Settings;
use crate::console::Console;
use crate::error::CommandError;
use crate::table_theme::TableTheme;

/// Renders projected rows: a titled table, or the rows as a JSON / YAML array.
///
/// Rows are printed in the order given; nothing is sorted.
pub fn write_rows<T, O, E>(
    rows: Vec<T>,
    title: &str,
    emoji_columns: &[usize],
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<(), CommandError>
where
    T: Tabled + Serialize,
    O: Write,
    E: Write,
{
    match settings.output() {
        OutputFormat::Table => {
            console.header(title)?;
            let table = if settings.emoji() {
                TableTheme::apply_with_emoji(Table::new(rows), emoji_columns)
            } else {
                TableTheme::apply_default(Table::new(rows))
            };
            writeln!(console.out(), "{table}")?;
        }
        OutputFormat::Json | OutputFormat::Yaml => write_document(&rows, settings, console)?,
    }
    Ok(())
}

/// Dumps any serializable value as JSON or YAML; table mode falls back to JSON.
pub fn write_document<T, O, E>(
    value: &T,
    settings: &Settings,
    console: &mut Console<O, E>,
) -> Result<(), CommandError>
where
    T: Serialize + ?Sized,
    O: Write,
    E: Write,
{
    match settings.output() {
        OutputFormat::Yaml => {
            write!(console.out(), "{}", serde_yaml::to_string(value)?)?;
        }
        OutputFormat::Json | OutputFormat::Table => {
            let out = console.out();
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
