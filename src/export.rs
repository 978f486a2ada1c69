// export.rs

use crate::constants::FIELD_SEPARATOR;
use crate::error::{Error, Result};
use crate::types::Table;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Renderings available for a parsed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFormat {
    #[default]
    Csv,
    Text,
    Json,
}

pub fn export_table(table: &Table, format: TableFormat) -> Result<String> {
    match format {
        TableFormat::Csv => export_to_csv(table),
        TableFormat::Text => export_to_text(table),
        TableFormat::Json => export_to_json(table),
    }
}

/// Exports a table to CSV, header first
pub fn export_to_csv(table: &Table) -> Result<String> {
    write_table(table, csv::WriterBuilder::new().from_writer(vec![]))
}

/// Exports a table as tab-separated text, the layout the historian itself uses
pub fn export_to_text(table: &Table) -> Result<String> {
    let wtr = csv::WriterBuilder::new()
        .delimiter(FIELD_SEPARATOR as u8)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(vec![]);
    write_table(table, wtr)
}

fn write_table(table: &Table, mut wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

struct Record<'a>(Vec<(&'a str, &'a str)>);

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (column, value) in &self.0 {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Exports a table as a JSON array with one object per row, keys in column order
pub fn export_to_json(table: &Table) -> Result<String> {
    let records: Vec<Record<'_>> = table.records().map(Record).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}
