//! Turns historian response text into [`Table`]s.
//!
//! The historian answers either with tab-separated text (first line is the
//! header) or with an HTML page holding one or more `<table>` elements.

use crate::constants::*;
use crate::decode_helpers::{normalize_decimal, split_fields};
use crate::error::{Error, Malformed, Result};
use crate::logbook::Logbook;
use crate::types::Table;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static TABLE_OPEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<table[\s>]").expect("Failed to compile table tag regex"));

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("Failed to parse table selector"));

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to parse row selector"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    Tabular,
    Html,
}

impl ContentFormat {
    pub fn detect(text: &str) -> Self {
        if TABLE_OPEN_REGEX.is_match(text) {
            ContentFormat::Html
        } else {
            ContentFormat::Tabular
        }
    }
}

/// Parses a response and returns its first table.
pub fn parse_response(text: &str) -> Result<Table> {
    DecoderContext::new().decode_response(text)
}

/// Parses a response and returns every table in it, in document order.
pub fn parse_tables(text: &str) -> Result<Vec<Table>> {
    DecoderContext::new().decode_tables(text)
}

/// Response decoder, optionally reporting data errors to a session logbook.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecoderContext<'a> {
    logbook: Option<&'a Logbook>,
}

impl<'a> DecoderContext<'a> {
    pub fn new() -> Self {
        Self { logbook: None }
    }

    pub fn with_logbook(logbook: &'a Logbook) -> Self {
        Self {
            logbook: Some(logbook),
        }
    }

    pub fn decode_response(&self, text: &str) -> Result<Table> {
        self.decode_tables(text)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::malformed(Malformed::NoTable))
    }

    pub fn decode_tables(&self, text: &str) -> Result<Vec<Table>> {
        if text.trim().is_empty() {
            return Err(Error::malformed(Malformed::Empty));
        }

        let format = ContentFormat::detect(text);
        debug!("Decoding {} byte response as {:?}", text.len(), format);

        match format {
            ContentFormat::Tabular => self.decode_tabular(text).map(|table| vec![table]),
            ContentFormat::Html => decode_html(text),
        }
    }

    fn decode_tabular(&self, text: &str) -> Result<Table> {
        let mut lines = text.split(LINE_SEPARATOR).enumerate();
        let header = lines.next().map(|(_, line)| split_fields(line)).unwrap_or_default();

        let mut rows = Vec::new();
        for (idx, line) in lines {
            if line.trim_end_matches(CARRIAGE_RETURN).is_empty() {
                continue;
            }

            let fields: Vec<String> = split_fields(line)
                .iter()
                .map(|field| normalize_decimal(field))
                .collect();

            if fields.last().map(String::as_str) == Some(BAD_ROW_SENTINEL) {
                let err = Error::BadData { line: idx + 1 };
                self.report(&err);
                return Err(err);
            }

            rows.push(fields);
        }

        debug!("Decoded {} columns, {} rows", header.len(), rows.len());
        Table::new(header, rows)
    }

    fn report(&self, err: &Error) {
        match self.logbook {
            Some(logbook) => logbook.warn(err.to_string()),
            None => tracing::warn!("{}", err),
        }
    }
}

fn decode_html(text: &str) -> Result<Vec<Table>> {
    let document = Html::parse_document(text);

    let mut tables = Vec::new();
    for table in document.select(&TABLE_SELECTOR) {
        if let Some(parsed) = decode_html_table(table)? {
            tables.push(parsed);
        }
    }

    debug!("Decoded {} HTML tables", tables.len());
    if tables.is_empty() {
        return Err(Error::malformed(Malformed::NoTable));
    }
    Ok(tables)
}

/// Header comes from a leading row of `<th>` cells; otherwise columns are
/// numbered from 0. Short rows are padded with empty cells.
fn decode_html_table(table: ElementRef<'_>) -> Result<Option<Table>> {
    let mut rows: Vec<(bool, Vec<String>)> = table
        .select(&ROW_SELECTOR)
        .filter(|row| owned_by(*row, table))
        .map(row_cells)
        .filter(|(_, cells)| !cells.is_empty())
        .collect();

    if rows.is_empty() {
        return Ok(None);
    }

    let header = if rows[0].0 {
        let (_, names) = rows.remove(0);
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                if name.is_empty() {
                    format!("Unnamed: {}", i)
                } else {
                    name
                }
            })
            .collect()
    } else {
        let width = rows.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);
        (0..width).map(|i| i.to_string()).collect::<Vec<_>>()
    };

    let body = rows
        .into_iter()
        .map(|(_, mut cells)| {
            if cells.len() < header.len() {
                cells.resize(header.len(), String::new());
            }
            cells
        })
        .collect();

    Table::new(header, body).map(Some)
}

/// True when `table` is the nearest enclosing table of `row`.
fn owned_by(row: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    row.ancestors()
        .find(|node| {
            node.value()
                .as_element()
                .map_or(false, |el| el.name() == "table")
        })
        .map_or(false, |node| node.id() == table.id())
}

/// Cells of one row, with `colspan` expanded. The flag is true when every
/// cell is a `<th>`.
fn row_cells(row: ElementRef<'_>) -> (bool, Vec<String>) {
    let mut all_headers = true;
    let mut cells = Vec::new();

    for cell in row.children().filter_map(ElementRef::wrap) {
        let name = cell.value().name();
        if name != "td" && name != "th" {
            continue;
        }
        all_headers &= name == "th";

        let text = cell.text().collect::<Vec<_>>().join(" ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .map(|n| n.min(MAX_COLSPAN))
            .unwrap_or(1);

        for _ in 0..span {
            cells.push(text.clone());
        }
    }

    (all_headers && !cells.is_empty(), cells)
}
