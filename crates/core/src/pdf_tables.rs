//! PDF to Excel via positional table extraction.
//!
//! Each page's text lines are split into cells at wide horizontal gaps. Cell
//! left edges are clustered across the whole page to find the columns, so a
//! row with a missing value still lines up under the right header.

use crate::config::{ExtractionConfig, SheetLayout};
use crate::error::{ConversionError, Result};
use crate::pdf_engine::PdfEngine;
use crate::pdf_text::{group_into_lines, page_glyphs, TextLine};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::sync::Arc;
use tracing::debug;

/// Rows of one page. Each row holds `(column, text)` pairs with strictly
/// increasing columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageTable {
    pub rows: Vec<Vec<(usize, String)>>,
}

impl PageTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns spanned by the table.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .filter_map(|row| row.last().map(|(col, _)| col + 1))
            .max()
            .unwrap_or(0)
    }
}

/// Extracts tables from PDFs and writes them to an xlsx workbook.
pub struct PdfTableExtractor {
    engine: Arc<PdfEngine>,
    config: ExtractionConfig,
}

impl PdfTableExtractor {
    pub fn new(engine: Arc<PdfEngine>, config: ExtractionConfig) -> Self {
        Self { engine, config }
    }

    /// One table per page, in page order.
    pub fn extract(&self, pdf_bytes: &[u8]) -> Result<Vec<PageTable>> {
        let document = self.engine.open(pdf_bytes)?;

        let mut tables = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            let lines = group_into_lines(page_glyphs(&page), self.config.line_tolerance);
            let table = build_table(&lines, &self.config);
            debug!(
                "Page {}: {} rows, {} columns",
                index + 1,
                table.rows.len(),
                table.column_count()
            );
            tables.push(table);
        }
        Ok(tables)
    }

    /// Extract every page and return the xlsx bytes.
    pub fn convert(&self, pdf_bytes: &[u8]) -> Result<Vec<u8>> {
        let tables = self.extract(pdf_bytes)?;
        write_workbook(&tables, self.config.sheet_layout)
    }
}

/// Lay the cells of `lines` out on a grid.
pub fn build_table(lines: &[TextLine], config: &ExtractionConfig) -> PageTable {
    let line_cells: Vec<_> = lines
        .iter()
        .map(|line| line.cells(config.cell_gap, config.word_gap))
        .filter(|cells| !cells.is_empty())
        .collect();

    let mut lefts: Vec<f32> = line_cells
        .iter()
        .flat_map(|cells| cells.iter().map(|c| c.left))
        .collect();
    let anchors = column_anchors(&mut lefts, config.column_tolerance);

    let rows = line_cells
        .into_iter()
        .map(|cells| {
            let mut row = Vec::with_capacity(cells.len());
            let mut prev: Option<usize> = None;
            for cell in cells {
                let mut column = anchors
                    .iter()
                    .rposition(|&anchor| anchor <= cell.left)
                    .unwrap_or(0);
                if let Some(p) = prev {
                    if column <= p {
                        column = p + 1;
                    }
                }
                prev = Some(column);
                row.push((column, cell.text));
            }
            row
        })
        .collect();

    PageTable { rows }
}

/// Cluster left edges; each anchor is the smallest edge of its cluster.
fn column_anchors(lefts: &mut [f32], tolerance: f32) -> Vec<f32> {
    lefts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut anchors: Vec<f32> = Vec::new();
    for &left in lefts.iter() {
        match anchors.last() {
            Some(&anchor) if left - anchor <= tolerance => {}
            _ => anchors.push(left),
        }
    }
    anchors
}

/// Interpret a cell as a number when it looks like one.
///
/// Commas count as thousands separators only in well-formed groups
/// (`12,345.6`); anything else with a comma stays text. Values with a
/// leading zero such as postal codes stay text.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if !text.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
    {
        return None;
    }

    let unsigned = text.trim_start_matches(['-', '+']);
    let bytes = unsigned.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' && bytes[1].is_ascii_digit() {
        return None;
    }

    if unsigned.contains(',') && !is_grouped(unsigned) {
        return None;
    }

    text.replace(',', "").parse::<f64>().ok()
}

/// `d{1,3}(,ddd)+` optionally followed by `.digits`.
fn is_grouped(unsigned: &str) -> bool {
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };
    if fraction.is_some_and(|f| f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit())) {
        return false;
    }

    let mut groups = integer.split(',');
    let first_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()));
    first_ok && groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

/// Write page tables into a workbook according to `layout`.
pub fn write_workbook(tables: &[PageTable], layout: SheetLayout) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    match layout {
        SheetLayout::SingleSheet => {
            let worksheet = workbook.add_worksheet();
            let mut next_row = 0usize;
            let mut wrote_page = false;
            for table in tables.iter().filter(|t| !t.is_empty()) {
                if wrote_page {
                    next_row += 1;
                }
                next_row = write_rows(worksheet, table, next_row)?;
                wrote_page = true;
            }
        }
        SheetLayout::SheetPerPage => {
            for (index, table) in tables.iter().enumerate() {
                let worksheet = workbook
                    .add_worksheet()
                    .set_name(format!("Page {}", index + 1))
                    .map_err(|e| ConversionError::encode("XLSX", e))?;
                write_rows(worksheet, table, 0)?;
            }
            if tables.is_empty() {
                workbook.add_worksheet();
            }
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ConversionError::encode("XLSX", e))
}

/// Write `table` starting at `first_row`; returns the row after the last one written.
fn write_rows(worksheet: &mut Worksheet, table: &PageTable, first_row: usize) -> Result<usize> {
    let mut row_index = first_row;
    for row in &table.rows {
        let row_number = u32::try_from(row_index)
            .map_err(|_| ConversionError::encode("XLSX", "too many rows"))?;
        for (column, text) in row {
            let column_number = u16::try_from(*column)
                .map_err(|_| ConversionError::encode("XLSX", "too many columns"))?;
            match parse_number(text) {
                Some(number) => worksheet.write_number(row_number, column_number, number),
                None => worksheet.write_string(row_number, column_number, text),
            }
            .map_err(|e| ConversionError::encode("XLSX", e))?;
        }
        row_index += 1;
    }
    Ok(row_index)
}
