use crate::error::TranscodeError;
use crate::locale::Labels;
use crate::models::Group;
use crate::scoring::{round4, select_winner, valid_count};
use crate::transcode::headers::reserved_sheet_names;
use crate::transcode::tabular::{Cell, Table};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use lazy_static::lazy_static;
use regex::Regex;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::collections::HashSet;
use std::io::Cursor;

/// Longest sheet name a workbook accepts.
pub const MAX_SHEET_NAME: usize = 31;

lazy_static! {
    static ref ILLEGAL_SHEET_CHARS: Regex = Regex::new(r"[\[\]:*?/\\]").unwrap();
}

/// Hands out unique, valid sheet names. Comparison is case-insensitive, as in
/// spreadsheet applications.
struct SheetNamer {
    used: HashSet<String>,
}

impl SheetNamer {
    fn new(reserved: &[&str]) -> Self {
        let mut used: HashSet<String> = reserved.iter().map(|name| name.to_lowercase()).collect();
        // Excel keeps this one for itself
        used.insert("history".to_string());
        Self { used }
    }

    fn claim(&mut self, wanted: &str, position: usize) -> String {
        let cleaned = ILLEGAL_SHEET_CHARS.replace_all(wanted, "_");
        let cleaned = cleaned.trim_matches('\'').trim();
        let base = if cleaned.is_empty() {
            format!("Sheet{}", position)
        } else {
            cleaned.to_string()
        };

        let mut candidate = truncate(&base, MAX_SHEET_NAME);
        let mut suffix = 2;
        while self.used.contains(&candidate.to_lowercase()) {
            let tail = format!(" ({})", suffix);
            candidate = format!("{}{}", truncate(&base, MAX_SHEET_NAME - tail.chars().count()), tail);
            suffix += 1;
        }

        self.used.insert(candidate.to_lowercase());
        candidate
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn write_header(sheet: &mut Worksheet, headers: &[&str]) -> Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    Ok(())
}

fn write_rank(sheet: &mut Worksheet, row: u32, col: u16, rank: Option<f64>) -> Result<(), XlsxError> {
    if let Some(value) = rank {
        sheet.write_number(row, col, value)?;
    }
    Ok(())
}

fn write_coefficient(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    coefficient: Option<f64>,
    labels: &Labels,
) -> Result<(), XlsxError> {
    match coefficient {
        Some(z) => sheet.write_number(row, col, round4(z))?,
        None => sheet.write_string(row, col, labels.placeholder)?,
    };
    Ok(())
}

/// Builds the report workbook: an all-members detail sheet, a per-group
/// summary sheet, then one sheet per group.
///
/// `groups` must already be recomputed.
pub fn write_workbook(groups: &[Group], labels: &Labels) -> Result<Vec<u8>, TranscodeError> {
    let winner_id = select_winner(groups).map(|group| group.id.clone());
    let mut workbook = Workbook::new();

    let detail = workbook.add_worksheet();
    detail.set_name(labels.detail_sheet)?;
    write_header(
        detail,
        &[
            labels.group_header,
            labels.name_header,
            labels.old_rank_header,
            labels.new_rank_header,
            labels.coefficient_header,
        ],
    )?;
    let mut row = 1u32;
    for group in groups {
        for record in &group.records {
            detail.write_string(row, 0, group.name.as_str())?;
            if !record.name.is_empty() {
                detail.write_string(row, 1, record.name.as_str())?;
            }
            write_rank(detail, row, 2, record.old_rank)?;
            write_rank(detail, row, 3, record.new_rank)?;
            write_coefficient(detail, row, 4, record.coefficient, labels)?;
            row += 1;
        }
    }

    let summary = workbook.add_worksheet();
    summary.set_name(labels.summary_sheet)?;
    write_header(
        summary,
        &[
            labels.group_header,
            labels.valid_count_header,
            labels.total_header,
            labels.average_header,
            labels.winner_header,
        ],
    )?;
    for (index, group) in groups.iter().enumerate() {
        let row = index as u32 + 1;
        let is_winner = winner_id.as_deref() == Some(group.id.as_str());
        summary.write_string(row, 0, group.name.as_str())?;
        summary.write_number(row, 1, valid_count(group) as f64)?;
        summary.write_number(row, 2, round4(group.total_coefficient))?;
        summary.write_number(row, 3, round4(group.average_coefficient))?;
        summary.write_string(row, 4, if is_winner { labels.yes } else { labels.no })?;
    }

    let mut namer = SheetNamer::new(&reserved_sheet_names());
    for (index, group) in groups.iter().enumerate() {
        let sheet_name = namer.claim(&group.name, index + 1);
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name)?;
        write_header(
            sheet,
            &[
                labels.name_header,
                labels.old_rank_header,
                labels.new_rank_header,
                labels.coefficient_header,
            ],
        )?;
        for (offset, record) in group.records.iter().enumerate() {
            let row = offset as u32 + 1;
            if !record.name.is_empty() {
                sheet.write_string(row, 0, record.name.as_str())?;
            }
            write_rank(sheet, row, 1, record.old_rank)?;
            write_rank(sheet, row, 2, record.new_rank)?;
            write_coefficient(sheet, row, 3, record.coefficient, labels)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Float(value) => Cell::Number(*value),
        Data::String(text) => Cell::Text(text.clone()),
        Data::Bool(flag) => Cell::Text(flag.to_string()),
        Data::DateTime(value) => Cell::Number(value.as_f64()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Cell::Text(text.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

/// Reads every sheet of an xlsx/xls/xlsb/ods workbook.
pub fn read_workbook(bytes: &[u8]) -> Result<Vec<Table>, TranscodeError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let mut tables = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let rows: Vec<Vec<Cell>> = range
            .rows()
            .map(|row| row.iter().map(to_cell).collect::<Vec<Cell>>())
            .collect();
        tables.push(Table::from_rows(name, rows));
    }
    Ok(tables)
}
