use crate::models::{rank_value::parse_rank_text, Group, Record};
use crate::transcode::headers::{is_reserved_sheet, Column};
use log::debug;

/// A cell value as read from a workbook or CSV file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.is_empty(),
            Cell::Number(_) => false,
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
                (*value as i64).to_string()
            }
            Cell::Number(value) => value.to_string(),
            Cell::Text(text) => text.clone(),
        }
    }

    /// Numeric coercion; text that doesn't parse as a finite number is unset.
    pub fn to_rank(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(value) => Some(*value).filter(|value| value.is_finite()),
            Cell::Text(text) => parse_rank_text(text),
        }
    }
}

/// One sheet: a header row plus data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Splits raw rows into header and data, skipping rows with no content.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut rows = rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.is_empty()));

        let header = rows
            .next()
            .map(|row| row.iter().map(|cell| cell.to_text().trim().to_string()).collect())
            .unwrap_or_default();

        Self {
            name: name.into(),
            header,
            rows: rows.collect(),
        }
    }

    // First alias present in the header with a non-empty cell in this row
    fn lookup<'a>(&self, row: &'a [Cell], column: Column) -> Option<&'a Cell> {
        column.aliases().into_iter().find_map(|alias| {
            self.header
                .iter()
                .position(|header| header == alias)
                .and_then(|index| row.get(index))
                .filter(|cell| !cell.is_empty())
        })
    }

    fn to_record(&self, row: &[Cell]) -> Record {
        Record {
            name: self
                .lookup(row, Column::Name)
                .map(Cell::to_text)
                .unwrap_or_default(),
            old_rank: self.lookup(row, Column::OldRank).and_then(Cell::to_rank),
            new_rank: self.lookup(row, Column::NewRank).and_then(Cell::to_rank),
            ..Record::blank()
        }
    }
}

/// One group per non-reserved sheet, one record per data row. Sheets without
/// data rows are dropped.
pub fn tables_to_groups(tables: Vec<Table>) -> Vec<Group> {
    tables
        .into_iter()
        .filter_map(|table| {
            if is_reserved_sheet(&table.name) {
                debug!("Skipping summary sheet '{}'", table.name);
                return None;
            }
            let records: Vec<Record> = table.rows.iter().map(|row| table.to_record(row)).collect();
            if records.is_empty() {
                debug!("Dropping empty sheet '{}'", table.name);
                return None;
            }
            Some(Group::new(table.name, records))
        })
        .collect()
}
