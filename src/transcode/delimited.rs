use crate::error::TranscodeError;
use crate::transcode::tabular::{Cell, Table};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads a CSV file as a single sheet named `sheet_name`.
pub fn read_csv(sheet_name: &str, bytes: &[u8]) -> Result<Vec<Table>, TranscodeError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(vec![Table::from_rows(sheet_name, rows)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcode::tabular::tables_to_groups;

    #[test]
    fn csv_becomes_one_group() {
        let data = "\u{feff}Name,Previous Rank,Current Rank\nAnn,10,8\n,,\nBo,,3\n";
        let groups = tables_to_groups(read_csv("class-a", data.as_bytes()).unwrap());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "class-a");
        let records = &groups[0].records;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Ann");
        assert_eq!((records[0].old_rank, records[0].new_rank), (Some(10.0), Some(8.0)));
        assert_eq!((records[1].old_rank, records[1].new_rank), (None, Some(3.0)));
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let data = b"Name\n\xff\xfe\n";
        assert!(read_csv("x", data).is_err());
    }
}
