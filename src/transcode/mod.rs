pub mod delimited;
pub mod headers;
pub mod json;
pub mod tabular;
pub mod workbook;

use crate::error::TranscodeError;
use crate::locale::Locale;
use crate::models::Group;
use crate::scoring;
use chrono::NaiveDate;
use std::path::Path;
use std::str::FromStr;

/// Import formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Workbook,
    Csv,
}

impl ImportFormat {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();

        match extension.as_str() {
            "json" => Some(ImportFormat::Json),
            "xlsx" | "xls" => Some(ImportFormat::Workbook),
            "csv" => Some(ImportFormat::Csv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Workbook,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "xlsx" => Ok(ExportFormat::Workbook),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

/// A generated download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Renders the collection in the requested format with a date-stamped name.
pub fn export_groups(
    groups: &[Group],
    format: ExportFormat,
    locale: Locale,
    date: NaiveDate,
) -> Result<ExportFile, TranscodeError> {
    let stamp = date.format("%Y-%m-%d");
    match format {
        ExportFormat::Json => Ok(ExportFile {
            filename: format!("progress-analysis-{}.json", stamp),
            bytes: json::to_json(groups)?.into_bytes(),
        }),
        ExportFormat::Workbook => {
            let labels = locale.labels();
            Ok(ExportFile {
                filename: format!("{}-{}.xlsx", labels.report_stem, stamp),
                bytes: workbook::write_workbook(&scoring::recompute(groups), labels)?,
            })
        }
    }
}

/// Parses an uploaded file into groups. All-or-nothing: any error means no groups.
pub fn import_file(filename: &str, bytes: &[u8]) -> Result<Vec<Group>, TranscodeError> {
    let format = ImportFormat::from_filename(filename).ok_or_else(|| TranscodeError::UnsupportedFormat {
        filename: filename.to_string(),
    })?;

    match format {
        ImportFormat::Json => json::from_json(bytes),
        ImportFormat::Workbook => Ok(tabular::tables_to_groups(workbook::read_workbook(bytes)?)),
        ImportFormat::Csv => {
            let sheet_name = Path::new(filename)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or(filename);
            Ok(tabular::tables_to_groups(delimited::read_csv(sheet_name, bytes)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_extension() {
        assert_eq!(ImportFormat::from_filename("a.JSON"), Some(ImportFormat::Json));
        assert_eq!(ImportFormat::from_filename("report.xlsx"), Some(ImportFormat::Workbook));
        assert_eq!(ImportFormat::from_filename("old.xls"), Some(ImportFormat::Workbook));
        assert_eq!(ImportFormat::from_filename("list.csv"), Some(ImportFormat::Csv));
        assert_eq!(ImportFormat::from_filename("notes.txt"), None);
        assert_eq!(ImportFormat::from_filename("noext"), None);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        assert!(matches!(
            import_file("photo.png", b""),
            Err(TranscodeError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn filenames_are_date_stamped() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let json = export_groups(&[], ExportFormat::Json, Locale::English, date).unwrap();
        assert_eq!(json.filename, "progress-analysis-2026-10-19.json");
        assert_eq!(json.bytes, b"[]");

        let xlsx = export_groups(&[], ExportFormat::Workbook, Locale::English, date).unwrap();
        assert_eq!(xlsx.filename, "progress-report-2026-10-19.xlsx");
        assert!(!xlsx.bytes.is_empty());
    }

    #[test]
    fn csv_group_is_named_after_the_file() {
        let groups = import_file("class-b.csv", "姓名,前次排名,后次排名\n王五,3,1\n".as_bytes()).unwrap();
        assert_eq!(groups[0].name, "class-b");
        assert_eq!(groups[0].records[0].name, "王五");
    }
}
