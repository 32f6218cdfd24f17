//! CSV export of enriched keyword records.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::KeywordScoutError;
use crate::keyword::KeywordRecord;

/// Column order of the export file.
pub const EXPORT_COLUMNS: [&str; 7] = [
    "related_keyword",
    "mobile_volume",
    "pc_volume",
    "total_volume",
    "competition_index",
    "document_count",
    "competition_ratio",
];

/// `keyword_analysis_<YYYYmmdd_HHMMSS>.csv`
pub fn export_file_name(at: DateTime<Local>) -> String {
    format!("keyword_analysis_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Writes a header row and one row per record, in order. Unenriched fields
/// are left empty.
pub fn write_records<W: Write>(
    writer: W,
    records: &[KeywordRecord],
) -> Result<(), KeywordScoutError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        wtr.write_record(EXPORT_COLUMNS).map_err(export_err)?;
    }
    for record in records {
        wtr.serialize(record).map_err(export_err)?;
    }
    wtr.flush()
        .map_err(|e| KeywordScoutError::Export(e.to_string()))?;
    Ok(())
}

/// Same-second exports get a `_2`, `_3`, ... suffix up to this many files.
const MAX_SAME_SECOND_EXPORTS: u32 = 100;

/// Writes the export into `dir`, returning the new file's path. Existing
/// files are never overwritten.
pub fn write_export(
    dir: &Path,
    records: &[KeywordRecord],
    at: DateTime<Local>,
) -> Result<PathBuf, KeywordScoutError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        KeywordScoutError::Export(format!("cannot create {}: {}", dir.display(), e))
    })?;
    let (path, file) = create_unique(dir, at)?;
    write_records(file, records)?;
    tracing::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(path)
}

fn create_unique(
    dir: &Path,
    at: DateTime<Local>,
) -> Result<(PathBuf, std::fs::File), KeywordScoutError> {
    let base = export_file_name(at);
    let stem = base.trim_end_matches(".csv");
    for n in 1..=MAX_SAME_SECOND_EXPORTS {
        let name = if n == 1 {
            base.clone()
        } else {
            format!("{}_{}.csv", stem, n)
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(KeywordScoutError::Export(format!(
                    "cannot create {}: {}",
                    path.display(),
                    e
                )))
            }
        }
    }
    Err(KeywordScoutError::Export(format!(
        "too many exports named {} in {}",
        base,
        dir.display()
    )))
}

fn export_err(e: csv::Error) -> KeywordScoutError {
    KeywordScoutError::Export(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Vec<KeywordRecord> {
        let mut first = KeywordRecord::new("tent", 600, 400, "high");
        first.apply_document_count(500);
        let second = KeywordRecord::new("tarp", 10, 10, "low");
        vec![first, second]
    }

    #[test]
    fn file_name_uses_timestamp() {
        let at = Local.with_ymd_and_hms(2026, 10, 16, 9, 15, 2).unwrap();
        assert_eq!(export_file_name(at), "keyword_analysis_20261016_091502.csv");
    }

    #[test]
    fn rows_follow_column_order() {
        let mut out = Vec::new();
        write_records(&mut out, &sample()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], EXPORT_COLUMNS.join(","));
        assert_eq!(lines[1], "tent,600,400,1000,high,500,2.0");
        assert_eq!(lines[2], "tarp,10,10,20,low,,");
    }

    #[test]
    fn empty_export_still_has_header() {
        let mut out = Vec::new();
        write_records(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), EXPORT_COLUMNS.join(","));
    }

    #[test]
    fn writes_file_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let at = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let path = write_export(dir.path(), &sample(), at).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "keyword_analysis_20260102_030405.csv"
        );
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn same_second_exports_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let at = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let first = write_export(dir.path(), &sample(), at).unwrap();
        let second = write_export(dir.path(), &sample()[..1], at).unwrap();

        assert_ne!(first, second);
        assert_eq!(
            second.file_name().unwrap().to_str().unwrap(),
            "keyword_analysis_20260102_030405_2.csv"
        );
        assert_eq!(std::fs::read_to_string(first).unwrap().lines().count(), 3);
        assert_eq!(std::fs::read_to_string(second).unwrap().lines().count(), 2);
    }
}
