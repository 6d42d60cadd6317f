//! Identifier ingestion from a spreadsheet column
//!
//! The sheet is expected as a CSV export with a header row. Blank cells count
//! as 0, which is then dropped along with duplicates. A row too short to reach
//! the identifier column is rejected.

use crate::error::{CheckerError, Result};
use crate::types::Identifier;
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_COLUMN: &str = "nro_nit";

/// Read the unique, non-zero identifiers of `column`, keeping first-seen order
pub fn read_identifiers(path: &Path, column: &str) -> Result<Vec<Identifier>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CheckerError::Input(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_identifiers(&content, column)
        .map_err(|e| match e {
            CheckerError::Input(msg) => CheckerError::Input(format!("{}: {}", path.display(), msg)),
            other => other,
        })
}

/// Parse CSV text; see [`read_identifiers`]
pub fn parse_identifiers(content: &str, column: &str) -> Result<Vec<Identifier>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let delimiter = detect_delimiter(content.lines().next().unwrap_or(""));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers().map_err(malformed)?;
    if headers.is_empty() {
        return Err(CheckerError::Input("file is empty".to_string()));
    }
    let position = headers
        .iter()
        .position(|name| name == column)
        .ok_or_else(|| CheckerError::Input(format!("column '{}' not found", column)))?;

    let mut seen = HashSet::new();
    let mut identifiers = Vec::new();

    for record in reader.records() {
        let record = record.map_err(malformed)?;
        let row = record.position().map(|p| p.line()).unwrap_or_default();

        let cell = record.get(position).ok_or_else(|| {
            CheckerError::Input(format!(
                "row {}: expected at least {} columns, found {}",
                row,
                position + 1,
                record.len()
            ))
        })?;
        let value = parse_cell(cell).ok_or_else(|| {
            CheckerError::Input(format!("row {}: '{}' is not a valid identifier", row, cell))
        })?;

        if value != 0 && seen.insert(value) {
            identifiers.push(Identifier::Number(value));
        }
    }

    Ok(identifiers)
}

fn malformed(err: csv::Error) -> CheckerError {
    CheckerError::Input(format!("malformed CSV: {}", err))
}

fn detect_delimiter(header: &str) -> u8 {
    if header.contains(';') && !header.contains(',') {
        b';'
    } else {
        b','
    }
}

/// Blank is 0, decimals like `20123456789.0` are truncated
fn parse_cell(cell: &str) -> Option<u64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Some(0);
    }
    if let Ok(value) = cell.parse::<u64>() {
        return Some(value);
    }
    let value = cell.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0 && value < u64::MAX as f64).then(|| value.trunc() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn dedups_and_drops_blanks() {
        let csv = "nombre,nro_nit\nAna,20111111112\nLuis,\nEva,20222222223\nAna,20111111112\nX,0\n";
        let ids = parse_identifiers(csv, "nro_nit").unwrap();
        assert_eq!(
            ids,
            vec![Identifier::Number(20111111112), Identifier::Number(20222222223)]
        );
    }

    #[test]
    fn decimals_and_quotes_are_handled() {
        let csv = "\"razon, social\",nro_nit\n\"ACME, S.A.\",30712345678.0\n\"Foo \"\"Bar\"\"\",27123456780\n";
        let ids = parse_identifiers(csv, "nro_nit").unwrap();
        assert_eq!(
            ids,
            vec![Identifier::Number(30712345678), Identifier::Number(27123456780)]
        );
    }

    #[test]
    fn semicolon_exports_are_supported() {
        let csv = "id;nro_nit\n1;20333333334\n";
        let ids = parse_identifiers(csv, "nro_nit").unwrap();
        assert_eq!(ids, vec![Identifier::Number(20333333334)]);
    }

    #[test]
    fn missing_column_is_an_input_error() {
        let err = parse_identifiers("a,b\n1,2\n", "nro_nit").unwrap_err();
        assert!(matches!(err, CheckerError::Input(ref msg) if msg.contains("nro_nit")));
    }

    #[test]
    fn garbage_cell_reports_row() {
        let err = parse_identifiers("nro_nit\n123\nabc\n", "nro_nit").unwrap_err();
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let ids = parse_identifiers("\u{feff}nro_nit,nombre\n20111111112,Ana\n", "nro_nit").unwrap();
        assert_eq!(ids, vec![Identifier::Number(20111111112)]);
    }

    #[test]
    fn quoted_newline_stays_in_one_row() {
        let csv = "nombre,nro_nit\n\"Ana\nMaria\",20111111112\nLuis,20222222223\n";
        let ids = parse_identifiers(csv, "nro_nit").unwrap();
        assert_eq!(
            ids,
            vec![Identifier::Number(20111111112), Identifier::Number(20222222223)]
        );
    }

    #[test]
    fn short_row_is_an_input_error() {
        let err = parse_identifiers("nombre,nro_nit\nAna,20111111112\nLuis\n", "nro_nit").unwrap_err();
        assert!(matches!(err, CheckerError::Input(ref msg) if msg.contains("row 3")));
    }

    #[test]
    fn empty_file_is_an_input_error() {
        assert!(matches!(
            parse_identifiers("", "nro_nit"),
            Err(CheckerError::Input(_))
        ));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "nro_nit").unwrap();
        writeln!(file, "20444444445").unwrap();

        let ids = read_identifiers(file.path(), DEFAULT_COLUMN).unwrap();
        assert_eq!(ids, vec![Identifier::Number(20444444445)]);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = read_identifiers(Path::new("/definitely/not/here.csv"), DEFAULT_COLUMN).unwrap_err();
        assert!(matches!(err, CheckerError::Input(_)));
    }
}
