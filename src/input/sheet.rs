//! Load the recipient table from a spreadsheet.
//!
//! The first sheet of the workbook is used. Its first row is the header;
//! the key, name and mail columns are located by header text, and any other
//! columns are ignored. Formats: anything calamine opens (xlsx, xlsm, xls,
//! xlsb, ods).

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::{debug, info};

use crate::config::BatchConfig;
use crate::error::{MailerError, Result};
use crate::model::recipient::{RecipientRow, RecipientTable};

/// Header names of the three required columns.
#[derive(Debug, Clone)]
pub struct Columns {
    pub key: String,
    pub name: String,
    pub mail: String,
}

impl From<&BatchConfig> for Columns {
    fn from(batch: &BatchConfig) -> Self {
        Self {
            key: batch.key_column.clone(),
            name: batch.name_column.clone(),
            mail: batch.mail_column.clone(),
        }
    }
}

impl Default for Columns {
    fn default() -> Self {
        Self::from(&BatchConfig::default())
    }
}

/// Open a workbook and read the recipient table from its first sheet.
pub fn load_sheet(path: &Path, columns: &Columns) -> Result<RecipientTable> {
    if !path.exists() {
        return Err(MailerError::FileNotFound(path.to_path_buf()));
    }

    let spreadsheet_err = |reason: String| MailerError::Spreadsheet {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_err(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_err("workbook has no sheets".to_string()))?
        .map_err(|e| spreadsheet_err(e.to_string()))?;

    let table = table_from_range(&range, columns)?;
    info!(path = %path.display(), rows = table.len(), "Loaded recipient table");
    Ok(table)
}

/// Build the recipient table from a cell range whose first row is the header.
pub fn table_from_range(range: &Range<Data>, columns: &Columns) -> Result<RecipientTable> {
    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(cell_text).collect(),
        None => Vec::new(),
    };
    table_from_rows(
        &header,
        rows.map(|cells| cells.iter().map(cell_text).collect::<Vec<_>>()),
        columns,
    )
}

/// Build the recipient table from already-stringified rows.
///
/// Fails with [`MailerError::MissingColumns`] naming every required column
/// absent from `header`. Rows where all three fields are blank are dropped
/// (trailing formatting in spreadsheets often produces them).
pub fn table_from_rows(
    header: &[String],
    rows: impl Iterator<Item = Vec<String>>,
    columns: &Columns,
) -> Result<RecipientTable> {
    let position = |wanted: &str| header.iter().position(|h| h.trim() == wanted);

    let (key_idx, name_idx, mail_idx) = match (
        position(&columns.key),
        position(&columns.name),
        position(&columns.mail),
    ) {
        (Some(k), Some(n), Some(m)) => (k, n, m),
        (k, n, m) => {
            let missing = [(k, &columns.key), (n, &columns.name), (m, &columns.mail)]
                .into_iter()
                .filter(|(idx, _)| idx.is_none())
                .map(|(_, name)| name.clone())
                .collect();
            return Err(MailerError::MissingColumns(missing));
        }
    };

    let mut recipients = Vec::new();
    for row in rows {
        let field = |idx: usize| row.get(idx).cloned().unwrap_or_default();
        let (key, name, mail) = (field(key_idx), field(name_idx), field(mail_idx));
        if key.trim().is_empty() && name.trim().is_empty() && mail.trim().is_empty() {
            debug!("Skipping blank spreadsheet row");
            continue;
        }
        recipients.push(RecipientRow::new(&key, name, mail));
    }

    Ok(RecipientTable::new(recipients))
}

/// Render a cell the way it reads in the sheet.
///
/// Whole-number floats lose their `.0` so numeric keys match file names.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_rows_with_extra_columns() {
        let header = strings(&["Id", "Mail", "PAN", "Dept", "Name"]);
        let rows = vec![
            strings(&["1", "a@x.com", " ABC123 ", "HR", "Alice"]),
            strings(&["2", "b@x.com", "ZZZ999", "IT", "Bob"]),
        ];
        let table = table_from_rows(&header, rows.into_iter(), &Columns::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], RecipientRow::new("ABC123", "Alice", "a@x.com"));
        assert_eq!(table.rows()[1].key, "ZZZ999");
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let header = strings(&["Name", "Email"]);
        let err = table_from_rows(&header, std::iter::empty(), &Columns::default()).unwrap_err();
        match err {
            MailerError::MissingColumns(missing) => assert_eq!(missing, vec!["PAN", "Mail"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_rows_dropped_and_short_rows_padded() {
        let header = strings(&["PAN", "Name", "Mail"]);
        let rows = vec![strings(&["", " ", ""]), strings(&["K1", "Carol"])];
        let table = table_from_rows(&header, rows.into_iter(), &Columns::default()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].email, "");
    }

    #[test]
    fn test_custom_column_names() {
        let columns = Columns {
            key: "Ref".into(),
            name: "Full name".into(),
            mail: "E-mail".into(),
        };
        let header = strings(&["Ref", "Full name", "E-mail"]);
        let rows = vec![strings(&["R-1", "Dan", "d@x.com"])];
        let table = table_from_rows(&header, rows.into_iter(), &columns).unwrap();
        assert_eq!(table.rows()[0].key, "R-1");
    }

    #[test]
    fn test_table_from_range() {
        let mut range = Range::new((0, 0), (2, 2));
        range.set_value((0, 0), Data::String("PAN".to_string()));
        range.set_value((0, 1), Data::String("Name".to_string()));
        range.set_value((0, 2), Data::String("Mail".to_string()));
        range.set_value((1, 0), Data::String("ABC123".to_string()));
        range.set_value((1, 1), Data::String("Alice".to_string()));
        range.set_value((1, 2), Data::String("a@x.com".to_string()));
        range.set_value((2, 0), Data::Float(4711.0));
        range.set_value((2, 1), Data::String("Bob".to_string()));
        range.set_value((2, 2), Data::String("b@x.com".to_string()));

        let table = table_from_range(&range, &Columns::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].name, "Alice");
        assert_eq!(table.rows()[1].key, "4711");
    }

    #[test]
    fn test_empty_range_reports_missing_columns() {
        let range: Range<Data> = Range::empty();
        let err = table_from_range(&range, &Columns::default()).unwrap_err();
        assert!(matches!(err, MailerError::MissingColumns(ref m) if m.len() == 3));
    }

    #[test]
    fn test_load_sheet_unreadable_workbook() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(b"this is not a workbook").unwrap();
        let err = load_sheet(file.path(), &Columns::default()).unwrap_err();
        assert!(matches!(err, MailerError::Spreadsheet { .. }));
    }

    #[test]
    fn test_load_sheet_missing_file() {
        let err = load_sheet(Path::new("/nonexistent/people.xlsx"), &Columns::default())
            .unwrap_err();
        assert!(matches!(err, MailerError::FileNotFound(_)));
    }
}
