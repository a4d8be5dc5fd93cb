//! Recipient rows loaded from the spreadsheet.

/// A single recipient: who gets mail, and which key their documents carry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RecipientRow {
    /// Matching key, trimmed of surrounding whitespace.
    pub key: String,

    /// Display name used in the subject and body.
    pub name: String,

    /// Destination address, used verbatim.
    pub email: String,
}

impl RecipientRow {
    /// Build a row, trimming the key.
    pub fn new(key: &str, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            key: key.trim().to_string(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// All recipient rows of one spreadsheet, in sheet order.
#[derive(Debug, Clone, Default)]
pub struct RecipientTable {
    rows: Vec<RecipientRow>,
}

impl RecipientTable {
    pub fn new(rows: Vec<RecipientRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[RecipientRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecipientRow> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a RecipientTable {
    type Item = &'a RecipientRow;
    type IntoIter = std::slice::Iter<'a, RecipientRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_trimmed() {
        let row = RecipientRow::new("  ABC123 \t", "Alice", "a@x.com");
        assert_eq!(row.key, "ABC123");
    }

    #[test]
    fn test_name_and_email_kept_verbatim() {
        let row = RecipientRow::new("K", " Alice ", "not-an-address");
        assert_eq!(row.name, " Alice ");
        assert_eq!(row.email, "not-an-address");
    }
}
