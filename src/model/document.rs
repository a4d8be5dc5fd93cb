//! Documents extracted from archive inputs.

/// One file pulled out of an archive, held in memory for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Basename of the archive entry (directory components stripped).
    /// Used verbatim as the attachment filename.
    pub name: String,

    /// Decompressed entry bytes.
    pub content: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}
