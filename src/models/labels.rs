//! Class label lists.

use std::io::{self, Read};

/// Label reported for class indices past the end of the label list.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Ordered class labels; index = class index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels {
    names: Vec<String>,
}

impl Labels {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Split newline-delimited text into labels, one per line.
    ///
    /// `\r\n` endings are accepted and a final newline does not add an empty
    /// label. Blank lines in the middle are kept so indices stay aligned.
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines().map(str::to_owned).collect())
    }

    /// Read and parse a UTF-8 label stream.
    pub fn read_from<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::parse(&text))
    }

    /// Label at `index`, or [`UNKNOWN_LABEL`] when out of range.
    pub fn label_for(&self, index: usize) -> &str {
        self.names.get(index).map(String::as_str).unwrap_or(UNKNOWN_LABEL)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
