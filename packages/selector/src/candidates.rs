//! Candidate table parsing and working-set computation.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{Result, SelectorError};

/// Ordered candidate locations read from a tab-separated table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSource {
    locations: Vec<String>,
}

impl CandidateSource {
    /// Read candidates from column 0 of a tab-separated file.
    ///
    /// The first row is data. Blank lines are ignored, quoted fields follow
    /// the excel-tab dialect, and rows with an empty first field are skipped.
    ///
    /// # Errors
    /// `SelectorError::MalformedInput` if the file cannot be read or holds
    /// no rows at all.
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SelectorError::MalformedInput {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let source = Self::parse(&content);
        if source.locations.is_empty() {
            return Err(SelectorError::MalformedInput {
                path: path.to_path_buf(),
                reason: "table has zero columns".into(),
            });
        }
        tracing::debug!(path = %path.display(), candidates = source.len(), "read candidate table");
        Ok(source)
    }

    /// Parse table content. Never fails; an empty result means an empty table.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut locations = Vec::new();
        for (index, first) in first_fields(content).into_iter().enumerate() {
            let Some(location) = first else {
                continue;
            };
            if location.is_empty() {
                tracing::warn!(row = index + 1, "skipping row without a repository location");
                continue;
            }
            locations.push(location);
        }
        Self { locations }
    }

    /// Candidates not yet attempted, in input order.
    #[must_use]
    pub fn working_set(&self, attempted: &HashSet<String>) -> Vec<String> {
        self.locations
            .iter()
            .filter(|location| !attempted.contains(location.as_str()))
            .cloned()
            .collect()
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// First field of every record, read with the excel-tab dialect.
///
/// Fields are separated by tabs and records by `\n` or `\r\n`. A field that
/// opens with `"` runs to the matching quote and may hold tabs and line
/// breaks; `""` inside it is a literal quote. Blank records are `None`.
fn first_fields(content: &str) -> Vec<Option<String>> {
    let mut records = Vec::new();
    let mut first = String::new();
    let mut column = 0usize;
    let mut blank = true;
    let mut in_quotes = false;
    // Set once the current field has content, after which `"` is literal.
    let mut field_started = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    if column == 0 {
                        first.push('"');
                    }
                } else {
                    in_quotes = false;
                }
            } else if column == 0 {
                first.push(c);
            }
            continue;
        }

        match c {
            '"' if !field_started => {
                in_quotes = true;
                field_started = true;
                blank = false;
                if column == 0 {
                    first.clear();
                }
            }
            '\t' => {
                column += 1;
                field_started = false;
            }
            '\n' => {
                records.push((!blank).then(|| first.trim().to_string()));
                first.clear();
                column = 0;
                blank = true;
                field_started = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            _ => {
                if !c.is_whitespace() {
                    field_started = true;
                    blank = false;
                }
                if column == 0 {
                    first.push(c);
                }
            }
        }
    }
    if !blank {
        records.push(Some(first.trim().to_string()));
    }
    records
}
