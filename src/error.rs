//! Error types for the data pipeline

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors. All of them are fatal for a run.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or incomplete input table
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Left and right tables disagree on the category value set
    #[error(
        "join key mismatch: {} categories without a style row ({}), {} style rows never used ({})",
        unmatched.len(),
        unmatched.join(", "),
        unused.len(),
        unused.join(", ")
    )]
    JoinKeyMismatch {
        unmatched: Vec<String>,
        unused: Vec<String>,
    },

    /// A drawn category has no entry in the lookup supplied for rendering
    #[error("category '{category}' has no {attribute} entry in the style table")]
    MissingAesthetic {
        category: String,
        attribute: Attribute,
    },

    /// A style token that cannot be turned into a color or marker
    #[error("category '{category}' has unusable {attribute} token '{token}'")]
    InvalidAesthetic {
        category: String,
        attribute: Attribute,
        token: String,
    },
}

/// Visual attribute carried by a style lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Color,
    Shape,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Color => f.write_str("color"),
            Attribute::Shape => f.write_str("shape"),
        }
    }
}

/// Input parse failure with enough context to fix the file
#[derive(Debug, Error)]
pub struct ParseError {
    pub path: PathBuf,
    /// 1-based file line, when the failure is tied to one
    pub line: Option<u64>,
    pub column: Option<String>,
    pub message: String,
}

impl ParseError {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line: None,
            column: None,
            message: message.into(),
        }
    }

    pub fn at_line(mut self, line: u64) -> Self {
        self.line = Some(line);
        self
    }

    pub fn in_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())?;
        if let Some(line) = self.line {
            write!(f, ", line {}", line)?;
        }
        if let Some(column) = &self.column {
            write!(f, ", column '{}'", column)?;
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_full() {
        let err = ParseError::new("pca.csv", "'abc' is not a number")
            .at_line(7)
            .in_column("PC2");
        assert_eq!(
            err.to_string(),
            "pca.csv, line 7, column 'PC2': 'abc' is not a number"
        );
    }

    #[test]
    fn test_parse_error_display_path_only() {
        let err = ParseError::new("styles.csv", "missing header row");
        assert_eq!(err.to_string(), "styles.csv: missing header row");
    }

    #[test]
    fn test_missing_aesthetic_message() {
        let err = Error::MissingAesthetic {
            category: "Yoruba".to_string(),
            attribute: Attribute::Shape,
        };
        assert!(err.to_string().contains("'Yoruba'"));
        assert!(err.to_string().contains("shape"));
    }

    #[test]
    fn test_join_mismatch_lists_keys() {
        let err = Error::JoinKeyMismatch {
            unmatched: vec!["Basque".to_string()],
            unused: vec![],
        };
        let msg = err.to_string();
        assert!(msg.contains("1 categories without a style row (Basque)"));
        assert!(msg.contains("0 style rows never used"));
    }
}
