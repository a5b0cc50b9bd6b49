//! Table loading: delimited text with a header row into typed records

use crate::error::{Error, ParseError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Tokens read as a missing numeric value
const MISSING_TOKENS: [&str; 4] = ["", "NA", "na", "NaN"];

/// Field separator of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// Sniff from the header line
    #[default]
    Auto,
    Comma,
    Tab,
    Semicolon,
    /// Runs of spaces or tabs, as written by PCA tools
    Whitespace,
}

impl Delimiter {
    /// Pick a concrete delimiter from the header line
    pub fn sniff(header_line: &str) -> Delimiter {
        if header_line.contains('\t') {
            Delimiter::Tab
        } else if header_line.contains(',') {
            Delimiter::Comma
        } else if header_line.contains(';') {
            Delimiter::Semicolon
        } else {
            Delimiter::Whitespace
        }
    }

    fn byte(self) -> u8 {
        match self {
            Delimiter::Comma | Delimiter::Auto => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Tab | Delimiter::Whitespace => b'\t',
        }
    }
}

fn is_missing(value: &str) -> bool {
    MISSING_TOKENS.contains(&value)
}

/// In-memory table: header plus string rows in file order
#[derive(Debug, Clone)]
pub struct Table {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// File line of each row (1-based, header is line 1 for most files)
    lines: Vec<u64>,
}

impl Table {
    /// Load a delimited file from disk
    pub fn load(path: impl AsRef<Path>, delimiter: Delimiter) -> Result<Table> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ParseError::new(path, format!("cannot read file: {}", e)))?;
        let table = Table::parse(path, &text, delimiter)?;
        tracing::debug!(
            path = %path.display(),
            rows = table.len(),
            columns = table.headers.len(),
            "loaded table"
        );
        Ok(table)
    }

    /// Parse delimited text; `path` is only used for error reporting
    pub fn parse(path: impl Into<PathBuf>, text: &str, delimiter: Delimiter) -> Result<Table> {
        let path = path.into();

        let header_line = text.lines().find(|l| !l.trim().is_empty());
        let Some(header_line) = header_line else {
            return Err(ParseError::new(&path, "file is empty, expected a header row").into());
        };

        let delimiter = match delimiter {
            Delimiter::Auto => Delimiter::sniff(header_line),
            other => other,
        };

        // Keep one output line per input line so csv positions match the file
        let normalized;
        let text = if delimiter == Delimiter::Whitespace {
            normalized = text
                .lines()
                .map(|l| l.split_whitespace().collect::<Vec<_>>().join("\t"))
                .collect::<Vec<_>>()
                .join("\n");
            normalized.as_str()
        } else {
            text
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter.byte())
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| csv_error(&path, e))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        if headers.iter().all(|h| h.parse::<f64>().is_ok()) {
            return Err(ParseError::new(&path, "missing header row (first line is numeric)")
                .at_line(1)
                .into());
        }

        let mut rows = Vec::new();
        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| csv_error(&path, e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            rows.push(record.iter().map(|f| f.to_string()).collect::<Vec<_>>());
            lines.push(line);
        }

        if rows.is_empty() {
            return Err(ParseError::new(&path, "table must contain at least one data row").into());
        }

        Ok(Table {
            path,
            headers,
            rows,
            lines,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive header lookup
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                Error::from(
                    ParseError::new(&self.path, format!("column '{}' not found", name))
                        .at_line(1)
                        .in_column(name),
                )
            })
    }

    pub fn text_column(&self, name: &str) -> Result<Vec<String>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r[idx].clone()).collect())
    }

    /// Read a declared numeric column; missing tokens become NaN
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        let column = &self.headers[idx];
        self.rows
            .iter()
            .zip(&self.lines)
            .map(|(row, &line)| {
                let value = row[idx].as_str();
                if is_missing(value) {
                    return Ok(f64::NAN);
                }
                value.parse::<f64>().map_err(|_| {
                    Error::from(
                        ParseError::new(&self.path, format!("'{}' is not a number", value))
                            .at_line(line)
                            .in_column(column.as_str()),
                    )
                })
            })
            .collect()
    }

    /// Read a declared small non-negative integer column (shape tokens)
    pub fn code_column(&self, name: &str) -> Result<Vec<u8>> {
        let idx = self.column_index(name)?;
        let column = &self.headers[idx];
        self.rows
            .iter()
            .zip(&self.lines)
            .map(|(row, &line)| {
                let value = row[idx].as_str();
                value
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.fract() == 0.0 && (0.0..=255.0).contains(v))
                    .map(|v| v as u8)
                    .ok_or_else(|| {
                        Error::from(
                            ParseError::new(
                                &self.path,
                                format!("'{}' is not an integer between 0 and 255", value),
                            )
                            .at_line(line)
                            .in_column(column.as_str()),
                        )
                    })
            })
            .collect()
    }
}

fn csv_error(path: &Path, err: csv::Error) -> Error {
    let mut parse = ParseError::new(path, err.to_string());
    if let Some(pos) = err.position() {
        parse = parse.at_line(pos.line());
    }
    parse.into()
}

/// Column names of the two input tables
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Schema {
    pub id: String,
    pub key: String,
    pub color: String,
    pub shape: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            id: "Individual".to_string(),
            key: "Population".to_string(),
            color: "colorNr".to_string(),
            shape: "symbolNr".to_string(),
        }
    }
}

/// One individual with its principal component coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub individual: String,
    pub coords: Vec<f64>,
    pub population: String,
}

/// Loaded primary table
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSet {
    /// Component column names in component-number order
    pub components: Vec<String>,
    pub observations: Vec<Observation>,
}

impl ObservationSet {
    pub fn load(path: impl AsRef<Path>, delimiter: Delimiter, schema: &Schema) -> Result<Self> {
        let table = Table::load(path, delimiter)?;
        let set = Self::from_table(&table, schema)?;
        tracing::info!(
            path = %table.path.display(),
            individuals = set.observations.len(),
            components = set.components.len(),
            "loaded observations"
        );
        Ok(set)
    }

    pub fn from_table(table: &Table, schema: &Schema) -> Result<Self> {
        let mut pcs: Vec<(usize, &String)> = table
            .headers
            .iter()
            .filter_map(|h| component_number(h).map(|n| (n, h)))
            .collect();
        pcs.sort_by_key(|(n, _)| *n);

        if pcs.len() < 2 {
            return Err(ParseError::new(
                &table.path,
                "expected at least two principal component columns (PC1, PC2, ...)",
            )
            .at_line(1)
            .into());
        }

        let ids = table.text_column(&schema.id)?;
        let populations = table.text_column(&schema.key)?;
        let columns = pcs
            .iter()
            .map(|(_, h)| table.numeric_column(h))
            .collect::<Result<Vec<_>>>()?;

        let observations = ids
            .into_iter()
            .zip(populations)
            .enumerate()
            .map(|(row, (individual, population))| Observation {
                individual,
                coords: columns.iter().map(|c| c[row]).collect(),
                population,
            })
            .collect();

        Ok(Self {
            components: pcs.into_iter().map(|(_, h)| h.clone()).collect(),
            observations,
        })
    }

    /// Case-insensitive component lookup
    pub fn component_index(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.eq_ignore_ascii_case(name))
    }
}

/// `PC7` -> 7
fn component_number(header: &str) -> Option<usize> {
    let prefix = header.get(..2)?;
    if !prefix.eq_ignore_ascii_case("pc") {
        return None;
    }
    header[2..].parse().ok()
}

/// One row of the style table
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStyle {
    pub population: String,
    pub color: String,
    pub shape: u8,
}

impl CategoryStyle {
    pub fn load(path: impl AsRef<Path>, delimiter: Delimiter, schema: &Schema) -> Result<Vec<Self>> {
        let table = Table::load(path, delimiter)?;
        let styles = Self::from_table(&table, schema)?;
        tracing::info!(
            path = %table.path.display(),
            rows = styles.len(),
            "loaded category styles"
        );
        Ok(styles)
    }

    pub fn from_table(table: &Table, schema: &Schema) -> Result<Vec<Self>> {
        let populations = table.text_column(&schema.key)?;
        let colors = table.text_column(&schema.color)?;
        let shapes = table.code_column(&schema.shape)?;

        Ok(populations
            .into_iter()
            .zip(colors)
            .zip(shapes)
            .map(|((population, color), shape)| CategoryStyle {
                population,
                color,
                shape,
            })
            .collect())
    }
}
