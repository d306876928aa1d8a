//! CSV roster reader.
//!
//! # Responsibility
//! - Parse header-labelled CSV text into roster rows.
//! - Accept English and Portuguese column names.
//!
//! # Invariants
//! - Columns are located by header name, never by position.
//! - Blank cells become `None`.
//! - Records never span lines; an open quote at end of line is an error.

use crate::model::person::RosterRow;
use std::error::Error;
use std::fmt::{Display, Formatter};

const NAME_HEADERS: &[&str] = &["name", "full_name", "nome", "nome_completo"];
const NICKNAME_HEADERS: &[&str] = &["nickname", "nick", "nome_guerra", "nome_de_guerra"];
const LIFEBOAT_HEADERS: &[&str] = &["lifeboat", "baleeira"];
const COMPANY_HEADERS: &[&str] = &["company", "empresa"];
const REGISTRATION_HEADERS: &[&str] = &["registration", "matricula", "matrícula"];
const CABIN_HEADERS: &[&str] = &["cabin", "camarote"];
const BUNK_HEADERS: &[&str] = &["bunk", "leito"];

/// CSV reader error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvError {
    /// Input has no header line.
    EmptyInput,
    /// Header lacks a required column.
    MissingColumn(&'static str),
    /// A quoted field is not closed before the end of its line (1-based).
    UnterminatedQuote { line: usize },
}

impl Display for CsvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "roster csv is empty"),
            Self::MissingColumn(column) => {
                write!(f, "roster csv header has no `{column}` column")
            }
            Self::UnterminatedQuote { line } => {
                write!(f, "roster csv has an unterminated quote on line {line}")
            }
        }
    }
}

impl Error for CsvError {}

/// Parses roster CSV text into rows, one per non-blank record line.
///
/// The delimiter is `,` unless the header contains `;` and no `,`.
///
/// # Errors
/// - `EmptyInput` when there is no header line.
/// - `MissingColumn` when the header has no name or lifeboat column.
/// - `UnterminatedQuote` for a quote left open at end of line.
pub fn parse_roster_csv(input: &str) -> Result<Vec<RosterRow>, CsvError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut lines = input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_index, header_line) = lines.next().ok_or(CsvError::EmptyInput)?;
    let delimiter = detect_delimiter(header_line);
    let header = split_record(header_line, delimiter, header_index + 1)?;
    let columns = ColumnMap::from_header(&header)?;

    let mut rows = Vec::new();
    for (index, line) in lines {
        let fields = split_record(line, delimiter, index + 1)?;
        rows.push(columns.row(&fields));
    }
    Ok(rows)
}

struct ColumnMap {
    name: usize,
    nickname: Option<usize>,
    lifeboat: usize,
    company: Option<usize>,
    registration: Option<usize>,
    cabin: Option<usize>,
    bunk: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Result<Self, CsvError> {
        let normalized: Vec<String> = header.iter().map(|cell| normalize_header(cell)).collect();
        let find = |aliases: &[&str]| {
            normalized
                .iter()
                .position(|cell| aliases.contains(&cell.as_str()))
        };

        Ok(Self {
            name: find(NAME_HEADERS).ok_or(CsvError::MissingColumn("name"))?,
            nickname: find(NICKNAME_HEADERS),
            lifeboat: find(LIFEBOAT_HEADERS).ok_or(CsvError::MissingColumn("lifeboat"))?,
            company: find(COMPANY_HEADERS),
            registration: find(REGISTRATION_HEADERS),
            cabin: find(CABIN_HEADERS),
            bunk: find(BUNK_HEADERS),
        })
    }

    fn row(&self, fields: &[String]) -> RosterRow {
        let cell = |index: Option<usize>| {
            index
                .and_then(|index| fields.get(index))
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        RosterRow {
            name: cell(Some(self.name)),
            nickname: cell(self.nickname),
            lifeboat: cell(Some(self.lifeboat)),
            company: cell(self.company),
            registration: cell(self.registration),
            cabin: cell(self.cabin),
            bunk: cell(self.bunk),
        }
    }
}

fn normalize_header(cell: &str) -> String {
    cell.trim()
        .to_lowercase()
        .chars()
        .map(|ch| if ch == ' ' || ch == '-' { '_' } else { ch })
        .collect()
}

fn detect_delimiter(header_line: &str) -> char {
    if header_line.contains(';') && !header_line.contains(',') {
        ';'
    } else {
        ','
    }
}

fn split_record(line: &str, delimiter: char, line_number: usize) -> Result<Vec<String>, CsvError> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == delimiter {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(ch);
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote { line: line_number });
    }
    fields.push(field);
    Ok(fields)
}
