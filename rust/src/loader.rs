//! CSV ingestion of the three snapshot tables.
//!
//! Files are header-driven: columns are found by name, so their order does not
//! matter and unknown columns are ignored. Optional columns may be missing or
//! left empty.

use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

use crate::index::ScheduleIndex;
use crate::models::{Berth, Vessel, YardBlock};

pub const VESSEL_FILE: &str = "vessel_schedule.csv";
pub const BERTH_FILE: &str = "berths.csv";
pub const YARD_FILE: &str = "yard_blocks.csv";

const ETA_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Errors raised while reading snapshot tables.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {table}: {source}")]
    Io {
        table: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{table} has no header row")]
    MissingHeader { table: String },
    #[error("{table} is missing required column '{column}'")]
    MissingColumn { table: String, column: String },
    #[error("{table} line {line}: invalid {column} value '{value}'")]
    Parse {
        table: String,
        line: usize,
        column: String,
        value: String,
    },
}

/// Reads vessel, berth and yard tables into a `ScheduleIndex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleLoader {
    require_yard: bool,
}

impl Default for ScheduleLoader {
    fn default() -> Self {
        Self { require_yard: true }
    }
}

impl ScheduleLoader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a missing yard file is an error (default) or an empty table.
    #[inline]
    pub fn require_yard(mut self, yes: bool) -> Self {
        self.require_yard = yes;
        self
    }

    /// Load all three tables from a directory.
    pub fn from_dir(&self, dir: impl AsRef<Path>) -> Result<ScheduleIndex, LoaderError> {
        let dir = dir.as_ref();
        let vessels = self.vessels_from_reader(open(&dir.join(VESSEL_FILE), VESSEL_FILE)?)?;
        let berths = self.berths_from_reader(open(&dir.join(BERTH_FILE), BERTH_FILE)?)?;
        let yard_path = dir.join(YARD_FILE);
        let yard_blocks = if !self.require_yard && !yard_path.exists() {
            Vec::new()
        } else {
            self.yard_blocks_from_reader(open(&yard_path, YARD_FILE)?)?
        };
        Ok(ScheduleIndex {
            vessels,
            berths,
            yard_blocks,
        })
    }

    pub fn vessels_from_reader<R: Read>(&self, r: R) -> Result<Vec<Vessel>, LoaderError> {
        let table = Table::read(VESSEL_FILE, BufReader::new(r))?;
        let id = table.column("imo")?;
        let name = table.column("vessel")?;
        let length = table.column("loa_m")?;
        let eta = table.column("eta")?;
        let moves = table.column("moves")?;
        let service = table.optional_column("service");
        let beam = table.optional_column("beam_m");
        let draft = table.optional_column("draft_m");

        table
            .rows
            .iter()
            .map(|row| -> Result<Vessel, LoaderError> {
                Ok(Vessel {
                    id: row.get(id).to_string(),
                    name: row.get(name).to_string(),
                    service: row.get_opt(service).map(str::to_string),
                    length_m: table.parse(row, length, "loa_m")?,
                    beam_m: table.parse_opt(row, beam, "beam_m")?,
                    draft_m: table.parse_opt(row, draft, "draft_m")?,
                    eta: parse_eta(row.get(eta)).ok_or_else(|| table.error(row, "eta", eta))?,
                    moves: table.parse(row, moves, "moves")?,
                })
            })
            .collect()
    }

    pub fn berths_from_reader<R: Read>(&self, r: R) -> Result<Vec<Berth>, LoaderError> {
        let table = Table::read(BERTH_FILE, BufReader::new(r))?;
        let id = table.column("berth_id")?;
        let max_length = table.column("max_loa_m")?;
        let cranes = table.column("cranes")?;

        table
            .rows
            .iter()
            .map(|row| -> Result<Berth, LoaderError> {
                Ok(Berth {
                    id: row.get(id).to_string(),
                    max_length_m: table.parse(row, max_length, "max_loa_m")?,
                    cranes: table.parse(row, cranes, "cranes")?,
                })
            })
            .collect()
    }

    pub fn yard_blocks_from_reader<R: Read>(&self, r: R) -> Result<Vec<YardBlock>, LoaderError> {
        let table = Table::read(YARD_FILE, BufReader::new(r))?;
        let id = table.column("block")?;
        let slots = table.column("slots")?;
        let category = table.optional_column("type");

        table
            .rows
            .iter()
            .map(|row| -> Result<YardBlock, LoaderError> {
                Ok(YardBlock {
                    id: row.get(id).to_string(),
                    category: row.get_opt(category).map(str::to_string),
                    slots: table.parse(row, slots, "slots")?,
                })
            })
            .collect()
    }
}

fn open(path: &Path, table: &str) -> Result<File, LoaderError> {
    File::open(path).map_err(|source| LoaderError::Io {
        table: table.to_string(),
        source,
    })
}

/// Parse an ETA in any of the accepted layouts.
pub fn parse_eta(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ETA_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

#[derive(Debug)]
struct Row {
    line: usize,
    fields: Vec<String>,
}

impl Row {
    fn get(&self, idx: usize) -> &str {
        self.fields.get(idx).map(|s| s.as_str()).unwrap_or("")
    }

    /// Field value if the column exists and the cell is non-empty.
    fn get_opt(&self, idx: Option<usize>) -> Option<&str> {
        idx.map(|i| self.get(i)).filter(|s| !s.is_empty())
    }
}

#[derive(Debug)]
struct Table {
    name: String,
    header: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    fn read<R: BufRead>(name: &str, r: R) -> Result<Self, LoaderError> {
        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for (i, line) in r.lines().enumerate() {
            let line = line.map_err(|source| LoaderError::Io {
                table: name.to_string(),
                source,
            })?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            if header.is_none() {
                // Drop a leading UTF-8 byte-order mark
                let line = line.trim_start_matches('\u{feff}');
                header = Some(split_record(line).into_iter().map(|f| f.to_lowercase()).collect());
                continue;
            }
            rows.push(Row {
                line: i + 1,
                fields: split_record(line),
            });
        }

        let header = header.ok_or_else(|| LoaderError::MissingHeader {
            table: name.to_string(),
        })?;
        Ok(Self {
            name: name.to_string(),
            header,
            rows,
        })
    }

    fn optional_column(&self, column: &str) -> Option<usize> {
        self.header.iter().position(|h| h == column)
    }

    fn column(&self, column: &str) -> Result<usize, LoaderError> {
        self.optional_column(column)
            .ok_or_else(|| LoaderError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    fn error(&self, row: &Row, column: &str, idx: usize) -> LoaderError {
        LoaderError::Parse {
            table: self.name.clone(),
            line: row.line,
            column: column.to_string(),
            value: row.get(idx).to_string(),
        }
    }

    fn parse<T: std::str::FromStr>(
        &self,
        row: &Row,
        idx: usize,
        column: &str,
    ) -> Result<T, LoaderError> {
        row.get(idx)
            .parse::<T>()
            .map_err(|_| self.error(row, column, idx))
    }

    /// Parse an optional column; absent columns and empty cells yield `None`.
    fn parse_opt<T: std::str::FromStr>(
        &self,
        row: &Row,
        idx: Option<usize>,
        column: &str,
    ) -> Result<Option<T>, LoaderError> {
        match idx {
            Some(i) if !row.get(i).is_empty() => self.parse(row, i, column).map(Some),
            _ => Ok(None),
        }
    }
}

/// Split one CSV record, honouring double-quoted fields and `""` escapes.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(field.trim().to_string());
                field.clear();
            }
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}
