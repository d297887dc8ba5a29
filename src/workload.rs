//! Workload description: one record per aircraft, read from a plain text file.
//!
//! Each significant line holds `type arrival runway_time` where `type` is
//! `0` (commercial), `1` (cargo) or `2` (emergency), `arrival` is the delay in
//! time units since the previous aircraft was launched, and `runway_time` is
//! how long the aircraft occupies the runway. Lines starting with `#`, blank
//! lines and lines that do not parse are skipped.

use std::{fmt, fs::File, io::{self, BufRead, BufReader, Write}, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AircraftClass {
    Commercial,
    Cargo,
    Emergency,
}

impl AircraftClass {
    pub const ALL: [AircraftClass; 3] = [AircraftClass::Commercial, AircraftClass::Cargo, AircraftClass::Emergency];

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(AircraftClass::Commercial),
            1 => Some(AircraftClass::Cargo),
            2 => Some(AircraftClass::Emergency),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AircraftClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AircraftClass::Commercial => write!(f, "commercial"),
            AircraftClass::Cargo => write!(f, "cargo"),
            AircraftClass::Emergency => write!(f, "EMERGENCY"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadEntry {
    pub class: AircraftClass,
    /// Delay since the previous launch, in time units
    pub arrival: u64,
    /// Runway occupancy, in time units
    pub runway_time: u64,
}

#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("cannot read workload file {path}: {source}")]
    Unreadable { path: String, source: io::Error },

    #[error("workload contains no aircraft")]
    Empty,

    #[error("workload contains {count} aircraft, at most {max} are supported")]
    TooMany { count: usize, max: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workload {
    pub entries: Vec<WorkloadEntry>,
}

impl Workload {
    pub fn from_file(path: impl AsRef<Path>, max_aircraft: usize) -> Result<Self, WorkloadError> {
        let path = path.as_ref();
        let unreadable = |source| WorkloadError::Unreadable { path: path.display().to_string(), source };
        let file = File::open(path).map_err(unreadable)?;
        Self::from_reader(BufReader::new(file), max_aircraft).map_err(|e| match e {
            WorkloadError::Unreadable { source, .. } => unreadable(source),
            other => other,
        })
    }

    /// Lines are decoded lossily, so stray non UTF-8 bytes only spoil the line they sit on.
    pub fn from_reader(mut reader: impl BufRead, max_aircraft: usize) -> Result<Self, WorkloadError> {
        let mut entries = vec![];
        let mut buf = vec![];
        let mut number = 0usize;
        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf)
                .map_err(|source| WorkloadError::Unreadable { path: "<reader>".to_string(), source })?;
            if read == 0 {
                break;
            }
            number += 1;

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end();
            if is_skipped(line) {
                continue;
            }
            match parse_line(line) {
                Some(entry) => entries.push(entry),
                None => warn!(line = number, content = line, "skipping malformed workload line"),
            }
        }

        if entries.is_empty() {
            return Err(WorkloadError::Empty);
        }
        if entries.len() > max_aircraft {
            return Err(WorkloadError::TooMany { count: entries.len(), max: max_aircraft });
        }
        Ok(Workload { entries })
    }

    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "# type arrival runway_time")?;
        writeln!(out, "# 0 = commercial, 1 = cargo, 2 = emergency")?;
        for entry in &self.entries {
            writeln!(out, "{} {} {}", entry.class.code(), entry.arrival, entry.runway_time)?;
        }
        Ok(())
    }
}

fn is_skipped(line: &str) -> bool {
    line.starts_with('#') || line.trim().is_empty()
}

/// Reads the first three integers of a line, ignoring anything after them.
fn parse_line(line: &str) -> Option<WorkloadEntry> {
    let mut fields = line.split_whitespace();
    let class = AircraftClass::from_code(fields.next()?.parse().ok()?)?;
    let arrival = fields.next()?.parse().ok()?;
    let runway_time = fields.next()?.parse().ok()?;
    Some(WorkloadEntry { class, arrival, runway_time })
}
