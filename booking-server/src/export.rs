//! Tabular export
//!
//! Turns a query result into a CSV report for the club office. Export
//! failures are reported to the operator and never affect the booking set.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use shared::models::{Booking, Resource};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export failed: {0}")]
    Io(#[from] std::io::Error),
}

const HEADER: &str = "Data,Ora,Campo,Nome,Telefono,Nota";

pub struct Exporter {
    resources: Vec<Resource>,
}

impl Exporter {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self { resources }
    }

    /// Write the report for the given bookings. Rows come out in the order
    /// the caller supplies; `query` already orders by (date, hour, resource).
    pub fn write_csv<W: Write>(&self, bookings: &[Booking], mut out: W) -> Result<(), ExportError> {
        writeln!(out, "{HEADER}")?;
        for booking in bookings {
            writeln!(
                out,
                "{},{},{},{},{},{}",
                booking.date.format("%Y-%m-%d"),
                hour_range(booking.hour),
                csv_field(self.display_name(&booking.resource_id)),
                csv_field(&booking.name),
                csv_field(booking.phone.as_deref().unwrap_or("")),
                csv_field(&booking.note),
            )?;
        }
        Ok(())
    }

    /// Write the report to a timestamped file under `dir` and return its path.
    pub fn export_to_dir(&self, bookings: &[Booking], dir: &Path) -> Result<PathBuf, ExportError> {
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let path = dir.join(format!("prenotazioni-veritas-{stamp}.csv"));
        let file = std::fs::File::create(&path)?;
        self.write_csv(bookings, std::io::BufWriter::new(file))?;
        tracing::info!(path = %path.display(), rows = bookings.len(), "Report exported");
        Ok(path)
    }

    fn display_name<'a>(&'a self, resource_id: &'a str) -> &'a str {
        self.resources
            .iter()
            .find(|r| r.id == resource_id)
            .map(|r| r.name.as_str())
            .unwrap_or(resource_id)
    }
}

/// "20" becomes "20:00-21:00"
fn hour_range(hour: u8) -> String {
    format!("{hour}:00-{}:00", hour + 1)
}

/// Quote a field when it contains a separator, quote or newline.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
