use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use csv::{Writer, WriterBuilder};
use itertools::Itertools;
use tracing::debug;

use crate::gameday::schemas::{PitchField, PitchRecord};

/// Standard output when no path is given.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => {
            debug!("Creating file {}", p.display());
            Box::new(
                File::create(p).with_context(|| format!("Failed to create {}", p.display()))?,
            )
        }
        None => Box::new(io::stdout()),
    })
}

/// Delimited text with a header row. Every row has exactly the columns given at
/// construction, in that order, whether or not a record has a value for them.
pub struct PitchWriter<W: Write> {
    csv: Writer<W>,
    fields: Vec<PitchField>,
    rows: usize,
}

impl<W: Write> PitchWriter<W> {
    pub fn new(writer: W, fields: Vec<PitchField>, delimiter: u8) -> Result<Self> {
        if fields.is_empty() {
            bail!("At least one output field is required");
        }
        let mut csv = WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .from_writer(writer);
        csv.write_record(fields.iter().map(AsRef::<str>::as_ref))
            .context("Failed to write header")?;
        Ok(Self {
            csv,
            fields,
            rows: 0,
        })
    }

    pub fn write(&mut self, record: &PitchRecord) -> Result<()> {
        let row = self.fields.iter().map(|f| record.cell(*f)).collect_vec();
        self.csv.serialize(row).context("Failed to write record")?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(self) -> Result<W> {
        self.csv
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush output: {}", e.error()))
    }
}
