use crate::error::Result;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Description of a table of time series written by [`SeriesWriter`].
#[derive(Debug, Clone)]
pub struct SeriesHeader {
    pub title: &'static str,
    pub y_label: String,
    /// Source of the data, recorded in the file header.
    pub source: String,
    pub legends: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xvg,
    Csv,
}

impl OutputFormat {
    /// CSV for paths ending in `.csv`, XMGRACE otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => OutputFormat::Csv,
            _ => OutputFormat::Xvg,
        }
    }
}

enum Sink<W: Write> {
    Xvg(W),
    Csv(csv::Writer<W>),
}

/// Writes one row per analyzed frame, with the time in nanoseconds in the first column.
pub struct SeriesWriter<W: Write> {
    sink: Sink<W>,
    rows: usize,
}

impl SeriesWriter<BufWriter<File>> {
    pub fn create(path: &Path, header: &SeriesHeader) -> Result<Self> {
        debug!("Creating output file {:?}.", path);
        let file = BufWriter::new(File::create(path)?);
        Ok(Self::new(file, OutputFormat::from_path(path), header)?)
    }
}

impl<W: Write> SeriesWriter<W> {
    pub fn new(mut writer: W, format: OutputFormat, header: &SeriesHeader) -> io::Result<Self> {
        let sink = match format {
            OutputFormat::Xvg => {
                writeln!(
                    writer,
                    "# Generated with Scramblyzer {} from file {}",
                    env!("CARGO_PKG_VERSION"),
                    header.source
                )?;
                writeln!(writer, "@    title \"{}\"", header.title)?;
                writeln!(writer, "@    xaxis label \"time [ns]\"")?;
                writeln!(writer, "@    yaxis label \"{}\"", header.y_label)?;
                for (i, legend) in header.legends.iter().enumerate() {
                    writeln!(writer, "@    s{} legend \"{}\"", i, legend)?;
                }
                writeln!(writer, "@TYPE xy")?;
                Sink::Xvg(writer)
            }
            OutputFormat::Csv => {
                let mut csv = csv::Writer::from_writer(writer);
                csv.write_field("time_ns")?;
                for legend in &header.legends {
                    csv.write_field(legend)?;
                }
                csv.write_record(None::<&[u8]>)?;
                Sink::Csv(csv)
            }
        };
        Ok(Self { sink, rows: 0 })
    }

    pub fn write_row<I, V>(&mut self, time_ps: f64, values: I) -> io::Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        let time = format!("{:.6}", time_ps / 1000.0);
        match &mut self.sink {
            Sink::Xvg(writer) => {
                write!(writer, "{}", time)?;
                for value in values {
                    write!(writer, "     {}", value)?;
                }
                writeln!(writer)?;
            }
            Sink::Csv(csv) => {
                csv.write_field(&time)?;
                for value in values {
                    csv.write_field(value.to_string())?;
                }
                csv.write_record(None::<&[u8]>)?;
            }
        }
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flushes buffered rows and returns the underlying writer.
    pub fn finish(self) -> io::Result<W> {
        match self.sink {
            Sink::Xvg(mut writer) => {
                writer.flush()?;
                Ok(writer)
            }
            Sink::Csv(csv) => csv.into_inner().map_err(|e| e.into_error()),
        }
    }
}
