//! Rendering of delivered cycles

use crate::cli::OutputFormat;
use argus_link::{CollectingSink, OwnedRecord, OwnedValue};
use serde::Serialize;
use std::io::{self, Write};

/// One delivered cycle as written in JSON mode.
#[derive(Debug, Serialize)]
pub struct CycleReport<'a> {
    /// Producer cycle counter
    pub cycle: u32,
    /// Classified records in emission order
    pub records: &'a [OwnedRecord],
    /// Derived aggregates in emission order
    pub metrics: Vec<MetricEntry<'a>>,
}

/// One derived aggregate.
#[derive(Debug, Serialize)]
pub struct MetricEntry<'a> {
    /// Aggregate id
    pub id: &'a str,
    /// Value in canonical units
    pub value: f64,
}

impl<'a> CycleReport<'a> {
    /// Borrow a report out of a filled sink.
    pub fn new(cycle: u32, sink: &'a CollectingSink) -> Self {
        Self {
            cycle,
            records: &sink.records,
            metrics: sink
                .metrics
                .iter()
                .map(|(id, value)| MetricEntry { id, value: *value })
                .collect(),
        }
    }
}

/// Write one cycle in `format`.
pub fn write_cycle<W: Write>(
    out: &mut W,
    format: OutputFormat,
    cycle: u32,
    sink: &CollectingSink,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => write_text(out, cycle, sink),
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, &CycleReport::new(cycle, sink))?;
            writeln!(out)
        }
    }
}

fn write_text<W: Write>(out: &mut W, cycle: u32, sink: &CollectingSink) -> io::Result<()> {
    writeln!(out, "── cycle {cycle} ──")?;
    for record in &sink.records {
        let value = match &record.value {
            OwnedValue::Numeric(v) => format!("{v:.2}"),
            OwnedValue::Text(s) => s.clone(),
        };
        writeln!(
            out,
            "{:<12} {:<48} {:<28} {value}",
            record.hardware.as_str(),
            record.id,
            record.name
        )?;
    }
    for (id, value) in &sink.metrics {
        writeln!(out, "{:<12} {id:<48} {:<28} {value:.2}", "Derived", "")?;
    }
    Ok(())
}
