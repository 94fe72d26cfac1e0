use std::{io, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    storage::{entities::WeightEntity, record_storage::RecordStorage},
    utils::time::parse_timestamp,
};

use super::AppContext;

/// Shape of a CSV row. Same columns for export and import.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct CsvRow {
    date: String,
    weight: f64,
    note: Option<String>,
}

#[derive(Debug, Parser)]
pub struct ExportCommand {
    #[arg(short, long, help = "File to write. Prints to stdout when omitted")]
    output: Option<PathBuf>,
}

/// Command to process `export` command.
pub async fn process_export_command(
    context: &AppContext,
    ExportCommand { output }: ExportCommand,
) -> Result<()> {
    let profile = context.profiles.load().await?;
    let entries = context.records.get_all().await?;

    let count = match output {
        Some(path) => {
            let writer = csv::Writer::from_path(&path)
                .with_context(|| format!("Failed to create {path:?}"))?;
            let count = write_csv(writer, entries, &profile.utc_offset)?;
            println!("Exported {count} measurements to {}", path.display());
            count
        }
        None => write_csv(csv::Writer::from_writer(io::stdout()), entries, &profile.utc_offset)?,
    };
    info!("Exported {count} measurements");
    Ok(())
}

/// Writes measurements from the oldest to the newest. Rows with unreadable dates go last.
fn write_csv<W: io::Write>(
    mut writer: csv::Writer<W>,
    mut entries: Vec<WeightEntity>,
    offset: &FixedOffset,
) -> Result<usize> {
    entries.sort_by_cached_key(|v| {
        let moment = v.moment(offset);
        (moment.is_none(), moment)
    });
    for entry in &entries {
        writer.serialize(CsvRow {
            date: entry.date.clone(),
            weight: entry.weight,
            note: entry.note.clone(),
        })?;
    }
    writer.flush()?;
    Ok(entries.len())
}

/// Command to process `import` command.
pub async fn process_import_command(context: &AppContext, file: &Path) -> Result<()> {
    let profile = context.profiles.load().await?;
    let reader =
        csv::Reader::from_path(file).with_context(|| format!("Failed to open {file:?}"))?;
    let entities = read_csv(reader, &profile.utc_offset, context.clock.time())?;
    let count = entities.len();
    context.records.append(entities).await?;
    println!("Imported {count} measurements from {}", file.display());
    Ok(())
}

/// Reads rows into new measurements. Rows whose date can't be read are skipped, broken CSV is
/// an error.
fn read_csv<R: io::Read>(
    mut reader: csv::Reader<R>,
    offset: &FixedOffset,
    now: DateTime<Utc>,
) -> Result<Vec<WeightEntity>> {
    let mut entities = vec![];
    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        match parse_timestamp(&row.date, offset) {
            Some(moment) if row.weight.is_finite() && row.weight > 0. => {
                entities.push(WeightEntity::new(moment, row.weight, row.note, now))
            }
            _ => warn!("Skipping row {} {:?}", index + 1, row),
        }
    }
    Ok(entities)
}
