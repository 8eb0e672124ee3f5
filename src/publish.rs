// 📤 Publish Records - key/value pairs handed to the message bus
//
// key   = payload.contractIdentifier.newValue (null when the account has no id)
// value = the whole ContractEvent as JSON
//
// The bus producer itself lives outside this crate; records are written as
// newline-delimited JSON for whatever ships them onward.

use crate::event::ContractEvent;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRecord {
    pub key: Option<String>,
    pub value: String,
}

impl PublishRecord {
    pub fn from_event(event: &ContractEvent) -> Result<Self> {
        let value = serde_json::to_string(event).with_context(|| {
            format!(
                "Failed to serialize contract event {}",
                event.publish_key().unwrap_or("<null key>")
            )
        })?;

        Ok(PublishRecord {
            key: event.publish_key().map(str::to_string),
            value,
        })
    }
}

/// Serialize every event; fails on the first bad one so nothing partial is published
pub fn prepare_publish_records<I>(events: I) -> Result<Vec<PublishRecord>>
where
    I: IntoIterator<Item = ContractEvent>,
{
    events
        .into_iter()
        .map(|event| PublishRecord::from_event(&event))
        .collect()
}

/// Write records as JSON lines; returns how many were written
pub fn write_records<W: Write>(writer: W, records: &[PublishRecord]) -> Result<usize> {
    let mut writer = BufWriter::new(writer);
    for record in records {
        serde_json::to_writer(&mut writer, record).context("Failed to write publish record")?;
        writer.write_all(b"\n")?;
    }
    writer.flush().context("Failed to flush publish records")?;
    Ok(records.len())
}

/// Write to a file, or stdout when no path is configured
pub fn write_to_sink(path: Option<&Path>, records: &[PublishRecord]) -> Result<usize> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            write_records(file, records)
        }
        None => write_records(std::io::stdout().lock(), records),
    }
}

// ============================================================================
// TESTS
// ============================================================================
