//! Output formatting for CLI commands.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::cli::args::{DocExpandArgs, OutputFormat};
use crate::error::Result;
use crate::expansion::ExpansionMap;

/// Expansions of one input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionRecord {
    pub document: String,
    pub expansions: ExpansionMap,
}

/// One supported expansion type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub identifier: String,
    pub description: String,
    /// Whether this build can load the strategy.
    pub available: bool,
}

/// Write expansion records in the requested format.
pub fn write_records<W: Write>(
    out: &mut W,
    records: &[ExpansionRecord],
    args: &DocExpandArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            for (index, record) in records.iter().enumerate() {
                if index > 0 {
                    writeln!(out)?;
                }
                writeln!(out, "Document {}: {}", index + 1, record.document)?;
                for (name, terms) in &record.expansions {
                    writeln!(out, "  {name}: {}", terms.join(", "))?;
                }
            }
            Ok(())
        }
        OutputFormat::Json => write_json(out, records, args.pretty),
        OutputFormat::Jsonl => {
            for record in records {
                writeln!(out, "{}", serde_json::to_string(record)?)?;
            }
            Ok(())
        }
    }
}

/// Write the list of supported expansion types.
pub fn write_types<W: Write>(out: &mut W, types: &[TypeInfo], args: &DocExpandArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            for info in types {
                let status = if info.available { "" } else { " (unavailable in this build)" };
                writeln!(out, "{:<12} {}{status}", info.identifier, info.description)?;
            }
            Ok(())
        }
        OutputFormat::Json => write_json(out, types, args.pretty),
        OutputFormat::Jsonl => {
            for info in types {
                writeln!(out, "{}", serde_json::to_string(info)?)?;
            }
            Ok(())
        }
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    writeln!(out, "{json}")?;
    Ok(())
}
