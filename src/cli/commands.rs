//! Command implementations for the docexpand CLI.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{DocExpandError, Result};
use crate::expansion::{DocumentExpander, ExpanderRegistry, ExpansionConfig, ExpansionType};

/// Execute a CLI command.
pub fn execute_command(args: DocExpandArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &args.command {
        Command::Expand(expand_args) => {
            let config = load_config(expand_args)?;
            let registry = registry_for(&config);
            expand_documents(expand_args, &args, &registry, &mut out)
        }
        Command::Types => list_types(&args, &registry_for(&ExpansionConfig::default()), &mut out),
    }
}

/// Registry of the pretrained loaders available in this build.
fn registry_for(config: &ExpansionConfig) -> ExpanderRegistry {
    #[cfg(feature = "candle")]
    {
        ExpanderRegistry::from_config(config)
    }
    #[cfg(not(feature = "candle"))]
    {
        let _ = config;
        ExpanderRegistry::new()
    }
}

fn load_config(args: &ExpandArgs) -> Result<ExpansionConfig> {
    match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading expansion config");
            ExpansionConfig::from_file(path)
        }
        None => Ok(ExpansionConfig::default()),
    }
}

/// Expand the documents named by `args` with the strategies in `registry`.
pub fn expand_documents<W: Write>(
    args: &ExpandArgs,
    cli_args: &DocExpandArgs,
    registry: &ExpanderRegistry,
    out: &mut W,
) -> Result<()> {
    let documents = read_documents(args)?;
    if documents.is_empty() {
        return Err(DocExpandError::invalid_argument("no documents to expand"));
    }

    let expander = DocumentExpander::from_expansion_types(&args.strategies, registry)?;
    let show_progress = !args.no_progress && cli_args.verbosity() > 0 && documents.len() > 1;

    let start_time = Instant::now();
    let texts: Vec<&str> = documents.iter().map(String::as_str).collect();
    let expansions = expander.expand_batch(&texts, args.k, show_progress)?;
    info!(
        documents = documents.len(),
        strategies = ?expander.names(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "expansion finished"
    );

    let records: Vec<ExpansionRecord> = documents
        .into_iter()
        .zip(expansions)
        .map(|(document, expansions)| ExpansionRecord {
            document,
            expansions,
        })
        .collect();

    write_records(out, &records, cli_args)
}

/// List the supported expansion types.
pub fn list_types<W: Write>(
    cli_args: &DocExpandArgs,
    registry: &ExpanderRegistry,
    out: &mut W,
) -> Result<()> {
    let types: Vec<TypeInfo> = ExpansionType::ALL
        .iter()
        .map(|ty| TypeInfo {
            identifier: ty.as_str().to_string(),
            description: ty.description().to_string(),
            available: registry.contains(*ty),
        })
        .collect();

    write_types(out, &types, cli_args)
}

fn read_documents(args: &ExpandArgs) -> Result<Vec<String>> {
    if !args.text.is_empty() {
        return Ok(args.text.clone());
    }

    match &args.input {
        Some(path) => {
            debug!(path = %path.display(), "reading documents");
            parse_documents(BufReader::new(File::open(path)?))
        }
        None => parse_documents(io::stdin().lock()),
    }
}

/// Read one document per non-empty line.
///
/// A line holding a JSON object contributes its `text` field; any other line
/// is taken verbatim.
pub fn parse_documents<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut documents = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('{') {
            let value: Value = serde_json::from_str(trimmed)?;
            let text = value.get("text").and_then(Value::as_str).ok_or_else(|| {
                DocExpandError::invalid_argument(format!(
                    "line {}: JSON document has no string \"text\" field",
                    line_num + 1
                ))
            })?;
            documents.push(text.to_string());
        } else {
            documents.push(trimmed.to_string());
        }
    }

    Ok(documents)
}
