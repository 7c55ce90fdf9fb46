//! Rendering parsed state for humans or as JSON.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use startup_switches::{Backend, CommandLine, SharedSwitchStore, SwitchStore};

/// How to print results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Format {
    /// One item per line
    #[default]
    Text,
    /// A single JSON document
    Json,
}

#[derive(Debug, Serialize)]
struct QueryResult {
    present: bool,
    value: Option<String>,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    backend: Backend,
    #[serde(flatten)]
    store: &'a SwitchStore,
    queries: BTreeMap<&'a str, QueryResult>,
}

fn query(cl: &dyn CommandLine, name: &str) -> QueryResult {
    QueryResult {
        present: cl.has_switch(name),
        value: cl.switch_value(name),
    }
}

/// Print the state of `cl` and the answers to `queries`.
pub(crate) fn report(
    out: &mut impl Write,
    format: Format,
    cl: &SharedSwitchStore,
    queries: &[String],
) -> Result<()> {
    let queries: BTreeMap<&str, QueryResult> = queries
        .iter()
        .map(|name| (name.as_str(), query(cl, name)))
        .collect();
    let store = cl.snapshot();

    match format {
        Format::Json => {
            let report = Report {
                backend: cl.backend(),
                store: &store,
                queries,
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
        Format::Text => {
            writeln!(out, "backend: {}", cl.backend())?;
            if let Some(program) = store.program() {
                writeln!(out, "program: {program:?}")?;
            }
            for (name, value) in store.switches() {
                match value {
                    Some(value) => writeln!(out, "switch: --{name}={value:?}")?,
                    None => writeln!(out, "switch: --{name}")?,
                }
            }
            for arg in store.arguments() {
                writeln!(out, "argument: {arg:?}")?;
            }
            for (name, result) in queries {
                match (result.present, result.value) {
                    (false, _) => writeln!(out, "query {name}: absent")?,
                    (true, None) => writeln!(out, "query {name}: present")?,
                    (true, Some(value)) => writeln!(out, "query {name}: present, value {value:?}")?,
                }
            }
        }
    }
    Ok(())
}

/// Print the tokens of a buffer.
pub(crate) fn tokens(out: &mut impl Write, format: Format, tokens: &[String]) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer(&mut *out, tokens)?;
            writeln!(out)?;
        }
        Format::Text => {
            for token in tokens {
                writeln!(out, "{token:?}")?;
            }
        }
    }
    Ok(())
}
