//! Command line options and dispatch.

use std::fs::File;
use std::io::{Read, Write};

use anyhow::{ensure, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use fn_error_context::context;
use startup_switches::{SharedSwitchStore, SwitchStore};

use crate::config::Config;
use crate::output::{self, Format};

/// Command line files larger than this are rejected.
pub(crate) const MAX_COMMAND_LINE_FILE: u64 = 8 * 1024;

/// Parse a process startup command line into switches and arguments.
///
/// If the environment variable SWITCHCTL_CONFIG is set, it must name a TOML
/// file with optional `format` and `append` keys.  Flags given on the
/// command line take precedence.
#[derive(Debug, Parser, PartialEq, Eq)]
#[clap(name = "switchctl", version)]
pub(crate) struct Opt {
    /// Output format
    #[clap(long, value_enum, global = true)]
    pub(crate) format: Option<Format>,

    #[clap(subcommand)]
    pub(crate) cmd: Cmd,
}

/// Subcommands
#[derive(Debug, clap::Subcommand, PartialEq, Eq)]
pub(crate) enum Cmd {
    /// Parse an argv; the first element is the program name
    ///
    /// Use `--` before the elements when the program name itself starts
    /// with a dash.
    Parse(ParseOpts),

    /// Split a quoted text buffer into arguments
    Tokenize {
        /// The text to split
        #[clap(allow_hyphen_values = true)]
        text: String,
    },

    /// Parse a command line stored in a file
    ///
    /// The file is split like `tokenize` and the first token is the
    /// program name.
    Load(LoadOpts),
}

/// Options for the `parse` subcommand
#[derive(Debug, clap::Args, PartialEq, Eq)]
pub(crate) struct ParseOpts {
    #[clap(flatten)]
    pub(crate) query: QueryOpts,

    /// The argv elements
    #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
    pub(crate) elements: Vec<String>,
}

/// Options for the `load` subcommand
#[derive(Debug, clap::Args, PartialEq, Eq)]
pub(crate) struct LoadOpts {
    #[clap(flatten)]
    pub(crate) query: QueryOpts,

    /// Path to the command line file
    pub(crate) path: Utf8PathBuf,
}

/// Post-processing shared by `parse` and `load`
#[derive(Debug, Default, clap::Args, PartialEq, Eq)]
pub(crate) struct QueryOpts {
    /// Append an element after parsing; may be given multiple times
    #[clap(long, action = clap::ArgAction::Append, allow_hyphen_values = true)]
    pub(crate) append: Vec<String>,

    /// Report whether a switch is present and its value
    #[clap(long = "query", action = clap::ArgAction::Append)]
    pub(crate) queries: Vec<String>,
}

/// Read a command line file, enforcing [`MAX_COMMAND_LINE_FILE`].
#[context("Reading command line from {path}")]
pub(crate) fn read_command_line_file(path: &Utf8Path) -> Result<String> {
    let f = File::open(path)?;
    let len = f.metadata()?.len();
    ensure!(
        len <= MAX_COMMAND_LINE_FILE,
        "File is {len} bytes, over the limit of {MAX_COMMAND_LINE_FILE}"
    );
    let mut buf = String::new();
    f.take(MAX_COMMAND_LINE_FILE)
        .read_to_string(&mut buf)
        .context("Reading as UTF-8")?;
    Ok(buf)
}

/// Initialize a store from `elements`, apply the configured and requested
/// appends, and hand it off to a shared handle.
fn build(elements: &[String], config: &Config, query: &QueryOpts) -> SharedSwitchStore {
    let mut store = SwitchStore::from_args(elements);
    tracing::debug!(
        "initialized from {} elements, {} extra from config, {} from flags",
        elements.len(),
        config.append.len(),
        query.append.len()
    );
    store.append_switches_and_arguments(&config.append);
    store.append_switches_and_arguments(&query.append);
    SharedSwitchStore::from(store)
}

fn run_with(opt: Opt, config: Config, out: &mut impl Write) -> Result<()> {
    let format = opt.format.or(config.format).unwrap_or_default();
    match opt.cmd {
        Cmd::Parse(opts) => {
            let store = build(&opts.elements, &config, &opts.query);
            output::report(out, format, &store, &opts.query.queries)
        }
        Cmd::Tokenize { text } => {
            let tokens = startup_switches::tokenize(&text);
            output::tokens(out, format, &tokens)
        }
        Cmd::Load(opts) => {
            let buf = read_command_line_file(&opts.path)?;
            let elements = startup_switches::tokenize(&buf);
            let store = build(&elements, &config, &opts.query);
            output::report(out, format, &store, &opts.query.queries)
        }
    }
}

/// Parse the process arguments and execute the requested command.
pub(crate) fn run() -> Result<()> {
    let opt = Opt::parse();
    switchctl_utils::initialize_tracing();
    tracing::trace!("starting {}", switchctl_utils::NAME);

    let config = Config::load()?.unwrap_or_default();
    let mut stdout = std::io::stdout().lock();
    run_with(opt, config, &mut stdout)?;
    stdout.flush().context("Flushing stdout")
}
