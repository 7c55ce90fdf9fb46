//! Process startup switch parsing.
//!
//! A process receives its startup arguments either as an already split
//! sequence of strings (a conventional argv) or as a single text buffer.
//! The [`tokenize`] module splits a buffer into arguments with
//! shell-like double quoting, and [`store::SwitchStore`] classifies a
//! sequence of arguments into `--name[=value]` switches and positional
//! arguments.
//!
//! The [`backend`] module abstracts the store behind the [`CommandLine`]
//! trait so a host can move from the single-threaded startup store to a
//! shared handle without changing its callers.

pub mod backend;
pub mod store;
pub mod tokenize;

pub use backend::{transfer, Backend, CommandLine, SharedSwitchStore};
pub use store::SwitchStore;
pub use tokenize::{tokenize, Tokens};

/// The marker that prefixes every switch.
pub const SWITCH_PREFIX: &str = "--";
/// A standalone marker ending switch interpretation.
pub const SWITCH_TERMINATOR: &str = "--";
/// Separates a switch name from its value.
pub const SWITCH_VALUE_SEPARATOR: char = '=';
