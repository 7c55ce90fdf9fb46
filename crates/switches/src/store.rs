//! Classification of startup arguments into switches and positional
//! arguments.
//!
//! Every element is classified on its own:
//!
//! - `--` latches the terminator; it and everything after it never
//!   becomes a switch.  The terminator itself is dropped.
//! - `--name` and `--name=value` are switches; the value is everything
//!   after the first `=`.
//! - Anything else is a positional argument.
//!
//! Switch names are case-sensitive and stored without the `--` prefix.
//! Re-adding a name replaces the earlier entry, so the last write wins
//! across `initialize` and every later append.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{SWITCH_PREFIX, SWITCH_TERMINATOR, SWITCH_VALUE_SEPARATOR};

/// The parsed startup command line of a process.
///
/// Holds a switch table (name to optional value) and the ordered list of
/// positional arguments.  The program name given to [`Self::initialize`] is
/// kept separately and is neither a switch nor an argument.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchStore {
    program: Option<String>,
    switches: BTreeMap<String, Option<String>>,
    arguments: Vec<String>,
}

impl SwitchStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from an argv-style sequence.
    ///
    /// This is the same as [`Self::new`] followed by [`Self::initialize`].
    pub fn from_args<I>(elements: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut store = Self::new();
        store.initialize(elements);
        store
    }

    /// Discard every switch, argument and the program name.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Start a new epoch from an argv-style sequence.
    ///
    /// The store is reset, then the first element is taken as the program
    /// name and the rest are classified.  An empty sequence leaves the store
    /// empty.
    pub fn initialize<I>(&mut self, elements: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.reset();
        let mut elements = elements.into_iter();
        let Some(program) = elements.next() else {
            return;
        };
        self.program = Some(program.as_ref().to_owned());
        self.classify(elements);
    }

    /// Classify every element and merge the result into the store.
    ///
    /// Unlike [`Self::initialize`] no element is taken as the program name.
    pub fn append_switches_and_arguments<I>(&mut self, elements: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.classify(elements);
    }

    /// Add a switch without a value, replacing any existing entry.
    pub fn append_switch(&mut self, name: impl Into<String>) {
        self.insert(name.into(), None);
    }

    /// Add a switch with a value, replacing any existing entry.
    pub fn append_switch_with_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert(name.into(), Some(value.into()));
    }

    /// Returns `true` if a switch with exactly this name is present.
    ///
    /// The name is given without the `--` prefix.
    pub fn has_switch(&self, name: &str) -> bool {
        self.switches.contains_key(name)
    }

    /// Returns the value of the named switch.
    ///
    /// `None` if the switch is absent or was given without a value.
    pub fn switch_value(&self, name: &str) -> Option<&str> {
        self.switches.get(name).and_then(|v| v.as_deref())
    }

    /// Find the value of the switch with the provided name, which must be present.
    ///
    /// Otherwise the same as [`Self::switch_value`].
    pub fn require_switch_value(&self, name: &str) -> Result<&str> {
        self.switch_value(name)
            .ok_or_else(|| anyhow::anyhow!("Failed to find value for switch '{name}'"))
    }

    /// The program name from the last [`Self::initialize`], if any.
    pub fn program(&self) -> Option<&str> {
        self.program.as_deref()
    }

    /// The positional arguments in insertion order.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Iterate over the switches in name order.
    pub fn switches(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.switches
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Returns `true` if there are no switches and no arguments.
    pub fn is_empty(&self) -> bool {
        self.switches.is_empty() && self.arguments.is_empty()
    }

    /// Rebuild an argv that initializes an equal store.
    ///
    /// The first element is the program name (empty if there is none),
    /// followed by every switch in name order and then the positional
    /// arguments.  A `--` terminator precedes the arguments when one of them
    /// would otherwise be read back as a switch.
    ///
    /// Switch names that are empty or contain `=` have no argv spelling
    /// that reads back the same; use [`crate::transfer`] to copy state
    /// between stores.
    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(2 + self.switches.len() + self.arguments.len());
        argv.push(self.program.clone().unwrap_or_default());
        argv.extend(self.switches().map(|(name, value)| match value {
            Some(value) => format!("{SWITCH_PREFIX}{name}{SWITCH_VALUE_SEPARATOR}{value}"),
            None => format!("{SWITCH_PREFIX}{name}"),
        }));
        if self
            .arguments
            .iter()
            .any(|arg| arg.starts_with(SWITCH_PREFIX))
        {
            argv.push(SWITCH_TERMINATOR.to_owned());
        }
        argv.extend(self.arguments.iter().cloned());
        argv
    }

    fn insert(&mut self, name: String, value: Option<String>) {
        tracing::trace!("switch {name} = {value:?}");
        if let Some(prev) = self.switches.insert(name, value) {
            tracing::debug!("replaced earlier switch value {prev:?}");
        }
    }

    fn classify<I>(&mut self, elements: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut terminated = false;
        for element in elements {
            let element = element.as_ref();
            if terminated {
                self.arguments.push(element.to_owned());
            } else if element == SWITCH_TERMINATOR {
                tracing::debug!("switch terminator seen");
                terminated = true;
            } else if let Some(switch) = element.strip_prefix(SWITCH_PREFIX) {
                match switch.split_once(SWITCH_VALUE_SEPARATOR) {
                    Some((name, value)) => self.insert(name.to_owned(), Some(value.to_owned())),
                    None => self.insert(switch.to_owned(), None),
                }
            } else {
                self.arguments.push(element.to_owned());
            }
        }
    }
}

impl<S: AsRef<str>> Extend<S> for SwitchStore {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.append_switches_and_arguments(iter);
    }
}
