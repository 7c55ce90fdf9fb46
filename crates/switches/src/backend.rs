//! Interchangeable backing stores for the process command line.
//!
//! A host starts out with a plain [`SwitchStore`] while it is still
//! single-threaded, and may later hand the state to a [`SharedSwitchStore`]
//! that can be cloned into every component that needs to read it.  Callers
//! written against [`CommandLine`] do not notice the hand-off.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::{SwitchStore, SWITCH_TERMINATOR};

/// Which implementation backs a [`CommandLine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// An owned [`SwitchStore`].
    Local,
    /// A [`SharedSwitchStore`] handle.
    Shared,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Local => f.write_str("local"),
            Backend::Shared => f.write_str("shared"),
        }
    }
}

/// The query and append contract shared by every backing store.
///
/// All implementations classify appended elements identically; see
/// [`SwitchStore`] for the rules.
pub trait CommandLine: std::fmt::Debug {
    /// Returns `true` if a switch with exactly this name is present.
    fn has_switch(&self, name: &str) -> bool;

    /// Returns the value of the named switch, if it has one.
    fn switch_value(&self, name: &str) -> Option<String>;

    /// Add a switch without a value, replacing any existing entry.
    fn append_switch(&mut self, name: &str);

    /// Add a switch with a value, replacing any existing entry.
    fn append_switch_with_value(&mut self, name: &str, value: &str);

    /// Classify every element and merge the result.
    fn append_switches_and_arguments(&mut self, elements: &[&str]);

    /// Rebuild an argv holding the current state; see [`SwitchStore::to_argv`].
    fn to_argv(&self) -> Vec<String>;

    /// Copy out the current state.
    fn snapshot(&self) -> SwitchStore;

    /// The implementation in use.
    fn backend(&self) -> Backend;
}

impl CommandLine for SwitchStore {
    fn has_switch(&self, name: &str) -> bool {
        SwitchStore::has_switch(self, name)
    }

    fn switch_value(&self, name: &str) -> Option<String> {
        SwitchStore::switch_value(self, name).map(ToOwned::to_owned)
    }

    fn append_switch(&mut self, name: &str) {
        SwitchStore::append_switch(self, name)
    }

    fn append_switch_with_value(&mut self, name: &str, value: &str) {
        SwitchStore::append_switch_with_value(self, name, value)
    }

    fn append_switches_and_arguments(&mut self, elements: &[&str]) {
        SwitchStore::append_switches_and_arguments(self, elements)
    }

    fn to_argv(&self) -> Vec<String> {
        SwitchStore::to_argv(self)
    }

    fn snapshot(&self) -> SwitchStore {
        self.clone()
    }

    fn backend(&self) -> Backend {
        Backend::Local
    }
}

/// A cloneable, thread-safe handle to a [`SwitchStore`].
///
/// Every clone observes the same state.  An append is applied under a
/// single write lock, so readers see either none or all of it.
#[derive(Clone, Debug, Default)]
pub struct SharedSwitchStore(Arc<RwLock<SwitchStore>>);

impl SharedSwitchStore {
    /// Create a handle to an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy out the current state.
    pub fn snapshot(&self) -> SwitchStore {
        self.read().clone()
    }

    /// Discard every switch and argument.
    pub fn reset(&self) {
        self.write().reset();
    }

    /// Start a new epoch from an argv-style sequence; see
    /// [`SwitchStore::initialize`].
    pub fn initialize<I>(&self, elements: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.write().initialize(elements);
    }

    /// Run `f` with read access to the underlying store.
    pub fn with<R>(&self, f: impl FnOnce(&SwitchStore) -> R) -> R {
        f(&self.read())
    }

    // A panic while holding the lock cannot leave the store half-updated
    // in a way readers care about, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, SwitchStore> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SwitchStore> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<SwitchStore> for SharedSwitchStore {
    fn from(store: SwitchStore) -> Self {
        Self(Arc::new(RwLock::new(store)))
    }
}

impl CommandLine for SharedSwitchStore {
    fn has_switch(&self, name: &str) -> bool {
        self.read().has_switch(name)
    }

    fn switch_value(&self, name: &str) -> Option<String> {
        self.read().switch_value(name).map(ToOwned::to_owned)
    }

    fn append_switch(&mut self, name: &str) {
        self.write().append_switch(name)
    }

    fn append_switch_with_value(&mut self, name: &str, value: &str) {
        self.write().append_switch_with_value(name, value)
    }

    fn append_switches_and_arguments(&mut self, elements: &[&str]) {
        self.write().append_switches_and_arguments(elements)
    }

    fn to_argv(&self) -> Vec<String> {
        self.read().to_argv()
    }

    fn snapshot(&self) -> SwitchStore {
        SharedSwitchStore::snapshot(self)
    }

    fn backend(&self) -> Backend {
        Backend::Shared
    }
}

/// Copy the state of `from` into `to`.
///
/// Switches are copied entry by entry, so names are never re-parsed, and
/// the positional arguments are appended behind a terminator.  The program
/// name is not copied.  Entries already in `to` are kept unless `from` has
/// a switch of the same name.
pub fn transfer(from: &dyn CommandLine, to: &mut dyn CommandLine) {
    let source = from.snapshot();
    tracing::debug!(
        "transferring {} switches and {} arguments from {} to {} backend",
        source.switches().count(),
        source.arguments().len(),
        from.backend(),
        to.backend()
    );
    for (name, value) in source.switches() {
        match value {
            Some(value) => to.append_switch_with_value(name, value),
            None => to.append_switch(name),
        }
    }
    if !source.arguments().is_empty() {
        let elements: Vec<&str> = std::iter::once(SWITCH_TERMINATOR)
            .chain(source.arguments().iter().map(String::as_str))
            .collect();
        to.append_switches_and_arguments(&elements);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(SharedSwitchStore: Send, Sync, Clone);
    static_assertions::assert_obj_safe!(CommandLine);

    fn exercise(cl: &mut dyn CommandLine) {
        assert!(!cl.has_switch("superfast"));
        cl.append_switch("flag");
        cl.append_switch_with_value("speed", "slow");
        cl.append_switches_and_arguments(&["dummy", "--superfast", "--speed=turbo"]);
        assert!(cl.has_switch("flag"));
        assert!(cl.has_switch("superfast"));
        assert!(!cl.has_switch("dummy"));
        assert_eq!(cl.switch_value("speed").as_deref(), Some("turbo"));
        assert_eq!(cl.switch_value("flag"), None);
        assert_eq!(cl.switch_value("missing"), None);
    }

    #[test]
    fn test_backends_behave_the_same() {
        let mut local = SwitchStore::new();
        let mut shared = SharedSwitchStore::new();
        exercise(&mut local);
        exercise(&mut shared);
        assert_eq!(local.backend(), Backend::Local);
        assert_eq!(shared.backend(), Backend::Shared);
        assert_eq!(shared.snapshot(), local);
        assert_eq!(CommandLine::to_argv(&shared), CommandLine::to_argv(&local));
    }

    #[test]
    fn test_shared_clones_see_appends() {
        let mut writer = SharedSwitchStore::from(SwitchStore::from_args(["prog", "--a"]));
        let reader = writer.clone();
        assert!(reader.has_switch("a"));
        writer.append_switch_with_value("b", "1");
        assert_eq!(reader.switch_value("b").as_deref(), Some("1"));
        reader.with(|store| assert_eq!(store.program(), Some("prog")));

        let handle = std::thread::spawn(move || reader.has_switch("b"));
        assert!(handle.join().unwrap());

        writer.reset();
        assert!(!writer.has_switch("a"));
        assert!(writer.snapshot().is_empty());
    }

    #[test]
    fn test_shared_initialize() {
        let shared = SharedSwitchStore::new();
        shared.initialize(["prog", "--x=y", "arg"]);
        assert_eq!(shared.switch_value("x").as_deref(), Some("y"));
        shared.with(|store| assert_eq!(store.arguments(), ["arg"]));
    }

    #[test]
    fn test_transfer() {
        let mut local = SwitchStore::from_args([
            "init_command",
            "--SWITCH",
            "Arg",
            "--switch2=brea\\d",
            "--",
            "--actually_an_arg",
        ]);
        local.append_switch("late");

        let mut shared = SharedSwitchStore::new();
        shared.append_switch_with_value("SWITCH", "overwritten");
        shared.append_switch("kept");
        transfer(&local, &mut shared);

        assert!(shared.has_switch("late"));
        assert!(shared.has_switch("kept"));
        assert_eq!(shared.switch_value("SWITCH"), None);
        assert_eq!(shared.switch_value("switch2").as_deref(), Some("brea\\d"));
        assert!(!shared.has_switch("actually_an_arg"));
        shared.with(|store| assert_eq!(store.arguments(), ["Arg", "--actually_an_arg"]));
    }

    #[test]
    fn test_transfer_keeps_unusual_names() {
        let mut local = SwitchStore::new();
        local.append_switch_with_value("a=b", "c");
        let mut shared = SharedSwitchStore::new();
        transfer(&local, &mut shared);
        assert!(shared.has_switch("a=b"));
        assert_eq!(shared.switch_value("a=b").as_deref(), Some("c"));
        assert!(!shared.has_switch("a"));

        // an empty name must not turn into a terminator
        let mut local = SwitchStore::from_args(["prog", "--x=1", "--y", "arg"]);
        local.append_switch("");
        let mut shared = SharedSwitchStore::new();
        transfer(&local, &mut shared);
        assert!(shared.has_switch(""));
        assert_eq!(shared.switch_value("x").as_deref(), Some("1"));
        assert!(shared.has_switch("y"));
        shared.with(|store| assert_eq!(store.arguments(), ["arg"]));
        assert_eq!(CommandLine::snapshot(&shared).switches().count(), 3);
    }

    #[test]
    fn test_backend_display() {
        assert_eq!(Backend::Local.to_string(), "local");
        assert_eq!(Backend::Shared.to_string(), "shared");
        assert_eq!(
            serde_json::to_string(&Backend::Shared).unwrap(),
            "\"shared\""
        );
    }
}
