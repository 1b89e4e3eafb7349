//! Trigger menu bookkeeping
//!
//! A *menu* is the ordered set of trigger path names delivered by the host
//! framework for the current configuration. The [`PathTable`] maps those
//! names to stable indices and is rebuilt whenever the menu identity
//! changes, typically at a run boundary.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

/// Opaque identity token for a trigger menu.
///
/// The crate never interprets the value; it only compares tokens for
/// equality to detect that the menu changed between events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MenuId(u64);

impl MenuId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "menu#{}", self.0)
    }
}

/// Outcome of one trigger path for one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathOutcome {
    /// The path accepted the event
    pub accepted: bool,
    /// The path ran to completion
    pub run: bool,
    /// The path aborted with an error
    pub error: bool,
}

impl PathOutcome {
    /// Outcome of a path that ran and accepted
    pub fn pass() -> Self {
        Self {
            accepted: true,
            run: true,
            error: false,
        }
    }

    /// Outcome of a path that ran and rejected
    pub fn fail() -> Self {
        Self {
            accepted: false,
            run: true,
            error: false,
        }
    }
}

/// Mapping from trigger path name to index for one menu.
///
/// The index of a path is its position in the name ordering delivered by
/// the framework; the per-event result vector is indexed the same way.
/// Names are expected to be unique; a duplicate keeps its first index.
#[derive(Debug, Clone)]
pub struct PathTable {
    menu: MenuId,
    names: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl PathTable {
    /// Build a table for the given menu from the delivered name ordering
    pub fn build(menu: MenuId, names: &[String]) -> Self {
        let mut by_name = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            if by_name.contains_key(name) {
                log::warn!("duplicate trigger path '{}' in {}, keeping first index", name, menu);
                continue;
            }
            by_name.insert(name.clone(), index);
        }
        Self {
            menu,
            names: names.to_vec(),
            by_name,
        }
    }

    /// Empty table, used before the first event is seen
    pub fn empty() -> Self {
        Self {
            menu: MenuId::new(0),
            names: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Identity of the menu this table was built for
    pub fn menu_id(&self) -> MenuId {
        self.menu
    }

    /// Number of paths in the menu
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index of an exact path name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Name at a given index
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Indices of every path whose name matches the compiled pattern,
    /// in menu order. Indices shadowed by an earlier duplicate name are
    /// excluded, so wildcard and exact lookup agree on the keep-first rule.
    pub fn matching_indices(&self, matcher: &Regex) -> Vec<usize> {
        self.names
            .iter()
            .enumerate()
            .filter(|(index, name)| {
                matcher.is_match(name) && self.by_name.get(*name) == Some(index)
            })
            .map(|(index, _)| index)
            .collect()
    }
}
