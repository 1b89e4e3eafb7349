//! Per-event binding of trigger results
//!
//! The [`EventCache`] is the long-lived half of the evaluation context: it
//! owns the [`PathTable`] and detects menu changes between events. Binding
//! an event produces a short-lived [`BoundEvent`] view that borrows the
//! event's result vector for the duration of one decision.
//!
//! Binding protocol, owned by the caller:
//! 1. `begin_event()` when the framework signals a new event;
//! 2. `bind(&event)` once (or more; rebinding the same event id is a no-op);
//! 3. binding a different event id without step 1 is a [`BindError`].

use crate::error::{BindError, EvalError};
use crate::menu::{MenuId, PathOutcome, PathTable};

/// Identifier of one event, as assigned by the host framework
pub type EventId = u64;

/// One event's trigger results as delivered by the host framework.
///
/// The name list and result vector are borrowed for the lifetime of the
/// event's evaluation and are never mutated here. `outcomes[i]` is the
/// outcome of the path `names[i]`.
#[derive(Debug, Clone, Copy)]
pub struct TriggerEvent<'a> {
    pub id: EventId,
    pub menu: MenuId,
    pub names: &'a [String],
    pub outcomes: &'a [PathOutcome],
}

/// Persistent evaluation context, one per decision engine.
#[derive(Debug)]
pub struct EventCache {
    /// Fail evaluation on patterns matching no path, instead of treating
    /// the leaf as false
    strict: bool,
    table: PathTable,
    last_menu: Option<MenuId>,
    current: Option<EventId>,
    menu_updated: bool,
}

impl EventCache {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            table: PathTable::empty(),
            last_menu: None,
            current: None,
            menu_updated: false,
        }
    }

    /// Whether unknown patterns fail the event instead of evaluating false
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Notification that the framework moved on to a new event.
    /// Clears the current binding; the menu identity carries over so the
    /// next `bind` can detect whether it changed.
    pub fn begin_event(&mut self) {
        self.current = None;
    }

    /// Bind the cache to one event, rebuilding the path table first if the
    /// menu identity changed since the last bound event.
    pub fn bind<'a>(&'a mut self, event: &TriggerEvent<'a>) -> Result<BoundEvent<'a>, BindError> {
        match self.current {
            // idempotent rebind: nothing to refetch, keep the update flag
            Some(bound) if bound == event.id => {}
            Some(bound) => {
                return Err(BindError::WrongEvent {
                    bound,
                    requested: event.id,
                });
            }
            None => {
                let changed = self.last_menu != Some(event.menu);
                if changed {
                    log::debug!(
                        "trigger menu changed to {} ({} paths), rebuilding path table",
                        event.menu,
                        event.names.len()
                    );
                    self.table = PathTable::build(event.menu, event.names);
                    self.last_menu = Some(event.menu);
                }
                self.menu_updated = changed;
                self.current = Some(event.id);
            }
        }

        Ok(BoundEvent {
            table: &self.table,
            outcomes: event.outcomes,
            menu_updated: self.menu_updated,
            strict: self.strict,
        })
    }
}

/// Read-only view of one bound event, handed to expression evaluation.
#[derive(Debug, Clone, Copy)]
pub struct BoundEvent<'a> {
    table: &'a PathTable,
    outcomes: &'a [PathOutcome],
    menu_updated: bool,
    strict: bool,
}

impl<'a> BoundEvent<'a> {
    /// Path table of the currently bound menu
    pub fn table(&self) -> &PathTable {
        self.table
    }

    /// Identity of the currently bound menu
    pub fn menu_id(&self) -> MenuId {
        self.table.menu_id()
    }

    /// True exactly when this event is the first one seen under a new menu
    pub fn menu_updated(&self) -> bool {
        self.menu_updated
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Outcome of the path at `index` for this event
    pub fn outcome(&self, index: usize) -> Result<PathOutcome, EvalError> {
        self.outcomes
            .get(index)
            .copied()
            .ok_or(EvalError::IndexOutOfRange {
                index,
                size: self.outcomes.len(),
            })
    }
}
