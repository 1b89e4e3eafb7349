//! Expression tree and evaluator
//!
//! A compiled condition is a small tree of boolean nodes. The tree
//! structure is immutable after parsing; the only mutable state lives in
//! the [`PathLeaf`] nodes (prescale counter and resolved-index cache),
//! which is why evaluation takes `&mut self`.
//!
//! `And` and `Or` short-circuit, and that is a contract rather than an
//! optimization: a leaf that is never reached does not advance its
//! prescale counter.

use std::fmt;

use regex::Regex;

use crate::error::EvalError;
use crate::event::BoundEvent;
use crate::menu::MenuId;

/// Resolution state of a leaf's pattern against the current menu
#[derive(Debug, Clone)]
enum Resolution {
    Unresolved,
    Resolved { menu: MenuId, indices: Vec<usize> },
}

/// Leaf node matching trigger paths by name.
///
/// The pattern may contain the shell-glob wildcards `*` and `?`; it is
/// matched against every path name of the current menu, and the leaf is
/// raw-true when any matching path accepted the event. A prescale factor
/// of N then lets through the first of every N raw-true events.
#[derive(Debug, Clone)]
pub struct PathLeaf {
    pattern: String,
    matcher: Regex,
    prescale: u32,
    counter: u64,
    resolution: Resolution,
}

impl PathLeaf {
    /// Compile a glob pattern into a leaf. `prescale` must be at least 1;
    /// 1 means every raw match passes through.
    pub fn new(pattern: impl Into<String>, prescale: u32) -> Result<Self, regex::Error> {
        debug_assert!(prescale >= 1);
        let pattern = pattern.into();
        let matcher = Regex::new(&glob_to_regex(&pattern))?;
        Ok(Self {
            pattern,
            matcher,
            prescale,
            counter: 0,
            resolution: Resolution::Unresolved,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn prescale(&self) -> u32 {
        self.prescale
    }

    /// Number of raw-true events seen so far; continuous across menu changes
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Re-resolve the pattern if the bound menu differs from the one the
    /// cached index set was computed for
    fn ensure_resolved(&mut self, event: &BoundEvent<'_>) {
        let stale = match &self.resolution {
            Resolution::Resolved { menu, .. } => *menu != event.menu_id(),
            Resolution::Unresolved => true,
        };
        if stale {
            let indices = event.table().matching_indices(&self.matcher);
            if indices.is_empty() {
                log::warn!(
                    "pattern '{}' matches no trigger path in {}",
                    self.pattern,
                    event.menu_id()
                );
            }
            self.resolution = Resolution::Resolved {
                menu: event.menu_id(),
                indices,
            };
        }
    }

    fn evaluate(&mut self, event: &BoundEvent<'_>) -> Result<bool, EvalError> {
        self.ensure_resolved(event);
        let indices: &[usize] = match &self.resolution {
            Resolution::Resolved { indices, .. } => indices,
            Resolution::Unresolved => &[],
        };

        if indices.is_empty() {
            if event.strict() {
                return Err(EvalError::UnknownPath(self.pattern.clone()));
            }
            return Ok(false);
        }

        let mut raw = false;
        for &index in indices {
            if event.outcome(index)?.accepted {
                raw = true;
                break;
            }
        }
        if !raw {
            return Ok(false);
        }

        // deterministic first-of-every-N: the counter advances on every
        // raw-true event and is never reset, not even on a menu change
        let tick = self.counter;
        self.counter += 1;
        Ok(tick % u64::from(self.prescale) == 0)
    }

    /// Append the names of resolved paths that accepted this event.
    /// Read-only: does not resolve or advance the prescale counter.
    fn collect_accepted(&self, event: &BoundEvent<'_>, out: &mut Vec<String>) {
        let Resolution::Resolved { indices, .. } = &self.resolution else {
            return;
        };
        for &index in indices {
            let accepted = event.outcome(index).map(|o| o.accepted).unwrap_or(false);
            if accepted {
                if let Some(name) = event.table().name_at(index) {
                    out.push(name.to_string());
                }
            }
        }
    }
}

/// A compiled trigger condition.
///
/// Node precedence mirrors the grammar: `NOT` binds tighter than `AND`,
/// which binds tighter than `OR`.
#[derive(Debug, Clone)]
pub enum Expression {
    Path(PathLeaf),
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
}

impl Expression {
    /// Evaluate this condition against one bound event.
    ///
    /// `And` does not evaluate its right operand when the left is false;
    /// `Or` does not evaluate its right operand when the left is true.
    pub fn evaluate(&mut self, event: &BoundEvent<'_>) -> Result<bool, EvalError> {
        match self {
            Expression::Path(leaf) => leaf.evaluate(event),
            Expression::Not(inner) => Ok(!inner.evaluate(event)?),
            Expression::And(left, right) => {
                if !left.evaluate(event)? {
                    return Ok(false);
                }
                right.evaluate(event)
            }
            Expression::Or(left, right) => {
                if left.evaluate(event)? {
                    return Ok(true);
                }
                right.evaluate(event)
            }
        }
    }

    /// Names of the resolved paths that accepted this event, across all
    /// leaves of the tree. Used for provenance after an accepting decision.
    pub fn accepted_paths(&self, event: &BoundEvent<'_>, out: &mut Vec<String>) {
        match self {
            Expression::Path(leaf) => leaf.collect_accepted(event, out),
            Expression::Not(inner) => inner.accepted_paths(event, out),
            Expression::And(left, right) | Expression::Or(left, right) => {
                left.accepted_paths(event, out);
                right.accepted_paths(event, out);
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Or(..) => 1,
            Expression::And(..) => 2,
            Expression::Not(..) => 3,
            Expression::Path(..) => 4,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// Re-serializes the tree into a string the parser accepts, with
/// parentheses and quoting reapplied where needed
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Path(leaf) => {
                if needs_quoting(&leaf.pattern) {
                    write!(f, "\"{}\"", leaf.pattern)?;
                } else {
                    write!(f, "{}", leaf.pattern)?;
                }
                if leaf.prescale != 1 {
                    write!(f, "/{}", leaf.prescale)?;
                }
                Ok(())
            }
            Expression::Not(inner) => {
                write!(f, "NOT ")?;
                inner.fmt_operand(f, 3)
            }
            Expression::And(left, right) => {
                left.fmt_operand(f, 2)?;
                write!(f, " AND ")?;
                right.fmt_operand(f, 2)
            }
            Expression::Or(left, right) => {
                left.fmt_operand(f, 1)?;
                write!(f, " OR ")?;
                right.fmt_operand(f, 1)
            }
        }
    }
}

fn needs_quoting(pattern: &str) -> bool {
    matches!(pattern, "AND" | "OR" | "NOT")
        || pattern.chars().any(|ch| {
            ch.is_whitespace() || matches!(ch, '(' | ')' | '/' | '&' | '|' | '!' | '"' | '\'')
        })
}

/// Translate a shell-glob pattern into an anchored regular expression.
/// `*` matches any run of characters, `?` a single character; everything
/// else is literal.
fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            ch if ch.is_alphanumeric() || ch == '_' => out.push(ch),
            ch => {
                out.push('\\');
                out.push(ch);
            }
        }
    }
    out.push('$');
    out
}
