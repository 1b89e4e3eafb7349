//! Decision engine combining multiple conditions per event
//!
//! The engine owns its compiled conditions and an [`EventCache`], so each
//! execution context gets its own engine; it is single-threaded by
//! design, matching the one-event-at-a-time processing model.

use serde::{Deserialize, Serialize};

use crate::config::FilterConfig;
use crate::error::{ConfigError, DecideError, ParseError};
use crate::event::{EventCache, EventId, TriggerEvent};
use crate::expression::{parse, Expression};

/// How the per-condition verdicts combine into one decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    /// Accept when at least one condition is satisfied (logical OR)
    #[default]
    Any,
    /// Accept only when every condition is satisfied (logical AND)
    All,
}

/// Outcome of [`DecisionEngine::decide_verbose`]: the verdict plus the
/// names of the trigger paths that contributed to an acceptance
#[derive(Debug, Clone, Default)]
pub struct Decision {
    pub accepted: bool,
    pub paths: Vec<String>,
}

/// Evaluates a list of compiled conditions against each event.
pub struct DecisionEngine {
    expressions: Vec<Expression>,
    mode: CombineMode,
    cache: EventCache,
    /// Applied after the combine logic, on top of any per-path prescales
    overall_prescale: u32,
    overall_counter: u64,
}

impl DecisionEngine {
    /// Compile the given condition strings. Fails on the first condition
    /// that does not parse.
    pub fn new<S: AsRef<str>>(
        conditions: &[S],
        mode: CombineMode,
        strict: bool,
    ) -> Result<Self, ParseError> {
        let expressions = conditions
            .iter()
            .map(|c| parse(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            expressions,
            mode,
            cache: EventCache::new(strict),
            overall_prescale: 1,
            overall_counter: 0,
        })
    }

    /// Throttle accepting decisions to the first of every `factor`, on top
    /// of any per-path prescales. A factor of 1 passes everything through.
    pub fn with_overall_prescale(mut self, factor: u32) -> Self {
        debug_assert!(factor >= 1);
        self.overall_prescale = factor;
        self
    }

    /// Build an engine from a deserialized [`FilterConfig`].
    pub fn from_config(config: &FilterConfig) -> Result<Self, ConfigError> {
        if config.overall_prescale == 0 {
            return Err(ConfigError::InvalidOverallPrescale);
        }
        Ok(Self::new(&config.conditions, config.mode, config.strict)?
            .with_overall_prescale(config.overall_prescale))
    }

    /// Number of compiled conditions
    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Mark the start of a new event; the next [`decide`](Self::decide)
    /// may bind a different event id.
    pub fn begin_event(&mut self) {
        self.cache.begin_event();
    }

    /// Evaluate the conditions against `event` and return the combined
    /// verdict. In `Any` mode evaluation stops at the first satisfied
    /// condition, in `All` mode at the first unsatisfied one. An overall
    /// prescale, if configured, throttles the accepting decisions last.
    pub fn decide(&mut self, event: &TriggerEvent<'_>) -> Result<bool, DecideError> {
        let bound = self.cache.bind(event)?;
        let mut verdict = match self.mode {
            CombineMode::Any => false,
            CombineMode::All => true,
        };
        for expression in &mut self.expressions {
            let satisfied = expression.evaluate(&bound)?;
            match self.mode {
                CombineMode::Any if satisfied => {
                    log::trace!("event {} selected by '{}'", event.id, expression);
                    verdict = true;
                    break;
                }
                CombineMode::All if !satisfied => {
                    log::trace!("event {} rejected by '{}'", event.id, expression);
                    verdict = false;
                    break;
                }
                _ => {}
            }
        }
        if !verdict {
            return Ok(false);
        }
        Ok(self.overall_tick(event.id))
    }

    /// Advance the overall prescale on an accepting decision and report
    /// whether it passes through. Same continuous cadence as leaf
    /// prescales: the counter only moves on accepting decisions and is
    /// never reset.
    fn overall_tick(&mut self, event: EventId) -> bool {
        let tick = self.overall_counter;
        self.overall_counter += 1;
        let pass = tick % u64::from(self.overall_prescale) == 0;
        if !pass {
            log::trace!(
                "event {} held back by overall prescale /{}",
                event,
                self.overall_prescale
            );
        }
        pass
    }

    /// Like [`decide`](Self::decide), but an accepting decision also
    /// reports the sorted, deduplicated names of the trigger paths that
    /// accepted the event under the satisfying condition(s).
    pub fn decide_verbose(&mut self, event: &TriggerEvent<'_>) -> Result<Decision, DecideError> {
        let bound = self.cache.bind(event)?;
        let mut accepted = match self.mode {
            CombineMode::Any => false,
            CombineMode::All => true,
        };
        let mut paths = Vec::new();
        for expression in &mut self.expressions {
            let satisfied = expression.evaluate(&bound)?;
            match self.mode {
                CombineMode::Any if satisfied => {
                    accepted = true;
                    expression.accepted_paths(&bound, &mut paths);
                    break;
                }
                CombineMode::All if !satisfied => {
                    accepted = false;
                    break;
                }
                CombineMode::All => {
                    expression.accepted_paths(&bound, &mut paths);
                }
                _ => {}
            }
        }
        if accepted {
            accepted = self.overall_tick(event.id);
        }
        if !accepted {
            return Ok(Decision::default());
        }
        paths.sort();
        paths.dedup();
        Ok(Decision { accepted, paths })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{MenuId, PathOutcome};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn outcomes(accepted: &[bool]) -> Vec<PathOutcome> {
        accepted
            .iter()
            .map(|&a| if a { PathOutcome::pass() } else { PathOutcome::fail() })
            .collect()
    }

    fn engine(conditions: &[&str], mode: CombineMode, strict: bool) -> DecisionEngine {
        DecisionEngine::new(conditions, mode, strict).unwrap()
    }

    #[test]
    fn test_any_mode_accepts_on_first_match() {
        let names = names(&["HLT_A", "HLT_B"]);
        let results = outcomes(&[false, true]);
        let mut any = engine(&["HLT_A", "HLT_B"], CombineMode::Any, false);
        let event = TriggerEvent {
            id: 1,
            menu: MenuId::new(1),
            names: &names,
            outcomes: &results,
        };
        assert!(any.decide(&event).unwrap());
    }

    #[test]
    fn test_any_mode_rejects_when_nothing_matches() {
        let names = names(&["HLT_A", "HLT_B"]);
        let results = outcomes(&[false, false]);
        let mut any = engine(&["HLT_A", "HLT_B"], CombineMode::Any, false);
        let event = TriggerEvent {
            id: 1,
            menu: MenuId::new(1),
            names: &names,
            outcomes: &results,
        };
        assert!(!any.decide(&event).unwrap());
    }

    #[test]
    fn test_all_mode() {
        let names = names(&["HLT_A", "HLT_B"]);
        let all_pass = outcomes(&[true, true]);
        let one_fails = outcomes(&[true, false]);

        let mut all = engine(&["HLT_A", "HLT_B"], CombineMode::All, false);
        let event = TriggerEvent {
            id: 1,
            menu: MenuId::new(1),
            names: &names,
            outcomes: &all_pass,
        };
        assert!(all.decide(&event).unwrap());

        let mut all = engine(&["HLT_A", "HLT_B"], CombineMode::All, false);
        let event = TriggerEvent {
            id: 1,
            menu: MenuId::new(1),
            names: &names,
            outcomes: &one_fails,
        };
        assert!(!all.decide(&event).unwrap());
    }

    #[test]
    fn test_empty_condition_list() {
        let names = names(&["HLT_A"]);
        let results = outcomes(&[true]);
        let empty: &[&str] = &[];
        let event = TriggerEvent {
            id: 1,
            menu: MenuId::new(1),
            names: &names,
            outcomes: &results,
        };

        let mut any = engine(empty, CombineMode::Any, false);
        assert!(!any.decide(&event).unwrap());

        let mut all = engine(empty, CombineMode::All, false);
        assert!(all.decide(&event).unwrap());
    }

    #[test]
    fn test_strict_unknown_path_fails_fast() {
        let names = names(&["HLT_A"]);
        let results = outcomes(&[true]);
        let event = TriggerEvent {
            id: 1,
            menu: MenuId::new(1),
            names: &names,
            outcomes: &results,
        };

        let mut strict = engine(&["HLT_Missing"], CombineMode::Any, true);
        assert!(strict.decide(&event).is_err());

        let mut lenient = engine(&["HLT_Missing"], CombineMode::Any, false);
        assert!(!lenient.decide(&event).unwrap());
    }

    #[test]
    fn test_parse_failure_aborts_construction() {
        assert!(DecisionEngine::new(&["HLT_A AND"], CombineMode::Any, false).is_err());
        assert!(DecisionEngine::new(&["HLT_A", ""], CombineMode::Any, false).is_err());
    }

    #[test]
    fn test_decide_verbose_reports_contributing_paths() {
        let names = names(&["HLT_Mu_v1", "HLT_Jet_v1", "HLT_Iso_v2"]);
        // Mu passes, Jet fails, Iso passes: the OR's right arm accepts
        let results = outcomes(&[true, false, true]);
        let mut any = engine(
            &["(HLT_Mu* AND HLT_Jet_v1) OR HLT_Iso*"],
            CombineMode::Any,
            false,
        );
        let event = TriggerEvent {
            id: 1,
            menu: MenuId::new(1),
            names: &names,
            outcomes: &results,
        };
        let decision = any.decide_verbose(&event).unwrap();
        assert!(decision.accepted);
        assert!(decision.paths.contains(&"HLT_Iso_v2".to_string()));
    }

    #[test]
    fn test_decide_verbose_rejection_has_no_paths() {
        let names = names(&["HLT_A"]);
        let results = outcomes(&[false]);
        let mut any = engine(&["HLT_A"], CombineMode::Any, false);
        let event = TriggerEvent {
            id: 1,
            menu: MenuId::new(1),
            names: &names,
            outcomes: &results,
        };
        let decision = any.decide_verbose(&event).unwrap();
        assert!(!decision.accepted);
        assert!(decision.paths.is_empty());
    }

    #[test]
    fn test_overall_prescale_cadence() {
        let names = names(&["HLT_A"]);
        let results = outcomes(&[true]);
        let mut any =
            engine(&["HLT_A"], CombineMode::Any, false).with_overall_prescale(3);

        let mut selected = Vec::new();
        for id in 1..=9u64 {
            any.begin_event();
            let event = TriggerEvent {
                id,
                menu: MenuId::new(1),
                names: &names,
                outcomes: &results,
            };
            if any.decide(&event).unwrap() {
                selected.push(id);
            }
        }
        assert_eq!(selected, vec![1, 4, 7]);
    }

    #[test]
    fn test_overall_prescale_counts_only_accepting_decisions() {
        let names = names(&["HLT_A"]);
        let pass = outcomes(&[true]);
        let fail = outcomes(&[false]);
        let mut any =
            engine(&["HLT_A"], CombineMode::Any, false).with_overall_prescale(2);

        // event 2 is rejected by the condition logic, so it does not
        // advance the overall counter: accepting decisions 1 and 3
        // (events 1 and 4) pass, decision 2 (event 3) is held back
        let stream = [(1u64, &pass, true), (2, &fail, false), (3, &pass, false), (4, &pass, true)];
        for (id, results, expect) in stream {
            any.begin_event();
            let event = TriggerEvent {
                id,
                menu: MenuId::new(1),
                names: &names,
                outcomes: results,
            };
            assert_eq!(any.decide(&event).unwrap(), expect, "event {}", id);
        }
    }

    #[test]
    fn test_overall_prescale_verbose_holds_back_paths() {
        let names = names(&["HLT_A"]);
        let results = outcomes(&[true]);
        let mut any =
            engine(&["HLT_A"], CombineMode::Any, false).with_overall_prescale(2);

        let event = TriggerEvent {
            id: 1,
            menu: MenuId::new(1),
            names: &names,
            outcomes: &results,
        };
        let decision = any.decide_verbose(&event).unwrap();
        assert!(decision.accepted);
        assert_eq!(decision.paths, vec!["HLT_A".to_string()]);

        any.begin_event();
        let event = TriggerEvent {
            id: 2,
            menu: MenuId::new(1),
            names: &names,
            outcomes: &results,
        };
        let decision = any.decide_verbose(&event).unwrap();
        assert!(!decision.accepted);
        assert!(decision.paths.is_empty());
    }

    #[test]
    fn test_zero_overall_prescale_from_config_rejected() {
        let config = FilterConfig::new()
            .with_condition("HLT_A")
            .with_overall_prescale(0);
        assert!(matches!(
            DecisionEngine::from_config(&config),
            Err(ConfigError::InvalidOverallPrescale)
        ));
    }

    #[test]
    fn test_skipped_condition_keeps_prescale_cadence() {
        // HLT_A always satisfies the first condition, so HLT_B/2 is never
        // evaluated and its counter never advances
        let names = names(&["HLT_A", "HLT_B"]);
        let results = outcomes(&[true, true]);
        let mut any = engine(&["HLT_A", "HLT_B/2"], CombineMode::Any, false);
        for id in 1..=4u64 {
            any.begin_event();
            let event = TriggerEvent {
                id,
                menu: MenuId::new(1),
                names: &names,
                outcomes: &results,
            };
            assert!(any.decide(&event).unwrap());
        }
    }
}
