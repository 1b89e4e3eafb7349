//! Event selection over named trigger-path results.
//!
//! Conditions are boolean expressions over trigger-path names with glob
//! wildcards and `/N` prescale suffixes. A [`DecisionEngine`] compiles a
//! list of conditions once, then evaluates them against one event at a
//! time, caching the wildcard resolution until the trigger menu changes.
//!
//! ```
//! use trigger_select::{CombineMode, DecisionEngine, MenuId, PathOutcome, TriggerEvent};
//!
//! let mut engine = DecisionEngine::new(
//!     &["HLT_Mu* AND NOT HLT_Iso_v1", "HLT_Jet*/2"],
//!     CombineMode::Any,
//!     false,
//! )?;
//!
//! let names = vec![
//!     "HLT_Mu_v3".to_string(),
//!     "HLT_Iso_v1".to_string(),
//!     "HLT_Jet_v1".to_string(),
//! ];
//! let outcomes = vec![PathOutcome::pass(), PathOutcome::fail(), PathOutcome::fail()];
//!
//! engine.begin_event();
//! let accepted = engine.decide(&TriggerEvent {
//!     id: 1,
//!     menu: MenuId::new(42),
//!     names: &names,
//!     outcomes: &outcomes,
//! })?;
//! assert!(accepted);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod expression;
pub mod menu;
pub mod product_cache;

pub use config::FilterConfig;
pub use engine::{CombineMode, Decision, DecisionEngine};
pub use error::{BindError, ConfigError, DecideError, EvalError, ParseError};
pub use event::{EventCache, EventId, TriggerEvent};
pub use expression::{parse, Expression};
pub use menu::{MenuId, PathOutcome, PathTable};
pub use product_cache::{CacheHandle, ProductCache};
