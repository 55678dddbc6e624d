//! Projection & optimization engine for budget-constrained fantasy football
//! rosters: composite player scoring, multi-gameweek point projections over a
//! fixture-difficulty calendar, constrained transfer search, and chip timing.
//!
//! The engine is stateless per invocation: it fetches one snapshot through a
//! [`provider::DataProvider`], derives everything it needs, and returns
//! advisory recommendation values without mutating any input.

pub mod calendar;
pub mod chips;
pub mod engine;
pub mod error;
pub mod fpl_fetch;
pub mod http_client;
pub mod league;
pub mod model;
pub mod projection;
pub mod provider;
pub mod sample_data;
pub mod scoring;
pub mod transfers;

pub use engine::{Engine, EngineConfig, RiskPreference};
pub use error::EngineError;
