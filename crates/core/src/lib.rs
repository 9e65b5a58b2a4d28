//! Core library for tourney-threads
//!
//! This crate implements the **Functional Core** of the tourney-threads application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The tourney-threads project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`tourney_threads_core`** (this crate): Pure transformation functions with zero network I/O
//! - **`tourney-threads`**: OAuth, Challonge and Discord I/O plus orchestration (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All transformation functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No network calls, no external state mutations
//! - **Deterministic**: Behavior is predictable and reproducible
//! - **Testable**: Can be tested with simple fixture data, no mocking required
//!
//! The only filesystem access lives in [`config::load_settings`], which reads the
//! YAML settings file before any transformation runs.
//!
//! # Module Organization
//!
//! The pipeline runs leaf-to-root:
//!
//! - [`jsonapi`]: Raw JSON:API documents returned by the Challonge v2.1 API
//! - [`participant`]: Identity resolution (clean display names, Discord mentions)
//! - [`rounds`]: Round coercion and round/bracket labels
//! - [`bracket`]: Parsing a bracket page into typed [`bracket::Match`] entities
//! - [`stage`]: Classifying a tournament as Swiss, Groups or Elimination
//! - [`template`]: The brace-placeholder template engine
//! - [`render`]: Thread title and body rendering for a match
//! - [`config`]: Settings model and validation
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use tourney_threads_core::bracket::parse_matches;
//! use tourney_threads_core::render::render_title;
//!
//! // Parse fixture data (no HTTP required)
//! let matches = parse_matches(&page.data, &page.included, &settings.runner_map);
//!
//! // Render using pure functions
//! let title = render_title(&matches[0], Some(StageKind::Elimination), &settings, "")?;
//! assert_eq!(title, "Winners R1: Alice vs Bob");
//! ```

pub mod bracket;
pub mod config;
pub mod jsonapi;
pub mod participant;
pub mod render;
pub mod rounds;
pub mod stage;
pub mod template;
