// SPDX-License-Identifier: MIT

//! Conditional navigation for multi-step questionnaires.
//!
//! - [`condition`] evaluates atomic conditions against recorded answers
//! - [`logic`] turns conditions into show/hide/skip/required decisions and
//!   validates a questionnaire's conditional structure
//! - [`graph`] holds the question dependency graph
//! - [`flow`] drives a session through a questionnaire

pub mod condition;
pub mod config;
pub mod error;
pub mod flow;
pub mod graph;
pub mod logic;
pub mod questionnaire;
pub mod state;
pub mod storage;
