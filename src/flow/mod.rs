// SPDX-License-Identifier: MIT

//! Questionnaire traversal
//!
//! `FlowEngine` decides which question comes next using the conditional
//! logic in `crate::logic` and persists each step through `crate::storage`.

mod engine;
mod types;

pub use engine::FlowEngine;
pub use types::{FlowStep, Progress};
