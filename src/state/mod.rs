// SPDX-License-Identifier: MIT

//! State for questionnaire traversal
//!
//! This module provides:
//! - `Responses` - the response snapshot shared by the evaluator and the flow
//! - `FlowState` - the session-scoped traversal state
//! - `FlowSnapshot` - the persisted form of `FlowState`

mod flow;
mod responses;

pub use flow::{FlowSnapshot, FlowState};
pub use responses::Responses;
