// SPDX-License-Identifier: MIT

//! Question dependency graph
//!
//! Built from a questionnaire's conditional logic; used to detect
//! self-reinforcing visibility loops and to answer reachability queries.

mod dependency;

pub use dependency::DependencyGraph;
