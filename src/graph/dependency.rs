// SPDX-License-Identifier: MIT

//! Directed graph of question dependencies
//!
//! An edge `dependent -> dependency` means the dependent question's
//! conditional logic reads the dependency's answer.

use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Every node seen, in insertion order
    nodes: Vec<String>,
    /// Forward edges: dependent -> dependencies
    edges: HashMap<String, Vec<String>>,
    /// Reverse edges: dependency -> dependents
    reverse: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `dependent` reads the answer of `dependency`
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        self.add_node(dependent);
        self.add_node(dependency);

        let deps = self.edges.entry(dependent.to_string()).or_default();
        if !deps.iter().any(|d| d == dependency) {
            deps.push(dependency.to_string());
        }
        let dependents = self.reverse.entry(dependency.to_string()).or_default();
        if !dependents.iter().any(|d| d == dependent) {
            dependents.push(dependent.to_string());
        }
    }

    fn add_node(&mut self, node: &str) {
        if !self.nodes.iter().any(|n| n == node) {
            self.nodes.push(node.to_string());
        }
    }

    /// Direct dependencies of `node`
    pub fn get_dependencies(&self, node: &str) -> Vec<String> {
        self.edges.get(node).cloned().unwrap_or_default()
    }

    /// Questions whose logic reads `node`
    pub fn get_dependents(&self, node: &str) -> Vec<String> {
        self.reverse.get(node).cloned().unwrap_or_default()
    }

    /// Breadth-first search over forward edges. A node always reaches itself.
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        visited.insert(from);
        queue.push_back(from);

        while let Some(node) = queue.pop_front() {
            for next in self.edges.get(node).into_iter().flatten() {
                if next == to {
                    return true;
                }
                if visited.insert(next.as_str()) {
                    queue.push_back(next.as_str());
                }
            }
        }
        false
    }

    /// Find dependency cycles. Each cycle is reported as a path that starts
    /// and ends at the same node, e.g. `[A, B, C, A]`; a self-loop is `[A, A]`.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut on_stack: HashSet<&str> = HashSet::new();
        let mut path: Vec<&str> = Vec::new();

        for node in &self.nodes {
            if !visited.contains(node.as_str()) {
                self.visit(node, &mut visited, &mut on_stack, &mut path, &mut cycles);
            }
        }
        cycles
    }

    fn visit<'a>(
        &'a self,
        node: &'a str,
        visited: &mut HashSet<&'a str>,
        on_stack: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        visited.insert(node);
        on_stack.insert(node);
        path.push(node);

        for next in self.edges.get(node).into_iter().flatten() {
            let next = next.as_str();
            if on_stack.contains(next) {
                if let Some(start) = path.iter().position(|n| *n == next) {
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|n| n.to_string()).collect();
                    cycle.push(next.to_string());
                    cycles.push(cycle);
                }
            } else if !visited.contains(next) {
                self.visit(next, visited, on_stack, path, cycles);
            }
        }

        path.pop();
        on_stack.remove(node);
    }

    pub fn get_all_nodes(&self) -> Vec<String> {
        self.nodes.clone()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.reverse.clear();
    }

    /// Number of nodes with at least one outgoing dependency
    pub fn size(&self) -> usize {
        self.edges.len()
    }
}
