//! Hierarchy System
//!
//! Validation and top-down traversal of the node arena.
//!
//! Traversal is depth-first from each root in order: a parent is always
//! visited before its children, and children are visited in array order.
//! World transforms are computed in exactly this order, so a child never
//! reads a parent matrix from a previous tick.

use glam::Mat4;

use crate::errors::{Error, Result};
use crate::scene::node::Node;

/// Checks that child ids are in range, that no node has two parents and that
/// the graph has no cycle.
pub fn validate_hierarchy(nodes: &[Node]) -> Result<()> {
    let mut parent: Vec<Option<usize>> = vec![None; nodes.len()];

    for node in nodes {
        for &child in &node.children {
            let Some(slot) = parent.get_mut(child) else {
                return Err(Error::malformed(format!(
                    "node {} references missing child {child}",
                    node.id
                )));
            };
            if child == node.id {
                return Err(Error::malformed(format!("node {child} is its own child")));
            }
            if let Some(previous) = slot.replace(node.id) {
                return Err(Error::malformed(format!(
                    "node {child} has two parents ({previous} and {})",
                    node.id
                )));
            }
        }
    }

    // With at most one parent each, a cycle is a parent chain that never ends.
    // 0 = unvisited, 1 = on current chain, 2 = known to reach a root.
    let mut state = vec![0u8; nodes.len()];
    for start in 0..nodes.len() {
        let mut chain = Vec::new();
        let mut current = Some(start);
        while let Some(id) = current {
            match state[id] {
                2 => break,
                1 => {
                    return Err(Error::malformed(format!("node hierarchy contains a cycle through node {id}")));
                }
                _ => {
                    state[id] = 1;
                    chain.push(id);
                    current = parent[id];
                }
            }
        }
        for id in chain {
            state[id] = 2;
        }
    }

    Ok(())
}

/// Node ids in traversal order, starting from `roots`.
///
/// A node reachable twice (only possible when validation was skipped) is
/// visited once.
#[must_use]
pub fn depth_first_order(nodes: &[Node], roots: &[usize]) -> Vec<usize> {
    let mut order = Vec::with_capacity(nodes.len());
    let mut visited = vec![false; nodes.len()];
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        let Some(node) = nodes.get(id) else {
            continue;
        };
        if std::mem::replace(&mut visited[id], true) {
            log::warn!("node {id} reached more than once during traversal; skipping");
            continue;
        }
        order.push(id);
        stack.extend(node.children.iter().rev().copied());
    }

    order
}

/// Recomputes `world_transform` for every node reachable from `roots`:
/// `world(child) = world(parent) × animated(child)`, roots use their
/// animated transform directly.
pub fn update_world_transforms(nodes: &mut [Node], roots: &[usize]) {
    let mut visited = vec![false; nodes.len()];
    let mut stack: Vec<(usize, Mat4)> = roots.iter().rev().map(|&id| (id, Mat4::IDENTITY)).collect();

    while let Some((id, parent_world)) = stack.pop() {
        let Some(node) = nodes.get_mut(id) else {
            continue;
        };
        if std::mem::replace(&mut visited[id], true) {
            continue;
        }

        let world = parent_world * node.animated_transform;
        node.world_transform = world;
        stack.extend(node.children.iter().rev().map(|&child| (child, world)));
    }
}
