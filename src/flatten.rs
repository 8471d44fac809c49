//! Reply-tree flattening.
//!
//! Walks a reply tree depth-first and collects every record into a [`LeafSet`],
//! discarding the tree structure. Recursion depth is bounded so a hostile or
//! corrupt response cannot grow the stack without limit.

use crate::error::StructuralError;
use crate::types::{LeafRecord, LeafSet, TreeNode};

/// Flatten `root` into a new deduplicated set.
///
/// Children of `root` are at depth 1; a record at depth greater than `max_depth`
/// fails the whole flatten with [`StructuralError::DepthExceeded`].
pub fn flatten(root: &TreeNode<LeafRecord>, max_depth: usize) -> Result<LeafSet, StructuralError> {
    let mut set = LeafSet::new();
    flatten_into(&mut set, root, max_depth)?;
    Ok(set)
}

/// Flatten `root` into an existing set
pub fn flatten_into(
    set: &mut LeafSet,
    root: &TreeNode<LeafRecord>,
    max_depth: usize,
) -> Result<(), StructuralError> {
    walk(set, root, 1, max_depth)
}

fn walk(
    set: &mut LeafSet,
    node: &TreeNode<LeafRecord>,
    depth: usize,
    max_depth: usize,
) -> Result<(), StructuralError> {
    let children = node.children();
    if children.is_empty() {
        return Ok(());
    }
    if depth > max_depth {
        return Err(StructuralError::DepthExceeded { max_depth });
    }

    for child in children {
        set.insert(&child.data);
        if let Some(replies) = &child.data.replies {
            walk(set, replies, depth + 1, max_depth)?;
        }
    }
    Ok(())
}
