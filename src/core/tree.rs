//! Document tree operations
//!
//! Documents form a parent-linked hierarchy per project: `parent_id = None`
//! is the root level, folders contain children, files are leaves. The
//! functions here are pure; they take the document collection as a slice
//! and return the nodes or clones an operation touches. `core::store`
//! turns the results into storage batches.
//!
//! Every walk is guarded against revisiting a node, so corrupted parent
//! links (a cycle on disk) degrade into a truncated result instead of an
//! infinite loop.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::identity::RecordId;
use crate::entities::Document;

/// Index from parent id to child nodes, built once per operation
fn children_index(docs: &[Document]) -> HashMap<Option<&str>, Vec<&Document>> {
    let mut index: HashMap<Option<&str>, Vec<&Document>> = HashMap::new();
    for doc in docs {
        index
            .entry(doc.parent_id.as_ref().map(|p| p.as_str()))
            .or_default()
            .push(doc);
    }
    index
}

/// The node plus every descendant, breadth-first with the root first
///
/// Returns an empty list if the root id does not exist.
pub fn collect_subtree<'a>(docs: &'a [Document], root_id: &RecordId) -> Vec<&'a Document> {
    let Some(root) = docs.iter().find(|d| &d.id == root_id) else {
        return Vec::new();
    };

    let index = children_index(docs);
    let mut seen: HashSet<&str> = HashSet::from([root.id.as_str()]);
    let mut nodes = vec![root];
    let mut queue = VecDeque::from([root.id.as_str()]);

    while let Some(parent) = queue.pop_front() {
        if let Some(kids) = index.get(&Some(parent)) {
            for child in kids {
                if seen.insert(child.id.as_str()) {
                    nodes.push(child);
                    queue.push_back(child.id.as_str());
                }
            }
        }
    }
    nodes
}

/// The chain of folders from the root down to `folder_id`, inclusive
///
/// Walks parent links upward and reverses. A missing parent ends the walk
/// at whatever was reached; a revisited node stops it outright.
pub fn breadcrumb<'a>(docs: &'a [Document], folder_id: &RecordId) -> Vec<&'a Document> {
    let mut chain = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = docs.iter().find(|d| &d.id == folder_id);

    while let Some(node) = current {
        if !seen.insert(node.id.as_str()) {
            break;
        }
        chain.push(node);
        current = node
            .parent_id
            .as_ref()
            .and_then(|pid| docs.iter().find(|d| &d.id == pid));
    }

    chain.reverse();
    chain
}

/// Whether reparenting `id` under `new_parent_id` would close a loop
///
/// True when the destination is the node itself or any of its descendants,
/// checked by walking the destination's ancestor chain.
pub fn would_create_cycle(docs: &[Document], id: &RecordId, new_parent_id: &RecordId) -> bool {
    if new_parent_id == id {
        return true;
    }
    breadcrumb(docs, new_parent_id).iter().any(|d| &d.id == id)
}

/// Deep-clone a subtree under a new parent
///
/// `subtree` comes from [`collect_subtree`] (root first) and `new_ids`
/// supplies one fresh id per node in the same order. The root clone takes
/// the destination parent and a " (copy)" name suffix; every descendant
/// keeps its name and is rewired to its cloned parent.
pub fn clone_subtree(
    subtree: &[&Document],
    new_ids: &[RecordId],
    new_parent_id: Option<RecordId>,
    stamp: DateTime<Utc>,
) -> Vec<Document> {
    let id_map: HashMap<&str, &RecordId> = subtree
        .iter()
        .zip(new_ids)
        .map(|(doc, id)| (doc.id.as_str(), id))
        .collect();

    subtree
        .iter()
        .zip(new_ids)
        .enumerate()
        .map(|(i, (original, new_id))| {
            let (name, parent_id) = if i == 0 {
                (format!("{} (copy)", original.name), new_parent_id.clone())
            } else {
                let parent = original
                    .parent_id
                    .as_ref()
                    .and_then(|p| id_map.get(p.as_str()))
                    .map(|&id| id.clone());
                (original.name.clone(), parent)
            };
            Document {
                id: new_id.clone(),
                project_id: original.project_id.clone(),
                parent_id,
                name,
                kind: original.kind,
                file_data: original.file_data.clone(),
                created_at: stamp,
            }
        })
        .collect()
}
