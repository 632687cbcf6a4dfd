//! In-memory node cache.
//!
//! Holds at most one node per id plus the ordered child ids of every listed
//! parent. It is only ever cleared as a whole.

use std::collections::HashMap;
use std::sync::Arc;

use super::node::RemoteNode;

#[derive(Debug, Default)]
pub struct NodeCache {
    nodes: HashMap<String, Arc<RemoteNode>>,
    /// Listed children per parent id; `None` is the root.
    children: HashMap<Option<String>, Vec<String>>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the listing of one parent, replacing nodes with the same ids.
    pub fn insert_children(&mut self, parent_id: Option<&str>, nodes: &[Arc<RemoteNode>]) {
        let ids = nodes.iter().map(|n| n.id.clone()).collect();
        for node in nodes {
            self.nodes.insert(node.id.clone(), Arc::clone(node));
        }
        self.children.insert(parent_id.map(str::to_string), ids);
    }

    /// Previously listed children of a parent, in listing order.
    pub fn children(&self, parent_id: Option<&str>) -> Option<Vec<Arc<RemoteNode>>> {
        let ids = self.children.get(&parent_id.map(str::to_string))?;
        Some(ids.iter().filter_map(|id| self.nodes.get(id).cloned()).collect())
    }

    pub fn get(&self, id: &str) -> Option<Arc<RemoteNode>> {
        self.nodes.get(id).cloned()
    }

    pub fn find_by_path(&self, path: &str) -> Option<Arc<RemoteNode>> {
        self.nodes.values().find(|n| n.path == path).cloned()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.children.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut cache = NodeCache::new();
        let a = Arc::new(RemoteNode::directory("1", "/a"));
        let b = Arc::new(RemoteNode::file("f2", "/b.txt"));
        cache.insert_children(None, &[a, b]);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("f2").unwrap().label, "b.txt");
        assert_eq!(cache.find_by_path("/a").unwrap().id, "1");

        let children = cache.children(None).unwrap();
        let labels: Vec<_> = children.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b.txt"]);
        assert!(cache.children(Some("1")).is_none());
    }

    #[test]
    fn test_one_node_per_id() {
        let mut cache = NodeCache::new();
        cache.insert_children(None, &[Arc::new(RemoteNode::file("x", "/old.txt"))]);
        cache.insert_children(Some("d"), &[Arc::new(RemoteNode::file("x", "/d/new.txt"))]);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("x").unwrap().path, "/d/new.txt");
    }

    #[test]
    fn test_clear_is_wholesale() {
        let mut cache = NodeCache::new();
        cache.insert_children(None, &[Arc::new(RemoteNode::directory("1", "/a"))]);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.children(None).is_none());
    }
}
