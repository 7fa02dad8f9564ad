/// A node in a parent-pointer tree.
///
/// Trees are stored as flat collections where each node carries the ID of
/// its parent. Children are reconstructed by filtering, so nothing here owns
/// anything else.
pub trait TreeNode {
    fn id(&self) -> &str;
    fn parent_id(&self) -> Option<&str>;
}

/// Find a node by ID in a flat collection.
pub fn find_node<'a, T: TreeNode>(nodes: &'a [T], id: &str) -> Option<&'a T> {
    nodes.iter().find(|n| n.id() == id)
}

/// Number of nodes on the chain from `start` up to its root, `start` included.
/// Returns 0 if `start` is not in the collection.
///
/// The walk is bounded by the collection size so a corrupted parent loop
/// cannot hang the caller.
pub fn chain_len<T: TreeNode>(nodes: &[T], start: &str) -> usize {
    let mut len = 0;
    let mut current = Some(start);
    while let Some(id) = current {
        let Some(node) = find_node(nodes, id) else {
            break;
        };
        len += 1;
        if len > nodes.len() {
            break;
        }
        current = node.parent_id();
    }
    len
}

/// Depth of a node: 1 for roots, +1 per parent hop.
pub fn depth_of<T: TreeNode>(nodes: &[T], id: &str) -> usize {
    chain_len(nodes, id)
}

/// True if `candidate` sits somewhere below `ancestor`.
pub fn is_descendant<T: TreeNode>(nodes: &[T], candidate: &str, ancestor: &str) -> bool {
    let mut steps = 0;
    let mut current = find_node(nodes, candidate).and_then(|n| n.parent_id());
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        steps += 1;
        if steps > nodes.len() {
            return false;
        }
        current = find_node(nodes, id).and_then(|n| n.parent_id());
    }
    false
}

/// Longest chain of nodes under and including `id`. A leaf has height 1.
pub fn subtree_height<T: TreeNode>(nodes: &[T], id: &str) -> usize {
    fn height<T: TreeNode>(nodes: &[T], id: &str, budget: usize) -> usize {
        if budget == 0 {
            return 0;
        }
        let below = nodes
            .iter()
            .filter(|n| n.parent_id() == Some(id))
            .map(|n| height(nodes, n.id(), budget - 1))
            .max()
            .unwrap_or(0);
        1 + below
    }
    if find_node(nodes, id).is_none() {
        return 0;
    }
    height(nodes, id, nodes.len())
}

/// IDs of every node below `id` (not including `id`), parents before children.
pub fn descendant_ids<T: TreeNode>(nodes: &[T], id: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut frontier = vec![id.to_string()];
    while let Some(parent) = frontier.pop() {
        for node in nodes.iter().filter(|n| n.parent_id() == Some(parent.as_str())) {
            if node.id() == id || out.iter().any(|seen| seen == node.id()) {
                continue;
            }
            out.push(node.id().to_string());
            frontier.push(node.id().to_string());
        }
    }
    out
}
