//! Arena-backed move tree.
//!
//! All nodes live in one vector. Node 0 is the root (the starting position,
//! no ply). The mainline is the chain of `Mainline`-kind first children from
//! the root; a variation at mainline index `i` is a `Variation`-kind child of
//! the mainline node at depth `i`, i.e. an alternative to `mainline[i]`.

use crate::{GameError, Ply};

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// Whether a node belongs to the recorded game or to a side line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Mainline,
    Variation,
}

#[derive(Debug, Clone)]
struct Node {
    ply: Option<Ply>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// The mainline plies of a game plus the variations branching from it.
#[derive(Debug, Clone)]
pub struct MoveTree {
    nodes: Vec<Node>,
}

impl Default for MoveTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveTree {
    /// Id of the root node.
    pub const ROOT: NodeId = 0;

    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                ply: None,
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Mainline,
            }],
        }
    }

    /// Creates a tree whose mainline is `plies`.
    #[must_use]
    pub fn from_plies<I: IntoIterator<Item = Ply>>(plies: I) -> Self {
        let mut tree = Self::new();
        for ply in plies {
            tree.push_mainline(ply);
        }
        tree
    }

    /// Number of mainline plies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mainline_ids().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mainline_child(Self::ROOT).is_none()
    }

    /// Total number of nodes including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The mainline plies in order.
    #[must_use]
    pub fn mainline(&self) -> Vec<&Ply> {
        self.mainline_ids().filter_map(|id| self.ply_of(id)).collect()
    }

    /// The mainline ply at `index` (0-based).
    #[must_use]
    pub fn ply(&self, index: usize) -> Option<&Ply> {
        self.mainline_ids().nth(index).and_then(|id| self.ply_of(id))
    }

    /// The ply stored at a node (`None` for the root or unknown ids).
    #[must_use]
    pub fn ply_of(&self, id: NodeId) -> Option<&Ply> {
        self.nodes.get(id).and_then(|n| n.ply.as_ref())
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id).map(|n| n.kind)
    }

    /// The mainline node at `depth` (depth 0 is the root).
    #[must_use]
    pub fn mainline_node(&self, depth: usize) -> Option<NodeId> {
        if depth == 0 {
            return Some(Self::ROOT);
        }
        self.mainline_ids().nth(depth - 1)
    }

    /// Appends a ply to the end of the mainline.
    pub fn push_mainline(&mut self, ply: Ply) -> NodeId {
        let mut tail = Self::ROOT;
        while let Some(next) = self.mainline_child(tail) {
            tail = next;
        }
        let id = self.alloc(ply, tail, NodeKind::Mainline);
        // The mainline child stays first.
        self.nodes[tail].children.insert(0, id);
        id
    }

    /// Starts (or reuses) a variation replacing `mainline[index]`.
    ///
    /// An existing variation at `index` that starts with the same move is
    /// returned instead of adding a duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IndexOutOfRange`] if `index > len()`.
    pub fn add_variation(&mut self, index: usize, ply: Ply) -> Result<NodeId, GameError> {
        let len = self.len();
        let anchor = self
            .mainline_node(index)
            .ok_or(GameError::IndexOutOfRange { index, len })?;
        if let Some(existing) = self.variation_starts(index).into_iter().find(|&id| {
            self.ply_of(id).map(Ply::uci) == Some(ply.uci())
        }) {
            return Ok(existing);
        }
        let id = self.alloc(ply, anchor, NodeKind::Variation);
        self.nodes[anchor].children.push(id);
        Ok(id)
    }

    /// Continues the line ending at `node` with `ply`, reusing an identical
    /// continuation if one exists.
    pub fn extend_line(&mut self, node: NodeId, ply: Ply) -> NodeId {
        if let Some(&existing) = self
            .children(node)
            .iter()
            .find(|&&c| self.ply_of(c).map(Ply::uci) == Some(ply.uci()))
        {
            return existing;
        }
        let id = self.alloc(ply, node, NodeKind::Variation);
        self.nodes[node].children.push(id);
        id
    }

    /// First nodes of each variation branching at mainline `index`.
    #[must_use]
    pub fn variation_starts(&self, index: usize) -> Vec<NodeId> {
        self.mainline_node(index)
            .map(|anchor| {
                self.children(anchor)
                    .iter()
                    .copied()
                    .filter(|&c| self.nodes[c].kind == NodeKind::Variation)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The variation lines branching at mainline `index`, each followed along
    /// first children.
    #[must_use]
    pub fn variations_at(&self, index: usize) -> Vec<Vec<&Ply>> {
        self.variation_starts(index)
            .into_iter()
            .map(|start| {
                let mut line = Vec::new();
                let mut cur = Some(start);
                while let Some(id) = cur {
                    if let Some(ply) = self.ply_of(id) {
                        line.push(ply);
                    }
                    cur = self.children(id).first().copied();
                }
                line
            })
            .collect()
    }

    /// Mainline indices that have at least one variation.
    #[must_use]
    pub fn variation_indices(&self) -> Vec<usize> {
        (0..=self.len())
            .filter(|&i| !self.variation_starts(i).is_empty())
            .collect()
    }

    /// Mainline index at which the line containing `id` branches off, or
    /// `None` for mainline nodes.
    #[must_use]
    pub fn branch_index(&self, id: NodeId) -> Option<usize> {
        let mut cur = id;
        loop {
            let node = self.nodes.get(cur)?;
            if node.kind == NodeKind::Mainline {
                return if cur == id {
                    None
                } else {
                    Some(self.depth(cur))
                };
            }
            cur = node.parent?;
        }
    }

    /// Plies from the root to `id`, inclusive.
    #[must_use]
    pub fn node_path(&self, id: NodeId) -> Vec<&Ply> {
        let mut path = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            if let Some(ply) = self.ply_of(n) {
                path.push(ply);
            }
            cur = self.parent(n);
        }
        path.reverse();
        path
    }

    /// UCI tokens of `mainline[0..index]`.
    #[must_use]
    pub fn uci_history(&self, index: usize) -> Vec<String> {
        self.mainline()
            .into_iter()
            .take(index)
            .map(|p| p.uci().to_string())
            .collect()
    }

    /// SAN tokens of `mainline[0..index]`.
    #[must_use]
    pub fn san_history(&self, index: usize) -> Vec<String> {
        self.mainline()
            .into_iter()
            .take(index)
            .map(|p| p.san().to_string())
            .collect()
    }

    /// Shortens the mainline to `len` plies.
    ///
    /// Removes the mainline tail and every variation whose branch index is
    /// `>= len`, then compacts the arena.
    pub fn truncate(&mut self, len: usize) {
        let mut depth_of = vec![None; self.nodes.len()];
        depth_of[Self::ROOT] = Some(0);
        for (d, id) in self.mainline_ids().enumerate() {
            depth_of[id] = Some(d + 1);
        }

        // Parents always precede children in the arena, so one pass suffices.
        let mut keep = vec![false; self.nodes.len()];
        keep[Self::ROOT] = true;
        for id in 1..self.nodes.len() {
            let node = &self.nodes[id];
            let Some(parent) = node.parent else { continue };
            if !keep[parent] {
                continue;
            }
            keep[id] = match (node.kind, depth_of[parent]) {
                (NodeKind::Mainline, Some(d)) => d < len,
                (NodeKind::Variation, Some(d)) => d < len,
                (NodeKind::Variation, None) => true,
                (NodeKind::Mainline, None) => false,
            };
        }

        let mut remap = vec![None; self.nodes.len()];
        let mut next = 0;
        for (id, &k) in keep.iter().enumerate() {
            if k {
                remap[id] = Some(next);
                next += 1;
            }
        }

        let old = std::mem::take(&mut self.nodes);
        self.nodes = old
            .into_iter()
            .enumerate()
            .filter(|(id, _)| keep[*id])
            .map(|(_, mut node)| {
                node.parent = node.parent.and_then(|p| remap[p]);
                node.children = node.children.iter().filter_map(|&c| remap[c]).collect();
                node
            })
            .collect();
    }

    fn alloc(&mut self, ply: Ply, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            ply: Some(ply),
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        id
    }

    fn mainline_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .first()
            .copied()
            .filter(|&c| self.nodes[c].kind == NodeKind::Mainline)
    }

    fn mainline_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.mainline_child(Self::ROOT), move |&id| {
            self.mainline_child(id)
        })
    }

    fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            depth += 1;
            cur = p;
        }
        depth
    }
}
