//! Search tree nodes in an index arena
//!
//! Nodes refer to each other by [`NodeId`]. Freed slots are recycled, so an
//! id is only meaningful while its node is reachable from the tree.

use std::collections::VecDeque;

use crate::board::{Pos, Stone};

/// Index of a node in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Coordinate value marking "no move" (the root of a fresh game).
const NO_MOVE: u32 = 0xFF;

/// One ply of the search tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// `x | y << 8 | color << 16`
    data: u32,
    /// Tree visits (one per update through this node)
    pub playouts: u32,
    /// Simulated games behind those visits
    pub real_playouts: u32,
    /// Sum of outcomes from this node's color's point of view
    pub score: f32,
    /// The move of this node ends the game
    pub terminal: bool,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl Node {
    pub fn new(mv: Option<Pos>, color: Stone, parent: Option<NodeId>) -> Self {
        Self {
            data: Self::pack(mv, color),
            playouts: 0,
            real_playouts: 0,
            score: 0.0,
            terminal: false,
            children: Vec::new(),
            parent,
        }
    }

    fn pack(mv: Option<Pos>, color: Stone) -> u32 {
        let (x, y) = mv.map_or((NO_MOVE, NO_MOVE), |p| (p.x as u32, p.y as u32));
        let color = match color {
            Stone::Empty => 0,
            Stone::Black => 1,
            Stone::White => 2,
        };
        x | y << 8 | color << 16
    }

    #[inline]
    pub fn user_data(&self) -> u32 {
        self.data
    }

    /// Move played to reach this node.
    #[inline]
    pub fn pos(&self) -> Option<Pos> {
        let x = self.data & 0xFF;
        let y = (self.data >> 8) & 0xFF;
        (x != NO_MOVE).then(|| Pos::new(x as u8, y as u8))
    }

    /// Color that played this node's move.
    #[inline]
    pub fn color(&self) -> Stone {
        match (self.data >> 16) & 0x3 {
            1 => Stone::Black,
            2 => Stone::White,
            _ => Stone::Empty,
        }
    }

    /// Mean outcome per visit, 0 when unvisited.
    #[inline]
    pub fn average(&self) -> f32 {
        if self.playouts > 0 {
            self.score / self.playouts as f32
        } else {
            0.0
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Node storage with slot reuse.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId((self.nodes.len() - 1) as u32)
            }
        }
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Nodes currently allocated.
    #[inline]
    pub fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Free `root` and everything below it now. Returns the count freed.
    pub fn free_subtree(&mut self, root: NodeId) -> usize {
        let mut stack = vec![root];
        let mut freed = 0;
        while let Some(id) = stack.pop() {
            stack.extend(self.release(id));
            freed += 1;
        }
        freed
    }

    /// Free at most `budget` nodes from the front of `queue`. Children of
    /// freed nodes join the back of the queue, so large subtrees are
    /// dismantled across several calls.
    pub fn free_queued(&mut self, queue: &mut VecDeque<NodeId>, budget: usize) -> usize {
        let mut freed = 0;
        while freed < budget {
            let Some(id) = queue.pop_front() else {
                break;
            };
            queue.extend(self.release(id));
            freed += 1;
        }
        freed
    }

    fn release(&mut self, id: NodeId) -> Vec<NodeId> {
        let node = &mut self.nodes[id.index()];
        let children = std::mem::take(&mut node.children);
        node.parent = None;
        self.free.push(id);
        children
    }
}
