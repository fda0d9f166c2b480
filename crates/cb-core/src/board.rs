//! The in-memory board: an undirected graph of items tied by strings.
//!
//! Items are node weights, connections are edge weights. `petgraph`'s
//! stable graph keeps indices valid across removals, and removing a node
//! drops its incident edges, which is exactly the cascade the board
//! needs when an item is deleted. An `id → index` map gives O(1) lookup
//! by the persistent `ItemId`; it is rebuilt whenever a board is
//! reconstructed from a snapshot.

use crate::model::{Anchor, Connection, Item, ItemId};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableUnGraph;
use std::collections::HashMap;

/// Default board extent, board units.
pub const BOARD_DEFAULT_WIDTH: f64 = 2000.0;
pub const BOARD_DEFAULT_HEIGHT: f64 = 1500.0;

/// Allowed range for a user-set board extent, per axis. Requests outside
/// this range are rejected, not clamped.
pub const BOARD_MIN_SIZE: f64 = 1000.0;
pub const BOARD_MAX_SIZE: f64 = 5000.0;

/// One open corkboard.
#[derive(Debug, Clone)]
pub struct Board {
    graph: StableUnGraph<Item, Connection>,
    id_index: HashMap<ItemId, NodeIndex>,
    /// Next value handed out by `alloc_id`. Monotonic, never reused.
    pub next_item_id: u32,
    pub width: f64,
    pub height: f64,
}

impl Board {
    pub fn new() -> Self {
        Self {
            graph: StableUnGraph::default(),
            id_index: HashMap::new(),
            next_item_id: 0,
            width: BOARD_DEFAULT_WIDTH,
            height: BOARD_DEFAULT_HEIGHT,
        }
    }

    // ─── Items ───────────────────────────────────────────────────────────

    /// Hand out the next item id and advance the counter.
    pub fn alloc_id(&mut self) -> ItemId {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        id
    }

    /// Insert an item, keeping the `id_index` synchronized.
    pub fn add_item(&mut self, item: Item) -> ItemId {
        let id = item.id;
        let idx = self.graph.add_node(item);
        self.id_index.insert(id, idx);
        id
    }

    /// Remove an item. Every string touching it goes with it (incident
    /// edges are dropped by the graph).
    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let idx = self.id_index.remove(&id)?;
        self.graph.remove_node(idx)
    }

    pub fn get_by_id(&self, id: ItemId) -> Option<&Item> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn get_by_id_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    pub fn index_of(&self, id: ItemId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// All items sorted by id. Ids are monotonic, so this is creation
    /// order, which is also draw order (later items on top).
    pub fn items(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.graph.node_weights().collect();
        items.sort_by_key(|item| item.id);
        items
    }

    pub fn item_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Move an item's top-left corner, clamped so the whole item stays on
    /// the board.
    pub fn move_item(&mut self, id: ItemId, x: f64, y: f64) -> bool {
        let (bw, bh) = (self.width, self.height);
        let Some(item) = self.get_by_id_mut(id) else {
            return false;
        };
        item.x = x.clamp(0.0, (bw - item.width).max(0.0));
        item.y = y.clamp(0.0, (bh - item.height).max(0.0));
        true
    }

    /// Resize an item through its kind's clamping rules.
    pub fn resize_item(&mut self, id: ItemId, width: f64, height: f64) -> bool {
        let Some(item) = self.get_by_id_mut(id) else {
            return false;
        };
        item.apply_resize(width, height);
        true
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Tie two items together. Self-loops and duplicates of an existing
    /// pair (in either direction) are silently refused; so are ids that no
    /// longer resolve. Returns whether a string was added.
    pub fn connect(
        &mut self,
        from: ItemId,
        to: ItemId,
        from_anchor: Anchor,
        to_anchor: Anchor,
    ) -> bool {
        if from == to {
            return false;
        }
        let (Some(a), Some(b)) = (self.index_of(from), self.index_of(to)) else {
            return false;
        };
        // Undirected graph: find_edge covers both orientations.
        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(
            a,
            b,
            Connection {
                from,
                to,
                from_anchor,
                to_anchor,
            },
        );
        true
    }

    pub fn is_connected(&self, a: ItemId, b: ItemId) -> bool {
        if let Some(ai) = self.index_of(a)
            && let Some(bi) = self.index_of(b)
        {
            return self.graph.find_edge(ai, bi).is_some();
        }
        false
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.graph.edge_weights()
    }

    pub fn connection_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Cut every string; items stay pinned.
    pub fn clear_connections(&mut self) {
        self.graph.clear_edges();
    }

    /// Remove everything. The id counter keeps running; ids are never
    /// reused within a board's lifetime.
    pub fn clear_items(&mut self) {
        self.graph.clear();
        self.id_index.clear();
    }

    // ─── Extent ──────────────────────────────────────────────────────────

    /// Resize the board surface. Rejects out-of-range requests and reports
    /// the rejection to the caller (the shell notifies the user).
    pub fn set_extent(&mut self, width: f64, height: f64) -> bool {
        let valid = (BOARD_MIN_SIZE..=BOARD_MAX_SIZE).contains(&width)
            && (BOARD_MIN_SIZE..=BOARD_MAX_SIZE).contains(&height);
        if !valid {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
