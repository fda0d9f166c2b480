pub mod board;
pub mod model;
pub mod snapshot;
pub mod store;
pub mod viewport;

pub use board::{BOARD_DEFAULT_HEIGHT, BOARD_DEFAULT_WIDTH, Board};
pub use model::*;
pub use snapshot::Snapshot;
pub use store::{BoardEntry, BoardId, BoardStore, MAX_BOARDS, MemoryStorage, Prefs, StorageBackend};
pub use viewport::Viewport;

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
