mod search;
mod state;

pub use search::{PathResult, resolve, shortest_path};
