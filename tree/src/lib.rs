//! arbor Tree - construction, persistence and rendering of decision trees
//!
//! Trees are built in two phases: a complete list of node specifications is
//! collected (programmatically, from JSON, or from the line-oriented text
//! format) and the whole tree is then linked and validated once by
//! `arbor-engine`.

pub mod builder;
pub mod error;
pub mod persist;
pub mod render;

pub use builder::{KindSpec, NodeSpec, TreeBuilder, TreeSpec};
pub use error::PersistError;
pub use persist::{load, read_tree, save, write_tree};
