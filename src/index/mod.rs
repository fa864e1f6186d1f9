//! The generalized suffix tree and its persistent form.
//!
//! [`GeneralizedSuffixTree`] is the build phase; [`freeze`](GeneralizedSuffixTree::freeze)
//! turns it into a [`SuffixIndex`] for the query phase.

pub mod arena;
pub mod build;
pub mod builder;
pub mod edge_map;
pub mod propagate;
pub mod query;
pub mod reader;
pub mod stats;
pub mod types;
pub mod writer;

pub use builder::GeneralizedSuffixTree;
pub use reader::SuffixIndex;
pub use types::*;
pub use writer::TreeWriter;
