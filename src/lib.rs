//! # GSTI - Generalized Suffix Tree Index
//!
//! An in-memory substring index over many short keys. Every key is inserted
//! with a numeric id; a query for any substring returns the ids of all keys
//! containing it.
//!
//! ## Architecture
//!
//! - [`index`] - Tree construction, queries and the binary format
//! - [`output`] - Colored rendering of query results
//! - [`utils`] - Byte encoding, key normalization, progress bars
//! - [`error`] - The library error type
//!
//! ## Quick Start
//!
//! ```
//! use gsti::index::GeneralizedSuffixTree;
//!
//! let mut tree = GeneralizedSuffixTree::new();
//! tree.insert("banana", 0).unwrap();
//! tree.insert("bano", 1).unwrap();
//!
//! let ids: Vec<u32> = tree.search("ban").unwrap().iter().collect();
//! assert_eq!(ids, vec![0, 1]);
//! assert_eq!(tree.match_prefix("bandana"), "ban");
//!
//! // Seal for concurrent readers and persistence
//! let index = tree.freeze();
//! assert!(index.search("nan").unwrap().contains(0));
//! ```

pub mod error;
pub mod index;
pub mod output;
pub mod utils;

pub use error::{Error, Result};
