pub mod collection_ops;
pub mod search;
pub mod stats;
