//! Error types shared by the loader, the corpus builder and the trainer.
use thiserror::Error;

use crate::graph::NodeID;

#[derive(Error, Debug)]
pub enum BinneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed graph file.
    #[error("{line}: Malformed graph file: {message}")]
    Parse { line: usize, message: String },

    #[error("{line}: node id {node} is outside [0, {node_num})")]
    NodeOutOfRange { line: usize, node: u64, node_num: usize },

    #[error("{line}: attribute id {attribute} is outside [0, {attribute_num})")]
    AttributeOutOfRange { line: usize, attribute: u64, attribute_num: usize },

    #[error("{line}: found duplicate record for node {node}")]
    DuplicateNode { line: usize, node: NodeID },

    #[error("graph file ended after {found} of {expected} node records")]
    MissingNodes { found: usize, expected: usize },

    /// Open addressing probed every slot without finding the key or a free slot.
    #[error("The {table} hash table is full! (capacity {capacity})")]
    CapacityExhausted { table: &'static str, capacity: usize },

    #[error("Nothing to train on: no node context pairs and no node attribute pairs")]
    EmptyCorpus,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, BinneError>;
