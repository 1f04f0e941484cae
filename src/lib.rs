//! Binary embeddings for attributed, possibly incomplete graphs.  Random walks and node
//! contents are aggregated into weighted pair corpora, which train a tanh-bounded embedding by
//! negative sampling; the signs of the trained embedding are the codes.

pub mod graph;
pub mod algos;
pub mod error;
pub mod io;
pub mod embeddings;
mod sampler;
mod bitset;
mod progress;

pub use crate::algos::binne::{BinaryEmbedding,TrainedModel};
pub use crate::algos::corpus::{Corpus,RandomWalkCorpus};
pub use crate::algos::pair_table::CapacityPolicy;
pub use crate::error::{BinneError,Result};
pub use crate::graph::{AttributedGraph,Graph,NodeID};

/// Builds the corpus from `graph` and trains on it.  The pair tables only live for the corpus
/// phase; training works off the compacted records.
pub fn embed(
    graph: &AttributedGraph,
    walks: &RandomWalkCorpus,
    trainer: &BinaryEmbedding
) -> Result<TrainedModel> {
    walks.validate()?;
    trainer.validate()?;
    let corpus = walks.build(graph)?;
    trainer.learn(corpus)
}
