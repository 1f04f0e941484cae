//! Builds the training corpus: windowed co-occurrences from truncated random walks become
//! node-context pairs, and the graph's content lists become node-attribute pairs.
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use tracing::info;

use crate::algos::pair_table::{CapacityPolicy,PairRecord,PairTable};
use crate::error::{BinneError,Result};
use crate::graph::{AttributedGraph,Graph,NodeID};
use crate::progress::CLProgressBar;
use crate::sampler::UniformSample;

/// Index slots reserved for the full key space under `CapacityPolicy::Abort` are capped here.
/// Key spaces above it need an explicit capacity or the Grow policy.
pub const MAX_ABORT_CAPACITY: usize = 1 << 30;

/// Aggregated pairs and entity frequencies; everything the samplers are built from.
#[derive(Debug)]
pub struct Corpus {
    pub contexts: Vec<PairRecord>,
    pub attributes: Vec<PairRecord>,

    /// Visits per node across all walks, start nodes included
    pub node_freq: Vec<u64>,

    /// Sum of input weights per attribute
    pub attribute_freq: Vec<u64>
}

#[derive(Debug, Clone)]
pub struct RandomWalkCorpus {
    /// Walks started from every node
    pub walk_num: usize,

    /// Maximum number of nodes in a walk, start included
    pub walk_length: usize,

    /// Co-occurrence radius inside a walk
    pub window_size: usize,

    /// Initial index capacity of both pair tables.  When None, Grow starts from a size derived
    /// from the graph and Abort reserves the whole key space, up to `MAX_ABORT_CAPACITY`.
    pub capacity: Option<usize>,

    pub policy: CapacityPolicy,

    pub seed: u64,

    pub verbose: bool
}

impl Default for RandomWalkCorpus {
    fn default() -> Self {
        RandomWalkCorpus {
            walk_num: 40,
            walk_length: 100,
            window_size: 10,
            capacity: None,
            policy: CapacityPolicy::Grow,
            seed: 20222022,
            verbose: false
        }
    }
}

impl RandomWalkCorpus {

    pub fn validate(&self) -> Result<()> {
        if self.walk_length == 0 {
            return Err(BinneError::InvalidConfig("walk_length must be at least 1".into()))
        }
        Ok(())
    }

    /// Capacity for a table that can hold at most `max_pairs` distinct keys, with `hint` as the
    /// starting point when the table is allowed to grow.
    fn capacity_for(&self, max_pairs: usize, hint: usize) -> usize {
        match (self.capacity, self.policy) {
            (Some(capacity), _) => capacity,
            (None, CapacityPolicy::Grow) => hint.max(1024),
            (None, CapacityPolicy::Abort) => max_pairs.min(MAX_ABORT_CAPACITY).max(1)
        }
    }

    pub fn build(&self, graph: &AttributedGraph) -> Result<Corpus> {
        self.validate()?;
        let attributes = self.register_attributes(graph)?;
        let (contexts, node_freq) = self.register_walks(graph)?;

        info!(
            contexts = contexts.len(),
            attributes = attributes.len(),
            "Corpus built"
        );

        Ok(Corpus {
            contexts,
            attributes,
            node_freq,
            attribute_freq: graph.attribute_freq().to_vec()
        })
    }

    /// Each content entry contributes its input weight to the (node, attribute) record.
    pub fn register_attributes(&self, graph: &AttributedGraph) -> Result<Vec<PairRecord>> {
        // Every content entry adds at most one distinct key
        let max_pairs = graph.contents().min(graph.len().saturating_mul(graph.attribute_num()));
        let capacity = self.capacity_for(max_pairs, graph.contents() * 2);
        let mut table = PairTable::new("node attribute", graph.attribute_num(), capacity, self.policy);
        for node in 0..graph.len() {
            let (attrs, weights) = graph.get_contents(node);
            for (attr, w) in attrs.iter().zip(weights.iter()) {
                table.insert_or_increment(node, *attr, *w)?;
            }
        }
        Ok(table.into_records())
    }

    /// Runs `walk_num` passes of one walk per node, in node id order, registering both
    /// directions of every windowed co-occurrence.
    pub fn register_walks(&self, graph: &AttributedGraph) -> Result<(Vec<PairRecord>, Vec<u64>)> {
        let n = graph.len();
        let capacity = self.capacity_for(
            n.saturating_mul(n),
            n * self.window_size.min(self.walk_length) * 8);
        let mut table = PairTable::new("node context", n, capacity, self.policy);
        let mut node_freq = vec![0u64; n];
        let mut rng = XorShiftRng::seed_from_u64(self.seed);
        let mut walk = Vec::with_capacity(self.walk_length);

        let pb = CLProgressBar::new((self.walk_num * n) as u64, self.verbose);
        pb.update_message(|| "Random walks".into());
        for _ in 0..self.walk_num {
            for start in 0..n {
                self.walk(graph, start, &mut rng, &mut walk);
                walk.iter().for_each(|node| node_freq[*node] += 1);
                for k in 1..walk.len() {
                    self.register_window(&walk, k, &mut table)?;
                }
                pb.inc(1);
            }
        }
        pb.finish();

        Ok((table.into_records(), node_freq))
    }

    fn register_window(&self, walk: &[NodeID], k: usize, table: &mut PairTable) -> Result<()> {
        for r in 1..=self.window_size.min(k) {
            table.increment(walk[k - r], walk[k])?;
            table.increment(walk[k], walk[k - r])?;
        }
        Ok(())
    }

    /// Writes a truncated walk into `output`: the start node, then uniformly chosen neighbors
    /// until `walk_length` nodes or a node without neighbors is reached.
    pub fn walk<R: Rng>(
        &self,
        graph: &AttributedGraph,
        start_node: NodeID,
        rng: &mut R,
        output: &mut Vec<NodeID>
    ) {
        output.clear();
        output.push(start_node);
        let mut cur_node = start_node;
        while output.len() < self.walk_length {
            match UniformSample::sample(graph, cur_node, rng) {
                Some(next) => {
                    cur_node = next;
                    output.push(cur_node);
                },
                None => break
            }
        }
    }
}
