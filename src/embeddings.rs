use crate::algos::fast_math::FastMath;
use crate::algos::unigram::Lcg;
use crate::graph::NodeID;

/// Dense row-major matrix, one row per node (or attribute).
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    nodes: usize,
    dims: usize,
    embeddings: Vec<f32>
}

impl EmbeddingStore {
    pub fn new(nodes: usize, dims: usize) -> Self {
        EmbeddingStore {
            nodes,
            dims,
            embeddings: vec![0.; nodes * dims]
        }
    }

    /// Fills every weight with `((r & 0xFFFF) / 65536 - 0.5) / dims`, drawing r from `lcg`.
    pub fn randomize(&mut self, lcg: &mut Lcg) {
        let dims = self.dims as f64;
        self.embeddings.iter_mut().for_each(|wi| {
            let r = (lcg.next() & 0xFFFF) as f64 / 65536.;
            *wi = ((r - 0.5) / dims) as f32;
        });
    }

    pub fn len(&self) -> usize {
        self.nodes
    }

    pub fn get_embedding(&self, node_id: NodeID) -> &[f32] {
        let start = node_id * self.dims;
        &self.embeddings[start..start+self.dims]
    }

    pub fn get_embedding_mut(&mut self, node_id: NodeID) -> &mut [f32] {
        let start = node_id * self.dims;
        &mut self.embeddings[start..start+self.dims]
    }

    #[cfg(test)]
    fn set_embedding(&mut self, node_id: NodeID, embedding: &[f32]) {
        self.get_embedding_mut(node_id).copy_from_slice(embedding);
    }

    /// Thresholds tanh(w * beta) at zero: 1 when the transform is >= 0, else 0.
    pub fn binary_code(&self, node_id: NodeID, beta: f32, fm: &FastMath) -> Vec<bool> {
        self.get_embedding(node_id).iter()
            .map(|wi| fm.tanh(*wi * beta) >= 0.)
            .collect()
    }
}
