use rand::prelude::*;
use rand_distr::{Distribution,Uniform};

use crate::graph::{Graph,NodeID};

/// Picks the next hop of a walk uniformly among the current node's neighbors.
pub struct UniformSample;

impl UniformSample {
    pub fn sample<G: Graph, R:Rng>(g: &G, node: NodeID, rng: &mut R) -> Option<NodeID> {
        let degree = g.degree(node);
        if degree == 0 {
            return None
        }

        let dist = Uniform::new(0, degree);
        let idx = rng.sample(dist);
        Some(g.get_edges(node)[idx])
    }
}
