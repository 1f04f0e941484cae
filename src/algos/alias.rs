//! Walker's alias method: O(n) construction, O(1) sampling from a fixed discrete distribution.
use rand::prelude::*;

#[derive(Debug, Clone)]
pub struct AliasTable {
    prob: Vec<f64>,
    alias: Vec<usize>
}

impl AliasTable {

    /// Builds the table for `weights`.  Returns None when there is nothing to sample, either
    /// because `weights` is empty or because it carries no mass.
    pub fn new(weights: &[f64]) -> Option<Self> {
        let n = weights.len();
        let sum: f64 = weights.iter().sum();
        if n == 0 || !(sum > 0.) {
            return None
        }

        let mut norm_prob: Vec<f64> = weights.iter().map(|w| w * n as f64 / sum).collect();
        let mut prob = vec![0f64; n];
        let mut alias: Vec<usize> = (0..n).collect();

        let mut small = Vec::with_capacity(n);
        let mut large = Vec::with_capacity(n);
        for k in (0..n).rev() {
            if norm_prob[k] < 1. {
                small.push(k);
            } else {
                large.push(k);
            }
        }

        while let (Some(&s), Some(&l)) = (small.last(), large.last()) {
            small.pop();
            large.pop();
            prob[s] = norm_prob[s];
            alias[s] = l;

            // The large block pays for the rest of the small block's column
            norm_prob[l] = norm_prob[l] + norm_prob[s] - 1.;
            if norm_prob[l] < 1. {
                small.push(l);
            } else {
                large.push(l);
            }
        }

        // Whatever is left is full up to rounding error
        large.into_iter().chain(small.into_iter()).for_each(|k| prob[k] = 1.);

        Some(AliasTable { prob, alias })
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.prob.len()
    }

    /// Draws with two uniforms in [0, 1): one picks the column, the other accepts it or takes
    /// its alias.
    #[inline]
    pub fn sample_with(&self, u1: f64, u2: f64) -> usize {
        let k = ((self.prob.len() as f64 * u1) as usize).min(self.prob.len() - 1);
        if u2 < self.prob[k] { k } else { self.alias[k] }
    }

    #[inline]
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let u1: f64 = rng.gen();
        let u2: f64 = rng.gen();
        self.sample_with(u1, u2)
    }
}
