//! Binarized attributed network embedding.  Each sample picks the structural objective
//! (node predicts walk context) or the attribute objective (node predicts its content) with
//! equal odds and applies one negative sampling update through a tanh-bounded embedding.
//! Binary codes are the signs of the transformed embedding.
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use tracing::{debug,info,warn};

use crate::algos::alias::AliasTable;
use crate::algos::corpus::Corpus;
use crate::algos::fast_math::FastMath;
use crate::algos::pair_table::PairRecord;
use crate::algos::unigram::{Lcg,UnigramTable};
use crate::embeddings::EmbeddingStore;
use crate::error::{BinneError,Result};
use crate::graph::NodeID;
use crate::progress::CLProgressBar;

const CHECKPOINT: u64 = 10_000;
const MIN_ALPHA_RATIO: f32 = 1e-4;

pub struct BinaryEmbedding {
    /// Embedding dimensions, and so bits per code
    pub dims: usize,

    /// Negative draws per positive pair
    pub negative: usize,

    /// Starting learning rate
    pub alpha: f32,

    /// Total number of sampled pairs to train on
    pub total_samples: u64,

    /// Scale inside tanh(w * beta) at the start of training
    pub starting_beta: f32,

    /// Factor beta has grown by once 95% of the checkpoints have passed
    pub beta_growth: f64,

    pub max_beta: f32,

    /// Slots in each negative sampling table
    pub table_size: usize,

    pub seed: u64,

    pub verbose: bool
}

impl Default for BinaryEmbedding {
    fn default() -> Self {
        BinaryEmbedding {
            dims: 256,
            negative: 5,
            alpha: 0.025,
            total_samples: 100_000_000,
            starting_beta: 0.001,
            beta_growth: 100.,
            max_beta: 0.1,
            table_size: 100_000_000,
            seed: 20222022,
            verbose: false
        }
    }
}

/// One prediction task: pairs drawn by the alias table, negatives by the unigram table.
pub struct Objective {
    pairs: Vec<PairRecord>,
    alias: AliasTable,
    unigram: UnigramTable
}

impl Objective {
    /// None when there is nothing to sample.
    pub fn new(pairs: Vec<PairRecord>, freqs: &[u64], table_size: usize) -> Option<Self> {
        let weights: Vec<f64> = pairs.iter().map(|p| p.count as f64).collect();
        let alias = AliasTable::new(&weights)?;
        let unigram = UnigramTable::new(freqs, table_size)?;
        Some(Objective { pairs, alias, unigram })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    fn sample<R: Rng>(&self, rng: &mut R) -> &PairRecord {
        &self.pairs[self.alias.sample(rng)]
    }
}

/// Scratch space and random streams for the update loop.
struct Sgd {
    fm: FastMath,
    rng: XorShiftRng,
    lcg: Lcg,
    negative: usize,
    h: Vec<f32>,
    neu1e: Vec<f32>,
    loss: f64,
    predictions: u64
}

impl Sgd {
    fn new(dims: usize, negative: usize, seed: u64) -> Self {
        Sgd {
            fm: FastMath::new(),
            rng: XorShiftRng::seed_from_u64(seed),
            lcg: Lcg::new(1),
            negative,
            h: vec![0.; dims],
            neu1e: vec![0.; dims],
            loss: 0.,
            predictions: 0
        }
    }

    /// Samples one (node, target) pair from `objective` and pushes the node's embedding and
    /// the output rows of the target and its negatives toward the logistic labels.  Negatives
    /// equal to the true target are skipped, not redrawn.
    fn update(
        &mut self,
        objective: &Objective,
        embeddings: &mut EmbeddingStore,
        output: &mut EmbeddingStore,
        alpha: f32,
        beta: f32
    ) {
        let Sgd { fm, rng, lcg, negative, h, neu1e, loss, predictions } = self;
        let pair = objective.sample(rng);
        let row = embeddings.get_embedding_mut(pair.source);

        h.iter_mut().zip(row.iter()).for_each(|(hi, wi)| *hi = fm.tanh(*wi * beta));
        neu1e.iter_mut().for_each(|e| *e = 0.);

        for d in 0..=*negative {
            let (target, label) = if d == 0 {
                (pair.target, 1f32)
            } else {
                let target = objective.unigram.sample(lcg);
                if target == pair.target { continue }
                (target, 0f32)
            };

            let out = output.get_embedding_mut(target);
            let dot: f32 = h.iter().zip(out.iter()).map(|(hi, oi)| hi * oi).sum();
            let f = fm.sigmoid(dot);
            let g = (label - f) * alpha;

            neu1e.iter_mut().zip(out.iter()).for_each(|(e, oi)| *e += g * oi);
            out.iter_mut().zip(h.iter()).for_each(|(oi, hi)| *oi += g * hi);

            let p = if label > 0. { f } else { 1. - f };
            *loss -= (p.max(1e-7) as f64).ln();
            *predictions += 1;
        }

        // Chain rule through tanh(w * beta)
        row.iter_mut().zip(neu1e.iter().zip(h.iter())).for_each(|(wi, (e, hi))| {
            *wi += e * (1. - hi * hi) * beta;
        });
    }

    fn take_loss(&mut self) -> f64 {
        let avg = if self.predictions > 0 { self.loss / self.predictions as f64 } else { 0. };
        self.loss = 0.;
        self.predictions = 0;
        avg
    }
}

/// The learned matrices plus the final beta, needed to binarize.
pub struct TrainedModel {
    pub embeddings: EmbeddingStore,
    pub context_weights: EmbeddingStore,
    pub content_weights: EmbeddingStore,
    pub beta: f32,
    fm: FastMath
}

impl TrainedModel {
    pub fn binary_code(&self, node: NodeID) -> Vec<bool> {
        self.embeddings.binary_code(node, self.beta, &self.fm)
    }

    pub fn binary_codes(&self) -> Vec<Vec<bool>> {
        (0..self.embeddings.len()).map(|node| self.binary_code(node)).collect()
    }
}

impl BinaryEmbedding {

    pub fn validate(&self) -> Result<()> {
        if self.dims == 0 {
            return Err(BinneError::InvalidConfig("dims must be at least 1".into()))
        }
        if !(self.alpha > 0.) {
            return Err(BinneError::InvalidConfig(format!("alpha must be positive, got {}", self.alpha)))
        }
        if self.table_size == 0 {
            return Err(BinneError::InvalidConfig("table_size must be at least 1".into()))
        }
        if !(self.beta_growth > 0.) || !(self.starting_beta > 0.) {
            return Err(BinneError::InvalidConfig("beta schedule must be positive".into()))
        }
        Ok(())
    }

    /// Per-checkpoint multiplier so that beta grows by `beta_growth` over 95% of the
    /// checkpoints.  1 when the budget never reaches a checkpoint.
    pub fn beta_step(&self) -> f64 {
        let checkpoints = self.total_samples / (CHECKPOINT + 1);
        if checkpoints == 0 {
            1.
        } else {
            (self.beta_growth.ln() / (checkpoints as f64 * 0.95)).exp()
        }
    }

    fn progress(&self, count: u64) -> f64 {
        count as f64 / (self.total_samples + 1) as f64
    }

    /// Learning rate after `count` samples: linear decay, floored at 1e-4 of the start.
    pub fn decayed_alpha(&self, count: u64) -> f32 {
        (self.alpha * (1. - self.progress(count)) as f32).max(self.alpha * MIN_ALPHA_RATIO)
    }

    /// Trains on the corpus, consuming its pair records.
    pub fn learn(&self, corpus: Corpus) -> Result<TrainedModel> {
        self.validate()?;
        let Corpus { contexts, attributes, node_freq, attribute_freq } = corpus;
        let (node_num, attribute_num) = (node_freq.len(), attribute_freq.len());

        let structure = Objective::new(contexts, &node_freq, self.table_size);
        let content = Objective::new(attributes, &attribute_freq, self.table_size);
        match (&structure, &content) {
            (None, None) => return Err(BinneError::EmptyCorpus),
            (None, Some(_)) => warn!("No node context pairs; training on attributes only"),
            (Some(_), None) => warn!("No node attribute pairs; training on structure only"),
            _ => ()
        }

        info!(
            samples = self.total_samples,
            dims = self.dims,
            alpha = self.alpha,
            context_pairs = structure.as_ref().map(|o| o.len()).unwrap_or(0),
            attribute_pairs = content.as_ref().map(|o| o.len()).unwrap_or(0),
            "Training"
        );

        let mut embeddings = EmbeddingStore::new(node_num, self.dims);
        embeddings.randomize(&mut Lcg::new(1));
        let mut context_weights = EmbeddingStore::new(node_num, self.dims);
        let mut content_weights = EmbeddingStore::new(attribute_num, self.dims);

        let mut sgd = Sgd::new(self.dims, self.negative, self.seed);

        let beta_step = self.beta_step();
        let mut alpha = self.alpha;
        let mut beta = self.starting_beta;
        let mut count = 0u64;
        let mut last_count = 0u64;

        let pb = CLProgressBar::new(self.total_samples, self.verbose);
        while count < self.total_samples {
            if count - last_count > CHECKPOINT {
                last_count = count;
                let progress = self.progress(count);
                let loss = sgd.take_loss();
                pb.update_message(|| format!("Alpha: {:.6}, Beta: {:.6}, Loss: {:.4}", alpha, beta, loss));
                pb.set_position(count);
                debug!(alpha, beta, loss, progress, "Checkpoint");

                alpha = self.decayed_alpha(count);
                beta = ((beta as f64 * beta_step) as f32).min(self.max_beta);
            }

            let coin: f64 = sgd.rng.gen();
            let (objective, output) = match (&structure, &content) {
                (Some(s), Some(c)) => if coin <= 0.5 {
                    (s, &mut context_weights)
                } else {
                    (c, &mut content_weights)
                },
                (Some(s), None) => (s, &mut context_weights),
                (None, Some(c)) => (c, &mut content_weights),
                (None, None) => unreachable!("checked above")
            };
            sgd.update(objective, &mut embeddings, output, alpha, beta);
            count += 1;
        }
        pb.set_position(count);
        pb.finish();

        info!(beta, loss = sgd.take_loss(), "Training finished");

        Ok(TrainedModel {
            embeddings,
            context_weights,
            content_weights,
            beta,
            fm: sgd.fm
        })
    }
}

#[cfg(test)]
mod binne_tests {
    use super::*;

    fn record(source: usize, target: usize, count: u64) -> PairRecord {
        PairRecord { source, target, count }
    }

    fn small_corpus() -> Corpus {
        Corpus {
            contexts: vec![record(0, 1, 4), record(1, 0, 4), record(1, 2, 2), record(2, 1, 2)],
            attributes: vec![record(0, 0, 1), record(1, 1, 1), record(2, 0, 1)],
            node_freq: vec![3, 5, 3],
            attribute_freq: vec![2, 1]
        }
    }

    fn trainer(samples: u64) -> BinaryEmbedding {
        BinaryEmbedding {
            dims: 8,
            total_samples: samples,
            table_size: 1000,
            seed: 1234,
            ..Default::default()
        }
    }

    #[test]
    fn test_beta_step() {
        let be = trainer(1000);
        assert_eq!(be.beta_step(), 1.);

        let be = trainer(100_000_000);
        let checkpoints = (100_000_000 / 10_001) as f64;
        let grown = be.beta_step().powf(checkpoints * 0.95);
        assert!((grown - 100.).abs() < 1e-6);
    }

    #[test]
    fn test_reproducible() {
        let a = trainer(5000).learn(small_corpus()).unwrap();
        let b = trainer(5000).learn(small_corpus()).unwrap();
        for node in 0..3 {
            assert_eq!(a.embeddings.get_embedding(node), b.embeddings.get_embedding(node));
        }
        assert_eq!(a.binary_codes(), b.binary_codes());
        assert_eq!(a.binary_codes().len(), 3);
        assert!(a.binary_codes().iter().all(|c| c.len() == 8));
    }

    #[test]
    fn test_updates_both_outputs() {
        let model = trainer(2000).learn(small_corpus()).unwrap();
        let touched = |es: &EmbeddingStore| (0..es.len())
            .any(|i| es.get_embedding(i).iter().any(|w| *w != 0.));
        assert!(touched(&model.context_weights));
        assert!(touched(&model.content_weights));
        assert_eq!(model.beta, 0.001);
    }

    #[test]
    fn test_beta_schedule_runs() {
        let model = trainer(50_000).learn(small_corpus()).unwrap();
        // Four checkpoints pass, each multiplying beta by the step
        let expected = 0.001 * trainer(50_000).beta_step().powi(4);
        assert!((model.beta as f64 - expected.min(0.1)).abs() < 1e-6);
        assert!(model.beta > 0.001);
    }

    #[test]
    fn test_single_objective() {
        let mut corpus = small_corpus();
        corpus.attributes.clear();
        let model = trainer(500).learn(corpus).unwrap();
        assert!((0..2).all(|i| model.content_weights.get_embedding(i).iter().all(|w| *w == 0.)));

        let mut corpus = small_corpus();
        corpus.contexts.clear();
        corpus.attributes.clear();
        assert!(matches!(trainer(500).learn(corpus), Err(BinneError::EmptyCorpus)));
    }

    #[test]
    fn test_skips_colliding_negatives() {
        // One attribute, so every negative draw is the true target
        let objective = Objective::new(vec![record(0, 0, 1)], &[1], 100).unwrap();
        let mut embeddings = EmbeddingStore::new(1, 4);
        embeddings.randomize(&mut Lcg::new(1));
        let mut output = EmbeddingStore::new(1, 4);
        let mut sgd = Sgd::new(4, 5, 99);

        for step in 1..=3 {
            sgd.update(&objective, &mut embeddings, &mut output, 0.025, 1.);
            assert_eq!(sgd.predictions, step);
        }

        // Only positive updates were applied, so the output row leans toward the embedding
        let h: Vec<f32> = embeddings.get_embedding(0).iter().map(|w| w.tanh()).collect();
        let dot: f32 = h.iter().zip(output.get_embedding(0)).map(|(a, b)| a * b).sum();
        assert!(dot > 0.);
    }

    #[test]
    fn test_alpha_decay() {
        let be = trainer(1_000_000);
        assert_eq!(be.decayed_alpha(0), 0.025);
        assert!((be.decayed_alpha(500_000) - 0.0125).abs() < 1e-6);

        // Near the end the linear decay drops below the floor
        let floor = 0.025 * 1e-4;
        assert_eq!(be.decayed_alpha(999_999), floor);
        assert_eq!(be.decayed_alpha(1_000_000), floor);
        assert!(be.decayed_alpha(999_000) > floor);
    }

    #[test]
    fn test_invalid_config() {
        let be = BinaryEmbedding { dims: 0, ..trainer(10) };
        assert!(matches!(be.learn(small_corpus()), Err(BinneError::InvalidConfig(_))));
    }

}
