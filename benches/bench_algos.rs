use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use rand_distr::{Distribution,Uniform};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use binne::{AttributedGraph,BinaryEmbedding,RandomWalkCorpus};
use binne::algos::alias::AliasTable;

const SEED: u64 = 2022341;

fn build_random_graph(nodes: usize, degree: usize, attrs: usize) -> AttributedGraph {
    let mut rng = XorShiftRng::seed_from_u64(SEED);
    let node_dist = Uniform::new(0, nodes);
    let attr_dist = Uniform::new(0, attrs);
    let mut edges = Vec::new();
    let mut contents = Vec::new();
    for from_node in 0..nodes {
        for _ in 0..degree {
            let to_node = node_dist.sample(&mut rng);
            edges.push((from_node, to_node));
            edges.push((to_node, from_node));
        }
        for _ in 0..3 {
            contents.push((from_node, attr_dist.sample(&mut rng), 1 + rng.gen_range(0, 5)));
        }
    }
    AttributedGraph::new(nodes, attrs, edges, contents)
}

fn corpus_benchmark(c: &mut Criterion) {
    let graph = build_random_graph(2000, 5, 500);
    let rwc = RandomWalkCorpus {
        walk_num: 2,
        walk_length: 40,
        window_size: 5,
        ..Default::default()
    };
    c.bench_function("corpus", |b| b.iter(|| rwc.build(black_box(&graph))));
}

fn alias_benchmark(c: &mut Criterion) {
    let mut rng = XorShiftRng::seed_from_u64(SEED);
    let weights: Vec<f64> = (0..100_000).map(|_| rng.gen_range(1, 100) as f64).collect();
    c.bench_function("alias:build", |b| b.iter(|| AliasTable::new(black_box(&weights))));

    let table = AliasTable::new(&weights).expect("non-empty");
    c.bench_function("alias:sample", |b| b.iter(|| table.sample(&mut rng)));
}

fn training_benchmark(c: &mut Criterion) {
    let graph = build_random_graph(1000, 5, 200);
    let rwc = RandomWalkCorpus {
        walk_num: 2,
        walk_length: 20,
        window_size: 5,
        ..Default::default()
    };
    let trainer = BinaryEmbedding {
        dims: 64,
        total_samples: 50_000,
        table_size: 1_000_000,
        ..Default::default()
    };

    c.bench_function("train:50k", |b| b.iter(|| {
        let corpus = rwc.build(&graph).expect("grow policy");
        trainer.learn(corpus)
    }));
}

criterion_group!(benches, corpus_benchmark, alias_benchmark, training_benchmark);
criterion_main!(benches);
