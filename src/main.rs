//! Command line front end: load a graph, learn binary codes, write them out.
use std::path::PathBuf;
use std::time::{Instant,SystemTime,UNIX_EPOCH};

use anyhow::{Context,Result};
use clap::{CommandFactory,Parser,ValueEnum};
use tracing::{info,warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use binne::io::{EmbeddingWriter,GraphReader,timing_line,write_timing};
use binne::{BinaryEmbedding,CapacityPolicy,RandomWalkCorpus};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    /// Double the hash index when it fills up
    Grow,
    /// Fail once the hash index is full
    Abort
}

#[derive(Parser, Debug)]
#[command(name = "binne")]
#[command(about = "Scalable binary embedding of attributed networks with incomplete graphs")]
struct Cli {
    /// The input <file> for network embedding
    #[arg(long)]
    graph: PathBuf,

    /// Use <file> to save the resulting binary embeddings
    #[arg(long)]
    output: Option<PathBuf>,

    /// Use <file> to save the running time
    #[arg(long)]
    time: Option<PathBuf>,

    /// Size of learned dimensions
    #[arg(long, default_value_t = 256)]
    size: usize,

    /// Window size for collecting node context pairs
    #[arg(long, default_value_t = 10)]
    window: usize,

    /// The number of random walks starting from per node
    #[arg(long, default_value_t = 40)]
    walknum: usize,

    /// The length of random walks
    #[arg(long, default_value_t = 100)]
    walklen: usize,

    /// Number of negative examples; common values are 3 - 10
    #[arg(long, default_value_t = 5)]
    negative: usize,

    /// Starting learning rate
    #[arg(long, default_value_t = 0.025)]
    alpha: f32,

    /// Number of training samples, in millions
    #[arg(long, default_value_t = 100)]
    samples: u64,

    /// Seed for walks and training; taken from the clock when absent
    #[arg(long)]
    seed: Option<u64>,

    /// Slots in each negative sampling table
    #[arg(long, default_value_t = 100_000_000)]
    table_size: usize,

    /// Initial slots in the pair hash indexes; sized from the graph when absent
    #[arg(long)]
    hash_capacity: Option<usize>,

    /// What to do when a pair hash index fills up
    #[arg(long, value_enum, default_value_t = Policy::Grow)]
    capacity_policy: Policy,

    /// Only log warnings and hide progress bars
    #[arg(long)]
    quiet: bool,
}

/// `RUST_LOG` directives win; without them the level follows `--quiet`.
fn log_filter(quiet: bool, directives: Option<&str>) -> EnvFilter {
    let level = if quiet { LevelFilter::WARN } else { LevelFilter::INFO };
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives.unwrap_or(""))
}

fn init_logging(quiet: bool) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(quiet, directives.as_deref()))
        .with_writer(std::io::stderr)
        .init();
}

/// Training draws from its own stream, seeded apart from the walks.
fn training_seed(seed: u64) -> u64 {
    seed.wrapping_add(1)
}

impl Cli {
    fn walks(&self, seed: u64) -> RandomWalkCorpus {
        RandomWalkCorpus {
            walk_num: self.walknum,
            walk_length: self.walklen,
            window_size: self.window,
            capacity: self.hash_capacity,
            policy: match self.capacity_policy {
                Policy::Grow => CapacityPolicy::Grow,
                Policy::Abort => CapacityPolicy::Abort
            },
            seed,
            verbose: !self.quiet
        }
    }

    fn trainer(&self, seed: u64) -> BinaryEmbedding {
        BinaryEmbedding {
            dims: self.size,
            negative: self.negative,
            alpha: self.alpha,
            total_samples: self.samples * 1_000_000,
            table_size: self.table_size,
            seed: training_seed(seed),
            verbose: !self.quiet,
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    if std::env::args_os().len() <= 1 {
        Cli::command().print_help()?;
        return Ok(())
    }

    let cli = Cli::parse();
    init_logging(cli.quiet);

    let seed = cli.seed.unwrap_or_else(|| {
        SystemTime::now().duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    });

    let walks = cli.walks(seed);
    let trainer = cli.trainer(seed);
    walks.validate()?;
    trainer.validate()?;

    info!(
        graph = %cli.graph.display(),
        samples_m = cli.samples,
        dims = cli.size,
        alpha = cli.alpha,
        beta_step = trainer.beta_step(),
        seed,
        "Starting"
    );

    let graph = GraphReader::load(&cli.graph)
        .with_context(|| format!("Failed to load graph from {}", cli.graph.display()))?;

    let start = Instant::now();
    let corpus = walks.build(&graph).context("Failed to build the walk corpus")?;
    let model = trainer.learn(corpus).context("Training failed")?;
    let secs = start.elapsed().as_secs_f64();

    println!("{}", timing_line(secs));
    println!("----------------------------------------------------");

    match &cli.time {
        Some(path) => write_timing(path, secs)
            .with_context(|| format!("Failed to write timing to {}", path.display()))?,
        None => warn!("No --time file given; timing not saved")
    }

    match &cli.output {
        Some(path) => {
            let mut writer = EmbeddingWriter::new(path, None)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            writer.stream((0..model.embeddings.len()).map(|node| model.binary_code(node)))
                .with_context(|| format!("Failed to write embeddings to {}", path.display()))?;
            writer.finish()
                .with_context(|| format!("Failed to finish {}", path.display()))?;
            info!(path = %path.display(), "Wrote binary embeddings");
        },
        None => warn!("No --output file given; embeddings not saved")
    }

    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(false, None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(true, None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(false, Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(true, Some("binne=trace")).max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_configs() {
        let cli = Cli::try_parse_from([
            "binne", "--graph", "g.txt", "--size", "16", "--samples", "2",
            "--capacity-policy", "abort", "--quiet"
        ]).unwrap();
        let walks = cli.walks(7);
        let trainer = cli.trainer(7);

        assert_eq!((walks.walk_num, walks.walk_length, walks.window_size), (40, 100, 10));
        assert_eq!(walks.policy, CapacityPolicy::Abort);
        assert!(!walks.verbose);
        assert_eq!((trainer.dims, trainer.negative, trainer.total_samples), (16, 5, 2_000_000));
        assert_eq!(walks.seed, 7);
        assert_ne!(trainer.seed, walks.seed);
        assert_eq!(cli.trainer(u64::MAX).seed, 0);
    }

    #[test]
    fn test_missing_value() {
        assert!(Cli::try_parse_from(["binne", "--graph"]).is_err());
        assert!(Cli::try_parse_from(["binne", "--graph", "g.txt", "--size"]).is_err());
    }

}
