use std::fs;
use std::io::Write;
use std::path::Path;

use binne::io::{EmbeddingWriter,GraphReader,write_timing};
use binne::{embed,BinaryEmbedding,BinneError,RandomWalkCorpus};

const THREE_NODES: &str = "3 2\n\
    0 1 1 1 0 1\n\
    1 2 0 2 1 1 1\n\
    2 1 1 1 0 1\n";

fn write_graph(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

fn run(graph_path: &Path, output: &Path, seed: u64) -> String {
    let graph = GraphReader::load(graph_path).unwrap();
    let walks = RandomWalkCorpus {
        walk_num: 1,
        walk_length: 3,
        window_size: 1,
        seed,
        ..Default::default()
    };
    let trainer = BinaryEmbedding {
        dims: 4,
        total_samples: 1000,
        table_size: 10_000,
        seed,
        ..Default::default()
    };
    let model = embed(&graph, &walks, &trainer).unwrap();

    let mut writer = EmbeddingWriter::new(output, None).unwrap();
    writer.stream(model.binary_codes().into_iter()).unwrap();
    writer.finish().unwrap();
    fs::read_to_string(output).unwrap()
}

#[test]
fn three_node_graph() {
    let dir = tempfile::tempdir().unwrap();
    let graph_path = write_graph(dir.path(), "graph.txt", THREE_NODES);

    let first = run(&graph_path, &dir.path().join("emb1.txt"), 42);
    let lines: Vec<_> = first.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in lines {
        let bits: Vec<_> = line.split(' ').collect();
        assert_eq!(bits.len(), 4);
        assert!(bits.iter().all(|b| *b == "0" || *b == "1"), "{:?}", line);
    }

    let second = run(&graph_path, &dir.path().join("emb2.txt"), 42);
    assert_eq!(first, second);
}

#[test]
fn gzip_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let gz_path = dir.path().join("graph.txt.gz");
    {
        let mut f = binne::io::open_file_for_writing(&gz_path, None).unwrap();
        f.write_all(THREE_NODES.as_bytes()).unwrap();
        f.finish().unwrap();
    }
    let plain = write_graph(dir.path(), "graph.txt", THREE_NODES);

    let a = run(&gz_path, &dir.path().join("a.txt"), 7);
    let b = run(&plain, &dir.path().join("b.txt"), 7);
    assert_eq!(a, b);
}

#[test]
fn incomplete_graph() {
    // Node 2 has no neighbors, node 0 has no attributes
    let dir = tempfile::tempdir().unwrap();
    let graph_path = write_graph(dir.path(), "graph.txt", "3 1\n0 1 1 0\n1 1 0 1 0 3\n2 0 1 0 1\n");
    let out = run(&graph_path, &dir.path().join("emb.txt"), 3);
    assert_eq!(out.lines().count(), 3);
}

#[test]
fn missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let err = GraphReader::load(&dir.path().join("nope.txt")).unwrap_err();
    assert!(matches!(err, BinneError::Io(_)));
}

#[test]
fn unwritable_output() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("missing_dir").join("emb.txt");
    assert!(matches!(EmbeddingWriter::new(&bad, None), Err(BinneError::Io(_))));
    assert!(matches!(write_timing(&bad, 1.), Err(BinneError::Io(_))));
}

#[test]
fn timing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("time.txt");
    write_timing(&path, 0.25).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "Total time: 0.250000 secs for learning node embeddings\n");
}
