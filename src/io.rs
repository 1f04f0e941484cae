//! Graph loading and embedding export.  Paths ending in `.gz` are transparently
//! (de)compressed.
use std::fs::File;
use std::io::{Write,BufWriter,BufReader,BufRead};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use itertools::Itertools;
use tracing::info;

use crate::bitset::BitSet;
use crate::error::{BinneError,Result};
use crate::graph::{AttributedGraph,Graph};

pub fn open_file_for_reading(path: &Path) -> Result<Box<dyn BufRead>> {
    let f = File::open(path)?;

    let f = BufReader::new(f);
    let result: Box<dyn BufRead> = if is_gz(path) {
        let decoder = BufReader::new(GzDecoder::new(f));
        Box::new(decoder)
    } else {
        Box::new(f)
    };
    Ok(result)
}

/// A created output file, compressed when its path ends in `.gz`.  Dropping it flushes on a best
/// effort basis; call `finish` to surface errors from the final flush and the gzip trailer.
pub enum FileWriter {
    Plain(BufWriter<File>),
    Gz(GzEncoder<BufWriter<File>>)
}

impl FileWriter {
    pub fn finish(self) -> Result<()> {
        let mut bw = match self {
            FileWriter::Plain(bw) => bw,
            FileWriter::Gz(e) => e.finish()?
        };
        bw.flush()?;
        Ok(())
    }
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            FileWriter::Plain(w) => w.write(buf),
            FileWriter::Gz(w) => w.write(buf)
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            FileWriter::Plain(w) => w.flush(),
            FileWriter::Gz(w) => w.flush()
        }
    }
}

pub fn open_file_for_writing(path: &Path, compression: Option<u32>) -> Result<FileWriter> {
    let comp_level = compression.map(|l| Compression::new(l));
    let f = File::create(path)?;
    let bw = BufWriter::new(f);
    let writer = if is_gz(path) {
        FileWriter::Gz(GzEncoder::new(bw, comp_level.unwrap_or(Compression::fast())))
    } else {
        FileWriter::Plain(bw)
    };
    Ok(writer)
}

fn is_gz(path: &Path) -> bool {
    path.extension().map(|ext| ext == "gz").unwrap_or(false)
}

/// Whitespace separated integers, remembering the line each came from for error messages.
struct Tokens<R> {
    reader: R,
    line: String,
    line_no: usize,
    pos: usize
}

impl <R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Tokens { reader, line: String::new(), line_no: 0, pos: 0 }
    }

    fn next_token(&mut self) -> Result<Option<String>> {
        loop {
            let rest = &self.line[self.pos..];
            let trimmed = rest.trim_start();
            if !trimmed.is_empty() {
                let start = self.pos + (rest.len() - trimmed.len());
                let len = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
                self.pos = start + len;
                return Ok(Some(self.line[start..start + len].to_string()))
            }

            self.line.clear();
            self.pos = 0;
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None)
            }
            self.line_no += 1;
        }
    }

    /// None at end of input
    fn next_u64_opt(&mut self, what: &str) -> Result<Option<u64>> {
        match self.next_token()? {
            Some(tok) => tok.parse::<u64>().map(Some).map_err(|e| BinneError::Parse {
                line: self.line_no,
                message: format!("expected {} but found {:?}: {}", what, tok, e)
            }),
            None => Ok(None)
        }
    }

    fn next_u64(&mut self, what: &str) -> Result<u64> {
        self.next_u64_opt(what)?.ok_or_else(|| BinneError::Parse {
            line: self.line_no,
            message: format!("unexpected end of file, expected {}", what)
        })
    }
}

pub struct GraphReader;

impl GraphReader {

    pub fn load(path: &Path) -> Result<AttributedGraph> {
        let reader = open_file_for_reading(path)?;
        let graph = GraphReader::parse(reader)?;
        info!(
            path = %path.display(),
            nodes = graph.len(),
            edges = graph.edges(),
            attributes = graph.attribute_num(),
            contents = graph.contents(),
            "Loaded graph"
        );
        Ok(graph)
    }

    /// Reads `node_num attribute_num`, then one record per node:
    /// `node_id neighbor_count neighbor... content_count (attribute weight)...`.
    /// Records may come in any order but every node needs exactly one.
    pub fn parse(reader: impl BufRead) -> Result<AttributedGraph> {
        let mut tokens = Tokens::new(reader);
        let node_num = tokens.next_u64("node count")? as usize;
        let attribute_num = tokens.next_u64("attribute count")? as usize;

        let mut seen = BitSet::new(node_num);
        let mut neighbors = Vec::new();
        let mut contents = Vec::new();
        for found in 0..node_num {
            let node = tokens.next_u64_opt("node id")?
                .ok_or(BinneError::MissingNodes { found, expected: node_num })?;
            let node = GraphReader::check_node(node, node_num, tokens.line_no)?;
            if seen.is_set(node) {
                return Err(BinneError::DuplicateNode { line: tokens.line_no, node })
            }
            seen.set_bit(node);

            let neighbor_count = tokens.next_u64("neighbor count")?;
            for _ in 0..neighbor_count {
                let neighbor = tokens.next_u64("neighbor id")?;
                let neighbor = GraphReader::check_node(neighbor, node_num, tokens.line_no)?;
                neighbors.push((node, neighbor));
            }

            let content_count = tokens.next_u64("content count")?;
            for _ in 0..content_count {
                let attribute = tokens.next_u64("attribute id")?;
                if attribute >= attribute_num as u64 {
                    return Err(BinneError::AttributeOutOfRange {
                        line: tokens.line_no, attribute, attribute_num
                    })
                }
                let weight = tokens.next_u64("attribute weight")?;
                contents.push((node, attribute as usize, weight));
            }
        }
        debug_assert_eq!(seen.count(), node_num);

        Ok(AttributedGraph::new(node_num, attribute_num, neighbors, contents))
    }

    fn check_node(node: u64, node_num: usize, line: usize) -> Result<usize> {
        if node >= node_num as u64 {
            Err(BinneError::NodeOutOfRange { line, node, node_num })
        } else {
            Ok(node as usize)
        }
    }
}

/// Writes one line per node, in node id order, of space separated 0/1 digits.
pub struct EmbeddingWriter<W> {
    output: W
}

impl EmbeddingWriter<FileWriter> {
    pub fn new(path: &Path, comp_level: Option<u32>) -> Result<Self> {
        Ok(EmbeddingWriter { output: open_file_for_writing(path, comp_level)? })
    }

    /// Flushes and, for `.gz` paths, writes the gzip trailer.
    pub fn finish(self) -> Result<()> {
        self.output.finish()
    }
}

impl <W: Write> EmbeddingWriter<W> {

    pub fn from_writer(output: W) -> Self {
        EmbeddingWriter { output }
    }

    pub fn stream<A: AsRef<[bool]>>(&mut self, it: impl Iterator<Item=A>) -> Result<()> {
        for code in it {
            let line = code.as_ref().iter()
                .map(|bit| if *bit { "1" } else { "0" })
                .join(" ");
            writeln!(&mut self.output, "{}", line)?;
        }
        self.output.flush()?;
        Ok(())
    }
}

pub fn timing_line(secs: f64) -> String {
    format!("Total time: {:.6} secs for learning node embeddings", secs)
}

pub fn write_timing(path: &Path, secs: f64) -> Result<()> {
    let mut f = open_file_for_writing(path, None)?;
    writeln!(&mut f, "{}", timing_line(secs))?;
    f.finish()
}
