
pub type NodeID = usize;
pub type AttributeID = usize;

pub trait Graph {
    /// Get number of nodes in graph
    fn len(&self) -> usize;

    /// Get number of edges in graph
    fn edges(&self) -> usize;

    /// Get degree of node in graph
    fn degree(&self, idx: NodeID) -> usize;

    /// Get neighbors of a node, in the order they were loaded
    fn get_edges(&self, idx: NodeID) -> &[NodeID];

}

/// Compressed Sparse Row Format.  Rows are nodes; columns are either neighbor ids or attribute
/// ids, depending on what the row stores.  The weights slot lets the same layout carry attribute
/// weights, while adjacency rows use `()`.
#[derive(Debug)]
pub struct CSR<W> {
    rows: Vec<usize>,
    columns: Vec<usize>,
    weights: Vec<W>
}

impl <W: Copy + Default> CSR<W> {

    /// Builds the CSR for `num_rows` rows.  Edges within a row keep their input order, which
    /// matters for reproducing walks from a fixed seed.
    pub fn construct_from_edges(num_rows: usize, edges: Vec<(usize, usize, W)>) -> Self {

        // Figure out how many out edges per row
        let mut rows = vec![0; num_rows+1];
        edges.iter().for_each(|(from_node, _to, _w)| {
            rows[*from_node + 1] += 1;
        });

        // Convert to row offset format
        let mut offset = 0;
        rows.iter_mut().skip(1).for_each(|count| {
            offset += *count;
            *count = offset;
        });

        // Insert columns and weights
        let mut counts  = vec![0; num_rows];
        let mut columns = vec![0; edges.len()];
        let mut data    = vec![W::default(); edges.len()];
        edges.into_iter().for_each(|(from_node, to, weight)| {
            let idx = rows[from_node] + counts[from_node];
            columns[idx] = to;
            data[idx] = weight;
            counts[from_node] += 1;
        });

        CSR { rows, columns, weights: data }
    }

    pub fn rows(&self) -> usize {
        self.rows.len() - 1
    }

    pub fn nnz(&self) -> usize {
        self.columns.len()
    }

    pub fn row_len(&self, idx: usize) -> usize {
        self.rows[idx+1] - self.rows[idx]
    }

    /// Get columns and corresponding weights
    pub fn get_row(&self, idx: usize) -> (&[usize], &[W]) {
        let start = self.rows[idx];
        let stop  = self.rows[idx+1];
        (&self.columns[start..stop], &self.weights[start..stop])
    }

}

/// The attributed, possibly incomplete graph: per node an adjacency list and a weighted content
/// list, plus the aggregate attribute frequencies gathered while loading.  Immutable once built.
#[derive(Debug)]
pub struct AttributedGraph {
    structure: CSR<()>,
    content: CSR<u64>,
    attribute_num: usize,
    attribute_freq: Vec<u64>
}

impl AttributedGraph {

    /// `neighbors` holds (node, neighbor) and `contents` holds (node, attribute, weight), each
    /// grouped however the caller likes; per node order is preserved.
    pub fn new(
        node_num: usize,
        attribute_num: usize,
        neighbors: Vec<(NodeID, NodeID)>,
        contents: Vec<(NodeID, AttributeID, u64)>
    ) -> Self {
        let mut attribute_freq = vec![0u64; attribute_num];
        contents.iter().for_each(|(_node, attr, w)| {
            attribute_freq[*attr] += *w;
        });

        let neighbors = neighbors.into_iter().map(|(f, t)| (f, t, ())).collect();
        AttributedGraph {
            structure: CSR::construct_from_edges(node_num, neighbors),
            content: CSR::construct_from_edges(node_num, contents),
            attribute_num,
            attribute_freq
        }
    }

    pub fn attribute_num(&self) -> usize {
        self.attribute_num
    }

    /// Total number of (node, attribute) occurrences across all content lists
    pub fn contents(&self) -> usize {
        self.content.nnz()
    }

    /// Attributes of a node and their weights
    pub fn get_contents(&self, idx: NodeID) -> (&[AttributeID], &[u64]) {
        self.content.get_row(idx)
    }

    /// Sum of input weights per attribute
    pub fn attribute_freq(&self) -> &[u64] {
        &self.attribute_freq
    }

}

impl Graph for AttributedGraph {
    fn len(&self) -> usize {
        self.structure.rows()
    }

    fn edges(&self) -> usize {
        self.structure.nnz()
    }

    fn degree(&self, idx: NodeID) -> usize {
        self.structure.row_len(idx)
    }

    fn get_edges(&self, idx: NodeID) -> &[NodeID] {
        self.structure.get_row(idx).0
    }

}
