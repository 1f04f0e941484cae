//! BitSet class; the graph reader uses it to catch node ids that show up in more than one record.

/// Simple BitSet class, using 32-bit unsized ints for track flags
#[derive(Clone)]
pub struct BitSet {
    bitfield: Vec<u32>
}

impl BitSet {
    pub fn new(size: usize) -> Self {
        Self { bitfield: vec![0; (size / 32) + 1] }
    }

    fn get_bit_idx(&self, idx: usize) -> (usize, u32) {
        (idx / 32, 1u32 << (idx % 32))
    }

    pub fn is_set(&self, idx: usize) -> bool {
        let (fo, bm) = self.get_bit_idx(idx);
        (self.bitfield[fo] & bm) > 0
    }

    pub fn set_bit(&mut self, idx: usize) {
        let (fo, bm) = self.get_bit_idx(idx);
        self.bitfield[fo] |= bm;
    }

    /// Number of set bits
    pub fn count(&self) -> usize {
        self.bitfield.iter().map(|f| f.count_ones() as usize).sum()
    }

}
