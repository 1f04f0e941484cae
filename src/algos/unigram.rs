//! Negative sampling table.  Each slot holds an entity id, with ids occupying slots roughly in
//! proportion to freq^0.75, so a draw is one multiply and one shift of an LCG.

const POWER: f64 = 0.75;

/// The word2vec linear congruential stream.  Deterministic given its start value.
#[derive(Debug, Clone)]
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg(seed)
    }

    #[inline]
    pub fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(25214903917).wrapping_add(11);
        self.0
    }
}

#[derive(Debug)]
pub struct UnigramTable {
    /// Ids are stored as u32 to halve the footprint of the large default tables
    table: Vec<u32>
}

impl UnigramTable {

    /// Returns None if there are no entities, none of them was ever observed, or there are more
    /// than fit in a u32.
    pub fn new(freqs: &[u64], table_size: usize) -> Option<Self> {
        let total: f64 = freqs.iter().map(|f| (*f as f64).powf(POWER)).sum();
        if freqs.is_empty() || !(total > 0.) || table_size == 0 {
            return None
        }

        let last = u32::try_from(freqs.len() - 1).ok()?;
        let mut table = Vec::with_capacity(table_size);
        let mut i = 0;
        let mut d1 = (freqs[0] as f64).powf(POWER) / total;
        for a in 0..table_size {
            table.push(i);
            if a as f64 / table_size as f64 > d1 && i < last {
                i += 1;
                d1 += (freqs[i as usize] as f64).powf(POWER) / total;
            }
        }
        Some(UnigramTable { table })
    }

    #[inline]
    pub fn sample(&self, lcg: &mut Lcg) -> usize {
        self.table[((lcg.next() >> 16) % self.table.len() as u64) as usize] as usize
    }
}
