//! Open addressing table aggregating (source, target) observations into counts.  The index array
//! stores positions into a separate record sequence, so the records can be grown and finally
//! compacted without disturbing the hash slots.
use crate::error::{BinneError,Result};

const EMPTY: usize = usize::MAX;

/// One aggregated observation.  For node-context pairs `target` is a node id; for node-attribute
/// pairs it is an attribute id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairRecord {
    pub source: usize,
    pub target: usize,
    pub count: u64
}

/// What to do when the index array runs out of room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityPolicy {
    /// Double the index and rehash once the load factor passes 3/4.
    Grow,

    /// Fixed capacity; a probe that wraps the whole index is an error.
    Abort
}

enum Probe {
    Found(usize),
    Vacant(usize)
}

pub struct PairTable {
    name: &'static str,

    /// Number of distinct values `target` can take
    keyspace: usize,
    index: Vec<usize>,
    records: Vec<PairRecord>,
    policy: CapacityPolicy
}

impl PairTable {
    pub fn new(
        name: &'static str,
        keyspace: usize,
        capacity: usize,
        policy: CapacityPolicy
    ) -> Self {
        let capacity = capacity.max(1);
        PairTable {
            name,
            keyspace,
            index: vec![EMPTY; capacity],
            records: Vec::new(),
            policy
        }
    }

    #[inline]
    fn hash(&self, source: usize, target: usize) -> usize {
        let h = source as u128 * self.keyspace as u128 + target as u128;
        (h % self.index.len() as u128) as usize
    }

    /// Linear probing with wraparound, starting at the home slot of the key.
    fn probe(&self, source: usize, target: usize) -> Result<Probe> {
        let capacity = self.index.len();
        let mut slot = self.hash(source, target);
        for _ in 0..capacity {
            let pos = self.index[slot];
            if pos == EMPTY {
                return Ok(Probe::Vacant(slot))
            }
            let record = &self.records[pos];
            if record.source == source && record.target == target {
                return Ok(Probe::Found(pos))
            }
            slot = (slot + 1) % capacity;
        }
        Err(BinneError::CapacityExhausted { table: self.name, capacity })
    }

    /// Position of the record for (source, target) in the record sequence, if it was seen.
    pub fn lookup(&self, source: usize, target: usize) -> Result<Option<usize>> {
        Ok(match self.probe(source, target)? {
            Probe::Found(pos) => Some(pos),
            Probe::Vacant(_) => None
        })
    }

    /// Adds `weight` to the pair's count, creating the record with count `weight` on first
    /// observation.  Returns the record position.
    pub fn insert_or_increment(&mut self, source: usize, target: usize, weight: u64) -> Result<usize> {
        if self.policy == CapacityPolicy::Grow && (self.records.len() + 1) * 4 > self.index.len() * 3 {
            self.grow()?;
        }

        match self.probe(source, target)? {
            Probe::Found(pos) => {
                self.records[pos].count += weight;
                Ok(pos)
            },
            Probe::Vacant(slot) => {
                let pos = self.records.len();
                self.records.push(PairRecord { source, target, count: weight });
                self.index[slot] = pos;
                Ok(pos)
            }
        }
    }

    /// Unit increment, used for co-occurrences found by walks.
    pub fn increment(&mut self, source: usize, target: usize) -> Result<usize> {
        self.insert_or_increment(source, target, 1)
    }

    fn grow(&mut self) -> Result<()> {
        let capacity = self.index.len() * 2;
        self.index.clear();
        self.index.resize(capacity, EMPTY);
        for pos in 0..self.records.len() {
            let PairRecord { source, target, .. } = self.records[pos];
            match self.probe(source, target)? {
                Probe::Vacant(slot) => self.index[slot] = pos,
                Probe::Found(_) => unreachable!("records are unique by construction")
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn get(&self, pos: usize) -> &PairRecord {
        &self.records[pos]
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    fn capacity(&self) -> usize {
        self.index.len()
    }

    /// Drops the index and returns the records, shrunk to fit.
    pub fn into_records(self) -> Vec<PairRecord> {
        let mut records = self.records;
        records.shrink_to_fit();
        records
    }
}
