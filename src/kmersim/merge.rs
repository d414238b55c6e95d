use anyhow::{Context, Result};

use crate::kmersim::kmer::KmerCode;
use crate::kmersim::sort::RadixBuckets;

/// Per-bank counts of the k-mer group currently being collapsed.
#[derive(Debug)]
pub struct AbundanceVector {
    counts: Vec<u32>,
}

impl AbundanceVector {
    pub fn new(nb_banks: usize) -> Self {
        AbundanceVector {
            counts: vec![0; nb_banks],
        }
    }

    /// Start a new group: everything to 0, then one occurrence in `bank`.
    pub fn init(&mut self, bank: u16) {
        self.counts.fill(0);
        self.counts[bank as usize] = 1;
    }

    pub fn increase(&mut self, bank: u16) -> Result<()> {
        let slot = &mut self.counts[bank as usize];
        *slot = slot
            .checked_add(1)
            .with_context(|| format!("k-mer count overflow in bank index {bank}"))?;
        Ok(())
    }

    pub fn get(&self) -> &[u32] {
        &self.counts
    }
}

/// Cursor over one partition's sorted buckets in ascending radix order;
/// because the radix is the top byte of the k-mer, the concatenation is a
/// single globally ordered stream.
struct BucketCursor<'a, W: KmerCode> {
    buckets: &'a RadixBuckets<W>,
    radix: usize,
    idx: usize,
}

impl<'a, W: KmerCode> BucketCursor<'a, W> {
    fn new(buckets: &'a RadixBuckets<W>) -> Self {
        BucketCursor {
            buckets,
            radix: 0,
            idx: 0,
        }
    }

    fn next(&mut self) -> Option<(W, u16)> {
        while self.radix < 256 && self.idx >= self.buckets.kmers[self.radix].len() {
            self.radix += 1;
            self.idx = 0;
        }
        if self.radix >= 256 {
            return None;
        }
        let item = (
            self.buckets.kmers[self.radix][self.idx],
            self.buckets.bank_ids[self.radix][self.idx],
        );
        self.idx += 1;
        Some(item)
    }
}

/// Collapse the sorted stream into one emission per distinct k-mer: an
/// abundance vector counting occurrences per bank. An empty partition
/// emits nothing; the last group is flushed at stream end.
pub fn merge_buckets<W, F>(
    buckets: &RadixBuckets<W>,
    counter: &mut AbundanceVector,
    mut emit: F,
) -> Result<()>
where
    W: KmerCode,
    F: FnMut(W, &[u32]) -> Result<()>,
{
    let mut cursor = BucketCursor::new(buckets);

    let Some((mut previous, bank)) = cursor.next() else {
        return Ok(());
    };
    counter.init(bank);

    while let Some((kmer, bank)) = cursor.next() {
        debug_assert!(kmer >= previous);
        if kmer != previous {
            emit(previous, counter.get())?;
            previous = kmer;
            counter.init(bank);
        } else {
            counter.increase(bank)?;
        }
    }
    emit(previous, counter.get())
}
