use anyhow::{Context, Result};
use rayon::prelude::*;
use std::io::Read;

use crate::kmersim::kmer::{KmerCode, KmerModel};
use crate::kmersim::partition::FilledPartitions;

/// One partition's 256 radix buckets: the k-mer array and the bank-id
/// array are parallel and must stay aligned through sorting.
pub struct RadixBuckets<W: KmerCode> {
    pub kmers: Vec<Vec<W>>,
    pub bank_ids: Vec<Vec<u16>>,
}

/// Load one partition into its radix buckets. Items are read back bank
/// segment by bank segment, which restores the bank id the partitioner
/// dropped from the on-disk format. Bucket capacities come from the frozen
/// histogram, so no bucket reallocates.
pub fn load_buckets<W: KmerCode>(
    parts: &FilledPartitions<W>,
    p: usize,
    model: &KmerModel<W>,
) -> Result<RadixBuckets<W>> {
    let mut kmers: Vec<Vec<W>> = Vec::with_capacity(256);
    let mut bank_ids: Vec<Vec<u16>> = Vec::with_capacity(256);
    for radix in 0..256 {
        let size = parts.radix_sizes[p][radix] as usize;
        kmers.push(Vec::with_capacity(size));
        bank_ids.push(Vec::with_capacity(size));
    }

    let mut reader = parts.open(p)?;
    let mut buf = [0u8; 16];
    for (bank, &count) in parts.items_per_bank[p].iter().enumerate() {
        for _ in 0..count {
            reader
                .read_exact(&mut buf[..W::BYTES])
                .with_context(|| format!("reading partition {p}"))?;
            let kmer = W::read_le(&buf[..W::BYTES]);
            let radix = model.radix(kmer) as usize;
            kmers[radix].push(kmer);
            bank_ids[radix].push(bank as u16);
        }
    }

    Ok(RadixBuckets { kmers, bank_ids })
}

/// Sort every bucket by k-mer value. Buckets are divided into contiguous
/// ranges, one per worker; ties between bank ids may land in any order,
/// the merger collapses equal k-mers regardless.
pub fn sort_buckets<W: KmerCode>(buckets: &mut RadixBuckets<W>, nb_cores: usize) {
    let chunk = 256usize.div_ceil(nb_cores.max(1));
    buckets
        .kmers
        .par_chunks_mut(chunk)
        .zip(buckets.bank_ids.par_chunks_mut(chunk))
        .for_each(|(kmer_range, bank_range)| {
            for (kmers, bank_ids) in kmer_range.iter_mut().zip(bank_range.iter_mut()) {
                if !kmers.is_empty() {
                    sort_one_bucket(kmers, bank_ids);
                }
            }
        });
}

/// Indirect sort: order indices by k-mer key, then apply the permutation
/// to both arrays in lockstep.
fn sort_one_bucket<W: KmerCode>(kmers: &mut [W], bank_ids: &mut [u16]) {
    debug_assert_eq!(kmers.len(), bank_ids.len());

    let mut idx: Vec<u32> = (0..kmers.len() as u32).collect();
    idx.sort_unstable_by_key(|&i| kmers[i as usize]);

    let mut tmp: Vec<(W, u16)> = Vec::with_capacity(idx.len());
    for &i in &idx {
        tmp.push((kmers[i as usize], bank_ids[i as usize]));
    }
    for (i, (kmer, bank)) in tmp.into_iter().enumerate() {
        kmers[i] = kmer;
        bank_ids[i] = bank;
    }
}
