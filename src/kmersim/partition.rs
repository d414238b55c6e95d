use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

use crate::cli::counters::FillCounters;
use crate::cli::io::open_seq_file;
use crate::kmersim::bank::Bank;
use crate::kmersim::extract::KmerExtractor;
use crate::kmersim::filter::{ReadVerdict, SequenceFilter};
use crate::kmersim::kmer::{KmerCode, KmerModel};

/// Reads pulled from a file before fanning out to the producers.
const BATCH_READS: usize = 4096;
/// Reads handled by one producer task.
const CHUNK_READS: usize = 64;

/// P disk-backed partitions being filled. K-mer x lives in partition
/// `hash(x) mod P`; within a bank, producers append concurrently through
/// per-partition locks, so the per-partition multiset is the sum of the
/// producer contributions. Each partition file is a concatenation of
/// per-bank segments whose lengths are recorded, which is how the bank id
/// of every item is recovered later.
pub struct PartitionSet<W: KmerCode> {
    dir: TempDir,
    paths: Vec<PathBuf>,
    writers: Vec<Mutex<BufWriter<File>>>,
    /// Exact per-radix histogram, [partition][radix], kept with atomic
    /// increments while producers run.
    radix_histogram: Vec<Vec<AtomicU64>>,
    /// Items appended to each partition since the last bank boundary.
    items_this_bank: Vec<AtomicU64>,
    /// Frozen bank segment lengths, [partition][bank].
    items_per_bank: Vec<Vec<u64>>,
    _marker: PhantomData<W>,
}

impl<W: KmerCode> PartitionSet<W> {
    pub fn create(nb_partitions: usize) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("kmersim_parts_")
            .tempdir()
            .context("creating partition spill directory")?;

        let mut paths = Vec::with_capacity(nb_partitions);
        let mut writers = Vec::with_capacity(nb_partitions);
        for p in 0..nb_partitions {
            let path = dir.path().join(format!("part_{p}.bin"));
            let file = File::create(&path)
                .with_context(|| format!("creating spill file for partition {p}"))?;
            writers.push(Mutex::new(BufWriter::new(file)));
            paths.push(path);
        }

        Ok(PartitionSet {
            dir,
            paths,
            writers,
            radix_histogram: (0..nb_partitions)
                .map(|_| (0..256).map(|_| AtomicU64::new(0)).collect())
                .collect(),
            items_this_bank: (0..nb_partitions).map(|_| AtomicU64::new(0)).collect(),
            items_per_bank: vec![Vec::new(); nb_partitions],
            _marker: PhantomData,
        })
    }

    pub fn nb_partitions(&self) -> usize {
        self.writers.len()
    }

    /// Partition id of a canonical k-mer.
    #[inline]
    pub fn route(&self, kmer: W) -> usize {
        (kmer.hash64() % self.writers.len() as u64) as usize
    }

    /// Append a producer buffer to one partition. The write itself is
    /// serialized on the partition lock; histogram and item counts go
    /// through atomics.
    pub fn append(&self, p: usize, codes: &[W], model: &KmerModel<W>) -> Result<()> {
        let mut bytes = vec![0u8; codes.len() * W::BYTES];
        for (code, slot) in codes.iter().zip(bytes.chunks_exact_mut(W::BYTES)) {
            code.write_le(slot);
            self.radix_histogram[p][model.radix(*code) as usize].fetch_add(1, Ordering::Relaxed);
        }
        self.items_this_bank[p].fetch_add(codes.len() as u64, Ordering::Relaxed);

        let mut writer = self.writers[p].lock().unwrap();
        writer
            .write_all(&bytes)
            .with_context(|| format!("spilling k-mers to partition {p}"))?;
        Ok(())
    }

    /// Close the current bank's segment in every partition. Must be called
    /// after all producers of that bank have flushed.
    pub fn finish_bank(&mut self) {
        for (p, count) in self.items_this_bank.iter_mut().enumerate() {
            self.items_per_bank[p].push(std::mem::take(count.get_mut()));
        }
    }

    /// Flush and freeze: no more producers, readers may start.
    pub fn finish(self) -> Result<FilledPartitions<W>> {
        for (p, writer) in self.writers.into_iter().enumerate() {
            let mut writer = writer.into_inner().unwrap();
            writer
                .flush()
                .with_context(|| format!("flushing partition {p}"))?;
        }
        Ok(FilledPartitions {
            _dir: self.dir,
            paths: self.paths,
            radix_sizes: self
                .radix_histogram
                .into_iter()
                .map(|row| row.into_iter().map(AtomicU64::into_inner).collect())
                .collect(),
            items_per_bank: self.items_per_bank,
            _marker: PhantomData,
        })
    }
}

/// Closed partitions, ready to be drained one by one.
pub struct FilledPartitions<W: KmerCode> {
    _dir: TempDir,
    paths: Vec<PathBuf>,
    /// [partition][radix] bucket sizes, frozen.
    pub radix_sizes: Vec<Vec<u64>>,
    /// [partition][bank] segment lengths, frozen.
    pub items_per_bank: Vec<Vec<u64>>,
    _marker: PhantomData<W>,
}

impl<W: KmerCode> FilledPartitions<W> {
    pub fn nb_partitions(&self) -> usize {
        self.paths.len()
    }

    pub fn nb_items(&self, p: usize) -> u64 {
        self.items_per_bank[p].iter().sum()
    }

    pub fn open(&self, p: usize) -> Result<BufReader<File>> {
        let file = File::open(&self.paths[p])
            .with_context(|| format!("reopening spill file for partition {p}"))?;
        Ok(BufReader::new(file))
    }

    /// Delete a drained partition's spill file early; the directory itself
    /// goes away on drop.
    pub fn release(&self, p: usize) -> Result<()> {
        std::fs::remove_file(&self.paths[p])
            .with_context(|| format!("removing drained partition {p}"))
    }
}

/// Run all banks through filter and extractor and spill their canonical
/// k-mers into the partitions. Banks are processed in input order so the
/// partition files keep one contiguous segment per bank; within a bank the
/// producers run in parallel.
pub fn fill_partitions<W: KmerCode>(
    banks: &[Bank],
    filter: &SequenceFilter,
    extractor: &KmerExtractor<W>,
    parts: &mut PartitionSet<W>,
) -> Result<FillCounters> {
    let nb_partitions = parts.nb_partitions();
    let mut counters = FillCounters::default();
    let mut batch: Vec<Vec<u8>> = Vec::with_capacity(BATCH_READS);

    for bank in banks {
        for file in &bank.files {
            let mut reader = open_seq_file(file)
                .with_context(|| format!("bank '{}': opening {:?}", bank.name, file))?;
            let mut remaining = if bank.max_reads_per_file == 0 {
                u64::MAX
            } else {
                bank.max_reads_per_file
            };

            while reader
                .next_batch(BATCH_READS, &mut remaining, &mut batch)
                .with_context(|| format!("bank '{}': reading {:?}", bank.name, file))?
            {
                let shared = &*parts;
                let batch_counters = batch
                    .par_chunks(CHUNK_READS)
                    .map_init(
                        || (Vec::<W>::new(), vec![Vec::<W>::new(); nb_partitions]),
                        |(kmer_buf, part_bufs), chunk| -> Result<FillCounters> {
                            let mut local = FillCounters::default();
                            for seq in chunk {
                                local.reads_total += 1;
                                match filter.check(seq) {
                                    ReadVerdict::TooShort => {
                                        local.reads_too_short += 1;
                                        continue;
                                    }
                                    ReadVerdict::LowComplexity => {
                                        local.reads_low_complexity += 1;
                                        continue;
                                    }
                                    ReadVerdict::Accepted => local.reads_accepted += 1,
                                }
                                local.kmers_low_complexity +=
                                    extractor.extract(seq, kmer_buf);
                                local.kmers_routed += kmer_buf.len() as u64;
                                for &kmer in kmer_buf.iter() {
                                    part_bufs[shared.route(kmer)].push(kmer);
                                }
                            }
                            for (p, buf) in part_bufs.iter_mut().enumerate() {
                                if !buf.is_empty() {
                                    shared.append(p, buf, extractor.model())?;
                                    buf.clear();
                                }
                            }
                            Ok(local)
                        },
                    )
                    .try_reduce(FillCounters::default, |mut a, b| {
                        a += b;
                        Ok(a)
                    })?;
                counters += batch_counters;
            }
        }
        parts.finish_bank();
    }

    Ok(counters)
}
