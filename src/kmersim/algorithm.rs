use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::kmersim::bank::{bank_names, load_banks, Bank};
use crate::kmersim::distance::DistanceBuilder;
use crate::kmersim::extract::KmerExtractor;
use crate::kmersim::filter::SequenceFilter;
use crate::kmersim::kmer::{KmerCode, KmerModel};
use crate::kmersim::merge::{merge_buckets, AbundanceVector};
use crate::kmersim::partition::{fill_partitions, PartitionSet};
use crate::kmersim::sort::{load_buckets, sort_buckets};
use crate::kmersim::stats::{CountProcessor, Stats};
use crate::kmersim::write::{output_suffix, write_distance_matrices};

/// Everything one run needs; the CLI maps onto this one to one.
#[derive(Debug, Clone)]
pub struct Config {
    pub kmer_size: usize,
    pub abundance_min: u32,
    pub abundance_max: u32,
    pub solidity_single: bool,
    /// Per-bank read cap, 0 = unlimited.
    pub max_reads: u64,
    pub min_read_size: usize,
    pub min_read_shannon: f64,
    pub min_kmer_shannon: f64,
    /// Worker pool size, 0 = one per core.
    pub nb_cores: usize,
    /// Memory budget in MB, drives the partition count.
    pub max_memory: u64,
    /// Explicit partition count, 0 = derive from input size and budget.
    pub nb_partitions: usize,
    pub output_dir: PathBuf,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            kmer_size: 31,
            abundance_min: 1,
            abundance_max: u32::MAX,
            solidity_single: false,
            max_reads: 0,
            min_read_size: 0,
            min_read_shannon: 0.0,
            min_kmer_shannon: 0.0,
            nb_cores: 1,
            max_memory: 2000,
            nb_partitions: 0,
            output_dir: PathBuf::from("."),
            verbose: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.kmer_size < 4 || self.kmer_size > 64 {
            bail!(
                "invalid k-mer size {} (allowed range: 4..=64)",
                self.kmer_size
            );
        }
        if self.abundance_min > self.abundance_max {
            bail!(
                "inconsistent abundance thresholds: min {} > max {}",
                self.abundance_min,
                self.abundance_max
            );
        }
        Ok(())
    }
}

/// Run the whole pipeline on the datasets listed in `input` and write the
/// five similarity matrices into `config.output_dir`.
pub fn run(config: &Config, input: &Path) -> Result<()> {
    config.validate()?;
    let banks = load_banks(input, config.max_reads)?;
    create_dir_all(&config.output_dir).context("Cannot create output_dir")?;

    // One monomorphization per storage width, selected once from k.
    if config.kmer_size <= 32 {
        execute::<u64>(config, &banks)
    } else {
        execute::<u128>(config, &banks)
    }
}

fn execute<W: KmerCode>(config: &Config, banks: &[Bank]) -> Result<()> {
    let start_time = Instant::now();
    let nb_banks = banks.len();
    let names = bank_names(banks);

    let model = KmerModel::<W>::new(config.kmer_size)?;
    let filter = SequenceFilter::new(config.min_read_size, config.min_read_shannon);
    let extractor = KmerExtractor::new(model, config.min_kmer_shannon);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.nb_cores)
        .build()
        .context("building worker pool")?;

    let nb_partitions = if config.nb_partitions > 0 {
        config.nb_partitions
    } else {
        choose_nb_partitions::<W>(total_input_size(banks)?, config.max_memory)
    };

    if config.verbose {
        println!("Nb input datasets: {nb_banks}");
        println!("Start: Counting ({nb_partitions} partitions)");
    }

    // Fill phase: all banks stream through the filter and extractor into
    // the disk partitions.
    let mut parts = PartitionSet::<W>::create(nb_partitions)?;
    let counters = pool.install(|| fill_partitions(banks, &filter, &extractor, &mut parts))?;
    let parts = parts.finish()?;

    // Drain phase: partitions one by one, bucket -> sort -> merge -> stats.
    let pb = if config.verbose {
        let pb = ProgressBar::new(nb_partitions as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("       {bar:40} {pos}/{len} [{elapsed_precise}] {msg}")
                .unwrap(),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut stats = Stats::new(nb_banks);
    let mut counter = AbundanceVector::new(nb_banks);
    let nb_workers = pool.current_num_threads();

    for p in 0..parts.nb_partitions() {
        let mut buckets = load_buckets(&parts, p, &model)?;
        pool.install(|| sort_buckets(&mut buckets, nb_workers));

        let mut processor = CountProcessor::new(
            nb_banks,
            config.abundance_min,
            config.abundance_max,
            config.solidity_single,
        );
        merge_buckets(&buckets, &mut counter, |_kmer, counts| {
            processor.process(counts);
            Ok(())
        })?;
        processor.finish(&mut stats);

        parts.release(p)?;
        pb.inc(1);
    }
    pb.finish_with_message("| Finished counting");

    // Every routed k-mer instance must be accounted for.
    debug_assert_eq!(stats.nb_kmers, counters.kmers_routed);
    debug_assert_eq!(
        stats.nb_kmers,
        stats.nb_kmers_per_bank.iter().sum::<u64>()
    );

    if config.verbose {
        println!("Start: Writing similarity matrices");
    }
    let distance = DistanceBuilder::new(&stats);
    let suffix = output_suffix(config.kmer_size, config.abundance_min, config.abundance_max);
    write_distance_matrices(&config.output_dir, &suffix, &names, &distance)?;

    if config.verbose {
        println!(
            "Reads: {} total, {} accepted, {} too short, {} low-complexity",
            counters.reads_total,
            counters.reads_accepted,
            counters.reads_too_short,
            counters.reads_low_complexity,
        );
        if counters.kmers_low_complexity > 0 {
            println!("Low-complexity kmers removed: {}", counters.kmers_low_complexity);
        }
        stats.print(&names);
        println!("Output folder:   {:?}", config.output_dir);
        println!("Elapsed time: {:.2?}", start_time.elapsed());
    }
    Ok(())
}

fn total_input_size(banks: &[Bank]) -> Result<u64> {
    let mut total = 0u64;
    for bank in banks {
        for file in &bank.files {
            let meta = std::fs::metadata(file)
                .with_context(|| format!("bank '{}': reading size of {:?}", bank.name, file))?;
            total += meta.len();
        }
    }
    Ok(total)
}

/// Partition count from input size and memory budget: one candidate k-mer
/// per input byte as the upper bound, each costing a packed code plus a
/// bank id, so that a single partition's bucket arrays fit the budget.
fn choose_nb_partitions<W: KmerCode>(total_input_bytes: u64, max_memory_mb: u64) -> usize {
    let item_bytes = (W::BYTES + std::mem::size_of::<u16>()) as u64;
    let budget = max_memory_mb.max(1) * 1024 * 1024;
    let needed = total_input_bytes.saturating_mul(item_bytes);
    needed.div_ceil(budget).clamp(1, 1024) as usize
}
