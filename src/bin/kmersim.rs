use clap::Parser;
use kmersim::cli::opts::{FilterArgs, IOArgs, KmerArgs, ResourceArgs};
use kmersim::kmersim::algorithm::{run, Config};

/// Command-line options for the k-mer similarity tool
#[derive(Parser)]
#[command(
    name = "kmersim",
    about = "Estimate pairwise similarity between read datasets from their k-mer content",
    long_about = "Estimate pairwise similarity between read datasets from their k-mer content.


EXAMPLES:
    // Using defaults
    $ kmersim -i <path/to/datasets.txt> -o <path/to/output_directory/> -k 21 -t <N>

    // Solid k-mers only, per-dataset solidity
    $ kmersim -i datasets.txt -o out/ -k 21 --abundance-min 2 --solidity-single
    ",
    version = "0.1.0"
)]
struct Cli {
    #[command(flatten)]
    io: IOArgs,

    #[command(flatten)]
    kmer: KmerArgs,

    #[command(flatten)]
    filter: FilterArgs,

    #[command(flatten)]
    resources: ResourceArgs,

    /// Print filtering counters and k-mer statistics [flag]
    #[clap(short = 'v', long)]
    verbose: bool,
}

fn main() {
    // Catch and handle errors
    // Ensures that tempfile has time to remove the spill dir
    if let Err(e) = try_main() {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
    std::process::exit(0);
}

fn try_main() -> anyhow::Result<()> {
    let opt = Cli::parse();

    let config = Config {
        kmer_size: opt.kmer.kmer_size as usize,
        abundance_min: opt.kmer.abundance_min,
        abundance_max: opt.kmer.abundance_max,
        solidity_single: opt.kmer.solidity_single,
        max_reads: opt.filter.max_reads,
        min_read_size: opt.filter.min_read_size,
        min_read_shannon: opt.filter.min_read_shannon,
        min_kmer_shannon: opt.filter.min_kmer_shannon,
        nb_cores: opt.io.nb_cores,
        max_memory: opt.resources.max_memory,
        nb_partitions: opt.resources.nb_partitions as usize,
        output_dir: opt.io.output_dir.clone(),
        verbose: opt.verbose,
    };

    run(&config, &opt.io.input)
}
