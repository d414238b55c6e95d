use clap::{value_parser, Args};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct IOArgs {
    /// Input descriptor file: one dataset per line, '<name> <file1> [<file2> ...]' [path]
    #[clap(
        short = 'i',
        long,
        value_parser,
        required = true,
        help_heading = "Core"
    )]
    pub input: PathBuf,

    /// Output directory for the similarity matrices [path]
    #[clap(
        short = 'o',
        long,
        value_parser,
        required = true,
        help_heading = "Core"
    )]
    pub output_dir: PathBuf,

    /// Number of threads to use (increases RAM usage) [integer]
    #[clap(short = 't', long, default_value = "1", help_heading = "Core")]
    pub nb_cores: usize,
}

#[derive(Debug, Args)]
pub struct KmerArgs {
    /// K-mer size [integer]
    #[clap(short = 'k', long, required = true, value_parser = value_parser!(u8).range(4..=64), help_heading = "Core")]
    pub kmer_size: u8,

    /// Minimum abundance for a count to be solid [integer]
    #[clap(long, default_value = "1", value_parser = value_parser!(u32).range(1..), help_heading = "Solidity")]
    pub abundance_min: u32,

    /// Maximum abundance for a count to be solid [integer]
    #[clap(long, default_value_t = u32::MAX, help_heading = "Solidity")]
    pub abundance_max: u32,

    /// Zero the non-solid components of an abundance vector before the
    /// statistics are updated [flag]
    #[clap(long, help_heading = "Solidity")]
    pub solidity_single: bool,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Maximum number of reads per dataset, 0 = unlimited [integer]
    #[clap(long, default_value = "0", help_heading = "Filtering")]
    pub max_reads: u64,

    /// Minimum read length, 0 disables the check [integer]
    #[clap(long, default_value = "0", help_heading = "Filtering")]
    pub min_read_size: usize,

    /// Minimum Shannon index of a read (0..2), 0 disables the check [float]
    #[clap(long, default_value = "0", help_heading = "Filtering")]
    pub min_read_shannon: f64,

    /// Minimum Shannon index of a k-mer (0..2), 0 disables the check [float]
    #[clap(long, default_value = "0", help_heading = "Filtering")]
    pub min_kmer_shannon: f64,
}

#[derive(Debug, Args)]
pub struct ResourceArgs {
    /// Memory budget in MB used to size the disk partitions [integer]
    #[clap(long, default_value = "2000", value_parser = value_parser!(u64).range(1..), help_heading = "Resources")]
    pub max_memory: u64,

    /// Number of disk partitions, 0 = derive from input size and memory [integer]
    #[clap(long, default_value = "0", value_parser = value_parser!(u64).range(0..=1024), help_heading = "Resources")]
    pub nb_partitions: u64,
}
