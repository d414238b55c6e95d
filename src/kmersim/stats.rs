use ndarray::Array2;

use crate::cli::BigCount;

/// Global counters of one run, accumulated across all partitions. Every
/// field is a commutative monoid under `+`, so per-partition locals merge
/// into the global instance in any order.
#[derive(Debug, Clone)]
pub struct Stats {
    pub nb_banks: usize,

    pub nb_distinct_kmers: BigCount,
    pub nb_kmers: BigCount,
    pub nb_solid_kmers: BigCount,
    pub nb_erroneous_kmers: BigCount,

    pub nb_kmers_per_bank: Vec<BigCount>,
    pub nb_solid_kmers_per_bank: Vec<BigCount>,
    pub nb_solid_distinct_kmers_per_bank: Vec<BigCount>,

    /// `[i][j]`: sum of bank i's abundance over solid k-mers present in
    /// both i and j. Not symmetric.
    pub matrix_nb_shared_kmers: Array2<BigCount>,
    /// `[i][j]`: number of distinct solid k-mers present in both. Symmetric.
    pub matrix_nb_distinct_shared_kmers: Array2<BigCount>,
    /// `[i][j]`: sum of `min(c[i], c[j])` over solid k-mers. Symmetric.
    pub bray_curtis_numerator: Array2<BigCount>,

    /// Index K-1: solid distinct k-mers present in exactly K banks.
    pub nb_distinct_kmers_shared_by_banks: Vec<BigCount>,
    /// Index K-1: total abundance of solid k-mers present in exactly K banks.
    pub nb_kmers_shared_by_banks: Vec<BigCount>,
}

impl Stats {
    pub fn new(nb_banks: usize) -> Self {
        Stats {
            nb_banks,
            nb_distinct_kmers: 0,
            nb_kmers: 0,
            nb_solid_kmers: 0,
            nb_erroneous_kmers: 0,
            nb_kmers_per_bank: vec![0; nb_banks],
            nb_solid_kmers_per_bank: vec![0; nb_banks],
            nb_solid_distinct_kmers_per_bank: vec![0; nb_banks],
            matrix_nb_shared_kmers: Array2::zeros((nb_banks, nb_banks)),
            matrix_nb_distinct_shared_kmers: Array2::zeros((nb_banks, nb_banks)),
            bray_curtis_numerator: Array2::zeros((nb_banks, nb_banks)),
            nb_distinct_kmers_shared_by_banks: vec![0; nb_banks],
            nb_kmers_shared_by_banks: vec![0; nb_banks],
        }
    }

    /// Verbose end-of-run summary.
    pub fn print(&self, bank_names: &[String]) {
        println!("Stats:");
        println!("\tNb distinct kmers:  {}", self.nb_distinct_kmers);
        println!("\tNb kmers:           {}", self.nb_kmers);
        println!("\tNb solid kmers:     {}", self.nb_solid_kmers);
        println!("\tNb erroneous kmers: {}", self.nb_erroneous_kmers);
        for (i, name) in bank_names.iter().enumerate() {
            println!(
                "\t{}: {} kmers, {} solid kmers, {} solid distinct kmers",
                name,
                self.nb_kmers_per_bank[i],
                self.nb_solid_kmers_per_bank[i],
                self.nb_solid_distinct_kmers_per_bank[i],
            );
        }
    }
}

impl std::ops::AddAssign for Stats {
    fn add_assign(&mut self, other: Self) {
        debug_assert_eq!(self.nb_banks, other.nb_banks);
        self.nb_distinct_kmers += other.nb_distinct_kmers;
        self.nb_kmers += other.nb_kmers;
        self.nb_solid_kmers += other.nb_solid_kmers;
        self.nb_erroneous_kmers += other.nb_erroneous_kmers;
        for i in 0..self.nb_banks {
            self.nb_kmers_per_bank[i] += other.nb_kmers_per_bank[i];
            self.nb_solid_kmers_per_bank[i] += other.nb_solid_kmers_per_bank[i];
            self.nb_solid_distinct_kmers_per_bank[i] += other.nb_solid_distinct_kmers_per_bank[i];
            self.nb_distinct_kmers_shared_by_banks[i] += other.nb_distinct_kmers_shared_by_banks[i];
            self.nb_kmers_shared_by_banks[i] += other.nb_kmers_shared_by_banks[i];
        }
        self.matrix_nb_shared_kmers += &other.matrix_nb_shared_kmers;
        self.matrix_nb_distinct_shared_kmers += &other.matrix_nb_distinct_shared_kmers;
        self.bray_curtis_numerator += &other.bray_curtis_numerator;
    }
}

/// Consumes the merger's abundance vectors for one partition: applies the
/// solidity policy and updates a partition-local `Stats`, merged into the
/// global instance when the partition is drained.
pub struct CountProcessor {
    nb_banks: usize,
    abundance_min: u32,
    abundance_max: u32,
    solidity_single: bool,
    local: Stats,
    scratch: Vec<u32>,
}

impl CountProcessor {
    pub fn new(
        nb_banks: usize,
        abundance_min: u32,
        abundance_max: u32,
        solidity_single: bool,
    ) -> Self {
        CountProcessor {
            nb_banks,
            abundance_min,
            abundance_max,
            solidity_single,
            local: Stats::new(nb_banks),
            scratch: vec![0; nb_banks],
        }
    }

    #[inline]
    fn is_solid(&self, count: u32) -> bool {
        count >= self.abundance_min && count <= self.abundance_max
    }

    /// A vector is admitted when any component is solid.
    fn is_solid_vector(&self, counts: &[u32]) -> bool {
        counts.iter().any(|&c| c != 0 && self.is_solid(c))
    }

    /// One distinct k-mer's abundance vector. Returns whether it survived
    /// the solidity gate.
    pub fn process(&mut self, counts: &[u32]) -> bool {
        debug_assert_eq!(counts.len(), self.nb_banks);

        self.local.nb_distinct_kmers += 1;
        for (i, &c) in counts.iter().enumerate() {
            self.local.nb_kmers += c as BigCount;
            self.local.nb_kmers_per_bank[i] += c as BigCount;
        }

        if !self.is_solid_vector(counts) {
            return false;
        }
        self.local.nb_solid_kmers += 1;

        self.scratch.copy_from_slice(counts);
        if self.solidity_single {
            let (min, max) = (self.abundance_min, self.abundance_max);
            for c in self.scratch.iter_mut() {
                if !(*c >= min && *c <= max) {
                    *c = 0;
                }
            }
        }
        self.compute_stats();
        true
    }

    /// The O(N²)-per-shared-k-mer accumulation over the (possibly
    /// component-zeroed) abundance vector in `scratch`.
    fn compute_stats(&mut self) {
        let mut nb_banks_with_kmer = 0usize;
        let mut total_abundance: BigCount = 0;

        for i in 0..self.nb_banks {
            let abundance_i = self.scratch[i];
            if abundance_i == 0 {
                continue;
            }
            total_abundance += abundance_i as BigCount;
            nb_banks_with_kmer += 1;
            self.local.nb_solid_distinct_kmers_per_bank[i] += 1;
            self.local.nb_solid_kmers_per_bank[i] += abundance_i as BigCount;

            for j in 0..self.nb_banks {
                let abundance_j = self.scratch[j];
                if abundance_j == 0 {
                    continue;
                }
                self.local.matrix_nb_shared_kmers[(i, j)] += abundance_i as BigCount;
                self.local.matrix_nb_distinct_shared_kmers[(i, j)] += 1;
                self.local.bray_curtis_numerator[(i, j)] +=
                    abundance_i.min(abundance_j) as BigCount;
            }
        }

        if nb_banks_with_kmer > 0 {
            self.local.nb_distinct_kmers_shared_by_banks[nb_banks_with_kmer - 1] += 1;
            self.local.nb_kmers_shared_by_banks[nb_banks_with_kmer - 1] += total_abundance;
        }
        if total_abundance == 1 {
            self.local.nb_erroneous_kmers += 1;
        }
    }

    /// Merge this partition's local counters into the global instance.
    pub fn finish(self, global: &mut Stats) {
        *global += self.local;
    }
}
