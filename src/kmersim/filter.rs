use crate::kmersim::kmer::encode_base;

/// Per-read admission filter: minimum length and base-composition Shannon
/// entropy. A threshold of 0 disables the corresponding check.
#[derive(Clone, Copy, Debug)]
pub struct SequenceFilter {
    min_read_size: usize,
    min_shannon_index: f64,
}

/// Why a read was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadVerdict {
    Accepted,
    TooShort,
    LowComplexity,
}

impl SequenceFilter {
    pub fn new(min_read_size: usize, min_shannon_index: f64) -> Self {
        SequenceFilter {
            min_read_size,
            // Matches the maximum entropy of a 4-letter alphabet
            min_shannon_index: min_shannon_index.clamp(0.0, 2.0),
        }
    }

    pub fn check(&self, seq: &[u8]) -> ReadVerdict {
        if !self.is_read_size_valid(seq) {
            return ReadVerdict::TooShort;
        }
        if !self.is_shannon_index_valid(seq) {
            return ReadVerdict::LowComplexity;
        }
        ReadVerdict::Accepted
    }

    fn is_read_size_valid(&self, seq: &[u8]) -> bool {
        if self.min_read_size == 0 {
            return true;
        }
        seq.len() >= self.min_read_size
    }

    fn is_shannon_index_valid(&self, seq: &[u8]) -> bool {
        if self.min_shannon_index == 0.0 {
            return true;
        }
        read_shannon_index(seq) >= self.min_shannon_index
    }
}

/// Base-2 entropy of a read's letter frequencies over {A, C, G, T, N}.
/// Anything that is not a nucleotide counts as N.
pub fn read_shannon_index(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let mut freqs = [0.0f64; 5];
    for &b in seq {
        freqs[encode_base(b) as usize] += 1.0;
    }
    let mut index = 0.0;
    for f in freqs.iter_mut() {
        *f /= seq.len() as f64;
        if *f != 0.0 {
            index += *f * f.log2();
        }
    }
    index.abs()
}
