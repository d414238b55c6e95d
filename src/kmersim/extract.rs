use crate::kmersim::kmer::{encode_base, KmerCode, KmerModel};

/// Produces the canonical k-mers of an accepted read by sliding a window
/// of width k. An invalid base restarts the window.
#[derive(Clone, Copy, Debug)]
pub struct KmerExtractor<W: KmerCode> {
    model: KmerModel<W>,
    min_kmer_shannon_index: f64,
}

impl<W: KmerCode> KmerExtractor<W> {
    pub fn new(model: KmerModel<W>, min_kmer_shannon_index: f64) -> Self {
        KmerExtractor {
            model,
            min_kmer_shannon_index: min_kmer_shannon_index.clamp(0.0, 2.0),
        }
    }

    pub fn model(&self) -> &KmerModel<W> {
        &self.model
    }

    /// Fill `out` with the read's canonical k-mers, then apply the
    /// per-k-mer complexity filter. Returns the number of k-mers removed
    /// as low-complexity.
    pub fn extract(&self, seq: &[u8], out: &mut Vec<W>) -> u64 {
        out.clear();
        let k = self.model.k();
        if seq.len() < k {
            return 0;
        }

        let mut fwd = W::default();
        let mut rc = W::default();
        let mut run = 0usize;

        for &b in seq {
            let code = encode_base(b);
            if code > 3 {
                // invalid base: the window restarts after it
                run = 0;
                fwd = W::default();
                rc = W::default();
                continue;
            }
            fwd = self.model.push_base(fwd, code);
            rc = self.model.push_base_rc(rc, code);
            run += 1;
            if run >= k {
                out.push(self.model.canonical(fwd, rc));
            }
        }

        if self.min_kmer_shannon_index == 0.0 {
            return 0;
        }
        self.thin(out)
    }

    /// Drop low-complexity k-mers. A rejected k-mer is removed and the
    /// cursor stays; an accepted one advances the cursor by k/3 so that
    /// low-complexity runs are thinned rather than checked base by base.
    fn thin(&self, kmers: &mut Vec<W>) -> u64 {
        let step = (self.model.k() / 3).max(1);
        let mut removed = 0u64;
        let mut i = 0usize;
        while i < kmers.len() {
            if self.model.shannon_index(kmers[i]) < self.min_kmer_shannon_index {
                kmers.remove(i);
                removed += 1;
            } else {
                i += step;
            }
        }
        removed
    }
}
