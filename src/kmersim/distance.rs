use ndarray::Array2;

use crate::kmersim::stats::Stats;

/// Normalization of a similarity matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixKind {
    /// Row-normalized: the fraction of i's content shared with j.
    Asymmetrical,
    /// Symmetric, Jaccard-style.
    Normalized,
}

/// Derives the final similarity matrices from the accumulated statistics.
/// An empty bank yields 0 wherever its denominator vanishes.
pub struct DistanceBuilder<'a> {
    stats: &'a Stats,
}

impl<'a> DistanceBuilder<'a> {
    pub fn new(stats: &'a Stats) -> Self {
        DistanceBuilder { stats }
    }

    /// Presence/absence similarity over distinct shared k-mers.
    pub fn presence_absence(&self, kind: MatrixKind) -> Array2<f64> {
        let s = self.stats;
        let n = s.nb_banks;
        Array2::from_shape_fn((n, n), |(i, j)| {
            let shared = s.matrix_nb_distinct_shared_kmers[(i, j)] as f64;
            let di = s.nb_solid_distinct_kmers_per_bank[i] as f64;
            let dj = s.nb_solid_distinct_kmers_per_bank[j] as f64;
            match kind {
                MatrixKind::Asymmetrical => ratio(shared, di),
                MatrixKind::Normalized => ratio(shared, di + dj - shared),
            }
        })
    }

    /// Abundance-weighted similarity over shared k-mer counts.
    pub fn abundance(&self, kind: MatrixKind) -> Array2<f64> {
        let s = self.stats;
        let n = s.nb_banks;
        Array2::from_shape_fn((n, n), |(i, j)| {
            let si = s.nb_solid_kmers_per_bank[i] as f64;
            let sj = s.nb_solid_kmers_per_bank[j] as f64;
            match kind {
                MatrixKind::Asymmetrical => {
                    ratio(s.matrix_nb_shared_kmers[(i, j)] as f64, si)
                }
                MatrixKind::Normalized => {
                    let shared = s.matrix_nb_shared_kmers[(i, j)]
                        + s.matrix_nb_shared_kmers[(j, i)];
                    ratio(shared as f64, si + sj)
                }
            }
        })
    }

    /// Bray-Curtis similarity, `2·Σ min(c_i, c_j) / (s_i + s_j)`. The
    /// dissimilarity form is 1 minus this.
    pub fn bray_curtis(&self) -> Array2<f64> {
        let s = self.stats;
        let n = s.nb_banks;
        Array2::from_shape_fn((n, n), |(i, j)| {
            let num = 2.0 * s.bray_curtis_numerator[(i, j)] as f64;
            let den =
                (s.nb_solid_kmers_per_bank[i] + s.nb_solid_kmers_per_bank[j]) as f64;
            ratio(num, den)
        })
    }
}

#[inline]
fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}
