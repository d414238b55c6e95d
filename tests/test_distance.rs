#[cfg(test)]
mod distance_tests {
    use kmersim::kmersim::distance::{DistanceBuilder, MatrixKind};
    use kmersim::kmersim::stats::{CountProcessor, Stats};

    /// Accumulate a handful of abundance vectors into a `Stats`.
    fn stats_from(nb_banks: usize, vectors: &[&[u32]]) -> Stats {
        let mut p = CountProcessor::new(nb_banks, 1, u32::MAX, false);
        for v in vectors {
            p.process(v);
        }
        let mut global = Stats::new(nb_banks);
        p.finish(&mut global);
        global
    }

    /* --------------------------------------------------------------------- */
    /*  presence / absence                                                   */
    /* --------------------------------------------------------------------- */

    #[test]
    fn identical_banks_have_similarity_one() {
        let s = stats_from(2, &[&[1, 1]]);
        let d = DistanceBuilder::new(&s);

        let asym = d.presence_absence(MatrixKind::Asymmetrical);
        let norm = d.presence_absence(MatrixKind::Normalized);
        let bc = d.bray_curtis();
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(asym[(i, j)], 1.0);
                assert_eq!(norm[(i, j)], 1.0);
                assert_eq!(bc[(i, j)], 1.0);
            }
        }
    }

    #[test]
    fn disjoint_banks_are_identity_matrices() {
        let s = stats_from(2, &[&[1, 0], &[0, 1]]);
        let d = DistanceBuilder::new(&s);

        let norm = d.presence_absence(MatrixKind::Normalized);
        let bc = d.bray_curtis();
        assert_eq!(norm[(0, 0)], 1.0);
        assert_eq!(norm[(1, 1)], 1.0);
        assert_eq!(norm[(0, 1)], 0.0);
        assert_eq!(norm[(1, 0)], 0.0);
        assert_eq!(bc[(0, 1)], 0.0);
    }

    #[test]
    fn jaccard_denominator_subtracts_the_intersection() {
        // bank 0 holds two distinct k-mers, bank 1 one of them
        let s = stats_from(2, &[&[1, 1], &[1, 0]]);
        let d = DistanceBuilder::new(&s);

        let norm = d.presence_absence(MatrixKind::Normalized);
        // |A∩B| = 1, |A| = 2, |B| = 1 → 1 / (2 + 1 - 1)
        assert!((norm[(0, 1)] - 0.5).abs() < 1e-12);
        assert_eq!(norm[(0, 1)], norm[(1, 0)]);

        let asym = d.presence_absence(MatrixKind::Asymmetrical);
        assert!((asym[(0, 1)] - 0.5).abs() < 1e-12); // 1 of A's 2
        assert!((asym[(1, 0)] - 1.0).abs() < 1e-12); // 1 of B's 1
    }

    /* --------------------------------------------------------------------- */
    /*  abundance                                                            */
    /* --------------------------------------------------------------------- */

    #[test]
    fn abundance_asym_normalizes_by_the_row_bank() {
        // one k-mer, twice in bank 0, once in bank 1
        let s = stats_from(2, &[&[2, 1]]);
        let d = DistanceBuilder::new(&s);

        let asym = d.abundance(MatrixKind::Asymmetrical);
        assert_eq!(asym[(0, 1)], 1.0); // 2 of bank 0's 2 shared
        assert_eq!(asym[(1, 0)], 1.0); // 1 of bank 1's 1 shared

        let norm = d.abundance(MatrixKind::Normalized);
        assert!((norm[(0, 1)] - 1.0).abs() < 1e-12); // (2+1)/(2+1)
        assert_eq!(norm[(0, 1)], norm[(1, 0)]);
    }

    /* --------------------------------------------------------------------- */
    /*  bray-curtis                                                          */
    /* --------------------------------------------------------------------- */

    #[test]
    fn bray_curtis_matches_hand_computed_value() {
        let s = stats_from(2, &[&[2, 1]]);
        let d = DistanceBuilder::new(&s);
        let bc = d.bray_curtis();
        // 2·min(2,1) / (2 + 1)
        assert!((bc[(0, 1)] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(bc[(0, 1)], bc[(1, 0)]);
        assert_eq!(bc[(0, 0)], 1.0);
    }

    #[test]
    fn bray_curtis_stays_within_bounds() {
        let s = stats_from(3, &[&[2, 1, 0], &[0, 3, 1], &[5, 0, 0], &[1, 1, 1]]);
        let bc = DistanceBuilder::new(&s).bray_curtis();
        for i in 0..3 {
            for j in 0..3 {
                assert!(bc[(i, j)] >= 0.0 && bc[(i, j)] <= 1.0);
            }
        }
    }

    /* --------------------------------------------------------------------- */
    /*  degenerate inputs                                                    */
    /* --------------------------------------------------------------------- */

    #[test]
    fn empty_bank_divides_to_zero() {
        // bank 1 never holds a k-mer
        let s = stats_from(2, &[&[2, 0]]);
        let d = DistanceBuilder::new(&s);

        assert_eq!(d.presence_absence(MatrixKind::Asymmetrical)[(1, 0)], 0.0);
        assert_eq!(d.presence_absence(MatrixKind::Normalized)[(1, 1)], 0.0);
        assert_eq!(d.abundance(MatrixKind::Asymmetrical)[(1, 1)], 0.0);
        assert_eq!(d.bray_curtis()[(1, 1)], 0.0);
    }

    #[test]
    fn no_input_at_all_yields_all_zero_matrices() {
        let s = Stats::new(2);
        let d = DistanceBuilder::new(&s);
        let bc = d.bray_curtis();
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(bc[(i, j)], 0.0);
            }
        }
    }
}
