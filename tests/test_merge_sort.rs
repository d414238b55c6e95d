#[cfg(test)]
mod merge_sort_tests {
    use kmersim::kmersim::merge::{merge_buckets, AbundanceVector};
    use kmersim::kmersim::sort::{sort_buckets, RadixBuckets};

    fn empty_buckets() -> RadixBuckets<u64> {
        RadixBuckets {
            kmers: vec![Vec::new(); 256],
            bank_ids: vec![Vec::new(); 256],
        }
    }

    /// Run the merger and collect every emission.
    fn collect(buckets: &RadixBuckets<u64>, nb_banks: usize) -> Vec<(u64, Vec<u32>)> {
        let mut counter = AbundanceVector::new(nb_banks);
        let mut out = Vec::new();
        merge_buckets(buckets, &mut counter, |kmer, counts| {
            out.push((kmer, counts.to_vec()));
            Ok(())
        })
        .unwrap();
        out
    }

    /* --------------------------------------------------------------------- */
    /*  sorting                                                              */
    /* --------------------------------------------------------------------- */

    #[test]
    fn sort_keeps_kmers_and_bank_ids_in_lockstep() {
        let mut buckets = empty_buckets();
        buckets.kmers[7] = vec![30, 10, 20];
        buckets.bank_ids[7] = vec![0, 1, 2];

        sort_buckets(&mut buckets, 4);

        assert_eq!(buckets.kmers[7], vec![10, 20, 30]);
        assert_eq!(buckets.bank_ids[7], vec![1, 2, 0]);
    }

    #[test]
    fn sort_touches_every_bucket_regardless_of_core_count() {
        for nb_cores in [1, 3, 8, 300] {
            let mut buckets = empty_buckets();
            for radix in [0usize, 100, 255] {
                buckets.kmers[radix] = vec![9, 3, 6];
                buckets.bank_ids[radix] = vec![0, 0, 0];
            }
            sort_buckets(&mut buckets, nb_cores);
            for radix in [0usize, 100, 255] {
                assert_eq!(buckets.kmers[radix], vec![3, 6, 9]);
            }
        }
    }

    /* --------------------------------------------------------------------- */
    /*  merging                                                              */
    /* --------------------------------------------------------------------- */

    #[test]
    fn empty_partition_emits_nothing() {
        let buckets = empty_buckets();
        assert!(collect(&buckets, 2).is_empty());
    }

    #[test]
    fn single_kmer_is_flushed_once() {
        let mut buckets = empty_buckets();
        buckets.kmers[0] = vec![42];
        buckets.bank_ids[0] = vec![1];

        let out = collect(&buckets, 3);
        assert_eq!(out, vec![(42, vec![0, 1, 0])]);
    }

    #[test]
    fn equal_kmers_collapse_into_one_abundance_vector() {
        let mut buckets = empty_buckets();
        buckets.kmers[0] = vec![5, 5, 5, 8];
        buckets.bank_ids[0] = vec![0, 1, 0, 1];

        let out = collect(&buckets, 2);
        assert_eq!(out, vec![(5, vec![2, 1]), (8, vec![0, 1])]);
    }

    #[test]
    fn groups_spanning_buckets_stay_distinct() {
        // ascending radix order concatenates into one ordered stream
        let mut buckets = empty_buckets();
        buckets.kmers[1] = vec![1 << 56, (1 << 56) + 1];
        buckets.bank_ids[1] = vec![0, 0];
        buckets.kmers[4] = vec![4 << 56];
        buckets.bank_ids[4] = vec![1];

        let out = collect(&buckets, 2);
        assert_eq!(
            out,
            vec![
                (1 << 56, vec![1, 0]),
                ((1 << 56) + 1, vec![1, 0]),
                (4 << 56, vec![0, 1]),
            ]
        );
    }

    #[test]
    fn collapse_is_insensitive_to_tie_order() {
        // the same multiset with bank ids interleaved differently
        let mut left = empty_buckets();
        left.kmers[0] = vec![5, 5, 5];
        left.bank_ids[0] = vec![0, 0, 1];

        let mut right = empty_buckets();
        right.kmers[0] = vec![5, 5, 5];
        right.bank_ids[0] = vec![1, 0, 0];

        assert_eq!(collect(&left, 2), collect(&right, 2));
    }
}
