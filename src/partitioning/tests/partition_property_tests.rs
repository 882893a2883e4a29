use proptest::prelude::*;

use crate::debug_invariants::DebugInvariants;
use crate::partitioning::{GridPartitioner, RemainderPolicy};

fn policy() -> impl Strategy<Value = RemainderPolicy> {
    prop_oneof![Just(RemainderPolicy::LastAbsorbs), Just(RemainderPolicy::Spread)]
}

proptest! {
    #[test]
    fn bands_tile_the_grid(workers in 1usize..32, extra in 0usize..200, policy in policy()) {
        let n = workers + extra;
        let p = GridPartitioner::new(n, workers, policy).unwrap();
        let bands = p.partitions();
        prop_assert_eq!(bands.len(), workers);
        prop_assert_eq!(bands.iter().map(|b| b.row_count).sum::<usize>(), n);
        for pair in bands.windows(2) {
            prop_assert_eq!(pair[0].end(), pair[1].global_row_offset);
        }
        prop_assert!(p.validate_invariants().is_ok());
    }

    #[test]
    fn only_last_rank_differs(workers in 1usize..32, extra in 0usize..200) {
        let n = workers + extra;
        let p = GridPartitioner::new(n, workers, RemainderPolicy::LastAbsorbs).unwrap();
        let base = n / workers;
        for band in p.partitions() {
            if band.rank + 1 == workers {
                prop_assert_eq!(band.row_count, n - band.rank * base);
            } else {
                prop_assert_eq!(band.row_count, base);
            }
            prop_assert_eq!(band.global_row_offset, band.rank * base);
        }
    }

    #[test]
    fn spread_bands_differ_by_at_most_one(workers in 1usize..32, extra in 0usize..200) {
        let n = workers + extra;
        let p = GridPartitioner::new(n, workers, RemainderPolicy::Spread).unwrap();
        let rows: Vec<_> = p.partitions().iter().map(|b| b.row_count).collect();
        let max = *rows.iter().max().unwrap();
        let min = *rows.iter().min().unwrap();
        prop_assert!(max - min <= 1);
    }
}
