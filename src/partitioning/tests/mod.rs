use super::*;
#[path = "partition_property_tests.rs"]
mod partition_property_tests;

#[test]
fn reference_split_is_even() {
    let p = GridPartitioner::new(2000, 4, RemainderPolicy::LastAbsorbs).unwrap();
    assert!(p.is_uniform());
    let bands = p.partitions();
    assert_eq!(bands.len(), 4);
    for (rank, band) in bands.iter().enumerate() {
        assert_eq!(band.row_count, 500);
        assert_eq!(band.global_row_offset, rank * 500);
    }
}

#[test]
fn last_rank_absorbs_remainder() {
    let p = GridPartitioner::new(10, 3, RemainderPolicy::LastAbsorbs).unwrap();
    let rows: Vec<_> = p.partitions().iter().map(|b| b.row_count).collect();
    assert_eq!(rows, vec![3, 3, 4]);
    let last = p.partition(2).unwrap();
    assert_eq!(last.global_row_offset, 6);
    assert_eq!(last.end(), 10);
    assert!(!p.is_uniform());
}

#[test]
fn spread_policy_front_loads_remainder() {
    let p = GridPartitioner::new(11, 4, RemainderPolicy::Spread).unwrap();
    let bands = p.partitions();
    let rows: Vec<_> = bands.iter().map(|b| b.row_count).collect();
    let offsets: Vec<_> = bands.iter().map(|b| b.global_row_offset).collect();
    assert_eq!(rows, vec![3, 3, 3, 2]);
    assert_eq!(offsets, vec![0, 3, 6, 9]);
}

#[test]
fn single_worker_owns_everything() {
    let p = GridPartitioner::new(7, 1, RemainderPolicy::LastAbsorbs).unwrap();
    let band = p.partition(0).unwrap();
    assert_eq!(band.row_count, 7);
    assert_eq!(band.global_row_offset, 0);
    assert_eq!(band.upper(), None);
    assert_eq!(band.lower(), None);
}

#[test]
fn neighbours_follow_rank_order() {
    let p = GridPartitioner::new(9, 3, RemainderPolicy::LastAbsorbs).unwrap();
    let mid = p.partition(1).unwrap();
    assert_eq!(mid.upper(), Some(0));
    assert_eq!(mid.lower(), Some(2));
    assert_eq!(mid.global_row(1), 3);
    assert_eq!(mid.global_row(3), 5);
    assert!(mid.contains(5));
    assert!(!mid.contains(6));
}

#[test]
fn topology_errors_fail_fast() {
    assert_eq!(
        GridPartitioner::new(8, 0, RemainderPolicy::LastAbsorbs),
        Err(PartitionError::ZeroWorkers)
    );
    assert_eq!(
        GridPartitioner::new(3, 4, RemainderPolicy::Spread),
        Err(PartitionError::TooFewRows { n: 3, workers: 4 })
    );
    let p = GridPartitioner::new(8, 2, RemainderPolicy::LastAbsorbs).unwrap();
    assert_eq!(
        p.partition(2),
        Err(PartitionError::RankOutOfRange { rank: 2, workers: 2 })
    );
}

#[test]
fn real_rows_map_to_global_rows() {
    let p = GridPartitioner::new(10, 3, RemainderPolicy::LastAbsorbs).unwrap();
    let band = p.partition(1).unwrap();
    assert_eq!(band.global_row(1), 3);
    assert_eq!(band.global_row(band.row_count), 5);
    assert!(band.contains(band.global_row(2)));
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "not a real row")]
fn ghost_row_has_no_global_index() {
    let p = GridPartitioner::new(10, 3, RemainderPolicy::LastAbsorbs).unwrap();
    p.partition(0).unwrap().global_row(0);
}
