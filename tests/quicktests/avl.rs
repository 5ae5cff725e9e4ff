use avl_bst::AvlMap;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use std::collections::{BTreeMap, HashSet};

use crate::Op;

/// Applies a set of operations to an `AvlMap` and a `BTreeMap`.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same entries in both, and the tree is still an AVL tree.
fn do_ops<K, V>(ops: &[Op<K, V>], avl: &mut AvlMap<K, V>, map: &mut BTreeMap<K, V>)
where
    K: Clone + Ord + std::fmt::Debug,
    V: Clone + PartialEq + std::fmt::Debug,
{
    for op in ops {
        match op {
            Op::Insert(k, v) => {
                assert_eq!(avl.insert(k.clone(), v.clone()), map.insert(k.clone(), v.clone()));
            }
            Op::Remove(k) => {
                assert_eq!(avl.remove(k), map.remove(k));
            }
        }
        if let Err(err) = avl.check_invariants() {
            panic!("{err} after {op:?}");
        }
    }
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8, i8>>) -> bool {
    crate::init_logging();
    let mut avl = AvlMap::new();
    let mut map = BTreeMap::new();

    do_ops(&ops, &mut avl, &mut map);
    avl.iter().eq(map.iter()) && avl.len() == map.len()
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let mut map = AvlMap::new();
    for x in &xs {
        map.insert(*x, *x);
    }

    xs.iter().all(|x| map.get(x) == Some(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let mut map = AvlMap::new();
    for x in &xs {
        map.insert(*x, *x);
    }
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| map.get(x).is_none() && map.try_get(x).is_err())
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut map = AvlMap::new();
    for x in &xs {
        map.insert(*x, *x);
    }
    for delete in &deletes {
        map.remove(delete);
        map.check_invariants().unwrap();
    }

    let mut still_present = xs;
    for delete in &deletes {
        // We may have inserted the same value multiple times - delete each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    deletes.iter().all(|x| map.get(x).is_none())
        && still_present.iter().all(|x| map.get(x).is_some())
}

#[quickcheck]
fn insert_all_then_remove_all(keys: Vec<u32>, seed: u64) -> TestResult {
    let keys: Vec<u32> = keys
        .into_iter()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    if keys.is_empty() {
        return TestResult::discard();
    }

    let mut map = AvlMap::new();
    for key in &keys {
        map.insert(*key, ());
    }
    map.check_invariants().unwrap();
    assert_eq!(map.len(), keys.len());

    let mut order = keys.clone();
    order.shuffle(&mut rand::rngs::StdRng::seed_from_u64(seed));
    for key in &order {
        assert_eq!(map.remove(key), Some(()));
        map.check_invariants().unwrap();
    }

    TestResult::from_bool(map.is_empty() && map.len() == 0 && map.iter().next().is_none())
}

#[quickcheck]
fn overwriting_keeps_one_entry(xs: Vec<i16>) -> bool {
    let mut map = AvlMap::new();
    for x in &xs {
        map.insert(*x, 0);
    }
    let height = map.height();
    let len = map.len();

    for (i, x) in xs.iter().enumerate() {
        map.insert(*x, i + 1);
    }

    map.len() == len
        && map.height() == height
        && xs
            .iter()
            .all(|x| map[x] == xs.iter().rposition(|y| y == x).unwrap() + 1)
}

#[quickcheck]
fn height_is_logarithmic(xs: Vec<u32>, deletes: Vec<u32>) -> bool {
    let mut map: AvlMap<_, _> = xs.into_iter().map(|x| (x, ())).collect();
    for delete in &deletes {
        map.remove(delete);
    }

    let bound = 1.44 * ((map.len() + 2) as f64).log2();
    map.height() as f64 <= bound
}

#[test]
fn sorted_inserts_stay_shallow() {
    let mut map = AvlMap::new();
    for key in 0..(1 << 12) {
        map.insert(key, key);
    }
    map.check_invariants().unwrap();
    // 2^12 keys inserted in order form a nearly full tree.
    assert!(map.height() <= 13);

    for key in (0..(1 << 12)).rev().step_by(2) {
        assert_eq!(map.remove(&key), Some(key));
    }
    map.check_invariants().unwrap();
    assert_eq!(map.len(), 1 << 11);
}
