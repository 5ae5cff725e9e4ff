//! Property tests driving `AvlMap` through its public API only.

use quickcheck::{Arbitrary, Gen};

mod avl;

/// Something to do to a map.
#[derive(Clone, Debug)]
pub enum Op<K, V> {
    /// Insert the K, V into the map
    Insert(K, V),
    /// Remove the K from the map
    Remove(K),
}

impl<K, V> Arbitrary for Op<K, V>
where
    K: Arbitrary,
    V: Arbitrary,
{
    fn arbitrary(g: &mut Gen) -> Self {
        if bool::arbitrary(g) {
            Op::Insert(K::arbitrary(g), V::arbitrary(g))
        } else {
            Op::Remove(K::arbitrary(g))
        }
    }
}

/// Installs a logger that prints through the test harness, so the rotation trace shows up in
/// the output of a failing case. Only the first call in a process takes effect.
pub fn init_logging() {
    let _ = simplelog::TestLogger::init(
        simplelog::LevelFilter::Trace,
        simplelog::Config::default(),
    );
}
