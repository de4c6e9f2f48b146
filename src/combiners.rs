//! Reusable aggregation functions.
//!
//! A [`CombineFn`] describes an aggregation as an accumulator lifecycle:
//! `create` an empty accumulator, `add_input` one value at a time, `merge`
//! two partial accumulators, and `finish` into the output. The aggregator
//! builds every statistic out of these, and the [`Runner`](crate::Runner)
//! can fold them sequentially or across Rayon splits.
//!
//! Built-in combiners:
//! - [`Count`] - number of inputs
//! - [`Sum`] - integer sum of a projected field
//! - [`Mean`] - arithmetic mean of a projected field (`None` when empty)
//! - [`Median`] - exact median of a projected field (`None` when empty)
//! - [`Rate`] - percentage of inputs matching a predicate (`None` when empty)
//! - [`GroupBy`] - runs an inner combiner per key, keys in encounter order

use std::collections::HashMap;
use std::hash::Hash;

pub trait CombineFn<V, A, O>: Send + Sync + 'static {
    fn create(&self) -> A;
    fn add_input(&self, acc: &mut A, v: V);
    fn merge(&self, acc: &mut A, other: A);
    fn finish(&self, acc: A) -> O;
}

/* ===================== Count ===================== */

#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

impl<V> CombineFn<V, u64, u64> for Count {
    fn create(&self) -> u64 {
        0
    }

    fn add_input(&self, acc: &mut u64, _v: V) {
        *acc += 1;
    }

    fn merge(&self, acc: &mut u64, other: u64) {
        *acc += other;
    }

    fn finish(&self, acc: u64) -> u64 {
        acc
    }
}

/* ===================== Sum ===================== */

/// Sum of an integer projection of each input, saturating at the `i64` bounds.
#[derive(Clone, Copy, Debug)]
pub struct Sum<F> {
    field: F,
}

impl<F> Sum<F> {
    pub const fn by(field: F) -> Self {
        Self { field }
    }
}

impl<V, F> CombineFn<V, i64, i64> for Sum<F>
where
    F: Fn(V) -> i64 + Send + Sync + 'static,
{
    fn create(&self) -> i64 {
        0
    }

    fn add_input(&self, acc: &mut i64, v: V) {
        *acc = acc.saturating_add((self.field)(v));
    }

    fn merge(&self, acc: &mut i64, other: i64) {
        *acc = acc.saturating_add(other);
    }

    fn finish(&self, acc: i64) -> i64 {
        acc
    }
}

/* ===================== Mean ===================== */

/// Arithmetic mean of an integer projection.
///
/// - Accumulator: `(sum, count)`, the sum widened to `i128`
/// - Output: `Option<f64>`, `None` for an empty input
#[derive(Clone, Copy, Debug)]
pub struct Mean<F> {
    field: F,
}

impl<F> Mean<F> {
    pub const fn by(field: F) -> Self {
        Self { field }
    }
}

impl<V, F> CombineFn<V, (i128, u64), Option<f64>> for Mean<F>
where
    F: Fn(V) -> i64 + Send + Sync + 'static,
{
    fn create(&self) -> (i128, u64) {
        (0, 0)
    }

    fn add_input(&self, acc: &mut (i128, u64), v: V) {
        acc.0 += i128::from((self.field)(v));
        acc.1 += 1;
    }

    fn merge(&self, acc: &mut (i128, u64), other: (i128, u64)) {
        acc.0 += other.0;
        acc.1 += other.1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, acc: (i128, u64)) -> Option<f64> {
        (acc.1 > 0).then(|| acc.0 as f64 / acc.1 as f64)
    }
}

/* ===================== Median ===================== */

/// Exact median of an integer projection.
///
/// Keeps every value, so memory grows with the input. For an even count the
/// median is the mean of the two middle values.
#[derive(Clone, Copy, Debug)]
pub struct Median<F> {
    field: F,
}

impl<F> Median<F> {
    pub const fn by(field: F) -> Self {
        Self { field }
    }
}

impl<V, F> CombineFn<V, Vec<i64>, Option<f64>> for Median<F>
where
    F: Fn(V) -> i64 + Send + Sync + 'static,
{
    fn create(&self) -> Vec<i64> {
        Vec::new()
    }

    fn add_input(&self, acc: &mut Vec<i64>, v: V) {
        acc.push((self.field)(v));
    }

    fn merge(&self, acc: &mut Vec<i64>, mut other: Vec<i64>) {
        acc.append(&mut other);
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, mut acc: Vec<i64>) -> Option<f64> {
        if acc.is_empty() {
            return None;
        }
        acc.sort_unstable();
        let mid = acc.len() / 2;
        if acc.len() % 2 == 1 {
            Some(acc[mid] as f64)
        } else {
            Some((acc[mid - 1] as f64 + acc[mid] as f64) / 2.0)
        }
    }
}

/* ===================== Rate ===================== */

/// Percentage (0-100) of inputs for which the predicate holds.
#[derive(Clone, Copy, Debug)]
pub struct Rate<P> {
    predicate: P,
}

impl<P> Rate<P> {
    pub const fn of(predicate: P) -> Self {
        Self { predicate }
    }
}

impl<V, P> CombineFn<V, (u64, u64), Option<f64>> for Rate<P>
where
    P: Fn(V) -> bool + Send + Sync + 'static,
{
    fn create(&self) -> (u64, u64) {
        (0, 0)
    }

    fn add_input(&self, acc: &mut (u64, u64), v: V) {
        if (self.predicate)(v) {
            acc.0 += 1;
        }
        acc.1 += 1;
    }

    fn merge(&self, acc: &mut (u64, u64), other: (u64, u64)) {
        acc.0 += other.0;
        acc.1 += other.1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, acc: (u64, u64)) -> Option<f64> {
        (acc.1 > 0).then(|| acc.0 as f64 / acc.1 as f64 * 100.0)
    }
}

/* ===================== GroupBy ===================== */

/// Accumulator for [`GroupBy`]: per-key accumulators in first-seen key order.
#[derive(Clone, Debug)]
pub struct Groups<K, A> {
    index: HashMap<K, usize>,
    entries: Vec<(K, A)>,
}

impl<K, A> Default for Groups<K, A> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, A> Groups<K, A> {
    fn slot(&mut self, key: K, create: impl FnOnce() -> A) -> &mut A {
        let found = self.index.get(&key).copied();
        let i = match found {
            Some(i) => i,
            None => {
                self.entries.push((key.clone(), create()));
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[i].1
    }
}

/// Runs `inner` separately for every distinct key.
///
/// Output groups appear in the order their key was first seen. Merging keeps
/// that property as long as partial accumulators are merged left to right.
#[derive(Clone, Copy, Debug)]
pub struct GroupBy<KF, C> {
    key: KF,
    inner: C,
}

impl<KF, C> GroupBy<KF, C> {
    pub const fn new(key: KF, inner: C) -> Self {
        Self { key, inner }
    }
}

impl<V, K, KF, C, A, O> CombineFn<V, Groups<K, A>, Vec<(K, O)>> for GroupBy<KF, C>
where
    V: Clone,
    K: Eq + Hash + Clone,
    KF: Fn(V) -> K + Send + Sync + 'static,
    C: CombineFn<V, A, O>,
{
    fn create(&self) -> Groups<K, A> {
        Groups::default()
    }

    fn add_input(&self, acc: &mut Groups<K, A>, v: V) {
        let key = (self.key)(v.clone());
        let slot = acc.slot(key, || self.inner.create());
        self.inner.add_input(slot, v);
    }

    fn merge(&self, acc: &mut Groups<K, A>, other: Groups<K, A>) {
        for (key, partial) in other.entries {
            let found = acc.index.get(&key).copied();
            match found {
                Some(i) => self.inner.merge(&mut acc.entries[i].1, partial),
                None => {
                    acc.index.insert(key.clone(), acc.entries.len());
                    acc.entries.push((key, partial));
                }
            }
        }
    }

    fn finish(&self, acc: Groups<K, A>) -> Vec<(K, O)> {
        acc.entries
            .into_iter()
            .map(|(k, a)| (k, self.inner.finish(a)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold<V, A, O>(comb: &impl CombineFn<V, A, O>, values: impl IntoIterator<Item = V>) -> O {
        let mut acc = comb.create();
        for v in values {
            comb.add_input(&mut acc, v);
        }
        comb.finish(acc)
    }

    #[test]
    fn median_odd_and_even() {
        let m = Median::by(|x: i64| x);
        assert_eq!(fold(&m, [5, 1, 3]), Some(3.0));
        assert_eq!(fold(&m, [4, 1, 3, 2]), Some(2.5));
        assert_eq!(fold(&m, Vec::<i64>::new()), None);
    }

    #[test]
    fn mean_and_rate_empty_are_none() {
        assert_eq!(fold(&Mean::by(|x: i64| x), Vec::<i64>::new()), None);
        assert_eq!(fold(&Rate::of(|b: bool| b), Vec::<bool>::new()), None);
        assert_eq!(fold(&Rate::of(|b: bool| b), [true, false, false, true]), Some(50.0));
    }

    #[test]
    fn group_by_keeps_first_seen_order_across_merge() {
        let g = GroupBy::new(|(k, _): (&'static str, i64)| k, Sum::by(|(_, v): (&'static str, i64)| v));

        let mut left = g.create();
        g.add_input(&mut left, ("b", 1));
        g.add_input(&mut left, ("a", 2));
        let mut right = g.create();
        g.add_input(&mut right, ("c", 3));
        g.add_input(&mut right, ("b", 4));

        g.merge(&mut left, right);
        assert_eq!(g.finish(left), vec![("b", 5), ("a", 2), ("c", 3)]);
    }
}
