//! Execution of per-record stages.
//!
//! Stages are pure functions over one record, so they can run on a single
//! thread or be fanned out with Rayon. Both modes return results in input
//! order and produce identical output.

use crate::combiners::CombineFn;
use anyhow::{Context, Result};
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecMode {
    #[default]
    Sequential,
    Parallel { threads: Option<usize> },
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Runner {
    pub mode: ExecMode,
}

impl Runner {
    #[must_use]
    pub const fn new(mode: ExecMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub const fn sequential() -> Self {
        Self::new(ExecMode::Sequential)
    }

    /// Apply `f` to every element, preserving input order.
    ///
    /// # Errors
    /// Returns an error only if a dedicated thread pool was requested and
    /// could not be built.
    pub fn map<T, U, F>(&self, items: Vec<T>, f: F) -> Result<Vec<U>>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> U + Send + Sync,
    {
        match self.mode {
            ExecMode::Sequential => Ok(items.into_iter().map(f).collect()),
            ExecMode::Parallel { threads } => {
                install(threads, || items.into_par_iter().map(&f).collect())
            }
        }
    }

    /// Fold `items` through a combiner.
    ///
    /// The parallel path builds one accumulator per Rayon split and merges
    /// them, so `comb.merge` must be associative.
    ///
    /// # Errors
    /// See [`Runner::map`].
    pub fn combine<'a, T, C, A, O>(&self, items: &'a [T], comb: &C) -> Result<O>
    where
        T: Sync,
        C: CombineFn<&'a T, A, O> + Sync,
        A: Send,
    {
        match self.mode {
            ExecMode::Sequential => {
                let mut acc = comb.create();
                for item in items {
                    comb.add_input(&mut acc, item);
                }
                Ok(comb.finish(acc))
            }
            ExecMode::Parallel { threads } => {
                let acc = install(threads, || {
                    items
                        .par_iter()
                        .fold(
                            || comb.create(),
                            |mut acc, item| {
                                comb.add_input(&mut acc, item);
                                acc
                            },
                        )
                        .reduce(
                            || comb.create(),
                            |mut a, b| {
                                comb.merge(&mut a, b);
                                a
                            },
                        )
                })?;
                Ok(comb.finish(acc))
            }
        }
    }
}

/// Run `op` on a dedicated pool of `threads` workers, or on the global pool.
fn install<R, F>(threads: Option<usize>, op: F) -> Result<R>
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match threads {
        Some(t) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(t.max(1))
                .build()
                .with_context(|| format!("build thread pool with {t} threads"))?;
            Ok(pool.install(op))
        }
        None => Ok(op()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combiners::Sum;

    #[test]
    fn parallel_map_preserves_order() -> Result<()> {
        let input: Vec<i64> = (0..1000).collect();
        let seq = Runner::sequential().map(input.clone(), |x| x * 3)?;
        let par = Runner::new(ExecMode::Parallel { threads: Some(4) }).map(input, |x| x * 3)?;
        assert_eq!(seq, par);
        assert_eq!(par[999], 2997);
        Ok(())
    }

    #[test]
    fn parallel_combine_matches_sequential() -> Result<()> {
        let input: Vec<i64> = (1..=500).collect();
        let comb = Sum::by(|x: &i64| *x);
        let seq = Runner::sequential().combine(&input, &comb)?;
        let par = Runner::new(ExecMode::Parallel { threads: None }).combine(&input, &comb)?;
        assert_eq!(seq, 125_250);
        assert_eq!(seq, par);
        Ok(())
    }
}
