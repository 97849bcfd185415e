//! Parallel execution helpers.

use rayon::prelude::*;

// =============================================================================
// Parallelism
// =============================================================================

/// Whether construction may fan out over rayon.
///
/// Only construction ever runs in parallel; queries are plain reads of an
/// immutable structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

impl Parallelism {
    /// Create from thread count semantics.
    ///
    /// - 0 = auto (parallel if the rayon pool has multiple threads)
    /// - 1 = sequential
    /// - >1 = parallel
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    /// Map every item, in parallel when allowed. Output order follows input order.
    #[inline]
    pub fn maybe_par_map<T, B, I, F>(self, iter: I, f: F) -> Vec<B>
    where
        T: Send,
        B: Send,
        I: IntoIterator<Item = T> + IntoParallelIterator<Item = T>,
        F: Fn(T) -> B + Sync + Send,
    {
        if self.is_parallel() {
            iter.into_par_iter().map(f).collect()
        } else {
            iter.into_iter().map(f).collect()
        }
    }
}

// =============================================================================
// Thread Pool Setup
// =============================================================================

/// Run a closure on a pool sized by `n_threads`.
///
/// Thread count semantics follow [`Parallelism::from_threads`]. When `n_threads`
/// is 0 the global rayon pool is used. If a dedicated pool cannot be created
/// the closure runs sequentially.
pub fn run_with_threads<T: Send>(n_threads: usize, f: impl FnOnce(Parallelism) -> T + Send) -> T {
    match Parallelism::from_threads(n_threads) {
        Parallelism::Sequential => f(Parallelism::Sequential),
        Parallelism::Parallel if n_threads == 0 => f(Parallelism::Parallel),
        Parallelism::Parallel => {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(n_threads)
                .build()
            {
                Ok(pool) => pool.install(|| f(Parallelism::Parallel)),
                Err(err) => {
                    tracing::warn!(
                        n_threads,
                        %err,
                        "failed to build thread pool, running sequentially"
                    );
                    f(Parallelism::Sequential)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_threads() {
        assert_eq!(Parallelism::from_threads(1), Parallelism::Sequential);
        assert_eq!(Parallelism::from_threads(4), Parallelism::Parallel);
    }

    #[test]
    fn maybe_par_map_preserves_order() {
        let input: Vec<u32> = (0..1000).collect();
        let seq = Parallelism::Sequential.maybe_par_map(&input, |&x| x * 2);
        let par = Parallelism::Parallel.maybe_par_map(&input, |&x| x * 2);
        assert_eq!(seq, par);
        assert_eq!(seq[999], 1998);
    }

    #[test]
    fn run_with_threads_reports_mode() {
        assert_eq!(run_with_threads(1, |p| p), Parallelism::Sequential);
        assert_eq!(run_with_threads(2, |p| p), Parallelism::Parallel);
        assert_eq!(run_with_threads(3, |_| rayon::current_num_threads()), 3);
    }
}
