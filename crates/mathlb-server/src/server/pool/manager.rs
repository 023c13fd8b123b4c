//! Round-robin pool of worker connections.
//!
//! [`WorkerPool`] owns the ordered list of workers that survived startup and a
//! single cursor naming the next one to hand out. The list never changes after
//! construction; the cursor is the only mutable state and is guarded by one
//! mutex, held just long enough to read, increment and wrap it.
//!
//! The pool has no notion of worker health. A connection whose worker has
//! gone away is still returned in turn, and the failure surfaces on the call
//! that uses it.

use mathlb_core::Error;
use parking_lot::Mutex;
use tonic::transport::Channel;

/// One pooled worker: the address it was dialed at and its connection.
#[derive(Debug, Clone)]
pub struct Worker<C = Channel> {
    address: String,
    connection: C,
}

impl<C> Worker<C> {
    pub const fn new(address: String, connection: C) -> Self {
        Self {
            address,
            connection,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub const fn connection(&self) -> &C {
        &self.connection
    }
}

/// Fixed, ordered set of worker connections handed out in round-robin order.
///
/// `C` is the connection handle; in the server it is a tonic [`Channel`],
/// which is cheap to clone and shares one HTTP/2 connection.
#[derive(Debug)]
pub struct WorkerPool<C = Channel> {
    workers: Vec<Worker<C>>,
    cursor: Mutex<usize>,
}

impl<C> WorkerPool<C> {
    /// Creates a pool over `workers`, in the order given. The cursor starts at
    /// the first worker.
    pub fn new(workers: Vec<Worker<C>>) -> Self {
        Self {
            workers,
            cursor: Mutex::new(0),
        }
    }

    /// Returns the worker under the cursor and advances the cursor by one,
    /// wrapping at the end of the list.
    ///
    /// The worker is borrowed from the pool, so selecting one never copies
    /// its address or connection. Concurrent callers each observe a distinct
    /// cursor position; no update is lost.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPool`] if no worker survived startup.
    pub fn next(&self) -> Result<&Worker<C>, Error> {
        if self.workers.is_empty() {
            return Err(Error::EmptyPool);
        }

        let index = {
            let mut cursor = self.cursor.lock();
            let index = *cursor;
            *cursor = (index + 1) % self.workers.len();
            index
        };

        Ok(&self.workers[index])
    }

    /// Current cursor position, i.e. the index [`next`](Self::next) will
    /// return.
    pub fn cursor(&self) -> usize {
        *self.cursor.lock()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::thread::scope;

    fn pool(names: &[&str]) -> WorkerPool<usize> {
        WorkerPool::new(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| Worker::new(name.to_string(), i))
                .collect(),
        )
    }

    fn take(pool: &WorkerPool<usize>, n: usize) -> Vec<String> {
        (0..n)
            .map(|_| pool.next().unwrap().address().to_string())
            .collect()
    }

    #[test]
    fn one_cycle_visits_every_worker_in_order() {
        let pool = pool(&["a:1", "b:1", "c:1"]);
        assert_eq!(take(&pool, 3), ["a:1", "b:1", "c:1"]);
    }

    #[test]
    fn six_calls_cycle_twice() {
        let pool = pool(&["a:1", "b:1", "c:1"]);
        assert_eq!(take(&pool, 6), ["a:1", "b:1", "c:1", "a:1", "b:1", "c:1"]);
    }

    #[test]
    fn cycle_starts_wherever_the_cursor_stopped() {
        let pool = pool(&["a:1", "b:1", "c:1"]);
        pool.next().unwrap();
        assert_eq!(pool.cursor(), 1);
        assert_eq!(take(&pool, 3), ["b:1", "c:1", "a:1"]);
    }

    #[test]
    fn cursor_wraps_after_a_full_cycle() {
        let pool = pool(&["a:1", "b:1", "c:1", "d:1"]);
        let start = pool.cursor();
        for _ in 0..pool.len() {
            pool.next().unwrap();
            assert!(pool.cursor() < pool.len());
        }
        assert_eq!(pool.cursor(), start);
    }

    #[test]
    fn selection_is_deterministic() {
        let first = take(&pool(&["a:1", "b:1", "c:1"]), 10);
        let second = take(&pool(&["a:1", "b:1", "c:1"]), 10);
        assert_eq!(first, second);
    }

    #[test]
    fn single_worker_is_always_selected() {
        let pool = pool(&["only:1"]);
        assert_eq!(take(&pool, 3), ["only:1", "only:1", "only:1"]);
        assert_eq!(pool.cursor(), 0);
    }

    #[test]
    fn empty_pool_fails_explicitly() {
        let pool = pool(&[]);
        assert!(pool.is_empty());
        assert_eq!(pool.next().unwrap_err(), Error::EmptyPool);
        assert_eq!(pool.next().unwrap_err(), Error::EmptyPool);
    }

    #[test]
    fn returns_the_registered_connection() {
        let pool = pool(&["a:1", "b:1"]);
        assert_eq!(*pool.next().unwrap().connection(), 0);
        assert_eq!(*pool.next().unwrap().connection(), 1);
    }

    #[test]
    fn selection_borrows_the_pooled_worker() {
        let pool = pool(&["a:1", "b:1"]);
        let first = pool.next().unwrap();
        pool.next().unwrap();
        let again = pool.next().unwrap();
        assert!(core::ptr::eq(first, again));
        assert!(core::ptr::eq(first.address(), again.address()));
    }

    #[test]
    fn concurrent_callers_share_the_cycle_fairly() {
        const THREADS: usize = 8;
        const CALLS_PER_THREAD: usize = 3_000;
        let names = ["a:1", "b:1", "c:1", "d:1", "e:1", "f:1"];
        let pool = &pool(&names);

        let picks: Vec<usize> = scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(move || {
                        (0..CALLS_PER_THREAD)
                            .map(|_| *pool.next().unwrap().connection())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        // THREADS * CALLS_PER_THREAD is a multiple of the pool size, so a lost
        // cursor update would show up as an uneven count.
        let total = THREADS * CALLS_PER_THREAD;
        assert_eq!(picks.len(), total);
        let mut counts = HashMap::new();
        for pick in picks {
            *counts.entry(pick).or_insert(0_usize) += 1;
        }
        assert_eq!(counts.len(), names.len());
        for count in counts.values() {
            assert_eq!(*count, total / names.len());
        }
        assert_eq!(pool.cursor(), 0);
    }
}
