//! Chair pool - the bounded resource players race for
//!
//! A counting pool backed by [`tokio::sync::Semaphore`]. Players only ever
//! take chairs without blocking; the coordinator replaces the whole pool
//! between rounds with [`ChairPool::reset`].

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::GameError;

/// Counting pool of chairs available in the current round
#[derive(Debug)]
pub struct ChairPool {
    permits: Semaphore,

    /// Capacity granted by the last reset
    round_capacity: AtomicUsize,

    /// Chairs taken since the last reset, used to number seats
    taken: AtomicUsize,
}

impl ChairPool {
    /// Create a pool holding `capacity` chairs
    pub fn new(capacity: usize) -> Result<Self, GameError> {
        debug!(capacity, "ChairPool::new: called");
        check_capacity(capacity)?;
        Ok(Self {
            permits: Semaphore::new(capacity),
            round_capacity: AtomicUsize::new(capacity),
            taken: AtomicUsize::new(0),
        })
    }

    /// Try to take one chair without waiting
    ///
    /// Returns true and consumes a chair if one is free.
    pub fn try_acquire(&self) -> bool {
        self.try_take().is_some()
    }

    /// Try to take one chair, returning its 1-based ordinal for this round
    pub fn try_take(&self) -> Option<usize> {
        match self.permits.try_acquire() {
            Ok(permit) => {
                // A taken chair stays taken until the next reset
                permit.forget();
                let chair = self.taken.fetch_add(1, Ordering::AcqRel) + 1;
                debug!(chair, "ChairPool::try_take: acquired");
                Some(chair)
            }
            Err(_) => {
                debug!("ChairPool::try_take: no chairs left");
                None
            }
        }
    }

    /// Drain any leftover chairs and refill the pool with `new_capacity`
    ///
    /// Must only be called while no player is mid-attempt.
    pub fn reset(&self, new_capacity: usize) -> Result<(), GameError> {
        debug!(new_capacity, "ChairPool::reset: called");
        check_capacity(new_capacity)?;

        let drained = self.permits.forget_permits(self.permits.available_permits());
        self.permits.add_permits(new_capacity);
        self.round_capacity.store(new_capacity, Ordering::Release);
        self.taken.store(0, Ordering::Release);

        let available = self.permits.available_permits();
        if available != new_capacity {
            return Err(GameError::invariant(format!(
                "chair pool reset to {} but {} chairs available; an attempt raced the reset",
                new_capacity, available
            )));
        }

        debug!(drained, new_capacity, "ChairPool::reset: done");
        Ok(())
    }

    /// Reset from a signed count, clamping negatives to zero
    pub fn reset_signed(&self, new_capacity: i64) -> Result<(), GameError> {
        debug!(new_capacity, "ChairPool::reset_signed: called");
        let clamped = if new_capacity < 0 {
            warn!(new_capacity, "ChairPool::reset_signed: negative capacity clamped to 0");
            0
        } else {
            usize::try_from(new_capacity)
                .map_err(|_| GameError::invariant(format!("chair capacity {} out of range", new_capacity)))?
        };
        self.reset(clamped)
    }

    /// Chairs still free in this round
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Chairs granted by the last reset
    pub fn capacity(&self) -> usize {
        self.round_capacity.load(Ordering::Acquire)
    }

    /// Chairs taken since the last reset
    pub fn taken(&self) -> usize {
        self.taken.load(Ordering::Acquire)
    }
}

fn check_capacity(capacity: usize) -> Result<(), GameError> {
    if capacity > Semaphore::MAX_PERMITS {
        return Err(GameError::invariant(format!(
            "chair capacity {} exceeds the maximum of {}",
            capacity,
            Semaphore::MAX_PERMITS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use proptest::prelude::*;
    use tokio::sync::Barrier;

    #[test]
    fn test_acquire_until_empty() {
        let pool = ChairPool::new(2).unwrap();
        assert_eq!(pool.try_take(), Some(1));
        assert_eq!(pool.try_take(), Some(2));
        assert!(!pool.try_acquire());
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.taken(), 2);
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn test_failed_acquire_does_not_mutate() {
        let pool = ChairPool::new(0).unwrap();
        assert!(!pool.try_acquire());
        assert!(!pool.try_acquire());
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.taken(), 0);
    }

    #[test]
    fn test_reset_drains_leftovers() {
        let pool = ChairPool::new(3).unwrap();
        assert!(pool.try_acquire());

        // Two chairs left over, the next round only gets one
        pool.reset(1).unwrap();
        assert_eq!(pool.available(), 1);
        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.taken(), 0);
        assert_eq!(pool.try_take(), Some(1));
        assert!(!pool.try_acquire());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let pool = ChairPool::new(3).unwrap();
        pool.reset(2).unwrap();
        pool.reset(2).unwrap();
        assert_eq!(pool.available(), 2);

        pool.reset(5).unwrap();
        pool.reset(1).unwrap();
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_reset_signed_clamps_negative() {
        let pool = ChairPool::new(3).unwrap();
        pool.reset_signed(-4).unwrap();
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.capacity(), 0);

        pool.reset_signed(2).unwrap();
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn test_rejects_oversized_capacity() {
        assert!(ChairPool::new(usize::MAX).unwrap_err().is_invariant_violation());

        let pool = ChairPool::new(1).unwrap();
        assert!(pool.reset(usize::MAX).unwrap_err().is_invariant_violation());
        // Rejected reset leaves the pool untouched
        assert_eq!(pool.available(), 1);
    }

    async fn race(capacity: usize, callers: usize) -> (usize, Vec<usize>) {
        let pool = Arc::new(ChairPool::new(capacity).unwrap());
        let barrier = Arc::new(Barrier::new(callers));

        let mut handles = Vec::with_capacity(callers);
        for _ in 0..callers {
            let pool = pool.clone();
            let barrier = barrier.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                pool.try_take()
            }));
        }

        let mut chairs = Vec::new();
        for handle in handles {
            if let Some(chair) = handle.await.unwrap() {
                chairs.push(chair);
            }
        }
        chairs.sort_unstable();
        (pool.available(), chairs)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_acquire_exactly_capacity() {
        let (left, chairs) = race(5, 32).await;
        assert_eq!(left, 0);
        assert_eq!(chairs, vec![1, 2, 3, 4, 5]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_exactly_k_of_m_succeed(capacity in 0usize..12, extra in 0usize..12) {
            let callers = capacity + extra + 1;
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(4)
                .enable_all()
                .build()
                .unwrap();

            let (left, chairs) = rt.block_on(race(capacity, callers));

            // No double grant: ordinals are exactly 1..=capacity
            prop_assert_eq!(chairs, (1..=capacity).collect::<Vec<_>>());
            prop_assert_eq!(left, 0);
        }
    }
}
