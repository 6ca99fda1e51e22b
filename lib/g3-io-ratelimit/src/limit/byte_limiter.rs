/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::num::NonZeroU32;
use std::thread;
use std::time::{Duration, Instant};

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, InsufficientCapacity, RateLimiter};
use log::{debug, trace, warn};
use tokio_util::sync::CancellationToken;

use super::{ByteRateQuota, RateLimit, RateLimitError};

const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// A [`RateLimit`] backed by a governor direct rate limiter.
///
/// Requests larger than the burst size are split into burst sized chunks.
pub struct GovernorByteLimiter {
    inner: DefaultDirectRateLimiter,
    clock: DefaultClock,
    quota: ByteRateQuota,
    cancel: Option<CancellationToken>,
}

impl GovernorByteLimiter {
    pub fn new(quota: ByteRateQuota) -> Self {
        GovernorByteLimiter {
            inner: RateLimiter::direct(quota.get_inner()),
            clock: DefaultClock::default(),
            quota,
            cancel: None,
        }
    }

    /// Let [`RateLimit::try_wait`] give up once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[inline]
    pub fn quota(&self) -> ByteRateQuota {
        self.quota
    }

    fn sleep(&self, dur: Duration, cancel: Option<&CancellationToken>) -> Result<(), RateLimitError> {
        let Some(token) = cancel else {
            thread::sleep(dur);
            return Ok(());
        };

        let deadline = Instant::now() + dur;
        loop {
            if token.is_cancelled() {
                debug!("byte limiter wait aborted with {dur:?} left");
                return Err(RateLimitError::WaitAborted);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            thread::sleep((deadline - now).min(CANCEL_CHECK_INTERVAL));
        }
    }

    fn acquire(&self, units: u64, cancel: Option<&CancellationToken>) -> Result<(), RateLimitError> {
        let mut left = units;
        let mut max_chunk = self.quota.burst_size();

        while left > 0 {
            let chunk = left.min(u64::from(max_chunk.get())) as u32;
            let Some(n) = NonZeroU32::new(chunk) else {
                break;
            };
            match self.inner.check_n(n) {
                Ok(Ok(_)) => left -= u64::from(chunk),
                Ok(Err(not_until)) => {
                    let wait = not_until.wait_time_from(self.clock.now());
                    trace!("byte limiter: {chunk} bytes not ready, sleep {wait:?}");
                    self.sleep(wait, cancel)?;
                }
                Err(InsufficientCapacity(cap)) => {
                    let Some(cap) = NonZeroU32::new(cap) else {
                        warn!("byte limiter has zero capacity, skip {left} bytes");
                        break;
                    };
                    warn!("byte limiter capacity is {cap}, but {chunk} bytes requested");
                    max_chunk = cap;
                }
            }
        }
        Ok(())
    }
}

impl RateLimit for GovernorByteLimiter {
    fn wait(&self, units: u64) {
        let r = self.acquire(units, None);
        debug_assert!(r.is_ok(), "wait without a token can not be aborted");
    }

    fn try_wait(&self, units: u64) -> Result<(), RateLimitError> {
        self.acquire(units, self.cancel.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limiter(s: &str) -> GovernorByteLimiter {
        GovernorByteLimiter::new(s.parse().unwrap())
    }

    #[test]
    fn zero_units() {
        let l = limiter("1/h");
        let time_start = Instant::now();
        l.wait(0);
        assert!(l.try_wait(0).is_ok());
        assert!(time_start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn within_burst() {
        let l = limiter("10/s");
        let time_start = Instant::now();
        l.wait(5);
        l.wait(5);
        assert!(time_start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn over_burst() {
        let l = limiter("1000/s");
        let time_start = Instant::now();
        l.wait(1500);
        let elapsed = time_start.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[test]
    fn cancelled() {
        let token = CancellationToken::new();
        let l = limiter("1/h").with_cancellation(token.clone());
        assert!(l.try_wait(1).is_ok());

        token.cancel();
        let time_start = Instant::now();
        assert_eq!(l.try_wait(1), Err(RateLimitError::WaitAborted));
        assert!(time_start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn cancel_while_waiting() {
        let token = CancellationToken::new();
        let l = Arc::new(limiter("1/h").with_cancellation(token.clone()));
        l.wait(1);

        let l2 = l.clone();
        let handle = thread::spawn(move || l2.try_wait(1));
        thread::sleep(Duration::from_millis(100));
        token.cancel();
        assert_eq!(handle.join().unwrap(), Err(RateLimitError::WaitAborted));
    }

    #[test]
    fn shared() {
        let l = Arc::new(limiter("4K/s"));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let l = l.clone();
                thread::spawn(move || l.wait(1000))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(l.quota().burst_size().get(), 4000);
    }
}
