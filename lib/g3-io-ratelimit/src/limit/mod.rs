/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::Arc;

use thiserror::Error;

mod byte_limiter;
pub use byte_limiter::GovernorByteLimiter;

mod quota;
pub use quota::ByteRateQuota;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("rate limit wait aborted")]
    WaitAborted,
}

impl From<RateLimitError> for io::Error {
    fn from(e: RateLimitError) -> Self {
        // not Interrupted, which read_exact / write_all would silently retry
        io::Error::other(e)
    }
}

/// A byte allowance shared by any number of streams.
///
/// One unit is one byte. Implementations own their synchronization, so a
/// single limiter may be used from many threads and many adapters at once.
pub trait RateLimit {
    /// Block the calling thread until `units` have been granted.
    ///
    /// Any value is accepted, a request of 0 units returns at once.
    fn wait(&self, units: u64);

    /// Like [`RateLimit::wait`], but allows the limiter to give up.
    ///
    /// The default never fails. Limiters with a cancellation mechanism
    /// override this and return [`RateLimitError::WaitAborted`].
    fn try_wait(&self, units: u64) -> Result<(), RateLimitError> {
        self.wait(units);
        Ok(())
    }
}

impl<T: RateLimit + ?Sized> RateLimit for &T {
    #[inline]
    fn wait(&self, units: u64) {
        (**self).wait(units)
    }

    #[inline]
    fn try_wait(&self, units: u64) -> Result<(), RateLimitError> {
        (**self).try_wait(units)
    }
}

impl<T: RateLimit + ?Sized> RateLimit for Arc<T> {
    #[inline]
    fn wait(&self, units: u64) {
        (**self).wait(units)
    }

    #[inline]
    fn try_wait(&self, units: u64) -> Result<(), RateLimitError> {
        (**self).try_wait(units)
    }
}

impl<T: RateLimit + ?Sized> RateLimit for Box<T> {
    #[inline]
    fn wait(&self, units: u64) {
        (**self).wait(units)
    }

    #[inline]
    fn try_wait(&self, units: u64) -> Result<(), RateLimitError> {
        (**self).try_wait(units)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, PartialEq, Eq)]
    pub(crate) enum Event {
        Wait(u64),
        Read(usize),
        Write(usize),
        Flush,
        Close,
    }

    /// Records every request in a log shared with scripted streams.
    #[derive(Default, Clone)]
    pub(crate) struct Recorder {
        events: Arc<Mutex<Vec<Event>>>,
        abort: bool,
    }

    impl Recorder {
        pub(crate) fn aborting() -> Self {
            Recorder {
                events: Arc::default(),
                abort: true,
            }
        }

        pub(crate) fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }

        pub(crate) fn take(&self) -> Vec<Event> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl RateLimit for Recorder {
        fn wait(&self, units: u64) {
            self.push(Event::Wait(units));
        }

        fn try_wait(&self, units: u64) -> Result<(), RateLimitError> {
            self.wait(units);
            if self.abort {
                Err(RateLimitError::WaitAborted)
            } else {
                Ok(())
            }
        }
    }

    struct Counter(Mutex<u64>);

    impl RateLimit for Counter {
        fn wait(&self, units: u64) {
            *self.0.lock().unwrap() += units;
        }
    }

    #[test]
    fn default_try_wait() {
        let c = Counter(Mutex::new(0));
        assert!(c.try_wait(7).is_ok());
        assert_eq!(*c.0.lock().unwrap(), 7);
    }

    #[test]
    fn shared_handles() {
        let c = Arc::new(Counter(Mutex::new(0)));
        c.wait(1);
        (&*c).wait(2);
        let boxed: Box<dyn RateLimit> = Box::new(c.clone());
        boxed.wait(3);
        assert_eq!(*c.0.lock().unwrap(), 6);
    }

    #[test]
    fn abort_to_io_error() {
        let e = io::Error::from(RateLimitError::WaitAborted);
        assert_eq!(e.kind(), io::ErrorKind::Other);
        let inner = e.get_ref().unwrap().downcast_ref::<RateLimitError>();
        assert_eq!(inner, Some(&RateLimitError::WaitAborted));
    }
}
