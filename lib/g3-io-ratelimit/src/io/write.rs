/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, IoSliceMut, Read, Write};

use crate::limit::RateLimit;

/// A writer whose throughput is limited by a [`RateLimit`].
///
/// Unlike [`RateLimitedReader`](super::RateLimitedReader), the limiter is
/// asked for the whole buffer length before the underlying write. A partial
/// or failed write still consumes the full allowance.
///
/// If the inner type is also a reader, reads are passed through untouched.
pub struct RateLimitedWriter<W, L> {
    inner: W,
    limiter: L,
}

impl<W, L> RateLimitedWriter<W, L> {
    pub fn new(inner: W, limiter: L) -> Self {
        RateLimitedWriter { inner, limiter }
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    #[inline]
    pub fn limiter(&self) -> &L {
        &self.limiter
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn into_parts(self) -> (W, L) {
        (self.inner, self.limiter)
    }
}

impl<W, L> Write for RateLimitedWriter<W, L>
where
    W: Write,
    L: RateLimit,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.limiter.try_wait(buf.len() as u64)?;
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write + Read, L> Read for RateLimitedWriter<W, L> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        self.inner.read_vectored(bufs)
    }
}
