/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, IoSlice, Read, Write};

use crate::limit::RateLimit;

/// A reader whose throughput is limited by a [`RateLimit`].
///
/// The underlying read is done first, then the limiter is asked for as many
/// units as bytes were read. Reads that return an error or 0 bytes never wait
/// on the limiter, so end of stream and errors are reported at once.
///
/// If the inner type is also a writer, writes are passed through untouched.
pub struct RateLimitedReader<R, L> {
    inner: R,
    limiter: L,
}

impl<R, L> RateLimitedReader<R, L> {
    pub fn new(inner: R, limiter: L) -> Self {
        RateLimitedReader { inner, limiter }
    }

    #[inline]
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    #[inline]
    pub fn limiter(&self) -> &L {
        &self.limiter
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn into_parts(self) -> (R, L) {
        (self.inner, self.limiter)
    }
}

impl<R, L> Read for RateLimitedReader<R, L>
where
    R: Read,
    L: RateLimit,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let nr = self.inner.read(buf)?;
        if nr > 0 {
            self.limiter.try_wait(nr as u64)?;
        }
        Ok(nr)
    }
}

impl<R: Read + Write, L> Write for RateLimitedReader<R, L> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        self.inner.write_vectored(bufs)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
