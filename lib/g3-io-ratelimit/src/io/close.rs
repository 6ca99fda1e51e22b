/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, IoSliceMut, Read, Write};
use std::net::{Shutdown, TcpStream};

use super::RateLimitedWriter;
use crate::limit::RateLimit;

/// A sink that can be closed explicitly.
///
/// Calling `close` more than once is up to the implementation.
pub trait Close {
    fn close(&mut self) -> io::Result<()>;
}

impl<T: Close + ?Sized> Close for &mut T {
    #[inline]
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<T: Close + ?Sized> Close for Box<T> {
    #[inline]
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl Close for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// A [`RateLimitedWriter`] that also forwards [`Close`].
///
/// Closing never touches the limiter. Reads are passed through untouched.
pub struct RateLimitedWriteCloser<W, L> {
    inner: RateLimitedWriter<W, L>,
}

impl<W, L> RateLimitedWriteCloser<W, L> {
    pub fn new(inner: W, limiter: L) -> Self {
        RateLimitedWriteCloser {
            inner: RateLimitedWriter::new(inner, limiter),
        }
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        self.inner.get_mut()
    }

    #[inline]
    pub fn limiter(&self) -> &L {
        self.inner.limiter()
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }

    pub fn into_parts(self) -> (W, L) {
        self.inner.into_parts()
    }
}

impl<W, L> From<RateLimitedWriter<W, L>> for RateLimitedWriteCloser<W, L>
where
    W: Close,
{
    fn from(inner: RateLimitedWriter<W, L>) -> Self {
        RateLimitedWriteCloser { inner }
    }
}

impl<W, L> Write for RateLimitedWriteCloser<W, L>
where
    W: Write,
    L: RateLimit,
{
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write + Read, L> Read for RateLimitedWriteCloser<W, L> {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    #[inline]
    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        self.inner.read_vectored(bufs)
    }
}

impl<W: Close, L> Close for RateLimitedWriteCloser<W, L> {
    fn close(&mut self) -> io::Result<()> {
        self.inner.get_mut().close()
    }
}
