/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Byte stream adapters throttled by a shared rate limiter.
//!
//! Each adapter wraps a [`std::io::Read`] or [`std::io::Write`] and asks a
//! [`RateLimit`] for one unit per byte transferred. Readers account after the
//! underlying read, writers account for the whole buffer before the
//! underlying write.

mod io;
mod limit;

pub use io::*;
pub use limit::*;
