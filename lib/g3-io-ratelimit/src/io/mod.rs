/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod read;
pub use read::RateLimitedReader;

mod write;
pub use write::RateLimitedWriter;

mod close;
pub use close::{Close, RateLimitedWriteCloser};
