/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;
use governor::Quota;
use humanize_rs::bytes::Bytes;

/// Byte rate for [`GovernorByteLimiter`](super::GovernorByteLimiter), one cell per byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ByteRateQuota(Quota);

impl ByteRateQuota {
    pub const fn per_second(bytes: NonZeroU32) -> Self {
        ByteRateQuota(Quota::per_second(bytes))
    }

    pub fn per_minute(bytes: NonZeroU32) -> Self {
        ByteRateQuota(Quota::per_minute(bytes))
    }

    pub fn per_hour(bytes: NonZeroU32) -> Self {
        ByteRateQuota(Quota::per_hour(bytes))
    }

    /// Replenish one byte per `replenish_1_per`, returns None for a zero period.
    pub fn with_period(replenish_1_per: Duration) -> Option<Self> {
        Quota::with_period(replenish_1_per).map(ByteRateQuota)
    }

    fn per_interval(interval: Duration, bytes: NonZeroU32) -> anyhow::Result<Self> {
        let period = interval / bytes.get();
        // governor keeps both the period and the burst window as u64 nanoseconds
        let period_nanos = u64::try_from(period.as_nanos())
            .map_err(|_| anyhow!("interval {interval:?} is too long for {bytes} bytes"))?;
        period_nanos
            .checked_mul(u64::from(bytes.get()))
            .ok_or_else(|| anyhow!("burst window of {bytes} bytes per {interval:?} is too long"))?;
        let mut quota = ByteRateQuota::with_period(period)
            .ok_or_else(|| anyhow!("interval {interval:?} is too short for {bytes} bytes"))?;
        quota.allow_burst(bytes);
        Ok(quota)
    }

    pub fn allow_burst(&mut self, max_burst: NonZeroU32) {
        self.0 = self.0.allow_burst(max_burst);
    }

    #[inline]
    pub fn burst_size(&self) -> NonZeroU32 {
        self.0.burst_size()
    }

    pub fn get_inner(&self) -> Quota {
        self.0
    }
}

fn parse_bytes(s: &str) -> anyhow::Result<NonZeroU32> {
    let v = s
        .trim()
        .parse::<Bytes<u32>>()
        .map_err(|e| anyhow!("invalid byte size {s}: {e:?}"))?;
    NonZeroU32::new(v.size()).ok_or_else(|| anyhow!("byte size should not be zero"))
}

impl FromStr for ByteRateQuota {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((v1, v2)) => {
                let bytes = parse_bytes(v1)?;
                let interval_s = v2.trim();
                match interval_s {
                    "s" => Ok(ByteRateQuota::per_second(bytes)),
                    "m" => Ok(ByteRateQuota::per_minute(bytes)),
                    "h" => Ok(ByteRateQuota::per_hour(bytes)),
                    _ => {
                        if let Ok(seconds) = u64::from_str(interval_s) {
                            ByteRateQuota::per_interval(Duration::from_secs(seconds), bytes)
                        } else if let Ok(interval) = humanize_rs::duration::parse(interval_s) {
                            ByteRateQuota::per_interval(interval, bytes)
                        } else {
                            Err(anyhow!("invalid interval value {v2}"))
                        }
                    }
                }
            }
            None => Ok(ByteRateQuota::per_second(parse_bytes(s)?)),
        }
    }
}
