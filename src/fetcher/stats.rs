// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Rolling fetch timing statistics.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Fixed-capacity window of duration samples. The oldest sample is evicted
/// when full.
#[derive(Debug, Clone)]
pub(crate) struct SampleWindow {
    samples: VecDeque<Duration>,
    capacity: usize,
}

impl SampleWindow {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, sample: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub(crate) fn summary(&self) -> DurationSummary {
        let samples = self.samples.len();
        if samples == 0 {
            return DurationSummary::default();
        }
        let sum: Duration = self.samples.iter().sum();
        DurationSummary {
            average: sum / samples as u32,
            max: self.samples.iter().copied().max().unwrap_or_default(),
            samples,
        }
    }
}

/// Average and maximum of a sample window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationSummary {
    pub average: Duration,
    pub max: Duration,
    /// Number of samples in the window
    pub samples: usize,
}

/// Point-in-time view of the fetch statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Time spent in `getLedgers`
    pub acquisition: DurationSummary,
    /// Time from ledger receipt to assembled block
    pub conversion: DurationSummary,
    /// Whole fetch, including the head wait
    pub total: DurationSummary,
    /// Time between the starts of consecutive fetches
    pub inter_call_delay: DurationSummary,
    /// Blocks fetched since the last period reset
    pub blocks_fetched_in_period: u64,
}

/// Timing statistics owned by a [`Fetcher`](super::Fetcher).
#[derive(Debug, Clone)]
pub struct FetchStats {
    acquisition: SampleWindow,
    conversion: SampleWindow,
    total: SampleWindow,
    inter_call_delay: SampleWindow,
    last_fetch_start: Option<Instant>,
    blocks_fetched_in_period: u64,
}

impl FetchStats {
    /// Creates empty statistics keeping `window` samples per metric.
    pub fn new(window: usize) -> Self {
        Self {
            acquisition: SampleWindow::new(window),
            conversion: SampleWindow::new(window),
            total: SampleWindow::new(window),
            inter_call_delay: SampleWindow::new(window),
            last_fetch_start: None,
            blocks_fetched_in_period: 0,
        }
    }

    /// Marks the start of a fetch and returns the delay since the previous
    /// one. Zero for the first fetch.
    pub(crate) fn begin_fetch(&mut self, now: Instant) -> Duration {
        let delay = self
            .last_fetch_start
            .map(|previous| now.saturating_duration_since(previous))
            .unwrap_or_default();
        self.last_fetch_start = Some(now);
        delay
    }

    /// Records one successful fetch.
    pub(crate) fn record(
        &mut self,
        acquisition: Duration,
        conversion: Duration,
        total: Duration,
        inter_call_delay: Duration,
    ) {
        self.acquisition.push(acquisition);
        self.conversion.push(conversion);
        self.total.push(total);
        if !inter_call_delay.is_zero() {
            self.inter_call_delay.push(inter_call_delay);
        }
        self.blocks_fetched_in_period += 1;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            acquisition: self.acquisition.summary(),
            conversion: self.conversion.summary(),
            total: self.total.summary(),
            inter_call_delay: self.inter_call_delay.summary(),
            blocks_fetched_in_period: self.blocks_fetched_in_period,
        }
    }

    /// Starts a new reporting period. Sample windows are kept.
    pub(crate) fn reset_period(&mut self) {
        self.blocks_fetched_in_period = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut window = SampleWindow::new(3);
        for n in [10, 20, 30, 40] {
            window.push(ms(n));
        }

        let summary = window.summary();
        assert_eq!(summary.samples, 3);
        assert_eq!(summary.average, ms(30));
        assert_eq!(summary.max, ms(40));
    }

    #[test]
    fn test_empty_window_summary_is_zero() {
        assert_eq!(SampleWindow::new(5).summary(), DurationSummary::default());
    }

    #[test]
    fn test_first_fetch_has_no_inter_call_delay() {
        let mut stats = FetchStats::new(50);
        let start = Instant::now();

        let first = stats.begin_fetch(start);
        stats.record(ms(5), ms(1), ms(6), first);
        let second = stats.begin_fetch(start + ms(100));
        stats.record(ms(7), ms(1), ms(8), second);

        let snapshot = stats.snapshot();
        assert_eq!(first, Duration::ZERO);
        assert_eq!(second, ms(100));
        assert_eq!(snapshot.inter_call_delay.samples, 1);
        assert_eq!(snapshot.acquisition.samples, 2);
        assert_eq!(snapshot.acquisition.average, ms(6));
        assert_eq!(snapshot.blocks_fetched_in_period, 2);
    }

    #[test]
    fn test_reset_period_keeps_samples() {
        let mut stats = FetchStats::new(50);
        stats.record(ms(5), ms(1), ms(6), Duration::ZERO);
        stats.reset_period();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.blocks_fetched_in_period, 0);
        assert_eq!(snapshot.total.samples, 1);
    }
}
