//! Approximate resident-memory accounting.
//!
//! The estimate counts pages touched by written bits rather than bytes
//! allocated, plus fixed slack, and runs above what `top` reports for a
//! counting process.

use segment_store::WORD_BITS;

/// Pages charged to every array regardless of content.
pub(crate) const OVERHEAD_PAGES: u64 = 5;

/// The recomputation trigger advances by `bits_per_page / TRIGGER_DIVISOR`.
pub(crate) const TRIGGER_DIVISOR: u64 = 16;

/// Pages charged for `n_bits` written bits.
///
/// Full segments cost their size rounded up to pages. The partial last
/// segment costs its used bits plus one word, rounded up.
pub(crate) fn pages_used(n_bits: u64, segment_bits: u64, bits_per_page: u64, reallocations: u64) -> u64 {
    let full_segments = n_bits / segment_bits;
    let partial_bits = n_bits % segment_bits + WORD_BITS;

    full_segments * segment_bits.div_ceil(bits_per_page)
        + partial_bits.div_ceil(bits_per_page)
        + OVERHEAD_PAGES
        + reallocations
}

/// Amortized reporting state: recompute only after the write cursor passes
/// `trigger`, and report growth relative to `last_reported`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FootprintTracker {
    trigger: u64,
    last_reported: u64,
    step: u64,
}

impl FootprintTracker {
    pub fn new(baseline: u64, bits_per_page: u64) -> Self {
        Self {
            trigger: 0,
            last_reported: baseline,
            step: bits_per_page / TRIGGER_DIVISOR,
        }
    }

    #[inline(always)]
    pub fn due(&self, n_bits: u64) -> bool {
        n_bits >= self.trigger
    }

    /// Records a fresh estimate, returns growth since the last one and moves
    /// the trigger forward one step.
    pub fn record(&mut self, size: u64) -> u64 {
        self.trigger += self.step;
        self.settle(size)
    }

    /// Records a fresh estimate without moving the trigger.
    pub fn settle(&mut self, size: u64) -> u64 {
        let delta = size.saturating_sub(self.last_reported);
        self.last_reported = size;
        delta
    }

    #[cfg(test)]
    pub fn trigger(&self) -> u64 {
        self.trigger
    }

    #[cfg(test)]
    pub fn last_reported(&self) -> u64 {
        self.last_reported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_BITS: u64 = 4096 * 8;

    #[test]
    fn empty_array_costs_one_page_plus_overhead() {
        assert_eq!(pages_used(0, 1 << 20, PAGE_BITS, 0), 1 + OVERHEAD_PAGES);
    }

    #[test]
    fn partial_segment_counts_an_extra_word() {
        // PAGE_BITS - 64 used bits plus the word margin exactly fill one page
        assert_eq!(pages_used(PAGE_BITS - 64, 1 << 20, PAGE_BITS, 0), 1 + OVERHEAD_PAGES);
        assert_eq!(pages_used(PAGE_BITS - 63, 1 << 20, PAGE_BITS, 0), 2 + OVERHEAD_PAGES);
    }

    #[test]
    fn full_segments_round_up_to_pages() {
        // 1.5 pages per segment rounds to 2
        let seg = PAGE_BITS + PAGE_BITS / 2;
        assert_eq!(pages_used(3 * seg, seg, PAGE_BITS, 0), 3 * 2 + 1 + OVERHEAD_PAGES);
    }

    #[test]
    fn reallocations_add_pages() {
        assert_eq!(pages_used(0, 128, PAGE_BITS, 3), 1 + OVERHEAD_PAGES + 3);
    }

    #[test]
    fn tracker_reports_growth_once() {
        let mut t = FootprintTracker::new(100, PAGE_BITS);
        assert!(t.due(0));
        assert_eq!(t.record(150), 50);
        assert_eq!(t.trigger(), PAGE_BITS / TRIGGER_DIVISOR);
        assert!(!t.due(PAGE_BITS / TRIGGER_DIVISOR - 1));
        assert!(t.due(PAGE_BITS / TRIGGER_DIVISOR));
        assert_eq!(t.record(150), 0);
        assert_eq!(t.settle(170), 20);
        assert_eq!(t.last_reported(), 170);
        assert_eq!(t.trigger(), 2 * PAGE_BITS / TRIGGER_DIVISOR);
    }
}
