//! Construction parameters for a [`CountArray`](crate::CountArray).

use crate::CountArrayError;
use segment_store::WORD_BITS;

/// Page size assumed for footprint estimates when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Width, segment size and page size of one array.
///
/// ```
/// use count_array::CountArrayConfig;
///
/// let config = CountArrayConfig::new(17, 64 * 1024).with_page_size(16384);
/// assert!(config.validate().is_ok());
/// assert!(CountArrayConfig::new(65, 64).validate().is_err());
/// assert!(CountArrayConfig::new(8, 100).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CountArrayConfig {
    /// Bits per stored value, 1..=64.
    pub width: u32,
    /// Bits per segment, a positive multiple of 64.
    pub segment_bits: u64,
    /// Bytes per OS page, used only for the footprint estimate.
    #[cfg_attr(feature = "serde", serde(default = "default_page_size"))]
    pub page_size: usize,
}

#[cfg(feature = "serde")]
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl CountArrayConfig {
    pub fn new(width: u32, segment_bits: u64) -> Self {
        Self {
            width,
            segment_bits,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Checks every parameter, reporting the first one that is out of range.
    pub fn validate(&self) -> Result<(), CountArrayError> {
        if !(1..=64).contains(&self.width) {
            return Err(CountArrayError::InvalidWidth(self.width));
        }
        if self.segment_bits == 0
            || self.segment_bits % WORD_BITS != 0
            || usize::try_from(self.segment_bits / WORD_BITS).is_err()
        {
            return Err(CountArrayError::InvalidSegmentSize(self.segment_bits));
        }
        if self.page_size == 0 || self.page_size % 2 != 0 {
            return Err(CountArrayError::InvalidPageSize(self.page_size));
        }
        Ok(())
    }

    pub(crate) fn segment_words(&self) -> usize {
        (self.segment_bits / WORD_BITS) as usize
    }

    pub(crate) fn bits_per_page(&self) -> u64 {
        self.page_size as u64 * 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_width_range() {
        for width in 1..=64 {
            assert!(CountArrayConfig::new(width, 64).validate().is_ok());
        }
    }

    #[test]
    fn rejects_bad_width() {
        assert_eq!(
            CountArrayConfig::new(0, 64).validate(),
            Err(CountArrayError::InvalidWidth(0))
        );
        assert_eq!(
            CountArrayConfig::new(65, 64).validate(),
            Err(CountArrayError::InvalidWidth(65))
        );
    }

    #[test]
    fn rejects_unaligned_segments() {
        for bits in [0, 1, 63, 65, 100, 127] {
            assert_eq!(
                CountArrayConfig::new(8, bits).validate(),
                Err(CountArrayError::InvalidSegmentSize(bits))
            );
        }
        assert!(CountArrayConfig::new(8, 128).validate().is_ok());
    }

    #[test]
    fn rejects_odd_page_size() {
        let config = CountArrayConfig::new(8, 64);
        assert_eq!(
            config.with_page_size(0).validate(),
            Err(CountArrayError::InvalidPageSize(0))
        );
        assert_eq!(
            config.with_page_size(4095).validate(),
            Err(CountArrayError::InvalidPageSize(4095))
        );
        assert_eq!(config.with_page_size(4096).bits_per_page(), 32768);
    }
}
