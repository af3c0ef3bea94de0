#[cfg(feature = "std")]
use thiserror::Error;

/// Segment store errors.
///
/// Allocation failures are not recoverable at this layer; callers are
/// expected to abort the counting job that owns the store.
#[cfg_attr(feature = "std", derive(Error))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// A segment buffer could not be allocated.
    #[cfg_attr(
        feature = "std",
        error("failed to allocate segment {segment} ({words} words)")
    )]
    AllocationFailure { segment: usize, words: usize },

    /// The index of segment handles could not grow.
    #[cfg_attr(
        feature = "std",
        error("failed to grow segment index to {slots} slots")
    )]
    IndexAllocationFailure { slots: usize },

    /// Segments must be added in strictly increasing order, each exactly once.
    #[cfg_attr(
        feature = "std",
        error("segment {found} added out of order, expected {expected}")
    )]
    OutOfOrder { expected: usize, found: usize },
}

#[cfg(not(feature = "std"))]
impl core::fmt::Display for SegmentError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SegmentError::AllocationFailure { segment, words } => {
                write!(f, "failed to allocate segment {} ({} words)", segment, words)
            }
            SegmentError::IndexAllocationFailure { slots } => {
                write!(f, "failed to grow segment index to {} slots", slots)
            }
            SegmentError::OutOfOrder { expected, found } => {
                write!(f, "segment {} added out of order, expected {}", found, expected)
            }
        }
    }
}
