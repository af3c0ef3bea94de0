use segment_store::SegmentError;
#[cfg(feature = "std")]
use thiserror::Error;

use crate::Phase;

#[cfg_attr(feature = "std", derive(Error))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountArrayError {
    #[cfg_attr(
        feature = "std",
        error("value width must be in the range 1..=64, got {0}")
    )]
    InvalidWidth(u32),

    #[cfg_attr(
        feature = "std",
        error("segment size must be a positive multiple of 64 bits, got {0}")
    )]
    InvalidSegmentSize(u64),

    #[cfg_attr(
        feature = "std",
        error("page size must be a positive even number of bytes, got {0}")
    )]
    InvalidPageSize(usize),

    #[cfg_attr(feature = "std", error("index {index} is out of range for length {len}"))]
    OutOfRange { index: usize, len: usize },

    #[cfg_attr(feature = "std", error("cannot {operation} while {phase:?}"))]
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },

    #[cfg_attr(feature = "std", error("segment {0} is not allocated"))]
    MissingSegment(usize),

    #[cfg_attr(
        feature = "std",
        error("failed to allocate a buffer for {0} unpacked values")
    )]
    BufferAllocation(usize),

    #[cfg_attr(feature = "std", error("segment storage: {0}"))]
    Allocation(#[cfg_attr(feature = "std", from)] SegmentError),
}

#[cfg(not(feature = "std"))]
impl core::fmt::Display for CountArrayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CountArrayError::InvalidWidth(w) => {
                write!(f, "value width must be in the range 1..=64, got {}", w)
            }
            CountArrayError::InvalidSegmentSize(bits) => {
                write!(f, "segment size must be a positive multiple of 64 bits, got {}", bits)
            }
            CountArrayError::InvalidPageSize(bytes) => {
                write!(f, "page size must be a positive even number of bytes, got {}", bytes)
            }
            CountArrayError::OutOfRange { index, len } => {
                write!(f, "index {} is out of range for length {}", index, len)
            }
            CountArrayError::InvalidPhase { operation, phase } => {
                write!(f, "cannot {} while {:?}", operation, phase)
            }
            CountArrayError::MissingSegment(seg) => write!(f, "segment {} is not allocated", seg),
            CountArrayError::BufferAllocation(n) => {
                write!(f, "failed to allocate a buffer for {} unpacked values", n)
            }
            CountArrayError::Allocation(e) => write!(f, "segment storage: {}", e),
        }
    }
}

#[cfg(not(feature = "std"))]
impl From<SegmentError> for CountArrayError {
    fn from(err: SegmentError) -> Self {
        CountArrayError::Allocation(err)
    }
}
