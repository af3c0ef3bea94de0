//! The bit-packed, segmented accumulation array.
//!
//! # Examples
//!
//! ## Writing and reading back
//!
//! ```rust
//! use count_array::CountArray;
//!
//! // 40-bit values in 64-bit segments: the second value straddles two segments
//! let mut array = CountArray::new();
//! array.initialize(7, 40, 64).unwrap();
//! array.add(0xAB_CDEF_0123).unwrap();
//! array.add(0x12_3456_789A).unwrap();
//!
//! assert_eq!(array.segment_count(), 2);
//! assert_eq!(array.get(1).unwrap(), 0x12_3456_789A);
//! ```
//!
//! ## Handing values to a sort
//!
//! ```rust
//! use count_array::{CountArray, Phase};
//!
//! let mut array = CountArray::new();
//! array.initialize(0, 5, 128).unwrap();
//! for v in [9, 3, 27, 3] {
//!     array.add(v).unwrap();
//! }
//!
//! let values = array.linearize().unwrap();
//! assert_eq!(values, vec![9, 3, 27, 3]);
//! assert_eq!(array.phase(), Phase::Finalizing);
//! assert!(array.add(1).is_err());
//!
//! array.release();
//! assert_eq!(array.segment_count(), 0);
//! ```

use alloc::{boxed::Box, vec::Vec};
use core::mem::size_of;

use segment_store::SegmentStore;

use crate::bit_ops::{self, BitCursor, Span};
use crate::footprint::{self, FootprintTracker};
use crate::{CountArrayConfig, CountArrayError};

type Result<T> = core::result::Result<T, CountArrayError>;

/// Lifecycle of an array. There are no transitions back to `Accumulating`
/// except through [`CountArray::release`] and a fresh initialize.
///
/// There is no separate "initialized but empty" phase: a successful
/// [`CountArray::initialize`] enters `Accumulating` directly, with no
/// segments allocated until the first [`CountArray::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Constructed, parameters not yet set.
    Uninitialized,
    /// Accepting values through [`CountArray::add`].
    Accumulating,
    /// Writing is over; values are being read out for sorting.
    Finalizing,
    /// Segments freed.
    Released,
}

/// Append-only array of fixed-width values sharing one k-mer prefix.
#[derive(Debug)]
pub struct CountArray {
    prefix: u64,
    config: CountArrayConfig,
    n_bits: u64,
    store: SegmentStore,
    footprint: FootprintTracker,
    phase: Phase,
}

impl Default for CountArray {
    fn default() -> Self {
        Self::new()
    }
}

impl CountArray {
    /// Creates an uninitialized array. Nothing is allocated.
    pub fn new() -> Self {
        Self {
            prefix: 0,
            config: CountArrayConfig::new(0, 0),
            n_bits: 0,
            store: SegmentStore::new(0),
            footprint: FootprintTracker::default(),
            phase: Phase::Uninitialized,
        }
    }

    /// Sets the prefix, value width (bits) and segment size (bits), and
    /// returns the baseline footprint estimate in bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use count_array::{CountArray, CountArrayError};
    ///
    /// let mut array = CountArray::new();
    /// assert_eq!(array.initialize(1, 0, 64), Err(CountArrayError::InvalidWidth(0)));
    ///
    /// let baseline = array.initialize(1, 17, 64 * 1024).unwrap();
    /// assert_eq!(baseline, array.used_size());
    /// ```
    pub fn initialize(&mut self, prefix: u64, width: u32, segment_bits: u64) -> Result<u64> {
        self.initialize_with(prefix, &CountArrayConfig::new(width, segment_bits))
    }

    /// Like [`initialize`](Self::initialize), with an explicit page size.
    pub fn initialize_with(&mut self, prefix: u64, config: &CountArrayConfig) -> Result<u64> {
        if !matches!(self.phase, Phase::Uninitialized | Phase::Released) {
            return Err(CountArrayError::InvalidPhase {
                operation: "initialize",
                phase: self.phase,
            });
        }
        config.validate()?;

        self.prefix = prefix;
        self.config = *config;
        self.n_bits = 0;
        self.store = SegmentStore::new(config.segment_words());
        self.phase = Phase::Accumulating;

        let baseline = self.used_size();
        self.footprint = FootprintTracker::new(baseline, config.bits_per_page());

        #[cfg(feature = "tracing")]
        tracing::debug!(
            prefix,
            width = config.width,
            segment_bits = config.segment_bits,
            baseline,
            "initialized count array"
        );

        Ok(baseline)
    }

    /// Appends one value and returns the footprint growth to report, usually 0.
    ///
    /// Only the low `width` bits of `value` are stored.
    pub fn add(&mut self, value: u64) -> Result<u64> {
        if self.phase != Phase::Accumulating {
            return Err(CountArrayError::InvalidPhase {
                operation: "add",
                phase: self.phase,
            });
        }

        let width = self.config.width;
        let value = value & bit_ops::low_mask(width);
        let cursor = BitCursor::locate(self.n_bits, width, self.config.segment_bits);

        if cursor.enters_segment() {
            self.store.add_segment(cursor.segment)?;
        }

        match cursor.span {
            Span::SingleWord => {
                let words = self.segment_mut(cursor.segment)?;
                if cursor.word_begin == 0 {
                    words[cursor.word] = cursor.place(value);
                } else {
                    words[cursor.word] |= cursor.place(value);
                }
            }

            Span::CrossWord { extra } => {
                let (high, low) = bit_ops::split(value, extra);
                let words = self.segment_mut(cursor.segment)?;
                words[cursor.word] |= high;
                words[cursor.word + 1] = low;
            }

            // The next segment cannot exist yet: nothing has reached its bit 0.
            Span::CrossSegment { extra } => {
                let (high, low) = bit_ops::split(value, extra);
                self.store.add_segment(cursor.segment + 1)?;
                let (this, next) = self
                    .store
                    .pair_mut(cursor.segment)
                    .ok_or(CountArrayError::MissingSegment(cursor.segment + 1))?;
                this[cursor.word] |= high;
                next[0] = low;
            }
        }

        self.n_bits += u64::from(width);
        Ok(self.used_size_delta())
    }

    /// Returns the value at write position `index`.
    pub fn get(&self, index: usize) -> Result<u64> {
        let len = self.len();
        if index >= len {
            return Err(CountArrayError::OutOfRange { index, len });
        }

        let width = self.config.width;
        let cursor = BitCursor::locate(index as u64 * u64::from(width), width, self.config.segment_bits);
        let words = self.segment(cursor.segment)?;

        let value = match cursor.span {
            Span::SingleWord => cursor.extract(words[cursor.word], width),

            Span::CrossWord { extra } => {
                bit_ops::join(words[cursor.word], words[cursor.word + 1], width, extra)
            }

            Span::CrossSegment { extra } => {
                let next = self.segment(cursor.segment + 1)?;
                bit_ops::join(words[cursor.word], next[0], width, extra)
            }
        };

        Ok(value)
    }

    /// Iterates over stored values in write order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            array: self,
            index: 0,
            len: self.len(),
        }
    }

    /// Ends the write phase. Repeated calls are harmless.
    pub fn seal(&mut self) -> Result<()> {
        match self.phase {
            Phase::Accumulating | Phase::Finalizing => {
                self.phase = Phase::Finalizing;
                Ok(())
            }
            phase => Err(CountArrayError::InvalidPhase {
                operation: "seal",
                phase,
            }),
        }
    }

    /// Seals the array and unpacks every value, in write order, into a
    /// plain vector for sorting.
    pub fn linearize(&mut self) -> Result<Vec<u64>> {
        self.seal()?;

        let len = self.len();
        let mut values = Vec::new();
        values
            .try_reserve_exact(len)
            .map_err(|_| CountArrayError::BufferAllocation(len))?;

        for index in 0..len {
            values.push(self.get(index)?);
        }
        Ok(values)
    }

    /// Frees all segments. The array can then be initialized again.
    pub fn release(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            prefix = self.prefix,
            values = self.len(),
            segments = self.store.len(),
            "releasing count array"
        );

        self.store.release();
        self.n_bits = 0;
        if self.phase != Phase::Uninitialized {
            self.phase = Phase::Released;
        }
    }

    /// Estimated resident size in bytes. Never decreases while writing.
    pub fn used_size(&self) -> u64 {
        let header = size_of::<Self>() as u64;
        if self.phase == Phase::Uninitialized {
            return header;
        }

        let bits_per_page = self.config.bits_per_page();
        let pages = footprint::pages_used(
            self.n_bits,
            self.config.segment_bits,
            bits_per_page,
            self.store.reallocations(),
        );
        let index = (self.store.index_slots() * size_of::<Box<[u64]>>()) as u64;

        pages * bits_per_page / 8 + index + header
    }

    /// Growth of [`used_size`](Self::used_size) since the last report, or 0
    /// if the write cursor has not reached the next recomputation point.
    pub fn used_size_delta(&mut self) -> u64 {
        if !self.footprint.due(self.n_bits) {
            return 0;
        }
        let size = self.used_size();
        let delta = self.footprint.record(size);

        #[cfg(feature = "tracing")]
        tracing::trace!(
            prefix = self.prefix,
            n_bits = self.n_bits,
            size,
            delta,
            "recomputed footprint"
        );

        delta
    }

    /// Reports any growth not yet returned by [`used_size_delta`](Self::used_size_delta),
    /// regardless of the trigger. Call once after the last write.
    pub fn settle_size_delta(&mut self) -> u64 {
        let size = self.used_size();
        self.footprint.settle(size)
    }

    pub fn prefix(&self) -> u64 {
        self.prefix
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn segment_bits(&self) -> u64 {
        self.config.segment_bits
    }

    pub fn config(&self) -> &CountArrayConfig {
        &self.config
    }

    /// Total bits written.
    pub fn num_bits(&self) -> u64 {
        self.n_bits
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        match self.config.width {
            0 => 0,
            width => (self.n_bits / u64::from(width)) as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.n_bits == 0
    }

    /// Number of allocated segments.
    pub fn segment_count(&self) -> usize {
        self.store.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    fn segment(&self, segment: usize) -> Result<&[u64]> {
        self.store
            .segment(segment)
            .ok_or(CountArrayError::MissingSegment(segment))
    }

    #[inline]
    fn segment_mut(&mut self, segment: usize) -> Result<&mut [u64]> {
        self.store
            .segment_mut(segment)
            .ok_or(CountArrayError::MissingSegment(segment))
    }
}

/// Iterator over the values of a [`CountArray`] in write order.
///
/// Yields exactly `len()` values: every index below `len()` has its bits in
/// an allocated segment. Use [`CountArray::linearize`] to get that invariant
/// checked as an error instead of a debug assertion.
pub struct Iter<'a> {
    array: &'a CountArray,
    index: usize,
    len: usize,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.len {
            return None;
        }
        let value = self.array.get(self.index);
        debug_assert!(value.is_ok(), "unreadable value at {}: {:?}", self.index, value);
        self.index += 1;
        value.ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a CountArray {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
