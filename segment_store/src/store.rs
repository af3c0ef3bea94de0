use alloc::{boxed::Box, vec::Vec};

use crate::SegmentError;

/// Bits in one storage word.
pub const WORD_BITS: u64 = u64::BITS as u64;

/// Slots added to the segment index each time it runs out of room.
pub const INDEX_GROWTH: usize = 64;

/// An ordered, growable sequence of independently allocated word buffers.
///
/// Every segment holds exactly `segment_words` zero-initialized words. The
/// buffers are boxed individually, so growing the index only moves the
/// handles, never the data behind them.
#[derive(Debug)]
pub struct SegmentStore {
    segment_words: usize,
    segments: Vec<Box<[u64]>>,
    index_slots: usize,
    reallocations: u64,
}

impl SegmentStore {
    /// Creates an empty store whose segments will hold `segment_words` words.
    ///
    /// Nothing is allocated until the first [`add_segment`](Self::add_segment).
    pub fn new(segment_words: usize) -> Self {
        Self {
            segment_words,
            segments: Vec::new(),
            index_slots: 0,
            reallocations: 0,
        }
    }

    pub fn segment_words(&self) -> usize {
        self.segment_words
    }

    pub fn segment_bits(&self) -> u64 {
        self.segment_words as u64 * WORD_BITS
    }

    /// Number of allocated segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Slots reserved in the segment index, allocated or not.
    pub fn index_slots(&self) -> usize {
        self.index_slots
    }

    /// How many times a non-empty segment index had to be moved to grow.
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }

    /// Bytes held by segment buffers, excluding the index.
    pub fn allocated_bytes(&self) -> usize {
        self.segments.len() * self.segment_words * core::mem::size_of::<u64>()
    }

    /// Allocates and zero-fills segment `index`.
    ///
    /// Segments are added in strictly increasing order: `index` must equal
    /// [`len`](Self::len). The index of handles grows by [`INDEX_GROWTH`]
    /// slots when full.
    pub fn add_segment(&mut self, index: usize) -> Result<(), SegmentError> {
        if index != self.segments.len() {
            return Err(SegmentError::OutOfOrder {
                expected: self.segments.len(),
                found: index,
            });
        }

        if index >= self.index_slots {
            self.grow_index(index)?;
        }

        let words = self.segment_words;
        let buffer = bytemuck::allocation::try_zeroed_slice_box::<u64>(words)
            .map_err(|()| SegmentError::AllocationFailure {
                segment: index,
                words,
            })?;
        self.segments.push(buffer);

        #[cfg(feature = "tracing")]
        tracing::trace!(segment = index, words, "allocated segment");

        Ok(())
    }

    fn grow_index(&mut self, index: usize) -> Result<(), SegmentError> {
        let slots = (index / INDEX_GROWTH + 1) * INDEX_GROWTH;
        self.segments
            .try_reserve_exact(slots - self.segments.len())
            .map_err(|_| SegmentError::IndexAllocationFailure { slots })?;

        if self.index_slots > 0 {
            self.reallocations += 1;
        }
        self.index_slots = slots;

        #[cfg(feature = "tracing")]
        tracing::trace!(slots, reallocations = self.reallocations, "grew segment index");

        Ok(())
    }

    pub fn segment(&self, index: usize) -> Option<&[u64]> {
        self.segments.get(index).map(|s| &s[..])
    }

    pub fn segment_mut(&mut self, index: usize) -> Option<&mut [u64]> {
        self.segments.get_mut(index).map(|s| &mut s[..])
    }

    /// Mutable access to segment `index` and the one after it.
    ///
    /// Used when a value straddles a segment boundary.
    pub fn pair_mut(&mut self, index: usize) -> Option<(&mut [u64], &mut [u64])> {
        if index + 1 >= self.segments.len() {
            return None;
        }
        let (head, tail) = self.segments.split_at_mut(index + 1);
        Some((&mut head[index][..], &mut tail[0][..]))
    }

    /// Raw byte view of a segment, in native word byte order.
    pub fn as_bytes(&self, index: usize) -> Option<&[u8]> {
        self.segment(index).map(bytemuck::cast_slice::<u64, u8>)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[u64]> {
        self.segments.iter().map(|s| &s[..])
    }

    /// Frees every segment and empties the index.
    pub fn release(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            segments = self.segments.len(),
            bytes = self.allocated_bytes(),
            "releasing segments"
        );

        self.segments = Vec::new();
        self.index_slots = 0;
        self.reallocations = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_allocates_nothing() {
        let store = SegmentStore::new(4);
        assert!(store.is_empty());
        assert_eq!(store.index_slots(), 0);
        assert_eq!(store.allocated_bytes(), 0);
        assert_eq!(store.segment_bits(), 256);
        assert_eq!(store.segment_words(), 4);
    }

    #[test]
    fn iter_walks_segments_in_order() -> Result<(), SegmentError> {
        let mut store = SegmentStore::new(2);
        for i in 0..3 {
            store.add_segment(i)?;
            if let Some(seg) = store.segment_mut(i) {
                seg[0] = i as u64 + 10;
            }
        }
        let iter = store.iter();
        assert_eq!(iter.len(), 3);
        let firsts: Vec<u64> = iter.map(|s| s[0]).collect();
        assert_eq!(firsts, vec![10, 11, 12]);
        assert!(store.iter().all(|s| s.len() == store.segment_words()));
        Ok(())
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn traced_growth_and_release() -> Result<(), SegmentError> {
        let mut store = SegmentStore::new(1);
        for i in 0..=INDEX_GROWTH {
            store.add_segment(i)?;
        }
        assert_eq!(store.reallocations(), 1);
        store.release();
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn segments_are_zeroed() -> Result<(), SegmentError> {
        let mut store = SegmentStore::new(3);
        store.add_segment(0)?;
        assert_eq!(store.segment(0), Some(&[0u64, 0, 0][..]));
        assert_eq!(store.allocated_bytes(), 24);
        Ok(())
    }

    #[test]
    fn out_of_order_is_rejected() -> Result<(), SegmentError> {
        let mut store = SegmentStore::new(1);
        assert_eq!(
            store.add_segment(1),
            Err(SegmentError::OutOfOrder {
                expected: 0,
                found: 1
            })
        );
        store.add_segment(0)?;
        assert_eq!(
            store.add_segment(0),
            Err(SegmentError::OutOfOrder {
                expected: 1,
                found: 0
            })
        );
        Ok(())
    }

    #[test]
    fn index_grows_in_fixed_steps() -> Result<(), SegmentError> {
        let mut store = SegmentStore::new(1);
        store.add_segment(0)?;
        assert_eq!(store.index_slots(), INDEX_GROWTH);
        assert_eq!(store.reallocations(), 0);

        for i in 1..=INDEX_GROWTH {
            store.add_segment(i)?;
        }
        assert_eq!(store.index_slots(), 2 * INDEX_GROWTH);
        assert_eq!(store.reallocations(), 1);
        Ok(())
    }

    #[test]
    fn segments_do_not_move_when_index_grows() -> Result<(), SegmentError> {
        let mut store = SegmentStore::new(2);
        store.add_segment(0)?;
        let before = store.segment(0).map(<[u64]>::as_ptr);

        for i in 1..(3 * INDEX_GROWTH) {
            store.add_segment(i)?;
        }
        assert_eq!(store.segment(0).map(<[u64]>::as_ptr), before);
        Ok(())
    }

    #[test]
    fn pair_mut_spans_boundary() -> Result<(), SegmentError> {
        let mut store = SegmentStore::new(2);
        store.add_segment(0)?;
        assert!(store.pair_mut(0).is_none());
        store.add_segment(1)?;

        if let Some((a, b)) = store.pair_mut(0) {
            a[1] = 7;
            b[0] = 9;
        }
        assert_eq!(store.segment(0), Some(&[0u64, 7][..]));
        assert_eq!(store.segment(1), Some(&[9u64, 0][..]));
        Ok(())
    }

    #[test]
    fn byte_view_covers_whole_segment() -> Result<(), SegmentError> {
        let mut store = SegmentStore::new(2);
        store.add_segment(0)?;
        if let Some(seg) = store.segment_mut(0) {
            seg[0] = u64::MAX;
        }
        let bytes = store.as_bytes(0).unwrap_or_default();
        assert_eq!(bytes.len(), 16);
        assert!(bytes[..8].iter().all(|&b| b == 0xFF));
        assert!(bytes[8..].iter().all(|&b| b == 0));
        Ok(())
    }

    #[test]
    fn release_resets_everything() -> Result<(), SegmentError> {
        let mut store = SegmentStore::new(1);
        for i in 0..100 {
            store.add_segment(i)?;
        }
        store.release();
        assert!(store.is_empty());
        assert_eq!(store.index_slots(), 0);
        assert_eq!(store.reallocations(), 0);

        store.add_segment(0)?;
        assert_eq!(store.len(), 1);
        Ok(())
    }
}
