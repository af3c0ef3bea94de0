//! Bit cursor arithmetic shared by the writer and the reader.
//!
//! Values are packed most significant bit first: within a word, the first
//! value written occupies the highest bits. Words are filled in order inside
//! a segment and segments in order inside an array.

use segment_store::WORD_BITS;

const WORD: u32 = WORD_BITS as u32;

/// A mask of the low `bits` bits.
#[inline(always)]
pub(crate) const fn low_mask(bits: u32) -> u64 {
    if bits >= WORD {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Where the bits of one value land relative to word and segment boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Span {
    /// Entirely inside the current word.
    SingleWord,
    /// The low `extra` bits spill into the next word of the same segment.
    CrossWord { extra: u32 },
    /// The low `extra` bits spill into word 0 of the next segment.
    CrossSegment { extra: u32 },
}

/// An absolute bit offset decomposed into segment, word and bit coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BitCursor {
    pub segment: usize,
    pub word: usize,
    /// First bit of the value inside `word`, counted from the high end.
    pub word_begin: u32,
    /// One past the last bit of the value, may exceed 64.
    pub word_end: u32,
    pub span: Span,
}

impl BitCursor {
    /// Locates a `width`-bit value starting at `bit_pos`.
    #[inline]
    pub fn locate(bit_pos: u64, width: u32, segment_bits: u64) -> Self {
        let segment = (bit_pos / segment_bits) as usize;
        let segment_pos = bit_pos % segment_bits;

        let word = (segment_pos / WORD_BITS) as usize;
        let word_begin = (segment_pos % WORD_BITS) as u32;
        let word_end = word_begin + width;

        let span = if word_end <= WORD {
            Span::SingleWord
        } else if segment_pos + u64::from(width) <= segment_bits {
            Span::CrossWord {
                extra: word_end - WORD,
            }
        } else {
            Span::CrossSegment {
                extra: word_end - WORD,
            }
        };

        Self {
            segment,
            word,
            word_begin,
            word_end,
            span,
        }
    }

    /// True when the value starts at bit 0 of word 0, i.e. its segment is new.
    #[inline]
    pub fn enters_segment(&self) -> bool {
        self.word == 0 && self.word_begin == 0
    }

    /// `value` shifted into place for a single-word write.
    #[inline]
    pub fn place(&self, value: u64) -> u64 {
        value << (WORD - self.word_end)
    }

    /// Reads a value that fits inside `word`.
    #[inline]
    pub fn extract(&self, word: u64, width: u32) -> u64 {
        (word >> (WORD - self.word_end)) & low_mask(width)
    }
}

/// Splits a value into its high part (ending the current word) and its low
/// `extra` bits (starting the next word).
#[inline]
pub(crate) fn split(value: u64, extra: u32) -> (u64, u64) {
    (value >> extra, value << (WORD - extra))
}

/// Inverse of [`split`].
#[inline]
pub(crate) fn join(first: u64, second: u64, width: u32, extra: u32) -> u64 {
    ((first & low_mask(width - extra)) << extra) | ((second >> (WORD - extra)) & low_mask(extra))
}
