//! # segment_store
//!
//! Lazily grown, never-moving storage for bit-packed arrays.
//!
//! A [`SegmentStore`] owns an ordered list of fixed-size `u64` word buffers.
//! Buffers are allocated one at a time, zero-filled, and stay at the same
//! address until the whole store is released. Only the small index of
//! buffer handles is ever reallocated.
//!
//! ```rust
//! use segment_store::SegmentStore;
//!
//! let mut store = SegmentStore::new(2);
//! store.add_segment(0).unwrap();
//! store.segment_mut(0).unwrap()[1] = 0xFF;
//!
//! assert_eq!(store.len(), 1);
//! assert_eq!(store.segment(0).unwrap(), &[0, 0xFF]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod error;
pub mod store;

pub use error::SegmentError;
pub use store::{INDEX_GROWTH, SegmentStore, WORD_BITS};
