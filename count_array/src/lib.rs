//! # count_array
//!
//! Bit-packed, segmented accumulation arrays for k-mer counting.
//!
//! A [`CountArray`] collects fixed-width values (k-mer suffixes, optionally
//! with packed counts) for one shared key prefix. Values are packed at the
//! bit level, most significant bit first, into lazily allocated segments, so
//! memory tracks information content and no single allocation grows past one
//! segment.
//!
//! ```rust
//! use count_array::CountArray;
//!
//! let mut array = CountArray::new();
//! array.initialize(0x2A, 12, 1024).expect("valid configuration");
//!
//! array.add(0xABC).unwrap();
//! array.add(0x123).unwrap();
//!
//! assert_eq!(array.len(), 2);
//! assert_eq!(array.get(0).unwrap(), 0xABC);
//! assert_eq!(array.get(1).unwrap(), 0x123);
//! ```
//!
//! ## Memory Reporting
//!
//! Every [`add`](CountArray::add) returns the growth of the estimated
//! footprint since the last report, usually zero, so a driver can keep a
//! running budget without polling:
//!
//! ```rust
//! use count_array::CountArray;
//!
//! let mut array = CountArray::new();
//! let mut budget = array.initialize(0, 31, 64 * 1024).unwrap();
//!
//! for suffix in 0..100_000u64 {
//!     budget += array.add(suffix & 0x7FFF_FFFF).unwrap();
//! }
//! budget += array.settle_size_delta();
//!
//! assert_eq!(budget, array.used_size());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod error;
pub use error::CountArrayError;

mod bit_ops;
mod footprint;

pub mod config;
pub mod array;

pub use config::{CountArrayConfig, DEFAULT_PAGE_SIZE};
pub use array::{CountArray, Iter, Phase};
pub use segment_store::SegmentError;
