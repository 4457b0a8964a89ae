//! `nkinetics` is a small toolkit for estimating reactor kinetic parameters
//! from neutron detector pulse trains
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use nkinetics_utils as utils;

#[cfg(feature = "feynman")]
#[cfg_attr(docsrs, doc(cfg(feature = "feynman")))]
#[doc(inline)]
pub use nkinetics_feynman as feynman;
