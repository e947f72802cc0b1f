//! Forward-only, tolerant scanner over markup-like text.
//!
//! The navigator walks nested tags without building a document tree: one
//! [`Navigator::descend`] step yields the next opened [`Tag`] or a close
//! event, an implicit stack of open ancestors hangs off [`Navigator::top`],
//! and unbalanced or malformed markup is reconciled instead of rejected.
//! Built for ad-hoc extraction (find a tag, read the text inside it, skip a
//! subtree), not for spec-compliant parsing: there is no entity decoding,
//! no DOM, and no selector engine.
//!
//! Input is any pull-based [`CharSource`]; in-memory and reader-backed
//! sources are provided in [`source`].

pub mod source;

mod navigator;
mod tag;

pub use crate::navigator::{Navigator, ScanError};
pub use crate::source::{CharSource, ReaderSource, SourceError, StrSource, StringSource};
pub use crate::tag::Tag;
