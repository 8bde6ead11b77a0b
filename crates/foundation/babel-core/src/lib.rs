//! # Babel Core
//!
//! Reversible addressing for a Library of Babel: every page of text has one
//! address, and every address opens exactly one page.
//!
//! ```text
//! (wall, shelf, volume, page) ──► posInt ──┬──► filler(posInt) + snippet ──► pageInt
//!                                          │                                   │
//!                                          └──► posInt · 29^3200 + pageInt ◄───┘
//!                                                          │
//!                                                     scramble (LCG)
//!                                                          │
//!                                                       base 36 ──► address
//! ```
//!
//! Decoding walks the same path backwards and refuses any address whose
//! embedded position disagrees with the coordinate it is opened at.
//!
//! # Modules
//! - `math` - Extended Euclid modular inverse on big integers
//! - `scrambler` - Reversible LCG over Z_(2^15565), plus its symbol stream
//! - `position` - Coordinate <-> position integer
//! - `page` - 29-symbol page <-> base-29 integer, deterministic filler
//! - `address` - The full bijection and the `Library` facade
//! - `random` - Injectable randomness
//! - `link` - Shareable `address#w-s-v-p#pos$snippet` links

pub mod math;
pub mod scrambler;
pub mod position;
pub mod page;
pub mod address;
pub mod random;
pub mod link;

pub use math::modular_inverse;
pub use scrambler::{Scrambler, SymbolStream};
pub use position::{Coordinate, decode_position, encode_position};
pub use page::{PageBuffer, generate_filler, number_to_page, page_to_number, ALPHABET, PAGE_LENGTH};
pub use address::{Address, EncodedPage, Library, SnippetMark};
pub use random::{FixedSequence, RandomSource, RngSource};
pub use link::{SharedSnippet, ShareLink, ShareView};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed address: {0}")]
    MalformedAddress(String),

    #[error("Address was not produced at {expected}")]
    PositionMismatch { expected: Coordinate },

    #[error("Snippet must be 1..={max} characters, got {len}", max = PAGE_LENGTH)]
    SnippetTooLong { len: usize },

    #[error("Character {ch:?} at position {position} is outside the page alphabet")]
    InvalidAlphabet { ch: char, position: usize },

    #[error("{field} {value} out of range (must be < {bound})")]
    CoordinateOutOfRange { field: &'static str, value: u32, bound: u32 },

    #[error("Insertion offset {offset} exceeds the last valid offset {max}")]
    InvalidOffset { offset: usize, max: usize },

    #[error("Page length mismatch: expected {expected}, got {got}")]
    PageLength { expected: usize, got: usize },

    #[error("Page number does not fit in {len} base-29 digits", len = PAGE_LENGTH)]
    PageNumberOverflow,

    #[error("Malformed link: {0}")]
    MalformedLink(String),
}

pub type Result<T> = std::result::Result<T, Error>;
