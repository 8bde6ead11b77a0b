//! Address Codec
//!
//! Glues the stages together:
//!
//! ```text
//! encode:  posInt ─► filler ─► overlay ─► pageInt ─► posInt·29^3200 + pageInt ─► scramble ─► base36
//! decode:  base36 ─► unscramble ─► (÷ 29^3200, mod 29^3200) ─► check posInt ─► page
//! ```

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::page::{number_to_page, page_space, page_to_number, PageBuffer, PAGE_LENGTH};
use crate::position::{decode_position, encode_position, Coordinate, POSITIONS};
use crate::random::RandomSource;
use crate::scrambler::Scrambler;
use crate::{Error, Result};

const ADDRESS_RADIX: u32 = 36;

/// Lowercase base-36 rendering of a scrambled integer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn from_integer(n: &BigUint) -> Self {
        Self(n.to_str_radix(ADDRESS_RADIX))
    }

    pub fn to_integer(&self) -> BigUint {
        // Digits were checked on construction
        BigUint::parse_bytes(self.0.as_bytes(), ADDRESS_RADIX).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::MalformedAddress("empty address".into()));
        }

        if let Some((i, ch)) = s
            .char_indices()
            .find(|(_, ch)| !(ch.is_ascii_digit() || ch.is_ascii_lowercase()))
        {
            return Err(Error::MalformedAddress(format!(
                "character {:?} at {} is not in [0-9a-z]",
                ch, i
            )));
        }

        let address = Self(s.to_string());
        if &address.to_integer() >= Scrambler::modulus() {
            return Err(Error::MalformedAddress("value exceeds the address space".into()));
        }
        Ok(address)
    }
}

impl TryFrom<String> for Address {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> String {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a snippet was written on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetMark {
    pub at: usize,
    pub len: usize,
}

impl SnippetMark {
    pub fn range(&self) -> Range<usize> {
        self.at..self.at.saturating_add(self.len)
    }
}

/// Everything the encode path produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedPage {
    pub address: Address,
    pub coordinate: Coordinate,
    /// `None` for a bare browsed page
    pub snippet: Option<SnippetMark>,
    pub page: PageBuffer,
}

impl EncodedPage {
    pub fn insert_at(&self) -> Option<usize> {
        self.snippet.map(|mark| mark.at)
    }
}

/// Stateless facade over the whole codec
pub struct Library;

impl Library {
    /// Write `snippet` onto the page at `coordinate` and return its address.
    ///
    /// With `insert_at` absent the offset is drawn uniformly from
    /// `[0, 3200 - len]`.
    pub fn encode(
        coordinate: &Coordinate,
        snippet: &str,
        insert_at: Option<usize>,
        rng: &mut dyn RandomSource,
    ) -> Result<EncodedPage> {
        coordinate.validate()?;

        let len = snippet.chars().count();
        if len == 0 || len > PAGE_LENGTH {
            return Err(Error::SnippetTooLong { len });
        }

        let max = PAGE_LENGTH - len;
        let at = match insert_at {
            Some(at) => at,
            None => rng.below(max as u32 + 1) as usize,
        };

        let position = encode_position(coordinate);
        let page = PageBuffer::filler(&BigUint::from(position)).with_snippet(snippet, at)?;
        let address = Self::address_of(position, &page);

        tracing::debug!(position, at, len, address_len = address.len(), "encoded snippet");

        Ok(EncodedPage {
            address,
            coordinate: *coordinate,
            snippet: Some(SnippetMark { at, len }),
            page,
        })
    }

    /// Uniform over all valid coordinates
    pub fn random_coordinate(rng: &mut dyn RandomSource) -> Coordinate {
        Coordinate::random(rng)
    }

    /// Random coordinate and random offset
    pub fn search(snippet: &str, rng: &mut dyn RandomSource) -> Result<EncodedPage> {
        let coordinate = Self::random_coordinate(rng);
        Self::encode(&coordinate, snippet, None, rng)
    }

    /// The untouched filler page at `coordinate`, with its address
    pub fn browse(coordinate: &Coordinate) -> Result<EncodedPage> {
        coordinate.validate()?;

        let position = encode_position(coordinate);
        let page = PageBuffer::filler(&BigUint::from(position));
        let address = Self::address_of(position, &page);

        Ok(EncodedPage { address, coordinate: *coordinate, snippet: None, page })
    }

    /// Open `address` at `coordinate`.
    ///
    /// Fails with `PositionMismatch` when the address was produced at any
    /// other coordinate.
    pub fn decode(address: &str, coordinate: &Coordinate) -> Result<PageBuffer> {
        let address: Address = address.parse()?;
        let (position, page_number) = Self::unpack(&address);

        let expected = encode_position(coordinate);
        if position != BigUint::from(expected) {
            tracing::warn!(expected, "address does not belong to the requested coordinate");
            return Err(Error::PositionMismatch { expected: *coordinate });
        }

        tracing::debug!(position = expected, address_len = address.len(), "decoded address");
        number_to_page(&page_number)
    }

    /// Open `address` without knowing its coordinate; the coordinate is
    /// recovered from the address itself.
    pub fn locate(address: &str) -> Result<(Coordinate, PageBuffer)> {
        let address: Address = address.parse()?;
        let (position, page_number) = Self::unpack(&address);

        let position = position
            .to_u64()
            .filter(|p| *p < POSITIONS)
            .ok_or_else(|| Error::MalformedAddress("embedded position is out of range".into()))?;

        let page = number_to_page(&page_number)?;
        Ok((decode_position(position), page))
    }

    fn address_of(position: u64, page: &PageBuffer) -> Address {
        let combined = BigUint::from(position) * page_space() + page_to_number(page);
        debug_assert!(&combined < Scrambler::modulus(), "combined integer exceeds modulus");
        Address::from_integer(&Scrambler::scramble(&combined))
    }

    fn unpack(address: &Address) -> (BigUint, BigUint) {
        let combined = Scrambler::unscramble(&address.to_integer());
        (&combined / page_space(), &combined % page_space())
    }
}
