//! Position Codec
//!
//! A coordinate is a shelf location inside one hexagon:
//!
//! ```text
//! wall   (4)  ─┐
//! shelf  (5)   ├─ mixed radix, wall most significant
//! volume (32)  │
//! page   (420)─┘
//!
//! posInt = page + volume·420 + shelf·420·32 + wall·420·32·5   ∈ [0, 268800)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;
use crate::{Error, Result};

pub const WALLS: u32 = 4;
pub const SHELVES: u32 = 5;
pub const VOLUMES: u32 = 32;
pub const PAGES: u32 = 420;

/// Number of distinct coordinates
pub const POSITIONS: u64 = (WALLS * SHELVES * VOLUMES * PAGES) as u64;

const PER_VOLUME: u64 = PAGES as u64;
const PER_SHELF: u64 = PER_VOLUME * VOLUMES as u64;
const PER_WALL: u64 = PER_SHELF * SHELVES as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub wall: u32,
    pub shelf: u32,
    pub volume: u32,
    pub page: u32,
}

impl Coordinate {
    /// Validating constructor; every component must be inside its bound.
    pub fn new(wall: u32, shelf: u32, volume: u32, page: u32) -> Result<Self> {
        let coordinate = Self { wall, shelf, volume, page };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Check each component against its bound
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("wall", self.wall, WALLS),
            ("shelf", self.shelf, SHELVES),
            ("volume", self.volume, VOLUMES),
            ("page", self.page, PAGES),
        ];

        for (field, value, bound) in checks {
            if value >= bound {
                return Err(Error::CoordinateOutOfRange { field, value, bound });
            }
        }
        Ok(())
    }

    /// Uniform over every valid coordinate
    pub fn random(rng: &mut dyn RandomSource) -> Self {
        Self {
            wall: rng.below(WALLS),
            shelf: rng.below(SHELVES),
            volume: rng.below(VOLUMES),
            page: rng.below(PAGES),
        }
    }

    pub fn position(&self) -> u64 {
        encode_position(self)
    }

    /// Link form: `w-s-v-p`
    pub fn to_link_part(&self) -> String {
        format!("{}-{}-{}-{}", self.wall, self.shelf, self.volume, self.page)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wall: {}, Shelf: {}, Volume: {}, Page: {}",
            self.wall, self.shelf, self.volume, self.page
        )
    }
}

/// Parses and validates the link form `w-s-v-p`
impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('-').collect();
        if parts.len() != 4 {
            return Err(Error::MalformedLink(format!(
                "coordinate must be wall-shelf-volume-page, got {:?}",
                s
            )));
        }

        let mut values = [0u32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                Error::MalformedLink(format!("coordinate component {:?} is not a number", part))
            })?;
        }

        Coordinate::new(values[0], values[1], values[2], values[3])
    }
}

pub fn encode_position(coordinate: &Coordinate) -> u64 {
    coordinate.page as u64
        + coordinate.volume as u64 * PER_VOLUME
        + coordinate.shelf as u64 * PER_SHELF
        + coordinate.wall as u64 * PER_WALL
}

/// Inverse of `encode_position`. Does not bounds-check: positions at or past
/// `POSITIONS` come back with an out-of-range wall.
pub fn decode_position(position: u64) -> Coordinate {
    Coordinate {
        wall: (position / PER_WALL) as u32,
        shelf: ((position / PER_SHELF) % SHELVES as u64) as u32,
        volume: ((position / PER_VOLUME) % VOLUMES as u64) as u32,
        page: (position % PER_VOLUME) as u32,
    }
}
