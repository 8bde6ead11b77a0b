//! Page Content Codec
//!
//! A page is exactly `PAGE_LENGTH` symbols from a 29-letter alphabet, read
//! as one base-29 numeral with the first character most significant.

use std::fmt;
use std::ops::Range;

use lazy_static::lazy_static;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::scrambler::SymbolStream;
use crate::{Error, Result};

/// Symbol order fixes the digit values: `a` = 0 … `.` = 28
pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz ,.";
pub const RADIX: u32 = 29;
pub const PAGE_LENGTH: usize = 3200;

lazy_static! {
    /// `29^3200`, the number of distinct pages
    static ref PAGE_SPACE: BigUint = BigUint::from(RADIX).pow(PAGE_LENGTH as u32);
}

/// `29^3200`
pub fn page_space() -> &'static BigUint {
    &PAGE_SPACE
}

/// Digit value of `ch`, if it belongs to the alphabet
pub fn symbol_index(ch: char) -> Option<u8> {
    ALPHABET.find(ch).map(|i| i as u8)
}

fn symbol(index: u8) -> char {
    ALPHABET.as_bytes()[index as usize % ALPHABET.len()] as char
}

/// Fails on the first character outside the alphabet
pub fn check_alphabet(text: &str) -> Result<()> {
    match text.chars().enumerate().find(|(_, ch)| symbol_index(*ch).is_none()) {
        Some((position, ch)) => Err(Error::InvalidAlphabet { ch, position }),
        None => Ok(()),
    }
}

/// `length` deterministic symbols from the scrambler stream seeded by `seed`
pub fn generate_filler(seed: &BigUint, length: usize) -> String {
    SymbolStream::new(seed, RADIX)
        .take(length)
        .map(|digit| symbol(digit as u8))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageBuffer {
    text: String,
}

impl PageBuffer {
    /// The bare page a seed generates
    pub fn filler(seed: &BigUint) -> Self {
        Self { text: generate_filler(seed, PAGE_LENGTH) }
    }

    /// Validate arbitrary text as a full page
    pub fn parse(text: &str) -> Result<Self> {
        let got = text.chars().count();
        if got != PAGE_LENGTH {
            return Err(Error::PageLength { expected: PAGE_LENGTH, got });
        }
        check_alphabet(text)?;
        Ok(Self { text: text.to_string() })
    }

    /// Overwrite `snippet.len()` symbols starting at `at`
    pub fn with_snippet(mut self, snippet: &str, at: usize) -> Result<Self> {
        let len = snippet.chars().count();
        if len == 0 || len > PAGE_LENGTH {
            return Err(Error::SnippetTooLong { len });
        }
        check_alphabet(snippet)?;

        let max = PAGE_LENGTH - len;
        if at > max {
            return Err(Error::InvalidOffset { offset: at, max });
        }

        // All symbols are ASCII, so char offsets are byte offsets
        self.text.replace_range(at..at + len, snippet);
        Ok(self)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Text inside `range`, if the range lies on the page
    pub fn slice(&self, range: Range<usize>) -> Option<&str> {
        self.text.get(range)
    }

    /// Whether `snippet` sits at `at`
    pub fn contains_at(&self, snippet: &str, at: usize) -> bool {
        match at.checked_add(snippet.len()) {
            Some(end) => self.slice(at..end) == Some(snippet),
            None => false,
        }
    }

    pub fn digits(&self) -> impl Iterator<Item = u8> + '_ {
        self.text.chars().map(|ch| symbol_index(ch).unwrap_or(0))
    }
}

impl fmt::Display for PageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl TryFrom<String> for PageBuffer {
    type Error = Error;

    fn try_from(text: String) -> Result<Self> {
        Self::parse(&text)
    }
}

impl From<PageBuffer> for String {
    fn from(page: PageBuffer) -> String {
        page.text
    }
}

/// The page as a base-29 integer in `[0, 29^3200)`
pub fn page_to_number(page: &PageBuffer) -> BigUint {
    let mut n = BigUint::default();
    for digit in page.digits() {
        n *= RADIX;
        n += digit as u32;
    }
    n
}

/// Inverse of `page_to_number`, left-padded with `a`
pub fn number_to_page(n: &BigUint) -> Result<PageBuffer> {
    if n >= page_space() {
        return Err(Error::PageNumberOverflow);
    }

    let mut digits = n.to_radix_le(RADIX);
    digits.resize(PAGE_LENGTH, 0);

    let text = digits.iter().rev().map(|d| symbol(*d)).collect();
    Ok(PageBuffer { text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::{One, Zero};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_page(rng: &mut StdRng) -> PageBuffer {
        let text: String = (0..PAGE_LENGTH)
            .map(|_| symbol(rng.gen_range(0..RADIX) as u8))
            .collect();
        PageBuffer::parse(&text).unwrap()
    }

    #[test]
    fn test_alphabet() {
        assert_eq!(ALPHABET.len(), RADIX as usize);
        assert_eq!(symbol_index('a'), Some(0));
        assert_eq!(symbol_index(' '), Some(26));
        assert_eq!(symbol_index('.'), Some(28));
        assert_eq!(symbol_index('A'), None);
    }

    #[test]
    fn test_filler_deterministic() {
        let seed = BigUint::from(94144u32);
        let a = generate_filler(&seed, PAGE_LENGTH);
        let b = generate_filler(&seed, PAGE_LENGTH);

        assert_eq!(a, b);
        assert_eq!(a.len(), PAGE_LENGTH);
        assert!(check_alphabet(&a).is_ok());
    }

    #[test]
    fn test_filler_differs_by_seed() {
        let a = generate_filler(&BigUint::from(1u32), 200);
        let b = generate_filler(&BigUint::from(2u32), 200);
        assert_ne!(a, b);
    }

    #[test]
    fn test_filler_prefix_stable() {
        let seed = BigUint::from(12345u32);
        let short = generate_filler(&seed, 10);
        let long = generate_filler(&seed, PAGE_LENGTH);
        assert!(long.starts_with(&short));
    }

    #[test]
    fn test_number_extremes() {
        let zero = number_to_page(&BigUint::zero()).unwrap();
        assert!(zero.as_str().chars().all(|c| c == 'a'));
        assert_eq!(page_to_number(&zero), BigUint::zero());

        let max = page_space() - BigUint::one();
        let last = number_to_page(&max).unwrap();
        assert!(last.as_str().chars().all(|c| c == '.'));
        assert_eq!(page_to_number(&last), max);
    }

    #[test]
    fn test_first_character_most_significant() {
        let mut text = "a".repeat(PAGE_LENGTH - 1);
        text.push('b');
        let page = PageBuffer::parse(&text).unwrap();
        assert_eq!(page_to_number(&page), BigUint::one());

        let mut text = String::from("b");
        text.push_str(&"a".repeat(PAGE_LENGTH - 1));
        let page = PageBuffer::parse(&text).unwrap();
        assert_eq!(page_to_number(&page), BigUint::from(RADIX).pow(PAGE_LENGTH as u32 - 1));
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(number_to_page(page_space()), Err(Error::PageNumberOverflow));
    }

    #[test]
    fn test_page_roundtrip() {
        let mut rng = StdRng::seed_from_u64(29);
        for _ in 0..4 {
            let page = random_page(&mut rng);
            let n = page_to_number(&page);
            assert!(&n < page_space());
            assert_eq!(number_to_page(&n).unwrap(), page);
        }
    }

    #[test]
    fn test_number_roundtrip() {
        for n in [BigUint::from(28u32), BigUint::from(29u32), BigUint::from(u64::MAX)] {
            assert_eq!(page_to_number(&number_to_page(&n).unwrap()), n);
        }
    }

    #[test]
    fn test_number_roundtrip_large() {
        let mut rng = StdRng::seed_from_u64(29);
        // Short byte strings give numbers with many leading `a`s
        for len in [40, 500, 1200, 1944, 2100, 2100] {
            let mut bytes = vec![0u8; len];
            rng.fill(&mut bytes[..]);
            let n = BigUint::from_bytes_le(&bytes) % page_space();

            let page = number_to_page(&n).unwrap();
            assert_eq!(page.as_str().len(), PAGE_LENGTH);
            assert_eq!(page_to_number(&page), n);
        }
    }

    #[test]
    fn test_contains_at_huge_offset() {
        let page = PageBuffer::filler(&BigUint::from(5u32));
        assert!(!page.contains_at("abc", usize::MAX));
        assert!(!page.contains_at("abc", PAGE_LENGTH - 2));
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(
            PageBuffer::parse("abc"),
            Err(Error::PageLength { expected: PAGE_LENGTH, got: 3 })
        );

        let mut text = "a".repeat(PAGE_LENGTH);
        text.replace_range(10..11, "!");
        assert_eq!(
            PageBuffer::parse(&text),
            Err(Error::InvalidAlphabet { ch: '!', position: 10 })
        );
    }

    #[test]
    fn test_with_snippet() {
        let page = PageBuffer::filler(&BigUint::from(5u32));
        let page = page.with_snippet("hello world", 100).unwrap();

        assert!(page.contains_at("hello world", 100));
        assert_eq!(page.as_str().len(), PAGE_LENGTH);
    }

    #[test]
    fn test_with_snippet_rejects() {
        let page = PageBuffer::filler(&BigUint::from(5u32));

        assert_eq!(
            page.clone().with_snippet("", 0),
            Err(Error::SnippetTooLong { len: 0 })
        );
        assert_eq!(
            page.clone().with_snippet(&"a".repeat(PAGE_LENGTH + 1), 0),
            Err(Error::SnippetTooLong { len: PAGE_LENGTH + 1 })
        );
        assert_eq!(
            page.clone().with_snippet("Hello", 0),
            Err(Error::InvalidAlphabet { ch: 'H', position: 0 })
        );
        assert_eq!(
            page.with_snippet("abc", PAGE_LENGTH - 2),
            Err(Error::InvalidOffset { offset: PAGE_LENGTH - 2, max: PAGE_LENGTH - 3 })
        );
    }

    #[test]
    fn test_serde_validates() {
        let page = PageBuffer::filler(&BigUint::from(1u32));
        let json = serde_json::to_string(&page).unwrap();
        let back: PageBuffer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, page);

        assert!(serde_json::from_str::<PageBuffer>("\"short\"").is_err());
    }
}
