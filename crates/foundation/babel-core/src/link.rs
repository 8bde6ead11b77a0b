//! Share links
//!
//! ```text
//! https://host/browse.html#<address>#<w>-<s>-<v>-<p>#<pos>$<snippet>
//!                          └───────┘ └─────────────┘ └────────────┘
//!                          required   optional         optional, snippet url-encoded
//! ```
//!
//! A link carries no state of its own beyond these parts; resolving it runs
//! the normal decode path.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::address::{Address, EncodedPage, Library, SnippetMark};
use crate::page::{PageBuffer, PAGE_LENGTH};
use crate::position::Coordinate;
use crate::{Error, Result};

const PART_SEPARATOR: char = '#';
const SNIPPET_SEPARATOR: char = '$';

/// Everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )`, as browsers' `encodeURIComponent`
const SNIPPET_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedSnippet {
    pub at: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    pub address: Address,
    pub coordinate: Option<Coordinate>,
    pub snippet: Option<SharedSnippet>,
}

/// A resolved link, ready to display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareView {
    pub address: Address,
    pub coordinate: Coordinate,
    pub page: PageBuffer,
    pub highlight: Option<SnippetMark>,
}

impl ShareLink {
    pub fn new(address: Address) -> Self {
        Self { address, coordinate: None, snippet: None }
    }

    /// Link for an encode/browse result, snippet included when there is one
    pub fn for_page(encoded: &EncodedPage) -> Self {
        let snippet = encoded.snippet.and_then(|mark| {
            encoded.page.slice(mark.range()).map(|text| SharedSnippet {
                at: mark.at,
                text: text.to_string(),
            })
        });

        Self {
            address: encoded.address.clone(),
            coordinate: Some(encoded.coordinate),
            snippet,
        }
    }

    pub fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = Some(coordinate);
        self
    }

    pub fn with_snippet(mut self, at: usize, text: impl Into<String>) -> Self {
        self.snippet = Some(SharedSnippet { at, text: text.into() });
        self
    }

    pub fn to_fragment(&self) -> String {
        let mut fragment = self.address.to_string();

        if self.coordinate.is_some() || self.snippet.is_some() {
            fragment.push(PART_SEPARATOR);
            if let Some(coordinate) = &self.coordinate {
                fragment.push_str(&coordinate.to_link_part());
            }
        }

        if let Some(snippet) = &self.snippet {
            fragment.push(PART_SEPARATOR);
            fragment.push_str(&snippet.at.to_string());
            fragment.push(SNIPPET_SEPARATOR);
            fragment.extend(utf8_percent_encode(&snippet.text, SNIPPET_ENCODE_SET));
        }

        fragment
    }

    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_fragment(Some(&self.to_fragment()));
        url
    }

    /// Accepts a full URL or a bare fragment, with or without the leading `#`
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let fragment = match Url::parse(input) {
            Ok(url) => url
                .fragment()
                .map(str::to_string)
                .ok_or_else(|| Error::MalformedLink("URL has no fragment".into()))?,
            Err(_) => input.trim_start_matches(PART_SEPARATOR).to_string(),
        };

        let mut parts = fragment.splitn(3, PART_SEPARATOR);
        let address: Address = parts.next().unwrap_or_default().parse()?;

        let coordinate = match parts.next() {
            Some(part) if !part.is_empty() => Some(part.parse::<Coordinate>()?),
            _ => None,
        };

        let snippet = match parts.next() {
            Some(part) if !part.is_empty() => Some(parse_snippet(part)?),
            _ => None,
        };

        Ok(Self { address, coordinate, snippet })
    }

    /// Decode the page this link points at.
    ///
    /// Without a coordinate the address is located instead. A carried snippet
    /// must match the page at its offset.
    pub fn resolve(&self) -> Result<ShareView> {
        let (coordinate, page) = match &self.coordinate {
            Some(coordinate) => (*coordinate, Library::decode(self.address.as_str(), coordinate)?),
            None => Library::locate(self.address.as_str())?,
        };

        let highlight = match &self.snippet {
            Some(snippet) => {
                if !page.contains_at(&snippet.text, snippet.at) {
                    return Err(Error::MalformedLink(format!(
                        "snippet is not on the page at offset {}",
                        snippet.at
                    )));
                }
                Some(SnippetMark { at: snippet.at, len: snippet.text.len() })
            }
            None => None,
        };

        Ok(ShareView { address: self.address.clone(), coordinate, page, highlight })
    }
}

fn parse_snippet(part: &str) -> Result<SharedSnippet> {
    let (at, encoded) = part
        .split_once(SNIPPET_SEPARATOR)
        .ok_or_else(|| Error::MalformedLink(format!("snippet part {:?} lacks '$'", part)))?;

    let at: usize = at
        .parse()
        .map_err(|_| Error::MalformedLink(format!("snippet offset {:?} is not a number", at)))?;
    if at >= PAGE_LENGTH {
        return Err(Error::MalformedLink(format!("snippet offset {} is off the page", at)));
    }

    // `+` is a space in form encoding; the alphabet has no literal plus
    let encoded = encoded.replace('+', " ");
    let text = percent_decode_str(&encoded)
        .decode_utf8()
        .map_err(|_| Error::MalformedLink("snippet is not url-encoded utf-8".into()))?
        .into_owned();

    if text.is_empty() {
        return Err(Error::MalformedLink("empty snippet".into()));
    }
    Ok(SharedSnippet { at, text })
}
