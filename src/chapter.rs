//! Embedded chapter artwork.
//!
//! Chapter metadata stores a locator string per chapter image. Most are
//! ordinary URLs; images embedded in the media file itself are referenced as
//! `embedded-image://<mime>@<byte offset>:<byte length>`. That layout is a
//! persisted format and must round-trip exactly.
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{self, Read, Seek, SeekFrom};
use std::str::FromStr;

use thiserror::Error;

const EMBEDDED_IMAGE_PREFIX: &str = "embedded-image://";

/// The locator does not follow the embedded-image grammar.
///
/// Not a failure: callers treat the locator as a plain external URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Not an embedded chapter image: {0}")]
pub struct NotEmbeddedError(pub String);

// ============================================================================
// EmbeddedChapterImage
// ============================================================================

/// Chapter artwork stored inside the media file.
///
/// Two references are equal iff their locator strings are equal.
#[derive(Debug, Clone)]
pub struct EmbeddedChapterImage {
    mime: String,
    position: u64,
    length: u64,
    url: String,
}

impl EmbeddedChapterImage {
    pub fn new(mime: impl Into<String>, position: u64, length: u64) -> Self {
        let mime = mime.into();
        let url = Self::make_url(&mime, position, length);
        Self {
            mime,
            position,
            length,
            url,
        }
    }

    /// Format a locator. `mime` must not contain `@`.
    pub fn make_url(mime: &str, position: u64, length: u64) -> String {
        format!("{EMBEDDED_IMAGE_PREFIX}{mime}@{position}:{length}")
    }

    /// Parse a locator.
    ///
    /// The whole string must match `embedded-image://<mime>@<digits>:<digits>`.
    /// The mime extends to the last `@` and may be empty.
    pub fn parse(url: &str) -> Result<Self, NotEmbeddedError> {
        let not_embedded = || NotEmbeddedError(url.to_string());

        let rest = url.strip_prefix(EMBEDDED_IMAGE_PREFIX).ok_or_else(not_embedded)?;
        let (mime, range) = rest.rsplit_once('@').ok_or_else(not_embedded)?;
        let (position, length) = range.split_once(':').ok_or_else(not_embedded)?;

        let position = parse_decimal(position).ok_or_else(not_embedded)?;
        let length = parse_decimal(length).ok_or_else(not_embedded)?;

        Ok(Self {
            mime: mime.to_string(),
            position,
            length,
            url: url.to_string(),
        })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Byte offset of the image inside the media file.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Read the image bytes out of the media file.
    ///
    /// The buffer only grows with bytes actually read. Fails with
    /// `UnexpectedEof` if the file ends before `length` bytes.
    pub fn read_from<R: Read + Seek>(&self, mut reader: R) -> io::Result<Vec<u8>> {
        reader.seek(SeekFrom::Start(self.position))?;
        let mut buf = Vec::new();
        reader.take(self.length).read_to_end(&mut buf)?;
        if buf.len() as u64 != self.length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "embedded image ends after {} of {} bytes",
                    buf.len(),
                    self.length
                ),
            ));
        }
        Ok(buf)
    }
}

/// Non-empty ASCII digits only; rejects signs and values beyond `u64`.
fn parse_decimal(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl PartialEq for EmbeddedChapterImage {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for EmbeddedChapterImage {}

impl Hash for EmbeddedChapterImage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl FromStr for EmbeddedChapterImage {
    type Err = NotEmbeddedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EmbeddedChapterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Whether `url` is an embedded-image locator.
pub fn is_embedded(url: &str) -> bool {
    EmbeddedChapterImage::parse(url).is_ok()
}

// ============================================================================
// Chapter Resolution
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: Option<String>,
    pub start_ms: u64,
    /// Image locator, either a URL or an embedded-image reference.
    pub image_url: Option<String>,
}

/// A playable media item with chapter marks.
pub trait Playable {
    fn chapters(&self) -> &[Chapter];
}

/// Where a chapter's artwork comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterArtwork {
    Embedded(EmbeddedChapterImage),
    External(String),
}

/// Classify the artwork of chapter `chapter` of `media`.
///
/// Returns `None` if the chapter has no image.
///
/// # Panics
///
/// Panics if `chapter` is not a valid index into `media.chapters()`.
pub fn resolve_chapter_artwork<P: Playable + ?Sized>(
    media: &P,
    chapter: usize,
) -> Option<ChapterArtwork> {
    let url = media.chapters()[chapter].image_url.as_deref()?;
    Some(match EmbeddedChapterImage::parse(url) {
        Ok(image) => ChapterArtwork::Embedded(image),
        Err(_) => ChapterArtwork::External(url.to_string()),
    })
}
