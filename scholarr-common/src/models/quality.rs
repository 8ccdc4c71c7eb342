//! Quality ladder for literature releases
//!
//! A release is either a text edition (HTML/EPUB/MOBI/AZW3/PDF) or an audio
//! edition (MP3/FLAC). The ladder order itself lives in the quality profile;
//! this module only defines the tiers and their parse tokens.

use serde::{Deserialize, Serialize};

/// Known quality tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    Unknown,
    Html,
    Pdf,
    Mobi,
    Epub,
    Azw3,
    Mp3,
    Flac,
}

impl Quality {
    /// Display name as it appears in profiles and rejection reasons
    pub fn name(&self) -> &'static str {
        match self {
            Quality::Unknown => "Unknown",
            Quality::Html => "HTML",
            Quality::Pdf => "PDF",
            Quality::Mobi => "MOBI",
            Quality::Epub => "EPUB",
            Quality::Azw3 => "AZW3",
            Quality::Mp3 => "MP3",
            Quality::Flac => "FLAC",
        }
    }

    /// Parse a release-name token into a quality tier
    pub fn from_token(token: &str) -> Option<Quality> {
        match token.to_ascii_uppercase().as_str() {
            "HTML" | "HTM" => Some(Quality::Html),
            "PDF" => Some(Quality::Pdf),
            "MOBI" => Some(Quality::Mobi),
            "EPUB" => Some(Quality::Epub),
            "AZW3" | "AZW" | "KINDLE" => Some(Quality::Azw3),
            "MP3" | "MP3-320" | "MP3-V0" => Some(Quality::Mp3),
            "FLAC" => Some(Quality::Flac),
            _ => None,
        }
    }

    /// True for audio-edition tiers
    pub fn is_audio(&self) -> bool {
        matches!(self, Quality::Mp3 | Quality::Flac)
    }

    /// All tiers in default ladder order (worst to best)
    pub fn ladder() -> &'static [Quality] {
        &[
            Quality::Unknown,
            Quality::Html,
            Quality::Pdf,
            Quality::Mobi,
            Quality::Epub,
            Quality::Azw3,
            Quality::Mp3,
            Quality::Flac,
        ]
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Revision of a release (proper/repack counter)
///
/// `version` starts at 1; a "Proper" or "v2" release bumps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Revision {
    pub version: u32,
}

impl Revision {
    pub fn new(version: u32) -> Self {
        Self { version }
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self { version: 1 }
    }
}

/// Quality plus revision, as parsed from a release title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityModel {
    pub quality: Quality,
    pub revision: Revision,
}

impl QualityModel {
    pub fn new(quality: Quality) -> Self {
        Self {
            quality,
            revision: Revision::default(),
        }
    }

    pub fn with_revision(quality: Quality, version: u32) -> Self {
        Self {
            quality,
            revision: Revision::new(version),
        }
    }
}

impl Default for QualityModel {
    fn default() -> Self {
        Self::new(Quality::Unknown)
    }
}

impl std::fmt::Display for QualityModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.revision.version > 1 {
            write!(f, "{} v{}", self.quality, self.revision.version)
        } else {
            write!(f, "{}", self.quality)
        }
    }
}
