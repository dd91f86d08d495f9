//! Category fallback image bank.
//!
//! When no valid image survives ranking, a placeholder is picked
//! deterministically: the title is hashed with FNV-1a (32-bit) and reduced
//! modulo the size of the category's bank, so the same title always gets the
//! same picture.

use crate::result::{ImageInfo, ImageQuality, ImageSource};

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

const BITCOIN_BANK: &[&str] = &[
    "/images/fallback/bitcoin-1.jpg",
    "/images/fallback/bitcoin-2.jpg",
    "/images/fallback/bitcoin-3.jpg",
    "/images/fallback/bitcoin-4.jpg",
];

const ETHEREUM_BANK: &[&str] = &[
    "/images/fallback/ethereum-1.jpg",
    "/images/fallback/ethereum-2.jpg",
    "/images/fallback/ethereum-3.jpg",
];

const DEFI_BANK: &[&str] = &[
    "/images/fallback/defi-1.jpg",
    "/images/fallback/defi-2.jpg",
    "/images/fallback/defi-3.jpg",
];

const DEFAULT_BANK: &[&str] = &[
    "/images/fallback/markets-1.jpg",
    "/images/fallback/markets-2.jpg",
    "/images/fallback/markets-3.jpg",
    "/images/fallback/markets-4.jpg",
    "/images/fallback/markets-5.jpg",
];

/// Keyword category that selects a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCategory {
    Bitcoin,
    Ethereum,
    Defi,
    Default,
}

impl ImageCategory {
    /// Category for a piece of text (title plus description), by keyword.
    /// Checked in order: bitcoin, ethereum, defi.
    #[must_use]
    pub fn infer(text: &str) -> Self {
        let lower = text.to_lowercase();
        let has_word = |words: &[&str]| {
            lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| words.contains(&token))
        };

        if lower.contains("bitcoin") || has_word(&["btc"]) {
            Self::Bitcoin
        } else if lower.contains("ethereum") || has_word(&["eth", "ether"]) {
            Self::Ethereum
        } else if lower.contains("decentralized finance") || has_word(&["defi", "dex", "staking", "liquidity"]) {
            Self::Defi
        } else {
            Self::Default
        }
    }

    /// Placeholder images for this category.
    #[must_use]
    pub fn bank(self) -> &'static [&'static str] {
        match self {
            Self::Bitcoin => BITCOIN_BANK,
            Self::Ethereum => ETHEREUM_BANK,
            Self::Defi => DEFI_BANK,
            Self::Default => DEFAULT_BANK,
        }
    }
}

/// FNV-1a 32-bit hash.
#[must_use]
pub fn fnv1a_32(input: &str) -> u32 {
    input.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Deterministic placeholder for `title` from the bank of `category`.
#[must_use]
pub fn fallback_image(title: &str, category: ImageCategory) -> &'static str {
    let bank = category.bank();
    let index = fnv1a_32(title) as usize % bank.len();
    bank.get(index).copied().unwrap_or(DEFAULT_BANK[0])
}

/// Placeholder image record for `title`, categorised from `title` and
/// `description`.
#[must_use]
pub fn fallback_image_info(title: &str, description: &str) -> ImageInfo {
    let category = ImageCategory::infer(&format!("{title} {description}"));
    ImageInfo {
        url: fallback_image(title, category).to_string(),
        source: ImageSource::Fallback,
        quality: ImageQuality::Medium,
        width: None,
        height: None,
        is_valid: true,
    }
}
