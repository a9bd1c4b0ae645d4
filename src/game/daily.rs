//! Daily State
//!
//! The shared configuration for one UTC day: which image to cut into tiles
//! and which seed shuffles it. Created once per day by the scheduled job and
//! read-only afterwards.

use chrono::NaiveDate;
use serde::{Serialize, Deserialize};

use crate::core::rng::derive_daily_seed;
use crate::game::difficulty::Difficulty;
use crate::game::puzzle::{create_shuffled_puzzle, PuzzleState};

/// Image used when no pool is configured.
pub const DEFAULT_IMAGE_URL: &str = "/static/puzzle-default.png";

/// One day's puzzle configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyState {
    /// Image the tiles are cut from.
    pub image_url: String,
    /// Source post the image came from (may be empty).
    pub post_id: String,
    /// Seed every client shuffles with.
    pub shuffle_seed: u32,
    /// UTC calendar day.
    pub date: NaiveDate,
}

impl DailyState {
    /// Build the state for `date` from an image source.
    ///
    /// The seed is derived from the date and salt first, then used to pick
    /// the image, so the whole record is reproducible. Returns `None` when the
    /// source has nothing to offer.
    pub fn generate(date: NaiveDate, salt: &str, images: &dyn ImageSource) -> Option<Self> {
        let shuffle_seed = derive_daily_seed(date, salt);
        let image = images.pick(date, shuffle_seed)?;

        Some(Self {
            image_url: image.url,
            post_id: image.post_id,
            shuffle_seed,
            date,
        })
    }

    /// The board every player starts from at `difficulty`.
    pub fn puzzle(&self, difficulty: Difficulty) -> PuzzleState {
        create_shuffled_puzzle(difficulty, self.shuffle_seed)
    }
}

/// A candidate puzzle image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    /// Image URL.
    pub url: String,
    /// Originating post identifier.
    pub post_id: String,
}

impl ImageRef {
    /// Parse `url|postId` (post id optional).
    pub fn parse(entry: &str) -> Option<Self> {
        let mut parts = entry.trim().splitn(2, '|');
        let url = parts.next()?.trim();
        if url.is_empty() {
            return None;
        }
        let post_id = parts.next().map(str::trim).unwrap_or_default();
        Some(Self {
            url: url.to_string(),
            post_id: post_id.to_string(),
        })
    }
}

/// Where the daily image comes from.
///
/// The trending-post fetch of the hosting platform sits behind this seam;
/// the server ships with a static pool.
pub trait ImageSource: Send + Sync {
    /// Choose the image for `date`.
    fn pick(&self, date: NaiveDate, seed: u32) -> Option<ImageRef>;
}

/// Fixed list of images, rotated by seed.
#[derive(Clone, Debug, Default)]
pub struct ImagePool {
    images: Vec<ImageRef>,
}

impl ImagePool {
    /// Create a pool from explicit images.
    pub fn new(images: Vec<ImageRef>) -> Self {
        Self { images }
    }

    /// Parse a comma-separated list of `url|postId` items.
    pub fn parse_list(list: &str) -> Self {
        Self::new(list.split(',').filter_map(ImageRef::parse).collect())
    }

    /// Single-image pool with [`DEFAULT_IMAGE_URL`].
    pub fn fallback() -> Self {
        Self::new(vec![ImageRef {
            url: DEFAULT_IMAGE_URL.to_string(),
            post_id: String::new(),
        }])
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageSource for ImagePool {
    fn pick(&self, _date: NaiveDate, seed: u32) -> Option<ImageRef> {
        if self.images.is_empty() {
            return None;
        }
        self.images.get(seed as usize % self.images.len()).cloned()
    }
}
