//! Working-set construction and random presentation order

use crate::io::error::{GmiError, Result, invalid_parameter};
use crate::session::assets::Asset;
use crate::session::trial::{Category, Direction};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// How many images to show and how to draw them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Number of trials in the session
    pub count: usize,
    /// Draw every trial independently instead of walking a shuffled working set
    pub repeats: bool,
    /// Cut every category/direction bucket down to the smallest bucket's size
    pub balance: bool,
}

/// Hands out images for a session in random order
#[derive(Debug)]
pub struct ImageProvider {
    working_set: Vec<Asset>,
    repeats: bool,
    count: usize,
    shown: usize,
    rng: StdRng,
}

impl ImageProvider {
    /// Build the working set from scanned assets
    ///
    /// # Errors
    ///
    /// Returns an error if `count` is zero or there are no assets
    pub fn new(assets: Vec<Asset>, config: ProviderConfig, mut rng: StdRng) -> Result<Self> {
        if config.count == 0 {
            return Err(invalid_parameter(
                "count",
                &config.count,
                &"at least one image must be shown",
            ));
        }
        if assets.is_empty() {
            return Err(GmiError::NoImages {
                root: PathBuf::new(),
            });
        }

        let mut working_set = if config.balance {
            balanced(assets, &mut rng)
        } else {
            assets
        };

        if !config.repeats {
            resize(&mut working_set, config.count, &mut rng);
            working_set.shuffle(&mut rng);
        }

        tracing::debug!(
            "Working set of {} images for {} trials",
            working_set.len(),
            config.count
        );

        Ok(Self {
            working_set,
            repeats: config.repeats,
            count: config.count,
            shown: 0,
            rng,
        })
    }

    /// Images the session draws from
    pub fn working_set(&self) -> &[Asset] {
        &self.working_set
    }

    /// Number of trials the session will show
    pub const fn total(&self) -> usize {
        self.count
    }

    /// Number of images handed out so far
    pub const fn shown(&self) -> usize {
        self.shown
    }
}

impl Iterator for ImageProvider {
    type Item = Asset;

    fn next(&mut self) -> Option<Asset> {
        if self.shown >= self.count {
            return None;
        }

        let asset = if self.repeats {
            self.working_set.choose(&mut self.rng).cloned()
        } else {
            self.working_set.get(self.shown).cloned()
        }?;

        self.shown += 1;
        tracing::debug!("Seen {} of {} images", self.shown, self.count);
        Some(asset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count.saturating_sub(self.shown);
        (remaining, Some(remaining))
    }
}

// Every non-empty bucket is randomly cut to the size of the smallest one
fn balanced(assets: Vec<Asset>, rng: &mut StdRng) -> Vec<Asset> {
    let mut buckets: BTreeMap<(Category, Direction), Vec<Asset>> = BTreeMap::new();
    for asset in assets {
        buckets
            .entry((asset.category, asset.direction))
            .or_default()
            .push(asset);
    }

    let smallest = buckets.values().map(Vec::len).min().unwrap_or(0);
    buckets
        .into_values()
        .flat_map(|mut bucket| {
            bucket.shuffle(rng);
            bucket.truncate(smallest);
            bucket
        })
        .collect()
}

// Grow by duplicating random entries or shrink by dropping random entries
fn resize(set: &mut Vec<Asset>, size: usize, rng: &mut StdRng) {
    while set.len() < size {
        let Some(extra) = set.choose(rng).cloned() else {
            return;
        };
        set.push(extra);
    }
    while set.len() > size {
        let index = rng.random_range(0..set.len());
        set.swap_remove(index);
    }
}
