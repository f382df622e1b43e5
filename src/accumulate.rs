//! In-place, per-channel accumulation of a reference image into a query image.

use ndarray::{ArrayViewMut2, Zip};
use rayon::prelude::*;

use crate::compat::check_compatible;
use crate::error::{Error, Result};
use crate::image::{ImageHandle, ImageShape, Plane};

/// Minimum number of samples in a plane to split it across threads.
pub const PARALLEL_THRESHOLD: usize = 30_000;

/// Which channels of the query image receive the reference samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChannelSelection {
    /// Every channel.
    #[default]
    All,
    /// Channels at these positions.
    Indices(Vec<usize>),
    /// Channels with these names.
    Names(Vec<String>),
}

impl ChannelSelection {
    /// Whether the selection names no channel at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::All => false,
            Self::Indices(indices) => indices.is_empty(),
            Self::Names(names) => names.is_empty(),
        }
    }

    /// Resolve the selection against an image into a per-channel mask.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if an index is out of range or a
    /// name does not exist in `image`.
    pub fn resolve<S: ImageShape + ?Sized>(&self, image: &S) -> Result<Vec<bool>> {
        let names = image.channel_names();

        match self {
            Self::All => Ok(vec![true; names.len()]),
            Self::Indices(indices) => {
                let mut mask = vec![false; names.len()];
                for &index in indices {
                    let slot = mask.get_mut(index).ok_or_else(|| Error::InvalidParameter {
                        name: "channels".to_string(),
                        reason: format!(
                            "index {index} is out of range for {} channels",
                            names.len()
                        ),
                    })?;
                    *slot = true;
                }
                Ok(mask)
            }
            Self::Names(wanted) => {
                let mut mask = vec![false; names.len()];
                for name in wanted {
                    let index = names
                        .iter()
                        .position(|candidate| *candidate == name.as_str())
                        .ok_or_else(|| Error::InvalidParameter {
                            name: "channels".to_string(),
                            reason: format!(
                                "no channel named {name:?} in {}",
                                image.origin().display()
                            ),
                        })?;
                    mask[index] = true;
                }
                Ok(mask)
            }
        }
    }
}

/// Adds reference samples into a query image.
#[derive(Debug, Clone)]
pub struct Accumulator {
    selection: ChannelSelection,
    parallel: bool,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new(ChannelSelection::All)
    }
}

impl Accumulator {
    /// Create an accumulator for the given channels, running in parallel.
    #[must_use]
    pub fn new(selection: ChannelSelection) -> Self {
        Self {
            selection,
            parallel: true,
        }
    }

    /// Enable or disable multi-threaded accumulation.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Add `reference` into `query`, sample by sample, for every selected channel.
    ///
    /// Uses plain `f32` addition: no clamping, NaN and infinities propagate.
    /// `reference` is only read. Unselected channels are left untouched.
    ///
    /// Returns the number of channels that were accumulated.
    ///
    /// # Errors
    ///
    /// Returns the error of [`check_compatible`] if the images differ in
    /// structure, or [`Error::InvalidParameter`] if the selection does not
    /// resolve against `query`. `query` is unchanged on error.
    pub fn accumulate(&self, query: &mut ImageHandle, reference: &ImageHandle) -> Result<usize> {
        check_compatible(&*query, reference)?;

        let mask = self.selection.resolve(&*query)?;
        let selected = mask.iter().filter(|&&selected| selected).count();

        tracing::debug!(
            "Accumulating {selected} of {} channels over {} pixels",
            mask.len(),
            query.pixel_count()
        );

        if self.parallel {
            query
                .channels_mut()
                .par_iter_mut()
                .zip(reference.channels().par_iter())
                .enumerate()
                .filter(|(index, _)| mask[*index])
                .for_each(|(_, (target, source))| {
                    add_assign(target.samples_mut(), source.samples(), true);
                });
        } else {
            query
                .channels_mut()
                .iter_mut()
                .zip(reference.channels())
                .enumerate()
                .filter(|(index, _)| mask[*index])
                .for_each(|(_, (target, source))| {
                    add_assign(target.samples_mut(), source.samples(), false);
                });
        }

        Ok(selected)
    }
}

/// Accumulate every channel of `reference` into `query`.
///
/// # Errors
///
/// See [`Accumulator::accumulate`].
pub fn accumulate(query: &mut ImageHandle, reference: &ImageHandle) -> Result<()> {
    Accumulator::default().accumulate(query, reference).map(drop)
}

fn add_assign(target: ArrayViewMut2<'_, f32>, source: &Plane, parallel: bool) {
    let zip = Zip::from(target).and(source);

    if parallel && source.len() >= PARALLEL_THRESHOLD {
        zip.par_for_each(|sum, &sample| *sum += sample);
    } else {
        zip.for_each(|sum, &sample| *sum += sample);
    }
}
