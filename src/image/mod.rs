//! In-memory multi-channel rasters and the OpenEXR codec around them.

mod load;
mod save;

pub use load::{load_image, read_header};
pub use save::save_image;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use exr::prelude::{Encoding, LayerAttributes};
use ndarray::Array2;

use crate::error::{Error, Result};

/// One plane of samples, indexed `[[y, x]]`.
///
/// Always in standard (row-major) layout with shape `(height, width)`.
pub type Plane = Array2<f32>;

/// Read-only view of an image's structure.
///
/// Implemented by both decoded images and bare headers so the same
/// compatibility rules apply before and after the pixels are read.
pub trait ImageShape {
    /// Number of pixel columns.
    fn width(&self) -> usize;

    /// Number of pixel rows.
    fn height(&self) -> usize;

    /// Channel names in storage order.
    fn channel_names(&self) -> Vec<&str>;

    /// Where the image came from, for diagnostics.
    fn origin(&self) -> &Path;

    /// Number of channels.
    fn num_channels(&self) -> usize {
        self.channel_names().len()
    }
}

/// A named channel and its samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    name: String,
    samples: Plane,
}

impl Channel {
    /// Create a channel from a name and a plane of samples.
    pub fn new(name: impl Into<String>, samples: Plane) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    /// Channel name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Samples of this channel.
    #[must_use]
    pub const fn samples(&self) -> &Plane {
        &self.samples
    }

    /// Mutable samples. The plane may be written but not reshaped.
    pub fn samples_mut(&mut self) -> ndarray::ArrayViewMut2<'_, f32> {
        self.samples.view_mut()
    }
}

/// Container metadata carried from the loaded query image to the output.
#[derive(Debug, Clone)]
pub struct Layout {
    pub attributes: LayerAttributes,
    pub encoding: Encoding,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            attributes: LayerAttributes::default(),
            encoding: Encoding::FAST_LOSSLESS,
        }
    }
}

/// Image structure read from file metadata, without pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: usize,
    pub height: usize,
    pub channel_names: Vec<String>,
    pub origin: PathBuf,
}

impl ImageShape for ImageHeader {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn channel_names(&self) -> Vec<&str> {
        self.channel_names.iter().map(String::as_str).collect()
    }

    fn origin(&self) -> &Path {
        &self.origin
    }
}

/// A decoded image: dimensions plus `f32` channels of `width * height` samples.
///
/// The shape is fixed at construction; only sample values can change.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    width: usize,
    height: usize,
    channels: Vec<Channel>,
    origin: PathBuf,
    layout: Layout,
}

impl ImageHandle {
    /// Build an image from its channels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] if a dimension is zero, there are no
    /// channels, a channel name is empty or repeated, or a plane does not
    /// have shape `(height, width)`.
    pub fn new(width: usize, height: usize, channels: Vec<Channel>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(invalid(format!("dimensions must be positive, got {width}x{height}")));
        }

        if channels.is_empty() {
            return Err(invalid("at least one channel is required"));
        }

        let mut seen = HashSet::with_capacity(channels.len());
        for channel in &channels {
            if channel.name.is_empty() {
                return Err(invalid("channel names must not be empty"));
            }

            if !seen.insert(channel.name.as_str()) {
                return Err(invalid(format!("duplicate channel {:?}", channel.name)));
            }

            if channel.samples.dim() != (height, width) {
                let (rows, cols) = channel.samples.dim();
                return Err(invalid(format!(
                    "channel {:?} has {cols}x{rows} samples, expected {width}x{height}",
                    channel.name
                )));
            }
        }

        // Row-major storage is assumed by the codec and the accumulator.
        let channels = channels
            .into_iter()
            .map(|Channel { name, samples }| {
                let samples = if samples.is_standard_layout() {
                    samples
                } else {
                    samples.as_standard_layout().into_owned()
                };
                Channel { name, samples }
            })
            .collect();

        Ok(Self {
            width,
            height,
            channels,
            origin: PathBuf::new(),
            layout: Layout::default(),
        })
    }

    /// Build an image from `(name, row-major samples)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidImage`] if a buffer does not hold exactly
    /// `width * height` samples, or for any reason listed on [`ImageHandle::new`].
    pub fn from_buffers<S: Into<String>>(
        width: usize,
        height: usize,
        buffers: impl IntoIterator<Item = (S, Vec<f32>)>,
    ) -> Result<Self> {
        let channels = buffers
            .into_iter()
            .map(|(name, samples)| {
                let name = name.into();
                let len = samples.len();
                Plane::from_shape_vec((height, width), samples)
                    .map(|plane| Channel::new(name.clone(), plane))
                    .map_err(|_| {
                        invalid(format!(
                            "channel {name:?} has {len} samples, expected {}",
                            width.saturating_mul(height)
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(width, height, channels)
    }

    /// Record where this image came from.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Attach container metadata to reuse when saving.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Number of samples in every channel.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Channels in storage order.
    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [Channel] {
        &mut self.channels
    }

    /// Look up a channel by name.
    #[must_use]
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|channel| channel.name == name)
    }

    /// Contiguous row-major samples of channel `index`.
    #[must_use]
    pub fn buffer(&self, index: usize) -> Option<&[f32]> {
        self.channels
            .get(index)
            .and_then(|channel| channel.samples.as_slice())
    }

    /// Container metadata used when saving.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Header describing this image's structure.
    #[must_use]
    pub fn header(&self) -> ImageHeader {
        ImageHeader {
            width: self.width,
            height: self.height,
            channel_names: self.channels.iter().map(|c| c.name.clone()).collect(),
            origin: self.origin.clone(),
        }
    }
}

impl ImageShape for ImageHandle {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(Channel::name).collect()
    }

    fn origin(&self) -> &Path {
        &self.origin
    }

    fn num_channels(&self) -> usize {
        self.channels.len()
    }
}

fn invalid(reason: impl Into<String>) -> Error {
    Error::InvalidImage {
        reason: reason.into(),
    }
}
