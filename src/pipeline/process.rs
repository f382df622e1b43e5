//! Main accumulation pipeline.

use std::path::Path;

use crate::accumulate::Accumulator;
use crate::compat::check_compatible;
use crate::error::Result;
use crate::image::{self, ImageShape};

use super::Config;

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub width: usize,
    pub height: usize,
    /// Channel names of the output, in storage order.
    pub channels: Vec<String>,
    /// Number of channels that were accumulated.
    pub accumulated: usize,
}

/// Adds a reference image into a query image and writes the result.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    accumulator: Accumulator,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::debug!("Initializing pipeline with config: {config:?}");

        let accumulator = Accumulator::new(config.channels.clone()).parallel(config.parallel);

        Ok(Self {
            config,
            accumulator,
        })
    }

    /// The configuration this pipeline runs with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Load both inputs, check they match, add `reference_path` into
    /// `query_path` and save the result to `output_path`.
    ///
    /// Nothing is written unless every earlier step succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`](crate::Error::Decode) if an input cannot be
    /// read, [`Error::IncompatibleDimensions`](crate::Error::IncompatibleDimensions)
    /// or [`Error::IncompatibleChannels`](crate::Error::IncompatibleChannels)
    /// if the inputs differ in structure, and
    /// [`Error::Encode`](crate::Error::Encode) if the output cannot be written.
    pub fn process<P, Q, R>(&self, query_path: P, reference_path: Q, output_path: R) -> Result<Summary>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>,
    {
        let query_path = query_path.as_ref();
        let reference_path = reference_path.as_ref();
        let output_path = output_path.as_ref();

        if self.config.check_headers {
            let query_header = image::read_header(query_path)?;
            let reference_header = image::read_header(reference_path)?;
            check_compatible(&query_header, &reference_header)?;
            self.config.channels.resolve(&query_header)?;
        }

        tracing::info!("Loading query image: {}", query_path.display());
        let mut query = image::load_image(query_path)?;

        tracing::info!("Loading reference image: {}", reference_path.display());
        let reference = image::load_image(reference_path)?;

        check_compatible(&query, &reference)?;

        tracing::info!(
            "Accumulating {}x{} image with channels {:?}",
            query.width(),
            query.height(),
            query.channel_names()
        );
        let accumulated = self.accumulator.accumulate(&mut query, &reference)?;
        drop(reference);

        tracing::info!("Saving output to: {}", output_path.display());
        image::save_image(&query, output_path)?;

        tracing::info!("Accumulation complete");

        Ok(Summary {
            width: query.width(),
            height: query.height(),
            channels: query.channel_names().into_iter().map(str::to_string).collect(),
            accumulated,
        })
    }
}
