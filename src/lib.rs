//! # exradd
//!
//! Adds two multi-channel OpenEXR images together, sample by sample.
//!
//! The two inputs must share width, height and the ordered list of channel
//! names. Every sample of the reference image is added to the matching sample
//! of the query image using plain `f32` arithmetic, and the result is written
//! as a new OpenEXR file.
//!
//! ## Example
//!
//! ```no_run
//! use exradd::{Config, Pipeline};
//!
//! # fn main() -> exradd::Result<()> {
//! let pipeline = Pipeline::new(Config::default())?;
//!
//! pipeline.process("beauty.exr", "extra.exr", "sum.exr")?;
//! # Ok(())
//! # }
//! ```
//!
//! The building blocks are available on their own:
//!
//! ```no_run
//! use exradd::image::{load_image, save_image};
//!
//! # fn main() -> exradd::Result<()> {
//! let mut query = load_image("a.exr")?;
//! let reference = load_image("b.exr")?;
//!
//! exradd::accumulate(&mut query, &reference)?;
//! save_image(&query, "sum.exr")?;
//! # Ok(())
//! # }
//! ```

pub mod accumulate;
pub mod compat;
pub mod error;
pub mod image;
pub mod pipeline;

pub use accumulate::{accumulate, Accumulator, ChannelSelection};
pub use compat::check_compatible;
pub use error::{Error, Result};
pub use image::{ImageHandle, ImageHeader, ImageShape};
pub use pipeline::{Config, Pipeline, Summary};
