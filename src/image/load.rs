//! OpenEXR loading utilities.

use std::borrow::Cow;
use std::path::Path;

use exr::error::Error as ExrError;
use exr::meta::MetaData;
use exr::prelude::*;

use crate::error::{Error, Result};

use super::{Channel, ImageHandle, ImageHeader, Layout, Plane};

/// Read the structure of the first layer of an OpenEXR file.
///
/// Only the file metadata is parsed; no pixel blocks are decompressed.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the file cannot be read or contains no layer.
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<ImageHeader> {
    let path = path.as_ref();

    let meta = MetaData::read_from_file(path, false).map_err(|source| decode_error(path, source))?;

    let header = meta
        .headers
        .first()
        .ok_or_else(|| decode_error(path, ExrError::Invalid(Cow::Borrowed("file contains no layers"))))?;

    let header = ImageHeader {
        width: header.layer_size.0,
        height: header.layer_size.1,
        channel_names: header
            .channels
            .list
            .iter()
            .map(|channel| channel.name.to_string())
            .collect(),
        origin: path.to_path_buf(),
    };

    tracing::debug!(
        "Header of {}: {}x{} {:?}",
        path.display(),
        header.width,
        header.height,
        header.channel_names
    );

    Ok(header)
}

/// Load the first layer of an OpenEXR file with every channel as `f32`.
///
/// `f16` and `u32` samples are converted; channel order is the order stored
/// in the file.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the file cannot be decoded, or if a channel
/// is subsampled and so does not hold one sample per pixel.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageHandle> {
    let path = path.as_ref();

    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .all_channels()
        .first_valid_layer()
        .all_attributes()
        .from_file(path)
        .map_err(|source| decode_error(path, source))?;

    let layer = image.layer_data;
    let (width, height) = (layer.size.0, layer.size.1);

    let channels = layer
        .channel_data
        .list
        .into_iter()
        .map(|channel| {
            let name = channel.name.to_string();

            if channel.sampling != Vec2(1, 1) {
                return Err(decode_error(
                    path,
                    ExrError::NotSupported(Cow::Owned(format!("subsampled channel {name}"))),
                ));
            }

            let samples = to_f32(channel.sample_data);
            let plane = Plane::from_shape_vec((height, width), samples).map_err(|_| {
                decode_error(
                    path,
                    ExrError::Invalid(Cow::Owned(format!("channel {name} has the wrong sample count"))),
                )
            })?;

            Ok(Channel::new(name, plane))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        "Loaded {}: {width}x{height}, {} channels",
        path.display(),
        channels.len()
    );

    let layout = Layout {
        attributes: layer.attributes,
        encoding: layer.encoding,
    };

    Ok(ImageHandle::new(width, height, channels)?
        .with_origin(path)
        .with_layout(layout))
}

/// Convert any stored sample type to `f32`.
#[allow(clippy::cast_precision_loss)]
fn to_f32(samples: FlatSamples) -> Vec<f32> {
    match samples {
        FlatSamples::F16(values) => values.iter().map(|value| value.to_f32()).collect(),
        FlatSamples::F32(values) => values,
        FlatSamples::U32(values) => values.iter().map(|&value| value as f32).collect(),
    }
}

fn decode_error(path: &Path, source: ExrError) -> Error {
    Error::Decode {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_f32_keeps_f32_samples() {
        let samples = FlatSamples::F32(vec![0.5, -1.25, f32::INFINITY]);
        assert_eq!(to_f32(samples), vec![0.5, -1.25, f32::INFINITY]);
    }

    #[test]
    fn test_to_f32_widens_f16_and_u32() {
        let half = FlatSamples::F16(vec![f16::from_f32(0.5), f16::from_f32(2.0)]);
        assert_eq!(to_f32(half), vec![0.5, 2.0]);

        let ints = FlatSamples::U32(vec![0, 7, 1024]);
        assert_eq!(to_f32(ints), vec![0.0, 7.0, 1024.0]);
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let err = load_image("does/not/exist.exr").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert!(err.to_string().contains("does/not/exist.exr"));

        let err = read_header("does/not/exist.exr").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
