//! OpenEXR saving utilities.

use std::borrow::Cow;
use std::path::Path;

use exr::error::Error as ExrError;
use exr::prelude::*;
use smallvec::SmallVec;

use crate::error::{Error, Result};

use super::ImageHandle;

/// Save an image as a single-layer OpenEXR file.
///
/// Every channel is written as `f32`. Layer attributes and compression are
/// taken from the image's [`Layout`](super::Layout), so an image loaded from
/// disk keeps its layer name and encoding.
///
/// Channels are stored sorted by name, as the format requires.
///
/// # Errors
///
/// Returns [`Error::Encode`] if a channel name cannot be stored or the file
/// cannot be written.
pub fn save_image<P: AsRef<Path>>(image: &ImageHandle, path: P) -> Result<()> {
    let path = path.as_ref();

    let list = image
        .channels()
        .iter()
        .map(|channel| {
            let name = Text::new_or_none(channel.name()).ok_or_else(|| {
                encode_error(
                    path,
                    ExrError::NotSupported(Cow::Owned(format!(
                        "channel name {:?} is not valid in OpenEXR",
                        channel.name()
                    ))),
                )
            })?;

            let samples = channel.samples().iter().copied().collect();

            Ok(AnyChannel::new(name, FlatSamples::F32(samples)))
        })
        .collect::<Result<SmallVec<[_; 4]>>>()?;

    let layout = image.layout();
    let layer = Layer::new(
        (image.width, image.height),
        layout.attributes.clone(),
        layout.encoding,
        AnyChannels::sort(list),
    );

    tracing::debug!(
        "Writing {} channels to {}",
        image.channels().len(),
        path.display()
    );

    Image::from_layer(layer)
        .write()
        .to_file(path)
        .map_err(|source| encode_error(path, source))
}

fn encode_error(path: &Path, source: ExrError) -> Error {
    Error::Encode {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::load_image;

    #[test]
    fn test_round_trip_preserves_shape_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round_trip.exr");

        let image = ImageHandle::from_buffers(
            3,
            2,
            [
                ("B", vec![0.0, 0.25, 0.5, 0.75, 1.0, 1.25]),
                ("G", vec![-1.0, -2.0, -3.0, 1e6, 1e-6, 42.0]),
                ("R", vec![1.5; 6]),
            ],
        )
        .unwrap();

        save_image(&image, &path).unwrap();
        let loaded = load_image(&path).unwrap();

        assert_eq!(loaded.width, 3);
        assert_eq!(loaded.height, 2);
        for (expected, actual) in image.channels().iter().zip(loaded.channels()) {
            assert_eq!(expected.name(), actual.name());
            assert_eq!(expected.samples(), actual.samples());
        }
        assert_eq!(loaded.origin, path);
    }

    #[test]
    fn test_channels_are_written_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sorted.exr");

        let image =
            ImageHandle::from_buffers(1, 1, [("Z", vec![3.0]), ("A", vec![1.0])]).unwrap();
        save_image(&image, &path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.channel("A").unwrap().samples()[[0, 0]], 1.0);
        assert_eq!(loaded.channel("Z").unwrap().samples()[[0, 0]], 3.0);
        assert_eq!(loaded.channels()[0].name(), "A");
    }

    #[test]
    fn test_unwritable_path_is_encode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.exr");

        let image = ImageHandle::from_buffers(1, 1, [("Y", vec![0.0])]).unwrap();
        let err = save_image(&image, &path).unwrap_err();

        assert!(matches!(err, Error::Encode { .. }));
    }
}
