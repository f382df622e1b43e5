//! Structural compatibility between a query and a reference image.

use crate::error::{Error, Result};
use crate::image::ImageShape;

/// Check that `query` and `reference` can be accumulated.
///
/// Width, height and channel count are compared first, then channel names
/// position by position. A channel present in both images at different
/// positions is a mismatch.
///
/// # Errors
///
/// Returns [`Error::IncompatibleDimensions`] if width, height or channel count
/// differ, and [`Error::IncompatibleChannels`] for the first position whose
/// channel names differ.
pub fn check_compatible<Q, R>(query: &Q, reference: &R) -> Result<()>
where
    Q: ImageShape + ?Sized,
    R: ImageShape + ?Sized,
{
    let query_names = query.channel_names();
    let reference_names = reference.channel_names();

    let query_size = (query.width(), query.height(), query_names.len());
    let reference_size = (reference.width(), reference.height(), reference_names.len());

    if query_size != reference_size {
        return Err(Error::IncompatibleDimensions {
            query: query.origin().to_path_buf(),
            reference: reference.origin().to_path_buf(),
            query_size,
            reference_size,
        });
    }

    if let Some((index, (query_channel, reference_channel))) = query_names
        .iter()
        .zip(&reference_names)
        .enumerate()
        .find(|(_, (q, r))| q != r)
    {
        return Err(Error::IncompatibleChannels {
            query: query.origin().to_path_buf(),
            reference: reference.origin().to_path_buf(),
            index,
            query_channel: (*query_channel).to_string(),
            reference_channel: (*reference_channel).to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::image::{ImageHandle, ImageHeader};

    fn header(width: usize, height: usize, names: &[&str]) -> ImageHeader {
        ImageHeader {
            width,
            height,
            channel_names: names.iter().map(ToString::to_string).collect(),
            origin: PathBuf::from("query.exr"),
        }
    }

    fn filled(width: usize, height: usize, names: &[&str]) -> ImageHandle {
        ImageHandle::from_buffers(
            width,
            height,
            names.iter().map(|name| (*name, vec![0.0; width * height])),
        )
        .unwrap()
    }

    #[test]
    fn test_identical_structure_is_compatible() {
        let a = filled(2, 1, &["Z"]);
        let b = filled(2, 1, &["Z"]);
        assert!(check_compatible(&a, &b).is_ok());

        let a = filled(3, 3, &["B", "G", "R"]);
        let b = filled(3, 3, &["B", "G", "R"]);
        assert!(check_compatible(&a, &b).is_ok());
    }

    #[test]
    fn test_height_mismatch_is_dimension_error() {
        let query = filled(4, 4, &["R"]);
        let reference = filled(4, 5, &["R"]);

        let err = check_compatible(&query, &reference).unwrap_err();
        assert!(matches!(
            err,
            Error::IncompatibleDimensions {
                query_size: (4, 4, 1),
                reference_size: (4, 5, 1),
                ..
            }
        ));
    }

    #[test]
    fn test_width_and_channel_count_mismatch_is_dimension_error() {
        let err = check_compatible(&header(3, 2, &["R"]), &header(2, 2, &["R"])).unwrap_err();
        assert!(matches!(err, Error::IncompatibleDimensions { .. }));

        let err = check_compatible(&header(2, 2, &["R", "G"]), &header(2, 2, &["R"])).unwrap_err();
        assert!(matches!(err, Error::IncompatibleDimensions { .. }));
    }

    #[test]
    fn test_dimensions_are_reported_before_channels() {
        let err = check_compatible(&header(2, 2, &["X"]), &header(2, 3, &["Y"])).unwrap_err();
        assert!(matches!(err, Error::IncompatibleDimensions { .. }));
    }

    #[test]
    fn test_permuted_channels_are_incompatible() {
        let query = header(2, 2, &["R", "G", "B"]);
        let reference = header(2, 2, &["R", "B", "G"]);

        match check_compatible(&query, &reference).unwrap_err() {
            Error::IncompatibleChannels {
                index,
                query_channel,
                reference_channel,
                ..
            } => {
                assert_eq!(index, 1);
                assert_eq!(query_channel, "G");
                assert_eq!(reference_channel, "B");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_renamed_channel_is_incompatible() {
        let err = check_compatible(&header(1, 1, &["A", "B"]), &header(1, 1, &["A", "b"])).unwrap_err();
        assert!(matches!(err, Error::IncompatibleChannels { index: 1, .. }));
    }

    #[test]
    fn test_errors_carry_both_origins() {
        let query = filled(1, 1, &["Y"]).with_origin("left.exr");
        let reference = filled(1, 2, &["Y"]).with_origin("right.exr");

        let message = check_compatible(&query, &reference).unwrap_err().to_string();
        assert!(message.contains("left.exr"));
        assert!(message.contains("right.exr"));
    }

    #[test]
    fn test_header_and_handle_agree() {
        let handle = filled(2, 2, &["B", "G"]);
        let header = handle.header();

        assert!(check_compatible(&header, &handle).is_ok());
        assert!(check_compatible(&handle, &header).is_ok());
    }
}
