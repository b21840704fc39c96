//! Image preprocessing for classifier input.
//!
//! Decodes an image file, stretches it to the model's input size and packs
//! the pixels into a flat NHWC byte buffer (rows outer, columns inner, RGB).

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbImage};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::interpreter::InputShape;

/// URI prefix accepted in front of local image paths.
pub const FILE_URI_PREFIX: &str = "file://";

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Failed to read image {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to read image {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Invalid input shape: {0}")]
    InvalidShape(String),
}

/// Resampling filter used when stretching to the input size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    /// Bilinear filtering.
    #[default]
    Triangle,
    Nearest,
}

impl ResizeFilter {
    fn filter_type(self) -> FilterType {
        match self {
            Self::Triangle => FilterType::Triangle,
            Self::Nearest => FilterType::Nearest,
        }
    }
}

impl FromStr for ResizeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "triangle" | "bilinear" => Ok(Self::Triangle),
            "nearest" => Ok(Self::Nearest),
            other => Err(format!("unknown resize filter: {}", other)),
        }
    }
}

impl fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Triangle => write!(f, "triangle"),
            Self::Nearest => write!(f, "nearest"),
        }
    }
}

/// Strip a leading `file://` from a path handed over by the host.
pub fn strip_file_uri(path: &str) -> &str {
    path.strip_prefix(FILE_URI_PREFIX).unwrap_or(path)
}

/// Turns image files into classifier input buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocessor {
    filter: ResizeFilter,
}

impl Preprocessor {
    pub fn new(filter: ResizeFilter) -> Self {
        Self { filter }
    }

    /// Decode the file at `path` and pack it for a model with `shape`.
    ///
    /// The format is sniffed from the file contents, so a mislabelled
    /// extension still decodes.
    pub fn preprocess_file(
        &self,
        path: &str,
        shape: InputShape,
    ) -> Result<Vec<u8>, PreprocessError> {
        let path = Path::new(strip_file_uri(path));
        let image = decode(path)?;
        debug!(
            path = %path.display(),
            src_width = image.width(),
            src_height = image.height(),
            dst_width = shape.width,
            dst_height = shape.height,
            "decoded image"
        );
        self.preprocess_image(&image, shape)
    }

    /// Stretch an already decoded image to `shape` and pack it.
    pub fn preprocess_image(
        &self,
        image: &DynamicImage,
        shape: InputShape,
    ) -> Result<Vec<u8>, PreprocessError> {
        if shape.is_empty() {
            return Err(PreprocessError::InvalidShape(format!("{:?}", shape)));
        }
        let width = u32::try_from(shape.width)
            .map_err(|_| PreprocessError::InvalidShape(format!("width {}", shape.width)))?;
        let height = u32::try_from(shape.height)
            .map_err(|_| PreprocessError::InvalidShape(format!("height {}", shape.height)))?;

        let resized = image
            .resize_exact(width, height, self.filter.filter_type())
            .to_rgb8();
        Ok(pack_pixels(&resized, shape.channels))
    }
}

fn decode(path: &Path) -> Result<DynamicImage, PreprocessError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|source| PreprocessError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    reader.decode().map_err(|source| PreprocessError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Pack pixels row-major into `channels` bytes each.
///
/// Channel `k` takes the RGB component `k`; channels past the third are zero.
pub fn pack_pixels(image: &RgbImage, channels: usize) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let mut buffer = Vec::with_capacity(width as usize * height as usize * channels);

    for y in 0..height {
        for x in 0..width {
            let rgb = image.get_pixel(x, y).0;
            for c in 0..channels {
                buffer.push(rgb.get(c).copied().unwrap_or(0));
            }
        }
    }
    buffer
}
