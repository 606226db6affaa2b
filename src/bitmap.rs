use std::path::Path;

use image::{ImageReader, RgbImage};
use log::debug;

use crate::error::CurveError;

/// Load an image from disk as 8-bit RGB. Alpha is discarded.
pub fn load_rgb(path: &Path) -> Result<RgbImage, CurveError> {
    let img = ImageReader::open(path)
        .map_err(|e| CurveError::ImageLoad(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| CurveError::ImageLoad(e.to_string()))?
        .decode()
        .map_err(|e| CurveError::ImageLoad(e.to_string()))?
        .into_rgb8();

    if img.width() == 0 || img.height() == 0 {
        return Err(CurveError::EmptyImage);
    }
    debug!("loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}
