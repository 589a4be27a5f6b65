use image::RgbImage;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("empty image payload")]
    Empty,
    #[error("could not determine image format: {0}")]
    UnknownFormat(std::io::Error),
    #[error("malformed image data: {0}")]
    Malformed(image::ImageError),
}

/// Decodes an uploaded byte buffer into an RGB8 pixel grid.
///
/// The format is sniffed from the bytes themselves; uploads carry no
/// trustworthy extension or content type.
pub fn decode_image(image_data: &[u8]) -> Result<RgbImage, DecodeError> {
    if image_data.is_empty() {
        return Err(DecodeError::Empty);
    }

    let image_reader = image::ImageReader::new(Cursor::new(image_data))
        .with_guessed_format()
        .map_err(DecodeError::UnknownFormat)?;

    let decoded = image_reader.decode().map_err(DecodeError::Malformed)?;

    Ok(decoded.to_rgb8())
}
