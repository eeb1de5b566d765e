//! LSB (Least Significant Bit) steganography for images.
//!
//! Hides a frame in the least significant bit of the R, G and B channels.
//! Alpha is never touched. Only lossless formats (PNG, BMP) preserve the data.
//!
//! Bit order is the wire contract: pixels in raster order (row-major), channels
//! R, G, B within a pixel, and frame bytes most-significant bit first. There is
//! no end marker; extraction follows the frame's own length fields and stops.

use std::io::{self, Cursor, Read};
use std::path::Path;

use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::debug;

use crate::frame::{read_frame_bytes, FrameError};

/// Channels per pixel carrying one hidden bit each (R, G, B).
pub const CHANNELS_PER_PIXEL: usize = 3;

/// Errors that can occur during image steganography.
#[derive(Error, Debug)]
pub enum LsbError {
    #[error("Image too small to hide data: need {needed} bytes, have capacity for {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("Image load error: {0}")]
    ImageLoadError(String),

    #[error("Image save error: {0}")]
    ImageSaveError(String),

    #[error("Invalid frame in image: {0}")]
    Frame(#[from] FrameError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Number of hidden bits an image can carry.
pub fn capacity_bits(image: &DynamicImage) -> u64 {
    u64::from(image.width()) * u64::from(image.height()) * CHANNELS_PER_PIXEL as u64
}

/// Largest frame, in bytes, that fits in the image.
pub fn capacity_bytes(image: &DynamicImage) -> usize {
    (capacity_bits(image) / 8) as usize
}

/// Embeds `frame` into a copy of `image`.
///
/// Fails before touching any pixel if the frame does not fit. Images with an
/// alpha channel come back as RGBA8 with alpha unchanged, all others as RGB8.
pub fn embed(image: &DynamicImage, frame: &[u8]) -> Result<DynamicImage, LsbError> {
    let capacity = capacity_bytes(image);
    if frame.len() > capacity {
        return Err(LsbError::CapacityExceeded {
            needed: frame.len(),
            capacity,
        });
    }

    debug!(
        frame_bytes = frame.len(),
        capacity,
        width = image.width(),
        height = image.height(),
        "embedding frame"
    );

    if image.color().has_alpha() {
        let mut rgba = image.to_rgba8();
        write_bits(&mut rgba, 4, frame);
        Ok(DynamicImage::ImageRgba8(rgba))
    } else {
        let mut rgb = image.to_rgb8();
        write_bits(&mut rgb, 3, frame);
        Ok(DynamicImage::ImageRgb8(rgb))
    }
}

/// Extracts the raw frame bytes hidden in `image`.
///
/// Reads only as many bits as the frame header declares.
pub fn extract(image: &DynamicImage) -> Result<Vec<u8>, LsbError> {
    let converted;
    let (samples, stride): (&[u8], usize) = match image {
        DynamicImage::ImageRgb8(buf) => (buf.as_raw(), 3),
        DynamicImage::ImageRgba8(buf) => (buf.as_raw(), 4),
        other => {
            converted = other.to_rgb8();
            (converted.as_raw(), 3)
        }
    };
    let mut reader = LsbReader::new(samples, stride);
    let frame = read_frame_bytes(&mut reader)?;

    debug!(frame_bytes = frame.len(), bits_read = reader.bits_read(), "extracted frame");
    Ok(frame)
}

fn write_bits(samples: &mut [u8], stride: usize, frame: &[u8]) {
    let bits = frame
        .iter()
        .flat_map(|byte| (0..8).rev().map(move |shift| (byte >> shift) & 1));
    let slots = samples
        .chunks_exact_mut(stride)
        .flat_map(|pixel| pixel.into_iter().take(CHANNELS_PER_PIXEL));

    for (slot, bit) in slots.zip(bits) {
        *slot = (*slot & 0xFE) | bit;
    }
}

/// Reads LSBs of interleaved pixel samples as a byte stream.
struct LsbReader<'a> {
    samples: &'a [u8],
    stride: usize,
    slot: usize,
    total_slots: usize,
}

impl<'a> LsbReader<'a> {
    fn new(samples: &'a [u8], stride: usize) -> Self {
        Self {
            samples,
            stride,
            slot: 0,
            total_slots: samples.len() / stride * CHANNELS_PER_PIXEL,
        }
    }

    fn bits_read(&self) -> usize {
        self.slot
    }

    fn next_bit(&mut self) -> u8 {
        let pixel = self.slot / CHANNELS_PER_PIXEL;
        let channel = self.slot % CHANNELS_PER_PIXEL;
        self.slot += 1;
        self.samples[pixel * self.stride + channel] & 1
    }
}

impl Read for LsbReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut written = 0;
        for out in buf.iter_mut() {
            if self.total_slots - self.slot < 8 {
                break;
            }
            *out = (0..8).fold(0u8, |acc, _| (acc << 1) | self.next_bit());
            written += 1;
        }
        Ok(written)
    }
}

/// Image steganography handler.
pub struct ImageStego {
    image: DynamicImage,
}

impl ImageStego {
    /// Creates a new ImageStego from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LsbError> {
        let image = image::open(path).map_err(|e| LsbError::ImageLoadError(e.to_string()))?;
        Ok(Self { image })
    }

    /// Largest frame in bytes this image can carry.
    pub fn capacity(&self) -> usize {
        capacity_bytes(&self.image)
    }

    /// Returns a reference to the underlying image.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Encodes an image as PNG.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, LsbError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| LsbError::ImageSaveError(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{decode_frame, encode_frame, Frame};
    use crate::payload::Metadata;
    use image::{ImageBuffer, Rgb, Rgba};

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 17) % 256) as u8,
                ((y * 23) % 256) as u8,
                (((x + y) * 31) % 256) as u8,
            ])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn frame_of_len(total: usize) -> Vec<u8> {
        // 1 flag + 2 metaLength + 3 "a|b" + 4 dataLength
        let data_len = total - 10;
        let frame = Frame::new(
            None,
            Metadata::new("a", "b").unwrap(),
            (0..data_len).map(|i| (i * 7 % 256) as u8).collect(),
        );
        let bytes = encode_frame(&frame).unwrap();
        assert_eq!(bytes.len(), total);
        bytes
    }

    #[test]
    fn test_capacity() {
        let image = create_test_image(100, 100);
        // 100x100 = 10000 pixels, 3 channels, 1 bit each = 30000 bits = 3750 bytes
        assert_eq!(capacity_bits(&image), 30_000);
        assert_eq!(capacity_bytes(&image), 3750);
    }

    #[test]
    fn test_first_byte_bit_order() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(4, 1, Rgb([0u8, 0, 0])));
        let hidden = embed(&image, &[0b1010_0110]).unwrap().to_rgb8();

        let lsbs: Vec<u8> = hidden.as_raw().iter().take(8).map(|s| s & 1).collect();
        assert_eq!(lsbs, vec![1, 0, 1, 0, 0, 1, 1, 0]);
        // Unused channels keep their original LSB
        assert!(hidden.as_raw()[8..].iter().all(|&s| s == 0));
    }

    #[test]
    fn test_only_lsb_changes() {
        let image = create_test_image(16, 16);
        let frame = frame_of_len(50);
        let hidden = embed(&image, &frame).unwrap();

        for (before, after) in image.to_rgb8().as_raw().iter().zip(hidden.to_rgb8().as_raw()) {
            assert_eq!(before & 0xFE, after & 0xFE);
        }
    }

    #[test]
    fn test_alpha_untouched() {
        let img = ImageBuffer::from_fn(16, 16, |x, y| Rgba([x as u8, y as u8, 200, (x * y) as u8]));
        let image = DynamicImage::ImageRgba8(img.clone());

        let frame = frame_of_len(60);
        let hidden = embed(&image, &frame).unwrap();
        let rgba = hidden.as_rgba8().expect("alpha images stay RGBA");

        for (before, after) in img.pixels().zip(rgba.pixels()) {
            assert_eq!(before.0[3], after.0[3]);
        }
        assert_eq!(extract(&hidden).unwrap(), frame);
    }

    #[test]
    fn test_roundtrip_sizes() {
        for (side, frame_len) in [(16u32, 11usize), (16, 96), (256, 1024), (256, 24_576)] {
            let image = create_test_image(side, side);
            let frame = frame_of_len(frame_len);

            let hidden = embed(&image, &frame).unwrap();
            assert_eq!(extract(&hidden).unwrap(), frame, "{}x{} / {}", side, side, frame_len);
        }
    }

    #[test]
    fn test_capacity_boundary() {
        // 16x16x3 = 768 bits = 96 bytes
        let image = create_test_image(16, 16);
        assert_eq!(capacity_bytes(&image), 96);

        assert!(embed(&image, &frame_of_len(96)).is_ok());
        assert!(matches!(
            embed(&image, &frame_of_len(97)),
            Err(LsbError::CapacityExceeded { needed: 97, capacity: 96 })
        ));
    }

    #[test]
    fn test_extract_from_clean_image_fails_cleanly() {
        // All-zero LSBs decode as an empty-metadata frame, which is invalid metadata
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(8, 8, Rgb([0u8, 0, 0])));
        let result = extract(&image).and_then(|bytes| Ok(decode_frame(&bytes)?));
        assert!(matches!(result, Err(LsbError::Frame(FrameError::InvalidMetadata(_)))));

        // All-one LSBs decode an invalid password flag
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(8, 8, Rgb([255u8, 255, 255])));
        assert!(matches!(
            extract(&image),
            Err(LsbError::Frame(FrameError::InvalidPasswordFlag(0xFF)))
        ));
    }

    #[test]
    fn test_declared_length_beyond_image_is_truncated() {
        let image = create_test_image(16, 16);
        let mut frame = frame_of_len(40);
        // dataLength field sits at offset 6..10
        frame[6..10].copy_from_slice(&1_000u32.to_be_bytes());
        let hidden = embed(&image, &frame).unwrap();

        assert!(matches!(
            extract(&hidden),
            Err(LsbError::Frame(FrameError::Truncated { field: "data", .. }))
        ));
    }

    #[test]
    fn test_png_roundtrip() {
        let image = create_test_image(100, 100);
        let frame = frame_of_len(200);

        let hidden = embed(&image, &frame).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hidden.png");
        std::fs::write(&path, encode_png(&hidden).unwrap()).unwrap();

        let reloaded = ImageStego::from_file(&path).unwrap();
        assert_eq!(reloaded.capacity(), 3750);
        assert_eq!(extract(reloaded.image()).unwrap(), frame);
    }

    #[test]
    fn test_grayscale_carrier_becomes_rgb() {
        let gray = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(16, 16, image::Luma([128u8])));
        let frame = frame_of_len(30);
        let hidden = embed(&gray, &frame).unwrap();

        assert!(hidden.as_rgb8().is_some());
        assert_eq!(extract(&hidden).unwrap(), frame);
    }
}
