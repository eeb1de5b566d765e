//! QR code rendering.
//!
//! Symbols default to error correction level H with large modules and a
//! narrow quiet zone, which keeps them decodable from a phone camera. Level H
//! also leaves room for a centred logo covering up to a fifth of the side.

use std::path::Path;

use image::imageops;
use image::{DynamicImage, ImageBuffer, Rgb, Rgba, RgbaImage};
use qrcode::render::svg;
use qrcode::{Color, EcLevel, QrCode};
use tracing::debug;

use super::QrError;

/// Output format for QR codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrFormat {
    /// PNG image (default)
    #[default]
    Png,
    /// SVG vector image
    Svg,
}

impl QrFormat {
    /// Picks the format from a file extension, PNG unless it is `.svg`.
    pub fn for_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => QrFormat::Svg,
            _ => QrFormat::Png,
        }
    }
}

/// Appearance of a rendered QR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrStyle {
    /// Error correction level (default: High)
    pub ec_level: EcLevel,
    /// Module size in pixels (default: 20)
    pub module_size: u32,
    /// Quiet zone size in modules (default: 2)
    pub quiet_zone: u32,
    pub dark: Rgb<u8>,
    pub light: Rgb<u8>,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            ec_level: EcLevel::H,
            module_size: 20,
            quiet_zone: 2,
            dark: Rgb([0, 0, 0]),
            light: Rgb([255, 255, 255]),
        }
    }
}

/// Largest logo side as a fraction of the rendered QR side.
pub const LOGO_MAX_FRACTION: f32 = 0.2;

/// Byte-mode capacity of the largest (version 40) symbol.
pub fn qr_capacity(ec_level: EcLevel) -> usize {
    match ec_level {
        EcLevel::L => 2953,
        EcLevel::M => 2331,
        EcLevel::Q => 1663,
        EcLevel::H => 1273,
    }
}

/// Parses an error correction level name (`L`, `M`, `Q` or `H`).
pub fn parse_ec_level(level: &str) -> Result<EcLevel, QrError> {
    match level.trim().to_ascii_uppercase().as_str() {
        "L" => Ok(EcLevel::L),
        "M" => Ok(EcLevel::M),
        "Q" => Ok(EcLevel::Q),
        "H" => Ok(EcLevel::H),
        other => Err(QrError::InvalidStyle(format!(
            "unknown error correction level {:?}",
            other
        ))),
    }
}

/// Parses a `#RRGGBB` colour.
pub fn parse_hex_color(color: &str) -> Result<Rgb<u8>, QrError> {
    let hex = color.trim().trim_start_matches('#');
    let invalid = || QrError::InvalidStyle(format!("invalid colour {:?}", color));
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

fn hex_color(color: Rgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

fn build_code(text: &str, ec_level: EcLevel) -> Result<QrCode, QrError> {
    let max = qr_capacity(ec_level);
    if text.len() > max {
        return Err(QrError::DataTooLarge {
            size: text.len(),
            max,
        });
    }
    QrCode::with_error_correction_level(text.as_bytes(), ec_level)
        .map_err(|e| QrError::Generation(e.to_string()))
}

/// Renders `text` as a QR code image.
pub fn generate_qr(text: &str, style: &QrStyle) -> Result<DynamicImage, QrError> {
    let code = build_code(text, style.ec_level)?;
    let width = code.width();
    let colors = code.to_colors();

    let module = style.module_size.max(1);
    let quiet = style.quiet_zone;
    let side = (width as u32 + 2 * quiet) * module;

    let image = ImageBuffer::from_fn(side, side, |x, y| {
        let (mx, my) = (x / module, y / module);
        if mx < quiet || my < quiet {
            return style.light;
        }
        let (cx, cy) = ((mx - quiet) as usize, (my - quiet) as usize);
        match colors.get(cy * width + cx) {
            Some(Color::Dark) if cx < width => style.dark,
            _ => style.light,
        }
    });

    debug!(
        text = text.len(),
        modules = width,
        pixels = side,
        "rendered QR code"
    );
    Ok(DynamicImage::ImageRgb8(image))
}

/// Pastes `logo` at the centre of a rendered QR code.
///
/// Logos larger than [`LOGO_MAX_FRACTION`] of the side are scaled down with
/// their aspect ratio kept; smaller ones are left as they are. The logo sits
/// on an opaque white backing so transparent logos do not show modules
/// through.
pub fn overlay_logo(qr: &DynamicImage, logo: &DynamicImage) -> DynamicImage {
    let mut canvas = qr.to_rgba8();
    let (width, height) = canvas.dimensions();
    let max_side = (width.min(height) as f32 * LOGO_MAX_FRACTION) as u32;
    if max_side == 0 {
        return DynamicImage::ImageRgb8(qr.to_rgb8());
    }

    let logo = if logo.width() > max_side || logo.height() > max_side {
        logo.thumbnail(max_side, max_side)
    } else {
        logo.clone()
    };
    let logo = logo.to_rgba8();

    let mut backing = RgbaImage::from_pixel(logo.width(), logo.height(), Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut backing, &logo, 0, 0);

    let x = (width - backing.width()) / 2;
    let y = (height - backing.height()) / 2;
    imageops::overlay(&mut canvas, &backing, i64::from(x), i64::from(y));

    debug!(
        logo_width = backing.width(),
        logo_height = backing.height(),
        qr = width,
        "embedded logo in QR code"
    );
    DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
}

/// Renders `text` as a QR code with `logo` at its centre.
pub fn generate_qr_with_logo(
    text: &str,
    style: &QrStyle,
    logo: &DynamicImage,
) -> Result<DynamicImage, QrError> {
    Ok(overlay_logo(&generate_qr(text, style)?, logo))
}

/// Renders `text` as an SVG document.
///
/// The SVG renderer always uses a 4-module quiet zone when one is requested.
pub fn generate_qr_svg(text: &str, style: &QrStyle) -> Result<String, QrError> {
    let code = build_code(text, style.ec_level)?;
    let dark = hex_color(style.dark);
    let light = hex_color(style.light);

    Ok(code
        .render::<svg::Color>()
        .quiet_zone(style.quiet_zone > 0)
        .module_dimensions(style.module_size, style.module_size)
        .dark_color(svg::Color(&dark))
        .light_color(svg::Color(&light))
        .build())
}

/// Renders `text` and writes it to `path` in the given format.
///
/// Logos are only supported for PNG output.
pub fn generate_qr_to_file<P: AsRef<Path>>(
    text: &str,
    path: P,
    style: &QrStyle,
    format: QrFormat,
    logo: Option<&DynamicImage>,
) -> Result<(), QrError> {
    let path = path.as_ref();
    match (format, logo) {
        (QrFormat::Png, logo) => {
            let image = match logo {
                Some(logo) => generate_qr_with_logo(text, style, logo)?,
                None => generate_qr(text, style)?,
            };
            image
                .save_with_format(path, image::ImageFormat::Png)
                .map_err(|e| QrError::ImageSaveError(e.to_string()))?
        }
        (QrFormat::Svg, Some(_)) => {
            return Err(QrError::InvalidStyle(
                "logos are only supported for PNG output".to_string(),
            ))
        }
        (QrFormat::Svg, None) => std::fs::write(path, generate_qr_svg(text, style)?)?,
    }
    Ok(())
}
