//! Integration tests for InvisioVault
//!
//! Every carrier is exercised end to end through the public API:
//! - Image LSB (exact bytes and metadata back, capacity boundary)
//! - Polyglot (carrier still decodes, archive recovered byte for byte)
//! - QR (public text preserved, hidden frame survives rendering)

use image::{DynamicImage, ImageBuffer, Rgb, Rgba};
use rand::{Rng, RngCore};

use invisiovault::capacity::{estimate_fit, frame_size, DEFAULT_COMPRESSION_RATIO};
use invisiovault::crypto::CryptoError;
use invisiovault::qr::generate_qr_with_logo;
use invisiovault::stego::image::{capacity_bytes, embed, extract};
use invisiovault::stego::polyglot::extract_archive;
use invisiovault::{
    build_frame, encode_png, hide_in_file, hide_in_image, hide_in_qr, hide_in_qr_text,
    load_image, open_frame, reveal_from_file, reveal_from_image, reveal_from_qr,
    reveal_from_qr_text, Carrier, LsbError, Metadata, Payload, PolyglotError, QrStyle,
    StegoError,
};

fn text_payload(data: &[u8]) -> Payload {
    Payload::new(data.to_vec(), Metadata::new("a.txt", "text/plain").unwrap())
}

fn noisy_image(width: u32, height: u32) -> DynamicImage {
    let mut rng = rand::thread_rng();
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |_, _| {
        Rgb([rng.gen(), rng.gen(), rng.gen()])
    }))
}

/// Test the reference scenario: "ABC" as a.txt in a 16x16 image, no password
#[test]
fn test_reference_scenario_16x16() {
    let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(16, 16, Rgb([200, 100, 50])));
    assert_eq!(capacity_bytes(&image), 96);

    let payload = text_payload(&[0x41, 0x42, 0x43]);
    let stego = hide_in_image(&image, &payload, None).unwrap();
    let revealed = reveal_from_image(&stego, None).unwrap();

    assert_eq!(revealed.data, vec![0x41, 0x42, 0x43]);
    assert_eq!(revealed.metadata.name(), "a.txt");
    assert_eq!(revealed.metadata.mime_type(), "text/plain");
}

/// Test that a 4x4 image is too small for the same payload
#[test]
fn test_reference_scenario_4x4_is_too_small() {
    let image = DynamicImage::new_rgb8(4, 4);
    let result = hide_in_image(&image, &text_payload(b"ABC"), None);

    assert!(matches!(
        result,
        Err(StegoError::Lsb(LsbError::CapacityExceeded { capacity: 6, .. }))
    ));
}

/// Test image round-trip survives a PNG encode/decode cycle
#[test]
fn test_image_roundtrip_through_png() {
    let image = noisy_image(64, 48);
    let mut data = vec![0u8; 700];
    rand::thread_rng().fill_bytes(&mut data);
    let payload = Payload::new(data, Metadata::for_file_name("blob.bin").unwrap());

    let stego = hide_in_image(&image, &payload, Some("correct horse")).unwrap();
    let png = encode_png(&stego).unwrap();
    let reloaded = load_image(&png).unwrap();

    let revealed = reveal_from_image(&reloaded, Some("correct horse")).unwrap();
    assert_eq!(revealed, payload);
    assert_eq!(revealed.metadata.mime_type(), "application/octet-stream");
}

/// Test wrong and missing passwords are told apart from corruption
#[test]
fn test_image_password_errors() {
    let image = noisy_image(32, 32);
    let stego = hide_in_image(&image, &text_payload(b"secret"), Some("pw1")).unwrap();

    let wrong = reveal_from_image(&stego, Some("pw2")).unwrap_err();
    assert!(matches!(wrong, StegoError::Crypto(CryptoError::AuthenticationFailed)));
    assert!(wrong.is_wrong_password());

    let missing = reveal_from_image(&stego, None).unwrap_err();
    assert!(matches!(missing, StegoError::Crypto(CryptoError::PasswordRequired)));
    assert!(!missing.is_wrong_password());
}

/// Test the LSB boundary: exactly capacity fits, one more byte does not
#[test]
fn test_lsb_capacity_boundary() {
    let image = noisy_image(16, 16);
    let capacity = capacity_bytes(&image);

    let fits = vec![0xA5u8; capacity];
    let stego = embed(&image, &fits).unwrap();
    let stego_rgb = stego.to_rgb8();
    let bits: Vec<u8> = stego_rgb.as_raw().iter().map(|b| b & 1).collect();
    assert_eq!(bits.len(), capacity * 8);
    assert_eq!(&bits[..8], &[1, 0, 1, 0, 0, 1, 0, 1]);

    let too_big = vec![0u8; capacity + 1];
    assert!(matches!(
        embed(&image, &too_big),
        Err(LsbError::CapacityExceeded { .. })
    ));
}

/// Test frames of different sizes round-trip through a 256x256 image
#[test]
fn test_lsb_frame_sizes() {
    let image = noisy_image(256, 256);
    let capacity = capacity_bytes(&image);
    let metadata = Metadata::new("x.bin", "application/octet-stream").unwrap();

    for data_len in [1usize, 1024, 20_000] {
        let mut data = vec![0u8; data_len];
        rand::thread_rng().fill_bytes(&mut data);
        let frame = build_frame(&Payload::new(data.clone(), metadata.clone()), None).unwrap();
        assert!(frame.len() <= capacity);

        let stego = embed(&image, &frame).unwrap();
        assert_eq!(extract(&stego).unwrap(), frame);
        assert_eq!(open_frame(&frame, None).unwrap().data, data);
    }
}

/// Test alpha channel values are never modified
#[test]
fn test_alpha_is_untouched() {
    let image = DynamicImage::ImageRgba8(ImageBuffer::from_fn(20, 20, |x, y| {
        Rgba([x as u8, y as u8, 7, (x * 10 + y) as u8])
    }));
    let stego = hide_in_image(&image, &text_payload(b"alpha"), None).unwrap();

    let before = image.to_rgba8();
    let after = stego.to_rgba8();
    for (a, b) in before.pixels().zip(after.pixels()) {
        assert_eq!(a[3], b[3]);
    }
    assert_eq!(reveal_from_image(&stego, None).unwrap().data, b"alpha");
}

/// Test a polyglot PNG still decodes to the same pixels
#[test]
fn test_polyglot_png_independence() {
    let carrier_image = noisy_image(24, 24);
    let carrier = encode_png(&carrier_image).unwrap();

    let polyglot = hide_in_file(&carrier, "plans.pdf", b"%PDF-1.4 secret plans", None).unwrap();

    let decoded = image::load_from_memory(&polyglot).unwrap();
    assert_eq!(decoded.to_rgb8(), carrier_image.to_rgb8());

    let file = reveal_from_file(&polyglot, None).unwrap();
    assert_eq!(file.name, "plans.pdf");
    assert_eq!(file.data, b"%PDF-1.4 secret plans");
}

/// Test the archive is recovered byte for byte and opens with a ZIP reader
#[test]
fn test_polyglot_archive_is_exact() {
    let carrier = vec![0xFFu8; 5000];
    let polyglot = hide_in_file(&carrier, "notes.txt", b"zip me", Some("zip-pw")).unwrap();

    let archive = extract_archive(&polyglot).unwrap();
    assert_eq!(archive.len(), polyglot.len() - carrier.len());
    assert_eq!(archive, &polyglot[carrier.len()..]);

    let zip = zip::ZipArchive::new(std::io::Cursor::new(archive)).unwrap();
    assert_eq!(zip.len(), 1);
}

/// Test polyglot password errors
#[test]
fn test_polyglot_password_errors() {
    let polyglot = hide_in_file(b"carrier", "a.txt", b"data", Some("right")).unwrap();

    assert!(matches!(
        reveal_from_file(&polyglot, None),
        Err(StegoError::Polyglot(PolyglotError::PasswordRequired))
    ));
    assert!(matches!(
        reveal_from_file(&polyglot, Some("wrong")),
        Err(StegoError::Polyglot(PolyglotError::WrongPassword))
    ));
    assert_eq!(reveal_from_file(&polyglot, Some("right")).unwrap().data, b"data");
}

/// Test QR text keeps the public part readable by anyone
#[test]
fn test_qr_text_roundtrip() {
    let payload = text_payload(b"meet at noon");
    let text = hide_in_qr_text("https://example.com/menu", &payload, Some("pw")).unwrap();

    let public_view = text.split('#').next().unwrap();
    assert_eq!(public_view, "https://example.com/menu");

    let (public, revealed) = reveal_from_qr_text(&text, Some("pw")).unwrap();
    assert_eq!(public, "https://example.com/menu");
    assert_eq!(revealed, Some(payload));
}

/// Test a rendered QR code carries the hidden payload through an image
#[test]
fn test_qr_image_roundtrip() {
    let payload = text_payload(b"qr secret");
    let style = QrStyle {
        module_size: 6,
        ..Default::default()
    };
    let image = hide_in_qr("https://example.com", &payload, None, &style).unwrap();

    let png = encode_png(&image).unwrap();
    let reloaded = load_image(&png).unwrap();

    let (public, revealed) = reveal_from_qr(&reloaded, None).unwrap();
    assert_eq!(public, "https://example.com");
    assert_eq!(revealed, Some(payload));
}

/// Test a branded QR code with a centre logo still reveals its payload
#[test]
fn test_qr_with_logo_roundtrip() {
    let payload = text_payload(b"logo");
    let style = QrStyle {
        module_size: 6,
        ..Default::default()
    };
    let text = hide_in_qr_text("https://example.com", &payload, None).unwrap();
    let logo = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(128, 128, Rgb([220, 40, 40])));

    let branded = generate_qr_with_logo(&text, &style, &logo).unwrap();
    let (public, revealed) = reveal_from_qr(&branded, None).unwrap();
    assert_eq!(public, "https://example.com");
    assert_eq!(revealed, Some(payload));
}

/// Test QR text refuses a frame larger than the symbol can hold
#[test]
fn test_qr_text_capacity_is_enforced() {
    let carrier = Carrier::QrText("https://example.com".to_string());
    let capacity = carrier.capacity_bytes().unwrap();

    assert!(carrier.embed(&vec![1u8; capacity]).is_ok());
    assert!(carrier.embed(&vec![1u8; capacity + 1]).is_err());
}

/// Test the marker is reserved in the public text
#[test]
fn test_qr_marker_collision() {
    let result = hide_in_qr_text("a#IVDATA:b", &text_payload(b"x"), None);
    assert!(matches!(result, Err(StegoError::Qr(_))));
}

/// Test the estimate and the real frame agree on the reference scenario
#[test]
fn test_capacity_estimate_vs_real_frame() {
    let payload = text_payload(&[0x41, 0x42, 0x43]);
    let meta_len = payload.metadata.to_bytes().len();

    let estimate = estimate_fit(96, 3, meta_len, false, DEFAULT_COMPRESSION_RATIO);
    assert!(estimate.fits);

    let frame = build_frame(&payload, None).unwrap();
    let sealed_len = frame.len() - frame_size(meta_len, 0, false);
    assert_eq!(frame.len(), frame_size(meta_len, sealed_len, false));
    assert!(frame.len() <= 96);
}

/// Test the carrier enum drives all three kinds the same way
#[test]
fn test_carrier_enum_dispatch() {
    let payload = text_payload(b"uniform");
    let carriers = [
        Carrier::Image(noisy_image(32, 32)),
        Carrier::BinaryFile(encode_png(&noisy_image(8, 8)).unwrap()),
        Carrier::QrText("hello".to_string()),
    ];

    for carrier in carriers {
        let stego = carrier.hide(&payload, None).unwrap();
        let revealed = stego.reveal(None).unwrap().unwrap();
        assert_eq!(revealed.data, b"uniform");
        assert_eq!(revealed.metadata.name(), "a.txt");
    }
}
