use std::io::Cursor;

use clipdex::domain::{Embedding, ImageSource, MediaInfo, Rotation, Tag};
use image::{DynamicImage, ImageFormat};

#[test]
fn given_right_angle_degrees_when_normalizing_then_maps_to_rotation_variant() {
    assert_eq!(Rotation::from_degrees(0), Rotation::R0);
    assert_eq!(Rotation::from_degrees(90), Rotation::R90);
    assert_eq!(Rotation::from_degrees(180), Rotation::R180);
    assert_eq!(Rotation::from_degrees(270), Rotation::R270);
}

#[test]
fn given_negative_degrees_when_normalizing_then_wraps_into_range() {
    assert_eq!(Rotation::from_degrees(-90), Rotation::R270);
    assert_eq!(Rotation::from_degrees(-180), Rotation::R180);
    assert_eq!(Rotation::from_degrees(-270), Rotation::R90);
    assert_eq!(Rotation::from_degrees(360), Rotation::R0);
}

#[test]
fn given_non_right_angle_when_normalizing_then_treated_as_unrotated() {
    assert_eq!(Rotation::from_degrees(45), Rotation::R0);
    assert_eq!(Rotation::from_degrees(91), Rotation::R0);
}

#[test]
fn given_quarter_turn_rotations_when_checking_then_dimensions_swap() {
    assert!(Rotation::R90.swaps_dimensions());
    assert!(Rotation::R270.swaps_dimensions());
    assert!(!Rotation::R0.swaps_dimensions());
    assert!(!Rotation::R180.swaps_dimensions());
}

#[test]
fn given_rotations_when_building_filters_then_transpose_matches_direction() {
    assert_eq!(Rotation::R0.transpose_filter(), None);
    assert_eq!(Rotation::R90.transpose_filter(), Some("transpose=1"));
    assert_eq!(
        Rotation::R180.transpose_filter(),
        Some("transpose=1,transpose=1")
    );
    assert_eq!(Rotation::R270.transpose_filter(), Some("transpose=2"));
}

#[test]
fn given_rotated_media_when_reading_effective_dimensions_then_width_and_height_swap() {
    let portrait = MediaInfo {
        source_width: 1920,
        source_height: 1080,
        rotation: Rotation::R90,
        has_audio: true,
    };

    assert_eq!(portrait.effective_width(), 1080);
    assert_eq!(portrait.effective_height(), 1920);

    let upright = MediaInfo {
        rotation: Rotation::R180,
        ..portrait
    };
    assert_eq!(upright.effective_width(), 1920);
    assert_eq!(upright.effective_height(), 1080);
}

#[test]
fn given_raw_values_when_normalizing_then_embedding_has_unit_norm() {
    let embedding = Embedding::normalized(vec![3.0, 4.0]);
    assert!((embedding.l2_norm() - 1.0).abs() < 1e-6);
    assert!((embedding.values[0] - 0.6).abs() < 1e-6);
    assert!((embedding.values[1] - 0.8).abs() < 1e-6);
}

#[test]
fn given_zero_vector_when_normalizing_then_returned_unchanged() {
    let embedding = Embedding::normalized(vec![0.0, 0.0, 0.0]);
    assert_eq!(embedding.values, vec![0.0, 0.0, 0.0]);
}

#[test]
fn given_two_embeddings_when_computing_distance_then_squared_euclidean() {
    let a = Embedding::new(vec![1.0, 0.0]);
    let b = Embedding::new(vec![0.0, 1.0]);
    assert!((a.squared_distance(&b) - 2.0).abs() < 1e-6);
    assert_eq!(a.squared_distance(&a), 0.0);
}

#[test]
fn given_mismatched_dimensions_when_computing_distance_then_infinite() {
    let a = Embedding::new(vec![1.0, 0.0]);
    let b = Embedding::new(vec![1.0, 0.0, 0.0]);
    assert_eq!(a.squared_distance(&b), f32::INFINITY);
}

#[test]
fn given_mixed_case_input_when_creating_tag_then_lowercased_and_trimmed() {
    let tag = Tag::new("  Beach Day ").unwrap();
    assert_eq!(tag.as_str(), "beach day");
}

#[test]
fn given_whitespace_input_when_creating_tag_then_rejected() {
    assert!(Tag::new("   ").is_none());
    assert!(Tag::new("").is_none());
}

fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::new_rgb8(4, 4);
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn given_encoded_bytes_when_decoding_image_source_then_image_is_recovered() {
    let decoded = ImageSource::Bytes(png_bytes()).decode().unwrap();
    assert_eq!(decoded.width(), 4);
    assert_eq!(decoded.height(), 4);
}

#[test]
fn given_base64_payload_when_decoding_image_source_then_image_is_recovered() {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    let encoded = STANDARD.encode(png_bytes());
    let decoded = ImageSource::Base64(encoded).decode().unwrap();
    assert_eq!(decoded.width(), 4);
}

#[test]
fn given_invalid_base64_when_decoding_image_source_then_error() {
    assert!(ImageSource::Base64("not base64!!".to_string())
        .decode()
        .is_err());
}

#[test]
fn given_garbage_bytes_when_decoding_image_source_then_error() {
    assert!(ImageSource::Bytes(vec![1, 2, 3, 4]).decode().is_err());
}
