use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

/// Downscaling bound for profile photos, in pixels.
const MAX_DIMENSION: u32 = 800;
/// Upload size ceiling after compression.
const MAX_BYTES: usize = 1024 * 1024;

const QUALITY_STEPS: [u8; 4] = [85, 75, 60, 45];

pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub ext: String,
}

/// Compresses a profile photo before upload: downscale so the longest side is
/// at most 800px and re-encode as JPEG, lowering quality until the payload
/// fits under 1 MiB. Bytes that cannot be decoded are passed through
/// unchanged so an odd-but-accepted format still uploads.
pub fn compress_image(original: &[u8], original_ext: &str) -> CompressedImage {
    let decoded = match image::load_from_memory(original) {
        Ok(img) => img,
        Err(e) => {
            tracing::warn!("Could not decode photo ({}), uploading original bytes", e);
            return CompressedImage {
                bytes: original.to_vec(),
                ext: original_ext.to_string(),
            };
        }
    };

    let resized = if decoded.width() > MAX_DIMENSION || decoded.height() > MAX_DIMENSION {
        decoded.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        decoded
    };

    // JPEG has no alpha channel
    let rgb = resized.to_rgb8();

    let mut last = Vec::new();
    for quality in QUALITY_STEPS {
        let mut out = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
        if let Err(e) = encoder.encode_image(&rgb) {
            tracing::warn!("JPEG encode failed ({}), uploading original bytes", e);
            return CompressedImage {
                bytes: original.to_vec(),
                ext: original_ext.to_string(),
            };
        }
        tracing::debug!("Compressed photo at quality {}: {} bytes", quality, out.len());
        if out.len() <= MAX_BYTES {
            return CompressedImage {
                bytes: out,
                ext: "jpg".to_string(),
            };
        }
        last = out;
    }

    // Still over the limit at the lowest quality; ship the smallest attempt.
    CompressedImage {
        bytes: last,
        ext: "jpg".to_string(),
    }
}
