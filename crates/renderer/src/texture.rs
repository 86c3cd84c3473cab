//! Synchronous PNG decoding into GPU-ready pixel buffers.
//!
//! Only 8-bit RGB and RGBA images are accepted, judged by the header as
//! stored in the file rather than after decoder expansion. Rows are padded to a 4-byte
//! stride and stored bottom row first, so `v = 0` samples the bottom of the
//! image once uploaded.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use image::codecs::png::PngDecoder;
use image::{ColorType, ImageDecoder};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

const ROW_ALIGNMENT: usize = 4;
/// Chunk length, chunk type, width, height, bit depth and colour type.
const IHDR_PREFIX_LEN: usize = 18;

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a PNG")]
    NotPng { path: PathBuf },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{path}: unsupported bit depth {depth}, must be 8")]
    UnsupportedBitDepth { path: PathBuf, depth: u16 },
    #[error("{path}: unsupported color type {color:?}")]
    UnsupportedColorType { path: PathBuf, color: PngColorType },
    #[error("{path}: decoder produced unexpected layout {color:?}")]
    UnexpectedLayout { path: PathBuf, color: ColorType },
    #[error("could not allocate {bytes} bytes for {path}")]
    Allocation { path: PathBuf, bytes: usize },
}

/// Colour type byte of the PNG header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngColorType {
    Grayscale,
    Rgb,
    Indexed,
    GrayscaleAlpha,
    Rgba,
    Unknown(u8),
}

impl PngColorType {
    fn from_header(byte: u8) -> Self {
        match byte {
            0 => PngColorType::Grayscale,
            2 => PngColorType::Rgb,
            3 => PngColorType::Indexed,
            4 => PngColorType::GrayscaleAlpha,
            6 => PngColorType::Rgba,
            other => PngColorType::Unknown(other),
        }
    }
}

/// Channel layout of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb,
    Rgba,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Rgb => 3,
            PixelLayout::Rgba => 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    layout: PixelLayout,
    stride: usize,
    pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Bytes per stored row, including alignment padding.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.layout.channels()
    }

    /// Raw buffer, `stride * height` bytes, bottom row first.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel data of stored row `index` without padding. Row 0 is the bottom of the image.
    ///
    /// `None` when `index` is not below [`DecodedImage::height`].
    pub fn row(&self, index: u32) -> Option<&[u8]> {
        if index >= self.height {
            return None;
        }
        let start = index as usize * self.stride;
        self.pixels.get(start..start + self.row_bytes())
    }

    /// Tightly packed RGBA8 copy in stored row order.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for row in (0..self.height).filter_map(|index| self.row(index)) {
            match self.layout {
                PixelLayout::Rgba => rgba.extend_from_slice(row),
                PixelLayout::Rgb => {
                    for pixel in row.chunks_exact(3) {
                        rgba.extend_from_slice(pixel);
                        rgba.push(u8::MAX);
                    }
                }
            }
        }
        rgba
    }
}

/// Rounds `row_bytes` up to the next multiple of four.
pub fn padded_stride(row_bytes: usize) -> usize {
    row_bytes.div_ceil(ROW_ALIGNMENT) * ROW_ALIGNMENT
}

/// Rejects anything but 8-bit RGB or RGBA before the decoder expands it.
fn check_header(path: &Path, depth: u8, color: PngColorType) -> Result<(), TextureError> {
    if depth != 8 {
        return Err(TextureError::UnsupportedBitDepth {
            path: path.to_path_buf(),
            depth: u16::from(depth),
        });
    }
    match color {
        PngColorType::Rgb | PngColorType::Rgba => Ok(()),
        other => Err(TextureError::UnsupportedColorType {
            path: path.to_path_buf(),
            color: other,
        }),
    }
}

fn reserve_zeroed(path: &Path, bytes: usize) -> Result<Vec<u8>, TextureError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(bytes)
        .map_err(|_| TextureError::Allocation {
            path: path.to_path_buf(),
            bytes,
        })?;
    buffer.resize(bytes, 0);
    Ok(buffer)
}

/// Decodes the PNG at `path` into a padded, vertically flipped buffer.
pub fn decode_png(path: &Path) -> Result<DecodedImage, TextureError> {
    let file = File::open(path).map_err(|source| TextureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let mut header = [0u8; 8];
    match reader.read_exact(&mut header) {
        Ok(()) if header == PNG_SIGNATURE => {}
        Ok(()) => {
            return Err(TextureError::NotPng {
                path: path.to_path_buf(),
            })
        }
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(TextureError::NotPng {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(TextureError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    // a missing or misplaced IHDR is left for the decoder to report
    let mut ihdr = [0u8; IHDR_PREFIX_LEN];
    match reader.read_exact(&mut ihdr) {
        Ok(()) if ihdr[4..8] == *b"IHDR" => {
            check_header(path, ihdr[16], PngColorType::from_header(ihdr[17]))?;
        }
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {}
        Err(source) => {
            return Err(TextureError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }
    reader.rewind().map_err(|source| TextureError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let decode_error = |source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    };
    let decoder = PngDecoder::new(reader).map_err(decode_error)?;
    let (width, height) = decoder.dimensions();

    // RGB with a tRNS chunk is expanded to RGBA
    let layout = match decoder.color_type() {
        ColorType::Rgb8 => PixelLayout::Rgb,
        ColorType::Rgba8 => PixelLayout::Rgba,
        other => {
            return Err(TextureError::UnexpectedLayout {
                path: path.to_path_buf(),
                color: other,
            })
        }
    };

    let row_bytes = width as usize * layout.channels();
    let stride = padded_stride(row_bytes);
    let rows = height as usize;
    let overflow = || TextureError::Allocation {
        path: path.to_path_buf(),
        bytes: usize::MAX,
    };
    let decoded_len = row_bytes.checked_mul(rows).ok_or_else(overflow)?;
    let padded_len = stride.checked_mul(rows).ok_or_else(overflow)?;

    let mut scanlines = reserve_zeroed(path, decoded_len)?;
    let mut pixels = reserve_zeroed(path, padded_len)?;
    decoder.read_image(&mut scanlines).map_err(decode_error)?;

    if row_bytes > 0 {
        for (scanline, source) in scanlines.chunks_exact(row_bytes).enumerate() {
            let start = (rows - 1 - scanline) * stride;
            pixels[start..start + row_bytes].copy_from_slice(source);
        }
    }

    tracing::debug!(
        path = %path.display(),
        width,
        height,
        ?layout,
        stride,
        "decoded png"
    );

    Ok(DecodedImage {
        width,
        height,
        layout,
        stride,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use image::{GrayAlphaImage, GrayImage, ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    use super::*;

    fn write_rgb(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join(name);
        let image = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 7]));
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn stride_rounds_up_to_four_bytes() {
        assert_eq!(padded_stride(0), 0);
        assert_eq!(padded_stride(3), 4);
        assert_eq!(padded_stride(4), 4);
        assert_eq!(padded_stride(9), 12);
        assert_eq!(padded_stride(12), 12);
    }

    #[test]
    fn decodes_rgb_with_padding_and_flip() {
        let dir = TempDir::new().unwrap();
        let path = write_rgb(&dir, "rgb.png", 3, 2);

        let image = decode_png(&path).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
        assert_eq!(image.layout(), PixelLayout::Rgb);
        assert_eq!(image.row_bytes(), 9);
        assert_eq!(image.stride(), 12);
        assert_eq!(image.pixels().len(), 24);

        // stored row 0 is the last scanline of the file
        assert_eq!(image.row(0).unwrap(), &[0, 1, 7, 1, 1, 7, 2, 1, 7]);
        assert_eq!(image.row(1).unwrap(), &[0, 0, 7, 1, 0, 7, 2, 0, 7]);
        assert_eq!(image.row(2), None);
    }

    #[test]
    fn decodes_rgba_without_padding() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rgba.png");
        RgbaImage::from_fn(2, 3, |x, y| Rgba([x as u8, y as u8, 0, 200]))
            .save(&path)
            .unwrap();

        let image = decode_png(&path).unwrap();
        assert_eq!(image.layout(), PixelLayout::Rgba);
        assert_eq!(image.stride(), 8);
        assert_eq!(image.row(0).unwrap(), &[0, 2, 0, 200, 1, 2, 0, 200]);
        assert_eq!(image.row(2).unwrap(), &[0, 0, 0, 200, 1, 0, 0, 200]);
        assert_eq!(image.row(u32::MAX), None);
    }

    #[test]
    fn rgba_expansion_drops_padding_and_adds_opaque_alpha() {
        let dir = TempDir::new().unwrap();
        let path = write_rgb(&dir, "expand.png", 1, 2);

        let rgba = decode_png(&path).unwrap().to_rgba8();
        assert_eq!(rgba, vec![0, 1, 7, 255, 0, 0, 7, 255]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = decode_png(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, TextureError::Io { .. }), "{err}");
    }

    #[test]
    fn non_png_is_rejected_by_signature() {
        let dir = TempDir::new().unwrap();
        let text = dir.path().join("readme.png");
        fs::write(&text, "definitely not an image, just some text").unwrap();
        assert!(matches!(
            decode_png(&text).unwrap_err(),
            TextureError::NotPng { .. }
        ));

        let short = dir.path().join("short.png");
        fs::write(&short, [0x89, b'P']).unwrap();
        assert!(matches!(
            decode_png(&short).unwrap_err(),
            TextureError::NotPng { .. }
        ));
    }

    #[test]
    fn truncated_png_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = write_rgb(&dir, "full.png", 8, 8);
        let bytes = fs::read(&path).unwrap();
        let truncated = dir.path().join("truncated.png");
        fs::write(&truncated, &bytes[..20]).unwrap();

        assert!(matches!(
            decode_png(&truncated).unwrap_err(),
            TextureError::Decode { .. }
        ));
    }

    #[test]
    fn sixteen_bit_png_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deep.png");
        ImageBuffer::<Rgb<u16>, Vec<u16>>::from_pixel(2, 2, Rgb([1000, 2000, 3000]))
            .save(&path)
            .unwrap();

        match decode_png(&path).unwrap_err() {
            TextureError::UnsupportedBitDepth { depth, .. } => assert_eq!(depth, 16),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn grayscale_png_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gray.png");
        GrayImage::new(4, 4).save(&path).unwrap();

        assert!(matches!(
            decode_png(&path).unwrap_err(),
            TextureError::UnsupportedColorType {
                color: PngColorType::Grayscale,
                ..
            }
        ));

        let with_alpha = dir.path().join("gray-alpha.png");
        GrayAlphaImage::new(4, 4).save(&with_alpha).unwrap();
        assert!(matches!(
            decode_png(&with_alpha).unwrap_err(),
            TextureError::UnsupportedColorType {
                color: PngColorType::GrayscaleAlpha,
                ..
            }
        ));
    }

    fn crc32(bytes: &[u8]) -> u32 {
        let mut crc = 0xffff_ffffu32;
        for &byte in bytes {
            crc ^= u32::from(byte);
            for _ in 0..8 {
                let mask = (crc & 1).wrapping_neg();
                crc = (crc >> 1) ^ (0xedb8_8320 & mask);
            }
        }
        !crc
    }

    fn push_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        let start = out.len();
        out.extend_from_slice(kind);
        out.extend_from_slice(data);
        let crc = crc32(&out[start..]);
        out.extend_from_slice(&crc.to_be_bytes());
    }

    /// 2x2 PNG whose header declares `depth` and `color_type`, with a grey palette when indexed.
    fn write_declared(dir: &TempDir, name: &str, depth: u8, color_type: u8) -> PathBuf {
        let mut bytes = PNG_SIGNATURE.to_vec();
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&2u32.to_be_bytes());
        ihdr.extend_from_slice(&2u32.to_be_bytes());
        ihdr.extend_from_slice(&[depth, color_type, 0, 0, 0]);
        push_chunk(&mut bytes, b"IHDR", &ihdr);
        if color_type == 3 {
            push_chunk(&mut bytes, b"PLTE", &[0, 0, 0, 255, 255, 255]);
        }
        push_chunk(&mut bytes, b"IEND", &[]);

        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn palette_png_is_rejected_before_expansion() {
        let dir = TempDir::new().unwrap();

        let eight_bit = write_declared(&dir, "pal8.png", 8, 3);
        assert!(matches!(
            decode_png(&eight_bit).unwrap_err(),
            TextureError::UnsupportedColorType {
                color: PngColorType::Indexed,
                ..
            }
        ));

        let one_bit = write_declared(&dir, "pal1.png", 1, 3);
        match decode_png(&one_bit).unwrap_err() {
            TextureError::UnsupportedBitDepth { depth, .. } => assert_eq!(depth, 1),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn low_bit_grayscale_reports_bit_depth() {
        let dir = TempDir::new().unwrap();
        let path = write_declared(&dir, "gray1.png", 1, 0);
        match decode_png(&path).unwrap_err() {
            TextureError::UnsupportedBitDepth { depth, .. } => assert_eq!(depth, 1),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn unknown_color_type_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_declared(&dir, "odd.png", 8, 5);
        assert!(matches!(
            decode_png(&path).unwrap_err(),
            TextureError::UnsupportedColorType {
                color: PngColorType::Unknown(5),
                ..
            }
        ));
    }
}
