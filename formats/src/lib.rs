use {
    camino::Utf8Path as Path,
    image::{DynamicImage, ImageFormat},
    pixmap::{LayoutError, PixelFormat, Pixmap},
};

/// Formats enabled by [`ImageDecoder::default`].
pub const DEFAULT_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Tiff,
    ImageFormat::Bmp,
    ImageFormat::Gif,
    ImageFormat::Tga,
];

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("unrecognised image format")]
    UnknownFormat,
    #[error("{0:?} images are not enabled")]
    Unsupported(ImageFormat),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("unusable image layout")]
    Layout(#[from] LayoutError),
}

pub trait Decode {
    fn decode(&self, path: &Path) -> Result<Pixmap, DecodeError>;
}

/// Decodes image files into surfaces, for a fixed set of formats.
///
/// Built once and handed to whatever needs decoding; there is no global
/// decoder state to set up or tear down.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    formats: Vec<ImageFormat>,
}

impl ImageDecoder {
    pub fn new(formats: &[ImageFormat]) -> Self {
        Self{formats: formats.to_vec()}
    }

    pub fn supports(&self, format: ImageFormat) -> bool {
        self.formats.contains(&format)
    }
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_FORMATS)
    }
}

impl Decode for ImageDecoder {
    fn decode(&self, path: &Path) -> Result<Pixmap, DecodeError> {
        // content sniffing wins over the extension
        let reader = image::io::Reader::open(path)?.with_guessed_format()?;
        let format = reader.format().ok_or(DecodeError::UnknownFormat)?;
        if !self.supports(format) {return Err(DecodeError::Unsupported(format))}

        let image = reader.decode()?;
        log::debug!("{path}: {format:?}, {:?}", image.color());

        let pixmap = from_dynamic(image)?;
        log::debug!("{path}: {}x{} {:?}, pitch {}",
            pixmap.wide(), pixmap.high(), pixmap.format(), pixmap.pitch());
        Ok(pixmap)
    }
}

/// Lays a decoded image out as a surface. Images with an alpha channel become
/// [`PixelFormat::Rgba32`], everything else [`PixelFormat::Rgb24`]; grayscale,
/// 16-bit and float images are converted to 8-bit colour.
pub fn from_dynamic(image: DynamicImage) -> Result<Pixmap, LayoutError> {
    if image.color().has_alpha() {
        let rgba = image.into_rgba8();
        Pixmap::new_from_packed(PixelFormat::Rgba32, rgba.width(), rgba.height(), rgba.as_raw())
    }
    else {
        let rgb = image.into_rgb8();
        Pixmap::new_from_packed(PixelFormat::Rgb24, rgb.width(), rgb.height(), rgb.as_raw())
    }
}
