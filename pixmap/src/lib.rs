/// Row alignment of surfaces built from packed pixels, in bytes.
pub const PITCH_ALIGN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Bytes R, G, B.
    Rgb24,
    /// Bytes R, G, B, A.
    Rgba32,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb24  => 3,
            PixelFormat::Rgba32 => 4,
        }
    }

    pub const fn bits_per_pixel(self) -> u32 {
        self.bytes_per_pixel() as u32 * 8
    }

    /// The SDL2 pixel format constant describing this byte order.
    pub const fn name(self) -> &'static str {
        match self {
            PixelFormat::Rgb24  => "SDL_PIXELFORMAT_RGB24",
            PixelFormat::Rgba32 => "SDL_PIXELFORMAT_RGBA32",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("either image dimension is zero")]
    ZeroDimension,
    #[error("image dimensions exceed surface limits")]
    Overflow,
    #[error("pitch {pitch} is shorter than a row of {row} bytes")]
    ShortPitch { pitch: usize, row: usize },
    #[error("pixel buffer holds {got} bytes, layout needs {need}")]
    WrongLength { got: usize, need: usize },
}

mod meta {
    use super::{LayoutError, PITCH_ALIGN};

    // dimensions and pitch are emitted as C `int`s
    const LIMIT: usize = i32::MAX as usize;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Meta {
        pitch: usize,
        row:   usize,
        wide:  usize,
        high:  usize,
    }

    impl Meta {
        pub fn try_new(wide: u32, high: u32, pitch: usize, bytes_per_pixel: usize)
            -> Result<Meta, LayoutError>
        {
            if wide == 0 || high == 0 {return Err(LayoutError::ZeroDimension)}
            let wide = usize::try_from(wide).map_err(|_| LayoutError::Overflow)?;
            let high = usize::try_from(high).map_err(|_| LayoutError::Overflow)?;
            let row = wide.checked_mul(bytes_per_pixel).ok_or(LayoutError::Overflow)?;
            if pitch < row {return Err(LayoutError::ShortPitch{pitch, row})}
            let len = pitch.checked_mul(high).ok_or(LayoutError::Overflow)?;
            if wide > LIMIT || high > LIMIT || pitch > LIMIT || len > isize::MAX as usize {
                return Err(LayoutError::Overflow);
            }
            Ok(Meta{pitch, row, wide, high})
        }

        pub fn aligned(wide: u32, high: u32, bytes_per_pixel: usize) -> Result<Meta, LayoutError> {
            let pitch = (wide as usize)
                .checked_mul(bytes_per_pixel)
                .and_then(|row| row.checked_next_multiple_of(PITCH_ALIGN))
                .ok_or(LayoutError::Overflow)?;
            Self::try_new(wide, high, pitch, bytes_per_pixel)
        }

        pub fn validate(&self, len: usize) -> Result<(), LayoutError> {
            let need = self.len();
            if len != need {return Err(LayoutError::WrongLength{got: len, need})}
            Ok(())
        }

        pub fn len(&self) -> usize { self.pitch * self.high }
        pub fn pitch(&self) -> usize { self.pitch }
        pub fn row(&self) -> usize { self.row }
        pub fn wide(&self) -> usize { self.wide }
        pub fn high(&self) -> usize { self.high }
    }
}

use meta::Meta;

/// A decoded image laid out the way an SDL surface expects it: rows of
/// `pitch` bytes, top to bottom, padding bytes at the end of each row.
#[derive(Debug, Clone)]
pub struct Pixmap {
    pixels: Vec<u8>,
    meta:   Meta,
    format: PixelFormat,
}

impl Pixmap {
    /// Takes a buffer that is already laid out with the given pitch.
    pub fn new_from_bytes(format: PixelFormat, wide: u32, high: u32, pitch: usize, pixels: Vec<u8>)
        -> Result<Self, LayoutError>
    {
        let meta = Meta::try_new(wide, high, pitch, format.bytes_per_pixel())?;
        meta.validate(pixels.len())?;
        Ok(Self{pixels, meta, format})
    }

    /// Takes tightly packed rows and pads each one out to a multiple of
    /// [`PITCH_ALIGN`] bytes with zeroes.
    pub fn new_from_packed(format: PixelFormat, wide: u32, high: u32, packed: &[u8])
        -> Result<Self, LayoutError>
    {
        let meta = Meta::aligned(wide, high, format.bytes_per_pixel())?;
        let need = meta.row() * meta.high();
        if packed.len() != need {
            return Err(LayoutError::WrongLength{got: packed.len(), need});
        }

        let pixels = if meta.row() == meta.pitch() {
            packed.to_vec()
        }
        else {
            let mut pixels = vec![0u8; meta.len()];
            pixels.chunks_exact_mut(meta.pitch())
                .zip(packed.chunks_exact(meta.row()))
                .for_each(|(dst, src)| dst[..src.len()].copy_from_slice(src));
            pixels
        };

        Ok(Self{pixels, meta, format})
    }

    pub fn wide(&self) -> u32 { self.meta.wide() as u32 }
    pub fn high(&self) -> u32 { self.meta.high() as u32 }
    pub fn pitch(&self) -> usize { self.meta.pitch() }
    pub fn format(&self) -> PixelFormat { self.format }
    pub fn bits_per_pixel(&self) -> u32 { self.format.bits_per_pixel() }

    /// Every byte of the surface, padding included; `high * pitch` long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}
