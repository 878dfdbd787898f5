//! GPU-visible pixel container.

use crate::queue;
use std::{cmp, fmt, hash, ops, path, sync};

use crate::Error;

/// OpenGL texture ID type.
pub(crate) type Id = u32;

/// Returns the texture back to the factory upon destruction.
pub(crate) struct Destructor {
    id: Id,
    tx: queue::Sender<Id>,
}

impl ops::Drop for Destructor {
    fn drop(&mut self) {
        let _ = self.tx.send(self.id);
    }
}

/// GPU-visible 2D texture holding RGBA8 pixels.
#[derive(Clone)]
pub struct Texture2 {
    /// The OpenGL texture ID.
    id: Id,

    width: u32,
    height: u32,
    /// Both sides are powers of two; such textures also carry mipmaps.
    power_of_two: bool,

    /// Returns the texture back to the factory upon destruction.
    _destructor: sync::Arc<Destructor>,
}

impl Texture2 {
    pub(crate) fn new(
        id: Id,
        width: u32,
        height: u32,
        power_of_two: bool,
        tx: queue::Sender<Id>,
    ) -> Self {
        Texture2 {
            id,
            width,
            height,
            power_of_two,
            _destructor: sync::Arc::new(Destructor { id, tx }),
        }
    }

    /// Returns the OpenGL texture ID.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the width of the texture in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `true` if both sides are powers of two.
    ///
    /// ES 2.0 only allows mipmaps and repeating wrap modes on such
    /// textures.
    pub fn power_of_two(&self) -> bool {
        self.power_of_two
    }

    /// Returns `true` if this texture has mipmaps.
    pub fn mipmap(&self) -> bool {
        self.power_of_two
    }
}

impl cmp::Eq for Texture2 {}

impl cmp::PartialEq<Self> for Texture2 {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Texture2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct Texture2(u32);

        Texture2(self.id).fmt(f)
    }
}

impl hash::Hash for Texture2 {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// ES 2.0 only generates mipmaps and repeats for power-of-two textures.
pub(crate) fn is_power_of_two(width: u32, height: u32) -> bool {
    width.is_power_of_two() && height.is_power_of_two()
}

/// Decodes an image file into RGBA8 pixels.
pub fn load<P: AsRef<path::Path>>(path: P) -> Result<image::RgbaImage, Error> {
    let path = path.as_ref();
    debug!("loading texture {}", path.display());
    Ok(image::open(path)?.to_rgba8())
}

/// A light wood-coloured ring pattern.
pub fn rings(size: u32) -> image::RgbaImage {
    let center = size as f32 * 0.5;
    image::RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;
        let ring = ((dx * dx + dy * dy).sqrt() / 4.0).sin() * 0.5 + 0.5;
        let shade = 0.6 + 0.4 * ring;
        image::Rgba([
            (222.0 * shade) as u8,
            (164.0 * shade) as u8,
            (98.0 * shade) as u8,
            255,
        ])
    })
}

/// A two-colour checkerboard with half-transparent light cells.
pub fn checker(size: u32, cells: u32) -> image::RgbaImage {
    let cell = (size / cells.max(1)).max(1);
    image::RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            image::Rgba([250, 240, 250, 128])
        } else {
            image::Rgba([190, 40, 120, 255])
        }
    })
}
