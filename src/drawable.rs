//! Host display layer.

use crate::Error;

/// The hardware-backed display target a surface presents to.
///
/// Implemented by the host: an iOS layer, a window surface, or
/// [`record::Layer`] in tests.
///
/// [`record::Layer`]: ../record/struct.Layer.html
pub trait Drawable {
    /// Current size of the display target in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Allocates storage for the color renderbuffer currently bound on
    /// the context, sized to the display target.
    fn allocate_color_storage(&mut self, width: u32, height: u32) -> Result<(), Error>;

    /// Shows the contents of the color renderbuffer currently bound on
    /// the context.
    fn present(&mut self);
}
