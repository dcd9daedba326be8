//! 2D drawing primitives the dialog renders with.
//!
//! The renderer lives with the GPU emulator; the dialog only issues calls
//! between `begin` and `end` once per tick.

/// Horizontal/vertical alignment bits for text and images.
pub const PPGE_ALIGN_LEFT: u32 = 0;
pub const PPGE_ALIGN_TOP: u32 = 0;
pub const PPGE_ALIGN_BOTTOM: u32 = 1;
pub const PPGE_ALIGN_HCENTER: u32 = 4;
pub const PPGE_ALIGN_VCENTER: u32 = 8;
pub const PPGE_ALIGN_RIGHT: u32 = 16;
pub const PPGE_ALIGN_CENTER: u32 = PPGE_ALIGN_HCENTER | PPGE_ALIGN_VCENTER;

/// Images in the UI atlas the dialog uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtlasImage {
    /// Stretchable frame used for save slots.
    Button,
    Circle,
    Cross,
}

pub trait PpgeDraw {
    fn begin(&mut self);

    fn end(&mut self);

    fn draw_text(&mut self, text: &str, x: f32, y: f32, align: u32, scale: f32, color: u32);

    /// Draw `image` stretched to `w` x `h` keeping its corners intact.
    fn draw_4patch(&mut self, image: AtlasImage, x: f32, y: f32, w: f32, h: f32, color: u32);

    #[allow(clippy::too_many_arguments)]
    fn draw_image(&mut self, image: AtlasImage, x: f32, y: f32, w: f32, h: f32, align: u32, color: u32);
}
