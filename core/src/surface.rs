use crate::geom::{point_in_polygon, Point, Rect};
use crate::piece::{IdentityColor, Outline, OUTLINE_CURVE_STEPS};

/// Drawing target the render pipeline paints onto.
///
/// `save`/`restore` bracket clip and alpha state the way a 2D canvas does.
pub trait Surface {
    type Image: ?Sized;

    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn resize(&mut self, width: f32, height: f32);
    fn clear(&mut self);
    fn save(&mut self);
    fn restore(&mut self);
    fn set_alpha(&mut self, alpha: f32);
    fn clip(&mut self, outline: &Outline);
    fn draw_image(&mut self, image: &Self::Image, src: Rect, dst: Rect);
    fn fill_rect(&mut self, rect: Rect, color: IdentityColor);
    fn stroke(&mut self, outline: &Outline);
}

/// Pixel readback, used by the mask resolver.
pub trait MaskSampler {
    /// RGBA at the pixel under `at`, `None` outside the surface.
    fn sample(&self, at: Point) -> Option<[u8; 4]>;
}

pub struct SourceImage<'a, I: ?Sized> {
    pub image: &'a I,
    pub width: f32,
    pub height: f32,
}

impl<I: ?Sized> Clone for SourceImage<'_, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: ?Sized> Copy for SourceImage<'_, I> {}

pub enum Paint<'a, I: ?Sized> {
    Image(SourceImage<'a, I>),
    Identity,
}

impl<I: ?Sized> Clone for Paint<'_, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: ?Sized> Copy for Paint<'_, I> {}

/// Tightly packed RGBA8 image.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..width as usize * height as usize {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        ]
    }
}

#[derive(Clone, Copy, Debug)]
struct SavedState {
    clip_depth: usize,
    alpha: f32,
}

/// Software surface with polygon clipping and nearest-neighbour sampling.
/// Strokes are not rasterized.
#[derive(Clone, Debug)]
pub struct RasterSurface {
    image: RasterImage,
    clips: Vec<Vec<Point>>,
    saved: Vec<SavedState>,
    alpha: f32,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RasterImage::filled(width, height, [0; 4]),
            clips: Vec::new(),
            saved: Vec::new(),
            alpha: 1.0,
        }
    }

    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    fn clipped(&self, at: Point) -> bool {
        self.clips.iter().all(|polygon| point_in_polygon(polygon, at))
    }

    /// Pixel index range covered by `rect`, limited to the surface.
    fn pixel_span(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let x0 = rect.x.floor().max(0.0) as u32;
        let y0 = rect.y.floor().max(0.0) as u32;
        let x1 = (rect.right().ceil().max(0.0) as u32).min(self.image.width);
        let y1 = (rect.bottom().ceil().max(0.0) as u32).min(self.image.height);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    fn blend(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let coverage = self.alpha * rgba[3] as f32 / 255.0;
        if coverage <= 0.0 {
            return;
        }
        let offset = (y as usize * self.image.width as usize + x as usize) * 4;
        let dst = &mut self.image.pixels[offset..offset + 4];
        for channel in 0..3 {
            let blended = rgba[channel] as f32 * coverage + dst[channel] as f32 * (1.0 - coverage);
            dst[channel] = blended.round() as u8;
        }
        let alpha = coverage * 255.0 + dst[3] as f32 * (1.0 - coverage);
        dst[3] = alpha.round().min(255.0) as u8;
    }
}

impl Surface for RasterSurface {
    type Image = RasterImage;

    fn width(&self) -> f32 {
        self.image.width as f32
    }

    fn height(&self) -> f32 {
        self.image.height as f32
    }

    fn resize(&mut self, width: f32, height: f32) {
        let width = width.max(0.0).round() as u32;
        let height = height.max(0.0).round() as u32;
        self.image = RasterImage::filled(width, height, [0; 4]);
        self.clips.clear();
        self.saved.clear();
        self.alpha = 1.0;
    }

    fn clear(&mut self) {
        self.image.pixels.fill(0);
    }

    fn save(&mut self) {
        self.saved.push(SavedState {
            clip_depth: self.clips.len(),
            alpha: self.alpha,
        });
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.clips.truncate(state.clip_depth);
            self.alpha = state.alpha;
        }
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn clip(&mut self, outline: &Outline) {
        self.clips.push(outline.flatten(OUTLINE_CURVE_STEPS));
    }

    fn draw_image(&mut self, image: &RasterImage, src: Rect, dst: Rect) {
        if image.width == 0 || image.height == 0 || !src.is_valid() || !dst.is_valid() {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.pixel_span(dst) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if !self.clipped(center) {
                    continue;
                }
                let sx = src.x + (center.x - dst.x) / dst.width * src.width;
                let sy = src.y + (center.y - dst.y) / dst.height * src.height;
                if sx < 0.0 || sy < 0.0 || sx >= image.width as f32 || sy >= image.height as f32 {
                    continue;
                }
                let rgba = image.pixel(sx as u32, sy as u32);
                self.blend(x, y, rgba);
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: IdentityColor) {
        let Some((x0, y0, x1, y1)) = self.pixel_span(rect) else {
            return;
        };
        let rgba = [color.r, color.g, color.b, 255];
        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if self.clipped(center) {
                    self.blend(x, y, rgba);
                }
            }
        }
    }

    fn stroke(&mut self, _outline: &Outline) {}
}

impl MaskSampler for RasterSurface {
    fn sample(&self, at: Point) -> Option<[u8; 4]> {
        if !at.x.is_finite() || !at.y.is_finite() || at.x < 0.0 || at.y < 0.0 {
            return None;
        }
        let (x, y) = (at.x as u32, at.y as u32);
        if x >= self.image.width || y >= self.image.height {
            return None;
        }
        Some(self.image.pixel(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeSet;
    use crate::piece::{Piece, PieceId};

    #[test]
    fn fill_respects_clip_until_restore() {
        let piece = Piece::new(
            PieceId(0),
            0,
            0,
            Point::new(2.0, 2.0),
            4.0,
            4.0,
            EdgeSet::default(),
            IdentityColor::new(1, 1, 1),
        );
        let mut surface = RasterSurface::new(8, 8);
        surface.save();
        surface.clip(&piece.compute_outline());
        surface.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), IdentityColor::new(9, 9, 9));
        surface.restore();
        assert_eq!(surface.sample(Point::new(3.0, 3.0)), Some([9, 9, 9, 255]));
        assert_eq!(surface.sample(Point::new(0.5, 0.5)), Some([0, 0, 0, 0]));
        assert_eq!(surface.sample(Point::new(9.0, 1.0)), None);

        surface.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), IdentityColor::new(7, 7, 7));
        assert_eq!(surface.sample(Point::new(0.5, 0.5)), Some([7, 7, 7, 255]));
    }

    #[test]
    fn draw_image_scales_source() {
        let mut surface = RasterSurface::new(4, 4);
        let image = RasterImage::filled(2, 2, [200, 10, 10, 255]);
        surface.draw_image(
            &image,
            Rect::new(0.0, 0.0, 2.0, 2.0),
            Rect::new(0.0, 0.0, 4.0, 4.0),
        );
        assert_eq!(surface.sample(Point::new(3.5, 3.5)), Some([200, 10, 10, 255]));
    }

    #[test]
    fn alpha_is_scoped_by_save() {
        let mut surface = RasterSurface::new(2, 2);
        surface.save();
        surface.set_alpha(0.5);
        surface.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), IdentityColor::new(255, 255, 255));
        surface.restore();
        surface.fill_rect(Rect::new(1.0, 0.0, 1.0, 1.0), IdentityColor::new(255, 255, 255));
        assert_eq!(surface.sample(Point::new(0.5, 0.5)), Some([128, 128, 128, 128]));
        assert_eq!(surface.sample(Point::new(1.5, 0.5)), Some([255, 255, 255, 255]));
    }
}
