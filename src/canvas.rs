use camjigsaw_core::{IdentityColor, MaskSampler, Outline, PathCommand, Point, Rect, Surface};
use js_sys::{Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, Path2d};

const STROKE_STYLE: &str = "black";

/// 2D canvas behind the [`Surface`] contract. The mask canvas is created with
/// `willReadFrequently` so per-click readback stays cheap.
pub(crate) struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub(crate) fn new(canvas: HtmlCanvasElement, read_back: bool, stroke_width: f32) -> Result<Self, JsValue> {
        let options = Object::new();
        if read_back {
            Reflect::set(
                &options,
                &JsValue::from_str("willReadFrequently"),
                &JsValue::TRUE,
            )?;
        }
        let ctx = canvas
            .get_context_with_context_options("2d", &options)?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let surface = Self { canvas, ctx };
        surface.apply_stroke(stroke_width);
        Ok(surface)
    }

    pub(crate) fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn apply_stroke(&self, width: f32) {
        self.ctx.set_line_width(width as f64);
        self.ctx.set_stroke_style_str(STROKE_STYLE);
    }
}

fn build_path(outline: &Outline) -> Option<Path2d> {
    let path = Path2d::new().ok()?;
    for command in outline.commands() {
        match *command {
            PathCommand::MoveTo(p) => path.move_to(p.x as f64, p.y as f64),
            PathCommand::LineTo(p) => path.line_to(p.x as f64, p.y as f64),
            PathCommand::CubicTo { c1, c2, to } => path.bezier_curve_to(
                c1.x as f64,
                c1.y as f64,
                c2.x as f64,
                c2.y as f64,
                to.x as f64,
                to.y as f64,
            ),
            PathCommand::Close => path.close_path(),
        }
    }
    Some(path)
}

impl Surface for CanvasSurface {
    type Image = HtmlVideoElement;

    fn width(&self) -> f32 {
        self.canvas.width() as f32
    }

    fn height(&self) -> f32 {
        self.canvas.height() as f32
    }

    fn resize(&mut self, width: f32, height: f32) {
        let line_width = self.ctx.line_width();
        self.canvas.set_width(width.max(1.0) as u32);
        self.canvas.set_height(height.max(1.0) as u32);
        // Resizing resets the context state.
        self.apply_stroke(line_width as f32);
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
    }

    fn clip(&mut self, outline: &Outline) {
        if let Some(path) = build_path(outline) {
            self.ctx.clip_with_path_2d(&path);
        }
    }

    fn draw_image(&mut self, image: &HtmlVideoElement, src: Rect, dst: Rect) {
        let _ = self
            .ctx
            .draw_image_with_html_video_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                src.x as f64,
                src.y as f64,
                src.width as f64,
                src.height as f64,
                dst.x as f64,
                dst.y as f64,
                dst.width as f64,
                dst.height as f64,
            );
    }

    fn fill_rect(&mut self, rect: Rect, color: IdentityColor) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(
            rect.x as f64,
            rect.y as f64,
            rect.width as f64,
            rect.height as f64,
        );
    }

    fn stroke(&mut self, outline: &Outline) {
        if let Some(path) = build_path(outline) {
            self.ctx.stroke_with_path(&path);
        }
    }
}

impl MaskSampler for CanvasSurface {
    fn sample(&self, at: Point) -> Option<[u8; 4]> {
        if at.x < 0.0 || at.y < 0.0 || at.x >= self.width() || at.y >= self.height() {
            return None;
        }
        let data = self
            .ctx
            .get_image_data(at.x.floor() as f64, at.y.floor() as f64, 1.0, 1.0)
            .ok()?
            .data();
        match data.as_slice() {
            [r, g, b, a, ..] => Some([*r, *g, *b, *a]),
            _ => None,
        }
    }
}
