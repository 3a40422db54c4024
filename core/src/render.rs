use crate::config::GameConfig;
use crate::geom::Rect;
use crate::session::PuzzleSession;
use crate::surface::{Paint, SourceImage, Surface};

/// Current camera frame plus its native size.
pub type FrameSource<'a, I> = SourceImage<'a, I>;

#[derive(Clone, Copy, Debug)]
pub struct RenderPipeline {
    backdrop_alpha: f32,
}

impl RenderPipeline {
    pub fn new(backdrop_alpha: f32) -> Self {
        Self {
            backdrop_alpha: backdrop_alpha.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.backdrop_alpha)
    }

    /// Paints one frame: translucent backdrop, then every piece in z-order.
    /// When a mask surface is given each piece is also filled there with its
    /// identity color. Returns the clock text, if the timer is running.
    pub fn frame<S, M>(
        &self,
        session: &PuzzleSession,
        visible: &mut S,
        mut mask: Option<&mut M>,
        source: FrameSource<'_, S::Image>,
        now_ms: f64,
    ) -> Option<String>
    where
        S: Surface + ?Sized,
        M: Surface + ?Sized,
    {
        visible.clear();
        if let Some(mask) = mask.as_deref_mut() {
            mask.clear();
        }

        let config = session.config();
        visible.save();
        visible.set_alpha(self.backdrop_alpha);
        visible.draw_image(
            source.image,
            Rect::new(0.0, 0.0, source.width, source.height),
            config.board,
        );
        visible.restore();

        for piece in session.pieces() {
            piece.render(visible, config, Paint::Image(source));
            if let Some(mask) = mask.as_deref_mut() {
                piece.render(mask, config, Paint::Identity);
            }
        }

        session.elapsed_ms(now_ms).map(format_elapsed)
    }
}

/// `HH:MM:SS`, hours wrap at a day.
pub fn format_elapsed(ms: f64) -> String {
    let seconds = (ms.max(0.0) / 1000.0).floor() as u64;
    let s = seconds % 60;
    let m = (seconds % 3600) / 60;
    let h = (seconds % 86_400) / 3600;
    format!("{h:02}:{m:02}:{s:02}")
}
