use std::fmt::Write;

use crate::action::GameEvent;
use crate::edge::{EdgeSet, Side, TabMetrics, TAB_HEIGHT_RATIO, TAB_SHOULDER_RATIO};
use crate::geom::{bounds_of, flatten_cubic, point_in_polygon, Point, Rect};
use crate::grid::PuzzleConfig;
use crate::surface::{Paint, Surface};

/// Snap threshold as a fraction of the piece width.
pub const SNAP_DISTANCE_RATIO: f32 = 1.0 / 3.0;
pub const OUTLINE_CURVE_STEPS: usize = 12;

/// Row-major cell index, stable for the lifetime of a generated grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IdentityColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl IdentityColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Opaque integer key used by the hit-test index.
    pub fn key(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Fully transparent samples carry no identity.
    pub fn from_rgba(rgba: [u8; 4]) -> Option<Self> {
        if rgba[3] == 0 {
            return None;
        }
        Some(Self::new(rgba[0], rgba[1], rgba[2]))
    }

    pub fn to_css(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo { c1: Point, c2: Point, to: Point },
    Close,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outline {
    commands: Vec<PathCommand>,
}

impl Outline {
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn flatten(&self, curve_steps: usize) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.commands.len() * curve_steps);
        let mut current = Point::default();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(to) | PathCommand::LineTo(to) => {
                    points.push(to);
                    current = to;
                }
                PathCommand::CubicTo { c1, c2, to } => {
                    flatten_cubic(current, c1, c2, to, curve_steps, &mut points);
                    current = to;
                }
                PathCommand::Close => {}
            }
        }
        points
    }

    pub fn contains(&self, point: Point) -> bool {
        point_in_polygon(&self.flatten(OUTLINE_CURVE_STEPS), point)
    }

    pub fn bounds(&self) -> Option<Rect> {
        bounds_of(&self.flatten(OUTLINE_CURVE_STEPS))
    }

    pub fn to_svg_path(&self) -> String {
        let mut path = String::new();
        for command in &self.commands {
            if !path.is_empty() {
                path.push(' ');
            }
            let _ = match *command {
                PathCommand::MoveTo(p) => write!(path, "M {} {}", fmt_f32(p.x), fmt_f32(p.y)),
                PathCommand::LineTo(p) => write!(path, "L {} {}", fmt_f32(p.x), fmt_f32(p.y)),
                PathCommand::CubicTo { c1, c2, to } => write!(
                    path,
                    "C {} {} {} {} {} {}",
                    fmt_f32(c1.x),
                    fmt_f32(c1.y),
                    fmt_f32(c2.x),
                    fmt_f32(c2.y),
                    fmt_f32(to.x),
                    fmt_f32(to.y)
                ),
                PathCommand::Close => write!(path, "Z"),
            };
        }
        path
    }
}

fn fmt_f32(value: f32) -> String {
    format!("{:.3}", value)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Piece {
    pub id: PieceId,
    pub row: u32,
    pub col: u32,
    pub position: Point,
    pub correct: bool,
    home: Point,
    width: f32,
    height: f32,
    edges: EdgeSet,
    identity: IdentityColor,
}

impl Piece {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PieceId,
        row: u32,
        col: u32,
        home: Point,
        width: f32,
        height: f32,
        edges: EdgeSet,
        identity: IdentityColor,
    ) -> Self {
        Self {
            id,
            row,
            col,
            position: home,
            correct: true,
            home,
            width,
            height,
            edges,
            identity,
        }
    }

    pub fn home(&self) -> Point {
        self.home
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    pub fn identity(&self) -> IdentityColor {
        self.identity
    }

    /// Rectangular footprint at the current position, tabs excluded.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }

    pub fn tab_metrics(&self) -> TabMetrics {
        TabMetrics::for_piece(self.width, self.height)
    }

    pub(crate) fn place_on_grid(&mut self, home: Point, width: f32, height: f32) {
        self.home = home;
        self.width = width;
        self.height = height;
    }

    /// Closed clockwise boundary at the current position.
    pub fn compute_outline(&self) -> Outline {
        let metrics = self.tab_metrics();
        let origin = self.position;
        let mut commands = Vec::with_capacity(16);
        commands.push(PathCommand::MoveTo(origin));
        for side in Side::ALL {
            let start = origin + side.start_corner(self.width, self.height);
            let along = side.along();
            let outward = side.outward();
            let length = side.length(self.width, self.height);
            if let Some(tab) = self.edges.get(side) {
                let center = tab.offset_along(side, length);
                let rise = outward * (metrics.height * tab.direction());
                let shoulder = rise * TAB_SHOULDER_RATIO;
                let neck_in = start + along * (center - metrics.neck);
                let neck_out = start + along * (center + metrics.neck);
                commands.push(PathCommand::LineTo(neck_in));
                commands.push(PathCommand::CubicTo {
                    c1: neck_in + shoulder,
                    c2: start + along * (center - metrics.half_width) + rise,
                    to: start + along * center + rise,
                });
                commands.push(PathCommand::CubicTo {
                    c1: start + along * (center + metrics.half_width) + rise,
                    c2: neck_out + shoulder,
                    to: neck_out,
                });
            }
            commands.push(PathCommand::LineTo(start + along * length));
        }
        commands.push(PathCommand::Close);
        Outline { commands }
    }

    pub fn distance_to_home(&self) -> f32 {
        self.position.distance(self.home)
    }

    pub fn is_near_home(&self) -> bool {
        self.is_within_snap(SNAP_DISTANCE_RATIO)
    }

    pub fn is_within_snap(&self, width_ratio: f32) -> bool {
        self.distance_to_home() < self.width * width_ratio
    }

    pub fn snap_home(&mut self) -> GameEvent {
        self.position = self.home;
        self.correct = true;
        GameEvent::PieceSnapped(self.id)
    }

    /// Region of the camera frame that feeds this piece, grown by the scaled
    /// tab height so protruding tabs pick up the neighbouring cells.
    pub fn source_rect(&self, config: &PuzzleConfig, frame_width: f32, frame_height: f32) -> Rect {
        let cell_width = frame_width / config.cols as f32;
        let cell_height = frame_height / config.rows as f32;
        let scaled_tab = cell_width.min(cell_height) * TAB_HEIGHT_RATIO;
        Rect::new(
            self.col as f32 * cell_width - scaled_tab,
            self.row as f32 * cell_height - scaled_tab,
            cell_width + scaled_tab * 2.0,
            cell_height + scaled_tab * 2.0,
        )
    }

    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        config: &PuzzleConfig,
        paint: Paint<'_, S::Image>,
    ) {
        let outline = self.compute_outline();
        let target = self.bounds().inflate(self.tab_metrics().height);
        surface.save();
        surface.clip(&outline);
        match paint {
            Paint::Image(source) => {
                let src = self.source_rect(config, source.width, source.height);
                surface.draw_image(source.image, src, target);
            }
            Paint::Identity => surface.fill_rect(target, self.identity),
        }
        surface.restore();
        surface.stroke(&outline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeTab;

    fn piece_with(edges: EdgeSet) -> Piece {
        Piece::new(
            PieceId(0),
            0,
            0,
            Point::new(100.0, 100.0),
            90.0,
            60.0,
            edges,
            IdentityColor::new(1, 2, 3),
        )
    }

    #[test]
    fn flat_piece_outline_is_rectangle() {
        let piece = piece_with(EdgeSet::default());
        let outline = piece.compute_outline();
        let bounds = outline.bounds().unwrap();
        assert_eq!(bounds, Rect::new(100.0, 100.0, 90.0, 60.0));
        assert_eq!(outline.commands().len(), 6);
        assert_eq!(outline.commands().last(), Some(&PathCommand::Close));
    }

    #[test]
    fn tab_protrudes_and_blank_recedes() {
        let mut edges = EdgeSet::default();
        edges.right = Some(EdgeTab::new(0.5).unwrap());
        edges.top = Some(EdgeTab::new(-0.5).unwrap());
        let piece = piece_with(edges);
        let outline = piece.compute_outline();
        let tab_height = 60.0 * 0.3;
        let bounds = outline.bounds().unwrap();
        assert!((bounds.right() - (190.0 + tab_height)).abs() < 1e-3);
        assert!((bounds.y - 100.0).abs() < 1e-3);
        // Tip of the right tab is inside the outline, the top blank is carved out.
        assert!(outline.contains(Point::new(190.0 + tab_height * 0.5, 130.0)));
        assert!(!outline.contains(Point::new(145.0, 100.0 + tab_height * 0.5)));
    }

    #[test]
    fn snap_restores_home_and_reports() {
        let mut piece = piece_with(EdgeSet::default());
        piece.position = Point::new(120.0, 100.0);
        piece.correct = false;
        assert!(piece.is_near_home());
        let event = piece.snap_home();
        assert_eq!(event, GameEvent::PieceSnapped(PieceId(0)));
        assert_eq!(piece.position, piece.home());
        assert!(piece.correct);
        assert!(piece.is_near_home());
    }

    #[test]
    fn identity_color_round_trips_through_rgba() {
        let color = IdentityColor::new(12, 200, 7);
        assert_eq!(IdentityColor::from_rgba([12, 200, 7, 255]), Some(color));
        assert_eq!(IdentityColor::from_rgba([12, 200, 7, 0]), None);
        assert_eq!(color.key(), 0x0C_C8_07);
        assert_eq!(color.to_css(), "rgb(12,200,7)");
    }

    #[test]
    fn svg_path_starts_at_origin() {
        let piece = piece_with(EdgeSet::default());
        let path = piece.compute_outline().to_svg_path();
        assert!(path.starts_with("M 100.000 100.000 L 190.000 100.000"));
        assert!(path.ends_with('Z'));
    }
}
