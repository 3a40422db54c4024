use std::collections::HashSet;

use camjigsaw_core::{
    generate_pieces, Difficulty, GridRng, Piece, Point, PuzzleConfig, Rect, Side,
};

fn build(rows: u32, cols: u32, seed: u32) -> (PuzzleConfig, Vec<Piece>) {
    let config = PuzzleConfig::new(rows, cols, Rect::new(40.0, 30.0, 600.0, 450.0)).unwrap();
    let pieces = generate_pieces(&config, &mut GridRng::new(seed));
    (config, pieces)
}

fn at(pieces: &[Piece], cols: u32, row: u32, col: u32) -> &Piece {
    &pieces[(row * cols + col) as usize]
}

#[test]
fn shared_edges_are_exact_negations() {
    for difficulty in Difficulty::ALL {
        let (rows, cols) = difficulty.dimensions();
        for seed in [1, 7, 4242] {
            let (_, pieces) = build(rows, cols, seed);
            assert_eq!(pieces.len(), (rows * cols) as usize);
            for row in 0..rows {
                for col in 0..cols {
                    let piece = at(&pieces, cols, row, col);
                    if col + 1 < cols {
                        let right = piece.edges().right.unwrap();
                        let left = at(&pieces, cols, row, col + 1).edges().left.unwrap();
                        assert_eq!(right.value(), -left.value());
                    }
                    if row + 1 < rows {
                        let bottom = piece.edges().bottom.unwrap();
                        let top = at(&pieces, cols, row + 1, col).edges().top.unwrap();
                        assert_eq!(bottom.value(), -top.value());
                    }
                    assert_eq!(piece.edges().top.is_none(), row == 0);
                    assert_eq!(piece.edges().left.is_none(), col == 0);
                    assert_eq!(piece.edges().bottom.is_none(), row + 1 == rows);
                    assert_eq!(piece.edges().right.is_none(), col + 1 == cols);
                }
            }
        }
    }
}

#[test]
fn three_by_three_edge_census() {
    let (_, pieces) = build(3, 3, 99);
    assert_eq!(pieces.len(), 9);

    let mut interior_edges = 0;
    let mut complementary = 0;
    for row in 0..3 {
        for col in 0..3 {
            let piece = at(&pieces, 3, row, col);
            if let (Some(right), true) = (piece.edges().right, col < 2) {
                interior_edges += 1;
                if at(&pieces, 3, row, col + 1).edges().left == Some(right.complement()) {
                    complementary += 1;
                }
            }
            if let (Some(bottom), true) = (piece.edges().bottom, row < 2) {
                interior_edges += 1;
                if at(&pieces, 3, row + 1, col).edges().top == Some(bottom.complement()) {
                    complementary += 1;
                }
            }
        }
    }
    assert_eq!(interior_edges, 12);
    assert_eq!(complementary, 12);

    let flat_counts: Vec<usize> = pieces.iter().map(|p| p.edges().flat_count()).collect();
    assert_eq!(flat_counts.iter().filter(|&&n| n == 2).count(), 4);
    assert_eq!(flat_counts.iter().filter(|&&n| n == 1).count(), 4);
    assert_eq!(flat_counts.iter().filter(|&&n| n == 0).count(), 1);
    assert_eq!(at(&pieces, 3, 1, 1).edges().flat_count(), 0);
}

#[test]
fn edge_magnitudes_stay_in_tab_range() {
    let (_, pieces) = build(10, 10, 3);
    for piece in &pieces {
        for side in Side::ALL {
            if let Some(tab) = piece.edges().get(side) {
                assert!(tab.position() > 0.3 && tab.position() < 0.7, "{}", tab.value());
            }
        }
    }
}

#[test]
fn identity_colors_are_unique_and_never_black() {
    let (rows, cols) = Difficulty::Insane.dimensions();
    let (_, pieces) = build(rows, cols, 12);
    let keys: HashSet<u32> = pieces.iter().map(|p| p.identity().key()).collect();
    assert_eq!(keys.len(), pieces.len());
    assert!(!keys.contains(&0));
}

#[test]
fn pieces_are_row_major_at_home() {
    let (config, pieces) = build(3, 4, 5);
    for (index, piece) in pieces.iter().enumerate() {
        assert_eq!(piece.id.0 as usize, index);
        assert_eq!(piece.row as usize, index / 4);
        assert_eq!(piece.col as usize, index % 4);
        assert_eq!(piece.home(), config.home_of(piece.row, piece.col));
        assert_eq!(piece.width(), 150.0);
        assert_eq!(piece.height(), 150.0);
        assert!(piece.correct);
    }
}

#[test]
fn same_seed_reproduces_same_grid() {
    let (_, first) = build(5, 5, 77);
    let (_, second) = build(5, 5, 77);
    assert_eq!(first, second);
    let (_, other) = build(5, 5, 78);
    assert_ne!(first, other);
}

#[test]
fn near_home_threshold_is_a_third_of_the_width() {
    let (_, mut pieces) = build(3, 3, 8);
    let piece = &mut pieces[4];
    let home = piece.home();
    let width = piece.width();

    piece.position = home + Point::new(width / 4.0, 0.0);
    assert!(piece.is_near_home());

    piece.position = home + Point::new(width / 2.0, 0.0);
    assert!(!piece.is_near_home());

    piece.snap_home();
    assert!(piece.is_near_home());
    assert!(piece.correct);

    piece.position = home + Point::new(0.0, width / 3.0 + 0.5);
    assert!(!piece.is_near_home());
}
