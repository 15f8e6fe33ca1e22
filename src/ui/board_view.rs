//! Board rendering for the Gomoku GUI

use egui::{Color32, CornerRadius, Painter, Pos2, Rect, Sense, Stroke, Vec2};

use super::theme::*;
use crate::search::MoveStats;
use crate::{Board, Pos, Stone, BOARD_SIZE};

/// What to draw on top of the stones.
#[derive(Default)]
pub struct Overlay<'a> {
    pub candidates: &'a [MoveStats],
    pub principal_variation: &'a [MoveStats],
    pub winning_line: Option<&'a [Pos]>,
}

/// Board view handles rendering and input for the game board
pub struct BoardView {
    /// Cached cell size for coordinate calculations
    cell_size: f32,
    /// Board drawing area
    board_rect: Rect,
}

impl Default for BoardView {
    fn default() -> Self {
        Self {
            cell_size: 30.0,
            board_rect: Rect::NOTHING,
        }
    }
}

impl BoardView {
    /// Render the board and return the clicked empty cell, if any
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        board: &Board,
        overlay: &Overlay<'_>,
        accepts_input: bool,
    ) -> Option<Pos> {
        let available_size = ui.available_size();

        // Fit the board to the available space
        let board_size = available_size.x.min(available_size.y) - 20.0;
        self.cell_size = (board_size - 2.0 * BOARD_MARGIN) / (BOARD_SIZE as f32 - 1.0);

        let (response, painter) = ui.allocate_painter(Vec2::new(board_size, board_size), Sense::click());
        self.board_rect = response.rect;

        painter.rect_filled(self.board_rect, CornerRadius::same(4), BOARD_BG);
        self.draw_grid(&painter);
        self.draw_star_points(&painter);
        self.draw_coordinates(&painter);

        for &stats in overlay.candidates {
            self.draw_candidate(&painter, stats);
        }

        self.draw_stones(&painter, board);

        if let Some(last) = board.last_move() {
            self.draw_last_move_marker(&painter, last.pos);
        }

        for (ply, stats) in overlay.principal_variation.iter().enumerate() {
            self.draw_pv_stone(&painter, stats, ply + 1);
        }

        if let Some(line) = overlay.winning_line {
            self.draw_winning_line(&painter, line);
        }

        if !accepts_input {
            return None;
        }
        let board_pos = response.hover_pos().and_then(|p| self.screen_to_board(p))?;
        if !board.is_empty(board_pos) {
            return None;
        }
        self.draw_hover_preview(&painter, board_pos, board.side_to_move());
        response.clicked().then_some(board_pos)
    }

    /// Draw the 19x19 grid lines
    fn draw_grid(&self, painter: &Painter) {
        let stroke = Stroke::new(GRID_LINE_WIDTH, GRID_LINE);
        let far = BOARD_MARGIN + (BOARD_SIZE as f32 - 1.0) * self.cell_size;

        for i in 0..BOARD_SIZE {
            let offset = BOARD_MARGIN + i as f32 * self.cell_size;

            let start = self.board_rect.min + Vec2::new(offset, BOARD_MARGIN);
            let end = self.board_rect.min + Vec2::new(offset, far);
            painter.line_segment([start, end], stroke);

            let start = self.board_rect.min + Vec2::new(BOARD_MARGIN, offset);
            let end = self.board_rect.min + Vec2::new(far, offset);
            painter.line_segment([start, end], stroke);
        }
    }

    /// Draw star points (hoshi)
    fn draw_star_points(&self, painter: &Painter) {
        for (x, y) in STAR_POINTS {
            let center = self.board_to_screen(Pos::new(x, y));
            painter.circle_filled(center, STAR_POINT_RADIUS, STAR_POINT);
        }
    }

    /// Column indices along the top, row indices down the left
    fn draw_coordinates(&self, painter: &Painter) {
        let font = egui::FontId::proportional(12.0);

        for i in 0..BOARD_SIZE {
            let offset = BOARD_MARGIN + i as f32 * self.cell_size;

            let top = Pos2::new(self.board_rect.min.x + offset, self.board_rect.min.y + 14.0);
            painter.text(top, egui::Align2::CENTER_CENTER, i, font.clone(), GRID_LINE);

            let left = Pos2::new(self.board_rect.min.x + 14.0, self.board_rect.min.y + offset);
            painter.text(left, egui::Align2::CENTER_CENTER, i, font.clone(), GRID_LINE);
        }
    }

    fn draw_stones(&self, painter: &Painter, board: &Board) {
        for m in board.history() {
            self.draw_stone(painter, m.pos, m.color);
        }
    }

    /// Draw a single stone with visual polish
    fn draw_stone(&self, painter: &Painter, pos: Pos, stone: Stone) {
        let center = self.board_to_screen(pos);
        let radius = self.cell_size * STONE_RADIUS_RATIO;
        let shadow_offset = Vec2::new(2.0, 2.0);

        match stone {
            Stone::Black => {
                painter.circle_filled(center + shadow_offset, radius, Color32::from_rgba_unmultiplied(0, 0, 0, 60));
                painter.circle_filled(center, radius, BLACK_STONE);
                let highlight_offset = Vec2::new(-radius * 0.3, -radius * 0.3);
                painter.circle_filled(center + highlight_offset, radius * 0.2, BLACK_STONE_HIGHLIGHT);
            }
            Stone::White => {
                painter.circle_filled(center + shadow_offset, radius, Color32::from_rgba_unmultiplied(0, 0, 0, 40));
                painter.circle_filled(center, radius, WHITE_STONE);
                painter.circle_stroke(center, radius * 0.85, Stroke::new(radius * 0.1, WHITE_STONE_SHADOW));
            }
            Stone::Empty => {}
        }
    }

    fn draw_last_move_marker(&self, painter: &Painter, pos: Pos) {
        let center = self.board_to_screen(pos);
        painter.circle_filled(center, LAST_MOVE_MARKER_RADIUS, LAST_MOVE_MARKER);
    }

    /// Shaded square with the visit count
    fn draw_candidate(&self, painter: &Painter, stats: MoveStats) {
        let center = self.board_to_screen(stats.pos);
        let half = self.cell_size * 0.45;
        let rect = Rect::from_center_size(center, Vec2::splat(half * 2.0));
        painter.rect_filled(rect, CornerRadius::same(3), candidate_fill(stats.avg_score));
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            compact_count(stats.visits),
            egui::FontId::proportional(10.0),
            TEXT_PRIMARY,
        );
    }

    /// Translucent stone numbered by its ply in the predicted line
    fn draw_pv_stone(&self, painter: &Painter, stats: &MoveStats, ply: usize) {
        let center = self.board_to_screen(stats.pos);
        let radius = self.cell_size * STONE_RADIUS_RATIO;
        let (fill, text) = match stats.color {
            Stone::White => (Color32::from_rgba_unmultiplied(250, 250, 252, 140), BLACK_STONE),
            _ => (Color32::from_rgba_unmultiplied(25, 25, 30, 140), WHITE_STONE),
        };
        painter.circle_filled(center, radius, fill);
        painter.circle_stroke(center, radius, Stroke::new(1.5, PV_LABEL));
        painter.text(center, egui::Align2::CENTER_CENTER, ply, egui::FontId::proportional(12.0), text);
    }

    fn draw_winning_line(&self, painter: &Painter, line: &[Pos]) {
        let stroke = Stroke::new(4.0, WIN_HIGHLIGHT);

        for pair in line.windows(2) {
            painter.line_segment([self.board_to_screen(pair[0]), self.board_to_screen(pair[1])], stroke);
        }
        let radius = self.cell_size * STONE_RADIUS_RATIO + 3.0;
        for &pos in line {
            painter.circle_stroke(self.board_to_screen(pos), radius, stroke);
        }
    }

    fn draw_hover_preview(&self, painter: &Painter, pos: Pos, turn: Stone) {
        let center = self.board_to_screen(pos);
        painter.circle_filled(center, self.cell_size * STONE_RADIUS_RATIO, hover_preview(turn));
    }

    /// Convert screen coordinates to board position
    pub fn screen_to_board(&self, screen_pos: Pos2) -> Option<Pos> {
        let relative = screen_pos - self.board_rect.min;
        let x = ((relative.x - BOARD_MARGIN + self.cell_size * 0.5) / self.cell_size).floor() as i32;
        let y = ((relative.y - BOARD_MARGIN + self.cell_size * 0.5) / self.cell_size).floor() as i32;
        Pos::try_new(x, y).ok()
    }

    /// Convert board position to screen coordinates
    pub fn board_to_screen(&self, pos: Pos) -> Pos2 {
        let x = self.board_rect.min.x + BOARD_MARGIN + pos.x as f32 * self.cell_size;
        let y = self.board_rect.min.y + BOARD_MARGIN + pos.y as f32 * self.cell_size;
        Pos2::new(x, y)
    }
}

/// `950`, `12k`, `3.4M`
fn compact_count(n: u32) -> String {
    match n {
        0..=999 => n.to_string(),
        1_000..=999_999 => format!("{}k", n / 1_000),
        _ => format!("{:.1}M", n as f32 / 1_000_000.0),
    }
}
