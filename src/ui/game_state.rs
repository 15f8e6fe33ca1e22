//! Game state management for the Gomoku GUI
//!
//! The engine thinks in slices: every frame runs [`GameState::tick`], which
//! spends a small time budget on tree updates and lets the AI move once the
//! tree is ready for the selected level.

use std::time::{Duration, Instant};

use crate::engine::{Engine, ThinkReport};
use crate::search::{MoveStats, SearchConfig};
use crate::{GameStatus, Pos, Stone};

/// Search time spent per frame.
pub const FRAME_BUDGET: Duration = Duration::from_millis(12);

/// Game mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Player vs AI
    PvE { human_color: Stone },
    /// Player vs Player (hotseat), optionally with the search running for
    /// analysis
    PvP { analysis: bool },
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::PvE { human_color: Stone::Black }
    }
}

impl GameMode {
    /// Color the engine searches for.
    fn engine_color(self) -> Stone {
        match self {
            GameMode::PvE { human_color } => human_color.opponent(),
            GameMode::PvP { .. } => Stone::Black,
        }
    }
}

/// Main game state
pub struct GameState {
    pub engine: Engine,
    pub mode: GameMode,
    pub message: Option<String>,
    /// Search work accumulated for the move being thought about
    pub thinking: ThinkReport,
    /// Time the last AI move took
    pub last_ai_time: Option<Duration>,
    turn_start: Instant,
}

impl GameState {
    pub fn new(mode: GameMode) -> Self {
        Self::with_config(mode, SearchConfig::default())
    }

    pub fn with_config(mode: GameMode, config: SearchConfig) -> Self {
        Self {
            engine: Engine::new(mode.engine_color(), config),
            mode,
            message: None,
            thinking: ThinkReport::default(),
            last_ai_time: None,
            turn_start: Instant::now(),
        }
    }

    /// Start over in `mode`, keeping the level.
    pub fn restart(&mut self, mode: GameMode) {
        self.mode = mode;
        self.engine.set_ai_color(mode.engine_color());
        self.reset();
    }

    pub fn reset(&mut self) {
        self.engine.reset();
        self.message = None;
        self.thinking = ThinkReport::default();
        self.last_ai_time = None;
        self.turn_start = Instant::now();
    }

    #[inline]
    pub fn current_turn(&self) -> Stone {
        self.engine.board().side_to_move()
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.engine.status().is_terminal()
    }

    pub fn level(&self) -> u32 {
        self.engine.level()
    }

    pub fn set_level(&mut self, level: u32) {
        self.engine.set_level(level);
    }

    /// Check if it's the human's turn
    pub fn is_human_turn(&self) -> bool {
        match self.mode {
            GameMode::PvE { human_color } => self.current_turn() == human_color,
            GameMode::PvP { .. } => true,
        }
    }

    /// Check if it's the AI's turn
    pub fn is_ai_turn(&self) -> bool {
        matches!(self.mode, GameMode::PvE { .. }) && !self.is_game_over() && !self.is_human_turn()
    }

    /// The search keeps running between moves in PvE and in PvP analysis.
    pub fn is_searching(&self) -> bool {
        !self.is_game_over()
            && match self.mode {
                GameMode::PvE { .. } => true,
                GameMode::PvP { analysis } => analysis,
            }
    }

    /// Time since the side to move got the turn.
    pub fn turn_elapsed(&self) -> Duration {
        self.turn_start.elapsed()
    }

    /// One frame of thinking, then the AI move if the tree is ready.
    pub fn tick(&mut self, budget: Duration) {
        if !self.is_searching() {
            return;
        }
        match self.engine.think(budget) {
            Ok(report) => {
                self.thinking.updates += report.updates;
                self.thinking.playouts += report.playouts;
                self.thinking.elapsed += report.elapsed;
            }
            Err(err) => {
                log::error!("search failed: {err}");
                self.message = Some(format!("Search failed: {err}"));
                return;
            }
        }

        if self.is_ai_turn() {
            if let Some(pos) = self.engine.decide() {
                self.last_ai_time = Some(self.turn_elapsed());
                self.execute_move(pos);
            }
        }
    }

    /// Attempt to place a stone for the human player
    pub fn try_place_stone(&mut self, pos: Pos) -> Result<(), String> {
        if self.is_game_over() {
            return Err("Game is over".to_string());
        }
        if !self.is_human_turn() {
            return Err("Not your turn".to_string());
        }
        if !self.engine.board().is_empty(pos) {
            return Err("Cell is occupied".to_string());
        }
        self.execute_move(pos);
        Ok(())
    }

    fn execute_move(&mut self, pos: Pos) {
        match self.engine.play(pos.x as i32, pos.y as i32) {
            Ok(true) => {
                self.message = None;
                self.thinking = ThinkReport::default();
                self.turn_start = Instant::now();
            }
            Ok(false) => self.message = Some("Move rejected".to_string()),
            Err(err) => {
                log::error!("move ({}, {}) failed: {err}", pos.x, pos.y);
                self.message = Some(err.to_string());
            }
        }
    }

    /// Undo last move. In PvE moves are taken back until the human is to
    /// move again.
    pub fn undo(&mut self) {
        if !self.engine.undo() {
            return;
        }
        if let GameMode::PvE { human_color } = self.mode {
            while self.current_turn() != human_color && self.engine.undo() {}
        }
        self.message = None;
        self.thinking = ThinkReport::default();
        self.turn_start = Instant::now();
    }

    /// Candidate moves for the side to move, best average first.
    pub fn candidates(&self) -> Vec<MoveStats> {
        let mut data = self.engine.tree().nodes_data();
        data.sort_by(|a, b| b.avg_score.total_cmp(&a.avg_score));
        data
    }

    /// Predicted continuation after the best candidate.
    pub fn principal_variation(&self) -> Vec<MoveStats> {
        self.candidates()
            .first()
            .map(|best| self.engine.tree().best_playout(best.pos.x as i32, best.pos.y as i32))
            .unwrap_or_default()
    }

    pub fn winning_line(&self) -> Option<Vec<Pos>> {
        self.engine.board().winning_line()
    }

    pub fn last_move(&self) -> Option<Pos> {
        self.engine.board().last_move().map(|m| m.pos)
    }

    pub fn winner(&self) -> Option<Stone> {
        self.engine.status().winner()
    }

    pub fn is_draw(&self) -> bool {
        self.engine.status() == GameStatus::Draw
    }
}
