//! Main application for the Gomoku GUI

use eframe::egui;
use egui::{CentralPanel, Context, CornerRadius, Frame, RichText, SidePanel, TopBottomPanel, Vec2};

use super::board_view::{BoardView, Overlay};
use super::game_state::{GameMode, GameState, FRAME_BUDGET};
use super::theme::*;
use crate::engine::{MAX_LEVEL, MIN_LEVEL};
use crate::Stone;

/// Main Gomoku application
pub struct GomokuApp {
    state: GameState,
    board_view: BoardView,
    show_candidates: bool,
    show_variation: bool,
}

impl Default for GomokuApp {
    fn default() -> Self {
        Self {
            state: GameState::new(GameMode::default()),
            board_view: BoardView::default(),
            show_candidates: true,
            show_variation: false,
        }
    }
}

fn color_name(stone: Stone) -> &'static str {
    match stone {
        Stone::Black => "BLACK",
        Stone::White => "WHITE",
        Stone::Empty => "-",
    }
}

impl GomokuApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::default()
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &Context) {
        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Game", |ui| {
                    let modes = [
                        ("New Game (PvE - Black)", GameMode::PvE { human_color: Stone::Black }),
                        ("New Game (PvE - White)", GameMode::PvE { human_color: Stone::White }),
                        ("New Game (PvP)", GameMode::PvP { analysis: false }),
                        ("New Game (PvP + analysis)", GameMode::PvP { analysis: true }),
                    ];
                    for (label, mode) in modes {
                        if ui.button(label).clicked() {
                            self.state.restart(mode);
                            ui.close_menu();
                        }
                    }
                    ui.separator();
                    if ui.button("Undo (U)").clicked() {
                        self.state.undo();
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.show_candidates, "Candidates (C)");
                    ui.checkbox(&mut self.show_variation, "Predicted line (P)");
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let mode_text = match self.state.mode {
                        GameMode::PvE { human_color } => format!("PvE - You: {}", color_name(human_color)),
                        GameMode::PvP { analysis: true } => "PvP - Analysis".to_string(),
                        GameMode::PvP { analysis: false } => "PvP - Hotseat".to_string(),
                    };
                    ui.label(mode_text);
                });
            });
        });
    }

    /// Render the side panel with game info and search statistics
    fn render_side_panel(&mut self, ctx: &Context) {
        SidePanel::right("info_panel")
            .min_width(240.0)
            .max_width(280.0)
            .frame(Frame::new().fill(PANEL_BG))
            .show(ctx, |ui| {
                ui.add_space(12.0);
                ui.label(RichText::new("GOMOKU").size(22.0).strong().color(TEXT_PRIMARY));
                ui.add_space(12.0);

                self.render_turn_card(ui);
                ui.add_space(10.0);
                self.render_level_card(ui);
                ui.add_space(10.0);
                self.render_search_card(ui);
                ui.add_space(10.0);
                self.render_actions_card(ui);

                if self.state.is_game_over() {
                    ui.add_space(10.0);
                    self.render_game_over_card(ui);
                }

                if let Some(msg) = &self.state.message {
                    ui.add_space(10.0);
                    Self::render_message_card(ui, msg);
                }
            });
    }

    fn card_frame() -> Frame {
        Frame::new()
            .fill(CARD_BG)
            .corner_radius(CornerRadius::same(8))
            .inner_margin(12.0)
    }

    fn render_turn_card(&self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            let turn = self.state.current_turn();
            let (accent, symbol_color) = match turn {
                Stone::White => (WHITE_STONE, BLACK_STONE),
                _ => (BLACK_STONE, WHITE_STONE),
            };

            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(Vec2::new(48.0, 48.0), egui::Sense::hover());
                ui.painter().circle_filled(rect.center(), 22.0, accent);
                ui.painter().circle_stroke(rect.center(), 22.0, egui::Stroke::new(1.0, symbol_color));
                ui.add_space(12.0);

                ui.vertical(|ui| {
                    ui.add_space(4.0);
                    ui.label(RichText::new(color_name(turn)).size(18.0).strong().color(TEXT_PRIMARY));

                    let (status, color) = if self.state.is_game_over() {
                        ("Game over", WIN_HIGHLIGHT)
                    } else if self.state.is_ai_turn() {
                        ("AI thinking...", STATUS_BUSY)
                    } else {
                        ("Your turn", STATUS_OK)
                    };
                    ui.label(RichText::new(status).size(12.0).color(color));
                });
            });

            ui.add_space(6.0);
            ui.label(
                RichText::new(format!("{:.1}s on this move", self.state.turn_elapsed().as_secs_f32()))
                    .size(11.0)
                    .color(TEXT_SECONDARY),
            );
            if let Some(ai_time) = self.state.last_ai_time {
                ui.label(
                    RichText::new(format!("Last AI move: {:.2}s", ai_time.as_secs_f32()))
                        .size(10.0)
                        .color(TEXT_MUTED),
                );
            }
        });
    }

    fn render_level_card(&mut self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("AI LEVEL").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);
            let mut level = self.state.level();
            if ui.add(egui::Slider::new(&mut level, MIN_LEVEL..=MAX_LEVEL)).changed() {
                self.state.set_level(level);
            }
        });
    }

    fn render_search_card(&self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("SEARCH").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);

            let tree = self.state.engine.tree();
            let rows = [
                ("Playouts", tree.total_playouts().to_string()),
                ("Candidates", tree.children_count().to_string()),
                ("Nodes", tree.node_count().to_string()),
                ("Updates this move", self.state.thinking.updates.to_string()),
            ];
            for (label, value) in rows {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(label).size(11.0).color(TEXT_SECONDARY));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(RichText::new(value).size(11.0).color(TEXT_PRIMARY));
                    });
                });
            }

            if let Some(best) = self.state.candidates().first() {
                ui.add_space(4.0);
                ui.label(
                    RichText::new(format!(
                        "Best ({}, {})  avg {:+.3}  {} visits",
                        best.pos.x, best.pos.y, best.avg_score, best.visits
                    ))
                    .size(11.0)
                    .strong()
                    .color(STATUS_OK),
                );
            }
        });
    }

    fn render_actions_card(&mut self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("ACTIONS").size(10.0).color(TEXT_MUTED));
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Undo").clicked() {
                    self.state.undo();
                }
                if ui.button("New game").clicked() {
                    self.state.reset();
                }
            });
            ui.add_space(8.0);
            ui.label(
                RichText::new(format!("Move #{}", self.state.engine.board().stone_count()))
                    .size(11.0)
                    .color(TEXT_SECONDARY),
            );
        });
    }

    fn render_game_over_card(&mut self, ui: &mut egui::Ui) {
        let headline = match self.state.winner() {
            Some(winner) => format!("{} WINS!", color_name(winner)),
            None if self.state.is_draw() => "DRAW".to_string(),
            None => return,
        };

        Frame::new()
            .fill(egui::Color32::from_rgb(45, 80, 55))
            .corner_radius(CornerRadius::same(8))
            .inner_margin(16.0)
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("GAME OVER").size(12.0).color(egui::Color32::from_rgb(180, 255, 180)));
                    ui.add_space(8.0);
                    ui.label(RichText::new(headline).size(18.0).strong().color(TEXT_PRIMARY));
                    ui.add_space(12.0);
                    if ui.button("New game").clicked() {
                        self.state.reset();
                    }
                });
            });
    }

    fn render_message_card(ui: &mut egui::Ui, msg: &str) {
        Frame::new()
            .fill(egui::Color32::from_rgb(80, 60, 30))
            .corner_radius(CornerRadius::same(8))
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.label(RichText::new(msg).size(11.0).color(STATUS_ERROR));
            });
    }

    /// Render the main board
    fn render_board(&mut self, ctx: &Context) {
        CentralPanel::default().show(ctx, |ui| {
            ui.style_mut().visuals.panel_fill = egui::Color32::from_rgb(40, 42, 46);

            let candidates: Vec<_> = if self.show_candidates && !self.state.is_game_over() {
                self.state.candidates().into_iter().take(MAX_CANDIDATES_SHOWN).collect()
            } else {
                Vec::new()
            };
            let variation: Vec<_> = if self.show_variation && !self.state.is_game_over() {
                self.state.principal_variation().into_iter().take(MAX_PV_SHOWN).collect()
            } else {
                Vec::new()
            };
            let winning_line = self.state.winning_line();
            let overlay = Overlay {
                candidates: &candidates,
                principal_variation: &variation,
                winning_line: winning_line.as_deref(),
            };

            let accepts_input = !self.state.is_game_over() && self.state.is_human_turn();
            let clicked = self.board_view.show(ui, self.state.engine.board(), &overlay, accepts_input);

            if let Some(pos) = clicked {
                if let Err(msg) = self.state.try_place_stone(pos) {
                    self.state.message = Some(msg);
                }
            }
        });
    }

    /// Handle keyboard shortcuts
    fn handle_input(&mut self, ctx: &Context) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::C) {
                self.show_candidates = !self.show_candidates;
            }
            if i.key_pressed(egui::Key::P) {
                self.show_variation = !self.show_variation;
            }
            if i.key_pressed(egui::Key::U) {
                self.state.undo();
            }
            if i.key_pressed(egui::Key::N) {
                self.state.reset();
            }
        });
    }
}

impl eframe::App for GomokuApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);

        self.state.tick(FRAME_BUDGET);

        self.render_menu_bar(ctx);
        self.render_side_panel(ctx);
        self.render_board(ctx);

        // Keep frames coming while the search runs
        if self.state.is_searching() {
            ctx.request_repaint();
        }
    }
}
