use eframe::egui;
use std::time::Duration;

use crate::app::{ChatApp, SettingsTab};
use crate::message::{Message, Role};
use crate::prefs::BubbleColor;

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Background promises don't wake the UI on their own.
        if self.pending_models.is_some()
            || self.pending_pull.is_some()
            || self.pending_lookup.is_some()
        {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        self.poll_background();

        ctx.set_visuals(if self.prefs.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("☰").clicked() {
                    self.show_settings = !self.show_settings;
                }
                ui.label("Ollama Chat");
                ui.separator();
                self.render_model_picker(ui);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⟳").on_hover_text("Check connection").clicked() {
                        self.check_status();
                    }
                    self.render_status(ui);
                });
            });
        });

        if !self.prefs.onboarding_shown {
            self.show_onboarding_window(ctx);
        }
        if self.show_settings {
            self.show_settings_window(ctx);
        }

        egui::TopBottomPanel::bottom("input_panel").show(ctx, |ui| {
            self.render_input(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .stick_to_bottom(self.prefs.show_animations)
                .show(ui, |ui| {
                    for message in self.session.messages() {
                        self.render_message(ui, &message);
                    }
                    if self.session.is_busy() {
                        ui.horizontal(|ui| {
                            if self.prefs.show_animations {
                                ui.spinner();
                            }
                            ui.label("Waiting for Ollama...");
                        });
                    }
                });
        });
    }
}

impl ChatApp {
    fn render_status(&self, ui: &mut egui::Ui) {
        if self.monitor.is_reachable() {
            ui.colored_label(egui::Color32::from_rgb(60, 170, 90), "● Running");
        } else {
            ui.colored_label(egui::Color32::from_rgb(220, 60, 60), "● Stopped");
        }
    }

    fn render_model_picker(&mut self, ui: &mut egui::Ui) {
        ui.label("Model:");
        let models = self.session.available_models();
        egui::ComboBox::from_id_source("model_select")
            .selected_text(self.selected_model.clone())
            .show_ui(ui, |ui| {
                for model in &models {
                    ui.selectable_value(&mut self.selected_model, model.clone(), model);
                }
            });
        if self.pending_models.is_some() {
            ui.spinner();
        } else if ui.button("↻").on_hover_text("Refresh model list").clicked() {
            self.refresh_models();
        }
    }

    fn render_message(&self, ui: &mut egui::Ui, message: &Message) {
        let (color, layout) = match message.role() {
            Role::User => (
                self.prefs.chat_user_color,
                egui::Layout::right_to_left(egui::Align::Min),
            ),
            Role::Assistant => (
                self.prefs.chat_ollama_color,
                egui::Layout::left_to_right(egui::Align::Min),
            ),
        };
        ui.push_id(message.id(), |ui| {
            ui.with_layout(layout, |ui| {
                bubble(ui, color, self.prefs.show_gradients, message.content());
            });
        });
        ui.add_space(6.0);
    }

    fn render_input(&mut self, ui: &mut egui::Ui) {
        if let Some(error) = self.session.error_message() {
            ui.colored_label(egui::Color32::RED, error);
        }
        if !self.monitor.is_reachable() {
            ui.label("Ollama is not reachable. Start it with `ollama serve` and press ⟳.");
        }

        ui.horizontal(|ui| {
            let input = ui.add_sized(
                [ui.available_width() - 60.0, 60.0],
                egui::TextEdit::multiline(&mut self.input)
                    .hint_text("Ask something... (Enter to send, Shift+Enter for new line)")
                    .desired_rows(2),
            );
            let enter = input.has_focus()
                && ui.input(|i| i.key_pressed(egui::Key::Enter) && !i.modifiers.shift);
            let send = ui.add_enabled(self.can_send(), egui::Button::new("Send"));
            if send.clicked() || enter {
                self.send_message();
            }
        });
    }

    fn show_onboarding_window(&mut self, ctx: &egui::Context) {
        egui::Window::new("Welcome")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.heading("Chat with your local models");
                ui.label("This app talks to an Ollama server on localhost:11434.");
                ui.label("Install Ollama, run `ollama serve`, and pull a model to get started.");
                ui.add_space(8.0);
                if ui.button("Get started").clicked() {
                    self.prefs.onboarding_shown = true;
                    self.save_prefs();
                }
            });
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        let mut show_settings = self.show_settings;
        egui::Window::new("Settings")
            .open(&mut show_settings)
            .resizable(false)
            .default_width(400.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.active_settings_tab, SettingsTab::General, "General");
                    ui.selectable_value(&mut self.active_settings_tab, SettingsTab::Advanced, "Advanced");
                    ui.selectable_value(&mut self.active_settings_tab, SettingsTab::About, "About");
                });
                ui.separator();
                ui.add_space(8.0);

                match self.active_settings_tab {
                    SettingsTab::General => self.render_general_tab(ui),
                    SettingsTab::Advanced => self.render_advanced_tab(ui),
                    SettingsTab::About => self.render_about_tab(ui),
                }
            });
        self.show_settings = show_settings;
    }

    fn render_general_tab(&mut self, ui: &mut egui::Ui) {
        let mut changed = false;
        ui.heading("Appearance");
        egui::Grid::new("appearance_grid")
            .num_columns(2)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                ui.label("User color:");
                changed |= color_picker(ui, "user_color", &mut self.prefs.chat_user_color);
                ui.end_row();

                ui.label("Ollama color:");
                changed |= color_picker(ui, "ollama_color", &mut self.prefs.chat_ollama_color);
                ui.end_row();
            });
        ui.add_space(8.0);
        changed |= ui.checkbox(&mut self.prefs.dark_mode, "Dark mode").changed();

        if changed {
            self.save_prefs();
        }
    }

    fn render_advanced_tab(&mut self, ui: &mut egui::Ui) {
        ui.heading("Performance");
        let mut changed = ui
            .checkbox(&mut self.prefs.show_gradients, "Show gradient bubbles")
            .on_hover_text("Turning this off may help on older machines.")
            .changed();
        changed |= ui
            .checkbox(&mut self.prefs.show_animations, "Show animations")
            .on_hover_text("Spinner while waiting and auto-scroll to the newest message.")
            .changed();
        if changed {
            self.save_prefs();
        }

        ui.add_space(8.0);
        ui.heading("Models");
        ui.horizontal(|ui| {
            ui.label("Pull:");
            ui.text_edit_singleline(&mut self.pull_input);
            let busy = self.pending_pull.is_some();
            if ui
                .add_enabled(!busy && !self.pull_input.trim().is_empty(), egui::Button::new("Pull"))
                .clicked()
            {
                self.pull_model();
            }
            let looking = self.pending_lookup.is_some();
            if ui
                .add_enabled(!looking && !self.pull_input.trim().is_empty(), egui::Button::new("Installed?"))
                .clicked()
            {
                self.lookup_model();
            }
            if busy || looking {
                ui.spinner();
            }
        });
        if let Some((name, exists)) = &self.last_lookup {
            if *exists {
                ui.label(format!("{} is installed", name));
            } else {
                ui.label(format!("{} is not installed", name));
            }
        }
        if let Some(outcome) = &self.last_pull {
            let color = if outcome.success {
                egui::Color32::from_rgb(60, 170, 90)
            } else {
                egui::Color32::RED
            };
            ui.colored_label(color, &outcome.message);
        }
        if let Some(error) = self.monitor.last_error() {
            ui.colored_label(egui::Color32::RED, error);
        }
    }

    fn render_about_tab(&self, ui: &mut egui::Ui) {
        ui.heading("About Ollama Chat");
        ui.label("An open source front-end for a local Ollama server. Not affiliated with Ollama.");
        ui.separator();
        ui.label(format!("Version: {}", env!("CARGO_PKG_VERSION")));
        ui.label(format!("Architecture: {}", std::env::consts::ARCH));
        ui.label(format!("Server: {}", self.endpoint.base_url()));
        ui.label(format!("Installed models: {}", self.monitor.catalog().len()));
        ui.horizontal(|ui| {
            ui.label("Ollama connection status:");
            self.render_status(ui);
        });
    }
}

fn color_picker(ui: &mut egui::Ui, id: &str, value: &mut BubbleColor) -> bool {
    let mut changed = false;
    egui::ComboBox::from_id_source(id)
        .selected_text(value.label())
        .show_ui(ui, |ui| {
            for color in BubbleColor::ALL {
                changed |= ui.selectable_value(value, color, color.label()).changed();
            }
        });
    changed
}

fn bubble(ui: &mut egui::Ui, color: BubbleColor, gradient: bool, text: &str) {
    let background = ui.painter().add(egui::Shape::Noop);
    let rect = egui::Frame::none()
        .inner_margin(egui::Margin::same(8.0))
        .show(ui, |ui| {
            ui.set_max_width(ui.available_width() * 0.75);
            ui.label(egui::RichText::new(text).color(egui::Color32::BLACK));
        })
        .response
        .rect;

    let ([tr, tg, tb], [br, bg, bb]) = color.fill(gradient);
    let top = egui::Color32::from_rgb(tr, tg, tb);
    let bottom = egui::Color32::from_rgb(br, bg, bb);
    let shape = if gradient {
        let mut mesh = egui::epaint::Mesh::default();
        mesh.colored_vertex(rect.left_top(), top);
        mesh.colored_vertex(rect.right_top(), top);
        mesh.colored_vertex(rect.left_bottom(), bottom);
        mesh.colored_vertex(rect.right_bottom(), bottom);
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(1, 3, 2);
        egui::Shape::mesh(mesh)
    } else {
        egui::Shape::rect_filled(rect, 10.0, bottom)
    };
    ui.painter().set(background, shape);
}
