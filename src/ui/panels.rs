use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – field picks and series list
// ---------------------------------------------------------------------------

/// Render the left panel: x/y field selection and the created-series list.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Series");
    ui.separator();

    if !state.store.has_data() {
        ui.label("No data loaded.");
        series_list(ui, state);
        return;
    }

    let fields = state.store.field_names().to_vec();

    // ---- x field selector ----
    ui.strong("X field");
    let current_x = state.x_field.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("x_field")
        .selected_text(&current_x)
        .show_ui(ui, |ui: &mut Ui| {
            for field in &fields {
                if ui.selectable_label(current_x == *field, field).clicked() {
                    state.x_field = Some(field.clone());
                }
            }
        });
    ui.separator();

    // ---- y field checkboxes ----
    ui.strong("Y fields");
    ScrollArea::vertical()
        .id_salt("y_fields")
        .max_height(180.0)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            for field in &fields {
                let mut checked = state.y_fields.contains(field);
                if ui.checkbox(&mut checked, field).changed() {
                    if checked {
                        state.y_fields.insert(field.clone());
                    } else {
                        state.y_fields.remove(field);
                    }
                }
            }
        });

    if ui.button("Add series").clicked() {
        state.add_field_series();
    }

    ui.separator();
    series_list(ui, state);
}

/// The created-series list. Entries are plain label strings; clicking one
/// round-trips through `resolve_label` to toggle the underlying series.
fn series_list(ui: &mut Ui, state: &mut AppState) {
    if state.registry.is_empty() {
        ui.strong("Created series");
        ui.label("None yet.");
        return;
    }
    ui.strong(format!("Created series ({})", state.registry.len()));

    let entries: Vec<(String, bool)> = state
        .registry
        .iter()
        .map(|s| (s.label(), state.selected.contains(&s.id)))
        .collect();

    ScrollArea::vertical()
        .id_salt("series_list")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (label, shown) in &entries {
                if ui.selectable_label(*shown, label).clicked() {
                    state.toggle_series_label(label);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Refresh").clicked() {
                state.refresh_data();
                ui.close_menu();
            }
            if ui.button("Clear data").clicked() {
                state.clear_data();
                ui.close_menu();
            }
            if ui.button("Reset").clicked() {
                state.reset_data();
                ui.close_menu();
            }
        });

        ui.menu_button("Series", |ui: &mut Ui| {
            if ui.button("From function…").clicked() {
                state.function_input.open = true;
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label("Delimiter:");
        ui.add(
            egui::TextEdit::singleline(&mut state.delimiter)
                .desired_width(16.0)
                .char_limit(1),
        );
        ui.checkbox(&mut state.unit_in_data, "Unit row");

        ui.separator();

        if let Some(path) = state.store.current_file() {
            ui.label(format!(
                "{} — {} fields",
                path.display(),
                state.store.field_names().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Function window
// ---------------------------------------------------------------------------

/// Floating window for sampling a math expression into a series.
pub fn function_window(ctx: &egui::Context, state: &mut AppState) {
    if !state.function_input.open {
        return;
    }
    let mut open = true;
    let mut submitted = false;

    egui::Window::new("Series from function")
        .open(&mut open)
        .resizable(false)
        .show(ctx, |ui: &mut Ui| {
            egui::Grid::new("function_grid").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("Name");
                ui.text_edit_singleline(&mut state.function_input.name);
                ui.end_row();

                ui.label("f(x)");
                ui.text_edit_singleline(&mut state.function_input.expression);
                ui.end_row();

                ui.label("X min");
                ui.text_edit_singleline(&mut state.function_input.x_min);
                ui.end_row();

                ui.label("X max");
                ui.text_edit_singleline(&mut state.function_input.x_max);
                ui.end_row();

                ui.label("Samples");
                ui.text_edit_singleline(&mut state.function_input.samples);
                ui.end_row();
            });

            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Plot").clicked() {
                    submitted = true;
                }
                if ui.button("Cancel").clicked() {
                    state.function_input.open = false;
                }
            });
        });

    if submitted {
        state.add_function_series();
    }
    if !open {
        state.function_input.open = false;
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open delimited data")
        .add_filter("Delimited text", &["csv", "txt", "dat"])
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        state.load_file(&path);
    }
}
