use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::color::series_color;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Series plot (central panel)
// ---------------------------------------------------------------------------

/// Render the selected series as lines in the central panel.
pub fn series_plot(ui: &mut Ui, state: &AppState) {
    let shown: Vec<_> = state
        .selected
        .iter()
        .filter_map(|&id| state.registry.get(id))
        .collect();

    if shown.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Load a file and add a series  (File → Open…)");
        });
        return;
    }

    // Axis captions come from the first drawn series, like the original
    // single-axes layout.
    let x_caption = shown[0].x_caption();
    let y_caption = shown[0].y_caption();

    Plot::new("series_plot")
        .legend(Legend::default())
        .x_axis_label(x_caption)
        .y_axis_label(y_caption)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let total = shown.len();
            for (index, series) in shown.iter().enumerate() {
                let points: PlotPoints = series
                    .x
                    .iter()
                    .zip(series.y.iter())
                    .map(|(&xi, &yi)| [xi, yi])
                    .collect();

                let line = Line::new(points)
                    .name(series.label())
                    .color(series_color(index, total))
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}
