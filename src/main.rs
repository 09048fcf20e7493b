mod app;
mod cli;
mod color;
mod data;
mod error;
mod expr;
mod series;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use eframe::egui;

use app::RustyPlotterApp;
use data::LoadOptions;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "rusty-plotter")]
#[command(about = "Load delimited data files and plot named series", long_about = None)]
struct Args {
    /// Path to the delimited data file to open
    file: Option<PathBuf>,

    /// Field separator (single ASCII character)
    #[arg(short, long, default_value_t = ';')]
    delimiter: char,

    /// Treat the first data row as data instead of unit labels
    #[arg(long)]
    no_unit_row: bool,

    /// Field name for the x axis (enables one-shot mode together with -y)
    #[arg(short)]
    x: Option<String>,

    /// Field name(s) for the y axis, comma-separated (one-shot mode)
    #[arg(short)]
    y: Option<String>,
}

impl Args {
    fn load_options(&self) -> Result<LoadOptions> {
        if !self.delimiter.is_ascii() {
            anyhow::bail!("delimiter must be a single ASCII character");
        }
        Ok(LoadOptions {
            delimiter: self.delimiter as u8,
            unit_in_data: !self.no_unit_row,
            clear_before_load: true,
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let state = if args.x.is_some() || args.y.is_some() {
        // One-shot mode: every argument is required, and the core is not
        // touched until they all check out.
        let (Some(x), Some(y)) = (&args.x, &args.y) else {
            anyhow::bail!("one-shot mode needs both -x and -y");
        };
        let Some(file) = &args.file else {
            anyhow::bail!("one-shot mode needs a data file");
        };
        cli::one_shot_state(file, args.load_options()?, x, y)?
    } else {
        let mut state = AppState::default();
        state.delimiter = args.delimiter.to_string();
        state.unit_in_data = !args.no_unit_row;
        if let Some(file) = &args.file {
            state.load_file(file);
        }
        state
    };

    run_viewer(state)
}

fn run_viewer(state: AppState) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Plotter – Series Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(RustyPlotterApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}
