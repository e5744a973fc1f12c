mod app;
mod canvas;
mod config;
mod debounce;
mod help;
mod panel;
mod params;
mod sampler;
mod settings;
mod terminal;
mod tree;

use clap::Parser;
use config::AppConfig;
use params::{Params, ParamsPatch};
use settings::Settings;
use std::io;

#[derive(Parser)]
#[command(name = "treeart")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.2.0")]
#[command(about = "Terminal-based generative art: stochastic fractal trees", long_about = None)]
struct Cli {
    /// Print one tree to stdout (no interactive display)
    #[arg(short, long)]
    print: bool,

    /// Keep generating trees infinitely
    #[arg(short, long)]
    infinite: bool,

    /// Wait time between trees in infinite mode (seconds, default 4)
    #[arg(short, long)]
    wait: Option<f64>,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Minimum branch length before termination (3-40)
    #[arg(short = 'L', long)]
    final_length: Option<f64>,

    /// Lower bound of the per-step length decay factor (0.3-0.9)
    #[arg(long)]
    min_len_reduction: Option<f64>,

    /// Upper bound of the per-step length decay factor (0.3-0.95)
    #[arg(long)]
    max_len_reduction: Option<f64>,

    /// Lower bound of the per-step stroke-width decay factor (0.2-1.0)
    #[arg(long)]
    min_weight_reduction: Option<f64>,

    /// Upper bound of the per-step stroke-width decay factor (0.2-1.0)
    #[arg(long)]
    max_weight_reduction: Option<f64>,

    /// Stroke color (dark-grey, white, green, dark-green, yellow,
    /// dark-yellow, cyan, magenta, red, blue)
    #[arg(short, long)]
    color: Option<String>,
}

impl Cli {
    fn params_patch(&self) -> ParamsPatch {
        ParamsPatch {
            final_length: self.final_length,
            min_len_reduction: self.min_len_reduction,
            max_len_reduction: self.max_len_reduction,
            min_weight_reduction: self.min_weight_reduction,
            max_weight_reduction: self.max_weight_reduction,
            color: self.color.clone(),
        }
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if let Some(ref name) = cli.color {
        if params::parse_color(name).is_none() {
            eprintln!("Unknown color: {}. Using dark-grey.", name);
        }
    }

    // Built-in defaults, then the config file, then CLI flags
    let file = Settings::load();
    let patch = file.params.merge(cli.params_patch());
    let params = Params::patched(&patch);

    let config = AppConfig {
        print: cli.print,
        infinite: cli.infinite,
        wait: cli.wait.or(file.wait).unwrap_or(4.0).max(0.1),
        seed: cli.seed,
    };

    app::run(&config, params)
}
