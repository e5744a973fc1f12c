/// Configuration for a tree-drawing run
#[derive(Clone)]
pub struct AppConfig {
    /// Print one tree to stdout instead of the interactive display
    pub print: bool,
    /// Keep generating trees on a timer
    pub infinite: bool,
    /// Wait time between trees in infinite mode (seconds)
    pub wait: f64,
    /// Random seed; wall clock when absent
    pub seed: Option<u64>,
}
