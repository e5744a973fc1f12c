//! Run harness: owns the render loop, seeds, and the debounced
//! regeneration wiring between the panel and the tree core.

use crate::canvas::BrailleCanvas;
use crate::config::AppConfig;
use crate::debounce::Debouncer;
use crate::help::show_help_modal;
use crate::panel::Panel;
use crate::params::{Params, ParamStore};
use crate::sampler::RngSampler;
use crate::terminal::Terminal;
use crate::tree::{draw_tree, TreeStats};
use crossterm::event::KeyCode;
use crossterm::style::Color;
use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

const HELP: &str = "\
FRACTAL TREE
─────────────────
n      New tree
p      Toggle panel
j/k    Select parameter
h/l    Adjust parameter
q/Esc  Quit
?      Close help";

/// Coalesce parameter-change notifications into one regeneration.
const REGEN_DEBOUNCE: Duration = Duration::from_millis(300);

/// World height a tree roughly fills: the fixed trunk plus a decaying
/// branch path. Used to fit the view to the terminal.
const TREE_EXTENT: f64 = 560.0;

pub fn run(config: &AppConfig, params: Params) -> io::Result<()> {
    let seed = config.seed.unwrap_or_else(clock_seed);

    if config.print {
        run_print(config, params, seed)
    } else {
        run_interactive(config, params, seed)
    }
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0) // Fallback seed for misconfigured system clocks
}

/// Canvas sized to the terminal with the tree fitted bottom-center.
fn fitted_canvas(cells_w: u16, cells_h: u16) -> BrailleCanvas {
    let mut canvas = BrailleCanvas::new(cells_w, cells_h);
    let (dots_w, dots_h) = canvas.dot_size();
    let scale = (dots_h as f64 / TREE_EXTENT).max(0.05);
    canvas.set_view(dots_w as f64 / 2.0, dots_h as f64 - 1.0, scale);
    canvas
}

/// Generate one tree into the canvas. The tree grows up from the world
/// origin; the view transform puts that at the bottom center.
fn generate(canvas: &mut BrailleCanvas, params: &Params, seed: u64) -> TreeStats {
    let mut sampler = RngSampler::seeded(seed);
    canvas.clear();
    draw_tree(canvas, &mut sampler, params, 0.0, 0.0)
}

fn run_print(config: &AppConfig, params: Params, initial_seed: u64) -> io::Result<()> {
    let mut seed = initial_seed;

    loop {
        let mut term = Terminal::new(false)?;
        let (width, height) = term.size();

        let mut canvas = fitted_canvas(width, height);
        let stats = generate(&mut canvas, &params, seed);
        canvas.blit(&mut term);
        term.print_to_stdout();

        if stats.capped {
            eprintln!(
                "branch cap reached ({} calls), tree truncated",
                stats.branches
            );
        }

        if !config.infinite {
            break;
        }

        term.sleep(config.wait as f32);
        seed = clock_seed();
    }

    Ok(())
}

fn run_interactive(config: &AppConfig, params: Params, initial_seed: u64) -> io::Result<()> {
    let mut seed = initial_seed;

    let mut store = ParamStore::new(params);
    // Change hook: the panel commits an edit session, the flag trips,
    // the debouncer below folds bursts into one regeneration.
    let notified = Rc::new(Cell::new(false));
    let flag = notified.clone();
    store.subscribe(move |_| flag.set(true));

    let mut panel = Panel::new(&store);
    let mut scheduler = Debouncer::new(REGEN_DEBOUNCE);

    let mut term = Terminal::new(true)?;
    term.clear_screen()?;

    let (mut prev_w, mut prev_h) = term.size();
    let mut canvas = fitted_canvas(prev_w, prev_h.saturating_sub(1));
    let mut stats = generate(&mut canvas, store.params(), seed);
    compose(&mut term, &canvas, &panel, &store, &stats, seed)?;

    let mut last_tree = Instant::now();

    loop {
        // Re-fit on terminal resize
        let (width, height) = crossterm::terminal::size().unwrap_or(term.size());
        if width != prev_w || height != prev_h {
            term.resize(width, height);
            term.clear_screen()?;
            prev_w = width;
            prev_h = height;
            canvas = fitted_canvas(width, height.saturating_sub(1));
            stats = generate(&mut canvas, store.params(), seed);
            compose(&mut term, &canvas, &panel, &store, &stats, seed)?;
        }

        if let Some(code) = term.wait_key(50)? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('?') => {
                    if show_help_modal(&mut term, HELP)? {
                        break;
                    }
                }
                KeyCode::Char('n') => {
                    seed = clock_seed();
                    stats = generate(&mut canvas, store.params(), seed);
                    compose(&mut term, &canvas, &panel, &store, &stats, seed)?;
                    last_tree = Instant::now();
                }
                KeyCode::Char('p') => {
                    panel.toggle();
                    compose(&mut term, &canvas, &panel, &store, &stats, seed)?;
                }
                code => {
                    if panel.handle_key(code, &mut store, Instant::now()) {
                        // Show the new value right away; the tree follows
                        // once the edit session commits
                        compose(&mut term, &canvas, &panel, &store, &stats, seed)?;
                    }
                }
            }
        }

        let now = Instant::now();
        panel.poll(&mut store, now);
        if notified.replace(false) {
            scheduler.trigger(now);
        }
        if scheduler.take_ready(now) {
            // Same seed: the parameter change is visible in isolation
            stats = generate(&mut canvas, store.params(), seed);
            compose(&mut term, &canvas, &panel, &store, &stats, seed)?;
        }

        if config.infinite && last_tree.elapsed() >= Duration::from_secs_f64(config.wait) {
            seed = clock_seed();
            stats = generate(&mut canvas, store.params(), seed);
            compose(&mut term, &canvas, &panel, &store, &stats, seed)?;
            last_tree = Instant::now();
        }
    }

    Ok(())
}

/// Rebuild the frame: tree, panel sidebar, status line.
fn compose(
    term: &mut Terminal,
    canvas: &BrailleCanvas,
    panel: &Panel,
    store: &ParamStore,
    stats: &TreeStats,
    seed: u64,
) -> io::Result<()> {
    term.clear();
    canvas.blit(term);
    panel.render(term, store);

    let (_, height) = term.size();
    let truncated = if stats.capped { "  [truncated]" } else { "" };
    let editing = if panel.editing() { "  editing" } else { "" };
    let status = format!(
        "seed {}  branches {}  segments {}{}{}  ?:help",
        seed, stats.branches, stats.segments, truncated, editing
    );
    term.set_str(1, height as i32 - 1, &status, Some(Color::DarkGrey));

    term.present()
}
