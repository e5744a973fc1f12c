//! Interactive parameter panel: one control per field with its declared
//! bounds. Edits are clamped here, never in the tree core, and committed
//! to the store once per edit session.

use crate::debounce::Debouncer;
use crate::params::{ParamField, ParamStore, PALETTE};
use crate::terminal::Terminal;
use crossterm::event::KeyCode;
use crossterm::style::Color;
use std::time::{Duration, Instant};

/// Numeric field rows, then the color slot.
const COLOR_ROW: usize = ParamField::ALL.len();

/// An edit session ends after this long without a nudge.
const EDIT_SESSION_QUIET: Duration = Duration::from_millis(400);

pub struct Panel {
    visible: bool,
    selected: usize,
    palette_idx: usize,
    session: Debouncer,
}

impl Panel {
    pub fn new(store: &ParamStore) -> Self {
        let current = store.params().color;
        let palette_idx = PALETTE
            .iter()
            .position(|(_, c)| *c == current)
            .unwrap_or(0);
        Self {
            visible: true,
            selected: 0,
            palette_idx,
            session: Debouncer::new(EDIT_SESSION_QUIET),
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Handle a keypress. Returns true if the panel consumed it.
    pub fn handle_key(&mut self, code: KeyCode, store: &mut ParamStore, now: Instant) -> bool {
        if !self.visible {
            return false;
        }
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = if self.selected == 0 {
                    COLOR_ROW
                } else {
                    self.selected - 1
                };
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1) % (COLOR_ROW + 1);
                true
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => {
                self.nudge(-1.0, store, now);
                true
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') | KeyCode::Char('=') => {
                self.nudge(1.0, store, now);
                true
            }
            _ => false,
        }
    }

    /// Apply one step to the selected control and keep the edit session
    /// open. Values are clamped to the field's declared range.
    fn nudge(&mut self, dir: f64, store: &mut ParamStore, now: Instant) {
        if self.selected == COLOR_ROW {
            let n = PALETTE.len() as i64;
            let idx = (self.palette_idx as i64 + dir as i64).rem_euclid(n) as usize;
            self.palette_idx = idx;
            store.set_color(PALETTE[idx].1);
        } else {
            let field = ParamField::ALL[self.selected];
            let (low, high) = field.range();
            let value = (store.params().get(field) + dir * field.step()).clamp(low, high);
            store.set(field, value);
        }
        self.session.trigger(now);
    }

    /// True while a started edit session has not committed yet.
    pub fn editing(&self) -> bool {
        self.session.pending()
    }

    /// Close out a finished edit session; fires the store's change
    /// notification exactly once per burst of edits.
    pub fn poll(&mut self, store: &mut ParamStore, now: Instant) {
        if self.session.take_ready(now) {
            store.commit();
        }
    }

    /// Draw the sidebar onto the back buffer, top-right.
    pub fn render(&self, term: &mut Terminal, store: &ParamStore) {
        if !self.visible {
            return;
        }

        let (width, _) = term.size();
        let panel_width = 37;
        let x = width as i32 - panel_width;
        if x < 0 {
            return;
        }

        term.set_str(x, 1, "parameters", Some(Color::White));

        for (row, field) in ParamField::ALL.iter().enumerate() {
            let (low, high) = field.range();
            let marker = if row == self.selected { '>' } else { ' ' };
            let line = format!(
                "{} {:<28}{:>6.2}",
                marker,
                format!("{} [{}-{}]", field.label(), low, high),
                store.params().get(*field),
            );
            let fg = if row == self.selected {
                Color::White
            } else {
                Color::DarkGrey
            };
            term.set_str(x, 2 + row as i32, &line, Some(fg));
        }

        let marker = if self.selected == COLOR_ROW { '>' } else { ' ' };
        let (name, color) = PALETTE[self.palette_idx];
        let line = format!("{} {:<21}{:>14}", marker, "color", name);
        term.set_str(x, 2 + COLOR_ROW as i32, &line, Some(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;
    use std::cell::Cell;
    use std::rc::Rc;

    fn store_with_counter() -> (ParamStore, Rc<Cell<u32>>) {
        let mut store = ParamStore::new(Params::default());
        let commits = Rc::new(Cell::new(0u32));
        let c = commits.clone();
        store.subscribe(move |_| c.set(c.get() + 1));
        (store, commits)
    }

    #[test]
    fn nudge_steps_and_clamps_to_declared_range() {
        let (mut store, _) = store_with_counter();
        let mut panel = Panel::new(&store);
        let now = Instant::now();

        // final_length: default 10, step 1
        panel.handle_key(KeyCode::Right, &mut store, now);
        assert_eq!(store.params().final_length, 11.0);

        for _ in 0..100 {
            panel.handle_key(KeyCode::Right, &mut store, now);
        }
        assert_eq!(store.params().final_length, 40.0, "clamped at declared max");

        for _ in 0..100 {
            panel.handle_key(KeyCode::Left, &mut store, now);
        }
        assert_eq!(store.params().final_length, 3.0, "clamped at declared min");
    }

    #[test]
    fn edit_session_commits_once_per_burst() {
        let (mut store, commits) = store_with_counter();
        let mut panel = Panel::new(&store);
        let t0 = Instant::now();

        // A burst of edits: no commit while keys keep coming
        for i in 0..5 {
            panel.handle_key(KeyCode::Right, &mut store, t0 + Duration::from_millis(i * 50));
            panel.poll(&mut store, t0 + Duration::from_millis(i * 50 + 10));
        }
        assert_eq!(commits.get(), 0);
        assert!(panel.editing());

        // Quiet period elapses: exactly one commit
        panel.poll(&mut store, t0 + Duration::from_secs(2));
        assert_eq!(commits.get(), 1);
        assert!(!panel.editing());

        panel.poll(&mut store, t0 + Duration::from_secs(4));
        assert_eq!(commits.get(), 1, "no commit without a new session");
    }

    #[test]
    fn cursor_wraps_over_all_rows() {
        let (mut store, _) = store_with_counter();
        let mut panel = Panel::new(&store);
        let now = Instant::now();

        for _ in 0..=COLOR_ROW {
            panel.handle_key(KeyCode::Down, &mut store, now);
        }
        assert_eq!(panel.selected, 0, "wrapped past the color row");

        panel.handle_key(KeyCode::Up, &mut store, now);
        assert_eq!(panel.selected, COLOR_ROW);
    }

    #[test]
    fn color_row_cycles_palette() {
        let (mut store, _) = store_with_counter();
        let mut panel = Panel::new(&store);
        let now = Instant::now();
        panel.handle_key(KeyCode::Up, &mut store, now); // select color row

        let start = store.params().color;
        panel.handle_key(KeyCode::Right, &mut store, now);
        assert_ne!(store.params().color, start);

        panel.handle_key(KeyCode::Left, &mut store, now);
        assert_eq!(store.params().color, start);
    }

    #[test]
    fn hidden_panel_ignores_keys() {
        let (mut store, _) = store_with_counter();
        let mut panel = Panel::new(&store);
        panel.toggle();
        assert!(!panel.handle_key(KeyCode::Right, &mut store, Instant::now()));
        assert_eq!(store.params().final_length, 10.0);
    }
}
