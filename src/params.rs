//! Tree parameters: defaults, partial overrides, per-field metadata for
//! the panel, and the change-notification store.

use crossterm::style::Color;
use serde::Deserialize;

/// Named colors the panel cycles through. First entry is the default.
pub const PALETTE: &[(&str, Color)] = &[
    ("dark-grey", Color::DarkGrey),
    ("white", Color::White),
    ("green", Color::Green),
    ("dark-green", Color::DarkGreen),
    ("yellow", Color::Yellow),
    ("dark-yellow", Color::DarkYellow),
    ("cyan", Color::Cyan),
    ("magenta", Color::Magenta),
    ("red", Color::Red),
    ("blue", Color::Blue),
];

/// Look up a palette color by name.
pub fn parse_color(name: &str) -> Option<Color> {
    let name = name.to_lowercase();
    PALETTE
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
}

/// Tunables read on every branch step.
///
/// Reduction pairs must satisfy min <= max; the core samples the interval
/// as given and leaves range checking to the panel.
#[derive(Clone, Copy)]
pub struct Params {
    pub final_length: f64,
    pub min_len_reduction: f64,
    pub max_len_reduction: f64,
    pub min_weight_reduction: f64,
    pub max_weight_reduction: f64,
    pub color: Color,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            final_length: 10.0,
            min_len_reduction: 0.7,
            max_len_reduction: 0.9,
            min_weight_reduction: 0.6,
            max_weight_reduction: 0.8,
            color: PALETTE[0].1,
        }
    }
}

/// Partial override: supplied fields replace defaults, absent fields keep
/// them. Deserializable so the settings file can provide one.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ParamsPatch {
    pub final_length: Option<f64>,
    pub min_len_reduction: Option<f64>,
    pub max_len_reduction: Option<f64>,
    pub min_weight_reduction: Option<f64>,
    pub max_weight_reduction: Option<f64>,
    pub color: Option<String>,
}

impl ParamsPatch {
    /// Layer `other` on top of this patch (other's fields win).
    pub fn merge(mut self, other: ParamsPatch) -> ParamsPatch {
        self.final_length = other.final_length.or(self.final_length);
        self.min_len_reduction = other.min_len_reduction.or(self.min_len_reduction);
        self.max_len_reduction = other.max_len_reduction.or(self.max_len_reduction);
        self.min_weight_reduction = other.min_weight_reduction.or(self.min_weight_reduction);
        self.max_weight_reduction = other.max_weight_reduction.or(self.max_weight_reduction);
        self.color = other.color.or(self.color);
        self
    }
}

impl Params {
    /// Defaults with a patch applied on top.
    pub fn patched(patch: &ParamsPatch) -> Self {
        let mut params = Self::default();
        params.apply(patch);
        params
    }

    pub fn apply(&mut self, patch: &ParamsPatch) {
        if let Some(v) = patch.final_length {
            self.final_length = v;
        }
        if let Some(v) = patch.min_len_reduction {
            self.min_len_reduction = v;
        }
        if let Some(v) = patch.max_len_reduction {
            self.max_len_reduction = v;
        }
        if let Some(v) = patch.min_weight_reduction {
            self.min_weight_reduction = v;
        }
        if let Some(v) = patch.max_weight_reduction {
            self.max_weight_reduction = v;
        }
        if let Some(ref name) = patch.color {
            if let Some(c) = parse_color(name) {
                self.color = c;
            }
        }
    }

    pub fn get(&self, field: ParamField) -> f64 {
        match field {
            ParamField::FinalLength => self.final_length,
            ParamField::MinLenReduction => self.min_len_reduction,
            ParamField::MaxLenReduction => self.max_len_reduction,
            ParamField::MinWeightReduction => self.min_weight_reduction,
            ParamField::MaxWeightReduction => self.max_weight_reduction,
        }
    }

    pub fn set(&mut self, field: ParamField, value: f64) {
        match field {
            ParamField::FinalLength => self.final_length = value,
            ParamField::MinLenReduction => self.min_len_reduction = value,
            ParamField::MaxLenReduction => self.max_len_reduction = value,
            ParamField::MinWeightReduction => self.min_weight_reduction = value,
            ParamField::MaxWeightReduction => self.max_weight_reduction = value,
        }
    }
}

/// Numeric parameter fields, one panel control each.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    FinalLength,
    MinLenReduction,
    MaxLenReduction,
    MinWeightReduction,
    MaxWeightReduction,
}

impl ParamField {
    pub const ALL: [ParamField; 5] = [
        ParamField::FinalLength,
        ParamField::MinLenReduction,
        ParamField::MaxLenReduction,
        ParamField::MinWeightReduction,
        ParamField::MaxWeightReduction,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ParamField::FinalLength => "final length",
            ParamField::MinLenReduction => "min len reduction",
            ParamField::MaxLenReduction => "max len reduction",
            ParamField::MinWeightReduction => "min weight reduction",
            ParamField::MaxWeightReduction => "max weight reduction",
        }
    }

    /// Declared control bounds, enforced by the panel only.
    pub fn range(self) -> (f64, f64) {
        match self {
            ParamField::FinalLength => (3.0, 40.0),
            ParamField::MinLenReduction => (0.3, 0.9),
            ParamField::MaxLenReduction => (0.3, 0.95),
            ParamField::MinWeightReduction => (0.2, 1.0),
            ParamField::MaxWeightReduction => (0.2, 1.0),
        }
    }

    /// Panel nudge increment.
    pub fn step(self) -> f64 {
        match self {
            ParamField::FinalLength => 1.0,
            _ => 0.05,
        }
    }
}

type Listener = Box<dyn FnMut(&Params)>;

/// Parameter container plus change subscribers.
///
/// `set`/`set_color` only mutate; `commit` fires every subscriber once.
/// The tree core never commits; the panel does, after an edit session
/// completes.
#[derive(Default)]
pub struct ParamStore {
    params: Params,
    listeners: Vec<Listener>,
}

impl ParamStore {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            listeners: Vec::new(),
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn set(&mut self, field: ParamField, value: f64) {
        self.params.set(field, value);
    }

    pub fn set_color(&mut self, color: Color) {
        self.params.color = color;
    }

    pub fn subscribe<F: FnMut(&Params) + 'static>(&mut self, listener: F) {
        self.listeners.push(Box::new(listener));
    }

    /// Notify every subscriber of the current parameter values.
    pub fn commit(&mut self) {
        for listener in &mut self.listeners {
            listener(&self.params);
        }
    }
}
