//! Color and opacity scales for tiles and legend swatches.

use indexmap::IndexSet;

/// Console palette. Order matters: category `i` in dataset order gets color `i`.
pub const CATEGORY_PALETTE: [&str; 18] = [
    "#f50808", "#f56308", "#f5b408", "#f4f508", "#9af508", "#08f526", "#08f5a1", "#08f5de",
    "#08c0f5", "#0882f5", "#083bf5", "#5f08f5", "#b908f5", "#f508ef", "#f50890", "#47517c",
    "#477c77", "#7c4747",
];

pub const OPACITY_RANGE: (f64, f64) = (0.75, 1.0);

/// Categorical scale with an implicit, insertion-ordered domain.
///
/// Unknown keys are appended to the domain on first use; colors cycle once the domain outgrows
/// the range.
#[derive(Debug, Clone, Default)]
pub struct OrdinalScale {
    range: Vec<String>,
    domain: IndexSet<String>,
}

impl OrdinalScale {
    pub fn new<I, S>(range: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            range: range.into_iter().map(Into::into).collect(),
            domain: IndexSet::new(),
        }
    }

    pub fn category_palette() -> Self {
        Self::new(CATEGORY_PALETTE)
    }

    pub fn with_domain<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            self.domain.insert(key.into());
        }
        self
    }

    /// Color for `key`, registering it if unseen.
    pub fn get(&mut self, key: &str) -> &str {
        let idx = match self.domain.get_index_of(key) {
            Some(idx) => idx,
            None => self.domain.insert_full(key.to_string()).0,
        };
        self.at(idx)
    }

    /// Color for an already registered `key`.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.domain.get_index_of(key).map(|idx| self.at(idx))
    }

    pub fn domain(&self) -> impl Iterator<Item = &str> {
        self.domain.iter().map(String::as_str)
    }

    fn at(&self, idx: usize) -> &str {
        if self.range.is_empty() {
            return "";
        }
        &self.range[idx % self.range.len()]
    }
}

/// Continuous linear scale, unclamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Opacity by leaf value: `[min, max] -> [0.75, 1]`. Without values every tile is opaque.
    pub fn opacity_for_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut extent: Option<(f64, f64)> = None;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            extent = Some(match extent {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
        match extent {
            Some(domain) => Self::new(domain, OPACITY_RANGE),
            None => Self::new((0.0, 1.0), (1.0, 1.0)),
        }
    }

    pub fn scale(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let span = d1 - d0;
        // A collapsed domain maps everything to the middle of the range.
        let t = if span != 0.0 && span.is_finite() {
            (x - d0) / span
        } else {
            0.5
        };
        let (r0, r1) = self.range;
        r0 * (1.0 - t) + r1 * t
    }
}
