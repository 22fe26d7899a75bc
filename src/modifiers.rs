//! Declarative modifier tables
//!
//! Risk dimensions are expressed as a baseline plus labelled deltas. Numeric
//! inputs are looked up in band tables (`[min, max)` ranges, first match wins);
//! categorical inputs and compound effects add a delta directly. The final score
//! is the sum of all deltas clamped to the dimension's range.

/// Half-open numeric band `[min, max)` carrying a delta
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
    pub delta: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64, delta: f64) -> Self {
        Self { min, max, delta }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}

/// Ordered, labelled list of bands
#[derive(Debug, Clone, Copy)]
pub struct BandTable {
    pub label: &'static str,
    /// Label for bands with a negative delta
    pub relief_label: &'static str,
    pub bands: &'static [Band],
}

impl BandTable {
    pub const fn new(label: &'static str, bands: &'static [Band]) -> Self {
        Self {
            label,
            relief_label: label,
            bands,
        }
    }

    pub const fn with_relief(
        label: &'static str,
        relief_label: &'static str,
        bands: &'static [Band],
    ) -> Self {
        Self {
            label,
            relief_label,
            bands,
        }
    }

    /// Delta of the first band containing `value`, or 0 when none matches
    pub fn delta(&self, value: f64) -> f64 {
        self.bands
            .iter()
            .find(|band| band.contains(value))
            .map(|band| band.delta)
            .unwrap_or(0.0)
    }
}

/// A single labelled contribution to a score
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    pub label: &'static str,
    pub delta: f64,
}

/// Sum `baseline` and `deltas`, then clamp to `[floor, ceiling]`
pub fn sum_and_clamp<I>(baseline: f64, deltas: I, floor: f64, ceiling: f64) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let total: f64 = baseline + deltas.into_iter().sum::<f64>();
    total.clamp(floor, ceiling)
}

/// Collects labelled modifiers on top of a baseline
#[derive(Debug, Clone)]
pub struct ScoreCard {
    baseline: f64,
    modifiers: Vec<Modifier>,
}

impl ScoreCard {
    pub fn new(baseline: f64) -> Self {
        Self {
            baseline,
            modifiers: Vec::new(),
        }
    }

    /// Look `value` up in `table` and record the matching delta
    pub fn band(&mut self, table: &BandTable, value: f64) -> &mut Self {
        let delta = table.delta(value);
        let label = if delta < 0.0 { table.relief_label } else { table.label };
        self.add(label, delta)
    }

    /// Record `delta` under `label`; zero deltas are dropped
    pub fn add(&mut self, label: &'static str, delta: f64) -> &mut Self {
        if delta != 0.0 {
            self.modifiers.push(Modifier { label, delta });
        }
        self
    }

    /// Record `delta` only when `condition` holds
    pub fn when(&mut self, condition: bool, label: &'static str, delta: f64) -> &mut Self {
        if condition {
            self.add(label, delta);
        }
        self
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Unclamped total
    pub fn raw_total(&self) -> f64 {
        self.baseline + self.modifiers.iter().map(|m| m.delta).sum::<f64>()
    }

    pub fn clamped(&self, floor: f64, ceiling: f64) -> f64 {
        sum_and_clamp(
            self.baseline,
            self.modifiers.iter().map(|m| m.delta),
            floor,
            ceiling,
        )
    }
}
