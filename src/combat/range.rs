//! Combat domain: distance bands with hysteresis.

use serde::{Deserialize, Serialize};

/// Named distance range used to pick eligible actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Band {
    Melee,
    Mid,
    Far,
    OutOfRange,
}

/// Maps distance to a [`Band`].
///
/// Edges are upper bounds: `melee_edge` closes the melee band, `mid_edge` the mid
/// band and `far_edge` the far band. Once inside a band, the distance has to move
/// past the band's edges by `buffer` before a different band is reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeClassifier {
    pub melee_edge: f32,
    pub mid_edge: f32,
    pub far_edge: f32,
    pub buffer: f32,
}

impl RangeClassifier {
    pub fn new(melee_edge: f32, mid_edge: f32, far_edge: f32, buffer: f32) -> Self {
        Self {
            melee_edge,
            mid_edge,
            far_edge,
            buffer: buffer.max(0.0),
        }
    }

    /// Band for `distance` without any hysteresis.
    pub fn raw_band(&self, distance: f32) -> Band {
        if distance.is_nan() {
            Band::OutOfRange
        } else if distance <= self.melee_edge {
            Band::Melee
        } else if distance <= self.mid_edge {
            Band::Mid
        } else if distance <= self.far_edge {
            Band::Far
        } else {
            Band::OutOfRange
        }
    }

    /// Lower and upper edges of a band, before the buffer is applied.
    fn bounds(&self, band: Band) -> (f32, f32) {
        match band {
            Band::Melee => (f32::NEG_INFINITY, self.melee_edge),
            Band::Mid => (self.melee_edge, self.mid_edge),
            Band::Far => (self.mid_edge, self.far_edge),
            Band::OutOfRange => (self.far_edge, f32::INFINITY),
        }
    }

    /// Classify `distance`, keeping `previous` while inside its buffered edges.
    pub fn classify(&self, distance: f32, previous: Option<Band>) -> Band {
        let raw = self.raw_band(distance);
        let Some(previous) = previous else {
            return raw;
        };
        if raw == previous || distance.is_nan() {
            return raw;
        }
        let (lower, upper) = self.bounds(previous);
        if distance >= lower - self.buffer && distance <= upper + self.buffer {
            previous
        } else {
            raw
        }
    }
}

/// Remembers the last band so classification sticks across ticks.
#[derive(Debug, Clone, Copy)]
pub struct BandTracker {
    classifier: RangeClassifier,
    current: Option<Band>,
}

impl BandTracker {
    pub fn new(classifier: RangeClassifier) -> Self {
        Self {
            classifier,
            current: None,
        }
    }

    /// Returns the band and whether it changed this update.
    pub fn update(&mut self, distance: f32) -> (Band, bool) {
        let band = self.classifier.classify(distance, self.current);
        let changed = self.current != Some(band);
        self.current = Some(band);
        (band, changed)
    }

    pub fn current(&self) -> Option<Band> {
        self.current
    }

    /// Forget the last band, e.g. when the target is lost.
    pub fn reset(&mut self) {
        self.current = None;
    }
}
