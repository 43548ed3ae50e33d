//! Source Registry
//!
//! Named point and line emitters of spatial influence, grouped by factor.
//!
//! A line source (river course, road) is modeled as its vertices: every
//! vertex emits independently with the source's full magnitude and decay
//! scale, so contributions add up along the line rather than averaging.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::error::{EngineError, EngineResult};
use crate::factors::Factor;

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Coord { lat, lon }
    }

    fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Latitude within ±90 and longitude within ±180 degrees
    pub fn is_geographic(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Emitter geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Point(Coord),
    Polyline(Vec<Coord>),
}

/// Most vertices a line source may carry
pub const MAX_LINE_VERTICES: usize = 100_000;

/// Vertex list of one source (point sources stay on the stack)
pub type Vertices = SmallVec<[Coord; 4]>;

impl Location {
    /// Emitting vertices of this location
    pub fn vertices(&self) -> Vertices {
        match self {
            Location::Point(c) => smallvec![*c],
            Location::Polyline(points) => points.iter().copied().collect(),
        }
    }

    /// Polyline with extra vertices inserted so that no two consecutive
    /// vertices are more than `max_spacing` degrees apart
    ///
    /// Original vertices are kept. Points are returned unchanged, as is any
    /// location when `max_spacing` is not a positive finite number. Returns
    /// `None` when a vertex is not finite or the result would exceed
    /// `MAX_LINE_VERTICES`.
    pub fn densified(&self, max_spacing: f64) -> Option<Location> {
        let Location::Polyline(points) = self else {
            return Some(self.clone());
        };
        if points.iter().any(|c| !c.is_finite()) {
            return None;
        }
        if !(max_spacing.is_finite() && max_spacing > 0.0) || points.len() < 2 {
            return Some(self.clone());
        }

        // Count before allocating: a far-flung vertex must not size the buffer
        let mut steps = Vec::with_capacity(points.len() - 1);
        let mut total = 1.0;
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let length = (b.lat - a.lat).hypot(b.lon - a.lon);
            let n = (length / max_spacing).ceil().max(1.0);
            total += n;
            if !total.is_finite() || total > MAX_LINE_VERTICES as f64 {
                return None;
            }
            steps.push(n as usize);
        }

        let mut dense = Vec::with_capacity(total as usize);
        dense.push(points[0]);
        for (pair, &n) in points.windows(2).zip(&steps) {
            let (a, b) = (pair[0], pair[1]);
            for k in 1..=n {
                let t = k as f64 / n as f64;
                dense.push(Coord::new(
                    a.lat + (b.lat - a.lat) * t,
                    a.lon + (b.lon - a.lon) * t,
                ));
            }
        }
        Some(Location::Polyline(dense))
    }
}

/// One emitter of influence for a single factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub location: Location,
    /// Contribution at distance zero (≥ 0)
    pub magnitude: f64,
    /// Distance in degrees at which influence falls to 1/e (> 0)
    pub decay_scale: f64,
}

impl Source {
    pub fn point(name: impl Into<String>, at: Coord, magnitude: f64, decay_scale: f64) -> Self {
        Source {
            name: name.into(),
            location: Location::Point(at),
            magnitude,
            decay_scale,
        }
    }

    pub fn line(
        name: impl Into<String>,
        vertices: Vec<Coord>,
        magnitude: f64,
        decay_scale: f64,
    ) -> Self {
        Source {
            name: name.into(),
            location: Location::Polyline(vertices),
            magnitude,
            decay_scale,
        }
    }

    /// Check the source invariants, naming `factor` in the error
    pub fn validate(&self, factor: Factor) -> EngineResult<()> {
        let reject = |reason: String| EngineError::InvalidSource {
            factor,
            name: self.name.clone(),
            reason,
        };

        if !self.magnitude.is_finite() || self.magnitude < 0.0 {
            return Err(reject(format!(
                "magnitude must be finite and >= 0, got {}",
                self.magnitude
            )));
        }
        if !self.decay_scale.is_finite() || self.decay_scale <= 0.0 {
            return Err(reject(format!(
                "decay_scale must be finite and > 0, got {}",
                self.decay_scale
            )));
        }
        let vertices: &[Coord] = match &self.location {
            Location::Point(c) => std::slice::from_ref(c),
            Location::Polyline(points) => points,
        };
        if vertices.is_empty() {
            return Err(reject("polyline has no vertices".to_string()));
        }
        if vertices.len() > MAX_LINE_VERTICES {
            return Err(reject(format!(
                "polyline has {} vertices, more than {}",
                vertices.len(),
                MAX_LINE_VERTICES
            )));
        }
        if let Some(c) = vertices.iter().find(|c| !c.is_finite()) {
            return Err(reject(format!("non-finite vertex {:?}", c)));
        }
        if let Some(c) = vertices.iter().find(|c| !c.is_geographic()) {
            return Err(reject(format!("vertex {:?} lies outside lat/lon bounds", c)));
        }
        Ok(())
    }
}

/// Sources per factor
///
/// Factors iterate in `Factor` order and sources in insertion order, so
/// every run over the same registry accumulates in the same sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRegistry {
    sources: BTreeMap<Factor, Vec<Source>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `source` to `factor`, rejecting it without touching the registry
    /// if it is invalid
    pub fn register(&mut self, factor: Factor, source: Source) -> EngineResult<()> {
        source.validate(factor)?;
        self.sources.entry(factor).or_default().push(source);
        Ok(())
    }

    /// Register every source in order, stopping at the first invalid one
    pub fn register_all(
        &mut self,
        factor: Factor,
        sources: impl IntoIterator<Item = Source>,
    ) -> EngineResult<()> {
        for source in sources {
            self.register(factor, source)?;
        }
        Ok(())
    }

    /// Sources of `factor` (empty when none were registered)
    pub fn sources(&self, factor: Factor) -> &[Source] {
        self.sources.get(&factor).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Factors with at least one source
    pub fn factors(&self) -> impl Iterator<Item = Factor> + '_ {
        self.sources.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.sources.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Free-function form of `SourceRegistry::register`
pub fn register_source(
    registry: &mut SourceRegistry,
    factor: Factor,
    source: Source,
) -> EngineResult<()> {
    registry.register(factor, source)
}
