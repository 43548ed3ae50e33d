//! Grid Builder
//!
//! Evaluation lattice covering a lon/lat bounding box.
//!
//! Index convention used by every array in the crate: the first index `i`
//! walks latitude (rows, south → north), the second index `j` walks
//! longitude (columns, west → east). Cell `(i, j)` of any `Raster` refers to
//! the point `(lat[i][j], lon[i][j])` of the `Grid` it was built on.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::sources::Coord;

/// Bounding box and density of the evaluation lattice
///
/// Validated on construction and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridBounds")]
pub struct GridSpec {
    lon_min: f64,
    lon_max: f64,
    lat_min: f64,
    lat_max: f64,
    resolution: usize,
}

/// Unvalidated mirror of `GridSpec` used for deserialization
#[derive(Debug, Deserialize)]
struct GridBounds {
    lon_min: f64,
    lon_max: f64,
    lat_min: f64,
    lat_max: f64,
    resolution: usize,
}

impl TryFrom<GridBounds> for GridSpec {
    type Error = EngineError;

    fn try_from(b: GridBounds) -> EngineResult<Self> {
        GridSpec::new(b.lon_min, b.lon_max, b.lat_min, b.lat_max, b.resolution)
    }
}

/// Resolution of the reference maps
pub const DEFAULT_RESOLUTION: usize = 100;

/// The Sahel window at `DEFAULT_RESOLUTION`
impl Default for GridSpec {
    fn default() -> Self {
        GridSpec {
            lon_min: -18.0,
            lon_max: 40.0,
            lat_min: 10.0,
            lat_max: 20.0,
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl GridSpec {
    pub fn new(
        lon_min: f64,
        lon_max: f64,
        lat_min: f64,
        lat_max: f64,
        resolution: usize,
    ) -> EngineResult<Self> {
        let spec = GridSpec { lon_min, lon_max, lat_min, lat_max, resolution };
        spec.validate()?;
        Ok(spec)
    }

    /// The Sahel window of the reference dataset at the given resolution
    pub fn sahel(resolution: usize) -> EngineResult<Self> {
        GridSpec::default().with_resolution(resolution)
    }

    fn validate(&self) -> EngineResult<()> {
        let bounds = [self.lon_min, self.lon_max, self.lat_min, self.lat_max];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(EngineError::spec(format!("non-finite bounds {:?}", bounds)));
        }
        if self.lon_min >= self.lon_max {
            return Err(EngineError::spec(format!(
                "lon_min {} must be below lon_max {}",
                self.lon_min, self.lon_max
            )));
        }
        if self.lat_min >= self.lat_max {
            return Err(EngineError::spec(format!(
                "lat_min {} must be below lat_max {}",
                self.lat_min, self.lat_max
            )));
        }
        if self.resolution < 2 {
            return Err(EngineError::spec(format!(
                "resolution {} must be at least 2",
                self.resolution
            )));
        }
        Ok(())
    }

    pub fn lon_range(&self) -> (f64, f64) {
        (self.lon_min, self.lon_max)
    }

    pub fn lat_range(&self) -> (f64, f64) {
        (self.lat_min, self.lat_max)
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Same bounds at a different density
    pub fn with_resolution(&self, resolution: usize) -> EngineResult<Self> {
        GridSpec::new(self.lon_min, self.lon_max, self.lat_min, self.lat_max, resolution)
    }
}

/// Square row-major array aligned with a `Grid`
///
/// Serializes as plain nested rows (`[[..], [..]]`) so consumers need no
/// engine types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<T>>", try_from = "Vec<Vec<T>>")]
#[serde(bound(
    serialize = "T: Clone + Serialize",
    deserialize = "T: Clone + Deserialize<'de>"
))]
pub struct Raster<T> {
    resolution: usize,
    cells: Vec<T>,
}

impl<T: Clone> Raster<T> {
    pub fn filled(resolution: usize, value: T) -> Self {
        Raster { resolution, cells: vec![value; resolution * resolution] }
    }

    pub fn from_fn(resolution: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(resolution * resolution);
        for i in 0..resolution {
            for j in 0..resolution {
                cells.push(f(i, j));
            }
        }
        Raster { resolution, cells }
    }

    /// Wrap row-major cells; `cells.len()` must equal `resolution²`
    pub(crate) fn from_cells(resolution: usize, cells: Vec<T>) -> Self {
        debug_assert_eq!(cells.len(), resolution * resolution);
        Raster { resolution, cells }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i < self.resolution && j < self.resolution {
            self.cells.get(i * self.resolution + j)
        } else {
            None
        }
    }

    /// Flat row-major view
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.resolution.max(1))
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.rows().map(|row| row.to_vec()).collect()
    }

    pub fn map<U: Clone>(&self, f: impl FnMut(&T) -> U) -> Raster<U> {
        Raster { resolution: self.resolution, cells: self.cells.iter().map(f).collect() }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<T: Clone> From<Raster<T>> for Vec<Vec<T>> {
    fn from(raster: Raster<T>) -> Self {
        raster.to_rows()
    }
}

impl<T: Clone> TryFrom<Vec<Vec<T>>> for Raster<T> {
    type Error = String;

    fn try_from(rows: Vec<Vec<T>>) -> Result<Self, String> {
        let resolution = rows.len();
        if let Some(bad) = rows.iter().position(|row| row.len() != resolution) {
            return Err(format!(
                "raster must be square: row {} has {} cells, expected {}",
                bad,
                rows[bad].len(),
                resolution
            ));
        }
        Ok(Raster { resolution, cells: rows.into_iter().flatten().collect() })
    }
}

/// Coordinate lattice produced by `build_grid`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    spec: GridSpec,
    lons: Vec<f64>,
    lats: Vec<f64>,
    lon: Raster<f64>,
    lat: Raster<f64>,
}

/// Build the evaluation lattice for `spec`
///
/// Each axis holds `resolution` evenly spaced samples from min to max
/// inclusive; the last sample is exactly the max bound.
pub fn build_grid(spec: &GridSpec) -> EngineResult<Grid> {
    spec.validate()?;
    let n = spec.resolution;

    let lons = linspace(spec.lon_min, spec.lon_max, n);
    let lats = linspace(spec.lat_min, spec.lat_max, n);

    let lon = Raster::from_fn(n, |_, j| lons[j]);
    let lat = Raster::from_fn(n, |i, _| lats[i]);

    tracing::debug!(
        "Built {}x{} grid over lon [{}, {}], lat [{}, {}]",
        n, n, spec.lon_min, spec.lon_max, spec.lat_min, spec.lat_max
    );

    Ok(Grid { spec: *spec, lons, lats, lon, lat })
}

fn linspace(min: f64, max: f64, n: usize) -> Vec<f64> {
    let step = (max - min) / (n - 1) as f64;
    (0..n)
        .map(|k| if k == n - 1 { max } else { min + step * k as f64 })
        .collect()
}

impl Grid {
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn resolution(&self) -> usize {
        self.spec.resolution
    }

    /// Longitude axis (column coordinates)
    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// Latitude axis (row coordinates)
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn lon(&self) -> &Raster<f64> {
        &self.lon
    }

    pub fn lat(&self) -> &Raster<f64> {
        &self.lat
    }

    /// Coordinate of cell `(i, j)`
    pub fn coord(&self, i: usize, j: usize) -> Option<Coord> {
        Some(Coord::new(*self.lats.get(i)?, *self.lons.get(j)?))
    }

    /// Cell closest to `coord`, clamped to the lattice edge
    ///
    /// On a rectilinear lattice the axis-wise nearest sample is also the
    /// Euclidean nearest cell.
    pub fn nearest_cell(&self, coord: Coord) -> (usize, usize) {
        let (lat_min, lat_max) = self.spec.lat_range();
        let (lon_min, lon_max) = self.spec.lon_range();
        (
            nearest_index(coord.lat, lat_min, lat_max, self.resolution()),
            nearest_index(coord.lon, lon_min, lon_max, self.resolution()),
        )
    }
}

fn nearest_index(value: f64, min: f64, max: f64, n: usize) -> usize {
    let step = (max - min) / (n - 1) as f64;
    let k = ((value - min) / step).round();
    // NaN and negative positions saturate to 0
    (k.max(0.0) as usize).min(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_shape_and_extremes() {
        let spec = GridSpec::new(-18.0, 40.0, 10.0, 20.0, 7).unwrap();
        let grid = build_grid(&spec).unwrap();

        assert_eq!(grid.lon().len(), 49);
        assert_eq!(grid.lat().rows().count(), 7);
        assert_eq!(*grid.lon().get(0, 0).unwrap(), -18.0);
        assert_eq!(*grid.lon().get(6, 6).unwrap(), 40.0);
        assert_eq!(*grid.lat().get(0, 3).unwrap(), 10.0);
        assert_eq!(*grid.lat().get(6, 3).unwrap(), 20.0);

        for row in grid.lon().rows() {
            assert!(row.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_axis_spacing() {
        let spec = GridSpec::new(-18.0, 40.0, 10.0, 20.0, 5).unwrap();
        let grid = build_grid(&spec).unwrap();

        assert_relative_eq!(grid.lons()[1], -3.5, epsilon = 1e-12);
        assert_relative_eq!(grid.lons()[2], 11.0, epsilon = 1e-12);
        assert_relative_eq!(grid.lats()[3], 17.5, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_specs_rejected() {
        assert!(matches!(
            GridSpec::new(0.0, 1.0, 0.0, 1.0, 1),
            Err(EngineError::InvalidSpec { .. })
        ));
        assert!(GridSpec::new(5.0, 5.0, 0.0, 1.0, 10).is_err());
        assert!(GridSpec::new(0.0, 1.0, 3.0, -3.0, 10).is_err());
        assert!(GridSpec::new(f64::NAN, 1.0, 0.0, 1.0, 10).is_err());
    }

    #[test]
    fn test_spec_deserialization_validates() {
        let bad =
            r#"{"lon_min": 1.0, "lon_max": 0.0, "lat_min": 0.0, "lat_max": 1.0, "resolution": 4}"#;
        assert!(serde_json::from_str::<GridSpec>(bad).is_err());

        let good =
            r#"{"lon_min": 0.0, "lon_max": 1.0, "lat_min": 0.0, "lat_max": 1.0, "resolution": 4}"#;
        let spec: GridSpec = serde_json::from_str(good).unwrap();
        assert_eq!(spec.resolution(), 4);
    }

    #[test]
    fn test_nearest_cell_clamps() {
        let grid = build_grid(&GridSpec::new(-18.0, 40.0, 10.0, 20.0, 5).unwrap()).unwrap();

        assert_eq!(grid.nearest_cell(Coord::new(17.0, 9.0)), (3, 2));
        assert_eq!(grid.nearest_cell(Coord::new(-90.0, -180.0)), (0, 0));
        assert_eq!(grid.nearest_cell(Coord::new(90.0, 180.0)), (4, 4));
    }

    #[test]
    fn test_raster_rows_roundtrip() {
        let raster = Raster::from_fn(3, |i, j| (i * 3 + j) as f64);
        let json = serde_json::to_string(&raster).unwrap();
        assert_eq!(json, "[[0.0,1.0,2.0],[3.0,4.0,5.0],[6.0,7.0,8.0]]");

        let ragged: Result<Raster<f64>, _> = serde_json::from_str("[[1.0],[2.0,3.0]]");
        assert!(ragged.is_err());
    }
}
