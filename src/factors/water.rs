//! FACTOR: WATER ACCESS
//!
//! Rivers and lakes emit unit influence; each body's `size` is its decay
//! scale, so large lakes reach further than narrow rivers. A body with a
//! sampled `course` becomes a line source, densified to at most
//! `COURSE_SPACING` degrees between vertices.

use super::FactorProfile;
use crate::data::WaterBody;
use crate::sources::{Coord, Location, Source};

/// Maximum gap between emitting vertices along a river course (degrees)
pub const COURSE_SPACING: f64 = 1.0;

pub fn profile() -> FactorProfile {
    FactorProfile {
        weight: 0.2,
        higher_is_better: true,
        display_range: None,
        decay_scale: None,
    }
}

pub fn sources(bodies: &[WaterBody], profile: &FactorProfile) -> Vec<Source> {
    bodies
        .iter()
        .map(|body| {
            let decay = profile.decay_scale.unwrap_or(body.size);
            match &body.course {
                Some(course) if !course.is_empty() => {
                    let line = Location::Polyline(course.clone());
                    // An unusable course is kept as given and rejected on registration
                    let location = line.densified(COURSE_SPACING).unwrap_or_else(|| {
                        tracing::warn!("Course of {} left undensified", body.name);
                        line.clone()
                    });
                    Source {
                        name: body.name.clone(),
                        location,
                        magnitude: 1.0,
                        decay_scale: decay,
                    }
                }
                _ => Source::point(body.name.clone(), Coord::new(body.lat, body.lon), 1.0, decay),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::WaterKind;

    fn river(course: Option<Vec<Coord>>) -> WaterBody {
        WaterBody {
            name: "Niger River".to_string(),
            kind: WaterKind::River,
            lat: 14.0,
            lon: -6.0,
            size: 4.0,
            course,
        }
    }

    #[test]
    fn test_size_is_decay_scale() {
        let sources = sources(&[river(None)], &profile());
        assert_eq!(sources[0].decay_scale, 4.0);
        assert_eq!(sources[0].magnitude, 1.0);
        assert_eq!(sources[0].location.vertices().len(), 1);
    }

    #[test]
    fn test_runaway_course_is_not_densified() {
        let course = vec![Coord::new(0.0, 0.0), Coord::new(1e200, 0.0)];
        let sources = sources(&[river(Some(course.clone()))], &profile());

        assert_eq!(sources[0].location, Location::Polyline(course));
    }

    #[test]
    fn test_course_becomes_dense_line() {
        let course = vec![Coord::new(14.0, -8.0), Coord::new(14.0, -5.0)];
        let sources = sources(&[river(Some(course))], &profile());

        assert!(matches!(sources[0].location, Location::Polyline(_)));
        assert_eq!(sources[0].location.vertices().len(), 4);
    }
}
