use std::fmt;

/// Cartographic reprojection collaborator
///
/// Maps a (longitude, latitude) pair into the coordinates of a target
/// projection; implementations live outside of this crate
pub trait MapProjection {
    fn project(&self, lon: f64, lat: f64) -> (f64, f64);
}
impl<F> MapProjection for F
where
    F: Fn(f64, f64) -> (f64, f64),
{
    fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        self(lon, lat)
    }
}

/// Station collection bounding box
///
/// For any non-empty station set, `min_lon <= max_lon` and
/// `min_lat <= max_lat`; a single station collapses the box to a point
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}
impl BoundingBox {
    /// Returns the box spanning all the (lon,lat) pairs of the iterator
    pub fn from_lonlat(lonlat: impl Iterator<Item = (f64, f64)>) -> Self {
        lonlat.fold(
            Self {
                min_lon: f64::INFINITY,
                max_lon: f64::NEG_INFINITY,
                min_lat: f64::INFINITY,
                max_lat: f64::NEG_INFINITY,
            },
            |bbox, (lon, lat)| Self {
                min_lon: bbox.min_lon.min(lon),
                max_lon: bbox.max_lon.max(lon),
                min_lat: bbox.min_lat.min(lat),
                max_lat: bbox.max_lat.max(lat),
            },
        )
    }
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}
impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lon: [{:11.6},{:11.6}], lat: [{:11.6},{:11.6}]",
            self.min_lon, self.max_lon, self.min_lat, self.max_lat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn single_point_collapses() {
        let bbox = BoundingBox::from_lonlat([(136.77, -20.59)].into_iter());
        assert_eq!(bbox.min_lon, bbox.max_lon);
        assert_eq!(bbox.min_lat, bbox.max_lat);
        assert_eq!(bbox.width(), 0.0);
        assert_eq!(bbox.height(), 0.0);
    }

    #[test]
    fn min_below_max() {
        let mut rng = rand::thread_rng();
        let lonlat: Vec<(f64, f64)> = (0..100)
            .map(|_| (rng.gen_range(-180.0..180.0), rng.gen_range(-90.0..90.0)))
            .collect();
        let bbox = BoundingBox::from_lonlat(lonlat.iter().copied());
        assert!(bbox.min_lon <= bbox.max_lon);
        assert!(bbox.min_lat <= bbox.max_lat);
        assert!(lonlat
            .iter()
            .all(|&(lon, lat)| lon >= bbox.min_lon && lon <= bbox.max_lon
                && lat >= bbox.min_lat
                && lat <= bbox.max_lat));
    }

    #[test]
    fn closure_projection() {
        let projection = |lon: f64, lat: f64| (lon * 2.0, lat * 2.0);
        assert_eq!(MapProjection::project(&projection, 10.0, -5.0), (20.0, -10.0));
    }
}
