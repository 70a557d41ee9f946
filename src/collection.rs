use itertools::Itertools;

use crate::{
    bounds::{BoundingBox, MapProjection},
    station::{StationPoint, StationRecord},
};

#[derive(thiserror::Error, Debug)]
pub enum CollectionError {
    #[error("Cannot build a station collection from an empty record list")]
    EmptyInput,
}
type Result<T> = std::result::Result<T, CollectionError>;

/// Absolute tolerance of the exact-frequency presence checks [Hz]
pub const APPROX_TOL: f64 = 1e-5;

/// Returns true if any element of `seq` lies within `tol` of `value`
///
/// Linear scan, `seq` needs not be sorted
pub fn approx_in<I: IntoIterator<Item = f64>>(value: f64, seq: I, tol: f64) -> bool {
    seq.into_iter().any(|x| (value - x).abs() < tol)
}

/// A set of MT stations under analysis
///
/// Built once by the [`StationCollection::new`] factory; the common frequency
/// grid, the period grid and the bounding box are derived at construction and
/// never mutated afterwards.
///
/// Frequencies sampled by different stations are matched 2 ways:
///  - presence checks use the fixed [`APPROX_TOL`] absolute tolerance,
///  - table export uses the relative `ptol` window around each grid frequency.
#[derive(Debug)]
pub struct StationCollection {
    records: Vec<StationRecord>,
    ptol: f64,
    all_frequencies: Vec<f64>,
    all_periods: Vec<f64>,
    bounding_box: BoundingBox,
}
impl StationCollection {
    /// Default relative frequency matching window (5%)
    pub const DEFAULT_PTOL: f64 = 0.05;

    /// Builds the collection from the station records
    ///
    /// `ptol` is the relative frequency matching window (`0 < ptol`, upstream
    /// contract); fails if `records` is empty
    pub fn new(records: Vec<StationRecord>, ptol: f64) -> Result<Self> {
        if records.is_empty() {
            return Err(CollectionError::EmptyInput);
        }
        let all_frequencies: Vec<f64> = records
            .iter()
            .flat_map(|record| record.frequencies())
            .sorted_by(|a, b| a.total_cmp(b))
            .dedup()
            .collect();
        // ascending periods i.e. descending frequencies
        let all_periods: Vec<f64> = all_frequencies.iter().rev().map(|freq| freq.recip()).collect();
        let bounding_box = BoundingBox::from_lonlat(
            records
                .iter()
                .map(|record| (record.position.lon, record.position.lat)),
        );
        log::info!(
            "{} stations, {} unique frequencies",
            records.len(),
            all_frequencies.len()
        );
        Ok(Self {
            records,
            ptol,
            all_frequencies,
            all_periods,
            bounding_box,
        })
    }
    /// Builds the collection with the default 5% matching window
    pub fn with_default_tolerance(records: Vec<StationRecord>) -> Result<Self> {
        Self::new(records, Self::DEFAULT_PTOL)
    }
    /// Number of stations
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    /// The station records, in input order
    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }
    /// The relative frequency matching window
    pub fn ptol(&self) -> f64 {
        self.ptol
    }
    /// Sorted union of the frequencies sampled by all the stations [Hz]
    pub fn all_frequencies(&self) -> &[f64] {
        &self.all_frequencies
    }
    /// Reciprocals of [`all_frequencies`](Self::all_frequencies), ascending [s]
    pub fn all_periods(&self) -> &[f64] {
        &self.all_periods
    }
    /// Bounding box in the native (lon,lat) coordinates
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }
    /// Bounding box of the reprojected station positions
    pub fn projected_bounding_box(&self, projection: &dyn MapProjection) -> BoundingBox {
        BoundingBox::from_lonlat(
            self.records
                .iter()
                .map(|record| projection.project(record.position.lon, record.position.lat)),
        )
    }
    /// Periods present in at least `percentage`% of the stations
    ///
    /// A station counts for a period when one of its sampled frequencies lies
    /// within [`APPROX_TOL`] of the reciprocal period. The result is ordered
    /// by decreasing presence count; periods with equal counts keep the
    /// ascending [`all_periods`](Self::all_periods) order.
    pub fn periods_by_coverage(&self, percentage: f64) -> Vec<f64> {
        let n_stations = self.records.len() as f64;
        let mut selected: Vec<(f64, usize)> = self
            .all_periods
            .iter()
            .filter_map(|&period| {
                let freq = period.recip();
                let count = self
                    .records
                    .iter()
                    .filter(|record| approx_in(freq, record.frequencies(), APPROX_TOL))
                    .count();
                if 100. * count as f64 / n_stations >= percentage {
                    Some((period, count))
                } else {
                    log::info!("period {}s below the {}% coverage threshold", period, percentage);
                    None
                }
            })
            .collect();
        selected.sort_by(|a, b| b.1.cmp(&a.1));
        selected.into_iter().map(|(period, _)| period).collect()
    }
    /// Station id/position attributes for a point layer sink
    pub fn station_points(&self) -> Vec<StationPoint> {
        self.records
            .iter()
            .map(|record| StationPoint {
                station: record.station.clone(),
                lon: record.position.lon,
                lat: record.position.lat,
                elev: record.position.elev,
                utm_zone: record.position.utm_zone.clone(),
            })
            .collect()
    }
    /// Prints the collection properties
    pub fn summary(&self) {
        println!("SUMMARY:");
        println!(" - # of stations: {}", self.records.len());
        println!(" - # of unique frequencies: {}", self.all_frequencies.len());
        if let (Some(first), Some(last)) = (self.all_frequencies.first(), self.all_frequencies.last())
        {
            println!(" - frequency range: [{:.6e}-{:.6e}]Hz", first, last);
        }
        if let (Some(first), Some(last)) = (self.all_periods.first(), self.all_periods.last()) {
            println!(" - period range: [{:.6e}-{:.6e}]s", first, last);
        }
        println!(" - bounding box: {}", self.bounding_box);
        println!("    {:^10}  {:^12} {:^12} {:^8}", "STATION", "LON", "LAT", "#FREQ");
        self.records.iter().for_each(|record| {
            println!(
                "  - {:10}  {:>12.6} {:>12.6} {:>8}",
                record.station,
                record.position.lon,
                record.position.lat,
                record.samples.len()
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::{FrequencySample, Position};

    fn sample(freq: f64) -> FrequencySample {
        FrequencySample {
            freq,
            phi_min: 15.0,
            phi_max: 75.0,
            azimuth: 30.0,
            skew: 2.0,
            ellipticity: 0.1,
            tip_mag_re: 0.2,
            tip_mag_im: 0.02,
            tip_ang_re: 45.0,
            tip_ang_im: -45.0,
        }
    }
    fn station(id: &str, lon: f64, lat: f64, freqs: &[f64]) -> StationRecord {
        StationRecord {
            station: id.into(),
            position: Position {
                lon,
                lat,
                elev: 0.0,
                utm_zone: None,
            },
            samples: freqs.iter().map(|&freq| sample(freq)).collect(),
        }
    }
    fn three_stations() -> Vec<StationRecord> {
        vec![
            station("MT001", 136.77, -20.59, &[1.0, 2.0]),
            station("MT002", 136.85, -20.50, &[1.0, 2.0]),
            station("MT003", 136.93, -20.41, &[1.0, 3.0]),
        ]
    }

    #[test]
    fn empty_input() {
        assert!(matches!(
            StationCollection::with_default_tolerance(vec![]),
            Err(CollectionError::EmptyInput)
        ));
    }

    #[test]
    fn frequency_union() {
        let collection = StationCollection::with_default_tolerance(three_stations()).unwrap();
        assert_eq!(collection.all_frequencies(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn periods_are_reversed_reciprocals() {
        let collection = StationCollection::with_default_tolerance(three_stations()).unwrap();
        let freqs = collection.all_frequencies();
        let periods = collection.all_periods();
        assert_eq!(freqs.len(), periods.len());
        for (freq, period) in freqs.iter().zip(periods.iter().rev()) {
            assert_eq!(*period, 1.0 / freq);
        }
        assert!(periods.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn coverage_scenario() {
        // presence: 1Hz in 3/3 stations, 2Hz in 2/3, 3Hz in 1/3
        let collection = StationCollection::with_default_tolerance(three_stations()).unwrap();
        assert_eq!(collection.periods_by_coverage(50.0), vec![1.0, 0.5]);
        assert_eq!(collection.periods_by_coverage(100.0), vec![1.0]);
        let all = collection.periods_by_coverage(0.0);
        assert_eq!(all.len(), collection.all_periods().len());
        let mut sorted = all;
        sorted.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(sorted, collection.all_periods());
    }

    #[test]
    fn coverage_ties_keep_period_order() {
        let collection =
            StationCollection::with_default_tolerance(vec![station("MT001", 0.0, 0.0, &[1.0, 2.0])])
                .unwrap();
        // both periods count 1, the ascending period order is kept
        assert_eq!(collection.periods_by_coverage(0.0), vec![0.5, 1.0]);
    }

    #[test]
    fn approx_membership() {
        assert!(approx_in(1.0, [3.0, 1.000005], APPROX_TOL));
        assert!(!approx_in(1.0, [3.0, 1.00002], APPROX_TOL));
        assert!(!approx_in(1.0, [], APPROX_TOL));
    }

    #[test]
    fn fuzzy_presence_counts() {
        let records = vec![
            station("MT001", 0.0, 0.0, &[1.0]),
            station("MT002", 1.0, 1.0, &[1.000005]),
        ];
        let collection = StationCollection::with_default_tolerance(records).unwrap();
        // the two samples stay distinct on the grid but match the same presence check
        assert_eq!(collection.all_frequencies().len(), 2);
        assert_eq!(collection.periods_by_coverage(100.0).len(), 2);
    }

    #[test]
    fn native_bounding_box() {
        let collection = StationCollection::with_default_tolerance(three_stations()).unwrap();
        let bbox = collection.bounding_box();
        assert_eq!(bbox.min_lon, 136.77);
        assert_eq!(bbox.max_lon, 136.93);
        assert_eq!(bbox.min_lat, -20.59);
        assert_eq!(bbox.max_lat, -20.41);
    }

    #[test]
    fn projected_bounding_box() {
        let collection = StationCollection::with_default_tolerance(three_stations()).unwrap();
        let projection = |lon: f64, lat: f64| (lon - 100.0, lat + 20.0);
        let bbox = collection.projected_bounding_box(&projection);
        assert!((bbox.min_lon - 36.77).abs() < 1e-12);
        assert!((bbox.max_lat - (-0.41)).abs() < 1e-12);
    }
}
