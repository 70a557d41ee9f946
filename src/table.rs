use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    collection::StationCollection,
    station::{FrequencySample, StationRecord},
};

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("Failed to create the table output directory")]
    Io(#[from] std::io::Error),
    #[error("Failed to write the phase tensor & tipper table")]
    Csv(#[from] csv::Error),
}
type Result<T> = std::result::Result<T, TableError>;

const CSV_HEADER: [&str; 14] = [
    "station",
    "freq",
    "lon",
    "lat",
    "phi_min",
    "phi_max",
    "azimuth",
    "skew",
    "n_skew",
    "elliptic",
    "tip_mag_re",
    "tip_mag_im",
    "tip_ang_re",
    "tip_ang_im",
];

/// Retained sample when more than one falls inside the matching window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// first match in sample order
    #[default]
    First,
    /// sample closest to the grid frequency
    Nearest,
}
impl MatchPolicy {
    /// Picks the retained index among the in-window candidates
    fn select(self, freq: f64, samples: &[FrequencySample], candidates: &[usize]) -> usize {
        match self {
            MatchPolicy::First => candidates[0],
            MatchPolicy::Nearest => candidates
                .iter()
                .copied()
                .min_by(|&a, &b| {
                    (samples[a].freq - freq)
                        .abs()
                        .total_cmp(&(samples[b].freq - freq).abs())
                })
                .unwrap_or(candidates[0]),
        }
    }
}

/// One row of the phase tensor & tipper summary tables
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PhaseTensorRow {
    pub station: String,
    /// grid frequency the station sample is matched to [Hz]
    pub freq: f64,
    pub lon: f64,
    pub lat: f64,
    pub phi_min: f64,
    pub phi_max: f64,
    pub azimuth: f64,
    pub skew: f64,
    /// normalized skew, twice the skew angle
    pub n_skew: f64,
    pub elliptic: f64,
    pub tip_mag_re: f64,
    pub tip_mag_im: f64,
    pub tip_ang_re: f64,
    pub tip_ang_im: f64,
}
impl PhaseTensorRow {
    fn new(record: &StationRecord, freq: f64, index: usize) -> Self {
        let sample = &record.samples[index];
        Self {
            station: record.station.clone(),
            freq,
            lon: record.position.lon,
            lat: record.position.lat,
            phi_min: sample.phi_min,
            phi_max: sample.phi_max,
            azimuth: sample.azimuth,
            skew: sample.skew,
            n_skew: 2.0 * sample.skew,
            elliptic: sample.ellipticity,
            tip_mag_re: sample.tip_mag_re,
            tip_mag_im: sample.tip_mag_im,
            tip_ang_re: sample.tip_ang_re,
            tip_ang_im: sample.tip_ang_im,
        }
    }
}

/// The rows matched to one grid frequency, in station input order
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    pub freq: f64,
    pub rows: Vec<PhaseTensorRow>,
}

/// Phase tensor & tipper tables writer
///
/// Writes the aggregate `phase_tensor_tipper.csv` plus one table per grid
/// frequency into the output directory
pub struct TableBuilder<'a> {
    collection: &'a StationCollection,
    output_dir: PathBuf,
    policy: MatchPolicy,
}
impl<'a> TableBuilder<'a> {
    pub fn new(collection: &'a StationCollection) -> Self {
        Self {
            collection,
            output_dir: PathBuf::from("."),
            policy: MatchPolicy::default(),
        }
    }
    pub fn output_dir<P: AsRef<Path>>(self, output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            ..self
        }
    }
    pub fn match_policy(self, policy: MatchPolicy) -> Self {
        Self { policy, ..self }
    }
    /// Builds the per-frequency tables without touching the filesystem
    ///
    /// For each grid frequency and each station, the retained sample is the
    /// one inside the relative `ptol` window; a station with no sample in the
    /// window is skipped for that frequency, a station with several gets the
    /// [`MatchPolicy`] pick; both cases are logged
    pub fn build(&self) -> Vec<FrequencyTable> {
        let ptol = self.collection.ptol();
        self.collection
            .all_frequencies()
            .iter()
            .map(|&freq| {
                let rows = self
                    .collection
                    .records()
                    .iter()
                    .filter_map(|record| {
                        let candidates: Vec<usize> = record
                            .samples
                            .iter()
                            .enumerate()
                            .filter(|(_, sample)| {
                                sample.freq > freq * (1.0 - ptol)
                                    && sample.freq < freq * (1.0 + ptol)
                            })
                            .map(|(index, _)| index)
                            .collect();
                        match candidates.as_slice() {
                            [] => {
                                log::warn!(
                                    "no sample matching {}Hz for station {}",
                                    freq,
                                    record.station
                                );
                                None
                            }
                            [index] => Some(PhaseTensorRow::new(record, freq, *index)),
                            _ => {
                                log::warn!(
                                    "{} samples matching {}Hz for station {}, keeping the {:?} one",
                                    candidates.len(),
                                    freq,
                                    record.station,
                                    self.policy
                                );
                                let index = self.policy.select(freq, &record.samples, &candidates);
                                Some(PhaseTensorRow::new(record, freq, index))
                            }
                        }
                    })
                    .collect();
                FrequencyTable { freq, rows }
            })
            .collect()
    }
    /// Builds the tables and writes the aggregate and per-frequency CSV files
    pub fn write(&self) -> Result<Vec<FrequencyTable>> {
        let tables = self.build();
        fs::create_dir_all(&self.output_dir)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(self.output_dir.join("phase_tensor_tipper.csv"))?;
        wtr.write_record(CSV_HEADER)?;
        for table in &tables {
            for row in &table.rows {
                wtr.serialize(row)?;
            }
        }
        wtr.flush()?;
        for table in &tables {
            let filename = format!("phase_tensor_tipper_{}Hz.csv", freq_label(table.freq));
            let mut wtr = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(self.output_dir.join(filename))?;
            wtr.write_record(CSV_HEADER)?;
            for row in &table.rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        Ok(tables)
    }
}

/// Frequency value rendered as a file name fragment
///
/// Path separators and whitespace are mapped to `_`
fn freq_label(freq: f64) -> String {
    format!("{}", freq)
        .chars()
        .map(|c| match c {
            '/' | '\\' | ' ' => '_',
            c => c,
        })
        .collect()
}
