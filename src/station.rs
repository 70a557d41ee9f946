use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum StationError {
    #[error("Failed to open the station summary file")]
    Io(#[from] std::io::Error),
    #[error("Failed to deserialize the station summary file")]
    Json(#[from] serde_json::Error),
    #[error("Invalid station summary file pattern")]
    Pattern(#[from] glob::PatternError),
    #[error("Failed to walk the station summary directory")]
    Glob(#[from] glob::GlobError),
    #[error("Invalid station identifier filter")]
    Filter(#[from] regex::Error),
    #[error("No station summary file found in {0:?}")]
    NoStationFiles(PathBuf),
}
type Result<T> = std::result::Result<T, StationError>;

/// Station geographic position
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Position {
    /// longitude [degree]
    pub lon: f64,
    /// latitude [degree]
    pub lat: f64,
    /// elevation [m]
    #[serde(default)]
    pub elev: f64,
    /// UTM zone label
    #[serde(default)]
    pub utm_zone: Option<String>,
}

/// A sampled frequency with its derived phase tensor and tipper scalars
///
/// The normalized skew exported in the summary tables is not stored, it is
/// derived as twice the skew angle at export time.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct FrequencySample {
    /// sampling frequency [Hz]
    pub freq: f64,
    /// minimum principal phase angle [degree]
    pub phi_min: f64,
    /// maximum principal phase angle [degree]
    pub phi_max: f64,
    /// phase tensor azimuth [degree]
    pub azimuth: f64,
    /// phase tensor skew angle [degree]
    pub skew: f64,
    /// phase tensor ellipticity
    pub ellipticity: f64,
    /// tipper magnitude, real part
    pub tip_mag_re: f64,
    /// tipper magnitude, imaginary part
    pub tip_mag_im: f64,
    /// tipper angle, real part [degree]
    pub tip_ang_re: f64,
    /// tipper angle, imaginary part [degree]
    pub tip_ang_im: f64,
}

/// One station transfer function summary, as extracted from an EDI recording
///
/// Records are read-only once loaded; any EDI converter that writes this
/// shape as JSON feeds the toolkit.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct StationRecord {
    /// station identifier
    pub station: String,
    #[serde(flatten)]
    pub position: Position,
    /// samples ordered as recorded
    pub samples: Vec<FrequencySample>,
}
impl StationRecord {
    /// Iterator over the sampled frequencies [Hz]
    pub fn frequencies(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|sample| sample.freq)
    }
}

/// Station summary files loader
///
/// Collects the `*.json` summaries of a whole directory or of an explicit
/// file list, optionally keeping only the stations whose identifier matches
/// a regular expression
#[derive(Default, Debug)]
pub struct StationLoader {
    data_path: Option<PathBuf>,
    files: Vec<PathBuf>,
    station_regex: Option<String>,
}
impl StationLoader {
    pub fn data_path<S: AsRef<Path>>(self, data_path: S) -> Self {
        Self {
            data_path: Some(data_path.as_ref().to_path_buf()),
            ..self
        }
    }
    pub fn files<I>(self, files: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        Self {
            files: files.into_iter().collect(),
            ..self
        }
    }
    pub fn station_filter<S: Into<String>>(self, station_regex: S) -> Self {
        Self {
            station_regex: Some(station_regex.into()),
            ..self
        }
    }
    pub fn load(self) -> Result<Vec<StationRecord>> {
        let files = match &self.data_path {
            Some(data_path) => {
                let pattern = data_path.join("*.json");
                let files = glob::glob(&pattern.to_string_lossy())?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                if files.is_empty() {
                    return Err(StationError::NoStationFiles(data_path.clone()));
                }
                files
            }
            None => self.files,
        };
        let station_regex = match &self.station_regex {
            Some(station_regex) => Some(Regex::new(station_regex)?),
            None => None,
        };
        let mut records = vec![];
        for file in &files {
            log::info!("Loading {:?}...", file);
            let station: StationRecord = serde_json::from_reader(BufReader::new(File::open(file)?))?;
            match &station_regex {
                Some(regex) if !regex.is_match(&station.station) => {
                    log::info!("station {} filtered out", station.station)
                }
                _ => records.push(station),
            }
        }
        log::info!("{} stations loaded", records.len());
        Ok(records)
    }
}

/// Station point layer attributes for vector-format writers
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StationPoint {
    #[serde(rename = "StationId")]
    pub station: String,
    #[serde(rename = "Lon")]
    pub lon: f64,
    #[serde(rename = "Lat")]
    pub lat: f64,
    #[serde(rename = "Elev")]
    pub elev: f64,
    #[serde(rename = "UtmZone")]
    pub utm_zone: Option<String>,
}

/// Geospatial point layer collaborator
///
/// Vector-format writers (shapefile, GeoPackage, ...) implement this trait
/// outside of this crate
pub trait PointLayerSink {
    type Error;
    fn write_points(&mut self, points: &[StationPoint]) -> std::result::Result<(), Self::Error>;
}

/// CSV stand-in for a vector-format point layer writer
pub struct CsvPointSink {
    path: PathBuf,
}
impl CsvPointSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}
impl PointLayerSink for CsvPointSink {
    type Error = csv::Error;

    fn write_points(&mut self, points: &[StationPoint]) -> std::result::Result<(), Self::Error> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;
        wtr.write_record(["StationId", "Lon", "Lat", "Elev", "UtmZone"])?;
        for point in points {
            wtr.serialize(point)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
