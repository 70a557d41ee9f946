//! Magnetotelluric station collection aggregator
//!
//! Aggregates the transfer function summaries of a set of MT stations,
//! derives the common frequency/period grid and the collection bounding box,
//! selects periods by station coverage and exports the phase tensor & tipper
//! summary tables.
//!
//! ```no_run
//! use edi_collection::{StationCollection, StationLoader, TableBuilder};
//!
//! # fn main() -> anyhow::Result<()> {
//! let records = StationLoader::default().data_path("data").load()?;
//! let collection = StationCollection::with_default_tolerance(records)?;
//! collection.summary();
//! println!("{:#?}", collection.periods_by_coverage(50.0));
//! TableBuilder::new(&collection).output_dir("tables").write()?;
//! # Ok(())
//! # }
//! ```

pub mod bounds;
pub mod collection;
mod error;
#[cfg(feature = "plot")]
pub mod plot;
pub mod station;
pub mod table;

pub use bounds::{BoundingBox, MapProjection};
pub use collection::{approx_in, CollectionError, StationCollection, APPROX_TOL};
pub use error::Error;
pub use station::{
    CsvPointSink, FrequencySample, PointLayerSink, Position, StationError, StationLoader,
    StationPoint, StationRecord,
};
pub use table::{FrequencyTable, MatchPolicy, PhaseTensorRow, TableBuilder, TableError};
