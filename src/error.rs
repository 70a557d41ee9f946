use crate::{collection::CollectionError, station::StationError, table::TableError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `station` module")]
    Station(#[from] StationError),
    #[error("Error in the `collection` module")]
    Collection(#[from] CollectionError),
    #[error("Error in the `table` module")]
    Table(#[from] TableError),
}
