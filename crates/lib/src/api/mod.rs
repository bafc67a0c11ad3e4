//! Live-state data model of the Firestore Admin API.

pub mod names;
pub mod types;

pub use names::{DatabaseName, FieldName, IndexName, parse_database_name, parse_field_name, parse_index_name};
pub use types::{
  ApiScope, ArrayConfig, Database, DatabaseEdition, Density, Field, FlatIndex, Index, IndexConfig, IndexField,
  IndexMode, IndexState, Location, Order, QueryScope, TtlConfig, TtlState, VectorConfig, WireEnum,
};
