pub mod config;
pub mod statement;
pub mod client;
pub mod result;
pub mod convert;

pub use config::{Catalogs, WarehouseConfig};
pub use client::{QueryExecutor, WarehouseClient, WarehouseError};
pub use result::{QueryResult, ResultColumn, StatementMetadata};
pub use statement::{Statement, StatementParam};
pub use convert::rows_to_objects;
