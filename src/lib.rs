pub mod cache;
pub mod config;
pub mod domain;
pub mod ensembl;
pub mod error;
pub mod fetch;
pub mod schema;
pub mod server;
pub mod shape;
pub mod table;
pub mod validate;
