pub mod aggregate;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod index;
pub mod join;
pub mod output;
pub mod resolve;
pub mod source;
pub mod table;
pub mod tsv;
