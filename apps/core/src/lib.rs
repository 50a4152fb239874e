pub mod config;
pub mod emitter;
pub mod grid;
pub mod index_store;
pub mod library;
pub mod logging;
pub mod model;
pub mod ranking;
pub mod runtime;
pub mod scheduler;
pub mod search;
pub mod selection;
pub mod usage_file;
pub mod usage_store;
pub mod usage_writer;
