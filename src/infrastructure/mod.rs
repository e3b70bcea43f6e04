// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod opensky_source;
pub mod placefile_writer;
pub mod shutdown;
