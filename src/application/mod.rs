// Application layer - The polling use case and the seams it depends on
pub mod formatter;
pub mod placefile_service;
pub mod scheduler;
pub mod state_source;
