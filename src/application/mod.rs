// Application layer - Series store, polling and collaborator traits
pub mod data_source;
pub mod polling_scheduler;
pub mod renderer;
pub mod series_store;
