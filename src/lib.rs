// Sensor dashboard - Series aggregation and polling engine
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
