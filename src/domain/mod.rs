// Domain layer - Readings, series and classification rules
pub mod classification;
pub mod reading;
pub mod series;
