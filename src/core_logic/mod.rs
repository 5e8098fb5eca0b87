pub mod analysis;
pub mod models;
pub mod narrative;
pub mod ratios;
pub mod regression;
pub mod trends;
