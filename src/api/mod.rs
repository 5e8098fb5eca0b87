pub mod lib;
pub mod models;
pub mod report;
pub mod routes;
