pub mod audit;
pub mod cache;
pub mod database;
pub mod engine;
pub mod idp;
pub mod logging;
pub mod objectstore;
pub mod repositories;
pub mod retry;
