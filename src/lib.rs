pub mod app;
pub mod clients;
pub mod config;
pub mod customer;
pub mod metrics;
pub mod notification;
pub mod storage;
pub mod utils;
