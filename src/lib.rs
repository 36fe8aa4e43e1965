pub mod api;
pub mod config;
pub mod fetch;
pub mod gateway;
pub mod reading;
pub mod storage;
pub mod tracker;
pub mod utils;
