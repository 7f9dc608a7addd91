// src/lib.rs

pub mod cache;
pub mod crypto;
pub mod db;
pub mod providers;
pub mod repositories;
pub mod services;
pub mod test_utils;

pub use db::Database;
pub use mensajera_common::error::Error;
