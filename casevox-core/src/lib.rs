// src/lib.rs

pub mod db;
pub mod repositories;
pub mod services;
pub mod test_utils;

pub use db::Database;
pub use casevox_common::error::Error;
pub use casevox_common::models;
