// src/lib.rs

//! Single-site crawler library.

pub mod crawl;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
