// src/lib.rs

//! Holiday Feed Library
//!
//! Ingests the government office calendar CSV into per-year JSON documents
//! and classifies realtime typhoon closure alerts for the configured city.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
