//! Core library for blackbook.
//!
//! - `entity` and `repository`: the persisted data objects and where they live
//! - `model`: business objects, including the event override chain
//! - `mapping`: the generic structural mapper between the two
//! - `navigation`: path based navigation between nested views
//! - `ui`: headless views and their controllers

pub mod config;
pub mod entity;
pub mod error;
pub mod mapping;
pub mod model;
pub mod navigation;
pub mod password;
pub mod repository;
pub mod service;
pub mod ui;

pub use error::{BlackbookError, BlackbookResult};
