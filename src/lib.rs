// src/lib.rs

pub mod config;
pub mod llm;
pub mod session;
pub mod story;
pub mod ui;
