pub mod app;
pub mod config;
pub mod draw;
pub mod engine;
pub mod geometry;
pub mod logging;
pub mod pattern;
pub mod pipeline;
pub mod points_file;
pub mod render;
pub mod terminal;
pub mod trace;
pub mod viewport;
