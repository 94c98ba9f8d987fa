pub mod bubble;
pub mod geometry;
pub mod logging;
pub mod service;
pub mod settings;
pub mod translate;
