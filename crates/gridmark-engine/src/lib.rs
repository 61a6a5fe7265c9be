//! gridmark_engine - Row model, formatting projection and multi-column sort.

pub mod engine;
