//! `stayforge-api` — thin HTTP transport over the booking engine.

pub mod app;
