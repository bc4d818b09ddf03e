//! Client-side data synchronization core for an NBA schedule browser with
//! on-demand AI outcome predictions.
//!
//! Three independent state containers make up the core: a date-indexed
//! [`sync::ScheduleCache`], a per-contest [`sync::PredictionCache`] with
//! at-most-one-request-per-id semantics, and an independently refreshed
//! [`sync::UpcomingFeed`]. The prediction backend is an external HTTP
//! collaborator behind the [`api::PredictionApi`] trait; rendering is a
//! pure function of the state held here and lives elsewhere.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod sync;
pub mod timefmt;
