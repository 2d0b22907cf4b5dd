//! Overdose Sentinel
//!
//! Backend for a county overdose-response dashboard: ingests
//! opioid-overdose incident records, computes rolling per-area
//! statistics and severity classifications, generates AI-assisted risk
//! forecasts with graceful degradation, and persists the latest
//! analysis snapshot per user.
//!
//! # Architecture
//!
//! - [`analytics`] — the pure incident analytics engine (daily
//!   bucketing, rolling baselines, deviation scores, severity tiers)
//! - [`ingest`] — CSV parsing and the validation contract in front of
//!   the engine
//! - [`state`] — the snapshot repository (in-memory and sled backends)
//! - [`forecast`] — the generative forecasting collaborator behind a
//!   mockable capability trait
//! - [`processing`] — the ingest-analyze-persist pipeline and the
//!   dedicated analysis worker task
//! - [`api`] — the axum HTTP surface

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod forecast;
pub mod ingest;
pub mod models;
pub mod processing;
pub mod state;
