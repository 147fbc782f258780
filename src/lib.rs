//! Life Insurance Coverage Advisor Library
//!
//! This library provides the core functionality for the coverage advisor API:
//! a Gemini-backed advisory pipeline, the JSON sanitizer and result normalizer
//! applied to model output, the local coverage formula, and HTTP handlers.
//!
//! # Modules
//!
//! - `api`: API-layer namespace.
//! - `core`: Core advisory logic namespace.
//! - `integrations`: External service integrations.
//! - `advisor`: Profile → prompt → model → result pipeline.
//! - `config`: Configuration management.
//! - `coverage`: Local annuity-based coverage formula.
//! - `errors`: Error handling types.
//! - `gemini_client`: Language-model trait and Gemini REST client.
//! - `handlers`: HTTP request handlers and router.
//! - `models`: Request and response models.
//! - `normalizer`: Default-filling for model output.
//! - `prompt`: Advisor prompt template.
//! - `report`: Step-by-step display model for the interactive variant.
//! - `sanitizer`: JSON extraction from free-form model text.

pub mod api;
pub mod core;
pub mod integrations;

pub mod advisor;
pub mod config;
pub mod coverage;
pub mod errors;
pub mod gemini_client;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod prompt;
pub mod report;
pub mod sanitizer;
