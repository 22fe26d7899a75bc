//! Healthprint - Deterministic compute engine for personalized health analysis
//!
//! Healthprint turns a self-reported profile into a personalized analysis
//! through a fixed pipeline: validation → condition classification → compound
//! risk → personalized targets → 90-day projection → phase roadmap → narrative.
//!
//! ## Modules
//!
//! - **Analysis Pipeline**: `generate_analysis` and `AnalysisEngine`
//! - **Validation Rules**: Invariant checks over batches of analyses
//! - **Synthetic Profiles**: Deterministic profile sets with expected outputs

pub mod conditions;
pub mod config;
pub mod error;
pub mod modifiers;
pub mod narrative;
pub mod pipeline;
pub mod projection;
pub mod risk;
pub mod roadmap;
pub mod rules;
pub mod scoring;
pub mod synthetic;
pub mod targets;
pub mod types;
pub mod validation;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::EngineConfig;
pub use error::HealthprintError;
pub use pipeline::{generate_analysis, AnalysisEngine};
pub use types::{AnalysisResult, ProfileInput};

// Validation exports
pub use rules::{default_rules, validate_batch, BatchReport, RuleSeverity, ValidationRule};
pub use synthetic::{generate_all, SyntheticCategory, SyntheticProfile};

/// Engine version embedded in every analysis result
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "healthprint";
