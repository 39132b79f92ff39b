//! Revet Core - Core library for the revet diff review checker
//!
//! This crate provides the review pipeline: collect a changeset from a
//! git baseline, select the applicable rules per file, evaluate them
//! against the changed lines, and render a severity-ordered report.

pub mod config;
pub mod diff;
pub mod error;
pub mod eval;
pub mod render;
pub mod report;
pub mod rules;
pub mod severity;

pub use config::Config;
pub use diff::{Baseline, ChangeSet, DiffCollector, GitRepo};
pub use error::{Error, Result};
pub use eval::Evaluator;
pub use render::{color_enabled, render, OutputFormat, RenderError};
pub use report::{Finding, Report, Summary};
pub use rules::{Rule, RuleCompileError, RuleRegistry, RuleSpec};
pub use severity::Severity;
