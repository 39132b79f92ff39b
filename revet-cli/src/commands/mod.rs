//! CLI command implementations

pub mod check;
pub mod rules;

pub use check::CheckArgs;
pub use rules::RulesArgs;
