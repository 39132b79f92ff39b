//! Rules command - List the registered rules

use clap::Args;
use revet_core::Config;

/// Arguments for the rules command
#[derive(Args, Debug)]
pub struct RulesArgs {}

impl RulesArgs {
    /// Execute the rules command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let registry = config.build_registry()?;

        println!("Base rules (all files):");
        for rule in registry.base() {
            println!("  {:<28} {}", rule.id(), rule.severity());
        }

        for (ext, rules) in registry.extensions() {
            println!();
            println!("Rules for .{} files:", ext);
            for rule in rules {
                println!("  {:<28} {}", rule.id(), rule.severity());
            }
        }

        println!();
        println!("{} rules registered", registry.len());

        Ok(())
    }
}
