//! List rules command implementation.

use arch_conform::rules::all_rules;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<10} {:<22} Description", "Code", "Name");
    println!("{}", "-".repeat(80));

    for rule in all_rules() {
        println!(
            "{:<10} {:<22} {}",
            rule.code(),
            rule.name(),
            rule.description()
        );
    }

    println!("\nAll rules run unless `enabled_rules` or --rules selects some.");
    println!("Rules without the options they need are skipped with an engine warning.");

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  arch-conform check --rules single-entry-point,layer-direction");
    println!("  arch-conform check --rules ARC001,ARC002");
}
