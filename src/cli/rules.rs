//! Rules command - list the registry

use crate::models::Category;
use crate::rules::default_rules;
use anyhow::Result;
use console::style;

pub(super) fn run() -> Result<()> {
    let rules = default_rules();
    println!("{} rules\n", rules.len());

    for category in Category::ALL {
        let in_category: Vec<_> = rules.iter().filter(|r| r.category() == category).collect();
        if in_category.is_empty() {
            continue;
        }
        println!(
            "{}",
            style(category.to_string().to_uppercase()).bold()
        );
        for rule in in_category {
            let kinds: Vec<String> = rule.applies_to().iter().map(|k| k.to_string()).collect();
            println!(
                "  {}  {} [{}]",
                style(rule.id()).cyan(),
                rule.name(),
                rule.severity()
            );
            println!("      applies to: {}", kinds.join(", "));
            println!("      {}", rule.help());
            if let Some(bias) = rule.bias() {
                println!("      {}", style(format!("bias: {bias}")).dim());
            }
        }
        println!();
    }
    Ok(())
}
