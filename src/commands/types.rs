//! Types command implementation

use console::Style;

use crate::error::Result;
use crate::strategy::StrategyRegistry;

/// List every registered strategy type with its summary
pub fn run() -> Result<()> {
    let registry = StrategyRegistry::default();
    let types = registry.all();

    println!("Strategy types ({}):", types.len());
    println!();

    let width = types.iter().map(|t| t.id.len()).max().unwrap_or(0);
    for strategy_type in types {
        println!(
            "  {}  {}",
            Style::new()
                .bold()
                .yellow()
                .apply_to(format!("{:<width$}", strategy_type.id)),
            strategy_type.summary
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_runs() {
        assert!(run().is_ok());
    }
}
