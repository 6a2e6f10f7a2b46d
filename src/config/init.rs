use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, save_config, Config};
use crate::scoring::{MetricKey, Strategy, WeightSet};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Print text with a typewriter effect, one character at a time.
fn typewriter(text: &str) {
    use std::thread;
    use std::time::Duration;
    for c in text.chars() {
        print!("{}", c);
        std::io::stdout().flush().ok();
        thread::sleep(Duration::from_millis(12));
    }
    println!();
}

/// Parse a percentage typed at a prompt. Accepts a trailing '%'.
fn parse_metric_value(input: &str) -> Result<f64, String> {
    let trimmed = input.trim().trim_end_matches('%').trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err("must be a finite number".to_string()),
        Err(_) => Err(format!("'{}' is not a number", input.trim())),
    }
}

/// Ask for one value per metric, re-prompting until each parses.
fn prompt_metrics(hint: impl Fn(MetricKey) -> String) -> Result<IndexMap<String, f64>> {
    let mut values = IndexMap::new();
    for key in MetricKey::ALL {
        let value = loop {
            let input = prompt(&format!("  {} {}: ", key.display_name(), hint(key)))?;
            match parse_metric_value(&input) {
                Ok(v) => break v,
                Err(e) => println!("  Invalid: {}. Try again.", e),
            }
        };
        values.insert(key.as_str().to_string(), value);
    }
    Ok(values)
}

fn metric_example(key: MetricKey) -> &'static str {
    match key {
        MetricKey::PopulationGrowth => "annual %, e.g. 2.5",
        MetricKey::RentalYield => "gross %, e.g. 5.5",
        MetricKey::SupplyRatio => "new dwellings as % of stock, e.g. 6.0",
        MetricKey::VacancyRate => "%, e.g. 2.0",
        MetricKey::MortgageStress => "% of income on repayments, e.g. 28.0",
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    typewriter("Property Score Configuration Wizard");
    println!("===================================");
    println!();

    // 1. Weighting
    typewriter("Every area is scored 0-100 on five metrics, then combined with weights that sum to 1.");
    for strategy in Strategy::ALL {
        println!("  {:<13} {}", strategy.as_str(), strategy.description());
    }
    println!("  {:<13} Enter your own weight for each metric", "custom");

    let (strategy, weights) = loop {
        let choice = prompt_with_default("Weighting strategy", Strategy::default().as_str())?;
        if choice.eq_ignore_ascii_case("custom") {
            typewriter("Enter a weight for each metric. The five weights must add up to 1.0.");
            let custom = prompt_metrics(|_| "weight".to_string())?;
            match WeightSet::from_pairs(custom.iter().map(|(k, v)| (k, *v))) {
                Ok(_) => break (None, Some(custom)),
                Err(e) => println!("  Invalid: {}. Try again.", e),
            }
        } else {
            match choice.parse::<Strategy>() {
                Ok(s) => break (Some(s), None),
                Err(e) => println!("  Invalid: {}. Try again.", e),
            }
        }
    };

    // 2. Areas (at least one required)
    println!();
    typewriter("Now add the areas you want to compare. All figures are percentages.");
    let mut areas: IndexMap<String, IndexMap<String, f64>> = IndexMap::new();
    loop {
        let name = loop {
            let n = prompt("Area name: ")?;
            if n.is_empty() {
                println!("  Area name is required.");
            } else if areas.contains_key(&n) {
                println!("  Area '{}' already added.", n);
            } else {
                break n;
            }
        };
        let metrics = prompt_metrics(|key| format!("({})", metric_example(key)))?;
        areas.insert(name, metrics);

        if !prompt_yes_no("Add another area?", false)? {
            break;
        }
        println!();
    }

    // 3. Config path
    let default_config_path = match default_path {
        Some(p) => p,
        None => get_config_path()?,
    };
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 4. Write config
    let config = Config {
        strategy,
        weights,
        areas,
    };
    save_config(&config, &config_path)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `prop-score compare` to rank your areas.");

    Ok(())
}
