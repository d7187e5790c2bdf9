use anyhow::{Context, Result};
use console::style;
use cookin_core::config::{self, Config};
use dialoguer::{Password, Select};

const BANNER: &str = r"
    -------------------------------------
       Cookin' Bot · recipes & groceries
    -------------------------------------
";

const PROVIDERS: &[(&str, &str)] = &[("gemini", "Google Gemini"), ("openai", "OpenAI")];

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn setup_provider() -> Result<&'static str> {
    let labels: Vec<_> = PROVIDERS.iter().map(|(_, label)| *label).collect();

    let selection = Select::new()
        .with_prompt("Select your model provider")
        .items(&labels)
        .default(0)
        .interact()
        .context("Failed to select provider")?;

    Ok(PROVIDERS[selection].0)
}

fn setup_api_key(provider: &str) -> Result<String> {
    let api_key: String = Password::new()
        .with_prompt(format!("Enter your {} API key", provider))
        .interact()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        return Err(anyhow::anyhow!("API key cannot be empty"));
    }

    Ok(api_key.trim().to_string())
}

const GEMINI_MODELS: &[&str] = &[config::DEFAULT_MODEL, "gemini-2.5-flash", "gemini-2.0-flash"];
const OPENAI_MODELS: &[&str] = &["gpt-4o-mini", "gpt-4o"];

fn models_for(provider: &str) -> &'static [&'static str] {
    match provider {
        "openai" => OPENAI_MODELS,
        _ => GEMINI_MODELS,
    }
}

fn setup_model(provider: &str) -> Result<String> {
    let models = models_for(provider);

    let selection = Select::new()
        .with_prompt("Select your model")
        .items(models)
        .default(0)
        .interact()
        .context("Failed to select model")?;

    Ok(models[selection].to_string())
}

pub fn run_onboard() -> Result<Config> {
    println!("{}", style(BANNER).cyan().bold());
    println!("  {}", style("Welcome to Cookin' Bot!").white().bold());
    println!();

    print_step(1, 3, "Provider");
    let provider = setup_provider()?;

    print_step(2, 3, "API Key Setup");
    let api_key = setup_api_key(provider)?;

    print_step(3, 3, "Model Selection");
    let model = setup_model(provider)?;

    let config = Config {
        provider: Some(provider.to_string()),
        api_key,
        model,
        ..Default::default()
    };

    println!();
    println!("  {} Configuration complete!", style("✓").green().bold());
    println!(
        "  {} Config saved to {}",
        style("→").green(),
        style(config::get_config_path().display()).cyan()
    );
    println!(
        "  {} You can now run: {}",
        style("→").green(),
        style("cookin chat").cyan().bold()
    );
    println!();

    Ok(config)
}
