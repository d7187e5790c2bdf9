use anyhow::Result;
use clap::{Parser, Subcommand};
use cookin_core::{Orchestrator, config};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

mod onboard;

#[derive(Parser)]
#[command(name = "cookin")]
#[command(about = "Cookin' Bot - find recipes and buy the ingredients", long_about = None)]
struct Cli {
    /// Log tool calls and provider requests to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Onboard,
    Chat {
        #[arg(short, long)]
        message: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or_else(|| {
        if !config::config_exists() {
            Commands::Onboard
        } else {
            Commands::Chat { message: None }
        }
    });

    match command {
        Commands::Onboard => {
            let onboard_config = onboard::run_onboard().map_err(|e| {
                eprintln!("❌ Onboarding failed: {}", e);
                anyhow::anyhow!("Onboarding failed: {}", e)
            })?;
            config::save_config(&onboard_config)?;
        }
        Commands::Chat { message } => {
            let config = config::Config::load_or_init()?;
            let bot = Orchestrator::from_config(&config).map_err(|e| {
                eprintln!("❌ Error: {}", e);
                eprintln!("Run 'cookin onboard' or set the API key in your environment.");
                anyhow::Error::from(e)
            })?;

            if let Some(msg) = message {
                println!("{}", bot.send(&msg).await);
            } else {
                run_repl(&bot).await?;
            }
        }
    }

    Ok(())
}

async fn run_repl(bot: &Orchestrator) -> Result<()> {
    println!("🌮 Cookin' Bot");
    println!("Ask for a recipe, /cart to see your cart (Ctrl+D to exit)\n");

    let mut editor = DefaultEditor::new()?;

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(input);

                if input == "/cart" {
                    let cart = bot.session().current();
                    if cart.is_empty() {
                        println!("Your cart is empty.\n");
                    } else {
                        println!("Cart: {}\n", cart.join(", "));
                    }
                    continue;
                }

                println!("\n{}\n", bot.send(input).await);
            }
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => {
                println!("\n👋 Goodbye!");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
