use anyhow::{bail, Context, Result};
use clap::Parser;
use file_format_converter::{
    app::AppState,
    cli::{Action, CliArgs},
    interactive::Session,
    Config, Outcome,
};
use std::io::{self, Write};
use tracing::{debug, info};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    args.setup_logging()?;

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => {
            debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let action = args.action(io::stdin().lock())?;
    match action {
        Action::InitConfig { path, force } => {
            if path.exists() && !force {
                bail!(
                    "{} already exists; pass --force to overwrite it",
                    path.display()
                );
            }
            config.save_to_file(&path)?;
            println!("Configuration written to {}", path.display());
        }
        Action::Menu => {
            let app = AppState::new(config);
            let stdin = io::stdin();
            let stdout = io::stdout();
            Session::new(&app, stdin.lock(), stdout.lock())
                .run()
                .context("Interactive session failed")?;
        }
        Action::Run(command) => {
            let app = AppState::new(config);
            let outcome = app.dispatch(command);
            report(&outcome, args.json)?;
            if !outcome.success {
                info!("Exiting with failure status");
                std::process::exit(outcome.exit_code());
            }
        }
    }

    Ok(())
}

/// Print an outcome on stdout (success) or stderr (failure)
fn report(outcome: &Outcome, json: bool) -> Result<()> {
    let rendered = if json {
        format!("{}\n", serde_json::to_string(outcome)?)
    } else if outcome.message.ends_with('\n') {
        outcome.message.clone()
    } else {
        format!("{}\n", outcome.message)
    };

    if outcome.success {
        io::stdout().lock().write_all(rendered.as_bytes())?;
    } else {
        io::stderr().lock().write_all(rendered.as_bytes())?;
    }
    Ok(())
}
