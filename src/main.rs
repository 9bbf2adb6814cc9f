mod cli;
mod config;
mod conversation;
mod error;
mod gemini;
mod llm;
mod message;
mod openai;
mod prompt;
mod session;
#[cfg(test)]
mod testing;

use colored::Colorize;
use session::ChatSession;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if config.debug { "debug" } else { "error" }),
    )
    .init();

    cli::print_banner();

    // Nothing past this point runs without a usable credential and prompt.
    let started = prompt::resolve_system_prompt(&config)
        .and_then(|system_prompt| ChatSession::start(&config, system_prompt));
    let session = match started {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}", format!("❌ {}", e).red());
            std::process::exit(1);
        }
    };

    cli::run_cli(session)?;
    Ok(())
}
