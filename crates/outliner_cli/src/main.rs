//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `outliner_core` linkage and print its version.
//! - With `OUTLINER_SESSION_ID` set, open the session and print the
//!   account summary and the indented outline.

use outliner_core::{init_logging, Client, ClientConfig, Outline, Transport, ROOT_ID};
use std::process::ExitCode;

const ENV_SESSION_ID: &str = "OUTLINER_SESSION_ID";

fn main() -> ExitCode {
    println!("outliner_core version={}", outliner_core::core_version());

    let Ok(session_id) = std::env::var(ENV_SESSION_ID) else {
        return ExitCode::SUCCESS;
    };

    match run(&session_id) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(session_id: &str) -> Result<(), String> {
    let config = ClientConfig::from_env().map_err(|err| err.to_string())?;
    init_logging(&config.logging)?;

    let client = Client::new(config).map_err(|err| err.to_string())?;
    let session = client
        .connect(session_id)
        .map_err(|err| err.to_string())?;
    log::info!("event=cli_connect module=cli status=ok");

    let account = session.account();
    println!(
        "account email={} items_created={}/{}",
        account.email(),
        account.items_created_this_month(),
        account.monthly_item_quota()
    );
    print_outline(session.outline());
    Ok(())
}

fn print_outline<T: Transport>(outline: &Outline<T>) {
    let Ok(items) = outline.subtree(ROOT_ID) else {
        return;
    };
    for item in items.into_iter().skip(1) {
        let indent = "  ".repeat(item.level().saturating_sub(1) as usize);
        let mark = if item.is_completed() { "x" } else { " " };
        println!("{indent}[{mark}] {}", item.name());
    }
}
