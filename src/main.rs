use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use siwe_sign_repro::config::{Args, Config};
use siwe_sign_repro::{SignOutcome, Session};

const HELP: &str = "commands: connect | sign | disconnect | clear | status | logs | help | quit";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    info!("🚀 Starting typed-data signing reproduction");

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    info!("🌐 Site: {} ({})", config.site.domain, config.site.uri);
    info!("🔗 Default chain: {}", config.fallback_chain_id());

    let session = Session::from_config(&config)?;

    if args.auto {
        return run_once(&session).await;
    }

    println!("{}", session.render_status().await);
    println!("{}", HELP);

    // ==================================================
    // COMMAND LOOP
    // ==================================================
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "connect" => session.handle_connect().await,
            "disconnect" => session.handle_disconnect().await,
            "clear" => session.handle_clear().await,
            "sign" => {
                // Signing may wait on the wallet indefinitely; keep reading
                let session = session.clone();
                tokio::spawn(async move {
                    session.handle_sign().await;
                });
            }
            "status" => {
                println!("{}", session.render_status().await);
                let actions: Vec<String> = session
                    .available_actions()
                    .await
                    .iter()
                    .map(|a| a.to_string())
                    .collect();
                println!("Actions: {}", actions.join(", "));
            }
            "logs" => println!("{}", session.log().render().await),
            "help" => println!("{}", HELP),
            "quit" | "exit" => break,
            other => warn!("Unknown command: {}", other),
        }
    }

    Ok(())
}

// ==================================================
// ONE-SHOT
// ==================================================
async fn run_once(session: &Session) -> Result<()> {
    session.handle_connect().await;

    if !session.state().await.is_connected {
        anyhow::bail!("wallet did not connect");
    }

    let outcome = session.handle_sign().await;
    println!("{}", session.log().render().await);

    match outcome {
        Some(SignOutcome::Signed(_)) => Ok(()),
        Some(SignOutcome::Empty(_)) => anyhow::bail!("signer resolved without a signature"),
        Some(SignOutcome::Rejected(message)) => anyhow::bail!("signing failed: {}", message),
        Some(SignOutcome::Busy) | None => anyhow::bail!("no signing attempt was made"),
    }
}
