//! `courier`: command-line client.
//!
//! ```text
//! courier register --email a@example.org --phone 555-0100 --password ...
//! courier send --code aaaa1111 --password ... --to bbbb2222 --message hello
//! courier watch --code bbbb2222 --password ... --key bbbb2222.pem
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use courier_client::{save_private_key, sync::DEFAULT_POLL_INTERVAL, ClientSync, RestClient};
use courier_common::crypto::private_key_from_pem;

#[derive(Debug, Parser)]
#[command(name = "courier", version, about = "End-to-end encrypted messaging client")]
struct Cli {
    /// Server base URL.
    #[arg(long, env = "COURIER_SERVER", default_value = "http://localhost:5000")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an identity and save its private key.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long, env = "COURIER_PASSWORD")]
        password: String,
        /// Where to write the private key. Defaults to `<code>.pem`.
        #[arg(long)]
        key_out: Option<PathBuf>,
    },
    /// Seal and send one message.
    Send {
        #[arg(long)]
        code: String,
        #[arg(long, env = "COURIER_PASSWORD")]
        password: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        message: String,
    },
    /// Print the inbox and keep polling for new messages.
    Watch {
        #[arg(long)]
        code: String,
        #[arg(long, env = "COURIER_PASSWORD")]
        password: String,
        /// PKCS#8 PEM private key. Not needed if the server retains keys.
        #[arg(long)]
        key: Option<PathBuf>,
        /// Poll interval in seconds.
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut rest = RestClient::new(Some(&cli.server))?;

    match cli.command {
        Command::Register {
            email,
            phone,
            password,
            key_out,
        } => {
            if let Some(path) = key_out.as_deref().filter(|p| p.exists()) {
                anyhow::bail!("{} already exists; refusing to overwrite a key", path.display());
            }
            let registered = rest.register(&email, &phone, &password).await?;
            let path = key_out.unwrap_or_else(|| PathBuf::from(format!("{}.pem", registered.code)));
            save_private_key(&path, &registered.private_key)
                .with_context(|| format!("writing private key to {}", path.display()))?;
            println!("Registered {}", registered.code);
            println!("Private key saved to {}", path.display());
        }

        Command::Send {
            code,
            password,
            to,
            message,
        } => {
            rest.login(&code, &password).await?;
            rest.send_message(&to, &message).await?;
            println!("Sent to {to}");
        }

        Command::Watch {
            code,
            password,
            key,
            interval,
        } => {
            let login = rest.login(&code, &password).await?;
            let pem = match (key, login.user.private_key) {
                (Some(path), _) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading private key from {}", path.display()))?,
                (None, Some(pem)) => pem,
                (None, None) => anyhow::bail!("server does not keep private keys; pass --key"),
            };
            let private_key = private_key_from_pem(&pem)?;
            let every = interval.map(|secs| Duration::from_secs(secs.max(1))).unwrap_or(DEFAULT_POLL_INTERVAL);

            let sync = Arc::new(ClientSync::new(rest, private_key));
            let handle = sync.clone().spawn(every);

            // The list only ever grows at the front, so new entries are the
            // first `len - printed`.
            let mut printed = 0;
            loop {
                let messages = sync.messages().await;
                for message in messages[..messages.len().saturating_sub(printed)].iter().rev() {
                    println!("[{}] {}: {}", message.timestamp, message.from, message.body);
                }
                printed = messages.len();

                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    _ = tokio::time::sleep(every) => {}
                }
            }

            handle.stop().await;
        }
    }

    Ok(())
}
