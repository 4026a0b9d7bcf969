//! Natter - terminal chat client
//!
//! Accounts, chats, friends and QR friend exchange over a local document
//! store. Screens are driven by commands read from stdin.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use natter_core::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod navigator;
mod session;
mod shell;
mod state;
mod viewmodel;

use app::App;
use shell::{Command, Flow};

fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging; stdout is reserved for screens
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    tracing::info!("Starting Natter");

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(config)) {
        tracing::error!("Natter stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> natter_core::Result<()> {
    let ctx = Arc::new(state::AppContext::open(config)?);
    let mut app = App::new(ctx);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "{}", shell::render(&mut app))?;
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            match Command::parse(&line) {
                Ok(command) => match shell::execute(&mut app, command).await {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => app.set_notice(e.to_string()),
                },
                Err(e) => app.set_notice(e.to_string()),
            }
        }

        // Let detached writes land before redrawing
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        app.pump();

        write!(stdout, "{}", shell::render(&mut app))?;
        stdout.flush()?;
    }

    app.logout().await;
    tracing::info!("Goodbye");
    Ok(())
}
