mod app;
mod config;
mod highlight;
mod hint;
mod ollama;
mod tui;

use crate::app::App;
use crate::hint::HintLevel;
use crate::ollama::stream_hint;
use crate::tui::run_ui;
use anyhow::Result;
use tokio_util::sync::CancellationToken;

fn init_logging() {
    let Ok(path) = crate::config::log_path() else {
        return;
    };
    let Ok(file) = std::fs::File::create(&path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hinter=info".into()),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    if let Err(e) = crate::config::load_config() {
        eprintln!("failed to initialize config: {}", e);
    }

    let mut app = App::new();
    let cancel_token = CancellationToken::new();

    {
        let ct = cancel_token.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            ct.cancel();
        });
    }

    run_ui(
        &mut app,
        cancel_token.clone(),
        move |level: HintLevel, problem: String, generation, ct, tx| async move {
            stream_hint(level, problem, generation, ct, tx).await;
        },
    )
    .await?;

    Ok(())
}
