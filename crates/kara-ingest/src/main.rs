use anyhow::{Context, Result};
use clap::Parser;
use kara_ingest::command::{Cli, Command};
use kara_ingest::config::Config;
use kara_ingest::{batch, data, preprocess_text, record};
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    load_env(cli.env.as_deref())?;
    init_tracing();

    let cfg = Config::from_env()?;

    match cli.command {
        Command::Text { text } => println!("{}", preprocess_text(&text.join(" "))),
        Command::Clean { input, output } => {
            let input = input.unwrap_or_else(|| cfg.raw_csv());
            let output = output.unwrap_or_else(|| cfg.preprocessed_csv());
            let summary = tokio::task::spawn_blocking(move || batch::clean_file(&input, &output))
                .await
                .context("clean task")??;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Push { data: path } => {
            let path = path.unwrap_or_else(|| cfg.preprocessed_csv());
            let read = record::read_records_from_path(&path)?;
            info!(
                path = %path.display(),
                records = read.records.len(),
                unreadable = read.unreadable.len(),
                "pushing messages"
            );

            let pool = PgPoolOptions::new()
                .max_connections(cfg.max_connections)
                .connect_with(cfg.connect_options()?)
                .await
                .context("connect postgres")?;
            data::MIGRATOR.run(&pool).await.context("run migrations")?;

            let mut summary = data::push_records(&pool, &read.records).await?;
            summary.add_unreadable(&read.unreadable);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn load_env(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            dotenvy::from_path(p).with_context(|| format!("load {}", p.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }
    Ok(())
}

fn init_tracing() {
    let env = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("info".parse().unwrap_or_default());
    tracing_subscriber::fmt()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .init();
}
