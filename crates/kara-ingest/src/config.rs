use anyhow::{anyhow, Context, Result};
use sqlx::postgres::PgConnectOptions;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub db_host: Option<String>,
    pub db_port: Option<String>,
    pub db_name: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub data_dir: PathBuf,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL").filter(|v| !v.is_empty());
        let db_host = get("DB_HOST");
        let db_port = get("DB_PORT");
        let db_name = get("DB_NAME");
        let db_user = get("DB_USER");
        let db_password = get("DB_PASSWORD");
        let data_dir = get("KARA_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));
        let max_connections = get("KARA_DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        Ok(Self {
            database_url,
            db_host,
            db_port,
            db_name,
            db_user,
            db_password,
            data_dir,
            max_connections,
        })
    }

    pub fn raw_csv(&self) -> PathBuf {
        self.data_dir.join("telegram_data.csv")
    }

    pub fn preprocessed_csv(&self) -> PathBuf {
        self.data_dir.join("preprocessed.csv")
    }

    /// `DATABASE_URL` wins; otherwise the discrete `DB_*` settings are used.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(url) = &self.database_url {
            return PgConnectOptions::from_str(url).context("parse DATABASE_URL");
        }
        let host = self
            .db_host
            .as_deref()
            .ok_or_else(|| anyhow!("DATABASE_URL or DB_HOST is required"))?;
        let mut opts = PgConnectOptions::new().host(host);
        if let Some(port) = &self.db_port {
            let port: u16 = port
                .parse()
                .with_context(|| format!("DB_PORT `{port}` is not a port"))?;
            opts = opts.port(port);
        }
        if let Some(name) = &self.db_name {
            opts = opts.database(name);
        }
        if let Some(user) = &self.db_user {
            opts = opts.username(user);
        }
        if let Some(pw) = &self.db_password {
            opts = opts.password(pw);
        }
        Ok(opts)
    }
}
