use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::record::{MessageRecord, UnreadableRecord};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Channel {
    pub id: Uuid,
    pub username: String,
    pub title: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub telegram_id: i64,
    pub message: String,
    pub date: DateTime<Utc>,
    pub media_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct PushSummary {
    pub pushed: usize,
    pub skipped: usize,
    pub channels: usize,
    pub skipped_ids: Vec<String>,
}

impl PushSummary {
    /// Count rows that never reached the database because the csv row could
    /// not be read back.
    pub fn add_unreadable(&mut self, rows: &[UnreadableRecord]) {
        self.skipped += rows.len();
        self.skipped_ids.extend(rows.iter().map(UnreadableRecord::label));
    }
}

/// Parse the scraper's timestamp (`2024-05-30 09:12:44+00:00`), RFC 3339, or a
/// bare `YYYY-MM-DD HH:MM:SS` taken as UTC.
pub fn parse_message_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(d) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(d.with_timezone(&Utc));
    }
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|n| n.and_utc())
}

pub async fn upsert_channel<'e, E>(exec: E, username: &str, title: &str) -> Result<Channel>
where
    E: PgExecutor<'e>,
{
    let ch = sqlx::query_as::<_, Channel>(
        r#"insert into channel(id, username, title)
           values($1,$2,$3)
           on conflict(username)
           do update set title = excluded.title
           returning id, username, title"#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(title)
    .fetch_one(exec)
    .await?;
    Ok(ch)
}

/// Insert a cleaned message, or refresh it if this channel already has the
/// same telegram id. The stored row keeps its original key.
pub async fn upsert_message<'e, E>(
    exec: E,
    channel_id: Uuid,
    rec: &MessageRecord,
    date: DateTime<Utc>,
) -> Result<Message>
where
    E: PgExecutor<'e>,
{
    let m = sqlx::query_as::<_, Message>(
        r#"insert into message(id, channel_id, telegram_id, message, date, media_path)
           values($1,$2,$3,$4,$5,$6)
           on conflict(channel_id, telegram_id)
           do update set message = excluded.message,
                         date = excluded.date,
                         media_path = excluded.media_path
           returning id, channel_id, telegram_id, message, date, media_path"#,
    )
    .bind(Uuid::new_v4())
    .bind(channel_id)
    .bind(rec.id)
    .bind(&rec.message)
    .bind(date)
    .bind(rec.media_path.as_deref())
    .fetch_one(exec)
    .await?;
    Ok(m)
}

pub async fn messages_for_channel(pool: &PgPool, username: &str) -> Result<Vec<Message>> {
    let rows = sqlx::query_as::<_, Message>(
        r#"select m.id, m.channel_id, m.telegram_id, m.message, m.date, m.media_path
           from message m
           join channel c on c.id = m.channel_id
           where c.username = $1
           order by m.telegram_id asc"#,
    )
    .bind(username)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Push cleaned records in one transaction. Rows with an unreadable date are
/// logged and skipped; database errors roll the whole push back.
pub async fn push_records(pool: &PgPool, records: &[MessageRecord]) -> Result<PushSummary> {
    let mut tx = pool.begin().await.context("begin push")?;
    let mut channels: HashMap<String, Uuid> = HashMap::new();
    let mut summary = PushSummary::default();

    for rec in records {
        let Some(date) = parse_message_date(&rec.date) else {
            warn!(id = rec.id, channel = %rec.channel_username, date = %rec.date, "skipping row with bad date");
            summary.skipped += 1;
            summary.skipped_ids.push(rec.id.to_string());
            continue;
        };
        let channel_id = match channels.get(&rec.channel_username) {
            Some(id) => *id,
            None => {
                let ch = upsert_channel(&mut *tx, &rec.channel_username, &rec.channel_title)
                    .await
                    .with_context(|| format!("upsert channel {}", rec.channel_username))?;
                channels.insert(ch.username.clone(), ch.id);
                ch.id
            }
        };
        upsert_message(&mut *tx, channel_id, rec, date)
            .await
            .with_context(|| format!("upsert message {} of {}", rec.id, rec.channel_username))?;
        summary.pushed += 1;
    }

    tx.commit().await.context("commit push")?;
    summary.channels = channels.len();
    info!(pushed = summary.pushed, skipped = summary.skipped, channels = summary.channels, "push finished");
    Ok(summary)
}
