use crate::data;
use crate::record::MessageRecord;
use rand::Rng;
use sqlx::postgres::PgPoolOptions;

fn rec(channel: &str, id: i64, message: &str, date: &str) -> MessageRecord {
    MessageRecord {
        channel_title: "Integration pharmacy".into(),
        channel_username: channel.into(),
        id,
        message: message.into(),
        date: date.into(),
        media_path: None,
    }
}

#[tokio::test]
async fn push_is_idempotent_per_channel_message() -> anyhow::Result<()> {
    // Skip if DATABASE_URL not set
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => return Ok(()),
    };

    let pool = PgPoolOptions::new().max_connections(5).connect(&database_url).await?;
    data::MIGRATOR.run(&pool).await?;

    let channel = format!("@it-{:08x}", rand::thread_rng().gen::<u32>());
    let batch = vec![
        rec(&channel, 1, "ሀገር ሰላም", "2024-05-30 09:12:44+00:00"),
        rec(&channel, 2, "Paracetamol 500mg", "2024-05-30 09:13:00+00:00"),
        rec(&channel, 3, "no date", "sometime"),
    ];

    let first = data::push_records(&pool, &batch).await?;
    assert_eq!(first.pushed, 2);
    assert_eq!(first.skipped, 1);
    assert_eq!(first.skipped_ids, vec!["3".to_string()]);
    assert_eq!(first.channels, 1);

    let stored = data::messages_for_channel(&pool, &channel).await?;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].message, "ሀገር ሰላም");

    // Re-push with an edited body: same rows, refreshed message
    let mut again = batch.clone();
    again[0].message = "ሀገር".into();
    data::push_records(&pool, &again).await?;
    let stored2 = data::messages_for_channel(&pool, &channel).await?;
    assert_eq!(stored2.len(), 2);
    assert_eq!(stored2[0].id, stored[0].id);
    assert_eq!(stored2[0].message, "ሀገር");
    Ok(())
}
