//! Persisted FIX sequence-number checkpoints (C5 durability across restarts).

use super::Database;
use crate::ports::SessionSequenceRepository;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::Row;

#[async_trait]
impl SessionSequenceRepository for Database {
    async fn load(&self, session_key: &str) -> Result<Option<(u32, u32)>> {
        let row = sqlx::query("SELECT next_sender_seq, next_target_seq FROM session_sequences WHERE session_key = ?")
            .bind(session_key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| {
            let sender: i64 = row.get("next_sender_seq");
            let target: i64 = row.get("next_target_seq");
            (sender as u32, target as u32)
        }))
    }

    async fn save(&self, session_key: &str, next_sender_seq: u32, next_target_seq: u32) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO session_sequences (session_key, next_sender_seq, next_target_seq, updated_at)
            VALUES (?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(session_key) DO UPDATE SET
                next_sender_seq = excluded.next_sender_seq,
                next_target_seq = excluded.next_target_seq,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(session_key)
        .bind(next_sender_seq as i64)
        .bind(next_target_seq as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn round_trips_sequence_checkpoint() {
        let db = test_db().await;
        assert_eq!(db.load("GATEWAY->BROKER").await.unwrap(), None);

        db.save("GATEWAY->BROKER", 42, 17).await.unwrap();
        assert_eq!(db.load("GATEWAY->BROKER").await.unwrap(), Some((42, 17)));

        db.save("GATEWAY->BROKER", 43, 18).await.unwrap();
        assert_eq!(db.load("GATEWAY->BROKER").await.unwrap(), Some((43, 18)));
    }
}
