use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::model::{ArtworkId, EmotionCounts, EmotionSet, Submission, VisitorKey};
use crate::store::traits::{CountStore, SubmissionStore};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the emotion_counts and user_submissions tables if needed
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl CountStore for PostgresStore {
    async fn get_counts(&self, artwork_id: ArtworkId) -> Result<EmotionCounts> {
        let rows = sqlx::query("SELECT emotion, count FROM emotion_counts WHERE painting_id = $1")
            .bind(artwork_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch emotion counts")?;

        let counts = rows
            .into_iter()
            .map(|row| {
                let count: i64 = row.get("count");
                (row.get::<String, _>("emotion"), count.max(0))
            })
            .collect();

        Ok(counts)
    }

    async fn adjust_count(&self, artwork_id: ArtworkId, emotion: &str, delta: i64) -> Result<i64> {
        // Single statement so the row lock serialises concurrent visitors
        let row = sqlx::query(
            r#"
            INSERT INTO emotion_counts (painting_id, emotion, count)
            VALUES ($1, $2, GREATEST(0, $3))
            ON CONFLICT (painting_id, emotion) DO UPDATE SET
                count = GREATEST(0, emotion_counts.count + $3),
                updated_at = NOW()
            RETURNING count
            "#,
        )
        .bind(artwork_id)
        .bind(emotion)
        .bind(delta)
        .fetch_one(&self.pool)
        .await
        .context("Failed to update emotion count")?;

        Ok(row.get("count"))
    }
}

#[async_trait::async_trait]
impl SubmissionStore for PostgresStore {
    async fn get_submission(
        &self,
        artwork_id: ArtworkId,
        visitor: &VisitorKey,
    ) -> Result<Option<Submission>> {
        let row = sqlx::query(
            r#"
            SELECT selected_emotions, updated_at
            FROM user_submissions
            WHERE painting_id = $1 AND visitor_key = $2
            "#,
        )
        .bind(artwork_id)
        .bind(visitor.as_key())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to check submission")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let emotions: Vec<String> = row.get("selected_emotions");
        Ok(Some(Submission {
            artwork_id,
            visitor: visitor.clone(),
            selected_emotions: emotions.into_iter().collect(),
            updated_at: row.get("updated_at"),
        }))
    }

    async fn put_submission(
        &self,
        artwork_id: ArtworkId,
        visitor: &VisitorKey,
        emotions: &EmotionSet,
    ) -> Result<()> {
        let emotions: Vec<String> = emotions.iter().cloned().collect();
        sqlx::query(
            r#"
            INSERT INTO user_submissions (painting_id, visitor_key, ip_address, session_id, selected_emotions)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (painting_id, visitor_key) DO UPDATE SET
                selected_emotions = EXCLUDED.selected_emotions,
                updated_at = NOW()
            "#,
        )
        .bind(artwork_id)
        .bind(visitor.as_key())
        .bind(&visitor.network_address)
        .bind(&visitor.session_id)
        .bind(emotions)
        .execute(&self.pool)
        .await
        .context("Failed to save submission")?;

        Ok(())
    }
}
