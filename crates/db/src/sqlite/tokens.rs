//! SQLite-Implementierung des ActionTokenRepository

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{ActionTokenRecord, NeuerActionToken, TokenZweck};
use crate::repository::ActionTokenRepository;
use crate::sqlite::konten::rfc3339_spalte;
use crate::sqlite::pool::SqliteDb;

impl ActionTokenRepository for SqliteDb {
    async fn ersetzen(&self, data: NeuerActionToken<'_>) -> DbResult<ActionTokenRecord> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        // Loeschen + Einfuegen in einer Transaktion, damit pro
        // (konto_id, zweck) auch unter parallelen Aufrufen hoechstens
        // ein lebender Token existiert. UNIQUE(konto_id, zweck) faengt
        // den Rest ab.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM action_tokens WHERE konto_id = ? AND zweck = ?")
            .bind(data.konto_id.to_string())
            .bind(data.zweck.als_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO action_tokens (id, konto_id, zweck, token_hash, created_at, expires_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.konto_id.to_string())
        .bind(data.zweck.als_str())
        .bind(data.token_hash)
        .bind(now.to_rfc3339())
        .bind(data.expires_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ActionTokenRecord {
            id,
            konto_id: data.konto_id,
            zweck: data.zweck,
            token_hash: data.token_hash.to_string(),
            created_at: now,
            expires_at: data.expires_at,
        })
    }

    async fn find_gueltig(
        &self,
        token_hash: &str,
        zweck: TokenZweck,
        jetzt: DateTime<Utc>,
    ) -> DbResult<Option<ActionTokenRecord>> {
        let row = sqlx::query(
            "SELECT id, konto_id, zweck, token_hash, created_at, expires_at
             FROM action_tokens
             WHERE token_hash = ? AND zweck = ? AND expires_at > ?",
        )
        .bind(token_hash)
        .bind(zweck.als_str())
        .bind(jetzt.to_rfc3339())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_token(&r)).transpose()
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let affected = sqlx::query("DELETE FROM action_tokens WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn abgelaufene_loeschen(&self, jetzt: DateTime<Utc>) -> DbResult<usize> {
        let affected = sqlx::query("DELETE FROM action_tokens WHERE expires_at <= ?")
            .bind(jetzt.to_rfc3339())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected as usize)
    }
}

fn row_to_token(row: &sqlx::sqlite::SqliteRow) -> DbResult<ActionTokenRecord> {
    use sqlx::Row as _;

    let id_str: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DbError::intern(format!("Ungueltige UUID '{id_str}': {e}")))?;

    let konto_id_str: String = row.try_get("konto_id")?;
    let konto_id = Uuid::parse_str(&konto_id_str)
        .map_err(|e| DbError::intern(format!("Ungueltige Konto-UUID '{konto_id_str}': {e}")))?;

    let zweck_str: String = row.try_get("zweck")?;
    let zweck: TokenZweck = zweck_str
        .parse()
        .map_err(|e: String| DbError::intern(e))?;

    Ok(ActionTokenRecord {
        id,
        konto_id,
        zweck,
        token_hash: row.try_get("token_hash")?,
        created_at: rfc3339_spalte(row, "created_at")?,
        expires_at: rfc3339_spalte(row, "expires_at")?,
    })
}
