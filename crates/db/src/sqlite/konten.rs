//! SQLite-Implementierung des KontoRepository

use chrono::Utc;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{KontoRecord, KontoUpdate, NeuesKonto, Rolle, STANDARD_BIO, STANDARD_PHOTO};
use crate::repository::KontoRepository;
use crate::sqlite::pool::SqliteDb;

const KONTO_SPALTEN: &str =
    "id, name, email, password_hash, photo, bio, rolle, ist_verifiziert, created_at, updated_at";

impl KontoRepository for SqliteDb {
    async fn create(&self, data: NeuesKonto<'_>) -> DbResult<KontoRecord> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        sqlx::query(
            "INSERT INTO konten (id, name, email, password_hash, photo, bio, rolle, ist_verifiziert, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, 'user', 0, ?, ?)",
        )
        .bind(id.to_string())
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(STANDARD_PHOTO)
        .bind(STANDARD_BIO)
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE") || msg.contains("unique") {
                DbError::Eindeutigkeit(format!("E-Mail '{}' bereits registriert", data.email))
            } else {
                DbError::Sqlx(e)
            }
        })?;

        Ok(KontoRecord {
            id,
            name: data.name.to_string(),
            email: data.email.to_string(),
            password_hash: data.password_hash.to_string(),
            photo: STANDARD_PHOTO.to_string(),
            bio: STANDARD_BIO.to_string(),
            rolle: Rolle::User,
            ist_verifiziert: false,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<KontoRecord>> {
        let sql = format!("SELECT {KONTO_SPALTEN} FROM konten WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_konto(&r)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<KontoRecord>> {
        let sql = format!("SELECT {KONTO_SPALTEN} FROM konten WHERE email = ?");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_konto(&r)).transpose()
    }

    async fn update(&self, id: Uuid, data: KontoUpdate) -> DbResult<KontoRecord> {
        if data.ist_leer() {
            return self
                .get_by_id(id)
                .await?
                .ok_or_else(|| DbError::nicht_gefunden(format!("Konto {id}")));
        }

        // Dynamisches UPDATE – nur gesetzte Felder aendern
        let mut sets: Vec<&str> = Vec::new();
        if data.name.is_some() {
            sets.push("name = ?");
        }
        if data.bio.is_some() {
            sets.push("bio = ?");
        }
        if data.photo.is_some() {
            sets.push("photo = ?");
        }
        if data.password_hash.is_some() {
            sets.push("password_hash = ?");
        }
        if data.ist_verifiziert.is_some() {
            sets.push("ist_verifiziert = ?");
        }
        sets.push("updated_at = ?");

        let sql = format!("UPDATE konten SET {} WHERE id = ?", sets.join(", "));
        let mut q = sqlx::query(&sql);

        if let Some(ref v) = data.name {
            q = q.bind(v);
        }
        if let Some(ref v) = data.bio {
            q = q.bind(v);
        }
        if let Some(ref v) = data.photo {
            q = q.bind(v);
        }
        if let Some(ref v) = data.password_hash {
            q = q.bind(v);
        }
        if let Some(v) = data.ist_verifiziert {
            q = q.bind(v as i64);
        }
        q = q.bind(Utc::now().to_rfc3339());
        q = q.bind(id.to_string());

        let affected = q.execute(&self.pool).await?.rows_affected();
        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!("Konto {id}")));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::intern("Konto nach Update nicht gefunden"))
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let affected = sqlx::query("DELETE FROM konten WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn list(&self) -> DbResult<Vec<KontoRecord>> {
        let sql = format!("SELECT {KONTO_SPALTEN} FROM konten ORDER BY rowid");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(row_to_konto).collect()
    }
}

fn row_to_konto(row: &sqlx::sqlite::SqliteRow) -> DbResult<KontoRecord> {
    use sqlx::Row as _;

    let id_str: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DbError::intern(format!("Ungueltige UUID '{id_str}': {e}")))?;

    let rolle_str: String = row.try_get("rolle")?;
    let rolle: Rolle = rolle_str
        .parse()
        .map_err(|e: String| DbError::intern(e))?;

    let ist_verifiziert: i64 = row.try_get("ist_verifiziert")?;

    Ok(KontoRecord {
        id,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        photo: row.try_get("photo")?,
        bio: row.try_get("bio")?,
        rolle,
        ist_verifiziert: ist_verifiziert != 0,
        created_at: rfc3339_spalte(row, "created_at")?,
        updated_at: rfc3339_spalte(row, "updated_at")?,
    })
}

pub(crate) fn rfc3339_spalte(
    row: &sqlx::sqlite::SqliteRow,
    spalte: &str,
) -> DbResult<chrono::DateTime<Utc>> {
    use sqlx::Row as _;

    let wert: String = row.try_get(spalte)?;
    chrono::DateTime::parse_from_rfc3339(&wert)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::intern(format!("Ungueltige {spalte} '{wert}': {e}")))
}
