//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Geschaeftslogik in bouncer-auth
//! von der konkreten Datenbank-Implementierung. Die SQLite-Implementierung
//! liegt unter `sqlite/`; Tests in bouncer-auth stellen eigene
//! In-Memory-Implementierungen bereit.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{ActionTokenRecord, KontoRecord, KontoUpdate, NeuerActionToken, NeuesKonto, TokenZweck};

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://bouncer.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://bouncer.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Repository fuer Konto-Datenzugriffe
#[allow(async_fn_in_trait)]
pub trait KontoRepository: Send + Sync {
    /// Legt ein neues Konto an; E-Mail-Duplikate ergeben `DbError::Eindeutigkeit`
    async fn create(&self, data: NeuesKonto<'_>) -> DbResult<KontoRecord>;

    /// Laedt ein Konto anhand seiner ID
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<KontoRecord>>;

    /// Laedt ein Konto anhand seiner E-Mail-Adresse (exakter Vergleich)
    async fn get_by_email(&self, email: &str) -> DbResult<Option<KontoRecord>>;

    /// Aktualisiert gesetzte Felder und stempelt `updated_at` neu
    async fn update(&self, id: Uuid, data: KontoUpdate) -> DbResult<KontoRecord>;

    /// Loescht ein Konto endgueltig; gibt `false` zurueck wenn es fehlte
    async fn delete(&self, id: Uuid) -> DbResult<bool>;

    /// Listet alle Konten in Einfuege-Reihenfolge
    async fn list(&self) -> DbResult<Vec<KontoRecord>>;
}

/// Repository fuer Action-Token-Datenzugriffe
///
/// Ablauf-relevante Abfragen nehmen den aktuellen Zeitpunkt als Parameter
/// entgegen, damit die Ablauf-Logik ohne Wanduhr testbar bleibt.
#[allow(async_fn_in_trait)]
pub trait ActionTokenRepository: Send + Sync {
    /// Ersetzt den Token fuer `(konto_id, zweck)` atomar: ein eventuell
    /// vorhandener Vorgaenger wird geloescht und der neue Datensatz in
    /// derselben Transaktion eingefuegt.
    async fn ersetzen(&self, data: NeuerActionToken<'_>) -> DbResult<ActionTokenRecord>;

    /// Sucht einen noch gueltigen Token (`expires_at > jetzt`) anhand von
    /// Hash und Zweck. Abgelaufene Datensaetze werden nicht zurueckgegeben.
    async fn find_gueltig(
        &self,
        token_hash: &str,
        zweck: TokenZweck,
        jetzt: DateTime<Utc>,
    ) -> DbResult<Option<ActionTokenRecord>>;

    /// Loescht einen Token anhand seiner ID (Einmal-Verwendung)
    async fn delete(&self, id: Uuid) -> DbResult<bool>;

    /// Loescht alle abgelaufenen Tokens und gibt die Anzahl zurueck
    async fn abgelaufene_loeschen(&self, jetzt: DateTime<Utc>) -> DbResult<usize>;
}
