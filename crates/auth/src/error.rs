//! Fehlertypen fuer die Auth-Engine

use thiserror::Error;

/// Alle moeglichen Fehler der Auth-Engine
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Eingaben ---
    #[error("Ungueltige Eingabe: {0}")]
    Validierung(String),

    #[error("Konflikt: {0}")]
    Konflikt(String),

    #[error("Nicht gefunden: {0}")]
    NichtGefunden(String),

    // --- Authentifizierung ---
    #[error("E-Mail oder Passwort falsch")]
    UngueltigeAnmeldedaten,

    #[error("Nicht angemeldet")]
    NichtAngemeldet,

    // --- Autorisierung ---
    #[error("Zugriff verweigert: {0}")]
    ZugriffVerweigert(String),

    // --- Action-Tokens ---
    #[error("Token ungueltig oder abgelaufen")]
    TokenUngueltigOderAbgelaufen,

    // --- Passwort-Hashing ---
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    // --- Datenbank ---
    #[error("Datenbankfehler: {0}")]
    Datenbank(#[from] bouncer_db::DbError),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn validierung(msg: impl Into<String>) -> Self {
        Self::Validierung(msg.into())
    }

    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }
}

/// Result-Alias fuer die Auth-Engine
pub type AuthResult<T> = Result<T, AuthError>;
