//! Datenbankmodelle fuer Bouncer
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank.
//! Sie sind reine Datenuebertragungsobjekte; Geschaeftsregeln
//! (Validierung, Hashing, Ablauf-Policy) leben in bouncer-auth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standard-Profilbild fuer neue Konten
pub const STANDARD_PHOTO: &str = "https://freesvg.org/img/abstract-user-flat-4.png";

/// Standard-Bio fuer neue Konten
pub const STANDARD_BIO: &str = "Ich bin neu hier.";

// ---------------------------------------------------------------------------
// Konten
// ---------------------------------------------------------------------------

/// Rolle eines Kontos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rolle {
    User,
    Creator,
    Admin,
}

impl Rolle {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Creator => "creator",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Rolle {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "creator" => Ok(Self::Creator),
            "admin" => Ok(Self::Admin),
            other => Err(format!("Unbekannte Rolle: {other}")),
        }
    }
}

impl std::fmt::Display for Rolle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.als_str())
    }
}

/// Konto-Datensatz aus der Datenbank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KontoRecord {
    pub id: Uuid,
    pub name: String,
    /// E-Mail-Adresse, eindeutig (exakter Vergleich, case-sensitiv)
    pub email: String,
    /// Argon2id-PHC-String, niemals das Klartext-Passwort
    pub password_hash: String,
    pub photo: String,
    pub bio: String,
    pub rolle: Rolle,
    pub ist_verifiziert: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Daten zum Erstellen eines neuen Kontos
#[derive(Debug, Clone)]
pub struct NeuesKonto<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Daten zum Aktualisieren eines Kontos
///
/// Nur gesetzte Felder werden geschrieben; `updated_at` wird bei jedem
/// erfolgreichen Update neu gestempelt.
#[derive(Debug, Clone, Default)]
pub struct KontoUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub photo: Option<String>,
    pub password_hash: Option<String>,
    pub ist_verifiziert: Option<bool>,
}

impl KontoUpdate {
    /// Gibt true zurueck wenn kein Feld gesetzt ist
    pub fn ist_leer(&self) -> bool {
        self.name.is_none()
            && self.bio.is_none()
            && self.photo.is_none()
            && self.password_hash.is_none()
            && self.ist_verifiziert.is_none()
    }
}

// ---------------------------------------------------------------------------
// Action-Tokens
// ---------------------------------------------------------------------------

/// Zweck eines Action-Tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenZweck {
    /// E-Mail-Verifikation nach der Registrierung
    EmailVerifikation,
    /// Passwort-Zuruecksetzung ohne Anmeldung
    PasswortReset,
}

impl TokenZweck {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::EmailVerifikation => "verify-email",
            Self::PasswortReset => "reset-password",
        }
    }
}

impl std::str::FromStr for TokenZweck {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verify-email" => Ok(Self::EmailVerifikation),
            "reset-password" => Ok(Self::PasswortReset),
            other => Err(format!("Unbekannter Token-Zweck: {other}")),
        }
    }
}

/// Action-Token-Datensatz
///
/// `konto_id` ist eine Referenz ohne Besitz: das Konto kann unabhaengig
/// von liegengebliebenen Tokens geloescht werden, deshalb kein
/// Fremdschluessel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTokenRecord {
    pub id: Uuid,
    pub konto_id: Uuid,
    pub zweck: TokenZweck,
    /// SHA-256-Hexdigest des Roh-Tokens; der Rohwert wird nie gespeichert
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Daten zum Einsetzen eines neuen Action-Tokens
#[derive(Debug, Clone)]
pub struct NeuerActionToken<'a> {
    pub konto_id: Uuid,
    pub zweck: TokenZweck,
    pub token_hash: &'a str,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn rolle_roundtrip() {
        for rolle in [Rolle::User, Rolle::Creator, Rolle::Admin] {
            assert_eq!(Rolle::from_str(rolle.als_str()).unwrap(), rolle);
        }
        assert!(Rolle::from_str("superadmin").is_err());
    }

    #[test]
    fn token_zweck_roundtrip() {
        for zweck in [TokenZweck::EmailVerifikation, TokenZweck::PasswortReset] {
            assert_eq!(TokenZweck::from_str(zweck.als_str()).unwrap(), zweck);
        }
        assert!(TokenZweck::from_str("magic-link").is_err());
    }

    #[test]
    fn konto_update_leer_erkennung() {
        assert!(KontoUpdate::default().ist_leer());
        let update = KontoUpdate {
            bio: Some("Neue Bio".into()),
            ..Default::default()
        };
        assert!(!update.ist_leer());
    }
}
