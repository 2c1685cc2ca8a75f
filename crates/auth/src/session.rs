//! Signierte Session-Credentials
//!
//! Eine Session ist ein HS256-signierter, zeitlich begrenzter Bearer-Wert,
//! der die Konto-ID traegt. Die Pruefung kommt ohne Datenbankzugriff aus:
//! Signatur + Ablauf genuegen. Der Server haelt keinen Session-Zustand;
//! Abmelden heisst, dass der Client den Wert verwirft.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bouncer_db::models::{KontoRecord, Rolle};

use crate::error::{AuthError, AuthResult};

/// Standard-Gueltigkeit eines Session-Credentials: 30 Tage
pub const SESSION_GUELTIGKEIT_TAGE: i64 = 30;

/// JWT-Claims des Session-Credentials
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    /// Konto-ID
    sub: String,
    /// Ausstellungszeitpunkt (Unix-Sekunden)
    iat: i64,
    /// Ablaufzeitpunkt (Unix-Sekunden)
    exp: i64,
}

/// Signierschluessel fuer Session-Credentials
///
/// Wird einmal beim Start aus der Konfiguration gebaut und danach nie
/// veraendert. Praegen und Pruefen sind reine Funktionen aus Credential,
/// Geheimnis und Uhrzeit.
pub struct SessionSchluessel {
    encoding: EncodingKey,
    decoding: DecodingKey,
    gueltigkeit: Duration,
}

impl SessionSchluessel {
    /// Baut den Schluessel mit der Standard-Gueltigkeit von 30 Tagen
    pub fn neu(geheimnis: &str) -> AuthResult<Self> {
        Self::mit_gueltigkeit(geheimnis, Duration::days(SESSION_GUELTIGKEIT_TAGE))
    }

    /// Baut den Schluessel mit einer abweichenden Gueltigkeit
    pub fn mit_gueltigkeit(geheimnis: &str, gueltigkeit: Duration) -> AuthResult<Self> {
        if geheimnis.is_empty() {
            return Err(AuthError::validierung(
                "Session-Geheimnis darf nicht leer sein",
            ));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(geheimnis.as_bytes()),
            decoding: DecodingKey::from_secret(geheimnis.as_bytes()),
            gueltigkeit,
        })
    }

    /// Praegt ein Session-Credential fuer die angegebene Konto-ID
    pub fn ausstellen(&self, konto_id: Uuid) -> AuthResult<String> {
        let jetzt = Utc::now();
        let claims = SessionClaims {
            sub: konto_id.to_string(),
            iat: jetzt.timestamp(),
            exp: (jetzt + self.gueltigkeit).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::intern(format!("Session-Credential nicht praegbar: {e}")))
    }

    /// Prueft Signatur und Ablauf eines Session-Credentials
    ///
    /// Fehlende, manipulierte, fremd-signierte und abgelaufene Credentials
    /// ergeben alle `NichtAngemeldet`; der Grund wird nur geloggt.
    pub fn verifizieren(&self, credential: &str) -> AuthResult<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let daten = decode::<SessionClaims>(credential, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(grund = %e, "Session-Credential abgelehnt");
                AuthError::NichtAngemeldet
            })?;

        Uuid::parse_str(&daten.claims.sub).map_err(|_| AuthError::NichtAngemeldet)
    }
}

/// Aufgeloeste Identitaet fuer die Request-Verarbeitung
///
/// Projektion eines Kontos ohne den Passwort-Hash; alles was die
/// Zugriffspruefung und die HTTP-Schicht sehen duerfen.
#[derive(Debug, Clone, Serialize)]
pub struct Identitaet {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub photo: String,
    pub bio: String,
    pub rolle: Rolle,
    pub ist_verifiziert: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<KontoRecord> for Identitaet {
    fn from(konto: KontoRecord) -> Self {
        Self {
            id: konto.id,
            name: konto.name,
            email: konto.email,
            photo: konto.photo,
            bio: konto.bio,
            rolle: konto.rolle,
            ist_verifiziert: konto.ist_verifiziert,
            created_at: konto.created_at,
            updated_at: konto.updated_at,
        }
    }
}
