//! Action-Token-Ledger
//!
//! Verwaltet zeitlich begrenzte Einmal-Tokens fuer E-Mail-Verifikation
//! und Passwort-Reset. Der Rohwert verlaesst die Engine genau einmal,
//! gespeichert wird nur sein SHA-256-Digest. Pro (Konto, Zweck) lebt
//! hoechstens ein Token: erneutes Ausstellen verdraengt den Vorgaenger.

use std::sync::Arc;

use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use bouncer_db::{
    models::{NeuerActionToken, TokenZweck},
    ActionTokenRepository,
};

use crate::error::{AuthError, AuthResult};
use crate::uhr::Uhr;

/// Gueltigkeit eines Verifikations-Tokens: 24 Stunden
const VERIFIKATION_TTL_STUNDEN: i64 = 24;

/// Gueltigkeit eines Reset-Tokens: 1 Stunde
const RESET_TTL_STUNDEN: i64 = 1;

/// Entropie des Roh-Tokens in Bytes
const TOKEN_ENTROPIE_BYTES: usize = 64;

/// Action-Token-Ledger – Ausstellen und Einloesen von Einmal-Tokens
pub struct ActionTokenLedger<T: ActionTokenRepository> {
    token_repo: Arc<T>,
    uhr: Arc<dyn Uhr>,
}

impl<T: ActionTokenRepository> ActionTokenLedger<T> {
    /// Erstellt einen neuen Ledger
    pub fn neu(token_repo: Arc<T>, uhr: Arc<dyn Uhr>) -> Self {
        Self { token_repo, uhr }
    }

    /// Stellt einen neuen Token aus und gibt den Rohwert zurueck
    ///
    /// Ein eventuell vorhandener Token desselben Zwecks wird dabei
    /// verdraengt; sein Rohwert ist danach dauerhaft unbrauchbar, auch
    /// wenn er noch nicht abgelaufen war.
    pub async fn ausstellen(&self, konto_id: Uuid, zweck: TokenZweck) -> AuthResult<String> {
        let roh_token = roh_token_generieren(konto_id);
        let digest = token_digest(&roh_token);

        let jetzt = self.uhr.jetzt();
        let expires_at = jetzt + chrono::Duration::hours(ttl_stunden(zweck));

        self.token_repo
            .ersetzen(NeuerActionToken {
                konto_id,
                zweck,
                token_hash: &digest,
                expires_at,
            })
            .await?;

        tracing::debug!(
            konto_id = %konto_id,
            zweck = zweck.als_str(),
            expires_at = %expires_at,
            "Action-Token ausgestellt"
        );

        Ok(roh_token)
    }

    /// Loest einen Token ein und gibt die Konto-ID des Besitzers zurueck
    ///
    /// Nie ausgestellt, abgelaufen und bereits eingeloest sind fuer den
    /// Aufrufer nicht unterscheidbar. Ein Treffer wird sofort geloescht
    /// (Einmal-Verwendung).
    pub async fn einloesen(&self, roh_token: &str, zweck: TokenZweck) -> AuthResult<Uuid> {
        let digest = token_digest(roh_token);

        let record = self
            .token_repo
            .find_gueltig(&digest, zweck, self.uhr.jetzt())
            .await?
            .ok_or(AuthError::TokenUngueltigOderAbgelaufen)?;

        self.token_repo.delete(record.id).await?;

        tracing::debug!(
            konto_id = %record.konto_id,
            zweck = zweck.als_str(),
            "Action-Token eingeloest"
        );

        Ok(record.konto_id)
    }

    /// Raeumt abgelaufene Tokens aus dem Speicher
    pub async fn abgelaufene_bereinigen(&self) -> AuthResult<usize> {
        let entfernt = self.token_repo.abgelaufene_loeschen(self.uhr.jetzt()).await?;
        if entfernt > 0 {
            tracing::debug!(anzahl = entfernt, "Abgelaufene Action-Tokens bereinigt");
        }
        Ok(entfernt)
    }
}

/// TTL-Policy pro Zweck
fn ttl_stunden(zweck: TokenZweck) -> i64 {
    match zweck {
        TokenZweck::EmailVerifikation => VERIFIKATION_TTL_STUNDEN,
        TokenZweck::PasswortReset => RESET_TTL_STUNDEN,
    }
}

/// Generiert einen Roh-Token: 64 Bytes Entropie (URL-sicheres Base64)
/// plus die Konto-ID als Eindeutigkeits-Suffix
fn roh_token_generieren(konto_id: Uuid) -> String {
    let mut bytes = [0u8; TOKEN_ENTROPIE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);
    format!("{}{}", encoded, konto_id.simple())
}

/// SHA-256-Hexdigest eines Roh-Tokens
fn token_digest(roh_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(roh_token.as_bytes());
    format!("{:x}", hasher.finalize())
}
