//! In-Memory-Fakes fuer Unit-Tests

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use bouncer_db::{
    models::{
        ActionTokenRecord, KontoRecord, KontoUpdate, NeuerActionToken, NeuesKonto, Rolle,
        TokenZweck, STANDARD_BIO, STANDARD_PHOTO,
    },
    ActionTokenRepository, DbError, DbResult, KontoRepository,
};

use crate::error::{AuthError, AuthResult};
use crate::mail::MailTransport;

/// In-Memory KontoRepository
#[derive(Default)]
pub struct TestKontoRepo {
    konten: Mutex<Vec<KontoRecord>>,
}

impl KontoRepository for TestKontoRepo {
    async fn create(&self, data: NeuesKonto<'_>) -> DbResult<KontoRecord> {
        let mut konten = self.konten.lock().unwrap();
        if konten.iter().any(|k| k.email == data.email) {
            return Err(DbError::Eindeutigkeit(format!(
                "E-Mail '{}' bereits registriert",
                data.email
            )));
        }

        let jetzt = Utc::now();
        let record = KontoRecord {
            id: Uuid::new_v4(),
            name: data.name.to_string(),
            email: data.email.to_string(),
            password_hash: data.password_hash.to_string(),
            photo: STANDARD_PHOTO.to_string(),
            bio: STANDARD_BIO.to_string(),
            rolle: Rolle::User,
            ist_verifiziert: false,
            created_at: jetzt,
            updated_at: jetzt,
        };
        konten.push(record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<KontoRecord>> {
        Ok(self
            .konten
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.id == id)
            .cloned())
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<KontoRecord>> {
        Ok(self
            .konten
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.email == email)
            .cloned())
    }

    async fn update(&self, id: Uuid, data: KontoUpdate) -> DbResult<KontoRecord> {
        let mut konten = self.konten.lock().unwrap();
        let konto = konten
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or_else(|| DbError::nicht_gefunden(format!("Konto {id}")))?;

        if let Some(name) = data.name {
            konto.name = name;
        }
        if let Some(bio) = data.bio {
            konto.bio = bio;
        }
        if let Some(photo) = data.photo {
            konto.photo = photo;
        }
        if let Some(hash) = data.password_hash {
            konto.password_hash = hash;
        }
        if let Some(verifiziert) = data.ist_verifiziert {
            konto.ist_verifiziert = verifiziert;
        }
        konto.updated_at = Utc::now();
        Ok(konto.clone())
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let mut konten = self.konten.lock().unwrap();
        let vorher = konten.len();
        konten.retain(|k| k.id != id);
        Ok(konten.len() < vorher)
    }

    async fn list(&self) -> DbResult<Vec<KontoRecord>> {
        Ok(self.konten.lock().unwrap().clone())
    }
}

/// In-Memory ActionTokenRepository
#[derive(Default)]
pub struct TestTokenRepo {
    tokens: Mutex<Vec<ActionTokenRecord>>,
}

impl ActionTokenRepository for TestTokenRepo {
    async fn ersetzen(&self, data: NeuerActionToken<'_>) -> DbResult<ActionTokenRecord> {
        let mut tokens = self.tokens.lock().unwrap();
        tokens.retain(|t| !(t.konto_id == data.konto_id && t.zweck == data.zweck));
        let record = ActionTokenRecord {
            id: Uuid::new_v4(),
            konto_id: data.konto_id,
            zweck: data.zweck,
            token_hash: data.token_hash.to_string(),
            created_at: Utc::now(),
            expires_at: data.expires_at,
        };
        tokens.push(record.clone());
        Ok(record)
    }

    async fn find_gueltig(
        &self,
        token_hash: &str,
        zweck: TokenZweck,
        jetzt: DateTime<Utc>,
    ) -> DbResult<Option<ActionTokenRecord>> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token_hash == token_hash && t.zweck == zweck && t.expires_at > jetzt)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let mut tokens = self.tokens.lock().unwrap();
        let vorher = tokens.len();
        tokens.retain(|t| t.id != id);
        Ok(tokens.len() < vorher)
    }

    async fn abgelaufene_loeschen(&self, jetzt: DateTime<Utc>) -> DbResult<usize> {
        let mut tokens = self.tokens.lock().unwrap();
        let vorher = tokens.len();
        tokens.retain(|t| t.expires_at > jetzt);
        Ok(vorher - tokens.len())
    }
}

/// Mail-Transport der alle Sendungen aufzeichnet
#[derive(Default)]
pub struct TestMailVersand {
    pub gesendet: Mutex<Vec<(String, String, String)>>,
}

impl MailTransport for TestMailVersand {
    async fn senden(&self, an: &str, betreff: &str, html: &str) -> AuthResult<()> {
        self.gesendet
            .lock()
            .unwrap()
            .push((an.to_string(), betreff.to_string(), html.to_string()));
        Ok(())
    }
}

impl TestMailVersand {
    /// Letzte gesendete Mail (an, betreff, html)
    pub fn letzte(&self) -> Option<(String, String, String)> {
        self.gesendet.lock().unwrap().last().cloned()
    }
}

/// Mail-Transport der jede Sendung fehlschlagen laesst
#[derive(Default)]
pub struct FehlerMailVersand;

impl MailTransport for FehlerMailVersand {
    async fn senden(&self, _an: &str, _betreff: &str, _html: &str) -> AuthResult<()> {
        Err(AuthError::intern("SMTP nicht erreichbar"))
    }
}
