//! Konto-Verzeichnis
//!
//! CRUD-Oberflaeche ueber Konten inklusive der Anmeldedaten-Regeln:
//! Validierung bei der Registrierung, Passwort-Hashing vor jeder
//! Persistierung, Passwortwechsel mit Re-Verifikation.

use std::sync::Arc;

use uuid::Uuid;

use bouncer_db::{
    models::{KontoRecord, KontoUpdate, NeuesKonto},
    KontoRepository,
};

use crate::error::{AuthError, AuthResult};
use crate::password::{passwort_hashen, passwort_verifizieren};

/// Mindestlaenge des Passworts bei der Registrierung
const PASSWORT_MINDESTLAENGE: usize = 6;

/// Teilaktualisierung des Profils
///
/// Nicht gesetzte UND leere Felder behalten den bisherigen Wert. Das
/// Leer-heisst-behalten-Verhalten ist Altlast-Semantik und bleibt
/// absichtlich erhalten.
#[derive(Debug, Clone, Default)]
pub struct ProfilUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub photo: Option<String>,
}

/// Konto-Verzeichnis – Verwaltung der Konten und ihrer Anmeldedaten
pub struct KontoVerzeichnis<K: KontoRepository> {
    konto_repo: Arc<K>,
}

impl<K: KontoRepository> KontoVerzeichnis<K> {
    /// Erstellt ein neues Verzeichnis
    pub fn neu(konto_repo: Arc<K>) -> Self {
        Self { konto_repo }
    }

    /// Registriert ein neues Konto
    ///
    /// Prueft Pflichtfelder und Passwort-Mindestlaenge, lehnt bereits
    /// registrierte E-Mail-Adressen ab und hasht das Passwort vor dem
    /// Persistieren.
    pub async fn erstellen(
        &self,
        name: &str,
        email: &str,
        passwort: &str,
    ) -> AuthResult<KontoRecord> {
        if name.is_empty() || email.is_empty() || passwort.is_empty() {
            return Err(AuthError::validierung("Alle Felder sind erforderlich"));
        }

        if passwort.len() < PASSWORT_MINDESTLAENGE {
            return Err(AuthError::validierung(format!(
                "Passwort muss mindestens {PASSWORT_MINDESTLAENGE} Zeichen haben"
            )));
        }

        let email = email.trim();

        if self.konto_repo.get_by_email(email).await?.is_some() {
            return Err(AuthError::Konflikt(format!(
                "E-Mail '{email}' bereits registriert"
            )));
        }

        let password_hash = passwort_hashen(passwort)?;

        let konto = self
            .konto_repo
            .create(NeuesKonto {
                name,
                email,
                password_hash: &password_hash,
            })
            .await
            .map_err(|e| {
                // Rennen zwischen Vorpruefung und INSERT: UNIQUE greift
                if e.ist_eindeutigkeit() {
                    AuthError::Konflikt(format!("E-Mail '{email}' bereits registriert"))
                } else {
                    AuthError::Datenbank(e)
                }
            })?;

        tracing::info!(
            konto_id = %konto.id,
            email = %konto.email,
            "Neues Konto registriert"
        );

        Ok(konto)
    }

    /// Laedt ein Konto anhand seiner ID
    pub async fn laden(&self, id: Uuid) -> AuthResult<KontoRecord> {
        self.konto_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AuthError::NichtGefunden(format!("Konto {id}")))
    }

    /// Laedt ein Konto anhand seiner E-Mail-Adresse
    pub async fn nach_email(&self, email: &str) -> AuthResult<KontoRecord> {
        self.konto_repo
            .get_by_email(email)
            .await?
            .ok_or_else(|| AuthError::NichtGefunden(format!("Konto '{email}'")))
    }

    /// Aktualisiert Profilfelder
    ///
    /// Leere Strings zaehlen wie nicht gesetzt und behalten den
    /// bisherigen Wert.
    pub async fn profil_aktualisieren(
        &self,
        id: Uuid,
        update: ProfilUpdate,
    ) -> AuthResult<KontoRecord> {
        let konto = self
            .konto_repo
            .update(
                id,
                KontoUpdate {
                    name: nicht_leer(update.name),
                    bio: nicht_leer(update.bio),
                    photo: nicht_leer(update.photo),
                    ..Default::default()
                },
            )
            .await
            .map_err(nicht_gefunden_als_auth)?;

        tracing::debug!(konto_id = %id, "Profil aktualisiert");
        Ok(konto)
    }

    /// Aendert das Passwort nach Re-Verifikation des aktuellen Passworts
    ///
    /// Das neue Passwort unterliegt hier keiner Mindestlaenge.
    pub async fn passwort_aendern(
        &self,
        id: Uuid,
        aktuelles: &str,
        neues: &str,
    ) -> AuthResult<()> {
        if aktuelles.is_empty() || neues.is_empty() {
            return Err(AuthError::validierung("Alle Felder sind erforderlich"));
        }

        let konto = self.laden(id).await?;

        let korrekt = passwort_verifizieren(aktuelles, &konto.password_hash)?;
        if !korrekt {
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        self.passwort_setzen(id, neues).await?;

        tracing::info!(konto_id = %id, "Passwort geaendert");
        Ok(())
    }

    /// Setzt das Passwort ohne Re-Verifikation
    ///
    /// Nur ueber den Reset-Fluss erreichbar, der Besitz des Reset-Tokens
    /// bereits nachgewiesen hat.
    pub async fn passwort_setzen(&self, id: Uuid, neues: &str) -> AuthResult<()> {
        let password_hash = passwort_hashen(neues)?;

        self.konto_repo
            .update(
                id,
                KontoUpdate {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await
            .map_err(nicht_gefunden_als_auth)?;

        Ok(())
    }

    /// Markiert ein Konto als verifiziert
    pub async fn verifiziert_markieren(&self, id: Uuid) -> AuthResult<KontoRecord> {
        let konto = self
            .konto_repo
            .update(
                id,
                KontoUpdate {
                    ist_verifiziert: Some(true),
                    ..Default::default()
                },
            )
            .await
            .map_err(nicht_gefunden_als_auth)?;

        tracing::info!(konto_id = %id, "Konto verifiziert");
        Ok(konto)
    }

    /// Loescht ein Konto endgueltig
    ///
    /// Meldet `NichtGefunden` wenn das Konto fehlt; Erfolg gibt es pro
    /// Konto nur einmal.
    pub async fn loeschen(&self, id: Uuid) -> AuthResult<()> {
        let geloescht = self.konto_repo.delete(id).await?;
        if !geloescht {
            return Err(AuthError::NichtGefunden(format!("Konto {id}")));
        }

        tracing::info!(konto_id = %id, "Konto geloescht");
        Ok(())
    }

    /// Listet alle Konten in Einfuege-Reihenfolge
    pub async fn alle_listen(&self) -> AuthResult<Vec<KontoRecord>> {
        Ok(self.konto_repo.list().await?)
    }
}

/// Leere Strings zaehlen wie nicht gesetzt (Altlast-Semantik)
fn nicht_leer(wert: Option<String>) -> Option<String> {
    wert.filter(|s| !s.is_empty())
}

/// DbError::NichtGefunden wird zur Verzeichnis-Antwort, alles andere
/// bleibt ein Datenbankfehler
fn nicht_gefunden_als_auth(e: bouncer_db::DbError) -> AuthError {
    match e {
        bouncer_db::DbError::NichtGefunden(msg) => AuthError::NichtGefunden(msg),
        andere => AuthError::Datenbank(andere),
    }
}
