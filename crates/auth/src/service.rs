//! Auth-Service fuer Bouncer
//!
//! Zentraler Einstiegspunkt fuer Registrierung, Anmeldung, Session-
//! Aufloesung und die Verifikations-/Reset-Fluesse. Verbindet das
//! Konto-Verzeichnis, den Action-Token-Ledger, den Session-Schluessel
//! und den Mail-Transport.

use std::sync::Arc;

use uuid::Uuid;

use bouncer_db::{
    models::{KontoRecord, TokenZweck},
    ActionTokenRepository, KontoRepository,
};

use crate::{
    error::{AuthError, AuthResult},
    ledger::ActionTokenLedger,
    mail::{self, MailTransport},
    password::passwort_verifizieren,
    session::{Identitaet, SessionSchluessel},
    verzeichnis::{KontoVerzeichnis, ProfilUpdate},
};

/// Auth-Service – zentraler Einstiegspunkt fuer alle Authentifizierungsvorgaenge
pub struct AuthService<K, T, M>
where
    K: KontoRepository,
    T: ActionTokenRepository,
    M: MailTransport,
{
    verzeichnis: Arc<KontoVerzeichnis<K>>,
    ledger: Arc<ActionTokenLedger<T>>,
    schluessel: Arc<SessionSchluessel>,
    mail: Arc<M>,
    /// Basis-URL des Clients fuer Verifikations- und Reset-Links
    client_url: String,
}

impl<K, T, M> AuthService<K, T, M>
where
    K: KontoRepository,
    T: ActionTokenRepository,
    M: MailTransport,
{
    /// Erstellt einen neuen AuthService
    pub fn neu(
        verzeichnis: Arc<KontoVerzeichnis<K>>,
        ledger: Arc<ActionTokenLedger<T>>,
        schluessel: Arc<SessionSchluessel>,
        mail: Arc<M>,
        client_url: String,
    ) -> Self {
        Self {
            verzeichnis,
            ledger,
            schluessel,
            mail,
            client_url,
        }
    }

    // --- Registrierung & Anmeldung ---

    /// Registriert ein neues Konto und praegt direkt ein Session-Credential
    pub async fn registrieren(
        &self,
        name: &str,
        email: &str,
        passwort: &str,
    ) -> AuthResult<(KontoRecord, String)> {
        let konto = self.verzeichnis.erstellen(name, email, passwort).await?;
        let credential = self.schluessel.ausstellen(konto.id)?;
        Ok((konto, credential))
    }

    /// Meldet ein Konto an und praegt ein Session-Credential
    pub async fn anmelden(&self, email: &str, passwort: &str) -> AuthResult<(KontoRecord, String)> {
        if email.is_empty() || passwort.is_empty() {
            return Err(AuthError::validierung("Alle Felder sind erforderlich"));
        }

        let konto = self.verzeichnis.nach_email(email).await?;

        let korrekt = passwort_verifizieren(passwort, &konto.password_hash)?;
        if !korrekt {
            tracing::warn!(email = %email, "Fehlgeschlagener Anmeldeversuch");
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        let credential = self.schluessel.ausstellen(konto.id)?;

        tracing::info!(konto_id = %konto.id, "Konto angemeldet");
        Ok((konto, credential))
    }

    /// Prueft ein Session-Credential ohne Datenbankzugriff
    pub fn credential_pruefen(&self, credential: &str) -> AuthResult<Uuid> {
        self.schluessel.verifizieren(credential)
    }

    /// Loest ein Session-Credential zur vollen Identitaet auf
    ///
    /// Ein zwischenzeitlich geloeschtes Konto gilt als nicht angemeldet,
    /// nicht als Serverfehler.
    pub async fn identitaet_aufloesen(&self, credential: &str) -> AuthResult<Identitaet> {
        let konto_id = self.schluessel.verifizieren(credential)?;

        match self.verzeichnis.laden(konto_id).await {
            Ok(konto) => Ok(Identitaet::from(konto)),
            Err(AuthError::NichtGefunden(_)) => {
                tracing::debug!(konto_id = %konto_id, "Credential zu geloeschtem Konto");
                Err(AuthError::NichtAngemeldet)
            }
            Err(andere) => Err(andere),
        }
    }

    // --- Konto-Verwaltung ---

    /// Laedt die Identitaet eines Kontos
    pub async fn konto_identitaet(&self, konto_id: Uuid) -> AuthResult<Identitaet> {
        Ok(Identitaet::from(self.verzeichnis.laden(konto_id).await?))
    }

    /// Aktualisiert Profilfelder und gibt die neue Identitaet zurueck
    pub async fn profil_aktualisieren(
        &self,
        konto_id: Uuid,
        update: ProfilUpdate,
    ) -> AuthResult<Identitaet> {
        let konto = self
            .verzeichnis
            .profil_aktualisieren(konto_id, update)
            .await?;
        Ok(Identitaet::from(konto))
    }

    /// Aendert das Passwort nach Re-Verifikation des aktuellen
    pub async fn passwort_aendern(
        &self,
        konto_id: Uuid,
        aktuelles: &str,
        neues: &str,
    ) -> AuthResult<()> {
        self.verzeichnis
            .passwort_aendern(konto_id, aktuelles, neues)
            .await
    }

    /// Loescht ein Konto (Gate-Pruefung liegt beim Aufrufer)
    pub async fn loeschen(&self, konto_id: Uuid) -> AuthResult<()> {
        self.verzeichnis.loeschen(konto_id).await
    }

    /// Listet alle Konten als Identitaeten
    pub async fn alle_listen(&self) -> AuthResult<Vec<Identitaet>> {
        let konten = self.verzeichnis.alle_listen().await?;
        Ok(konten.into_iter().map(Identitaet::from).collect())
    }

    // --- E-Mail-Verifikation ---

    /// Fordert eine Verifikations-Mail fuer das Konto an
    ///
    /// Stellt einen neuen Verifikations-Token aus (ein Vorgaenger wird
    /// verdraengt) und verschickt den Link.
    pub async fn email_verifikation_anfordern(&self, konto_id: Uuid) -> AuthResult<()> {
        let konto = self.verzeichnis.laden(konto_id).await?;

        if konto.ist_verifiziert {
            return Err(AuthError::validierung("Konto ist bereits verifiziert"));
        }

        let roh_token = self
            .ledger
            .ausstellen(konto.id, TokenZweck::EmailVerifikation)
            .await?;

        let link = mail::verifikations_link(&self.client_url, &roh_token);
        let nachricht = mail::verifikations_mail(&konto.name, &link);

        self.mail_senden(&konto.email, &nachricht).await?;

        tracing::info!(konto_id = %konto.id, "Verifikations-Mail verschickt");
        Ok(())
    }

    /// Loest einen Verifikations-Token ein und markiert das Konto
    pub async fn email_verifizieren(&self, roh_token: &str) -> AuthResult<Identitaet> {
        let konto_id = self
            .ledger
            .einloesen(roh_token, TokenZweck::EmailVerifikation)
            .await?;

        let konto = self.verzeichnis.laden(konto_id).await?;
        if konto.ist_verifiziert {
            return Err(AuthError::validierung("Konto ist bereits verifiziert"));
        }

        let konto = self.verzeichnis.verifiziert_markieren(konto_id).await?;
        Ok(Identitaet::from(konto))
    }

    // --- Passwort-Reset ---

    /// Fordert eine Passwort-Reset-Mail fuer die E-Mail-Adresse an
    pub async fn passwort_vergessen(&self, email: &str) -> AuthResult<()> {
        if email.is_empty() {
            return Err(AuthError::validierung("E-Mail ist erforderlich"));
        }

        let konto = self.verzeichnis.nach_email(email).await?;

        let roh_token = self
            .ledger
            .ausstellen(konto.id, TokenZweck::PasswortReset)
            .await?;

        let link = mail::reset_link(&self.client_url, &roh_token);
        let nachricht = mail::reset_mail(&link);

        self.mail_senden(&konto.email, &nachricht).await?;

        tracing::info!(konto_id = %konto.id, "Reset-Mail verschickt");
        Ok(())
    }

    /// Loest einen Reset-Token ein und setzt das neue Passwort
    ///
    /// Das neue Passwort unterliegt keiner Mindestlaenge.
    pub async fn passwort_zuruecksetzen(&self, roh_token: &str, neues: &str) -> AuthResult<()> {
        if neues.is_empty() {
            return Err(AuthError::validierung("Passwort ist erforderlich"));
        }

        let konto_id = self
            .ledger
            .einloesen(roh_token, TokenZweck::PasswortReset)
            .await?;

        self.verzeichnis.passwort_setzen(konto_id, neues).await?;

        tracing::info!(konto_id = %konto_id, "Passwort zurueckgesetzt");
        Ok(())
    }

    /// Raeumt abgelaufene Action-Tokens aus dem Speicher
    pub async fn tokens_bereinigen(&self) -> AuthResult<usize> {
        self.ledger.abgelaufene_bereinigen().await
    }

    /// Verschickt eine Mail; Transportfehler werden geloggt und als
    /// interner Fehler ohne Detail weitergereicht
    async fn mail_senden(&self, an: &str, nachricht: &mail::Mail) -> AuthResult<()> {
        if let Err(e) = self
            .mail
            .senden(an, &nachricht.betreff, &nachricht.html)
            .await
        {
            tracing::error!(fehler = %e, "Mail-Versand fehlgeschlagen");
            return Err(AuthError::intern("E-Mail konnte nicht gesendet werden"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FehlerMailVersand, TestKontoRepo, TestMailVersand, TestTokenRepo};
    use crate::uhr::SystemUhr;

    type TestService = AuthService<TestKontoRepo, TestTokenRepo, TestMailVersand>;

    fn test_service() -> (TestService, Arc<TestMailVersand>) {
        let verzeichnis = Arc::new(KontoVerzeichnis::neu(Arc::new(TestKontoRepo::default())));
        let ledger = Arc::new(ActionTokenLedger::neu(
            Arc::new(TestTokenRepo::default()),
            Arc::new(SystemUhr),
        ));
        let schluessel = Arc::new(SessionSchluessel::neu("test_geheimnis").unwrap());
        let mail = Arc::new(TestMailVersand::default());

        let service = AuthService::neu(
            verzeichnis,
            ledger,
            schluessel,
            mail.clone(),
            "https://app.example.com".into(),
        );
        (service, mail)
    }

    /// Zieht den Roh-Token aus dem Link einer aufgezeichneten Mail
    fn token_aus_mail(html: &str, pfad: &str) -> String {
        let start = html.find(pfad).expect("Link fehlt in der Mail") + pfad.len();
        html[start..]
            .chars()
            .take_while(|c| *c != '"')
            .collect()
    }

    #[tokio::test]
    async fn registrieren_und_anmelden() {
        let (service, _) = test_service();

        let (konto, credential) = service
            .registrieren("Ann", "ann@x.com", "secret1")
            .await
            .expect("Registrierung fehlgeschlagen");

        assert_eq!(konto.name, "Ann");
        assert_eq!(konto.rolle, bouncer_db::models::Rolle::User);
        assert!(!konto.ist_verifiziert);
        assert!(!credential.is_empty());

        // Falsches Passwort wird abgelehnt
        let falsch = service.anmelden("ann@x.com", "falsch123").await;
        assert!(matches!(falsch, Err(AuthError::UngueltigeAnmeldedaten)));

        // Richtiges Passwort: Credential loest zurueck auf Ann auf
        let (_, credential) = service.anmelden("ann@x.com", "secret1").await.unwrap();
        let identitaet = service.identitaet_aufloesen(&credential).await.unwrap();
        assert_eq!(identitaet.id, konto.id);
    }

    #[tokio::test]
    async fn anmelden_unbekannte_email() {
        let (service, _) = test_service();
        let ergebnis = service.anmelden("niemand@x.com", "passwort").await;
        assert!(matches!(ergebnis, Err(AuthError::NichtGefunden(_))));
    }

    #[tokio::test]
    async fn geloeschtes_konto_ist_nicht_angemeldet() {
        let (service, _) = test_service();

        let (konto, credential) = service
            .registrieren("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();

        service.loeschen(konto.id).await.unwrap();

        // Credential ist kryptografisch noch gueltig, aber das Konto fehlt
        let ergebnis = service.identitaet_aufloesen(&credential).await;
        assert!(matches!(ergebnis, Err(AuthError::NichtAngemeldet)));
    }

    #[tokio::test]
    async fn verifikations_fluss() {
        let (service, mail) = test_service();

        let (konto, _) = service
            .registrieren("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();

        service.email_verifikation_anfordern(konto.id).await.unwrap();

        let (an, betreff, html) = mail.letzte().expect("Mail sollte verschickt sein");
        assert_eq!(an, "ann@x.com");
        assert!(betreff.contains("Verifikation"));

        let roh_token = token_aus_mail(&html, "/verify-user/");
        let identitaet = service.email_verifizieren(&roh_token).await.unwrap();
        assert!(identitaet.ist_verifiziert);

        // Token ist verbraucht
        let nochmal = service.email_verifizieren(&roh_token).await;
        assert!(matches!(
            nochmal,
            Err(AuthError::TokenUngueltigOderAbgelaufen)
        ));
    }

    #[tokio::test]
    async fn verifikation_fuer_verifiziertes_konto_abgelehnt() {
        let (service, mail) = test_service();

        let (konto, _) = service
            .registrieren("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();

        service.email_verifikation_anfordern(konto.id).await.unwrap();
        let (_, _, html) = mail.letzte().unwrap();
        let roh_token = token_aus_mail(&html, "/verify-user/");

        service.email_verifizieren(&roh_token).await.unwrap();

        // Erneutes Anfordern nach erfolgter Verifikation
        let ergebnis = service.email_verifikation_anfordern(konto.id).await;
        assert!(matches!(ergebnis, Err(AuthError::Validierung(_))));
    }

    #[tokio::test]
    async fn reset_fluss() {
        let (service, mail) = test_service();

        service
            .registrieren("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();

        service.passwort_vergessen("ann@x.com").await.unwrap();
        let (_, betreff, html) = mail.letzte().unwrap();
        assert!(betreff.contains("Passwort"));

        let roh_token = token_aus_mail(&html, "/reset-password/");
        service
            .passwort_zuruecksetzen(&roh_token, "neues_passwort")
            .await
            .unwrap();

        // Altes Passwort funktioniert nicht mehr, neues schon
        let alt = service.anmelden("ann@x.com", "secret1").await;
        assert!(matches!(alt, Err(AuthError::UngueltigeAnmeldedaten)));
        service.anmelden("ann@x.com", "neues_passwort").await.unwrap();
    }

    #[tokio::test]
    async fn zweiter_reset_verdraengt_ersten() {
        let (service, mail) = test_service();

        let (konto, _) = service
            .registrieren("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();

        service.passwort_vergessen("ann@x.com").await.unwrap();
        let (_, _, html) = mail.letzte().unwrap();
        let erster = token_aus_mail(&html, "/reset-password/");

        service.passwort_vergessen("ann@x.com").await.unwrap();
        let (_, _, html) = mail.letzte().unwrap();
        let zweiter = token_aus_mail(&html, "/reset-password/");

        let ergebnis = service.passwort_zuruecksetzen(&erster, "egal").await;
        assert!(matches!(
            ergebnis,
            Err(AuthError::TokenUngueltigOderAbgelaufen)
        ));

        service.passwort_zuruecksetzen(&zweiter, "neu").await.unwrap();
        let (angemeldet, _) = service.anmelden("ann@x.com", "neu").await.unwrap();
        assert_eq!(angemeldet.id, konto.id);
    }

    #[tokio::test]
    async fn reset_fuer_unbekannte_email() {
        let (service, _) = test_service();
        let ergebnis = service.passwort_vergessen("niemand@x.com").await;
        assert!(matches!(ergebnis, Err(AuthError::NichtGefunden(_))));
    }

    #[tokio::test]
    async fn mail_fehler_wird_interner_fehler() {
        let verzeichnis = Arc::new(KontoVerzeichnis::neu(Arc::new(TestKontoRepo::default())));
        let ledger = Arc::new(ActionTokenLedger::neu(
            Arc::new(TestTokenRepo::default()),
            Arc::new(SystemUhr),
        ));
        let schluessel = Arc::new(SessionSchluessel::neu("test_geheimnis").unwrap());

        let service = AuthService::neu(
            verzeichnis,
            ledger,
            schluessel,
            Arc::new(FehlerMailVersand),
            "https://app.example.com".into(),
        );

        let (konto, _) = service
            .registrieren("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();

        let ergebnis = service.email_verifikation_anfordern(konto.id).await;
        assert!(matches!(ergebnis, Err(AuthError::Intern(_))));
    }

    #[tokio::test]
    async fn profil_delegation_liefert_identitaet() {
        let (service, _) = test_service();

        let (konto, _) = service
            .registrieren("Ann", "ann@x.com", "secret1")
            .await
            .unwrap();

        let identitaet = service
            .profil_aktualisieren(
                konto.id,
                ProfilUpdate {
                    bio: Some("Neue Bio".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(identitaet.bio, "Neue Bio");
    }

    #[tokio::test]
    async fn alle_listen_ohne_hash() {
        let (service, _) = test_service();

        service.registrieren("Ann", "ann@x.com", "secret1").await.unwrap();
        service.registrieren("Ben", "ben@x.com", "secret2").await.unwrap();

        let alle = service.alle_listen().await.unwrap();
        assert_eq!(alle.len(), 2);
        assert_eq!(alle[0].name, "Ann");
    }
}
