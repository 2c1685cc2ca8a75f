//! Mail-Konstruktion fuer Verifikation und Passwort-Reset
//!
//! Die Engine baut nur den Link und den Nachrichtentext; Zustellung,
//! Wiederholungen und SMTP sind Sache des Transports dahinter.

use crate::error::AuthResult;

/// Transport-Schnittstelle fuer ausgehende Mails
#[allow(async_fn_in_trait)]
pub trait MailTransport: Send + Sync {
    async fn senden(&self, an: &str, betreff: &str, html: &str) -> AuthResult<()>;
}

/// Eine fertig aufgebaute Mail
#[derive(Debug, Clone)]
pub struct Mail {
    pub betreff: String,
    pub html: String,
}

/// Baut den Verifikations-Link: `{client_url}/verify-user/{roh_token}`
pub fn verifikations_link(client_url: &str, roh_token: &str) -> String {
    format!("{}/verify-user/{}", client_url.trim_end_matches('/'), roh_token)
}

/// Baut den Reset-Link: `{client_url}/reset-password/{roh_token}`
pub fn reset_link(client_url: &str, roh_token: &str) -> String {
    format!(
        "{}/reset-password/{}",
        client_url.trim_end_matches('/'),
        roh_token
    )
}

/// Baut die Verifikations-Mail fuer einen Empfaenger
pub fn verifikations_mail(name: &str, link: &str) -> Mail {
    Mail {
        betreff: "E-Mail-Verifikation - Bouncer".into(),
        html: format!(
            "<h1>Hallo, {name}!</h1>\
             <p>Danke, dass du Bouncer als Anmeldedienst nutzt. Hier ist dein Verifikations-Link:</p>\
             <p><a href=\"{link}\">{link}</a></p>"
        ),
    }
}

/// Baut die Passwort-Reset-Mail
pub fn reset_mail(link: &str) -> Mail {
    Mail {
        betreff: "Passwort zuruecksetzen - Bouncer".into(),
        html: format!(
            "<h1>Hallo!</h1>\
             <p>Hier ist dein Link zum Zuruecksetzen des Passworts:</p>\
             <p><a href=\"{link}\">{link}</a></p>"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_enthalten_den_rohwert() {
        let link = verifikations_link("https://app.example.com", "roh123");
        assert_eq!(link, "https://app.example.com/verify-user/roh123");

        let link = reset_link("https://app.example.com/", "roh456");
        assert_eq!(link, "https://app.example.com/reset-password/roh456");
    }

    #[test]
    fn verifikations_mail_enthaelt_name_und_link() {
        let mail = verifikations_mail("Ann", "https://app.example.com/verify-user/xyz");
        assert!(mail.betreff.contains("Verifikation"));
        assert!(mail.html.contains("Ann"));
        assert!(mail.html.contains("verify-user/xyz"));
    }

    #[test]
    fn reset_mail_enthaelt_link() {
        let mail = reset_mail("https://app.example.com/reset-password/xyz");
        assert!(mail.betreff.contains("Passwort"));
        assert!(mail.html.contains("reset-password/xyz"));
    }
}
