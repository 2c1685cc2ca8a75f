//! bouncer-auth – Anmeldedaten- und Token-Engine
//!
//! Dieses Crate implementiert:
//! - Passwort-Hashing mit Argon2id
//! - Signierte, zustandslose Session-Credentials (HS256)
//! - Action-Token-Ledger (E-Mail-Verifikation, Passwort-Reset)
//! - Zugriffspruefung (Anmeldung, Rolle, Verifikationsstatus)
//! - Konto-Verzeichnis (Registrierung, Profil, Passwortwechsel)
//! - AuthService (Orchestrierung inkl. Mail-Konstruktion)
//!
//! Die Engine ist transportfrei: HTTP, Cookies und SMTP leben in den
//! Schichten darueber.

pub mod error;
pub mod gate;
pub mod ledger;
pub mod mail;
pub mod password;
pub mod service;
pub mod session;
pub mod uhr;
pub mod verzeichnis;

#[cfg(test)]
pub(crate) mod testutil;

// Bequeme Re-Exporte
pub use error::{AuthError, AuthResult};
pub use ledger::ActionTokenLedger;
pub use mail::MailTransport;
pub use password::{passwort_hashen, passwort_verifizieren};
pub use service::AuthService;
pub use session::{Identitaet, SessionSchluessel};
pub use uhr::{SystemUhr, Uhr};
pub use verzeichnis::{KontoVerzeichnis, ProfilUpdate};
