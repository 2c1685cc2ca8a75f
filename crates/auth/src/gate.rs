//! Zugriffspruefung
//!
//! Zustandslose Entscheidungsfunktionen ueber einer aufgeloesten
//! Identitaet. Die Pruefungen bilden eine geordnete Kette: erst
//! Anmeldung, dann Rolle bzw. Verifikationsstatus. Jede Stufe bricht
//! mit ihrem eigenen Fehler ab, nie mit einem generischen.

use bouncer_db::models::Rolle;

use crate::error::{AuthError, AuthResult};
use crate::session::Identitaet;

/// Erfordert eine angemeldete Identitaet
pub fn angemeldet_erfordern(identitaet: Option<&Identitaet>) -> AuthResult<&Identitaet> {
    identitaet.ok_or(AuthError::NichtAngemeldet)
}

/// Erfordert eine der angegebenen Rollen
pub fn rolle_erfordern(identitaet: &Identitaet, erlaubte: &[Rolle]) -> AuthResult<()> {
    if erlaubte.contains(&identitaet.rolle) {
        Ok(())
    } else {
        Err(AuthError::ZugriffVerweigert(format!(
            "Rolle '{}' nicht ausreichend",
            identitaet.rolle
        )))
    }
}

/// Erfordert die Admin-Rolle
pub fn admin_erfordern(identitaet: &Identitaet) -> AuthResult<()> {
    rolle_erfordern(identitaet, &[Rolle::Admin])
}

/// Erfordert Creator oder Admin
///
/// Admin ist hier bewusst explizit aufgefuehrt; es gibt keine
/// implizite Rollen-Hierarchie.
pub fn creator_erfordern(identitaet: &Identitaet) -> AuthResult<()> {
    rolle_erfordern(identitaet, &[Rolle::Creator, Rolle::Admin])
}

/// Erfordert ein verifiziertes Konto
pub fn verifiziert_erfordern(identitaet: &Identitaet) -> AuthResult<()> {
    if identitaet.ist_verifiziert {
        Ok(())
    } else {
        Err(AuthError::ZugriffVerweigert(
            "E-Mail-Adresse nicht verifiziert".into(),
        ))
    }
}
