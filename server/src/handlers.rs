//! REST-Handler fuer die Auth-API
//!
//! Die Handler sind duenne Uebersetzer zwischen HTTP und dem
//! AuthService: Bearer-Token aus den Headern ziehen, Gate pruefen,
//! Service rufen, Fehler auf Statuscodes abbilden. Antworten enthalten
//! nie den Passwort-Hash.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use bouncer_auth::{gate, AuthError, Identitaet, MailTransport, ProfilUpdate};

use crate::AppState;

// ---------------------------------------------------------------------------
// Hilfsfunktionen
// ---------------------------------------------------------------------------

/// Extrahiert den Bearer-Token aus dem Authorization-Header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

/// HTTP-Statuscode fuer einen Engine-Fehler
pub fn http_status(fehler: &AuthError) -> StatusCode {
    match fehler {
        AuthError::Validierung(_) => StatusCode::BAD_REQUEST,
        AuthError::Konflikt(_) => StatusCode::CONFLICT,
        AuthError::NichtGefunden(_) => StatusCode::NOT_FOUND,
        AuthError::UngueltigeAnmeldedaten | AuthError::NichtAngemeldet => StatusCode::UNAUTHORIZED,
        AuthError::ZugriffVerweigert(_) => StatusCode::FORBIDDEN,
        AuthError::TokenUngueltigOderAbgelaufen => StatusCode::BAD_REQUEST,
        AuthError::PasswortHashing(_) | AuthError::Datenbank(_) | AuthError::Intern(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Baut die JSON-Fehlerantwort
///
/// Interne Fehler werden geloggt und ohne Detail beantwortet;
/// Aufruferfehler tragen ihre Meldung.
pub fn fehler_antwort(fehler: AuthError) -> Response {
    let status = http_status(&fehler);
    let nachricht = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(fehler = %fehler, "Interner Fehler in der Auth-API");
        "Interner Fehler".to_string()
    } else {
        fehler.to_string()
    };

    (
        status,
        Json(json!({
            "error": {
                "code": status.as_u16(),
                "message": nachricht
            }
        })),
    )
        .into_response()
}

/// Loest die angemeldete Identitaet aus den Request-Headern auf
///
/// Fehlendes Credential und fehlgeschlagene Aufloesung ergeben beide
/// eine 401-Antwort.
async fn identitaet_aus_headers(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Identitaet, Response> {
    let Some(credential) = bearer_token(headers) else {
        return Err(fehler_antwort(AuthError::NichtAngemeldet));
    };

    state
        .service
        .identitaet_aufloesen(credential)
        .await
        .map_err(fehler_antwort)
}

// ---------------------------------------------------------------------------
// Request-DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RegistrierenBody {
    pub name: String,
    pub email: String,
    pub passwort: String,
}

#[derive(Debug, Deserialize)]
pub struct AnmeldenBody {
    pub email: String,
    pub passwort: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfilBody {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswortAendernBody {
    pub aktuelles_passwort: String,
    pub neues_passwort: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswortVergessenBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswortResetBody {
    pub passwort: String,
}

// ---------------------------------------------------------------------------
// Oeffentliche Endpunkte
// ---------------------------------------------------------------------------

pub async fn registrieren(
    State(state): State<AppState>,
    Json(body): Json<RegistrierenBody>,
) -> Response {
    match state
        .service
        .registrieren(&body.name, &body.email, &body.passwort)
        .await
    {
        Ok((konto, credential)) => (
            StatusCode::CREATED,
            Json(json!({
                "konto": Identitaet::from(konto),
                "token": credential
            })),
        )
            .into_response(),
        Err(e) => fehler_antwort(e),
    }
}

pub async fn anmelden(State(state): State<AppState>, Json(body): Json<AnmeldenBody>) -> Response {
    match state.service.anmelden(&body.email, &body.passwort).await {
        Ok((konto, credential)) => (
            StatusCode::OK,
            Json(json!({
                "konto": Identitaet::from(konto),
                "token": credential
            })),
        )
            .into_response(),
        Err(e) => fehler_antwort(e),
    }
}

/// Abmelden ist clientseitig: der Server haelt keinen Session-Zustand,
/// der Client verwirft das Credential
pub async fn abmelden() -> Response {
    (
        StatusCode::OK,
        Json(json!({ "message": "Abgemeldet" })),
    )
        .into_response()
}

/// Prueft nur die kryptografische Gueltigkeit des Credentials
pub async fn anmelde_status(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(credential) = bearer_token(&headers) else {
        return (StatusCode::UNAUTHORIZED, Json(json!(false))).into_response();
    };

    match state.service.credential_pruefen(credential) {
        Ok(_) => (StatusCode::OK, Json(json!(true))).into_response(),
        Err(_) => (StatusCode::UNAUTHORIZED, Json(json!(false))).into_response(),
    }
}

pub async fn konto_verifizieren(
    State(state): State<AppState>,
    Path(roh_token): Path<String>,
) -> Response {
    match state.service.email_verifizieren(&roh_token).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "message": "Konto verifiziert" })),
        )
            .into_response(),
        Err(e) => fehler_antwort(e),
    }
}

pub async fn passwort_vergessen(
    State(state): State<AppState>,
    Json(body): Json<PasswortVergessenBody>,
) -> Response {
    match state.service.passwort_vergessen(&body.email).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "E-Mail gesendet" })),
        )
            .into_response(),
        Err(e) => fehler_antwort(e),
    }
}

pub async fn passwort_zuruecksetzen(
    State(state): State<AppState>,
    Path(roh_token): Path<String>,
    Json(body): Json<PasswortResetBody>,
) -> Response {
    match state
        .service
        .passwort_zuruecksetzen(&roh_token, &body.passwort)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Passwort zurueckgesetzt" })),
        )
            .into_response(),
        Err(e) => fehler_antwort(e),
    }
}

// ---------------------------------------------------------------------------
// Geschuetzte Endpunkte
// ---------------------------------------------------------------------------

pub async fn konto_laden(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let identitaet = match identitaet_aus_headers(&state, &headers).await {
        Ok(i) => i,
        Err(r) => return r,
    };

    (StatusCode::OK, Json(identitaet)).into_response()
}

pub async fn profil_aktualisieren(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ProfilBody>,
) -> Response {
    let identitaet = match identitaet_aus_headers(&state, &headers).await {
        Ok(i) => i,
        Err(r) => return r,
    };

    match state
        .service
        .profil_aktualisieren(
            identitaet.id,
            ProfilUpdate {
                name: body.name,
                bio: body.bio,
                photo: body.photo,
            },
        )
        .await
    {
        Ok(aktualisiert) => (StatusCode::OK, Json(aktualisiert)).into_response(),
        Err(e) => fehler_antwort(e),
    }
}

pub async fn passwort_aendern(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<PasswortAendernBody>,
) -> Response {
    let identitaet = match identitaet_aus_headers(&state, &headers).await {
        Ok(i) => i,
        Err(r) => return r,
    };

    match state
        .service
        .passwort_aendern(identitaet.id, &body.aktuelles_passwort, &body.neues_passwort)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Passwort geaendert" })),
        )
            .into_response(),
        Err(e) => fehler_antwort(e),
    }
}

pub async fn verifikation_anfordern(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let identitaet = match identitaet_aus_headers(&state, &headers).await {
        Ok(i) => i,
        Err(r) => return r,
    };

    match state.service.email_verifikation_anfordern(identitaet.id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "E-Mail gesendet" })),
        )
            .into_response(),
        Err(e) => fehler_antwort(e),
    }
}

// ---------------------------------------------------------------------------
// Admin-Endpunkte
// ---------------------------------------------------------------------------

pub async fn konto_loeschen(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let identitaet = match identitaet_aus_headers(&state, &headers).await {
        Ok(i) => i,
        Err(r) => return r,
    };
    if let Err(e) = gate::admin_erfordern(&identitaet) {
        return fehler_antwort(e);
    }

    match state.service.loeschen(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Konto geloescht" })),
        )
            .into_response(),
        Err(e) => fehler_antwort(e),
    }
}

pub async fn konten_listen(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let identitaet = match identitaet_aus_headers(&state, &headers).await {
        Ok(i) => i,
        Err(r) => return r,
    };
    if let Err(e) = gate::creator_erfordern(&identitaet) {
        return fehler_antwort(e);
    }

    match state.service.alle_listen().await {
        Ok(konten) if konten.is_empty() => {
            fehler_antwort(AuthError::NichtGefunden("Keine Konten".into()))
        }
        Ok(konten) => (StatusCode::OK, Json(konten)).into_response(),
        Err(e) => fehler_antwort(e),
    }
}

/// GET /health – Health-Check-Endpunkt
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

// ---------------------------------------------------------------------------
// Mail-Transport
// ---------------------------------------------------------------------------

/// Mail-Transport der Nachrichten nur ins Log schreibt
///
/// Platzhalter fuer einen echten SMTP-Transport; der Link selbst landet
/// nur auf Debug-Level im Log.
pub struct LogMailVersand;

impl MailTransport for LogMailVersand {
    async fn senden(&self, an: &str, betreff: &str, html: &str) -> bouncer_auth::AuthResult<()> {
        tracing::info!(an = %an, betreff = %betreff, "Mail wird verschickt (Log-Transport)");
        tracing::debug!(html = %html, "Mail-Inhalt");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_extrahieren() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_static("Bearer mein_token_123"),
        );
        assert_eq!(bearer_token(&headers), Some("mein_token_123"));
    }

    #[test]
    fn bearer_token_fehlt() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        let mut falsch = HeaderMap::new();
        falsch.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&falsch), None);
    }

    #[test]
    fn status_abbildung() {
        assert_eq!(
            http_status(&AuthError::Validierung("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            http_status(&AuthError::Konflikt("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            http_status(&AuthError::NichtGefunden("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            http_status(&AuthError::UngueltigeAnmeldedaten),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            http_status(&AuthError::NichtAngemeldet),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            http_status(&AuthError::ZugriffVerweigert("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            http_status(&AuthError::TokenUngueltigOderAbgelaufen),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            http_status(&AuthError::Intern("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
