//! Route-Definitionen fuer die Auth-API (/api/v1/...)
//!
//! Alle Komponenten werden hier statisch registriert; es gibt keine
//! dynamische Handler-Erkennung.

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::{handlers, AppState};

/// Erstellt den vollstaendigen /api/v1-Router
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Registrierung & Anmeldung
        .route("/api/v1/register", post(handlers::registrieren))
        .route("/api/v1/login", post(handlers::anmelden))
        .route("/api/v1/logout", post(handlers::abmelden))
        .route("/api/v1/login-status", get(handlers::anmelde_status))
        // Konto-Verwaltung (geschuetzt)
        .route("/api/v1/user", get(handlers::konto_laden))
        .route("/api/v1/user", patch(handlers::profil_aktualisieren))
        .route("/api/v1/change-password", patch(handlers::passwort_aendern))
        // E-Mail-Verifikation
        .route("/api/v1/verify-email", post(handlers::verifikation_anfordern))
        .route(
            "/api/v1/verify-user/:roh_token",
            post(handlers::konto_verifizieren),
        )
        // Passwort-Reset
        .route("/api/v1/forgot-password", post(handlers::passwort_vergessen))
        .route(
            "/api/v1/reset-password/:roh_token",
            post(handlers::passwort_zuruecksetzen),
        )
        // Admin
        .route("/api/v1/admin/users", get(handlers::konten_listen))
        .route("/api/v1/admin/users/:id", delete(handlers::konto_loeschen))
        // Health
        .route("/health", get(handlers::health))
}
