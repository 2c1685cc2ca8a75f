//! Bouncer Server – Bootstrap und HTTP-Oberflaeche
//!
//! Verdrahtet Datenbank, Engine und REST-Router und startet den
//! Axum-Server.

pub mod config;
pub mod handlers;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use bouncer_auth::{
    ActionTokenLedger, AuthService, KontoVerzeichnis, SessionSchluessel, SystemUhr,
};
use bouncer_db::{DatabaseConfig, SqliteDb};

use crate::config::ServerConfig;
use crate::handlers::LogMailVersand;

/// Intervall fuer die Bereinigung abgelaufener Action-Tokens: 1 Stunde
const TOKEN_CLEANUP_INTERVALL: Duration = Duration::from_secs(60 * 60);

/// Konkreter Service-Typ des Servers
pub type Service = AuthService<SqliteDb, SqliteDb, LogMailVersand>;

/// Axum-State der Auth-API
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
}

/// Bouncer-Server
pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Server: Datenbank oeffnen, Services bauen, lauschen
    pub async fn starten(self) -> Result<()> {
        let db = Arc::new(
            SqliteDb::oeffnen(&DatabaseConfig {
                url: self.config.datenbank.url.clone(),
                max_verbindungen: self.config.datenbank.max_verbindungen,
                sqlite_wal: true,
            })
            .await
            .context("Datenbank konnte nicht geoeffnet werden")?,
        );

        let schluessel = Arc::new(
            SessionSchluessel::mit_gueltigkeit(
                &self.config.auth.session_geheimnis,
                chrono::Duration::days(self.config.auth.session_gueltigkeit_tage),
            )
            .context("Session-Geheimnis fehlt oder ist ungueltig")?,
        );

        let verzeichnis = Arc::new(KontoVerzeichnis::neu(Arc::clone(&db)));
        let ledger = Arc::new(ActionTokenLedger::neu(
            Arc::clone(&db),
            Arc::new(SystemUhr),
        ));

        let service = Arc::new(AuthService::neu(
            verzeichnis,
            ledger,
            schluessel,
            Arc::new(LogMailVersand),
            self.config.mail.client_url.clone(),
        ));

        token_cleanup_starten(Arc::clone(&service));

        let state = AppState { service };

        let app = routes::api_router()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&self.config.netzwerk.cors_origins))
            .with_state(state);

        let adresse = self.config.api_bind_adresse();
        let listener = tokio::net::TcpListener::bind(&adresse)
            .await
            .with_context(|| format!("Bind auf {adresse} fehlgeschlagen"))?;

        tracing::info!(adresse = %adresse, name = %self.config.server.name, "Auth-Server gestartet");

        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// CORS konfigurieren: entweder spezifische Origins oder Any
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(tower_http::cors::Any)
    }
}

/// Startet den Hintergrund-Task der abgelaufene Action-Tokens bereinigt
fn token_cleanup_starten(service: Arc<Service>) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(TOKEN_CLEANUP_INTERVALL).await;
            match service.tokens_bereinigen().await {
                Ok(entfernt) if entfernt > 0 => {
                    tracing::debug!(anzahl = entfernt, "Abgelaufene Action-Tokens bereinigt");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(fehler = %e, "Token-Bereinigung fehlgeschlagen");
                }
            }
        }
    });
}
