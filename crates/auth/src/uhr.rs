//! Injizierbare Zeitquelle
//!
//! Die gesamte Ablauf-Logik der Engine fragt die Zeit ueber diesen Trait
//! ab, damit Tests ohne Wanduhr und ohne Sleeps auskommen.

use chrono::{DateTime, Utc};

/// Zeitquelle fuer Ablauf-Entscheidungen
pub trait Uhr: Send + Sync {
    fn jetzt(&self) -> DateTime<Utc>;
}

/// Systemuhr (Produktionsbetrieb)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemUhr;

impl Uhr for SystemUhr {
    fn jetzt(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
