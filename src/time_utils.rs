use chrono::{DateTime, Utc};

/// Retourne le timestamp courant en UTC
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Timestamp courant au format RFC 3339 (format des fichiers d'identite)
pub fn now_rfc3339() -> String {
    now().to_rfc3339()
}

/// Parse un timestamp RFC 3339
pub fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    s.parse::<DateTime<Utc>>()
}
