use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A monitored edge device. `is_online` is a cached derivation of
/// `last_seen`: registration and every successful telemetry write set it
/// true, and the liveness sweep run from the device-list path corrects it
/// back to false once `last_seen` falls outside the liveness window.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub device_type: String,
    pub os: String,
    pub ip: String,
    pub mac: String,
    pub location: String,
    pub current_user: String,
    pub last_seen: DateTime<Utc>,
    pub is_online: bool,
}

/// Registration payload sent by agents. Everything except `id` may be
/// omitted by older agents; missing values are stored as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterDevice {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub current_user: String,
}
