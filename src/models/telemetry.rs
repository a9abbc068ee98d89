use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Point-in-time resource usage sample. Append-only; the server stamps the
/// timestamp at write time and ignores anything the agent sends.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DeviceMetric {
    pub id: i64,
    pub device_id: String,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub network_in: f64,
    pub network_out: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDeviceMetric {
    #[serde(default)]
    pub cpu_usage: f64,
    #[serde(default)]
    pub memory_usage: f64,
    #[serde(default)]
    pub disk_usage: f64,
    #[serde(default)]
    pub network_in: f64,
    #[serde(default)]
    pub network_out: f64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DeviceActivity {
    pub id: i64,
    pub device_id: String,
    pub activity_type: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDeviceActivity {
    #[serde(default)]
    pub activity_type: String,
    #[serde(default)]
    pub description: String,
}

/// One row of the current process snapshot for a device. The whole set for
/// a device is replaced in a single transaction on every report; rows from
/// different reports never coexist.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DeviceProcess {
    pub id: i64,
    pub device_id: String,
    pub pid: i64,
    pub name: String,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDeviceProcess {
    #[serde(default)]
    pub pid: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cpu_usage: f64,
    #[serde(default)]
    pub memory_usage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DeviceAlert {
    pub id: i64,
    pub device_id: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDeviceAlert {
    pub severity: AlertSeverity,
    #[serde(default)]
    pub message: String,
}

/// Metadata row for a captured screenshot. The image itself lives in the
/// external blob store; listing attaches a presigned URL per row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Screenshot {
    pub id: i64,
    pub device_id: String,
    pub object_key: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreenshotView {
    #[serde(flatten)]
    pub screenshot: Screenshot,
    pub url: String,
}
