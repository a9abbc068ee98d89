use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle of a remote command. Stored and serialized as the lowercase
/// wire strings agents already speak ("pending", "running", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CommandStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl CommandStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, CommandStatus::Completed | CommandStatus::Failed)
    }

    /// Position in the pending -> running -> terminal progression. Used to
    /// reject backward transitions.
    pub fn rank(self) -> u8 {
        match self {
            CommandStatus::Pending => 0,
            CommandStatus::Running => 1,
            CommandStatus::Completed | CommandStatus::Failed => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommandStatus::Pending => "pending",
            CommandStatus::Running => "running",
            CommandStatus::Completed => "completed",
            CommandStatus::Failed => "failed",
        }
    }
}

/// A queued remote command. `completed_at` is set iff the status is
/// terminal; the row is only ever mutated through the status update path.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RemoteCommand {
    pub id: String,
    pub device_id: String,
    pub command: String,
    pub status: CommandStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<String>,
    pub exit_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommand {
    pub command: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCommandStatus {
    pub status: CommandStatus,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub exit_code: Option<i64>,
}
