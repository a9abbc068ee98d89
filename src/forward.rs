use crate::models::commands::RemoteCommand;
use crate::models::config::ForwardConfig;
use crate::transport::RetryClient;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Best-effort forwarding of accepted commands to the edge tier. Each
/// command gets its own fire-and-forget task, bounded by a semaphore so a
/// slow edge endpoint cannot pile up unbounded work. Outcomes are logged
/// and swallowed: the command row has already been persisted and the HTTP
/// response already returned by the time any of this runs.
#[derive(Clone)]
pub struct CommandForwarder {
    client: RetryClient,
    endpoint: String,
    permits: Arc<Semaphore>,
}

impl CommandForwarder {
    pub fn new(cfg: &ForwardConfig, endpoint: String) -> Result<Self> {
        let client = RetryClient::new(
            cfg.max_retries,
            cfg.base_delay,
            cfg.max_delay,
            cfg.request_timeout,
        )?;

        Ok(Self {
            client,
            endpoint,
            permits: Arc::new(Semaphore::new(cfg.concurrency)),
        })
    }

    /// Spawns the forward task and returns immediately. The task is not
    /// tied to the originating request; an aborted request does not cancel
    /// an in-flight forward.
    pub fn spawn_forward(&self, command: RemoteCommand) {
        let this = self.clone();
        tokio::spawn(async move {
            // Closed semaphores never happen here; the permit just bounds
            // in-flight forwards.
            let _permit = match this.permits.acquire().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            match this.client.post_json(&this.endpoint, &command).await {
                Ok(resp) if resp.status().is_success() => {
                    debug!("command {} forwarded to edge tier", command.id);
                }
                Ok(resp) => {
                    warn!(
                        "edge tier rejected command {} for device {}: {}",
                        command.id,
                        command.device_id,
                        resp.status()
                    );
                }
                Err(e) => {
                    warn!(
                        "giving up forwarding command {} for device {}: {e:#}",
                        command.id, command.device_id
                    );
                }
            }
        });
    }
}
