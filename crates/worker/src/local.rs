//! In-process execution backend.
//!
//! [`LocalJobQueue`] implements the `JobQueue` boundary without a broker:
//! submission spawns the handler on a blocking thread and the job's
//! authoritative state lives in an in-memory map keyed by the generated
//! job identifier. Used for local/dev deployments and tests; production
//! deployments point the gateway at a remote queue service instead.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;
use zeus_core::job::RemoteJobState;
use zeus_queue::{JobQueue, QueueError};

use crate::registry::{ScriptHandler, ScriptRegistry};

/// Local [`JobQueue`] backed by the script registry.
pub struct LocalJobQueue {
    registry: Arc<ScriptRegistry>,
    states: Arc<RwLock<HashMap<String, RemoteJobState>>>,
}

impl LocalJobQueue {
    pub fn new(registry: Arc<ScriptRegistry>) -> Self {
        Self {
            registry,
            states: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn resolve_handler(
        &self,
        module_name: &str,
        script_name: Option<&str>,
    ) -> Result<ScriptHandler, QueueError> {
        let handler = match script_name {
            Some(script) => self.registry.handler(module_name, script),
            None => self.registry.module_handler(module_name),
        };
        handler.ok_or_else(|| match script_name {
            Some(script) => {
                QueueError::Protocol(format!("no handler for script {module_name}.{script}"))
            }
            None => QueueError::Protocol(format!("no handler for module {module_name}")),
        })
    }
}

#[async_trait]
impl JobQueue for LocalJobQueue {
    async fn submit(
        &self,
        module_name: &str,
        script_name: Option<&str>,
        parameters: &serde_json::Value,
    ) -> Result<String, QueueError> {
        // Resolved before anything is recorded: an unknown target fails the
        // submission instead of producing a job that can only fail later.
        let handler = self.resolve_handler(module_name, script_name)?;

        let external_id = Uuid::new_v4().to_string();
        self.states
            .write()
            .await
            .insert(external_id.clone(), RemoteJobState::Pending);

        let states = Arc::clone(&self.states);
        let id = external_id.clone();
        let params = parameters.clone();
        tokio::spawn(async move {
            states
                .write()
                .await
                .insert(id.clone(), RemoteJobState::Running);

            let outcome = tokio::task::spawn_blocking(move || handler(&params)).await;

            let final_state = match outcome {
                Ok(Ok(result)) => RemoteJobState::Succeeded { result },
                Ok(Err(error)) => {
                    tracing::warn!(job_id = %id, error = %error, "Script handler failed");
                    RemoteJobState::Failed { error }
                }
                Err(join_err) => {
                    tracing::error!(job_id = %id, error = %join_err, "Script handler panicked");
                    RemoteJobState::Failed {
                        error: format!("script execution aborted: {join_err}"),
                    }
                }
            };
            states.write().await.insert(id, final_state);
        });

        Ok(external_id)
    }

    async fn status(&self, external_id: &str) -> Result<Option<RemoteJobState>, QueueError> {
        Ok(self.states.read().await.get(external_id).cloned())
    }
}
