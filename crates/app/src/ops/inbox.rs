use std::path::PathBuf;

use clap::Args;
use common::messaging::decrypt_inbox;
use common::node::GetMessagesResponse;

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Inbox {
    /// Saved get-messages response from the node, as JSON
    pub file: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum InboxOpError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Inbox {
    type Error = InboxOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let identity = ctx.identity()?;
        let raw = tokio::fs::read_to_string(&self.file)
            .await
            .map_err(|source| InboxOpError::Read {
                path: self.file.clone(),
                source,
            })?;
        let response: GetMessagesResponse = serde_json::from_str(&raw)?;

        let report = decrypt_inbox(identity.secret_key(), &response);

        let mut lines = Vec::with_capacity(report.messages.len() + 1);
        for message in &report.messages {
            lines.push(serde_json::to_string(message)?);
        }
        lines.push(format!(
            "decrypted: {}, skipped: {}, ignored: {}",
            report.messages.len(),
            report.skipped,
            report.ignored
        ));

        Ok(lines.join("\n"))
    }
}
