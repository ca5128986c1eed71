use std::sync::Arc;

use crate::services::memory::{ConversationMemory, Turn};
use crate::services::provider::{ChatProvider, ProviderError};

/// Bridges an application chat request to the external model call.
///
/// Built once at startup and shared by every request; holds the fixed
/// system instruction and the injected provider/memory collaborators.
pub struct ChatAdapter {
    system_prompt: String,
    provider: Arc<dyn ChatProvider>,
    memory: Arc<dyn ConversationMemory>,
}

impl ChatAdapter {
    pub fn new(
        system_prompt: impl Into<String>,
        provider: Arc<dyn ChatProvider>,
        memory: Arc<dyn ConversationMemory>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            provider,
            memory,
        }
    }

    /// Generate a reply for one user message on the given thread.
    ///
    /// History is read before the call and extended only after the provider
    /// succeeds, so a failed call leaves the thread untouched.
    pub async fn reply(
        &self,
        thread_id: &str,
        user_message: &str,
    ) -> Result<String, ProviderError> {
        let mut turns = self.memory.history(thread_id).await;
        turns.push(Turn::user(user_message));

        let reply = self.provider.complete(&self.system_prompt, &turns).await?;

        self.memory.append(thread_id, Turn::user(user_message)).await;
        self.memory
            .append(thread_id, Turn::assistant(reply.clone()))
            .await;

        Ok(reply)
    }
}
