use crate::traits::EngineSession;

/// Scoped ownership of one engine session.
///
/// The session must be released exactly once whether the request finishes,
/// fails upstream, or the client disconnects mid-stream. The happy and
/// error paths call [`SessionGuard::close`]; if the response stream is
/// dropped before either runs, `Drop` spawns the close instead.
pub struct SessionGuard {
    session: Option<Box<dyn EngineSession>>,
}

impl SessionGuard {
    pub fn new(session: Box<dyn EngineSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Start the run on the guarded session.
    pub async fn run(
        &mut self,
        question: &str,
        collection_names: &[String],
    ) -> anyhow::Result<crate::traits::RawEventStream> {
        match self.session.as_mut() {
            Some(session) => session.run(question, collection_names).await,
            None => Err(anyhow::anyhow!("Engine session already closed")),
        }
    }

    /// Release the session now. Subsequent calls and the `Drop` impl
    /// become no-ops.
    pub async fn close(&mut self) {
        if let Some(session) = self.session.take() {
            let query_id = session.query_id().to_string();
            if let Err(e) = session.close().await {
                tracing::warn!("Failed to close engine session {}: {}", query_id, e);
            }
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            // Dropped mid-stream (client disconnect); finish the release
            // off-task since Drop cannot await.
            tokio::spawn(async move {
                let query_id = session.query_id().to_string();
                if let Err(e) = session.close().await {
                    tracing::warn!("Failed to close engine session {}: {}", query_id, e);
                }
            });
        }
    }
}
