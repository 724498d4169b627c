use pctx_core::control::ControlError;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use surrealdb::Connection;
use tracing::error;

use crate::{PromptContextMcp, helpers};

/// Parameters for retrieving prompt fragments.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ContextParams {
    /// Keywords describing the kind of prompt you are looking for.
    pub query: String,
}

/// Tool reply: ranked fragments, or an error object carrying the failure text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextReply {
    Fragments(Vec<String>),
    Error { error: String },
}

impl ContextReply {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl From<Result<Vec<String>, ControlError>> for ContextReply {
    fn from(result: Result<Vec<String>, ControlError>) -> Self {
        match result {
            Ok(fragments) => Self::Fragments(fragments),
            Err(err) => {
                error!("query failed: {err}");
                Self::Error {
                    error: format!("failed to query the prompt collection: {err}"),
                }
            }
        }
    }
}

#[tool_router(router = tool_router_context, vis = "pub")]
impl<C: Connection> PromptContextMcp<C> {
    #[tool(
        description = "Retrieve the prompt fragments most relevant to a query from the prompt collection. Returns a JSON list of up to 20 fragments, most similar first."
    )]
    async fn get_prompt_context(
        &self,
        Parameters(params): Parameters<ContextParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self.control().fetch_context(&params.query).await;
        helpers::reply_result(&ContextReply::from(result))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pctx_core::embedding::{EmbedError, Embedder};
    use pctx_core::services::CollectionHandle;
    use pctx_store::models::Fragment;
    use surrealdb::Surreal;
    use surrealdb::engine::local::{Db, Mem};

    use super::*;

    struct AxisEmbedder;

    impl Embedder for AxisEmbedder {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct BrokenEmbedder;

    impl Embedder for BrokenEmbedder {
        fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Err(EmbedError::Encode("onnx session crashed".to_string()))
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    async fn memory_db(db_name: &str) -> Surreal<Db> {
        let db = Surreal::new::<Mem>(())
            .await
            .expect("failed to create in-memory surrealdb instance");
        db.use_ns("pctx")
            .use_db(db_name)
            .await
            .expect("failed to select surrealdb namespace/db");
        db
    }

    async fn build_server(embedder: Arc<dyn Embedder>) -> PromptContextMcp<Db> {
        let db = memory_db("tools").await;
        for (document, embedding) in [("closest", vec![1.0, 0.1]), ("further", vec![0.0, 1.0])] {
            let record: Option<Fragment> = db
                .create("prompts")
                .content(Fragment::new(document.to_string(), embedding))
                .await
                .expect("seed insert should succeed");
            assert!(record.is_some());
        }
        let handle = CollectionHandle::open(db, "prompts", embedder)
            .await
            .expect("collection should open");
        PromptContextMcp::new(handle)
    }

    fn params(query: &str) -> Parameters<ContextParams> {
        Parameters(ContextParams {
            query: query.to_string(),
        })
    }

    #[test]
    fn fragments_serialize_as_plain_list() {
        let reply = ContextReply::from(Ok(vec!["a".to_string(), "b".to_string()]));
        assert!(!reply.is_error());
        assert_eq!(
            serde_json::to_value(&reply).expect("reply should serialize"),
            serde_json::json!(["a", "b"])
        );
    }

    #[test]
    fn failures_serialize_as_error_object_with_cause() {
        let reply = ContextReply::from(Err(ControlError::Task("runtime shut down".to_string())));
        assert!(reply.is_error());

        let value = serde_json::to_value(&reply).expect("reply should serialize");
        let message = value
            .get("error")
            .and_then(serde_json::Value::as_str)
            .expect("error field should be a string");
        assert!(message.contains("runtime shut down"));
    }

    fn reply_payload(result: &CallToolResult) -> serde_json::Value {
        assert_eq!(result.content.len(), 1);
        let text = &result.content[0]
            .as_text()
            .expect("reply should be text content")
            .text;
        serde_json::from_str(text).expect("reply should be JSON")
    }

    fn error_message(payload: &serde_json::Value) -> &str {
        payload
            .get("error")
            .and_then(serde_json::Value::as_str)
            .expect("error field should be a string")
    }

    #[tokio::test]
    async fn tool_returns_ranked_fragments() {
        let server = build_server(Arc::new(AxisEmbedder)).await;

        let result = server
            .get_prompt_context(params("greatest prompts"))
            .await
            .expect("tool should not fault");

        assert_eq!(result.is_error, Some(false));
        assert_eq!(
            reply_payload(&result),
            serde_json::json!(["closest", "further"])
        );
    }

    #[tokio::test]
    async fn tool_reports_embedding_failure_without_faulting() {
        let server = build_server(Arc::new(BrokenEmbedder)).await;

        let result = server
            .get_prompt_context(params("anything"))
            .await
            .expect("failures are returned as tool errors, not protocol faults");

        assert_eq!(result.is_error, Some(true));
        let payload = reply_payload(&result);
        assert!(error_message(&payload).contains("onnx session crashed"));
    }

    #[tokio::test]
    async fn tool_reports_store_failure_with_cause() {
        let db = memory_db("broken_store").await;
        db.query("CREATE prompts SET document = 'broken', embedding = 'not a vector';")
            .await
            .expect("malformed insert should succeed");
        let handle = CollectionHandle::open(db, "prompts", Arc::new(AxisEmbedder))
            .await
            .expect("collection should open");
        let server = PromptContextMcp::new(handle);

        let result = server
            .get_prompt_context(params("anything"))
            .await
            .expect("failures are returned as tool errors, not protocol faults");

        assert_eq!(result.is_error, Some(true));
        let payload = reply_payload(&result);
        let message = error_message(&payload);
        assert!(message.starts_with("failed to query the prompt collection: "));
        assert!(message.contains("SurrealDB error"), "unexpected message: {message}");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let server = build_server(Arc::new(AxisEmbedder)).await;
        let result = server.health().await.expect("health should succeed");
        assert_eq!(result.is_error, Some(false));
    }
}
