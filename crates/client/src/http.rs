//! reqwest-based implementation of the engine's transport seam.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use docferry_protocol::{
    ApiResponse, ChunkUploadRequest, FinalizeData, FinalizeRequest, message_from_body,
};
use docferry_transfer::{ChunkProgressFn, ChunkTransport, TransferError};

use crate::ClientError;
use crate::auth::TokenProvider;

const CHUNK_PATH: &str = "/documents/upload/chunk";
const FINALIZE_PATH: &str = "/documents/upload/finalize";

/// Per-request timeout. A timed-out call surfaces as an ordinary transfer
/// failure and flows through the engine's retry path.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Uploads chunks and finalizes documents over the backend's JSON API.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: Arc<dyn TokenProvider>,
}

impl HttpTransport {
    /// Creates a transport with its own HTTP client and the default timeout.
    pub fn new(
        base_url: impl Into<String>,
        token: Arc<dyn TokenProvider>,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, base_url, token))
    }

    /// Creates a transport over an existing client (custom timeout, proxy).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: Arc<dyn TokenProvider>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token,
        }
    }

    async fn post_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<ApiResponse, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = self.token.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = message_from_body(&text);
            warn!(%url, status = status.as_u16(), %message, "backend call failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let api: ApiResponse = serde_json::from_str(&text)?;
        if !api.success {
            let message = api
                .error_message()
                .unwrap_or_else(|| "request rejected".into());
            warn!(%url, %message, "backend reported failure");
            return Err(ClientError::Rejected(message));
        }
        Ok(api)
    }
}

impl ChunkTransport for HttpTransport {
    fn send_chunk<'a>(
        &'a self,
        request: ChunkUploadRequest,
        on_progress: ChunkProgressFn<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransferError>> + Send + 'a>> {
        Box::pin(async move {
            let len = request.chunk.len() as u64;
            debug!(
                file = %request.file_name,
                chunk = request.chunk_index,
                total = request.total_chunks,
                bytes = len,
                "sending chunk"
            );
            self.post_json(CHUNK_PATH, &request)
                .await
                .map_err(TransferError::from)?;
            // The body goes out in one piece; credit the chunk once the
            // backend acknowledged it.
            on_progress(len);
            Ok(())
        })
    }

    fn finalize<'a>(
        &'a self,
        request: FinalizeRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FinalizeData, TransferError>> + Send + 'a>> {
        Box::pin(async move {
            debug!(file = %request.file_name, chunks = request.total_chunks, "finalizing upload");
            let api = self
                .post_json(FINALIZE_PATH, &request)
                .await
                .map_err(TransferError::from)?;
            let data = api
                .parse_data::<FinalizeData>()
                .map_err(ClientError::from)
                .map_err(TransferError::from)?
                .ok_or(ClientError::MissingData)
                .map_err(TransferError::from)?;
            Ok(data)
        })
    }
}
