//! Lambda transport: a tool server hosted as an AWS Lambda function.
//!
//! Every JSON-RPC message is the payload of one synchronous `Invoke`; the
//! response payload is the JSON-RPC response. There is no persistent
//! connection, so closing is a no-op.

use super::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use aws_sdk_lambda::Client as LambdaClient;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use serde::Serialize;
use toolrelay_domain::{ConnectionError, LambdaServerConfig};
use tracing::{debug, trace};

pub struct LambdaTransport {
    provider: String,
    function_name: String,
    client: LambdaClient,
}

impl LambdaTransport {
    /// Build a Lambda client for the configured region.
    ///
    /// Credentials come from the default AWS provider chain.
    pub async fn connect(
        provider: &str,
        config: &LambdaServerConfig,
    ) -> Result<Self, ConnectionError> {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        debug!(
            provider = %provider,
            function = %config.function_name,
            region = %config.region,
            "Lambda transport ready"
        );

        Ok(Self {
            provider: provider.to_string(),
            function_name: config.function_name.clone(),
            client: LambdaClient::new(&aws_config),
        })
    }

    pub async fn request(
        &self,
        request: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, ConnectionError> {
        let payload = self.invoke(request).await?;
        let response: JsonRpcResponse = serde_json::from_slice(&payload).map_err(|e| {
            ConnectionError::Protocol {
                provider: self.provider.clone(),
                message: format!(
                    "Invalid JSON-RPC response from {}: {}",
                    self.function_name, e
                ),
            }
        })?;

        if response.id.is_some_and(|id| id != request.id) {
            return Err(ConnectionError::Protocol {
                provider: self.provider.clone(),
                message: format!(
                    "Response id {:?} does not match request id {}",
                    response.id, request.id
                ),
            });
        }
        Ok(response)
    }

    /// Deliver a notification; whatever the function returns is ignored.
    pub async fn notify(&self, notification: &JsonRpcNotification) -> Result<(), ConnectionError> {
        self.invoke(notification).await.map(|_| ())
    }

    async fn invoke<T: Serialize>(&self, message: &T) -> Result<Vec<u8>, ConnectionError> {
        let body = serde_json::to_vec(message).map_err(|e| ConnectionError::Protocol {
            provider: self.provider.clone(),
            message: format!("Failed to encode message: {}", e),
        })?;
        trace!(provider = %self.provider, "Invoking {}: {}", self.function_name, String::from_utf8_lossy(&body));

        let output = self
            .client
            .invoke()
            .function_name(&self.function_name)
            .payload(Blob::new(body))
            .send()
            .await
            .map_err(|e| ConnectionError::Remote {
                provider: self.provider.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let payload = output
            .payload()
            .map(|blob| blob.as_ref().to_vec())
            .unwrap_or_default();

        if let Some(function_error) = output.function_error() {
            return Err(ConnectionError::Remote {
                provider: self.provider.clone(),
                message: format!(
                    "{} ({}): {}",
                    self.function_name,
                    function_error,
                    String::from_utf8_lossy(&payload)
                ),
            });
        }

        trace!(provider = %self.provider, "Lambda returned {} byte(s)", payload.len());
        Ok(payload)
    }
}
