//! Provider group use case.
//!
//! Owns an ordered set of [`ToolProvider`]s for the lifetime of one chat
//! session: ordered initialization with rollback, catalog aggregation,
//! first-registration-wins routing and reverse-order teardown.
//!
//! ```text
//! open([a, b, c])      init a → init b → init c
//!   failure at c       shutdown b → shutdown a → Err(Initialization{c})
//! close()              shutdown c → shutdown b → shutdown a
//! ```
//!
//! Rust has no async `Drop`, so the scope is closed explicitly with
//! [`ProviderGroup::close`]. A group dropped while still open logs a warning
//! and schedules the same teardown on the current tokio runtime.

use crate::ports::chat_observer::{ChatObserver, NoChatObserver};
use std::sync::Arc;
use thiserror::Error;
use toolrelay_domain::util::json_preview;
use toolrelay_domain::{ConnectionError, ToolDescriptor, ToolProvider, ToolResult};
use tracing::{debug, info, warn};

/// Errors that can occur while opening a provider group.
#[derive(Error, Debug)]
pub enum GroupError {
    #[error("Failed to initialize provider '{provider}': {source}")]
    Initialization {
        provider: String,
        #[source]
        source: ConnectionError,
    },
}

/// Outcome of [`ProviderGroup::close`].
#[derive(Debug, Default)]
pub struct CloseReport {
    /// Providers shut down, in teardown order
    pub stopped: Vec<String>,
    /// Providers whose shutdown reported an error
    pub failures: Vec<(String, ConnectionError)>,
}

impl CloseReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// An open, ordered set of tool providers.
pub struct ProviderGroup {
    providers: Vec<Box<dyn ToolProvider>>,
    observer: Arc<dyn ChatObserver>,
}

impl ProviderGroup {
    /// Initialize `providers` in order and take ownership of them.
    pub async fn open(providers: Vec<Box<dyn ToolProvider>>) -> Result<Self, GroupError> {
        Self::open_with_observer(providers, Arc::new(NoChatObserver)).await
    }

    /// Like [`open`](Self::open), reporting lifecycle events to `observer`.
    ///
    /// On failure of provider *k*, providers `0..k` are shut down in reverse
    /// order before the error is returned. Provider *k* and everything after
    /// it are dropped without a shutdown call.
    pub async fn open_with_observer(
        providers: Vec<Box<dyn ToolProvider>>,
        observer: Arc<dyn ChatObserver>,
    ) -> Result<Self, GroupError> {
        let mut ready: Vec<Box<dyn ToolProvider>> = Vec::with_capacity(providers.len());

        for provider in providers {
            let name = provider.name().to_string();
            debug!(provider = %name, "Initializing provider");

            match provider.initialize().await {
                Ok(()) => {
                    info!(provider = %name, "Provider ready");
                    observer.on_provider_started(&name);
                    ready.push(provider);
                }
                Err(source) => {
                    warn!(
                        provider = %name,
                        error = %source,
                        "Provider failed to initialize, rolling back {} provider(s)",
                        ready.len()
                    );
                    shutdown_in_reverse(&ready, observer.as_ref()).await;
                    return Err(GroupError::Initialization {
                        provider: name,
                        source,
                    });
                }
            }
        }

        Ok(Self {
            providers: ready,
            observer,
        })
    }

    /// Shut down every provider in reverse registration order.
    ///
    /// Failures do not stop the teardown; they are logged and collected in
    /// the returned report.
    pub async fn close(mut self) -> CloseReport {
        let providers = std::mem::take(&mut self.providers);
        shutdown_in_reverse(&providers, self.observer.as_ref()).await
    }

    /// Names of the providers in registration order
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Concatenate every provider's current catalog in registration order.
    ///
    /// Catalogs are queried on every call. Duplicate names are kept; routing
    /// picks the first.
    pub async fn list_all_tools(&self) -> Result<Vec<ToolDescriptor>, ConnectionError> {
        let mut all = Vec::new();
        for provider in &self.providers {
            let tools = provider.list_tools().await?;
            debug!(provider = %provider.name(), count = tools.len(), "Listed tools");
            all.extend(tools);
        }
        Ok(all)
    }

    /// Route one tool invocation to the first provider advertising `tool_name`.
    ///
    /// A name no provider owns yields an error [`ToolResult`], never an `Err`.
    /// Connection failures of the owning provider propagate.
    pub async fn resolve_and_invoke(
        &self,
        tool_name: &str,
        invocation_id: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ConnectionError> {
        let Some(provider) = self.find_owner(tool_name).await? else {
            warn!(tool = %tool_name, "No provider advertises tool");
            let result = ToolResult::unknown_tool(invocation_id, tool_name);
            self.observer.on_tool_failed(tool_name, &result);
            return Ok(result);
        };

        info!(
            provider = %provider.name(),
            tool = %tool_name,
            "Invoking tool: {}",
            json_preview(&arguments, 200)
        );
        self.observer
            .on_tool_invoked(provider.name(), tool_name, invocation_id);

        let mut result = provider
            .invoke_tool(tool_name, invocation_id, arguments)
            .await?;

        if result.tool_use_id != invocation_id {
            warn!(
                provider = %provider.name(),
                expected = %invocation_id,
                actual = %result.tool_use_id,
                "Tool result id mismatch, overwriting"
            );
            result.tool_use_id = invocation_id.to_string();
        }

        if !result.is_success() {
            self.observer.on_tool_failed(tool_name, &result);
        }

        Ok(result)
    }

    async fn find_owner(
        &self,
        tool_name: &str,
    ) -> Result<Option<&dyn ToolProvider>, ConnectionError> {
        for provider in &self.providers {
            if provider.has_tool(tool_name).await? {
                return Ok(Some(provider.as_ref()));
            }
        }
        Ok(None)
    }
}

impl Drop for ProviderGroup {
    fn drop(&mut self) {
        if self.providers.is_empty() {
            return;
        }

        let providers = std::mem::take(&mut self.providers);
        let observer = self.observer.clone();
        warn!(
            count = providers.len(),
            "Provider group dropped without close, scheduling teardown"
        );

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    shutdown_in_reverse(&providers, observer.as_ref()).await;
                });
            }
            Err(_) => {
                warn!("No tokio runtime available, providers released without shutdown");
            }
        }
    }
}

async fn shutdown_in_reverse(
    providers: &[Box<dyn ToolProvider>],
    observer: &dyn ChatObserver,
) -> CloseReport {
    let mut report = CloseReport::default();

    for provider in providers.iter().rev() {
        let name = provider.name().to_string();
        match provider.shutdown().await {
            Ok(()) => {
                debug!(provider = %name, "Provider shut down");
                observer.on_provider_stopped(&name, None);
            }
            Err(e) => {
                warn!(provider = %name, error = %e, "Provider shutdown failed");
                observer.on_provider_stopped(&name, Some(&e));
                report.failures.push((name.clone(), e));
            }
        }
        report.stopped.push(name);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::testing::{MockProvider, RecordingObserver, event_log, events};
    use serde_json::json;
    use toolrelay_domain::ToolStatus;

    #[tokio::test]
    async fn test_open_initializes_in_order() {
        let log = event_log();
        let group = ProviderGroup::open(vec![
            MockProvider::new("a", &log).boxed(),
            MockProvider::new("b", &log).boxed(),
        ])
        .await
        .unwrap();

        assert_eq!(group.provider_names(), vec!["a", "b"]);
        assert_eq!(group.len(), 2);
        assert_eq!(events(&log), vec!["init:a", "init:b"]);
        group.close().await;
    }

    #[tokio::test]
    async fn test_open_rolls_back_in_reverse_on_failure() {
        let log = event_log();
        let result = ProviderGroup::open(vec![
            MockProvider::new("a", &log).boxed(),
            MockProvider::new("b", &log).boxed(),
            MockProvider::new("c", &log).failing_init().boxed(),
            MockProvider::new("d", &log).boxed(),
        ])
        .await;

        match result {
            Err(GroupError::Initialization { provider, .. }) => assert_eq!(provider, "c"),
            Ok(_) => panic!("expected initialization failure"),
        }
        assert_eq!(
            events(&log),
            vec!["init:a", "init:b", "init:c", "shutdown:b", "shutdown:a"]
        );
    }

    #[tokio::test]
    async fn test_open_failure_of_first_provider_shuts_nothing_down() {
        let log = event_log();
        let result = ProviderGroup::open(vec![
            MockProvider::new("a", &log).failing_init().boxed(),
            MockProvider::new("b", &log).boxed(),
        ])
        .await;

        assert!(result.is_err());
        assert_eq!(events(&log), vec!["init:a"]);
    }

    #[tokio::test]
    async fn test_close_reverse_order_continues_past_failures() {
        let log = event_log();
        let observer = Arc::new(RecordingObserver::default());
        let group = ProviderGroup::open_with_observer(
            vec![
                MockProvider::new("a", &log).failing_shutdown().boxed(),
                MockProvider::new("b", &log).failing_shutdown().boxed(),
                MockProvider::new("c", &log).boxed(),
            ],
            observer.clone(),
        )
        .await
        .unwrap();

        let report = group.close().await;

        assert_eq!(
            events(&log),
            vec!["init:a", "init:b", "init:c", "shutdown:c", "shutdown:b", "shutdown:a"]
        );
        assert_eq!(report.stopped, vec!["c", "b", "a"]);
        assert!(!report.is_clean());
        let failed: Vec<&str> = report.failures.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(failed, vec!["b", "a"]);

        let calls = observer.calls.lock().unwrap().clone();
        assert!(calls.contains(&"stopped:c:false".to_string()));
        assert!(calls.contains(&"stopped:a:true".to_string()));
    }

    #[tokio::test]
    async fn test_empty_group() {
        let group = ProviderGroup::open(Vec::new()).await.unwrap();
        assert!(group.is_empty());
        assert!(group.list_all_tools().await.unwrap().is_empty());

        let result = group
            .resolve_and_invoke("anything", "tooluse_1", json!({}))
            .await
            .unwrap();
        assert_eq!(result.status, ToolStatus::Error);
        assert!(group.close().await.is_clean());
    }

    #[tokio::test]
    async fn test_list_all_tools_concatenates_in_order_and_is_stable() {
        let log = event_log();
        let group = ProviderGroup::open(vec![
            MockProvider::new("time", &log)
                .with_tool("get_time")
                .with_tool("convert_time")
                .boxed(),
            MockProvider::new("weather", &log).with_tool("get_alerts").boxed(),
        ])
        .await
        .unwrap();

        let first = group.list_all_tools().await.unwrap();
        let second = group.list_all_tools().await.unwrap();

        let names: Vec<&str> = first.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["get_time", "convert_time", "get_alerts"]);
        assert_eq!(first, second);
        group.close().await;
    }

    #[tokio::test]
    async fn test_unknown_tool_returns_error_result() {
        let log = event_log();
        let observer = Arc::new(RecordingObserver::default());
        let group = ProviderGroup::open_with_observer(
            vec![MockProvider::new("time", &log).with_tool("get_time").boxed()],
            observer.clone(),
        )
        .await
        .unwrap();

        let result = group
            .resolve_and_invoke("does_not_exist", "tooluse_9", json!({}))
            .await
            .unwrap();

        assert_eq!(result.status, ToolStatus::Error);
        assert_eq!(result.tool_use_id, "tooluse_9");
        assert_eq!(result.text(), "No server found with tool: does_not_exist");
        assert!(
            observer
                .calls
                .lock()
                .unwrap()
                .contains(&"failed:does_not_exist".to_string())
        );
        group.close().await;
    }

    #[tokio::test]
    async fn test_duplicate_tool_routes_to_first_registered() {
        let log = event_log();
        let group = ProviderGroup::open(vec![
            MockProvider::new("a", &log).with_tool("lookup").boxed(),
            MockProvider::new("b", &log).with_tool("lookup").boxed(),
        ])
        .await
        .unwrap();

        let result = group
            .resolve_and_invoke("lookup", "tooluse_1", json!({"q": 1}))
            .await
            .unwrap();

        assert!(result.is_success());
        assert!(result.text().starts_with("a:lookup"));
        let log_events = events(&log);
        assert!(log_events.contains(&"invoke:a:lookup:tooluse_1".to_string()));
        assert!(!log_events.iter().any(|e| e.starts_with("invoke:b")));
        group.close().await;
    }

    #[tokio::test]
    async fn test_routing_skips_providers_without_the_tool() {
        let log = event_log();
        let group = ProviderGroup::open(vec![
            MockProvider::new("time", &log).with_tool("get_time").boxed(),
            MockProvider::new("weather", &log).with_tool("get_alerts").boxed(),
        ])
        .await
        .unwrap();

        let result = group
            .resolve_and_invoke("get_alerts", "tooluse_2", json!({"state": "WA"}))
            .await
            .unwrap();

        assert_eq!(result.text(), r#"weather:get_alerts:{"state":"WA"}"#);
        group.close().await;
    }

    #[tokio::test]
    async fn test_tool_error_result_is_not_a_connection_error() {
        let log = event_log();
        let group = ProviderGroup::open(vec![
            MockProvider::new("time", &log)
                .with_tool("get_time")
                .with_response("get_time", ToolResult::error("x", "Invalid timezone"))
                .boxed(),
        ])
        .await
        .unwrap();

        let result = group
            .resolve_and_invoke("get_time", "tooluse_3", json!({"timezone": "Mars"}))
            .await
            .unwrap();

        assert_eq!(result.status, ToolStatus::Error);
        assert_eq!(result.tool_use_id, "tooluse_3");
        group.close().await;
    }

    #[tokio::test]
    async fn test_connection_error_propagates() {
        let log = event_log();
        let group = ProviderGroup::open(vec![
            MockProvider::new("flaky", &log)
                .with_tool("ping")
                .failing_invoke()
                .boxed(),
        ])
        .await
        .unwrap();

        let err = group
            .resolve_and_invoke("ping", "tooluse_4", json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.provider(), "flaky");
        group.close().await;
    }

    #[tokio::test]
    async fn test_drop_without_close_schedules_teardown() {
        let log = event_log();
        let group = ProviderGroup::open(vec![
            MockProvider::new("a", &log).boxed(),
            MockProvider::new("b", &log).boxed(),
        ])
        .await
        .unwrap();

        drop(group);
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            events(&log),
            vec!["init:a", "init:b", "shutdown:b", "shutdown:a"]
        );
    }
}
