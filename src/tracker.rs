//! Command facade over one working session: the user-facing operations plus the
//! callbacks a graph view needs.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::Result;
use crate::config::Config;
use crate::config::TrackerConfig;
use crate::constants::SEED_NODE_COLOR;
use crate::err_with_loc;
use crate::error::TraceError;
use crate::graph::GraphStore;
use crate::graph::MergeOptions;
use crate::graph::MergeReport;
use crate::graph::SharedGraphStore;
use crate::model::CryptoType;
use crate::model::GraphSnapshot;
use crate::model::SessionDocument;
use crate::model::SessionMeta;
use crate::model::SessionSummary;
use crate::model::Transaction;
use crate::provider::ProviderRegistry;
use crate::session;
use crate::session::SessionStore;
use crate::summary;
use crate::summary::AccountSummary;
use crate::utils::new_session_id;

/// Per-session state that is not part of the graph itself.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub meta: SessionMeta,
    /// At most one node is selected; it feeds the transaction detail view
    pub selected: Option<String>,
    pub last_transactions: Vec<Transaction>,
}

impl SessionContext {
    fn new(meta: SessionMeta) -> Self {
        Self {
            meta,
            selected: None,
            last_transactions: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct Tracker {
    user_id: String,
    options: MergeOptions,
    registry: ProviderRegistry,
    store: Arc<dyn SessionStore>,
    graph: SharedGraphStore,
    // Locked after `graph` whenever both are held
    context: Arc<RwLock<Option<SessionContext>>>,
}

fn no_active_session() -> anyhow::Error {
    err_with_loc!(TraceError::NotFound("no active session".to_string()))
}

impl Tracker {
    pub fn new(
        config: &TrackerConfig,
        registry: ProviderRegistry,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let options = MergeOptions {
            dedup_by_hash: config.dedup_by_hash,
        };
        Self {
            user_id: config.user_id.clone(),
            options,
            registry,
            store,
            graph: SharedGraphStore::new(options),
            context: Arc::new(RwLock::new(None)),
        }
    }

    /// HTTP providers from the config sections, sessions in the given store.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let registry = ProviderRegistry::from_config(
            &config.providers,
            Duration::from_millis(config.tracker.request_timeout_ms),
        )?;
        Ok(Self::new(&config.tracker, registry, store))
    }

    pub fn graph(&self) -> &SharedGraphStore {
        &self.graph
    }

    pub fn transaction_link(
        &self,
        tx: &Transaction,
    ) -> Option<String> {
        self.registry.transaction_link(tx)
    }

    pub async fn current_session(&self) -> Option<SessionMeta> {
        self.context.read().await.as_ref().map(|context| context.meta.clone())
    }

    // Id of the active session
    async fn require_session(&self) -> Result<String> {
        match self.context.read().await.as_ref() {
            Some(context) => Ok(context.meta.id.clone()),
            None => Err(no_active_session()),
        }
    }

    /// Applies a mutation and persists the result under one graph write guard.
    /// On a failed mutation or save, graph and context are put back as they were.
    ///
    /// `session_id` is the session the command started on. If another session was
    /// created or loaded since then, nothing is applied.
    async fn commit<R, F>(
        &self,
        session_id: &str,
        mutate: F,
    ) -> Result<R>
    where
        F: FnOnce(&mut GraphStore, &mut SessionContext) -> Result<R>,
    {
        let mut graph = self.graph.write().await;
        let mut context = self.context.write().await;
        let session = context.as_mut().ok_or_else(no_active_session)?;
        if session.meta.id != session_id {
            warn!("session_switched_during_command::{}::{}", session_id, session.meta.id);
            return Err(err_with_loc!(TraceError::NotFound(format!("session {} is no longer active", session_id))));
        }

        let graph_before = graph.clone();
        let session_before = session.clone();

        let outcome = match mutate(&mut *graph, &mut *session) {
            Ok(outcome) => outcome,
            Err(e) => {
                *graph = graph_before;
                *session = session_before;
                return Err(e);
            },
        };

        let document = session::capture(&session.meta, &*graph, &session.last_transactions, Utc::now());
        if let Err(e) = self.store.save(&document).await {
            error!("session_save_failed::{}::{:#}", session.meta.id, e);
            *graph = graph_before;
            *session = session_before;
            return Err(e);
        }
        Ok(outcome)
    }

    pub async fn create_session(
        &self,
        name: &str,
    ) -> Result<SessionMeta> {
        let name = name.trim();
        if name.is_empty() {
            return Err(err_with_loc!(TraceError::ValidationError("session name must not be empty".to_string())));
        }
        let meta = SessionMeta {
            id: new_session_id(),
            name: name.to_string(),
            user_id: self.user_id.clone(),
            created: Utc::now(),
        };

        let mut graph = self.graph.write().await;
        let mut context = self.context.write().await;
        self.store.save(&SessionDocument::empty(&meta)).await?;
        graph.clear();
        *context = Some(SessionContext::new(meta.clone()));

        info!("session_created::{}::{}", meta.id, meta.name);
        Ok(meta)
    }

    /// Replaces the whole in-memory state with the stored session.
    pub async fn load_session(
        &self,
        session_id: &str,
    ) -> Result<SessionMeta> {
        let document = self
            .store
            .load(session_id)
            .await?
            .ok_or_else(|| err_with_loc!(TraceError::NotFound(format!("session {}", session_id))))?;
        if document.user_id != self.user_id {
            warn!("session_owner_mismatch::{}::{}", session_id, self.user_id);
            return Err(err_with_loc!(TraceError::Unauthorized {
                session_id: session_id.to_string(),
            }));
        }

        let restored = session::restore(document, self.options);
        let mut graph = self.graph.write().await;
        let mut context = self.context.write().await;
        graph.replace(restored.graph);
        *context = Some(SessionContext {
            meta: restored.meta.clone(),
            selected: None,
            last_transactions: restored.last_transactions,
        });

        info!("session_loaded::{}", restored.meta.id);
        Ok(restored.meta)
    }

    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        self.store.list(&self.user_id).await
    }

    /// Seeds the graph with an address, then merges its fetched transactions.
    /// Nothing changes unless the fetch succeeds.
    pub async fn add_address(
        &self,
        address: &str,
        crypto_type: CryptoType,
    ) -> Result<MergeReport> {
        let address = crypto_type.normalize_address(address);
        if address.is_empty() {
            return Err(err_with_loc!(TraceError::ValidationError("address must not be empty".to_string())));
        }
        let session_id = self.require_session().await?;

        let batch = self.registry.fetch_transactions(&address, crypto_type).await?;
        let report = self
            .commit(&session_id, |graph, session| {
                graph.ensure_node(&address, crypto_type, SEED_NODE_COLOR);
                let report = graph.merge_transactions(&batch, crypto_type);
                session.last_transactions = batch;
                Ok(report)
            })
            .await?;

        info!("address_added::{}::{}::{}", crypto_type, address, report.merged);
        Ok(report)
    }

    /// Fetches and merges more history for a node already in the graph, using the
    /// node's own crypto type.
    pub async fn expand_node(
        &self,
        node_id: &str,
    ) -> Result<MergeReport> {
        let session_id = self.require_session().await?;
        let crypto_type = self
            .graph
            .read()
            .await
            .node(node_id)
            .map(|node| node.crypto_type)
            .ok_or_else(|| err_with_loc!(TraceError::NotFound(format!("node {}", node_id))))?;

        let batch = self.registry.fetch_transactions(node_id, crypto_type).await?;
        let report = self
            .commit(&session_id, |graph, session| {
                let report = graph.merge_transactions(&batch, crypto_type);
                session.last_transactions = batch;
                Ok(report)
            })
            .await?;

        info!("node_expanded::{}::{}", node_id, report.merged);
        Ok(report)
    }

    pub async fn add_label(
        &self,
        node_id: &str,
        text: &str,
    ) -> Result<()> {
        let session_id = self.require_session().await?;
        self.commit(&session_id, |graph, _| graph.add_tag(node_id, text)).await?;
        info!("label_added::{}::{}", node_id, text.trim());
        Ok(())
    }

    pub async fn set_color(
        &self,
        node_id: &str,
        color: &str,
    ) -> Result<()> {
        let session_id = self.require_session().await?;
        self.commit(&session_id, |graph, _| graph.set_color(node_id, color)).await?;
        info!("color_set::{}::{}", node_id, color.trim());
        Ok(())
    }

    /// Moves the selection cursor. Selection is view state and is not saved.
    pub async fn select_node(
        &self,
        node_id: &str,
    ) -> Result<()> {
        let graph = self.graph.read().await;
        let mut context = self.context.write().await;
        let session = context.as_mut().ok_or_else(no_active_session)?;
        if !graph.contains(node_id) {
            return Err(err_with_loc!(TraceError::NotFound(format!("node {}", node_id))));
        }
        session.selected = Some(node_id.to_string());
        Ok(())
    }

    pub async fn on_node_selected(
        &self,
        node_id: &str,
    ) -> Result<()> {
        self.select_node(node_id).await
    }

    /// Activating a node in the view expands it.
    pub async fn on_node_activated(
        &self,
        node_id: &str,
    ) -> Result<MergeReport> {
        self.expand_node(node_id).await
    }

    pub async fn selected_node(&self) -> Option<String> {
        self.context.read().await.as_ref().and_then(|context| context.selected.clone())
    }

    /// Transactions of the selected node, empty when nothing is selected.
    pub async fn selected_transactions(&self) -> Vec<Transaction> {
        let graph = self.graph.read().await;
        let context = self.context.read().await;
        context
            .as_ref()
            .and_then(|context| context.selected.as_deref())
            .and_then(|id| graph.node(id))
            .map(|node| node.transactions.clone())
            .unwrap_or_default()
    }

    pub async fn last_transactions(&self) -> Vec<Transaction> {
        self.context.read().await.as_ref().map(|context| context.last_transactions.clone()).unwrap_or_default()
    }

    pub async fn snapshot(&self) -> GraphSnapshot {
        self.graph.snapshot().await
    }

    pub async fn summaries(&self) -> Vec<AccountSummary> {
        summary::summarize_all(self.graph.read().await.nodes())
    }

    pub async fn summary(
        &self,
        node_id: &str,
    ) -> Result<AccountSummary> {
        self.graph
            .read()
            .await
            .node(node_id)
            .map(summary::summarize)
            .ok_or_else(|| err_with_loc!(TraceError::NotFound(format!("node {}", node_id))))
    }
}
