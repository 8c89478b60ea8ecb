//! Feature plugin registry
//!
//! Explicit, statically constructed list of feature plugins (no runtime
//! discovery), plus a process-wide cache of which plugins passed the
//! cohort gate for a given (tenant, user). The cache is valid until the
//! next `invalidate()`; concurrent readers may observe a stale but
//! consistent snapshot between invalidations.

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::cohort;
use crate::prelude::*;

/// Bounds memory for gate-result entries (one per tenant/user pair)
const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Plugin self-description for the dashboard shell.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginMetadata {
	pub key: Box<str>,
	pub name: Box<str>,
	pub description: Box<str>,
	pub version: Box<str>,
}

/// A tool exposed by a plugin, grouped by category in listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
	pub key: Box<str>,
	pub name: Box<str>,
	pub category: Box<str>,
	pub url: Box<str>,
}

/// A dashboard block contributed by a plugin. Lower weight sorts first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardBlock {
	pub key: Box<str>,
	pub title: Box<str>,
	pub body: Box<str>,
	pub weight: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
	pub plugins: u32,
	pub tools: u32,
	pub blocks: u32,
}

/// Contract every feature plugin implements.
///
/// Four required operations: access check, dashboard summary, tool
/// listing, and metadata. The default access check is the cohort gate on
/// the plugin's key.
#[async_trait]
pub trait FeaturePlugin: Send + Sync {
	/// Stable feature key, also the cohort-restriction subject.
	fn key(&self) -> &'static str;

	fn metadata(&self) -> PluginMetadata;

	fn tools(&self) -> Vec<ToolSpec>;

	async fn dashboard_blocks(
		&self,
		app: &App,
		tn_id: TnId,
		user: UserId,
	) -> EkResult<Vec<DashboardBlock>>;

	async fn access(&self, app: &App, tn_id: TnId, user: UserId) -> bool {
		cohort::allowed(app, tn_id, self.key(), user).await
	}
}

/// The plugin registry and its gate-result cache.
pub struct FeatureRegistry {
	plugins: Vec<Arc<dyn FeaturePlugin>>,
	/// Indices of plugins that passed the access check, per (tenant, user)
	enabled_cache: RwLock<LruCache<(TnId, UserId), Arc<[usize]>>>,
}

impl FeatureRegistry {
	pub fn new(plugins: Vec<Arc<dyn FeaturePlugin>>) -> Self {
		Self::with_capacity(plugins, DEFAULT_CACHE_CAPACITY)
	}

	pub fn with_capacity(plugins: Vec<Arc<dyn FeaturePlugin>>, cache_entries: usize) -> Self {
		let capacity = NonZeroUsize::new(cache_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
		Self { plugins, enabled_cache: RwLock::new(LruCache::new(capacity)) }
	}

	/// All registered plugins, regardless of gating.
	pub fn plugins(&self) -> &[Arc<dyn FeaturePlugin>] {
		&self.plugins
	}

	pub fn find(&self, key: &str) -> Option<Arc<dyn FeaturePlugin>> {
		self.plugins.iter().find(|p| p.key() == key).cloned()
	}

	/// Plugins the user may use, served from the gate-result cache.
	pub async fn enabled(
		&self,
		app: &App,
		tn_id: TnId,
		user: UserId,
	) -> Vec<Arc<dyn FeaturePlugin>> {
		if let Some(indices) = self.enabled_cache.write().get(&(tn_id, user)).cloned() {
			return indices.iter().map(|&i| self.plugins[i].clone()).collect();
		}

		let mut indices = Vec::new();
		for (i, plugin) in self.plugins.iter().enumerate() {
			if plugin.access(app, tn_id, user).await {
				indices.push(i);
			} else {
				debug!(%tn_id, %user, feature = plugin.key(), "Feature denied");
			}
		}

		let indices: Arc<[usize]> = indices.into();
		self.enabled_cache.write().put((tn_id, user), indices.clone());
		indices.iter().map(|&i| self.plugins[i].clone()).collect()
	}

	/// Drop every cached gate result. Restriction mutations call this;
	/// administrative deployments may call it directly.
	pub fn invalidate(&self) {
		self.enabled_cache.write().clear();
	}

	/// Dashboard blocks of all enabled plugins, weight-sorted (stable).
	///
	/// A failing plugin contributes nothing; the rest still render.
	pub async fn dashboard_blocks(
		&self,
		app: &App,
		tn_id: TnId,
		user: UserId,
	) -> Vec<DashboardBlock> {
		let mut blocks = Vec::new();
		for plugin in self.enabled(app, tn_id, user).await {
			match plugin.dashboard_blocks(app, tn_id, user).await {
				Ok(plugin_blocks) => blocks.extend(plugin_blocks),
				Err(err) => {
					warn!(%tn_id, feature = plugin.key(), "Dashboard blocks failed: {}", err);
				}
			}
		}
		blocks.sort_by_key(|b| b.weight);
		blocks
	}

	/// Tool listing of all enabled plugins, grouped by category.
	pub async fn tools(
		&self,
		app: &App,
		tn_id: TnId,
		user: UserId,
	) -> BTreeMap<Box<str>, Vec<ToolSpec>> {
		let mut grouped: BTreeMap<Box<str>, Vec<ToolSpec>> = BTreeMap::new();
		for plugin in self.enabled(app, tn_id, user).await {
			for tool in plugin.tools() {
				grouped.entry(tool.category.clone()).or_default().push(tool);
			}
		}
		grouped
	}

	pub async fn statistics(&self, app: &App, tn_id: TnId, user: UserId) -> RegistryStats {
		let enabled = self.enabled(app, tn_id, user).await;
		let mut tools = 0u32;
		let mut blocks = 0u32;
		for plugin in &enabled {
			tools += plugin.tools().len() as u32;
			blocks += match plugin.dashboard_blocks(app, tn_id, user).await {
				Ok(b) => b.len() as u32,
				Err(_) => 0,
			};
		}
		RegistryStats { plugins: enabled.len() as u32, tools, blocks }
	}
}

impl std::fmt::Debug for FeatureRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FeatureRegistry")
			.field("plugins", &self.plugins.iter().map(|p| p.key()).collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

// vim: ts=4
