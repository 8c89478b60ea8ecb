//! App state type

use std::sync::Arc;

use crate::registry::FeatureRegistry;

use edukit_types::directory_adapter::DirectoryAdapter;
use edukit_types::store_adapter::StoreAdapter;
use edukit_types::types::FailPolicy;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine-wide options, passed in explicitly at construction.
#[derive(Debug)]
pub struct AppOpts {
	/// Gate decision when the restriction store is unreachable. Fails open
	/// historically; deployments wanting least privilege select `Closed`.
	pub gate_fail_policy: FailPolicy,
	/// Upper clamp for aggregator page sizes.
	pub max_page_size: u32,
}

impl Default for AppOpts {
	fn default() -> Self {
		Self { gate_fail_policy: FailPolicy::Open, max_page_size: 100 }
	}
}

pub struct AppState {
	pub opts: AppOpts,

	pub directory_adapter: Arc<dyn DirectoryAdapter>,
	pub store_adapter: Arc<dyn StoreAdapter>,

	/// Feature plugin registry with its gate-result cache.
	pub registry: FeatureRegistry,
}

impl AppState {
	pub fn new(
		opts: AppOpts,
		directory_adapter: Arc<dyn DirectoryAdapter>,
		store_adapter: Arc<dyn StoreAdapter>,
		registry: FeatureRegistry,
	) -> App {
		Arc::new(Self { opts, directory_adapter, store_adapter, registry })
	}
}

pub type App = Arc<AppState>;

// vim: ts=4
