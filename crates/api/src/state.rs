use std::sync::Arc;

use complaints_cache::CacheAside;
use complaints_db::memory::MemoryStore;
use complaints_db::store::{AdminStore, CategoryStore, ComplaintStore, HealthProbe, PgStore};
use complaints_db::DbPool;
use mockable::Clock;

use crate::config::ServerConfig;
use crate::services::admin::AdminService;
use crate::services::category::CategoryService;
use crate::services::complaint::ComplaintService;
use crate::services::rate_gate::RateGate;

/// The store ports, built once at startup.
#[derive(Clone)]
pub struct Stores {
    pub categories: Arc<dyn CategoryStore>,
    pub complaints: Arc<dyn ComplaintStore>,
    pub admins: Arc<dyn AdminStore>,
    pub health: Arc<dyn HealthProbe>,
}

impl Stores {
    /// Every port backed by the same Postgres pool.
    pub fn postgres(pool: DbPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            categories: store.clone(),
            complaints: store.clone(),
            admins: store.clone(),
            health: store,
        }
    }

    /// Every port backed by the same in-memory store.
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            categories: store.clone(),
            complaints: store.clone(),
            admins: store.clone(),
            health: store,
        }
    }
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub complaints: Arc<ComplaintService>,
    pub categories: Arc<CategoryService>,
    pub admins: Arc<AdminService>,
    /// Backing-store liveness, for `GET /health`.
    pub health: Arc<dyn HealthProbe>,
}

impl AppState {
    /// Wire the services over `stores`, sharing one cache and one clock.
    pub fn new(
        config: ServerConfig,
        stores: Stores,
        cache: CacheAside,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let gate = RateGate::new(stores.complaints.clone(), clock.clone());

        let complaints = ComplaintService::new(
            stores.complaints.clone(),
            stores.categories.clone(),
            cache.clone(),
            gate,
            clock.clone(),
        );
        let categories = CategoryService::new(stores.categories.clone(), cache, clock);
        let admins = AdminService::new(stores.admins.clone(), config.jwt.clone());

        Self {
            config: Arc::new(config),
            complaints: Arc::new(complaints),
            categories: Arc::new(categories),
            admins: Arc::new(admins),
            health: stores.health,
        }
    }
}
