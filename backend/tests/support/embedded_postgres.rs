//! Per-test PostgreSQL databases on a shared embedded cluster.
//!
//! The cluster starts once per test binary. A template database carrying the
//! current migrations is created on first use and keyed by a hash of the
//! `migrations/` directory; every test clones it, so suites never see each
//! other's rows.

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pg_embedded_setup_unpriv::test_support::{hash_directory, shared_cluster_handle};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use taplist::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use tokio::runtime::Runtime;
use uuid::Uuid;

use super::handle_cluster_setup_failure;

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "taplist_template";
const CLONE_RETRIES: usize = 5;
const CLONE_RETRY_DELAY: Duration = Duration::from_millis(500);
const EMBEDDED_PASSWORD: &str = "taplist_embedded_test";

/// A migrated database with a connection pool and the runtime that owns it.
///
/// Tests stay synchronous and drive the stores through [`TestDatabase::run`];
/// cluster bootstrap must not happen inside a Tokio runtime.
pub struct TestDatabase {
    pool: DbPool,
    runtime: Runtime,
    _database: TemporaryDatabase,
}

impl TestDatabase {
    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn run<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

/// Provision a fresh database, or `None` when `SKIP_TEST_CLUSTER` allows the
/// suite to be skipped.
pub fn test_database() -> Option<TestDatabase> {
    match setup() {
        Ok(database) => Some(database),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn setup() -> Result<TestDatabase, String> {
    ensure_stable_password();
    let cluster = shared_cluster_handle().map_err(|err| format!("start cluster: {err:?}"))?;
    let database = provision_database(cluster)?;
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let config = PoolConfig::new(database.url())
        .with_max_size(4)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;
    Ok(TestDatabase {
        pool,
        runtime,
        _database: database,
    })
}

/// The embedded cluster keeps the password of its first `initdb`, so later
/// test binaries reusing the data directory need the same one.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster library spawns threads; test
        // binaries call it from the fixture thread only.
        unsafe {
            std::env::set_var("PG_PASSWORD", EMBEDDED_PASSWORD);
        }
    }
}

fn template_database_name() -> Result<String, String> {
    let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let hash = hash_directory(migrations).map_err(|err| format!("hash migrations: {err}"))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, String> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        let url = cluster.connection().database_url(&template_name);
        run_pending_migrations(&url).map_err(|err| format!("migrate template: {err}"))?;
    }
    Ok(template_name)
}

fn provision_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    let mut last_error = String::from("no attempt made");
    for attempt in 1..=CLONE_RETRIES {
        let cloned = ensure_template_database(cluster).and_then(|template| {
            let name = format!("test_{}", Uuid::new_v4().simple());
            cluster
                .temporary_database_from_template(name.as_str(), template.as_str())
                .map_err(|err| format!("clone template: {err:?}"))
        });
        match cloned {
            Ok(database) => return Ok(database),
            Err(err) => last_error = format!("attempt {attempt}/{CLONE_RETRIES}: {err}"),
        }
        if attempt < CLONE_RETRIES {
            std::thread::sleep(CLONE_RETRY_DELAY);
        }
    }
    Err(last_error)
}
