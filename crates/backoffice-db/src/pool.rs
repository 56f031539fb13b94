//! # Database Pool Management
//!
//! Connection pool creation and configuration for PostgreSQL.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Server Startup                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(user, password) ← Configure pool settings               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::connect(config).await ← Create pool + SELECT 1              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │              PgPool                      │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │  max_connections (10)     │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  min_connections  (5)     │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │  max_lifetime     (5 min) │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       │ Shared by every request AND every fan-out task                 │
//! │       ▼                                                                 │
//! │  GET /receipt ──► header query ──► N line queries in parallel          │
//! │  POST /order  ──► one transaction on one connection                    │
//! │                                                                         │
//! │  Server Shutdown ──► Database::close()                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::catalog::CatalogRepository;
use crate::repository::receipt::ReceiptRepository;
use crate::repository::staff::StaffRepository;
use crate::repository::supplier_order::SupplierOrderRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("backoffice", "secret")
///     .host("db.internal")
///     .database("retail")
///     .max_connections(20);
/// ```
#[derive(Clone)]
pub struct DbConfig {
    pub user: String,
    pub password: String,
    /// Default: localhost
    pub host: String,
    /// Default: 5432
    pub port: u16,
    /// Default: postgres
    pub database: String,

    /// Maximum number of simultaneously open connections.
    /// Default: 10
    pub max_connections: u32,

    /// Connections kept open between bursts.
    /// Default: 5
    pub min_connections: u32,

    /// Lifetime after which a connection is recycled, to avoid stale ones.
    /// Default: 5 minutes
    pub max_lifetime: Duration,

    /// How long to wait for a free connection before giving up.
    /// Default: 30 seconds
    pub acquire_timeout: Duration,

    /// Idle timeout before closing a connection above `min_connections`.
    /// Default: 10 minutes
    pub idle_timeout: Duration,
}

impl DbConfig {
    /// Creates a configuration for the given credentials with default
    /// host, port, database name and pool bounds.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        DbConfig {
            user: user.into(),
            password: password.into(),
            host: "localhost".to_string(),
            port: 5432,
            database: "postgres".to_string(),
            max_connections: 10,
            min_connections: 5,
            max_lifetime: Duration::from_secs(300),
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the per-connection lifetime.
    pub fn max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    /// Builds connection options. The password never passes through a URL,
    /// so it needs no escaping.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("max_lifetime", &self.max_lifetime)
            .finish()
    }
}

// =============================================================================
// Database
// =============================================================================

/// Process-wide database handle.
///
/// Created once at startup, cloned cheaply (the pool is reference
/// counted), handed to the HTTP layer as `Arc<dyn Store>` and closed at
/// shutdown. Its [`Store`](crate::Store) implementation lives in
/// [`crate::store`].
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Creates the connection pool and verifies the database answers.
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use database handle
    /// * `Err(DbError::ConnectionFailed)` - Unreachable, bad credentials,
    ///   or unknown database. Callers treat this as fatal at startup.
    pub async fn connect(config: &DbConfig) -> DbResult<Self> {
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Initializing database connection"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .max_lifetime(Some(config.max_lifetime))
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };

        if !db.health_check().await {
            return Err(DbError::ConnectionFailed(
                "database did not answer SELECT 1".to_string(),
            ));
        }

        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Database pool created"
        );

        Ok(db)
    }

    /// Wraps an existing pool (used by integration tests).
    pub fn from_pool(pool: PgPool) -> Self {
        Database { pool }
    }

    /// Product, supplier and department reads.
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    /// Employee reads and writes.
    pub fn staff(&self) -> StaffRepository {
        StaffRepository::new(self.pool.clone())
    }

    /// Receipt writer and reader.
    pub fn receipts(&self) -> ReceiptRepository {
        ReceiptRepository::new(self.pool.clone())
    }

    /// Supplier order writer and reader.
    pub fn supplier_orders(&self) -> SupplierOrderRepository {
        SupplierOrderRepository::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    ///
    /// ## When To Call
    /// - On server shutdown, after in-flight requests drained
    ///
    /// ## Note
    /// After calling close, all store operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        let ok = sqlx::query("SELECT 1").execute(&self.pool).await.is_ok();
        debug!(ok, "Database health check");
        ok
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = DbConfig::new("user", "pass");

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 5);
        assert_eq!(config.max_lifetime, Duration::from_secs(300));
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("user", "pass")
            .host("db")
            .port(6543)
            .database("retail")
            .max_connections(20)
            .min_connections(2);

        assert_eq!(config.host, "db");
        assert_eq!(config.port, 6543);
        assert_eq!(config.database, "retail");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 2);
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = DbConfig::new("user", "hunter2");
        let printed = format!("{config:?}");

        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }
}
