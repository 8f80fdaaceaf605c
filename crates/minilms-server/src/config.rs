//! Configuration management for the Mini LMS binary
//!
//! Values come from `conf/application.yml` (optional), then `MINILMS_*`
//! environment variables, then command line overrides.

use std::time::Duration;

use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use minilms_common::{DEFAULT_CACHE_TTL_SECONDS, DEFAULT_PAGE_LIMIT, LmsError};
use minilms_core::ListingCache;

use crate::logging::LoggingConfig;

pub const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://minilms.db?mode=rwc";
pub const DEFAULT_CACHE_MAX_CAPACITY: u64 = 16;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "minilms", version, about = "Mini LMS enrollment administration")]
pub struct Cli {
    /// Configuration file
    #[arg(short = 'c', long = "config", env = "MINILMS_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: String,
    #[arg(long = "db-url", env = "DATABASE_URL")]
    pub database_url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply pending schema migrations
    Migrate,
    /// Load demo parents, students, classes and subscriptions into an empty database
    Seed,
    /// Print dashboard counters
    Stats,
    /// List classes with their occupancy
    Classes {
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Defaults to the configured page limit
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Enroll a student in a class
    Register { class_id: i32, student_id: i32 },
    /// Remove a student from a class
    Unregister { class_id: i32, student_id: i32 },
    /// Students enrolled in a class
    Roster { class_id: i32 },
    /// Classes a student attends
    Timetable { student_id: i32 },
    /// Consume one session of a subscription
    UseSession { subscription_id: i32 },
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn from_sources(config_file: &str, database_url: Option<String>) -> Result<Self, LmsError> {
        let mut config_builder = Config::builder()
            .add_source(File::with_name(config_file).required(false))
            .add_source(
                Environment::with_prefix("minilms")
                    .separator(".")
                    .try_parsing(true),
            );

        if let Some(v) = database_url {
            config_builder = config_builder
                .set_override("db.url", v)
                .map_err(|e| LmsError::ConfigError(e.to_string()))?;
        }

        let config = config_builder
            .build()
            .map_err(|e| LmsError::ConfigError(format!("{} ({})", e, config_file)))?;

        Ok(Configuration { config })
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, LmsError> {
        Self::from_sources(&cli.config_file, cli.database_url.clone())
    }

    pub fn app_name(&self) -> String {
        self.config
            .get_string("app.name")
            .unwrap_or("Mini LMS".to_string())
    }

    // ========================================================================
    // Database Configuration
    // ========================================================================

    pub fn database_url(&self) -> String {
        self.config
            .get_string("db.url")
            .unwrap_or(DEFAULT_DATABASE_URL.to_string())
    }

    fn pool_int(&self, key: &str, default: u64) -> u64 {
        self.config
            .get_int(&format!("db.pool.{}", key))
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(default)
    }

    pub fn connect_options(&self) -> ConnectOptions {
        let max_connections = u32::try_from(self.pool_int("maxConnections", 10)).unwrap_or(10);
        let min_connections = u32::try_from(self.pool_int("minConnections", 1)).unwrap_or(1);
        let sqlx_logging = self
            .config
            .get_bool("db.pool.sqlxLogging")
            .unwrap_or(false);

        let mut opt = ConnectOptions::new(self.database_url());

        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(self.pool_int("connectTimeout", 30)))
            .acquire_timeout(Duration::from_secs(self.pool_int("acquireTimeout", 8)))
            .idle_timeout(Duration::from_secs(self.pool_int("idleTimeout", 600)))
            .max_lifetime(Duration::from_secs(self.pool_int("maxLifetime", 1800)))
            .sqlx_logging(sqlx_logging);

        opt
    }

    pub async fn database_connection(&self) -> anyhow::Result<DatabaseConnection> {
        let opt = self.connect_options();

        tracing::info!(
            max_connections = opt.get_max_connections(),
            min_connections = opt.get_min_connections(),
            "Connecting to database"
        );

        let database_connection: DatabaseConnection = Database::connect(opt)
            .await
            .map_err(|e| LmsError::DatabaseError(e.to_string()))?;

        Ok(database_connection)
    }

    // ========================================================================
    // Listing Cache Configuration
    // ========================================================================

    pub fn cache_enabled(&self) -> bool {
        self.config.get_bool("cache.enabled").unwrap_or(true)
    }

    pub fn cache_ttl(&self) -> Duration {
        let seconds = self
            .config
            .get_int("cache.ttlSeconds")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(DEFAULT_CACHE_TTL_SECONDS);
        Duration::from_secs(seconds)
    }

    pub fn cache_max_capacity(&self) -> u64 {
        self.config
            .get_int("cache.maxCapacity")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(DEFAULT_CACHE_MAX_CAPACITY)
    }

    /// Page size of list commands, and the window the listing cache covers
    pub fn page_limit(&self) -> u64 {
        self.config
            .get_int("app.pageLimit")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    pub fn listing_cache(&self) -> ListingCache {
        if !self.cache_enabled() {
            tracing::info!("Class listing cache disabled");
            return ListingCache::disabled(self.page_limit());
        }

        ListingCache::new(
            std::sync::Arc::new(minilms_core::MokaListingCache::new(
                self.cache_max_capacity(),
            )),
            self.cache_ttl(),
            self.page_limit(),
        )
    }

    // ========================================================================
    // Logging Configuration
    // ========================================================================

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::from_config(
            self.config.get_string("logging.dir").ok(),
            self.config.get_bool("logging.console").unwrap_or(true),
            self.config.get_bool("logging.file").unwrap_or(false),
            &self
                .config
                .get_string("logging.level")
                .unwrap_or("info".to_string()),
            &self
                .config
                .get_string("logging.rotation")
                .unwrap_or("daily".to_string()),
        )
        .with_env_overrides()
    }
}
