use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub solver: SolverSettings,
    pub penalties: PenaltyDefaults,
    pub store: StoreConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Backend budget and model-size guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Wall-clock budget per solve, in seconds
    pub time_limit_secs: f64,
    /// Parallel search threads handed to HiGHS
    pub workers: u32,
    pub random_seed: i32,
    pub log_to_console: bool,
    /// Warn when a model has more assignment variables than this
    pub variable_warning_threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyDefaults {
    pub room_mismatch: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Oldest solutions are evicted past this count; unbounded when unset
    pub max_solutions: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: 25.0,
            workers: 8,
            random_seed: 1234,
            log_to_console: false,
            variable_warning_threshold: 250_000,
        }
    }
}

impl Default for PenaltyDefaults {
    fn default() -> Self {
        Self { room_mismatch: 4 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional `timetable` file and
    /// `TIMETABLE__`-prefixed environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("timetable").required(false))
            .add_source(
                config::Environment::with_prefix("TIMETABLE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
