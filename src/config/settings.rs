use serde::Deserialize;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub client: ClientSettings,
    pub ticker: TickerSettings,
    pub bench: BenchSettings,
    pub log: LogSettings,
}

/// Where the server listens and how much it accepts.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_connections: usize,
    /// Longest binary frame accepted from a client, `EOM` included.
    pub max_frame_bytes: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StoreSettings {
    pub buckets: usize,
}

/// Where clients connect, and the pool size used by the shell.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ClientSettings {
    pub address: String,
    pub port: u16,
    pub max_connections: usize,
}

/// The streaming publisher used as a smoke test.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TickerSettings {
    pub key: String,
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BenchSettings {
    pub clients: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Every field is optional; missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub store: Option<PartialStoreSettings>,
    pub client: Option<PartialClientSettings>,
    pub ticker: Option<PartialTickerSettings>,
    pub bench: Option<PartialBenchSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_connections: Option<usize>,
    pub max_frame_bytes: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialStoreSettings {
    pub buckets: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialClientSettings {
    pub address: Option<String>,
    pub port: Option<u16>,
    pub max_connections: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialTickerSettings {
    pub key: Option<String>,
    pub interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialBenchSettings {
    pub clients: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl PartialSettings {
    /// Fill every missing value from `defaults`.
    pub fn merge(self, defaults: Settings) -> Settings {
        let server = self.server.unwrap_or_default();
        let store = self.store.unwrap_or_default();
        let client = self.client.unwrap_or_default();
        let ticker = self.ticker.unwrap_or_default();
        let bench = self.bench.unwrap_or_default();
        let log = self.log.unwrap_or_default();

        Settings {
            server: ServerSettings {
                host: server.host.unwrap_or(defaults.server.host),
                port: server.port.unwrap_or(defaults.server.port),
                max_connections: server
                    .max_connections
                    .unwrap_or(defaults.server.max_connections),
                max_frame_bytes: server
                    .max_frame_bytes
                    .unwrap_or(defaults.server.max_frame_bytes),
            },
            store: StoreSettings {
                buckets: store.buckets.unwrap_or(defaults.store.buckets),
            },
            client: ClientSettings {
                address: client.address.unwrap_or(defaults.client.address),
                port: client.port.unwrap_or(defaults.client.port),
                max_connections: client
                    .max_connections
                    .unwrap_or(defaults.client.max_connections),
            },
            ticker: TickerSettings {
                key: ticker.key.unwrap_or(defaults.ticker.key),
                interval_ms: ticker.interval_ms.unwrap_or(defaults.ticker.interval_ms),
            },
            bench: BenchSettings {
                clients: bench.clients.unwrap_or(defaults.bench.clients),
            },
            log: LogSettings {
                level: log.level.unwrap_or(defaults.log.level),
            },
        }
    }
}

/// Provides default values for `Settings`.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 2000,
                max_connections: 1024,
                max_frame_bytes: 1024,
            },
            store: StoreSettings { buckets: 1000 },
            client: ClientSettings {
                address: "127.0.0.1".to_string(),
                port: 2000,
                max_connections: 100,
            },
            ticker: TickerSettings {
                key: "testKey".to_string(),
                interval_ms: 1000,
            },
            bench: BenchSettings { clients: 200 },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}
