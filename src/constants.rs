pub const TICK_INTERVAL_MS: u64 = 1_000;
pub const MAX_TICK_DELTA: f64 = 0.005;
pub const HISTORY_POINTS: usize = 30;
pub const STORAGE_NAMESPACE: &str = "tradepro.v1";
pub const STORE_FILE_NAME: &str = "store.json";
pub const DEFAULT_DATA_DIR: &str = ".tradepro";
pub const DATA_DIR_ENV: &str = "TRADEPRO_DATA_DIR";
