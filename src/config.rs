//! 環境変数からの設定読み込み
//!
//! | 変数 | 既定値 |
//! |---|---|
//! | `BIND_ADDR` | `0.0.0.0:8080` |
//! | `FOOTBALL_DATA_API_KEY` | なし（外部APIを使わない） |
//! | `FOOTBALL_DATA_BASE_URL` | `https://api.football-data.org/v4` |
//! | `GATEWAY_TIMEOUT_SECS` | `10` |
//! | `SIM_TICK_INTERVAL_MS` | `30000` |
//! | `SIM_GOAL_PROBABILITY` | `0.10` |
//! | `SIM_SEED` | なし |

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_PROVIDER_URL: &str = "https://api.football-data.org/v4";

/// 外部データプロバイダの設定
#[derive(Clone)]
pub struct GatewaySettings {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// シミュレーションの定数
///
/// 30秒 = 1分、ゴール確率10% はデモ用の値なので設定で変えられる。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationSettings {
    pub tick_interval: Duration,
    pub goal_probability: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(30),
            goal_probability: 0.10,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// None なら外部APIを使わず、シミュレーションデータだけで動く
    pub gateway: Option<GatewaySettings>,
    pub simulation: SimulationSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の取得関数から設定を組み立てる（テストでは HashMap を渡す）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ConfigError::BindAddr(bind_raw.clone()))?;

        // 空白だけのキーは未設定と同じ扱い
        let gateway = lookup("FOOTBALL_DATA_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(|api_key| GatewaySettings {
                api_key,
                base_url: lookup("FOOTBALL_DATA_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_PROVIDER_URL.to_string()),
                timeout: Duration::from_secs(parse_or(&lookup, "GATEWAY_TIMEOUT_SECS", 10)),
            });

        let defaults = SimulationSettings::default();
        let tick_ms = parse_or(
            &lookup,
            "SIM_TICK_INTERVAL_MS",
            defaults.tick_interval.as_millis() as u64,
        );
        if tick_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                key: "SIM_TICK_INTERVAL_MS",
            });
        }

        let goal_probability = parse_or(&lookup, "SIM_GOAL_PROBABILITY", defaults.goal_probability);
        if !(0.0..=1.0).contains(&goal_probability) {
            return Err(ConfigError::ProbabilityOutOfRange {
                key: "SIM_GOAL_PROBABILITY",
                value: goal_probability,
            });
        }

        Ok(Self {
            bind_addr,
            gateway,
            simulation: SimulationSettings {
                tick_interval: Duration::from_millis(tick_ms),
                goal_probability,
                seed: lookup("SIM_SEED").and_then(|v| v.parse().ok()),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = %raw, "unparseable value, using default");
            default
        }
    }
}
