use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which store implementation the API binary wires into the cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Supabase,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(StoreBackend::Supabase),
            "memory" | "in_memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// How the booking flow marks a slot as taken.
///
/// `BestEffort` writes `isBooked = true` unconditionally, so two requests racing
/// for the same slot can both succeed. `ConditionalWrite` only flips the flag
/// when it is still `false` and rejects the loser of the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingPolicy {
    #[default]
    BestEffort,
    ConditionalWrite,
}

impl FromStr for BookingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best_effort" | "best-effort" => Ok(BookingPolicy::BestEffort),
            "conditional_write" | "conditional-write" | "cas" => Ok(BookingPolicy::ConditionalWrite),
            other => Err(format!("unknown booking policy '{}'", other)),
        }
    }
}

impl fmt::Display for BookingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingPolicy::BestEffort => write!(f, "best_effort"),
            BookingPolicy::ConditionalWrite => write!(f, "conditional_write"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_token: Option<String>,
    pub store_backend: StoreBackend,
    pub booking_policy: BookingPolicy,
    pub api_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_service_token: env::var("SUPABASE_SERVICE_TOKEN").ok(),
            store_backend: parse_or_default("STORE_BACKEND", StoreBackend::Supabase),
            booking_policy: parse_or_default("BOOKING_POLICY", BookingPolicy::default()),
            api_port: parse_or_default("API_PORT", 3000),
        };

        if config.store_backend == StoreBackend::Supabase && !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + fmt::Debug,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {} ({}), using default {:?}", key, e, default);
            default
        }),
        Err(_) => default,
    }
}
