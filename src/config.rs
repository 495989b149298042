use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub otp: OtpConfig,
    pub twilio: TwilioConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    #[serde(default = "default_otp_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    /// Treat a failed cooldown lookup/claim as "no cooldown" instead of refusing issuance.
    #[serde(default = "default_cooldown_fail_open")]
    pub cooldown_fail_open: bool,
}

fn default_otp_ttl_secs() -> u64 {
    300
}

fn default_cooldown_secs() -> u64 {
    30
}

fn default_code_length() -> usize {
    6
}

fn default_cooldown_fail_open() -> bool {
    true
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_otp_ttl_secs(),
            cooldown_secs: default_cooldown_secs(),
            code_length: default_code_length(),
            cooldown_fail_open: default_cooldown_fail_open(),
        }
    }
}

impl OtpConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_phone: String,
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
}

fn default_country_code() -> String {
    "+91".to_string()
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // Without a config file everything comes from the environment.
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("Failed to parse config file {config_path}: {e}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    redis: RedisConfig {
                        url: redis_url_from_env()
                            .unwrap_or_else(|| "redis://127.0.0.1:6379".to_string()),
                    },
                    jwt: JwtConfig {
                        // An empty secret is rejected at startup by JwtService::new.
                        secret: get_env("JWT_SECRET")
                            .or_else(|| get_env("SECRET_KEY"))
                            .unwrap_or_default(),
                        expires_in: get_env_parse("JWT_EXPIRES_IN", 86_400i64),
                    },
                    otp: OtpConfig::default(),
                    twilio: TwilioConfig {
                        account_sid: get_env("TWILIO_ACCOUNT_SID").unwrap_or_default(),
                        auth_token: get_env("TWILIO_AUTH_TOKEN").unwrap_or_default(),
                        from_phone: get_env("TWILIO_FROM_PHONE")
                            .or_else(|| get_env("TWILIO_PHONE_NUMBER"))
                            .unwrap_or_default(),
                        default_country_code: default_country_code(),
                    },
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // Environment variables win over the file.
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Some(url) = redis_url_from_env() {
            config.redis.url = url;
        }
        if let Ok(v) = env::var("JWT_SECRET").or_else(|_| env::var("SECRET_KEY")) {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.expires_in = n;
        }
        if let Ok(v) = env::var("OTP_TTL_SECS")
            && let Ok(n) = v.parse()
        {
            config.otp.ttl_secs = n;
        }
        if let Ok(v) = env::var("OTP_COOLDOWN_SECS")
            && let Ok(n) = v.parse()
        {
            config.otp.cooldown_secs = n;
        }
        if let Ok(v) = env::var("OTP_CODE_LENGTH")
            && let Ok(n) = v.parse()
        {
            config.otp.code_length = n;
        }
        if let Ok(v) = env::var("OTP_COOLDOWN_FAIL_OPEN")
            && let Ok(b) = v.parse()
        {
            config.otp.cooldown_fail_open = b;
        }
        if let Ok(v) = env::var("TWILIO_ACCOUNT_SID") {
            config.twilio.account_sid = v;
        }
        if let Ok(v) = env::var("TWILIO_AUTH_TOKEN") {
            config.twilio.auth_token = v;
        }
        if let Ok(v) = env::var("TWILIO_FROM_PHONE").or_else(|_| env::var("TWILIO_PHONE_NUMBER")) {
            config.twilio.from_phone = v;
        }
        if let Ok(v) = env::var("SMS_DEFAULT_COUNTRY_CODE") {
            config.twilio.default_country_code = v;
        }

        if config.otp.code_length == 0 || config.otp.code_length > 9 {
            return Err(format!(
                "otp.code_length must be between 1 and 9, got {}",
                config.otp.code_length
            )
            .into());
        }

        Ok(config)
    }
}

/// `REDIS_URL`, or `REDIS_HOST` + `REDIS_PORT` when only those are set.
fn redis_url_from_env() -> Option<String> {
    if let Ok(url) = env::var("REDIS_URL") {
        return Some(url);
    }
    let host = env::var("REDIS_HOST").ok()?;
    let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
    Some(format!("redis://{host}:{port}"))
}
