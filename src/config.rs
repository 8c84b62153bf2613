use crate::client::CredentialEncoding;
use crate::error::{FetchError, Result};
use crate::models::{RequestMethod, ResponseMode};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Proxy list configuration
    pub proxy: ProxyListConfig,
    /// Demo request configuration
    pub request: RequestConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct ProxyListConfig {
    /// Path to the proxy list file (default: proxy.txt)
    pub file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// URL fetched by the binary
    pub target_url: String,
    /// GET or POST (default: GET)
    pub method: RequestMethod,
    /// json or text (default: json)
    pub mode: ResponseMode,
    /// Encoding of the proxy credentials (default: utf-8)
    pub auth_encoding: CredentialEncoding,
    /// Outer timeout wrapped around the call in seconds, 0 disables it
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let target_url = get_env_or(
            "FETCHPROXY_TARGET_URL",
            "https://jsonplaceholder.typicode.com/posts",
        );
        validate_target_url(&target_url)?;

        Ok(Config {
            proxy: ProxyListConfig {
                file: PathBuf::from(get_env_or("FETCHPROXY_PROXY_FILE", "proxy.txt")),
            },
            request: RequestConfig {
                target_url,
                method: RequestMethod::from_str(&get_env_or("FETCHPROXY_METHOD", "GET"))
                    .ok_or_else(|| {
                        FetchError::InvalidConfig("FETCHPROXY_METHOD must be GET or POST".into())
                    })?,
                mode: ResponseMode::from_str(&get_env_or("FETCHPROXY_MODE", "json")).ok_or_else(
                    || FetchError::InvalidConfig("FETCHPROXY_MODE must be json or text".into()),
                )?,
                auth_encoding: CredentialEncoding::from_str(&get_env_or(
                    "FETCHPROXY_AUTH_ENCODING",
                    "utf-8",
                ))
                .ok_or_else(|| {
                    FetchError::InvalidConfig(
                        "FETCHPROXY_AUTH_ENCODING must be utf-8 or latin-1".into(),
                    )
                })?,
                timeout_secs: get_env_or("FETCHPROXY_REQUEST_TIMEOUT", "0")
                    .parse()
                    .map_err(|_| {
                        FetchError::InvalidConfig(
                            "FETCHPROXY_REQUEST_TIMEOUT must be a whole number of seconds".into(),
                        )
                    })?,
            },
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format: match get_env_or("LOG_FORMAT", "pretty").to_lowercase().as_str() {
                    "pretty" | "text" => LogFormat::Pretty,
                    "json" => LogFormat::Json,
                    other => {
                        return Err(FetchError::InvalidConfig(format!(
                            "LOG_FORMAT must be pretty or json, got {}",
                            other
                        )))
                    }
                },
            },
        })
    }

    /// Timeout the caller should wrap around `fetch`, if any
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request.timeout_secs > 0).then(|| Duration::from_secs(self.request.timeout_secs))
    }
}

fn validate_target_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw).map_err(|e| {
        FetchError::InvalidConfig(format!("FETCHPROXY_TARGET_URL must be a valid URL: {}", e))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(FetchError::InvalidConfig(format!(
            "FETCHPROXY_TARGET_URL has unsupported scheme: {}",
            other
        ))),
    }
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const CONFIG_ENV_KEYS: &[&str] = &[
        "FETCHPROXY_PROXY_FILE",
        "FETCHPROXY_TARGET_URL",
        "FETCHPROXY_REQUEST_TIMEOUT",
        "FETCHPROXY_METHOD",
        "FETCHPROXY_MODE",
        "FETCHPROXY_AUTH_ENCODING",
        "LOG_LEVEL",
        "LOG_FORMAT",
    ];

    struct EnvGuard {
        saved: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(keys: &[&str]) -> Self {
            let saved = keys
                .iter()
                .map(|&key| {
                    let old = env::var(key).ok();
                    env::remove_var(key);
                    (key.to_string(), old)
                })
                .collect();

            Self { saved }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.saved.drain(..) {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_config_from_env_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        let config = Config::from_env().unwrap();

        assert_eq!(config.proxy.file, PathBuf::from("proxy.txt"));
        assert_eq!(
            config.request.target_url,
            "https://jsonplaceholder.typicode.com/posts"
        );
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.request.method, RequestMethod::Get);
        assert_eq!(config.request.mode, ResponseMode::Structured);
        assert_eq!(config.request.auth_encoding, CredentialEncoding::Utf8);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Pretty);
    }

    #[test]
    fn test_config_from_env_overrides() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("FETCHPROXY_PROXY_FILE", "/etc/fetchproxy/list.txt");
        env::set_var("FETCHPROXY_TARGET_URL", "http://127.0.0.1:8080/ping");
        env::set_var("FETCHPROXY_REQUEST_TIMEOUT", "15");
        env::set_var("LOG_LEVEL", "debug");
        env::set_var("FETCHPROXY_METHOD", "post");
        env::set_var("FETCHPROXY_MODE", "TEXT");
        env::set_var("FETCHPROXY_AUTH_ENCODING", "latin1");
        env::set_var("LOG_FORMAT", "JSON");

        let config = Config::from_env().unwrap();

        assert_eq!(config.proxy.file, PathBuf::from("/etc/fetchproxy/list.txt"));
        assert_eq!(config.request.target_url, "http://127.0.0.1:8080/ping");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.request.method, RequestMethod::Post);
        assert_eq!(config.request.mode, ResponseMode::Text);
        assert_eq!(config.request.auth_encoding, CredentialEncoding::Latin1);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_config_from_env_invalid_timeout() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("FETCHPROXY_REQUEST_TIMEOUT", "soon");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, FetchError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_from_env_invalid_target_url() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("FETCHPROXY_TARGET_URL", "not a url");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, FetchError::InvalidConfig(_)));

        env::set_var("FETCHPROXY_TARGET_URL", "ftp://files.example/list");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, FetchError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_from_env_invalid_request_choices() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("FETCHPROXY_METHOD", "DELETE");
        assert!(matches!(
            Config::from_env().unwrap_err(),
            FetchError::InvalidConfig(_)
        ));
        env::remove_var("FETCHPROXY_METHOD");

        env::set_var("FETCHPROXY_MODE", "xml");
        assert!(matches!(
            Config::from_env().unwrap_err(),
            FetchError::InvalidConfig(_)
        ));
        env::remove_var("FETCHPROXY_MODE");

        env::set_var("FETCHPROXY_AUTH_ENCODING", "koi8-r");
        assert!(matches!(
            Config::from_env().unwrap_err(),
            FetchError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_config_from_env_invalid_log_format() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard::new(CONFIG_ENV_KEYS);

        env::set_var("LOG_FORMAT", "xml");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, FetchError::InvalidConfig(_)));
    }
}
