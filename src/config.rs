use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub prefix: String,
    // Applied to task listings when the caller sends no limit of its own
    pub task_list_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("APP"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
impl Config {
    pub fn test_defaults() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                max_body_size: 1024 * 1024,
            },
            api: ApiConfig {
                prefix: "/api".to_string(),
                task_list_limit: 100,
            },
        }
    }
}
