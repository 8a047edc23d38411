use std::path::PathBuf;

use serde::Deserialize;

use crate::services::recommendations::RecommendationLimits;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the outlet order CSVs and the menu file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Menu file name inside `data_dir`
    #[serde(default = "default_menu_file")]
    pub menu_file: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Neighbors consulted per recommendation
    #[serde(default = "default_neighbors")]
    pub neighbors: usize,

    /// Recommendations returned when the request does not say
    #[serde(default = "default_recommendations")]
    pub default_recommendations: usize,

    /// Largest recommendation count a caller may ask for
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("Data")
}

fn default_menu_file() -> String {
    "menu.csv".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_neighbors() -> usize {
    3
}

fn default_recommendations() -> usize {
    5
}

fn default_max_recommendations() -> usize {
    50
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.neighbors == 0 {
            anyhow::bail!("NEIGHBORS must be at least 1");
        }
        if self.default_recommendations > self.max_recommendations {
            anyhow::bail!(
                "DEFAULT_RECOMMENDATIONS ({}) exceeds MAX_RECOMMENDATIONS ({})",
                self.default_recommendations,
                self.max_recommendations
            );
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn limits(&self) -> RecommendationLimits {
        RecommendationLimits {
            default_count: self.default_recommendations,
            max_count: self.max_recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()));
        envy::from_iter::<_, Config>(vars).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]);

        assert_eq!(config.data_dir, PathBuf::from("Data"));
        assert_eq!(config.menu_file, "menu.csv");
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.neighbors, 3);
        assert_eq!(config.default_recommendations, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("DATA_DIR", "/srv/orders"),
            ("PORT", "9000"),
            ("NEIGHBORS", "7"),
            ("MAX_RECOMMENDATIONS", "20"),
        ]);

        assert_eq!(config.data_dir, PathBuf::from("/srv/orders"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.neighbors, 7);
        assert_eq!(config.limits().max_count, 20);
    }

    #[test]
    fn test_validate_rejects_zero_neighbors() {
        let config = from_pairs(&[("NEIGHBORS", "0")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_default_above_max() {
        let config = from_pairs(&[
            ("DEFAULT_RECOMMENDATIONS", "10"),
            ("MAX_RECOMMENDATIONS", "5"),
        ]);
        assert!(config.validate().is_err());
    }
}
