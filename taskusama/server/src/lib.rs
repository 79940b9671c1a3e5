pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Config {
        /// Postgres connection string; issues are kept in memory when unset.
        #[serde(default)]
        pub database_url: Option<String>,
        #[serde(default = "default_port")]
        pub port: u16,
        /// Whether the in-memory store starts with sample issues.
        #[serde(default = "default_seed_fixtures")]
        pub seed_fixtures: bool,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(config::Environment::default())
                .build()?;
            Self::from_settings(settings)
        }

        fn from_settings(settings: config::Config) -> anyhow::Result<Self> {
            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }

        /// Returns the database URL, treating a blank value as unset.
        pub fn database_url(&self) -> Option<&str> {
            self.database_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
        }
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_seed_fixtures() -> bool {
        true
    }

}

pub mod entities;
pub mod issue;
pub mod web;
