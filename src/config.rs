use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;
use url::Url;

/// Fixed instruction sent with every attribute request.
pub const ATTRIBUTE_SYSTEM_PROMPT: &str = "You are an expert at image classification and attribution. \
Your job is to analyse images of lost items and create a json of attributes \
that effectively describe the unique features of that item. \
Use attributes that would be commonly used to identify lost items such as item type, color, etc.";

pub const ATTRIBUTE_USER_PROMPT: &str = "Here is the image you need to create attributes for:";

/// URL prefix under which stored images are served.
pub const UPLOADS_PREFIX: &str = "/uploads";

const DEFAULT_CONFIG_FILE: &str = "lostfound.toml";

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::load().expect("FATAL: invalid lostfound configuration"));

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub listen_addr: String,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub ollama_url: Url,
    pub model: String,
    /// Run the vision model server-side when the client sent no attributes.
    pub generate_attributes: bool,
    pub generator_timeout_secs: u64,
    /// Drop and recreate the items table on boot.
    pub reset_on_start: bool,
    pub loglevel: String,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8888".to_string(),
            database_url: "sqlite://lostfound.db".to_string(),
            upload_dir: PathBuf::from("./uploads"),
            ollama_url: Url::parse("http://localhost:11434").expect("static url"),
            model: "llama3.2-vision".to_string(),
            generate_attributes: true,
            generator_timeout_secs: 120,
            reset_on_start: false,
            loglevel: "info".to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Defaults, then `lostfound.toml` (or `$LOSTFOUND_CONFIG`), then `LOSTFOUND_*` env.
    pub fn load() -> Result<Self, figment::Error> {
        let file = std::env::var("LOSTFOUND_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::figment(file).extract()
    }

    fn figment(file: PathBuf) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed("LOSTFOUND_").ignore(&["config"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_sources() {
        Jail::expect_with(|_jail| {
            let cfg = Config::load()?;
            assert_eq!(cfg.listen_addr, "0.0.0.0:8888");
            assert_eq!(cfg.model, "llama3.2-vision");
            assert!(cfg.generate_attributes);
            assert!(!cfg.reset_on_start);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "lostfound.toml",
                r#"
                model = "llava"
                upload_dir = "/srv/uploads"
                "#,
            )?;
            jail.set_env("LOSTFOUND_MODEL", "bakllava");
            jail.set_env("LOSTFOUND_GENERATE_ATTRIBUTES", "false");

            let cfg = Config::load()?;
            assert_eq!(cfg.model, "bakllava");
            assert_eq!(cfg.upload_dir, PathBuf::from("/srv/uploads"));
            assert!(!cfg.generate_attributes);
            Ok(())
        });
    }
}
