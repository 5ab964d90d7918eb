use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_INDEX_URL: &str = "https://transcripts.fandom.com/wiki/Avatar:_The_Last_Airbender";
const DEFAULT_BASE_URL: &str = "https://transcripts.fandom.com";
const DEFAULT_SEASON_IDS: &[&str] = &["Book_One:_Water", "Book_Two:_Earth", "Book_Three:_Fire"];

/// Run-wide settings. Loaded once in `main` and passed down by reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub index_url: String,
    pub base_url: String,
    pub output_dir: String,
    /// Section anchors on the index page, in season order.
    pub season_ids: Vec<String>,
    pub file_prefix: String,
    pub file_extension: String,
    /// CSS selector for the article body of a transcript page.
    pub article_selector: String,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            index_url: DEFAULT_INDEX_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: "raw_data".to_string(),
            season_ids: DEFAULT_SEASON_IDS.iter().map(|s| s.to_string()).collect(),
            file_prefix: "transcript_".to_string(),
            file_extension: "csv".to_string(),
            article_selector: "#WikiaArticle".to_string(),
            user_agent: format!("transcript_scraper/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Settings {
    /// Defaults, then `transcripts.toml` if present, then `TRANSCRIPTS_*` env vars.
    pub fn load() -> Result<Settings, ConfigError> {
        let defaults = Settings::default();
        let settings: Settings = Config::builder()
            .set_default("index_url", defaults.index_url)?
            .set_default("base_url", defaults.base_url)?
            .set_default("output_dir", defaults.output_dir)?
            .set_default("season_ids", defaults.season_ids)?
            .set_default("file_prefix", defaults.file_prefix)?
            .set_default("file_extension", defaults.file_extension)?
            .set_default("article_selector", defaults.article_selector)?
            .set_default("user_agent", defaults.user_agent)?
            .add_source(File::with_name("transcripts").required(false))
            .add_source(
                Environment::with_prefix("TRANSCRIPTS")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("season_ids"),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.season_ids.is_empty() {
            return Err(ConfigError::Message("season_ids must not be empty".into()));
        }
        if self.season_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(ConfigError::Message("season_ids contains a blank entry".into()));
        }
        Ok(())
    }

    /// Resolve a link from the index page against `base_url`.
    pub fn page_url(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            return link.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            link.trim_start_matches('/')
        )
    }
}

// ── Tests ──
