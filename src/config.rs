// Configuration module for scout
// Reads from environment variables with sensible defaults

use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::warn;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Timeout for version-control queries (SCOUT_VCS_TIMEOUT_SECS)
    pub vcs_timeout_secs: u64,

    /// Timeout for one tag extraction pass (SCOUT_TAG_TIMEOUT_SECS)
    pub tag_timeout_secs: u64,

    /// Timeout for the raw content search (SCOUT_SEARCH_TIMEOUT_SECS)
    pub search_timeout_secs: u64,

    /// Cap on files handed to the tag tool in one invocation (SCOUT_MAX_TAG_FILES)
    pub max_tag_files: usize,

    /// Tag extraction binary (SCOUT_CTAGS)
    pub ctags_bin: String,

    /// Content search binary (SCOUT_RG)
    pub rg_bin: String,

    /// Version-control binary (SCOUT_GIT)
    pub git_bin: String,

    /// SQLite busy timeout in seconds (SCOUT_BUSY_TIMEOUT_SECS)
    pub busy_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vcs_timeout_secs: 10,
            tag_timeout_secs: 120,
            search_timeout_secs: 30,
            max_tag_files: 10_000,
            ctags_bin: "ctags".to_string(),
            rg_bin: "rg".to_string(),
            git_bin: "git".to_string(),
            busy_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let mut config = Config::default();

        read_parsed("SCOUT_VCS_TIMEOUT_SECS", &mut config.vcs_timeout_secs);
        read_parsed("SCOUT_TAG_TIMEOUT_SECS", &mut config.tag_timeout_secs);
        read_parsed("SCOUT_SEARCH_TIMEOUT_SECS", &mut config.search_timeout_secs);
        read_parsed("SCOUT_MAX_TAG_FILES", &mut config.max_tag_files);
        read_parsed("SCOUT_BUSY_TIMEOUT_SECS", &mut config.busy_timeout_secs);
        read_string("SCOUT_CTAGS", &mut config.ctags_bin);
        read_string("SCOUT_RG", &mut config.rg_bin);
        read_string("SCOUT_GIT", &mut config.git_bin);

        config
    }

    /// Get the global configuration instance
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }

    pub fn vcs_timeout(&self) -> Duration {
        Duration::from_secs(self.vcs_timeout_secs.max(1))
    }

    pub fn tag_timeout(&self) -> Duration {
        Duration::from_secs(self.tag_timeout_secs.max(1))
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs.max(1))
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}

fn read_parsed<T>(key: &str, slot: &mut T)
where
    T: FromStr + std::fmt::Display,
{
    let Ok(val) = env::var(key) else {
        return;
    };
    match val.trim().parse() {
        Ok(parsed) => *slot = parsed,
        Err(_) => warn!("invalid {key} value: {val}, using default: {slot}"),
    }
}

fn read_string(key: &str, slot: &mut String) {
    if let Ok(val) = env::var(key) {
        let trimmed = val.trim();
        if trimmed.is_empty() {
            warn!("empty {key}, using default: {slot}");
        } else {
            *slot = trimmed.to_string();
        }
    }
}
