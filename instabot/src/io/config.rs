//! Bot configuration stored in a TOML file with an `INSTABOT_*` environment
//! overlay.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::eligibility::Evaluator;
use crate::core::limits::{Limits, TagQuota, validate_limits};
use crate::core::types::{ActionKind, Tag};
use crate::error::EngineError;
use crate::retry::RetryPolicy;

/// Prefix for environment overrides; `limits.like.min` becomes
/// `INSTABOT_LIMITS_LIKE_MIN`.
pub const ENV_PREFIX: &str = "INSTABOT";

/// Bot configuration (TOML).
///
/// Missing fields default to values that perform no actions: with no
/// `[tags.*]` entries every quota is zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BotConfig {
    /// Follower-count bounds per action kind.
    pub limits: Limits,

    /// Tags to iterate, each with its per-kind quota.
    pub tags: BTreeMap<String, TagQuota>,

    pub tag_blacklist: Vec<String>,

    /// Comment pool; one entry is picked at random per comment.
    pub comments: Vec<String>,

    pub blacklist: Vec<String>,
    pub whitelist: Vec<String>,

    /// Skip identities already acted upon during this run.
    pub dedup: bool,

    pub retry: RetryConfig,
    pub user: UserConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserConfig {
    pub mail: Option<MailConfig>,
}

/// Notification transport settings. An empty password means the SMTP
/// session is not authenticated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MailConfig {
    pub from: String,
    pub password: String,
    pub to: String,
    /// `host:port` of the SMTP server.
    pub smtp: String,
    /// Host name used for authentication.
    pub server: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            tags: BTreeMap::new(),
            tag_blacklist: Vec::new(),
            comments: Vec::new(),
            blacklist: Vec::new(),
            whitelist: Vec::new(),
            dedup: false,
            retry: RetryConfig::default(),
            user: UserConfig::default(),
        }
    }
}

impl BotConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let mut errors = validate_limits(&self.limits);

        for name in self.tags.keys().chain(self.tag_blacklist.iter()) {
            if name.trim().is_empty() {
                errors.push("tag names must be non-empty".to_string());
            } else if name.starts_with('#') {
                errors.push(format!("tag '{name}' must not start with '#'"));
            }
        }
        if self.retry.max_attempts == 0 {
            errors.push("retry.max_attempts must be > 0".to_string());
        }
        let wants_comments = self.tags.values().any(|quota| quota.comment > 0);
        if wants_comments && self.comments.iter().all(|text| text.trim().is_empty()) {
            errors.push("comments must be non-empty when a tag has a comment quota".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::config(errors.join("; ")))
        }
    }

    /// Configured tags in sorted order.
    pub fn tag_list(&self) -> Vec<Tag> {
        self.tags.keys().map(|name| Tag::new(name.as_str())).collect()
    }

    pub fn quotas(&self) -> BTreeMap<Tag, TagQuota> {
        self.tags
            .iter()
            .map(|(name, quota)| (Tag::new(name.as_str()), *quota))
            .collect()
    }

    pub fn is_tag_blacklisted(&self, tag: &Tag) -> bool {
        self.tag_blacklist.iter().any(|name| name == tag.as_str())
    }

    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new(
            self.limits,
            self.blacklist.iter().cloned(),
            self.whitelist.iter().cloned(),
            self.dedup,
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            base_delay: Duration::from_secs(self.retry.base_delay_secs),
        }
    }
}

/// Load config from a TOML file, apply the process environment overlay and
/// validate.
///
/// A missing or malformed file is a configuration error.
pub fn load_config(path: &Path) -> Result<BotConfig> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
pub fn load_config_with_env<F>(path: &Path, lookup: F) -> Result<BotConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if !path.exists() {
        return Err(EngineError::config(format!("missing config file {}", path.display())).into());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut cfg: BotConfig = toml::from_str(&contents)
        .map_err(|err| EngineError::config(format!("parse {}: {err}", path.display())))?;
    apply_env_overrides(&mut cfg, lookup)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Environment variable name for a dotted config key.
pub fn env_key(key: &str) -> String {
    format!("{ENV_PREFIX}_{}", key.replace('.', "_").to_ascii_uppercase())
}

/// Override scalar settings from `INSTABOT_*` variables.
pub fn apply_env_overrides<F>(cfg: &mut BotConfig, lookup: F) -> Result<(), EngineError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(&env_key(key)).map(|raw| (env_key(key), raw));

    for kind in ActionKind::ALL {
        let range = cfg.limits.range_mut(kind);
        if let Some((name, raw)) = var(&format!("limits.{kind}.min")) {
            range.min = parse_value(&name, &raw)?;
        }
        if let Some((name, raw)) = var(&format!("limits.{kind}.max")) {
            range.max = parse_value(&name, &raw)?;
        }
    }

    if let Some((name, raw)) = var("dedup") {
        cfg.dedup = parse_bool(&raw).ok_or_else(|| {
            EngineError::config(format!("{name}: expected a boolean, got '{raw}'"))
        })?;
    }
    if let Some((name, raw)) = var("retry.max_attempts") {
        cfg.retry.max_attempts = parse_value(&name, &raw)?;
    }
    if let Some((name, raw)) = var("retry.base_delay_secs") {
        cfg.retry.base_delay_secs = parse_value(&name, &raw)?;
    }

    if let Some((_, raw)) = var("user.mail.from") {
        mail_mut(cfg).from = raw;
    }
    if let Some((_, raw)) = var("user.mail.password") {
        mail_mut(cfg).password = raw;
    }
    if let Some((_, raw)) = var("user.mail.to") {
        mail_mut(cfg).to = raw;
    }
    if let Some((_, raw)) = var("user.mail.smtp") {
        mail_mut(cfg).smtp = raw;
    }
    if let Some((_, raw)) = var("user.mail.server") {
        mail_mut(cfg).server = raw;
    }

    Ok(())
}

fn mail_mut(cfg: &mut BotConfig) -> &mut MailConfig {
    cfg.user.mail.get_or_insert_with(MailConfig::default)
}

fn parse_value<T: FromStr>(name: &str, raw: &str) -> Result<T, EngineError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|err| EngineError::config(format!("{name}: invalid value '{raw}' ({err})")))
}

/// Parse a boolean value from a raw string, accepting common env-style forms.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
