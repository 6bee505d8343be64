//! Filepath: src/infra/config.rs
//! Layered configuration: `ctxpack.toml`/`.ctxpack.toml` on disk,
//! overridden by `CTXPACK_`-prefixed environment variables.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};
use crate::core::error::PipelineError;
use crate::core::optimize::OptimizeOptions;
use crate::core::split::{SplitSettings, SplitStrategy};

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Default ignore patterns (in addition to .gitignore).
    pub ignore_patterns: Vec<String>,

    /// Default optimization flags applied by `assemble`/`optimize`.
    pub optimize: OptimizeConfig,

    /// Default split settings applied by `split`.
    pub split: SplitConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptimizeConfig {
    pub collapse_empty_lines: bool,
    pub strip_license: bool,
    pub strip_comments: bool,
    pub compact_data_files: bool,
    pub skeleton_mode: bool,
    pub trim_whitespace: bool,
}

impl From<&OptimizeConfig> for OptimizeOptions {
    fn from(c: &OptimizeConfig) -> Self {
        Self {
            collapse_empty_lines: c.collapse_empty_lines,
            strip_license: c.strip_license,
            strip_comments: c.strip_comments,
            compact_data_files: c.compact_data_files,
            skeleton_mode: c.skeleton_mode,
            trim_whitespace: c.trim_whitespace,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SplitConfig {
    pub max_tokens_per_chunk: usize,
    pub overlap_tokens: usize,
    pub strategy: String,
}

impl SplitConfig {
    pub fn to_split_settings(&self) -> std::result::Result<SplitSettings, PipelineError> {
        let strategy = match self.strategy.as_str() {
            "file" => SplitStrategy::File,
            "token" => SplitStrategy::Token,
            "smart" => SplitStrategy::Smart,
            other => {
                return Err(PipelineError::InvalidArgument(format!(
                    "unknown split strategy: {other}"
                )))
            }
        };
        SplitSettings::new(self.max_tokens_per_chunk, self.overlap_tokens, strategy)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_patterns: vec![
                "target/".to_string(),
                "node_modules/".to_string(),
                "dist/".to_string(),
                "build/".to_string(),
                ".git/".to_string(),
                "*.pyc".to_string(),
                "__pycache__/".to_string(),
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
            ],
            optimize: OptimizeConfig {
                collapse_empty_lines: true,
                strip_license: false,
                strip_comments: false,
                compact_data_files: true,
                skeleton_mode: false,
                trim_whitespace: true,
            },
            split: SplitConfig {
                max_tokens_per_chunk: 8000,
                overlap_tokens: 200,
                strategy: "smart".to_string(),
            },
        }
    }
}

pub fn load_config() -> Result<Config> {
    let mut builder = config::Config::builder();

    let config_paths = ["ctxpack.toml", "ctxpack.yaml", "ctxpack.json", ".ctxpack.toml"];

    for path in &config_paths {
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    builder = builder.add_source(config::Environment::with_prefix("CTXPACK").separator("_"));

    let cfg = builder.build().context("Failed to load configuration")?;
    let parsed: Config = cfg.try_deserialize().context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(args: InitArgs, ctx: &AppContext) -> Result<()> {
    let config_path = args.path.join("ctxpack.toml");

    if config_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&s).unwrap();
        assert_eq!(parsed.ignore_patterns, cfg.ignore_patterns);
    }

    #[test]
    fn split_config_rejects_unknown_strategy() {
        let cfg = SplitConfig {
            max_tokens_per_chunk: 100,
            overlap_tokens: 0,
            strategy: "bogus".to_string(),
        };
        assert!(cfg.to_split_settings().is_err());
    }
}
