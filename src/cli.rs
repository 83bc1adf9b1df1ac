//! Command-line interface definition for SkinMe.

use clap::{Parser, Subcommand};
use skinme_core::{Config, Language};
use std::path::PathBuf;

/// SkinMe - skincare product search, chat and skin analysis
#[derive(Parser, Debug, Clone)]
#[command(name = "skinme")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to the user config directory)
    #[arg(short, long, env = "SKINME_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Display language (zh, en); overrides the configured language
    #[arg(short, long, env = "SKINME_LANG")]
    pub lang: Option<Language>,

    /// SkinMe backend base URL; overrides services.backend_url
    #[arg(long, env = "SKINME_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// wttr.in compatible endpoint; overrides weather.base_url
    #[arg(long, env = "SKINME_WEATHER_URL")]
    pub weather_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Semantic product search
    Search {
        /// Search text, e.g. "gentle cleanser for oily skin"
        #[arg(required = true)]
        query: Vec<String>,

        /// Number of results to request
        #[arg(short = 'k', long, default_value_t = skinme_services::DEFAULT_TOP_K)]
        top_k: usize,
    },

    /// Chat with the skincare assistant
    ///
    /// With no message, reads one message per line from stdin until EOF.
    Chat {
        message: Vec<String>,
    },

    /// Upload a skin photo for analysis
    Analyze {
        /// Path to the image file
        image: PathBuf,

        /// Extra context for the analysis, e.g. "itchy after shaving"
        #[arg(short, long)]
        info: Option<String>,
    },

    /// Show current weather and skincare advice
    Weather,

    /// Record today's skin condition, tagged with the current weather
    Record {
        #[arg(required = true)]
        condition: Vec<String>,
    },

    /// List saved skin-condition history
    History {
        /// Only manually recorded conditions
        #[arg(long, conflicts_with = "auto")]
        manual: bool,

        /// Only auto-saved analysis results
        #[arg(long)]
        auto: bool,
    },

    /// Delete a manually recorded condition by id
    Delete {
        id: i64,
    },

    /// Save the preferred display language (zh, en)
    Language {
        language: Language,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply command-line endpoint overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.backend_url {
            config.services.backend_url = url.clone();
        }
        if let Some(url) = &self.weather_url {
            config.weather.base_url = url.clone();
        }
    }
}
