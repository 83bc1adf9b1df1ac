//! SkinMe command-line client.

mod cli;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use cli::{Cli, Commands};
use skinme_core::{AppError, Config, Language};
use skinme_history::{FileStore, HistoryList, HistoryStore, SkinConditionRecord};
use skinme_services::{record_condition, BackendClient, ChatMessage, ChatSession, ImageUpload};
use skinme_weather::{location, WeatherFetcher, WeatherReport, WttrClient};

/// Shared handles built from configuration.
struct Runtime {
    config: Config,
    config_path: Option<PathBuf>,
    language: Language,
    history: Arc<HistoryStore>,
}

impl Runtime {
    fn new(config: Config, config_path: Option<PathBuf>, language: Language) -> Self {
        let data_dir = config.storage.effective_data_dir();
        tracing::debug!("History storage at {:?}", data_dir);
        let history = Arc::new(HistoryStore::new(Arc::new(FileStore::new(data_dir))));
        Self {
            config,
            config_path,
            language,
            history,
        }
    }

    fn session(&self) -> Result<ChatSession, AppError> {
        let client = BackendClient::new(
            &self.config.services.backend_url,
            Duration::from_secs(self.config.services.timeout_secs),
        )?;
        Ok(ChatSession::new(client, self.history.clone(), self.language))
    }

    async fn weather(&self) -> Result<WeatherReport, AppError> {
        let client = WttrClient::new(
            &self.config.weather.base_url,
            Duration::from_secs(self.config.weather.timeout_secs),
        )?;
        let source = location::from_coordinates(self.config.weather.coordinates());
        let mut fetcher = WeatherFetcher::new(client, source, self.language);
        Ok(fetcher.refresh().await)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    skinme_core::init(if cli.verbose { "debug" } else { "warn" })?;

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => exit_with(AppError::from_config(e)),
    };
    let language = cli.lang.unwrap_or(config.ui.language);
    let runtime = Runtime::new(config, cli.config.clone(), language);

    if let Err(e) = run(&runtime, cli.command).await {
        exit_with(e);
    }

    Ok(())
}

/// Load the config file, then apply command-line overrides and validate.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply_overrides(&mut config);
    let (config, _) = config.validated()?;
    Ok(config)
}

/// Joined condition words, or `None` when there is nothing to record.
fn condition_text(words: &[String]) -> Option<String> {
    let condition = words.join(" ");
    (!condition.trim().is_empty()).then_some(condition)
}

fn exit_with(e: AppError) -> ! {
    tracing::error!("{}", e);
    eprintln!("{}", e.user_message());
    std::process::exit(1);
}

async fn run(runtime: &Runtime, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Search { query, top_k } => search(runtime, &query.join(" "), top_k).await,
        Commands::Chat { message } => chat(runtime, message).await,
        Commands::Analyze { image, info } => {
            let upload = ImageUpload::from_path(&image)
                .with_context(|| format!("Failed to read image {}", image.display()))?;
            analyze(runtime, &upload, info.as_deref()).await
        }
        Commands::Weather => {
            let report = runtime.weather().await?;
            print_weather(&report, runtime.language);
            Ok(())
        }
        Commands::Record { condition } => {
            // Blank input never reaches the weather endpoint.
            let Some(condition) = condition_text(&condition) else {
                return Ok(());
            };
            let report = runtime.weather().await?;
            if record_condition(&runtime.history, &condition, Some(&report))? {
                println!("{}", saved_label(runtime.language));
            }
            Ok(())
        }
        Commands::History { manual, auto } => {
            let lists: &[HistoryList] = match (manual, auto) {
                (true, _) => &[HistoryList::Manual],
                (_, true) => &[HistoryList::AutoAnalysis],
                _ => &[HistoryList::Manual, HistoryList::AutoAnalysis],
            };
            for list in lists {
                print_history(*list, &runtime.history.load(*list), runtime.language);
            }
            Ok(())
        }
        Commands::Delete { id } => {
            if runtime.history.remove(HistoryList::Manual, id)? {
                println!("Deleted record {}", id);
            } else {
                println!("No record with id {}", id);
            }
            Ok(())
        }
        Commands::Language { language } => {
            let mut config = runtime.config.clone();
            config.ui.language = language;
            match &runtime.config_path {
                Some(path) => config.save_to(path)?,
                None => config.save()?,
            }
            println!("{}", saved_label(language));
            Ok(())
        }
    }
}

async fn search(runtime: &Runtime, query: &str, top_k: usize) -> Result<(), AppError> {
    let mut session = runtime.session()?.with_top_k(top_k);
    if !session.run_query(query).await {
        return Ok(());
    }

    if let Some(error) = session.query_error() {
        return Err(AppError::Service(error.to_string()));
    }

    let Some(results) = session.query_results() else {
        return Ok(());
    };
    if results.results.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    for (idx, result) in results.results.iter().enumerate() {
        print!("{}. {}", idx + 1, result.display_name());
        if let Some(brand) = result.metadata_str("brand") {
            print!(" - {}", brand);
        }
        if let Some(distance) = result.distance {
            print!(" [{:.3}]", distance);
        }
        println!();
        if let Some(body) = result.body() {
            println!("   {}", body);
        }
        println!("   Buy:  {}", result.buy_url());
        println!("   EWG:  {}", result.lookup_url());
    }
    Ok(())
}

async fn chat(runtime: &Runtime, message: Vec<String>) -> Result<(), AppError> {
    let mut session = runtime.session()?;

    if !message.is_empty() {
        if let Some(reply) = session.send_chat(&message.join(" ")).await {
            print_message(reply);
        }
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(reply) = session.send_chat(&line).await {
            print_message(reply);
        }
    }
    Ok(())
}

async fn analyze(
    runtime: &Runtime,
    upload: &ImageUpload,
    info: Option<&str>,
) -> Result<(), AppError> {
    let mut session = runtime.session()?;
    let reply = session.analyze_image(upload, info).await;
    print_message(reply);
    Ok(())
}

fn print_message(message: &ChatMessage) {
    println!("{}", message.content);
    for product in message.products.iter().flatten() {
        println!("- {}", product.name);
        println!("  Buy:  {}", product.buy_url());
        println!("  EWG:  {}", product.lookup_url());
    }
    println!();
}

fn print_weather(report: &WeatherReport, language: Language) {
    if let Some(warning) = &report.location_warning {
        eprintln!("{}", warning);
    }

    println!("{}", report.area_label(language));
    if let Some(current) = report.data.current() {
        let (temp, feels, humidity) = match language {
            Language::Zh => ("温度", "体感", "湿度"),
            Language::En => ("Temperature", "Feels like", "Humidity"),
        };
        println!("  {}: {}°C", temp, current.temp_c);
        println!("  {}: {}°C", feels, current.feels_like_c);
        println!("  {}: {}%", humidity, current.humidity);
        println!("  {}", current.description());
    }
    if let Some(advice) = report.advice(language) {
        println!();
        println!("{}", advice);
    }
}

fn print_history(list: HistoryList, records: &[SkinConditionRecord], language: Language) {
    let title = match (list, language) {
        (HistoryList::Manual, Language::Zh) => "皮肤状况记录",
        (HistoryList::Manual, Language::En) => "Skin condition records",
        (HistoryList::AutoAnalysis, Language::Zh) => "分析历史",
        (HistoryList::AutoAnalysis, Language::En) => "Analysis history",
    };
    println!("{} ({})", title, records.len());

    for record in records {
        println!("[{}] {}  {}", record.id, record.date, record.condition);
        if let Some(weather) = &record.weather {
            println!("    {}°C, {}%, {}", weather.temp, weather.humidity, weather.desc);
        }
        if let Some(analysis) = &record.analysis {
            if let Some(skin_type) = &analysis.skin_type {
                println!("    {}", skin_type);
            }
            if let Some(summary) = &analysis.summary {
                println!("    {}", summary);
            }
        }
    }
    println!();
}

fn saved_label(language: Language) -> &'static str {
    match language {
        Language::Zh => "已保存",
        Language::En => "Saved",
    }
}
