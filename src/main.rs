use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use secondbrain::ai::{AiClientBuilder, AiClientTrait, DisabledClient};
use secondbrain::autotagger::{AiAssistant, TagNormalizer, clamp_max_tags};
use secondbrain::config::Config;
use secondbrain::utils::ensure_database_directory;
use secondbrain::{
    Database, FilterState, ItemId, ItemUpdate, KnowledgeItem, KnowledgeService, KnowledgeType,
    NewKnowledgeItem, SortOption, ValidationError,
};

/// Content longer than this is summarized on `add` and `edit` unless
/// `--no-summary` is given.
const AUTO_SUMMARY_MIN_CHARS: usize = 100;

const SUMMARY_FAILED_WARNING: &str = "Warning: Failed to generate summary; item saved without one.";

/// sb - a personal second brain for notes, links and insights
#[derive(Parser)]
#[command(name = "sb")]
#[command(about = "A personal knowledge base with AI summaries and tag suggestions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Add a new knowledge item
    Add(AddCommand),
    /// List items, optionally filtered and sorted
    List(ListCommand),
    /// Show a single item
    Show(ShowCommand),
    /// Edit fields of an existing item
    Edit(EditCommand),
    /// Delete an item
    Delete(IdArg),
    /// List every tag in use
    Tags,
    /// Suggest tags for a title and content without saving anything
    SuggestTags(SuggestTagsCommand),
    /// Summarize a stored item and save the summary
    Summarize(IdArg),
    /// Ask a question answered from your stored items
    Ask(AskCommand),
}

#[derive(Args)]
struct AddCommand {
    #[arg(long)]
    title: String,

    #[arg(long)]
    content: String,

    /// note, link or insight
    #[arg(long = "type", value_name = "TYPE", default_value = "note")]
    kind: KnowledgeType,

    /// Comma-separated tags to apply to the item
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,

    #[arg(long, value_name = "URL")]
    source_url: Option<String>,

    /// Merge suggested tags into the given ones
    #[arg(long)]
    auto_tag: bool,

    /// Skip the automatic summary for long content
    #[arg(long)]
    no_summary: bool,
}

#[derive(Args)]
struct ListCommand {
    /// Case-insensitive text to find in titles or content
    #[arg(short, long)]
    search: Option<String>,

    #[arg(long = "type", value_name = "TYPE")]
    kind: Option<KnowledgeType>,

    /// Only items with this tag (repeat to require several)
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// recent, oldest or title
    #[arg(long, default_value = "recent")]
    sort: SortOption,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ShowCommand {
    id: ItemId,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct EditCommand {
    id: ItemId,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    content: Option<String>,

    #[arg(long = "type", value_name = "TYPE")]
    kind: Option<KnowledgeType>,

    /// Comma-separated tags replacing the current ones
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,

    /// New source URL; an empty value clears it
    #[arg(long, value_name = "URL")]
    source_url: Option<String>,

    /// Skip the automatic summary for long content
    #[arg(long)]
    no_summary: bool,
}

#[derive(Args)]
struct IdArg {
    id: ItemId,
}

#[derive(Args)]
struct SuggestTagsCommand {
    #[arg(long)]
    title: String,

    #[arg(long)]
    content: String,

    /// Use only the local extractor
    #[arg(long)]
    local: bool,

    /// Maximum number of locally extracted tags
    #[arg(long, default_value_t = 6, allow_negative_numbers = true)]
    max: i64,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AskCommand {
    question: String,

    /// Only use items with this tag (repeat to require several)
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,
}

/// Errors caused by what the user asked for, reported with exit code 1.
#[derive(Debug, Error)]
enum CliError {
    #[error("No item with id {0}")]
    NotFound(ItemId),

    #[error("Nothing to update; pass at least one field to change")]
    NothingToUpdate,

    #[error("Failed to generate {0}; the AI function could not be reached")]
    AiUnavailable(&'static str),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are invalid input or references to items that do not exist.
/// Internal errors include database failures and I/O errors.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.downcast_ref::<ValidationError>().is_some() || error.downcast_ref::<CliError>().is_some()
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    ensure_database_directory(&config.db_path)?;
    let db = Database::open(&config.db_path).context("Failed to open database")?;
    let service = KnowledgeService::new(db);

    let assistant = match &cli.command {
        Commands::SuggestTags(cmd) => {
            build_assistant(&config).with_fallback_limit(clamp_max_tags(cmd.max))
        }
        _ => build_assistant(&config),
    };

    match cli.command {
        Commands::Add(cmd) => execute_add(&cmd, &service, &assistant).await,
        Commands::List(cmd) => execute_list(&cmd, &service),
        Commands::Show(cmd) => execute_show(&cmd, &service),
        Commands::Edit(cmd) => execute_edit(cmd, &service, &assistant).await,
        Commands::Delete(cmd) => execute_delete(cmd.id, &service),
        Commands::Tags => execute_tags(&service),
        Commands::SuggestTags(cmd) => execute_suggest_tags(&cmd, &assistant).await,
        Commands::Summarize(cmd) => execute_summarize(cmd.id, &service, &assistant).await,
        Commands::Ask(cmd) => execute_ask(&cmd, &service, &assistant).await,
    }
}

/// Creates the assistant, falling back to a disabled client when the AI
/// function is not configured or its URL is unusable.
fn build_assistant(config: &Config) -> AiAssistant {
    let client: Arc<dyn AiClientTrait> = match AiClientBuilder::from_config(config).build() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            if config.ai_configured() {
                warn!(error = %e, "AI client unavailable; using local features only");
            }
            Arc::new(DisabledClient)
        }
    };
    AiAssistant::new(client)
}

async fn execute_add(
    cmd: &AddCommand,
    service: &KnowledgeService,
    assistant: &AiAssistant,
) -> Result<()> {
    let user_tags = cmd
        .tags
        .as_deref()
        .map(TagNormalizer::parse_list)
        .unwrap_or_default();

    let mut item = NewKnowledgeItem::new(&cmd.title, &cmd.content)
        .kind(cmd.kind)
        .tags(&user_tags);
    if let Some(url) = &cmd.source_url {
        item = item.source_url(url);
    }
    // Fail fast before spending a network call on invalid input
    item.validate()?;

    if cmd.auto_tag {
        let suggested = assistant.auto_tag(&cmd.title, &cmd.content).await;
        if let Some(notice) = suggested.notice() {
            eprintln!("{notice}");
        }
        let suggested = TagNormalizer::normalize_tags(&suggested.tags);
        item = item.tags(TagNormalizer::merge(&user_tags, &suggested));
    }

    if should_summarize(&cmd.content, cmd.no_summary) {
        match assistant.summarize(&cmd.title, &cmd.content).await {
            Some(summary) => item = item.summary(summary),
            None => eprintln!("{SUMMARY_FAILED_WARNING}"),
        }
    }

    let created = service.create_item(item).context("Failed to create item")?;

    print!("Item created (id: {})", created.id);
    if !created.tags.is_empty() {
        print!(" with tags: {}", created.tags.join(", "));
    }
    println!();
    Ok(())
}

fn should_summarize(content: &str, no_summary: bool) -> bool {
    !no_summary && content.chars().count() > AUTO_SUMMARY_MIN_CHARS
}

fn list_filter(cmd: &ListCommand) -> FilterState {
    let mut filter = FilterState::default().tags(&cmd.tags).sort(cmd.sort);
    if let Some(search) = &cmd.search {
        filter = filter.search(search);
    }
    if let Some(kind) = cmd.kind {
        filter = filter.kind(kind);
    }
    filter
}

fn execute_list(cmd: &ListCommand, service: &KnowledgeService) -> Result<()> {
    let items = service.list_items(&list_filter(cmd))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No items found.");
        return Ok(());
    }
    for item in &items {
        println!("{}", format_list_line(item));
    }
    Ok(())
}

fn format_list_line(item: &KnowledgeItem) -> String {
    let mut line = format!("#{} [{}] {}", item.id, item.kind, item.title);
    if !item.tags.is_empty() {
        line.push_str(&format!("  ({})", item.tags.join(", ")));
    }
    line
}

fn execute_show(cmd: &ShowCommand, service: &KnowledgeService) -> Result<()> {
    let item = service
        .get_item(cmd.id)?
        .ok_or(CliError::NotFound(cmd.id))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        print!("{}", format_item(&item));
    }
    Ok(())
}

fn format_item(item: &KnowledgeItem) -> String {
    let mut out = format!("#{} [{}] {}\n", item.id, item.kind, item.title);
    if !item.tags.is_empty() {
        out.push_str(&format!("Tags: {}\n", item.tags.join(", ")));
    }
    if let Some(url) = &item.source_url {
        out.push_str(&format!("Source: {}\n", url));
    }
    out.push_str(&format!("Created: {}\n", item.created_at));
    if let Some(summary) = &item.summary {
        out.push_str(&format!("Summary: {}\n", summary));
    }
    out.push('\n');
    out.push_str(&item.content);
    out.push('\n');
    out
}

fn edit_update(cmd: EditCommand) -> ItemUpdate {
    ItemUpdate {
        title: cmd.title,
        content: cmd.content,
        kind: cmd.kind,
        tags: cmd.tags.as_deref().map(TagNormalizer::parse_list),
        source_url: cmd.source_url,
        summary: None,
    }
}

async fn execute_edit(
    cmd: EditCommand,
    service: &KnowledgeService,
    assistant: &AiAssistant,
) -> Result<()> {
    let id = cmd.id;
    let no_summary = cmd.no_summary;
    let mut update = edit_update(cmd);
    if update.is_empty() {
        return Err(CliError::NothingToUpdate.into());
    }

    let current = service.get_item(id)?.ok_or(CliError::NotFound(id))?;
    let merged = update.apply_to(&current);
    // Fail fast before spending a network call on invalid input
    merged.validate()?;

    if merged.summary.is_none() && should_summarize(&merged.content, no_summary) {
        match assistant.summarize(&merged.title, &merged.content).await {
            Some(summary) => update.summary = Some(summary),
            None => eprintln!("{SUMMARY_FAILED_WARNING}"),
        }
    }

    let updated = service
        .update_item(id, update)?
        .ok_or(CliError::NotFound(id))?;
    println!("Item updated (id: {})", updated.id);
    Ok(())
}

fn execute_delete(id: ItemId, service: &KnowledgeService) -> Result<()> {
    if !service.delete_item(id)? {
        return Err(CliError::NotFound(id).into());
    }
    println!("Item deleted (id: {})", id);
    Ok(())
}

fn execute_tags(service: &KnowledgeService) -> Result<()> {
    for tag in service.all_tags()? {
        println!("{}", tag);
    }
    Ok(())
}

async fn execute_suggest_tags(cmd: &SuggestTagsCommand, assistant: &AiAssistant) -> Result<()> {
    let result = if cmd.local {
        assistant.local_tags(&cmd.title, &cmd.content)
    } else {
        assistant.auto_tag(&cmd.title, &cmd.content).await
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if let Some(notice) = result.notice() {
        eprintln!("{notice}");
    }
    if result.tags.is_empty() {
        println!("No tags suggested.");
    } else {
        println!("{} (source: {})", result.tags.join(", "), result.source());
    }
    Ok(())
}

async fn execute_summarize(
    id: ItemId,
    service: &KnowledgeService,
    assistant: &AiAssistant,
) -> Result<()> {
    let item = service.get_item(id)?.ok_or(CliError::NotFound(id))?;

    let summary = assistant
        .summarize(&item.title, &item.content)
        .await
        .ok_or(CliError::AiUnavailable("summary"))?;

    service.set_summary(id, &summary)?;
    println!("{}", summary);
    Ok(())
}

async fn execute_ask(
    cmd: &AskCommand,
    service: &KnowledgeService,
    assistant: &AiAssistant,
) -> Result<()> {
    let items = service.list_items(&FilterState::default().tags(&cmd.tags))?;

    let answer = assistant
        .ask(&cmd.question, &items)
        .await
        .ok_or(CliError::AiUnavailable("answer"))?;

    println!("{}", answer);
    Ok(())
}
