use super::print::{print_card_detail, print_cards, print_info, print_success, CardRow};
use super::setup::{Cli, Commands};
use clap::Parser;
use directories::ProjectDirs;
use scv::clock::SystemClock;
use scv::config::ScvConfig;
use scv::error::{Result, ScvError};
use scv::model::{Card, CardKey, CardKind, CardPayload};
use scv::store::fs::FileStore;
use scv::store::kv::FileKeyValueStore;
use scv::CardManager;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

const HOME_ENV: &str = "SCV_HOME";

type Manager = CardManager<FileStore, FileKeyValueStore, SystemClock>;

struct AppContext {
    manager: Manager,
    config: ScvConfig,
    data_dir: PathBuf,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut ctx = init_context()?;

    match cli.command {
        Some(Commands::New { kind, text, name }) => handle_new(&mut ctx, kind, text, name),
        Some(Commands::List { kind }) => handle_list(&ctx, kind),
        None => handle_list(&ctx, None),
        Some(Commands::Show { key }) => handle_show(&ctx, key),
        Some(Commands::Select { key }) => handle_select(&mut ctx, &key),
        Some(Commands::Remove { keys }) => handle_remove(&mut ctx, &keys),
        Some(Commands::Rename { key, name }) => handle_rename(&mut ctx, &key, &name),
        Some(Commands::Set { key, text }) => handle_set(&mut ctx, &key, &text),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    // Only fails if a logger is already installed.
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("org", "sc-voice", "scv")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ScvError::Store("Could not determine data directory".to_string()))
}

fn init_context() -> Result<AppContext> {
    let data_dir = data_dir()?;
    let config = ScvConfig::load(&data_dir)?;
    let labels = config.labels(&data_dir)?;

    let manager = CardManager::open(
        FileStore::new(&data_dir),
        FileKeyValueStore::new(&data_dir),
        SystemClock,
    )?
    .with_labels(labels);

    Ok(AppContext {
        manager,
        config,
        data_dir,
    })
}

fn parse_key(raw: &str) -> Result<CardKey> {
    raw.parse()
        .map_err(|_| ScvError::InvalidCardKey(raw.to_string()))
}

fn row(ctx: &AppContext, card: &Card) -> CardRow {
    CardRow {
        key: card.key(),
        title: ctx.manager.display_title(card),
        text: card.payload().text().to_string(),
        created_at: card.created_at(),
        selected: ctx.manager.selection().is_selected(card.key()),
    }
}

fn report_selection(ctx: &AppContext) -> Result<()> {
    match ctx.manager.selected_card()? {
        Some(card) => print_info(format!(
            "Selected: {} ({})",
            ctx.manager.display_title(&card),
            card.key()
        )),
        None => print_info("No card selected"),
    }
    Ok(())
}

fn handle_new(
    ctx: &mut AppContext,
    kind: Option<CardKind>,
    text: Option<String>,
    name: Option<String>,
) -> Result<()> {
    let kind = kind.unwrap_or(ctx.config.default_kind);
    let payload = text.map(|text| {
        let mut payload = CardPayload::default_for(kind);
        payload.set_text(text);
        payload
    });

    let card = ctx
        .manager
        .create_named_card(kind, name.as_deref().unwrap_or(""), payload)?;
    print_success(format!(
        "Created {} ({})",
        ctx.manager.display_title(&card),
        card.key()
    ));
    Ok(())
}

fn handle_list(ctx: &AppContext, kind: Option<CardKind>) -> Result<()> {
    let cards = match kind {
        Some(kind) => ctx.manager.cards_of_kind(kind)?,
        None => ctx.manager.all_cards()?,
    };
    let rows: Vec<CardRow> = cards.iter().map(|card| row(ctx, card)).collect();
    print_cards(&rows);
    Ok(())
}

fn handle_show(ctx: &AppContext, key: Option<String>) -> Result<()> {
    let card = match key {
        Some(raw) => ctx.manager.get(parse_key(&raw)?)?,
        None => match ctx.manager.selected_card()? {
            Some(card) => card,
            None => {
                print_info("No card selected");
                return Ok(());
            }
        },
    };
    print_card_detail(&row(ctx, &card), card.payload());
    Ok(())
}

fn handle_select(ctx: &mut AppContext, raw: &str) -> Result<()> {
    let key = parse_key(raw)?;
    ctx.manager.select_key(key)?;
    report_selection(ctx)
}

fn handle_remove(ctx: &mut AppContext, raws: &[String]) -> Result<()> {
    if raws.is_empty() {
        match ctx.manager.remove_selected()? {
            Some(card) => print_success(format!(
                "Removed {} ({})",
                ctx.manager.display_title(&card),
                card.key()
            )),
            None => {
                print_info("No card selected");
                return Ok(());
            }
        }
        return report_selection(ctx);
    }

    let mut keys: Vec<CardKey> = Vec::with_capacity(raws.len());
    for raw in raws {
        let key = parse_key(raw)?;
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    let mut targets = Vec::with_capacity(keys.len());
    for key in keys {
        targets.push(ctx.manager.get(key)?);
    }

    // One at a time, so removals that succeeded are reported even if a later one fails.
    for card in &targets {
        if let Err(e) = ctx.manager.remove_card(card) {
            report_selection(ctx)?;
            return Err(e);
        }
        print_success(format!(
            "Removed {} ({})",
            ctx.manager.display_title(card),
            card.key()
        ));
    }
    report_selection(ctx)
}

fn handle_rename(ctx: &mut AppContext, raw: &str, name: &str) -> Result<()> {
    let card = ctx.manager.rename_card(parse_key(raw)?, name)?;
    print_success(format!(
        "Renamed {} to {}",
        card.key(),
        ctx.manager.display_title(&card)
    ));
    Ok(())
}

fn handle_set(ctx: &mut AppContext, raw: &str, text: &str) -> Result<()> {
    let card = ctx.manager.set_payload_text(parse_key(raw)?, text)?;
    let what = match card.kind() {
        CardKind::Search => "query",
        CardKind::Sutta => "reference",
    };
    print_success(format!("Set {} of {} to {}", what, card.key(), text));
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    match (key, value) {
        (None, _) => {
            for key in ["default-kind", "labels-file"] {
                println!("{}={}", key, ctx.config.get(key)?);
            }
        }
        (Some(key), None) => println!("{}", ctx.config.get(&key)?),
        (Some(key), Some(value)) => {
            ctx.config.set(&key, &value)?;
            ctx.config.save(&ctx.data_dir)?;
            print_success(format!("{} set to {}", key, ctx.config.get(&key)?));
        }
    }
    Ok(())
}
