use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use limitless_meta::calculate::archetype::{cross_performance, highlights};
use limitless_meta::calculate::balance::summarize_sets;
use limitless_meta::calculate::pipeline::{
    trend, CardFilter, Pagination, SortConfig, SortDir, SortKey,
};
use limitless_meta::calculate::power::compare_profiles;
use limitless_meta::calculate::projector::ScatterPlot;
use limitless_meta::calculate::ranking::{delta, delta_band, format_delta, CardRanking};
use limitless_meta::config::{AppConfig, Preferences, Tab};
use limitless_meta::dashboard::{Dashboard, FormatData, ViewState};
use limitless_meta::models::{
    archetype_display_name, Card, CardLabel, DeckType, Format, Rarity, StatsMode, GLOBAL_CONTEXT,
};
use limitless_meta::source::snapshot::capture;
use limitless_meta::source::{
    load_archetype_cards, load_card_contexts, load_cards, load_decks, DataSource,
    PostgrestSource, SnapshotSource,
};
use limitless_meta::storage::{SnapshotStore, StorageConfig};

#[derive(Parser)]
#[command(name = "limitless")]
#[command(about = "Limited format analytics: balance, power profiles and card evaluation")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./limitless.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Read from the remote API instead of local snapshots
    #[arg(long, global = true)]
    remote: bool,

    /// Set code (defaults to the saved preference)
    #[arg(long, global = true)]
    set: Option<String>,

    /// Format, e.g. PremierDraft, Sealed (defaults to the saved preference)
    #[arg(long, global = true)]
    format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a set/format snapshot from the remote API
    Fetch,

    /// List cards with filters and sorting
    Cards {
        /// Filter context: "Global" or a color code like "WU"
        #[arg(long)]
        context: Option<String>,

        /// Case-insensitive name search
        #[arg(long, default_value = "")]
        search: String,

        /// Rarity codes, e.g. "MR"
        #[arg(long, default_value = "")]
        rarity: String,

        /// Color facets: W U B R G, M (multicolor), C (colorless)
        #[arg(long, default_value = "")]
        colors: String,

        /// Sort key: name, gih_wr, alsa, trend
        #[arg(long)]
        sort: Option<String>,

        /// Sort ascending
        #[arg(long)]
        asc: bool,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Archetype win rates and meta share
    Decks {
        /// Deck type, e.g. "Two colors", "Three colors"
        #[arg(long = "type")]
        deck_type: Option<String>,
    },

    /// Win-rate partitions by rarity and color
    Blueprint {
        /// all, top10 or bottom10
        #[arg(long)]
        mode: Option<String>,
    },

    /// Archetype and color balance scores
    Balance {
        /// Summarize every set of the format instead
        #[arg(long)]
        all_sets: bool,
    },

    /// Five-axis power profile
    Power,

    /// Compare the power profile with another set or format
    Compare {
        #[arg(long)]
        other_set: Option<String>,

        #[arg(long)]
        other_format: Option<String>,
    },

    /// Card evaluation matrix (scatter labels)
    Matrix {
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Rankings and archetype performance of one card
    Card { name: String },

    /// Highlights of one archetype
    Archetype {
        /// Color code ("WU") or archetype name
        archetype: String,
    },

    /// Show or change saved preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand)]
enum PrefsAction {
    Show,
    Reset,
    Set {
        #[arg(long)]
        set: Option<String>,
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        deck_type: Option<String>,
        #[arg(long)]
        archetype: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        asc: bool,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = if cli.config.exists() {
        AppConfig::from_file(&cli.config)
            .with_context(|| format!("loading {}", cli.config.display()))?
    } else {
        tracing::debug!("No config at {:?}, using defaults", cli.config);
        AppConfig::default()
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

fn open_source(
    cli: &Cli,
    config: &AppConfig,
    store: &SnapshotStore,
) -> Result<Box<dyn DataSource>> {
    if cli.remote {
        Ok(Box::new(PostgrestSource::from_config(&config.source)?))
    } else {
        Ok(Box::new(SnapshotSource::new(store.clone())))
    }
}

async fn load_format(
    source: &dyn DataSource,
    set_code: &str,
    format: &Format,
) -> Result<FormatData> {
    let decks = load_decks(source, set_code, format).await?;
    let cards = load_cards(source, set_code, format, GLOBAL_CONTEXT).await?;
    if cards.is_empty() && decks.decks.is_empty() {
        bail!(
            "No data for {}/{}. Run `limitless fetch --set {} --format {}` first.",
            set_code,
            format,
            set_code,
            format
        );
    }
    Ok(FormatData {
        set_code: set_code.to_string(),
        format: format.clone(),
        cards,
        decks,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_else(|| "-".to_string())
}

fn parse_sort(key: Option<&str>, asc: bool, fallback: SortConfig) -> Result<SortConfig> {
    let key = match key {
        Some(k) => SortKey::parse(k).with_context(|| format!("unknown sort key {:?}", k))?,
        None => fallback.key,
    };
    let dir = if asc { SortDir::Asc } else { fallback.dir };
    Ok(SortConfig { key, dir })
}

fn print_card_row(card: &Card, baseline: f64) {
    let trend = trend(&card.win_rate_history)
        .map(|t| format!("{:+.1}", t.delta))
        .unwrap_or_default();
    println!(
        "  {:<32} {}  {:<6} {:>6} {:>7} {:>6} {:>6}",
        card.name,
        card.rarity,
        card.colors.symbols(),
        fmt_opt(card.gih_wr, 1),
        format_delta(delta(card.gih_wr, Some(baseline))),
        fmt_opt(card.alsa, 2),
        trend
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!cli.json_logs).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    tracing::debug!("Starting limitless v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    let storage = StorageConfig::new(config.data_dir.clone());
    let store = SnapshotStore::new(storage.clone());
    let prefs_path = storage.preferences_path();
    let mut prefs = match Preferences::load(&prefs_path) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Ignoring unreadable preferences: {}", e);
            Preferences::default()
        }
    };

    let set_code = cli.set.clone().unwrap_or_else(|| prefs.set_code.clone());
    let format = cli
        .format
        .as_deref()
        .map(Format::parse)
        .unwrap_or_else(|| prefs.format.clone());
    let mut dashboard = Dashboard::new();

    match &cli.command {
        Commands::Fetch => {
            let remote = PostgrestSource::from_config(&config.source)?;
            let manifest = capture(&remote, &store, &set_code, &format).await?;
            if cli.json {
                print_json(&manifest)?;
            } else {
                println!(
                    "Fetched {}/{}: {} card rows in {} contexts, {} archetype rows ({})",
                    manifest.set_code,
                    manifest.format,
                    manifest.card_rows,
                    manifest.contexts.len(),
                    manifest.deck_rows,
                    manifest.fetched_at.format("%Y-%m-%d %H:%M UTC")
                );
            }
        }

        Commands::Cards {
            context,
            search,
            rarity,
            colors,
            sort,
            asc,
            page,
            page_size,
        } => {
            let source = open_source(&cli, &config, &store)?;
            let context = context.clone().unwrap_or_else(|| prefs.archetype.clone());
            let mut data = load_format(source.as_ref(), &set_code, &format).await?;
            if context != GLOBAL_CONTEXT {
                data.cards = load_cards(source.as_ref(), &set_code, &format, &context).await?;
            }

            let view = ViewState {
                filter: CardFilter {
                    search: search.clone(),
                    rarities: rarity.chars().filter_map(Rarity::from_code).collect(),
                    colors: colors.to_uppercase().chars().collect(),
                },
                sort: parse_sort(sort.as_deref(), *asc, prefs.sort)?,
                pagination: Pagination::new(*page, *page_size),
                ..ViewState::default()
            };
            let rendered = dashboard.render(&data, &view);

            if cli.json {
                print_json(&rendered.cards)?;
            } else {
                println!(
                    "=== {} {} cards ({}, baseline {:.1}%) ===\n",
                    set_code, format, context, data.baseline()
                );
                println!(
                    "  {:<32} R  {:<6} {:>6} {:>7} {:>6} {:>6}",
                    "Name", "Colors", "GIH WR", "Δ", "ALSA", "Trend"
                );
                for card in &rendered.cards.items {
                    print_card_row(card, data.baseline());
                }
                let meta = &rendered.cards.meta;
                println!(
                    "\nPage {}/{} ({} cards)",
                    meta.page,
                    meta.total_pages.max(1),
                    meta.total_items
                );
            }

            prefs.active_tab = Tab::Cards;
            prefs.archetype = context;
            prefs.sort = view.sort;
        }

        Commands::Decks { deck_type } => {
            let source = open_source(&cli, &config, &store)?;
            let data = load_format(source.as_ref(), &set_code, &format).await?;
            let deck_type = match deck_type {
                Some(t) => DeckType::parse(t)
                    .with_context(|| format!("unknown deck type {:?}", t))?,
                None => prefs.deck_type,
            };
            let decks = dashboard.deck_list(&data.decks, deck_type).to_vec();
            let meta = dashboard.meta(&data.decks).clone();

            if cli.json {
                print_json(&serde_json::json!({ "decks": decks, "meta": meta }))?;
            } else {
                println!(
                    "=== {} {} {} (baseline {:.1}%, {} games) ===\n",
                    set_code, format, deck_type, data.baseline(), data.decks.total_games
                );
                for deck in &decks {
                    if deck.is_placeholder() {
                        println!("  {:<28} {:>6}", deck.name, "no data");
                        continue;
                    }
                    println!(
                        "  {:<28} {:>5.1}% {:>7} {:>5.1}% share",
                        deck.name,
                        deck.win_rate,
                        format_delta(delta(Some(deck.win_rate), Some(data.baseline()))),
                        deck.meta_share(data.decks.total_games) * 100.0
                    );
                }
                println!("\nMeta by deck type:");
                for bucket in &meta.buckets {
                    println!("  {:<14} {:>5.1}%", bucket.bucket.label(), bucket.share * 100.0);
                }
            }

            prefs.active_tab = Tab::Decks;
            prefs.deck_type = deck_type;
        }

        Commands::Blueprint { mode } => {
            let source = open_source(&cli, &config, &store)?;
            let data = load_format(source.as_ref(), &set_code, &format).await?;
            let mode = match mode {
                Some(m) => StatsMode::parse(m).with_context(|| format!("unknown mode {:?}", m))?,
                None => prefs.stats_mode,
            };
            let blueprint = dashboard.blueprint(&data, mode).clone();

            if cli.json {
                print_json(&blueprint)?;
            } else {
                println!(
                    "=== {} {} blueprint ({} cards, spread σ {:.2}) ===",
                    set_code, format, blueprint.total_cards, blueprint.overall_spread
                );
                for (title, rows) in [("Rarity", &blueprint.rarity), ("Color", &blueprint.color)] {
                    println!("\n{}:", title);
                    for row in rows.iter() {
                        println!(
                            "  {:<12} n={:<4} mean {:>5.1}% {:>7}  σ {:>4.2}  best: {}",
                            row.label,
                            row.count,
                            row.mean_wr,
                            format_delta(Some(row.delta)),
                            row.std_dev,
                            row.best.first().map(|c| c.name.as_str()).unwrap_or("-")
                        );
                    }
                }
            }

            prefs.active_tab = Tab::Blueprint;
            prefs.stats_mode = mode;
        }

        Commands::Balance { all_sets } => {
            let source = open_source(&cli, &config, &store)?;
            if *all_sets {
                let rows = source.format_balance(&format).await?;
                let summary = summarize_sets(&rows);
                if cli.json {
                    print_json(&serde_json::json!({ "sets": rows, "summary": summary }))?;
                } else if let Some(summary) = summary {
                    println!("=== {} balance across {} sets ===\n", format, rows.len());
                    let groups = [("Archetype", &summary.archetype), ("Color", &summary.color)];
                    for (title, stats) in groups {
                        println!(
                            "  {:<10} avg {:>4.1}  best {} ({:.1})  worst {} ({:.1})",
                            title,
                            stats.average,
                            stats.best.set_code,
                            stats.best.score,
                            stats.worst.set_code,
                            stats.worst.score
                        );
                    }
                } else {
                    println!("No balance data for {}", format);
                }
            } else {
                let data = load_format(source.as_ref(), &set_code, &format).await?;
                let score = dashboard.balance(&data).clone();
                if cli.json {
                    print_json(&score)?;
                } else {
                    println!("=== {} {} balance ===\n", set_code, format);
                    println!(
                        "  Archetypes  {:>4.1}/10  {}  (σ {:.2}, {} archetypes)",
                        score.archetype.score,
                        score.archetype.label,
                        score.archetype.std_dev,
                        score.archetype.samples
                    );
                    println!(
                        "  Colors      {:>4.1}/10  {}  (σ {:.2})",
                        score.color.score, score.color.label, score.color.std_dev
                    );
                    println!("  As played σ {:.2}", score.as_played_std_dev);
                }
                prefs.active_tab = Tab::Balance;
            }
        }

        Commands::Power => {
            let source = open_source(&cli, &config, &store)?;
            let data = load_format(source.as_ref(), &set_code, &format).await?;
            let profile = dashboard.power(&data).clone();

            if cli.json {
                print_json(&profile)?;
            } else {
                println!(
                    "=== {} {} power profile: {} ({:.0}% of max) ===\n",
                    set_code, format, profile.class, profile.area_percent
                );
                for axis in &profile.axes {
                    println!(
                        "  {:<16} {:>4.1}  {}",
                        axis.axis.label(),
                        axis.score,
                        axis.description
                    );
                }
                if let Some(leaning) = profile.leaning {
                    println!("\n  Leaning {}", leaning);
                }
            }
            prefs.active_tab = Tab::Power;
        }

        Commands::Compare {
            other_set,
            other_format,
        } => {
            let source = open_source(&cli, &config, &store)?;
            let other_set = other_set.clone().unwrap_or_else(|| set_code.clone());
            let other_format = other_format
                .as_deref()
                .map(Format::parse)
                .unwrap_or_else(|| format.clone());
            if other_set == set_code && other_format == format {
                bail!("Pass --other-set or --other-format to compare against");
            }

            let current = load_format(source.as_ref(), &set_code, &format).await?;
            let other = load_format(source.as_ref(), &other_set, &other_format).await?;
            let current_profile = dashboard.power(&current).clone();
            let other_profile = Dashboard::new().power(&other).clone();
            let comparison = compare_profiles(&current_profile, &other_profile);

            if cli.json {
                print_json(&comparison)?;
            } else {
                println!(
                    "=== {} {} vs {} {} ===\n",
                    set_code, format, other_set, other_format
                );
                for axis in &comparison.axes {
                    println!(
                        "  {:<16} {:>4.1} vs {:>4.1}  ({:+.1})",
                        axis.axis.label(), axis.current, axis.other, axis.diff
                    );
                }
                println!(
                    "\n  Area {:.1} ({}) vs {:.1} ({})",
                    comparison.current_area,
                    comparison.current_class,
                    comparison.other_area,
                    comparison.other_class
                );
            }
        }

        Commands::Matrix { search } => {
            let source = open_source(&cli, &config, &store)?;
            let data = load_format(source.as_ref(), &set_code, &format).await?;
            let filter = CardFilter {
                search: search.clone(),
                ..CardFilter::default()
            };
            let plot: ScatterPlot = dashboard.scatter(&data, &filter).clone();

            if cli.json {
                print_json(&plot)?;
            } else {
                println!(
                    "=== {} {} evaluation matrix ({} mode, mean ALSA {:.2}) ===",
                    set_code, format, data.mode(), plot.frame.mean_alsa
                );
                let mut labels: Vec<CardLabel> = plot.points.iter().map(|p| p.label).collect();
                labels.sort_by_key(|l| std::cmp::Reverse(l.strength()));
                labels.dedup();
                for label in labels {
                    let names: Vec<&str> = plot
                        .points
                        .iter()
                        .filter(|p| p.label == label && (search.is_empty() || p.is_match))
                        .map(|p| p.name.as_str())
                        .collect();
                    if names.is_empty() {
                        continue;
                    }
                    println!("\n{} ({}):", label, names.len());
                    println!("  {}", names.join(", "));
                }
            }
            prefs.active_tab = Tab::Matrix;
        }

        Commands::Card { name } => {
            let source = open_source(&cli, &config, &store)?;
            let data = load_format(source.as_ref(), &set_code, &format).await?;
            let card = data
                .cards
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(name))
                .cloned()
                .with_context(|| format!("card {:?} not found in {}/{}", name, set_code, format))?;

            let ranking = CardRanking::compute(&data.cards, &card);
            let band = delta_band(card.gih_wr, Some(data.baseline()));
            let (observations, global) =
                load_card_contexts(source.as_ref(), &set_code, &format, &card.name).await?;
            let global_wr = global.and_then(|g| g.gih_wr).or(card.gih_wr);
            let archetypes = cross_performance(&observations, &data.decks, global_wr, data.mode());

            if cli.json {
                print_json(&serde_json::json!({
                    "card": card,
                    "ranking": ranking,
                    "delta_band": band,
                    "trend": trend(&card.win_rate_history),
                    "archetypes": archetypes,
                }))?;
            } else {
                println!("=== {} ===\n", card.name);
                print_card_row(&card, data.baseline());
                if let Some(band) = band {
                    println!("\n  Performance: {:?}", band);
                }
                let show = |label: &str, rank: &Option<limitless_meta::calculate::ranking::Rank>| {
                    if let Some(rank) = rank {
                        println!("  {:<22} {}", label, rank);
                    }
                };
                show("Win rate in rarity", &ranking.wr_in_rarity);
                show("Win rate in color", &ranking.wr_in_color);
                show("Pick order in rarity", &ranking.alsa_in_rarity);
                show("Pick order in color", &ranking.alsa_in_color);

                if !archetypes.is_empty() {
                    println!("\nBy archetype:");
                    for entry in &archetypes {
                        println!(
                            "  {:<22} {:>5.1}% (deck {:>5.1}%)  {}",
                            entry.deck_name,
                            entry.card_wr,
                            entry.deck_wr,
                            entry.grade.map(|g| g.to_string()).unwrap_or_default()
                        );
                    }
                }
            }
        }

        Commands::Archetype { archetype } => {
            let source = open_source(&cli, &config, &store)?;
            let data = load_format(source.as_ref(), &set_code, &format).await?;
            let deck = data
                .decks
                .find_by_name(archetype)
                .or_else(|| data.decks.find_by_colors(archetype))
                .cloned()
                .with_context(|| format!("archetype {:?} not found", archetype))?;

            let colors = deck.colors.symbols();
            let cards = load_archetype_cards(source.as_ref(), &set_code, &format, colors).await?;
            let result = highlights(&deck, &cards, data.baseline(), data.mode());

            if cli.json {
                print_json(&result)?;
            } else {
                println!(
                    "=== {} ({}) {:.1}% ===",
                    archetype_display_name(deck.colors.symbols()),
                    deck.colors,
                    deck.win_rate
                );
                let sections = [
                    ("Top commons", &result.top_commons),
                    ("Top uncommons", &result.top_uncommons),
                    ("Traps", &result.traps),
                ];
                for (title, cards) in sections {
                    println!("\n{}:", title);
                    for c in cards.iter() {
                        println!(
                            "  {:<32} {:>6}  global {:>6}",
                            c.card.name,
                            fmt_opt(c.card.gih_wr, 1),
                            fmt_opt(c.global_wr, 1)
                        );
                    }
                }
                println!("\nHidden gems:");
                for gem in &result.gems {
                    println!(
                        "  {:<32} {:>6}  {:+.1} vs global",
                        gem.card.card.name,
                        fmt_opt(gem.card.card.gih_wr, 1),
                        gem.score
                    );
                }
            }
            prefs.archetype = deck.colors.symbols().to_string();
        }

        Commands::Prefs { action } => {
            match action {
                PrefsAction::Show => {}
                PrefsAction::Reset => prefs = Preferences::default(),
                PrefsAction::Set {
                    set,
                    format,
                    deck_type,
                    archetype,
                    sort,
                    asc,
                } => {
                    if let Some(set) = set {
                        prefs.set_code = set.clone();
                    }
                    if let Some(format) = format {
                        prefs.format = Format::parse(format);
                    }
                    if let Some(t) = deck_type {
                        prefs.deck_type = DeckType::parse(t)
                            .with_context(|| format!("unknown deck type {:?}", t))?;
                    }
                    if let Some(archetype) = archetype {
                        prefs.archetype = archetype.clone();
                    }
                    prefs.sort = parse_sort(sort.as_deref(), *asc, prefs.sort)?;
                }
            }
            if cli.json {
                print_json(&prefs)?;
            } else {
                print!("{}", toml::to_string_pretty(&prefs)?);
            }
            prefs.save(&prefs_path)?;
            return Ok(());
        }
    }

    prefs.set_code = set_code;
    prefs.format = format;
    if let Err(e) = prefs.save(&prefs_path) {
        tracing::warn!("Could not save preferences: {}", e);
    }

    Ok(())
}
