use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beyx_meta::aggregate::{overall_totals, LoggedEvent, StatisticsAggregator};
use beyx_meta::analysis::ComboAnalyzer;
use beyx_meta::catalog::{NewPart, PartCatalog};
use beyx_meta::config::AnalyzerConfig;
use beyx_meta::metagame::{analyze_matchup, generate_insight, suggest_combo_adjustments};
use beyx_meta::models::{
    Archetype, BattleDatabase, BattleRecord, BeyType, ComboIdentity, ComboMode, ComboSelection,
    DeckEntry, Opponent, Outcome, PartCategory, PartStats, TournamentEntry,
};
use beyx_meta::recommend::Recommender;
use beyx_meta::storage::{self, EventLog, StorageConfig};

#[derive(Parser)]
#[command(name = "beyx-meta")]
#[command(about = "Beyblade X combo analyzer and battle statistics engine")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path
    #[arg(long, default_value = "./data")]
    data_dir: String,

    /// Log level (trace, debug, info, warn, error). Defaults to the config's `log_level`
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a combo from catalog parts
    Analyze {
        #[arg(long)]
        blade: String,

        #[arg(long)]
        ratchet: String,

        #[arg(long)]
        bit: String,

        /// Assist blade (CX only)
        #[arg(long)]
        assist: Option<String>,

        /// Combo format: BX or CX
        #[arg(long, default_value = "BX")]
        mode: ComboMode,
    },

    /// Add a part to the catalog
    AddPart {
        #[arg(long)]
        name: String,

        /// blade, ratchet, bit or assist-blade
        #[arg(long)]
        category: PartCategory,

        #[arg(long, default_value = "BX")]
        bey_type: BeyType,

        #[arg(long)]
        attack: u32,

        #[arg(long)]
        defense: u32,

        #[arg(long)]
        stamina: u32,

        /// Dash stat (bits only)
        #[arg(long)]
        dash: Option<u32>,

        /// Burst resistance stat (bits only)
        #[arg(long)]
        burst: Option<u32>,

        #[arg(long)]
        archetype: Option<Archetype>,

        #[arg(long)]
        description: Option<String>,
    },

    /// List catalog parts
    Parts {
        /// Only this category
        #[arg(long)]
        category: Option<PartCategory>,
    },

    /// Record a single battle
    RecordBattle {
        #[arg(long)]
        blade: String,

        #[arg(long)]
        ratchet: String,

        #[arg(long)]
        bit: String,

        #[arg(long, default_value = "BX")]
        bey_type: BeyType,

        /// win, loss or draw
        #[arg(long)]
        result: Outcome,

        /// Battle date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Opposing blade name
        #[arg(long)]
        opponent: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Record a tournament with a deck of 3 to 5 combos
    RecordTournament {
        #[arg(long)]
        name: String,

        /// Tournament date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        placement: Option<u32>,

        /// Deck entry as "blade,ratchet,bit,wins,losses,draws" (repeat per combo)
        #[arg(long = "bey", required = true)]
        beys: Vec<String>,
    },

    /// Recommend the best recorded combo
    Recommend {
        /// Archetype you expect to face
        #[arg(long)]
        against: Option<Archetype>,
    },

    /// Show totals across every combo
    Stats,

    /// Show the latest metagame snapshot and insights
    Meta,

    /// Compare two combos by their statistics keys
    Matchup {
        /// First combo key, e.g. "Soar Phoenix-9-60-GF"
        first: String,

        /// Second combo key
        second: String,
    },

    /// Suggest adjustments for one combo
    Adjust {
        /// Combo key, e.g. "Soar Phoenix-9-60-GF"
        key: String,
    },

    /// Rebuild the battle database from the event log
    Replay,

    /// Export the battle database (or the part catalog) as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Export the part catalog instead of the database
        #[arg(long)]
        catalog: bool,
    },

    /// Replace the battle database, or merge parts into the catalog, from an exported document
    Import {
        input: PathBuf,

        /// The document is a part catalog to merge into the stored one
        #[arg(long)]
        catalog: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(Path::new(&cli.config))?;

    // Initialize tracing
    let level = log_level(cli.log_level.as_deref(), &config);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Starting beyx-meta v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(PathBuf::from(&cli.data_dir));

    match cli.command {
        Commands::Analyze {
            blade,
            ratchet,
            bit,
            assist,
            mode,
        } => {
            let catalog = storage::load_catalog(&storage.catalog_path())?;
            let blade = find_part(&catalog, PartCategory::Blade, &blade)?;
            let ratchet = find_part(&catalog, PartCategory::Ratchet, &ratchet)?;
            let bit = find_part(&catalog, PartCategory::Bit, &bit)?;

            let mut selection = ComboSelection::new(blade, ratchet, bit, mode);
            if let Some(name) = assist {
                selection =
                    selection.with_assist_blade(find_part(&catalog, PartCategory::AssistBlade, &name)?);
            }

            let analyzer = ComboAnalyzer::new(&config);
            match analyzer.analyze(&selection, &catalog) {
                Some(result) => print_json(&result)?,
                None => bail!("Select a blade, a ratchet and a bit"),
            }
        }

        Commands::AddPart {
            name,
            category,
            bey_type,
            attack,
            defense,
            stamina,
            dash,
            burst,
            archetype,
            description,
        } => {
            let path = storage.catalog_path();
            let mut catalog = storage::load_catalog(&path)?;

            let mut stats = PartStats::new(attack, defense, stamina);
            if let Some(dash) = dash {
                stats = stats.with_dash(dash);
            }
            if let Some(burst) = burst {
                stats = stats.with_burst(burst);
            }

            let mut part = NewPart::new(&name, category, bey_type, stats);
            part.description = description;
            if let Some(archetype) = archetype {
                part = part.with_archetype(archetype);
            }

            let id = catalog.add_part(part)?;
            storage::save_catalog(&path, &catalog)?;
            println!("Added {} '{}' ({})", category, name, id);
        }

        Commands::Parts { category } => {
            let catalog = storage::load_catalog(&storage.catalog_path())?;
            let categories = match category {
                Some(c) => vec![c],
                None => PartCategory::ALL.to_vec(),
            };

            for category in categories {
                let parts = catalog.parts(category);
                println!("\n=== {} ({}) ===", category, parts.len());
                for part in parts {
                    println!(
                        "  {:<24} {:<3} ATK {:>3}  DEF {:>3}  STA {:>3}",
                        part.name,
                        part.bey_type,
                        part.stats.attack,
                        part.stats.defense,
                        part.stats.stamina
                    );
                }
            }
        }

        Commands::RecordBattle {
            blade,
            ratchet,
            bit,
            bey_type,
            result,
            date,
            opponent,
            notes,
        } => {
            let combo = ComboIdentity::new(&blade, &ratchet, &bit, bey_type);
            let mut record =
                BattleRecord::new(combo, result, date.unwrap_or_else(|| Utc::now().date_naive()));
            if let Some(blade_name) = opponent {
                record = record.with_opponent(Opponent {
                    blade_name: Some(blade_name),
                    combo_description: None,
                });
            }
            if let Some(notes) = notes {
                record = record.with_notes(notes);
            }

            let key = record.combo_id.clone();
            let db = apply_event(&config, &storage, record.into())?;
            if let Some(row) = db.statistics_by_key(&key) {
                println!(
                    "{}: {} battles, {:.1}% win rate ({})",
                    key, row.total_battles, row.win_rate, row.favorability
                );
            }
        }

        Commands::RecordTournament {
            name,
            date,
            location,
            placement,
            beys,
        } => {
            let deck = beys
                .iter()
                .map(|text| parse_deck_entry(text))
                .collect::<Result<Vec<_>>>()?;

            let mut entry =
                TournamentEntry::new(name, date.unwrap_or_else(|| Utc::now().date_naive()), deck)?;
            if let Some(location) = location {
                entry = entry.with_location(location);
            }
            if let Some(placement) = placement {
                entry = entry.with_placement(placement);
            }

            let summary = format!(
                "{}: {}W {}L {}D",
                entry.tournament_name, entry.total_wins, entry.total_losses, entry.total_draws
            );
            apply_event(&config, &storage, entry.into())?;
            println!("Recorded {}", summary);
        }

        Commands::Recommend { against } => {
            let db = storage::load_database(&storage.database_path())?;
            let catalog = storage::load_catalog(&storage.catalog_path())?;

            let recommender = Recommender::new(&config).with_catalog(&catalog);
            match recommender.recommend(&db.combo_statistics, against) {
                Some(recommendation) => print_json(&recommendation)?,
                None => println!("Not enough battle data for a recommendation"),
            }
        }

        Commands::Stats => {
            let db = storage::load_database(&storage.database_path())?;
            let totals = overall_totals(&db.combo_statistics);

            println!("\n=== Battle Statistics ===");
            println!("Combos:     {}", totals.combos);
            println!("Battles:    {}", totals.total_battles);
            println!(
                "Record:     {}W {}L {}D",
                totals.wins, totals.losses, totals.draws
            );
            println!("Win rate:   {:.1}%", totals.win_rate);
        }

        Commands::Meta => {
            let db = storage::load_database(&storage.database_path())?;
            let catalog = storage::load_catalog(&storage.catalog_path())?;

            match db.latest_snapshot() {
                Some(snapshot) => print_json(snapshot)?,
                None => println!("No metagame snapshot yet"),
            }
            print_json(&generate_insight(&db, Some(&catalog)))?;
        }

        Commands::Matchup { first, second } => {
            let db = storage::load_database(&storage.database_path())?;
            let a = db
                .statistics_by_key(&first)
                .with_context(|| format!("No statistics for combo '{}'", first))?;
            let b = db
                .statistics_by_key(&second)
                .with_context(|| format!("No statistics for combo '{}'", second))?;
            print_json(&analyze_matchup(a, b, &db))?;
        }

        Commands::Adjust { key } => {
            let db = storage::load_database(&storage.database_path())?;
            let catalog = storage::load_catalog(&storage.catalog_path())?;
            let row = db
                .statistics_by_key(&key)
                .with_context(|| format!("No statistics for combo '{}'", key))?;
            print_json(&suggest_combo_adjustments(row, &db, Some(&catalog)))?;
        }

        Commands::Replay => {
            let log = EventLog::new(storage.events_path());
            let catalog = storage::load_catalog(&storage.catalog_path())?;
            let events = log.read_all()?;

            let db = StatisticsAggregator::new(&config)
                .with_catalog(&catalog)
                .replay(events);
            storage::save_database(&storage.database_path(), &db)?;

            println!("\n=== Replay Results ===");
            println!("Event log:  {:?}", log.path());
            println!("Battles:    {}", db.battle_records.len());
            println!("Tournaments: {}", db.tournament_entries.len());
            println!("Combos:     {}", db.combo_statistics.len());
            println!("Snapshots:  {}", db.metagame_dynamics.len());
        }

        Commands::Export { output, catalog } => {
            let (what, json) = if catalog {
                ("catalog", export_catalog_json(&storage)?)
            } else {
                let db = storage::load_database(&storage.database_path())?;
                ("database", storage::export_database(&db)?)
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Exported {} to {:?}", what, path);
                }
                None => println!("{}", json),
            }
        }

        Commands::Import { input, catalog: true } => {
            let added = import_catalog_file(&storage, &input)?;
            println!("Merged {} parts into the catalog", added);
        }

        Commands::Import { input, catalog: false } => {
            let json = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {:?}", input))?;
            let db = storage::import_database(&json)?;
            storage::save_database(&storage.database_path(), &db)?;
            println!(
                "Imported {} battles and {} tournaments",
                db.battle_records.len(),
                db.tournament_entries.len()
            );
        }
    }

    Ok(())
}

/// `--log-level` wins over the config file.
fn log_level<'a>(flag: Option<&'a str>, config: &'a AnalyzerConfig) -> &'a str {
    flag.unwrap_or(&config.log_level)
}

fn export_catalog_json(storage: &StorageConfig) -> Result<String> {
    let catalog = storage::load_catalog(&storage.catalog_path())?;
    Ok(storage::export_catalog(&catalog)?)
}

/// Merge an exported catalog into the stored one. Returns the number of parts added.
fn import_catalog_file(storage: &StorageConfig, input: &Path) -> Result<usize> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {:?}", input))?;
    let imported = storage::import_catalog(&json)?;

    let path = storage.catalog_path();
    let mut catalog = storage::load_catalog(&path)?;
    let added = catalog.merge(imported);
    storage::save_catalog(&path, &catalog)?;

    tracing::info!("Imported {} parts from {:?}", added, input);
    Ok(added)
}

fn load_config(path: &Path) -> Result<AnalyzerConfig> {
    if !path.exists() {
        tracing::debug!("No config at {:?}, using defaults", path);
        return Ok(AnalyzerConfig::default());
    }
    AnalyzerConfig::from_file(path).with_context(|| format!("Failed to load config {:?}", path))
}

/// Append the event to the log, fold it into the database and save.
fn apply_event(
    config: &AnalyzerConfig,
    storage: &StorageConfig,
    event: LoggedEvent,
) -> Result<BattleDatabase> {
    let db_path = storage.database_path();
    let db = storage::load_database(&db_path)?;
    let catalog = storage::load_catalog(&storage.catalog_path())?;

    EventLog::new(storage.events_path()).append(&event)?;

    let db = StatisticsAggregator::new(config)
        .with_catalog(&catalog)
        .apply(db, event);
    storage::save_database(&db_path, &db)?;
    Ok(db)
}

fn find_part<'a>(
    catalog: &'a PartCatalog,
    category: PartCategory,
    name: &str,
) -> Result<&'a beyx_meta::models::Part> {
    catalog
        .get(category, name)
        .with_context(|| format!("{} '{}' is not in the catalog", category, name))
}

fn parse_deck_entry(text: &str) -> Result<DeckEntry> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    let [blade, ratchet, bit, wins, losses, draws] = fields.as_slice() else {
        bail!(
            "Invalid deck entry '{}': expected blade,ratchet,bit,wins,losses,draws",
            text
        );
    };

    let count = |value: &str| -> Result<u32> {
        value
            .parse()
            .with_context(|| format!("Invalid count '{}' in deck entry '{}'", value, text))
    };

    Ok(DeckEntry::new(
        ComboIdentity::new(blade, ratchet, bit, BeyType::BX),
        count(*wins)?,
        count(*losses)?,
        count(*draws)?,
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_level_falls_back_to_config() {
        let mut config = AnalyzerConfig::default();
        config.log_level = "debug".to_string();
        assert_eq!(log_level(None, &config), "debug");
        assert_eq!(log_level(Some("warn"), &config), "warn");

        let cli = Cli::try_parse_from(["beyx-meta", "stats"]).unwrap();
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_catalog_export_import_round_trip() {
        let source_dir = TempDir::new().unwrap();
        let source = StorageConfig::new(source_dir.path().to_path_buf());

        let mut catalog = PartCatalog::default();
        catalog
            .add_part(NewPart::new(
                "Soar Phoenix",
                PartCategory::Blade,
                BeyType::BX,
                PartStats::new(50, 30, 20),
            ))
            .unwrap();
        catalog
            .add_part(NewPart::new(
                "9-60",
                PartCategory::Ratchet,
                BeyType::BX,
                PartStats::new(10, 15, 20),
            ))
            .unwrap();
        storage::save_catalog(&source.catalog_path(), &catalog).unwrap();

        let exported = source_dir.path().join("parts-export.json");
        std::fs::write(&exported, export_catalog_json(&source).unwrap()).unwrap();

        let target_dir = TempDir::new().unwrap();
        let target = StorageConfig::new(target_dir.path().join("data"));
        assert_eq!(import_catalog_file(&target, &exported).unwrap(), 2);

        let loaded = storage::load_catalog(&target.catalog_path()).unwrap();
        assert_eq!(loaded.blades, catalog.blades);
        assert_eq!(loaded.ratchets, catalog.ratchets);
        assert_eq!(
            loaded.get(PartCategory::Ratchet, "9-60").unwrap().contact_points(),
            Some(9)
        );
    }

    #[test]
    fn test_import_catalog_missing_file() {
        let dir = TempDir::new().unwrap();
        let storage = StorageConfig::new(dir.path().to_path_buf());
        assert!(import_catalog_file(&storage, &dir.path().join("none.json")).is_err());
    }

    #[test]
    fn test_cli_parses_catalog_flags() {
        let cli = Cli::try_parse_from(["beyx-meta", "import", "parts.json", "--catalog"]).unwrap();
        assert!(matches!(cli.command, Commands::Import { catalog: true, .. }));

        let cli = Cli::try_parse_from(["beyx-meta", "export"]).unwrap();
        assert!(matches!(cli.command, Commands::Export { catalog: false, output: None }));
    }

    #[test]
    fn test_parse_deck_entry() {
        let entry = parse_deck_entry("Soar Phoenix, 9-60, GF, 2, 1, 0").unwrap();
        assert_eq!(entry.combo.blade_name, "Soar Phoenix");
        assert_eq!(entry.combo.ratchet_name, "9-60");
        assert_eq!((entry.wins, entry.losses, entry.draws), (2, 1, 0));
    }

    #[test]
    fn test_parse_deck_entry_rejects_bad_input() {
        assert!(parse_deck_entry("Soar Phoenix,9-60,GF").is_err());
        assert!(parse_deck_entry("Soar Phoenix,9-60,GF,two,1,0").is_err());
    }

    #[test]
    fn test_cli_parses_record_battle() {
        let cli = Cli::try_parse_from([
            "beyx-meta",
            "record-battle",
            "--blade",
            "Soar Phoenix",
            "--ratchet",
            "9-60",
            "--bit",
            "GF",
            "--result",
            "win",
            "--date",
            "2025-03-01",
        ])
        .unwrap();

        match cli.command {
            Commands::RecordBattle { result, date, .. } => {
                assert_eq!(result, Outcome::Win);
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 1));
            }
            _ => panic!("expected record-battle"),
        }
    }
}
