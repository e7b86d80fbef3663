//! Playerbook - paged read model over the game's player documents

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playerbook::{
    config::{Args, StatusBackend},
    db::{
        schemas::sections::{
            ActivitySection, BagSection, EquipSection, FriendSection, GuildSection, HeroSection,
            MailSection, PaySection, SettingsSection, ShopSection, SignInSection, TaskSection,
        },
        DocumentCollection, MongoClient, PlayerInfo, Section, SectionKey, StatusDoc,
    },
    directory::PlayerDirectory,
    status::{DocumentStatusSource, MemoryStatusSource, StatusEnricher, StatusSource},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Logs go to stderr so stdout carries only the JSON result
    let log_level = args.log_level.clone();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("playerbook={},info", log_level).into());
    let json_layer = args
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!args.log_json)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    if let Err(e) = args.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("MongoDB: {} / {}", args.mongodb_uri, args.mongodb_db);
    info!("Players: {}", args.player_collection);
    info!("Status: {:?} ({})", args.status_backend, args.status_collection);

    let mongo = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => {
            info!("MongoDB connected successfully");
            client
        }
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    let players = mongo.collection(&args.player_collection);
    let status_collection = mongo.collection(&args.status_collection);

    if args.ensure_indexes {
        players.ensure_indexes::<PlayerInfo>().await?;
        if args.status_backend == StatusBackend::Mongo {
            status_collection.ensure_indexes::<StatusDoc>().await?;
        }
        info!("Indexes ensured");
    }

    let source: Arc<dyn StatusSource> = match args.status_backend {
        StatusBackend::Mongo => Arc::new(DocumentStatusSource::new(Arc::new(status_collection))),
        StatusBackend::Memory => Arc::new(MemoryStatusSource::new()),
    };
    let players: Arc<dyn DocumentCollection> = Arc::new(players);
    let directory = PlayerDirectory::new(
        players,
        StatusEnricher::new(source),
        args.directory_config(),
    );

    let output = if let Some(player_id) = &args.search.show {
        match args.search.section_key() {
            Some(key) => show_section(&directory, player_id, key).await?,
            None => serde_json::to_value(directory.get_player(player_id).await?)?,
        }
    } else if let Some(user_id) = &args.search.account {
        serde_json::to_value(directory.players_for_account(user_id).await?)?
    } else {
        serde_json::to_value(directory.list_players(&args.search.to_search()).await?)?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Load one section picked at runtime by key
async fn show_section(
    directory: &PlayerDirectory,
    player_id: &str,
    key: SectionKey,
) -> anyhow::Result<serde_json::Value> {
    match key {
        SectionKey::Bag => section_json::<BagSection>(directory, player_id).await,
        SectionKey::Equip => section_json::<EquipSection>(directory, player_id).await,
        SectionKey::Hero => section_json::<HeroSection>(directory, player_id).await,
        SectionKey::Task => section_json::<TaskSection>(directory, player_id).await,
        SectionKey::Activity => section_json::<ActivitySection>(directory, player_id).await,
        SectionKey::SignIn => section_json::<SignInSection>(directory, player_id).await,
        SectionKey::Friend => section_json::<FriendSection>(directory, player_id).await,
        SectionKey::Guild => section_json::<GuildSection>(directory, player_id).await,
        SectionKey::Mail => section_json::<MailSection>(directory, player_id).await,
        SectionKey::Pay => section_json::<PaySection>(directory, player_id).await,
        SectionKey::Shop => section_json::<ShopSection>(directory, player_id).await,
        SectionKey::Settings => section_json::<SettingsSection>(directory, player_id).await,
    }
}

async fn section_json<S: Section>(
    directory: &PlayerDirectory,
    player_id: &str,
) -> anyhow::Result<serde_json::Value> {
    let section: S = directory.load_section(player_id).await?;
    Ok(serde_json::to_value(section)?)
}
