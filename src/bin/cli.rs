//! filedex CLI
//!
//! Inspect a store on disk, or run the example walkthrough against it.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use filedex::index::{decode_filename, is_hidden};
use filedex::registry::{CollectionInfo, INFO_FILENAME};
use filedex::storage::{CollectionDir, RootDir};
use filedex::{Config, Document, Engine, IndexKey, Meta};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

/// filedex CLI
#[derive(Parser, Debug)]
#[command(name = "filedex-cli")]
#[command(about = "Inspect filedex document stores")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./filedex_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List collection directories with their index keys and record counts
    Collections,

    /// Decode the filenames of one collection
    Inspect {
        /// Collection type name (e.g. User) or its directory name
        collection: String,
    },

    /// Save, find and delete a sample user
    Demo,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct User {
    meta: Meta,
    username: String,
    password: String,
}

impl Document for User {}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,filedex=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    tracing::info!("filedex v{}", filedex::VERSION);
    tracing::info!("Data directory: {}", args.data_dir.display());

    let result = match args.command {
        Commands::Collections => list_collections(&args.data_dir),
        Commands::Inspect { collection } => inspect(&args.data_dir, &collection),
        Commands::Demo => demo(&args.data_dir),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn list_collections(data_dir: &Path) -> filedex::Result<()> {
    let root = RootDir::open(data_dir, false)?;

    for path in root.collection_dirs()? {
        let dir = CollectionDir::new(path, false);
        let keys = match dir.read_optional(INFO_FILENAME)? {
            Some(bytes) => serde_json::from_slice::<CollectionInfo>(&bytes)?
                .indexable_keys
                .join(", "),
            None => "<no .info>".to_string(),
        };
        let records = dir.list()?.iter().filter(|name| !is_hidden(name)).count();

        let name = dir
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("{}  records={}  keys=[{}]", name, records, keys);
    }

    Ok(())
}

fn inspect(data_dir: &Path, collection: &str) -> filedex::Result<()> {
    let root = RootDir::open(data_dir, false)?;

    let mut dir = root.collection(collection, false);
    if !dir.path().is_dir() {
        dir = CollectionDir::new(root.path().join(collection), false);
    }

    for name in dir.list()? {
        if is_hidden(&name) {
            continue;
        }
        let fields = decode_filename(&name)?
            .into_iter()
            .map(|(path, value)| format!("{}={:?}", path, String::from_utf8_lossy(&value)))
            .collect::<Vec<_>>();
        println!("{}", fields.join("  "));
    }

    Ok(())
}

fn demo(data_dir: &Path) -> filedex::Result<()> {
    let mut engine = Engine::open(Config::builder().data_dir(data_dir).build())?;
    engine.register(&User::default(), &["password", "username"])?;

    let mut user = User {
        username: "root".to_string(),
        password: "my-secret-password".to_string(),
        ..Default::default()
    };
    engine.save(&mut user)?;
    println!("User ID: {}", user.meta.id);

    let users: Vec<User> = engine.find_all(&[])?;
    if let Some(first) = users.first() {
        println!("First user: {}, Total users: {}", first.username, users.len());
    }

    let found: User = engine.find_one(&[IndexKey::id(&user.meta.id)])?;
    println!("Found user: {}", found.username);

    let removed = engine.delete(&User::default())?;
    println!("Removed {} record(s)", removed);

    Ok(())
}
