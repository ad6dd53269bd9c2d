//! Classification CLI: maintenance commands for the classification store.
//!
//! Usage:
//!   classification fix-context [--db path]
//!   classification context <subcommand> [--db path]
//!   classification taggable <subcommand> [--db path]

use clap::{Parser, Subcommand, ValueEnum};
use classification::config::{self, DB_ENV_VAR};
use classification::{
    logging, Category, Collection, Context, ContextBackfill, ContextId, ContextStore, OpenStore,
    SqliteStore, Tag, Taggable, TaggableStore,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "classification",
    version,
    about = "Maintain tags, collections and categories and their contexts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to SQLite database file
    #[arg(long, global = true, env = DB_ENV_VAR)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the default context if none defined and attach it to all elements
    FixContext,
    /// Manage contexts
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },
    /// Manage tags, collections and categories
    Taggable {
        #[command(subcommand)]
        action: TaggableAction,
    },
}

#[derive(Subcommand)]
enum ContextAction {
    /// Create a new context
    Create {
        /// Identifier of the new context
        id: String,
        /// Display name
        name: String,
        /// Create the context disabled
        #[arg(long)]
        disabled: bool,
    },
    /// List all contexts
    List,
}

#[derive(Subcommand)]
enum TaggableAction {
    /// List every entity of one kind
    List {
        kind: KindArg,
    },
    /// Add a new entity
    Add {
        kind: KindArg,
        /// Display name; the slug is derived from it
        name: String,
        /// Context to attach; left empty when omitted
        #[arg(long)]
        context: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Tag,
    Collection,
    Category,
}

fn open_store(db: Option<PathBuf>) -> Result<SqliteStore, String> {
    let db_path = config::resolve_db_path(db);
    tracing::debug!(path = %db_path.display(), "opening database");
    SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))
}

fn cmd_fix_context(store: &SqliteStore) -> i32 {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match ContextBackfill::with_store(store).run(&mut out) {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_context_create(store: &SqliteStore, id: &str, name: &str, disabled: bool) -> i32 {
    let id = ContextId::from(id);
    match store.find_context(&id) {
        Ok(Some(_)) => {
            eprintln!("Error: context '{}' already exists", id);
            return 1;
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    }
    let context = Context::with_id(id, name).with_enabled(!disabled);
    match store.save_context(&context) {
        Ok(()) => {
            println!("Created context '{}' ({})", context.name, context.id);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_context_list(store: &SqliteStore) -> i32 {
    let contexts = match store.list_contexts() {
        Ok(contexts) => contexts,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if contexts.is_empty() {
        println!("No contexts defined.");
        return 0;
    }
    println!("{:<36}  {:<24}  {:>7}", "ID", "NAME", "ENABLED");
    println!("{}", "-".repeat(71));
    for ctx in contexts {
        println!(
            "{:<36}  {:<24}  {:>7}",
            ctx.id.as_str(),
            ctx.name,
            if ctx.enabled { "yes" } else { "no" }
        );
    }
    0
}

fn list_entities<T: Taggable>(store: &dyn TaggableStore<T>) -> i32 {
    let entities = match store.find_all() {
        Ok(entities) => entities,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if entities.is_empty() {
        println!("No {} entries.", T::KIND);
        return 0;
    }
    println!("{:<36}  {:<24}  {:<24}", "ID", "SLUG", "CONTEXT");
    println!("{}", "-".repeat(88));
    for entity in entities {
        println!(
            "{:<36}  {:<24}  {:<24}",
            entity.id().to_string(),
            entity.slug(),
            entity.context().map(|c| c.as_str()).unwrap_or("-")
        );
    }
    0
}

fn cmd_taggable_list(store: &SqliteStore, kind: KindArg) -> i32 {
    match kind {
        KindArg::Tag => list_entities::<Tag>(store),
        KindArg::Collection => list_entities::<Collection>(store),
        KindArg::Category => list_entities::<Category>(store),
    }
}

fn add_entity<T: Taggable>(store: &dyn TaggableStore<T>, mut entity: T, context: Option<ContextId>) -> i32 {
    entity.set_context(context);
    match store.save(&entity) {
        Ok(()) => {
            println!("Added {} '{}' ({})", T::KIND, entity.slug(), entity.id());
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_taggable_add(store: &SqliteStore, kind: KindArg, name: &str, context: Option<String>) -> i32 {
    let context = match context.map(ContextId::from) {
        Some(id) => match store.find_context(&id) {
            Ok(Some(_)) => Some(id),
            Ok(None) => {
                eprintln!("Error: context '{}' not found", id);
                return 1;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        },
        None => None,
    };
    match kind {
        KindArg::Tag => add_entity::<Tag>(store, Tag::new(name), context),
        KindArg::Collection => add_entity::<Collection>(store, Collection::new(name), context),
        KindArg::Category => add_entity::<Category>(store, Category::new(name), context),
    }
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let store = match open_store(cli.db) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let code = match cli.command {
        Commands::FixContext => cmd_fix_context(&store),
        Commands::Context { action } => match action {
            ContextAction::Create { id, name, disabled } => {
                cmd_context_create(&store, &id, &name, disabled)
            }
            ContextAction::List => cmd_context_list(&store),
        },
        Commands::Taggable { action } => match action {
            TaggableAction::List { kind } => cmd_taggable_list(&store, kind),
            TaggableAction::Add { kind, name, context } => {
                cmd_taggable_add(&store, kind, &name, context)
            }
        },
    };
    std::process::exit(code);
}
