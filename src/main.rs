use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use greengroves::cli::{
    handle_add, handle_categories, handle_delete, handle_get, handle_import, handle_init,
    handle_list, handle_search, handle_slug, handle_stats, handle_update, handle_user_add,
    handle_user_delete, handle_user_list, Cli, Commands, UserAction,
};

fn main() {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::Add(args) => handle_add(args),
        Commands::Import { kind, file, json } => handle_import(kind, file, json),
        Commands::List {
            kind,
            search,
            category,
            status,
            sort,
            json,
        } => handle_list(kind, search, category, status, sort, json),
        Commands::Search { query, kind, json } => handle_search(query, kind, json),
        Commands::Get { id, json } => handle_get(id, json),
        Commands::Update(args) => handle_update(args),
        Commands::Delete { id, force } => handle_delete(id, force),
        Commands::Categories { kind, json } => handle_categories(kind, json),
        Commands::Stats { json } => handle_stats(json),
        Commands::Slug { title } => handle_slug(title),
        Commands::User(user_cmd) => match user_cmd.action {
            UserAction::Add {
                name,
                email,
                role,
                json,
            } => handle_user_add(name, email, role, json),
            UserAction::List {
                search,
                role,
                sort,
                json,
            } => handle_user_list(search, role, sort, json),
            UserAction::Delete { id, force } => handle_user_delete(id, force),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}
