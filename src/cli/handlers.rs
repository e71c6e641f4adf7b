use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info};

use super::commands::{AddArgs, UpdateArgs};
use crate::catalog::Catalog;
use crate::config::CatalogConfig;
use crate::content::{
    normalize_date, require_title, transform, validate_item, ContentBase, ContentItem,
    ContentKind, ContentStatus,
};
use crate::error::{GroveError, Result};
use crate::query::{apply, parse_query, CategoryFilter, QueryParams, SortBy};
use crate::service::{create_item, update_item, ContentService, Payload};
use crate::slug::generate_slug;
use crate::storage::{LoroStore, DATA_DIR};
use crate::user::{Role, User};
use crate::warnings::{check_catalog, format_warning};

/// Find the project root by looking for .greengroves/ or .git/
fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(DATA_DIR).exists() || current.join(".git").exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

/// Open the store and its config.
fn open() -> Result<(LoroStore, CatalogConfig)> {
    let root = find_project_root();
    let store = LoroStore::open(&root)?;
    let config = CatalogConfig::load(&root.join(DATA_DIR))?;
    debug!(role = %config.role, api = %config.api_base_url, "loaded config");
    Ok((store, config))
}

fn parse_kind(s: &str) -> Result<ContentKind> {
    s.parse().map_err(|_| GroveError::InvalidKind(s.to_string()))
}

fn parse_kinds(kind: Option<&str>) -> Result<Vec<ContentKind>> {
    match kind {
        Some(k) => Ok(vec![parse_kind(k)?]),
        None => Ok(ContentKind::ALL.to_vec()),
    }
}

fn parse_status(s: &str) -> Result<ContentStatus> {
    s.parse().map_err(|e: String| GroveError::validation("status", e))
}

fn parse_sort(s: Option<&str>, default: SortBy) -> Result<SortBy> {
    match s {
        Some(s) => s.parse().map_err(|e: String| GroveError::validation("sort", e)),
        None => Ok(default),
    }
}

fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map(|(i, _)| &id[..i]).unwrap_or(id)
}

fn print_warnings(catalog: &Catalog, config: &CatalogConfig, store: &LoroStore) {
    for warning in check_catalog(catalog, config.item_warning_threshold, store.file_size()) {
        eprintln!("{}", format_warning(&warning));
    }
}

/// Ask for confirmation on an interactive terminal. Non-interactive callers
/// must pass --force.
fn confirm(prompt: &str) -> Result<bool> {
    eprintln!("{} [y/N] ", prompt);

    if atty::is(atty::Stream::Stdin) {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().eq_ignore_ascii_case("y"))
    } else {
        Err(GroveError::validation(
            "force",
            "Use --force to delete in non-interactive mode",
        ))
    }
}

fn print_item_line(item: &ContentItem) {
    let byline = item
        .byline()
        .map(|b| format!(" - {}", b))
        .unwrap_or_default();
    println!(
        "  ({}) [{}|{}] {}{}",
        short_id(item.id()),
        item.kind(),
        item.base().status,
        item.title(),
        byline
    );
    println!(
        "      {} | {} | {} views",
        item.base().category,
        item.base().created_at,
        item.base().views
    );
}

fn print_items(items: &[ContentItem], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else if items.is_empty() {
        println!("No items found.");
    } else {
        for item in items {
            print_item_line(item);
        }
        println!("\n{} item(s)", items.len());
    }
    Ok(())
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;

    LoroStore::init(&root)?;
    CatalogConfig::default().save(&root.join(DATA_DIR))?;

    println!("Initialized greengroves catalog in {}", root.display());
    Ok(())
}

/// Fill the kind-specific fields of a freshly built item. Flags that do not
/// apply to the kind are reported and ignored.
fn with_details(mut item: ContentItem, args: &AddArgs) -> ContentItem {
    let mut unused = Vec::new();
    if args.author.is_some() && !matches!(item.kind(), ContentKind::Article | ContentKind::Book) {
        unused.push("--author");
    }
    if args.instructor.is_some() && item.kind() != ContentKind::Video {
        unused.push("--instructor");
    }
    if args.duration.is_some() && item.kind() != ContentKind::Video {
        unused.push("--duration");
    }
    if args.season.is_some() && item.kind() != ContentKind::Suggestion {
        unused.push("--season");
    }
    if args.price.is_some() && !(item.kind().is_product() || item.kind() == ContentKind::Book) {
        unused.push("--price");
    }
    for flag in unused {
        eprintln!("Warning: {} does not apply to {}, ignoring", flag, item.kind());
    }

    match &mut item {
        ContentItem::Article { author, .. } => *author = args.author.clone(),
        ContentItem::Video {
            instructor,
            duration,
            ..
        } => {
            *instructor = args.instructor.clone();
            *duration = args.duration.clone();
        }
        ContentItem::Book { author, price, .. } => {
            *author = args.author.clone();
            *price = args.price;
        }
        ContentItem::Tool { price, .. }
        | ContentItem::Essential { price, .. }
        | ContentItem::Pot { price, .. }
        | ContentItem::Accessory { price, .. } => *price = args.price,
        ContentItem::Suggestion { season, .. } => *season = args.season.clone(),
    }
    item
}

pub fn handle_add(args: AddArgs) -> Result<()> {
    let (store, config) = open()?;
    config.role.require_editor("add content")?;

    let kind = parse_kind(&args.kind)?;
    let created_at = match args.created.as_deref() {
        Some(raw) => normalize_date(raw).unwrap_or_else(|| raw.to_string()),
        None => today(),
    };

    let base = ContentBase {
        id: String::new(),
        title: args.title.trim().to_string(),
        category: args.category.clone().unwrap_or_default(),
        status: parse_status(&args.status)?,
        views: 0,
        likes: 0,
        rating: args.rating,
        updated_at: created_at.clone(),
        created_at,
        tags: args.tags.clone(),
        description: args.description.clone(),
    };
    let form = with_details(ContentItem::new(kind, base), &args);

    // Check the form as entered, before the service normalizes it.
    validate_item(&form)?;

    let mut payload = Payload::from_item(&form)?;
    payload.fields.remove("id");
    for path in &args.attachments {
        payload.attach("media", path)?;
    }

    let item = create_item(&store, &payload, kind)?;
    store.save()?;
    info!(kind = %kind, id = item.id(), "created item");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        println!(
            "Created {} ({}) - {}",
            kind,
            short_id(item.id()),
            item.title()
        );
        if !item.media().is_empty() {
            println!("  media: {}", item.media().join(", "));
        }
    }

    Ok(())
}

/// Pull the record array out of an import file: either a bare array or a
/// `{ "data": [...] }` envelope.
fn import_records(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(records) => Ok(records),
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(GroveError::validation(
                "file",
                "Expected an array of records or an object with a 'data' array",
            )),
        },
        _ => Err(GroveError::validation(
            "file",
            "Expected an array of records or an object with a 'data' array",
        )),
    }
}

pub fn handle_import(kind: String, file: PathBuf, json: bool) -> Result<()> {
    let (store, config) = open()?;
    config.role.require_editor("import content")?;

    let kind = parse_kind(&kind)?;
    let text = fs::read_to_string(&file)?;
    let records = import_records(serde_json::from_str(&text)?)?;

    let mut imported = Vec::new();
    let mut updated = 0usize;
    let mut skipped = 0usize;

    // Records without a title are skipped; a missing category or date
    // falls back to the transform defaults.
    for (index, record) in records.iter().enumerate() {
        let item = transform(kind, record);
        if let Err(e) = require_title(record).and_then(|_| validate_item(&item)) {
            eprintln!("Warning: skipping record {}: {}", index + 1, e);
            skipped += 1;
            continue;
        }

        if store.get_item(kind, item.id())?.is_some() {
            store.replace_item(&item)?;
            updated += 1;
        } else {
            store.add_item(&item)?;
        }
        imported.push(item);
    }

    store.save()?;
    info!(kind = %kind, count = imported.len(), skipped, "imported records");

    if json {
        println!("{}", serde_json::to_string_pretty(&imported)?);
    } else {
        println!(
            "Imported {} {} from {} ({} updated, {} skipped)",
            imported.len(),
            kind.collection(),
            file.display(),
            updated,
            skipped
        );
    }

    Ok(())
}

pub fn handle_list(
    kind: Option<String>,
    search: Option<String>,
    category: Option<String>,
    status: Option<String>,
    sort: Option<String>,
    json: bool,
) -> Result<()> {
    let (store, config) = open()?;

    let kinds = parse_kinds(kind.as_deref())?;
    let params = QueryParams {
        search_term: search.unwrap_or_default(),
        category: category
            .as_deref()
            .map(CategoryFilter::from)
            .unwrap_or_default(),
        status: status.as_deref().map(parse_status).transpose()?,
        sort_by: parse_sort(sort.as_deref(), config.default_sort)?,
    };

    let catalog = Catalog::load(&store, &kinds);
    print_warnings(&catalog, &config, &store);

    let only = if kinds.len() == 1 { Some(kinds[0]) } else { None };
    let items = catalog.query(only, &params);
    debug!(matched = items.len(), total = catalog.len(), "list query");

    print_items(&items, json)
}

pub fn handle_search(query: String, kind: Option<String>, json: bool) -> Result<()> {
    let (store, config) = open()?;

    let kinds = parse_kinds(kind.as_deref())?;
    let params = parse_query(&query);

    let catalog = Catalog::load(&store, &kinds);
    print_warnings(&catalog, &config, &store);

    let only = if kinds.len() == 1 { Some(kinds[0]) } else { None };
    let items = catalog.query(only, &params);

    if !json && !items.is_empty() {
        println!("Results for \"{}\":\n", query);
    }
    print_items(&items, json)
}

pub fn handle_get(id: String, json: bool) -> Result<()> {
    let root = find_project_root();
    let store = LoroStore::open(&root)?;

    let item = store
        .find_item(&id)?
        .ok_or_else(|| GroveError::ItemNotFound(id.clone()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
        return Ok(());
    }

    let base = item.base();
    println!("{} ({})", item.title(), item.kind());
    println!("  id:       {}", base.id);
    println!("  slug:     {}", item.slug());
    println!("  category: {}", base.category);
    println!("  status:   {}", base.status);
    if let Some(byline) = item.byline() {
        let label = if item.kind() == ContentKind::Video {
            "instructor"
        } else {
            "author"
        };
        println!("  {:<9} {}", format!("{}:", label), byline);
    }
    if let Some(price) = item.price() {
        println!("  price:    {:.2}", price);
    }
    if let Some(rating) = base.rating {
        println!("  rating:   {:.1}", rating);
    }
    println!("  views:    {}  likes: {}", base.views, base.likes);
    println!("  created:  {}", base.created_at);
    println!("  updated:  {}", base.updated_at);
    if !base.tags.is_empty() {
        println!("  tags:     {}", base.tags.join(", "));
    }
    if !item.media().is_empty() {
        println!("  media:    {}", item.media().join(", "));
    }
    if let Some(description) = &base.description {
        println!("\n{}", description);
    }

    Ok(())
}

pub fn handle_update(args: UpdateArgs) -> Result<()> {
    let (store, config) = open()?;
    config.role.require_editor("edit content")?;

    let item = store
        .find_item(&args.id)?
        .ok_or_else(|| GroveError::ItemNotFound(args.id.clone()))?;

    let mut base = item.base().clone();
    let mut changes = Vec::new();

    if let Some(title) = args.title {
        base.title = title.trim().to_string();
        changes.push("title");
    }
    if let Some(category) = args.category {
        base.category = category.trim().to_string();
        changes.push("category");
    }
    if let Some(status) = args.status {
        base.status = parse_status(&status)?;
        changes.push("status");
    }
    if let Some(views) = args.views {
        base.views = views;
        changes.push("views");
    }
    if let Some(likes) = args.likes {
        base.likes = likes;
        changes.push("likes");
    }
    if let Some(rating) = args.rating {
        base.rating = Some(rating);
        changes.push("rating");
    }
    if args.clear_tags {
        base.tags.clear();
        changes.push("tags");
    } else if !args.tags.is_empty() {
        base.tags = args.tags;
        changes.push("tags");
    }
    if let Some(description) = args.description {
        base.description = Some(description).filter(|d| !d.trim().is_empty());
        changes.push("description");
    }

    if changes.is_empty() {
        println!("No changes specified.");
        return Ok(());
    }

    let updated = update_item(&store, &item.with_base(base))?;
    store.save()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        println!(
            "Updated {} ({}) - {}",
            updated.kind(),
            short_id(updated.id()),
            changes.join(", ")
        );
    }

    Ok(())
}

pub fn handle_delete(id: String, force: bool) -> Result<()> {
    let (store, config) = open()?;
    config.role.require_editor("delete content")?;

    let item = store
        .find_item(&id)?
        .ok_or_else(|| GroveError::ItemNotFound(id.clone()))?;

    if !force {
        let prompt = format!(
            "Delete {} ({}) - {}?",
            item.kind(),
            short_id(item.id()),
            item.title()
        );
        if !confirm(&prompt)? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete(item.kind(), item.id())?;
    store.save()?;

    println!(
        "Deleted {} ({}) - {}",
        item.kind(),
        short_id(item.id()),
        item.title()
    );

    Ok(())
}

pub fn handle_categories(kind: Option<String>, json: bool) -> Result<()> {
    let (store, config) = open()?;

    let kinds = parse_kinds(kind.as_deref())?;
    let catalog = Catalog::load(&store, &kinds);
    print_warnings(&catalog, &config, &store);

    let only = if kinds.len() == 1 { Some(kinds[0]) } else { None };
    let categories = catalog.categories(only);

    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
    } else if categories.is_empty() {
        println!("No categories found.");
    } else {
        for category in categories {
            println!("  {}", category);
        }
    }

    Ok(())
}

pub fn handle_stats(json: bool) -> Result<()> {
    let (store, config) = open()?;

    let catalog = Catalog::load(&store, &ContentKind::ALL);
    let stats = catalog.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        print_warnings(&catalog, &config, &store);
        return Ok(());
    }

    print_warnings(&catalog, &config, &store);

    println!("Catalog: {} items\n", stats.total);
    for (kind, count) in &stats.per_kind {
        println!("  {:<12} {}", kind.collection(), count);
    }
    println!();
    println!("  published    {}", stats.published);
    println!("  drafts       {}", stats.drafts);
    println!("  views        {}", stats.total_views);
    println!("  likes        {}", stats.total_likes);
    match stats.average_rating {
        Some(avg) => println!("  avg rating   {:.1}", avg),
        None => println!("  avg rating   -"),
    }

    let recent = catalog.recent(5);
    if !recent.is_empty() {
        println!("\nRecent:");
        for item in &recent {
            println!(
                "  {} {} ({}) {}",
                item.base().created_at,
                item.kind(),
                short_id(item.id()),
                item.title()
            );
        }
    }

    Ok(())
}

pub fn handle_slug(title: String) -> Result<()> {
    println!("{}", generate_slug(&title));
    Ok(())
}

pub fn handle_user_add(name: String, email: String, role: String, json: bool) -> Result<()> {
    let (store, config) = open()?;
    config.role.require_admin("manage users")?;

    let role: Role = role
        .parse()
        .map_err(|e: String| GroveError::validation("role", e))?;
    let user = User::new(name.trim().to_string(), email.trim().to_string(), role);
    user.validate()?;

    if store
        .list_users()?
        .iter()
        .any(|u| u.email.eq_ignore_ascii_case(&user.email))
    {
        return Err(GroveError::validation(
            "email",
            format!("A user with email '{}' already exists", user.email),
        ));
    }

    store.add_user(&user)?;
    store.save()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        println!(
            "Created user ({}) {} <{}> [{}]",
            short_id(&user.id),
            user.name,
            user.email,
            user.role
        );
    }

    Ok(())
}

pub fn handle_user_list(
    search: Option<String>,
    role: Option<String>,
    sort: Option<String>,
    json: bool,
) -> Result<()> {
    let (store, config) = open()?;
    config.role.require_admin("view users")?;

    let role = role
        .map(|r| r.parse::<Role>())
        .transpose()
        .map_err(|e| GroveError::validation("role", e))?;

    let params = QueryParams {
        search_term: search.unwrap_or_default(),
        category: role
            .map(|r| CategoryFilter::Only(r.to_string()))
            .unwrap_or_default(),
        status: None,
        sort_by: parse_sort(sort.as_deref(), SortBy::Latest)?,
    };
    let users = apply(&store.list_users()?, &params);

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
    } else if users.is_empty() {
        println!("No users found.");
    } else {
        for user in &users {
            println!(
                "  ({}) [{}] {} <{}>",
                short_id(&user.id),
                user.role,
                user.name,
                user.email
            );
        }
    }

    Ok(())
}

pub fn handle_user_delete(id: String, force: bool) -> Result<()> {
    let (store, config) = open()?;
    config.role.require_admin("manage users")?;

    let user = store
        .find_user(&id)?
        .ok_or_else(|| GroveError::ItemNotFound(id.clone()))?;

    if !force {
        let prompt = format!("Delete user {} <{}>?", user.name, user.email);
        if !confirm(&prompt)? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete_user(&user.id)?;
    store.save()?;

    println!("Deleted user ({}) {}", short_id(&user.id), user.name);
    Ok(())
}
