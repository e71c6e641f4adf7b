use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

fn greengroves_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_greengroves"));
    cmd.env_remove("GREENGROVES_API_URL")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null());
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    greengroves_cmd()
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

fn init_catalog() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let output = run(tmp.path(), &["init"]);
    assert!(output.status.success());
    tmp
}

fn json_of(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn titles(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_init_creates_catalog_directory() {
    let tmp = TempDir::new().unwrap();

    let output = run(tmp.path(), &["init"]);

    assert!(output.status.success());
    assert!(tmp.path().join(".greengroves").exists());
    assert!(tmp.path().join(".greengroves/catalog.db").exists());
    assert!(tmp.path().join(".greengroves/config.yaml").exists());
}

#[test]
fn test_init_twice_fails() {
    let tmp = init_catalog();

    let output = run(tmp.path(), &["init"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Already initialized"));
}

#[test]
fn test_add_without_init_fails() {
    let tmp = TempDir::new().unwrap();

    let output = run(tmp.path(), &["add", "article", "Rose Care", "-c", "Beginner"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not in a greengroves catalog"));
}

#[test]
fn test_full_article_workflow() {
    let tmp = init_catalog();

    let output = run(
        tmp.path(),
        &[
            "add",
            "article",
            "Rose Care",
            "--category",
            "Beginner",
            "--author",
            "Ana Lima",
            "--tag",
            "roses",
            "--json",
        ],
    );
    let created = json_of(&output);
    assert_eq!(created["kind"], "article");
    assert_eq!(created["title"], "Rose Care");
    assert_eq!(created["author"], "Ana Lima");
    assert_eq!(created["status"], "published");
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let output = run(tmp.path(), &["list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Rose Care - Ana Lima"));
    assert!(stdout.contains("[article|published]"));

    let output = run(tmp.path(), &["get", &id[..8], "--json"]);
    let fetched = json_of(&output);
    assert_eq!(fetched["id"], id.as_str());
    assert_eq!(fetched["tags"][0], "roses");

    let output = run(tmp.path(), &["get", id.as_str()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("slug:     rose-care"));

    let output = run(tmp.path(), &["delete", id.as_str(), "--force"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Deleted article"));

    let output = run(tmp.path(), &["list"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("No items found."));
}

#[test]
fn test_list_filters_and_sorts() {
    let tmp = init_catalog();

    for (title, category, created, status) in [
        ("Zinnia basics", "Beginner", "2024-03-01", "published"),
        ("Échinacea guide", "Advanced", "2024-01-15", "published"),
        ("aster notes", "Beginner", "2024-02-10", "draft"),
    ] {
        let output = run(
            tmp.path(),
            &[
                "add", "article", title, "-c", category, "--created", created, "--status", status,
            ],
        );
        assert!(output.status.success());
    }

    let latest = json_of(&run(tmp.path(), &["list", "articles", "--json"]));
    assert_eq!(
        titles(&latest),
        vec!["Zinnia basics", "aster notes", "Échinacea guide"]
    );

    let oldest = json_of(&run(tmp.path(), &["list", "--sort", "oldest", "--json"]));
    assert_eq!(
        titles(&oldest),
        vec!["Échinacea guide", "aster notes", "Zinnia basics"]
    );

    let by_title = json_of(&run(tmp.path(), &["list", "article", "--sort", "title", "--json"]));
    assert_eq!(
        titles(&by_title),
        vec!["aster notes", "Échinacea guide", "Zinnia basics"]
    );

    let beginner = json_of(&run(tmp.path(), &["list", "-c", "Beginner", "--json"]));
    assert_eq!(titles(&beginner), vec!["Zinnia basics", "aster notes"]);

    let all = json_of(&run(tmp.path(), &["list", "-c", "all", "--json"]));
    assert_eq!(all.as_array().unwrap().len(), 3);

    let drafts = json_of(&run(tmp.path(), &["list", "--status", "draft", "--json"]));
    assert_eq!(titles(&drafts), vec!["aster notes"]);

    let searched = json_of(&run(tmp.path(), &["list", "--search", "GUIDE", "--json"]));
    assert_eq!(titles(&searched), vec!["Échinacea guide"]);

    let videos = json_of(&run(tmp.path(), &["list", "video", "--json"]));
    assert!(videos.as_array().unwrap().is_empty());
}

#[test]
fn test_search_with_inline_filters() {
    let tmp = init_catalog();

    run(tmp.path(), &["add", "video", "Pruning roses", "-c", "Beginner", "--instructor", "Ana"]);
    run(tmp.path(), &["add", "video", "Grafting roses", "-c", "Advanced", "--instructor", "Ben"]);
    run(tmp.path(), &["add", "article", "Roses in pots", "-c", "Beginner"]);

    let found = json_of(&run(
        tmp.path(),
        &["search", "category:Beginner sort:title roses", "--json"],
    ));
    assert_eq!(titles(&found), vec!["Pruning roses", "Roses in pots"]);

    let by_instructor = json_of(&run(tmp.path(), &["search", "ben", "--kind", "video", "--json"]));
    assert_eq!(titles(&by_instructor), vec!["Grafting roses"]);
}

#[test]
fn test_add_rejects_invalid_form() {
    let tmp = init_catalog();

    let output = run(tmp.path(), &["add", "article", "   ", "-c", "Beginner"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Title is required"));

    let output = run(tmp.path(), &["add", "article", "Roses", "-c", "Beginner", "--rating", "7"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("rating"));

    let output = run(tmp.path(), &["add", "article", "Roses"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Category is required"));

    let output = run(tmp.path(), &["add", "plant", "Roses", "-c", "Beginner"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid content kind"));

    let list = json_of(&run(tmp.path(), &["list", "--json"]));
    assert!(list.as_array().unwrap().is_empty());
}

#[test]
fn test_attachments_follow_kind_encoding() {
    let tmp = init_catalog();
    let image = tmp.path().join("trowel.jpg");
    std::fs::write(&image, b"jpeg").unwrap();
    let image = image.to_string_lossy().to_string();

    let created = json_of(&run(
        tmp.path(),
        &["add", "tool", "Hand trowel", "-c", "Hand tools", "--price", "12.5", "--attach", image.as_str(), "--json"],
    ));
    assert_eq!(created["media"][0], "trowel.jpg");
    assert_eq!(created["price"], 12.5);

    let output = run(
        tmp.path(),
        &["add", "suggestion", "Plant tulips", "-c", "Autumn", "--attach", image.as_str()],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not accept file uploads"));

    let output = run(
        tmp.path(),
        &["add", "suggestion", "Plant tulips", "-c", "Autumn", "--season", "autumn"],
    );
    assert!(output.status.success());
}

#[test]
fn test_update_replaces_item() {
    let tmp = init_catalog();

    let created = json_of(&run(
        tmp.path(),
        &["add", "book", "Soil Basics", "-c", "Soil", "--author", "Kim", "--created", "2023-05-01", "--json"],
    ));
    let id = created["id"].as_str().unwrap().to_string();

    let updated = json_of(&run(
        tmp.path(),
        &["update", id.as_str(), "--title", "Soil Science", "--status", "draft", "--views", "40", "--json"],
    ));
    assert_eq!(updated["title"], "Soil Science");
    assert_eq!(updated["status"], "draft");
    assert_eq!(updated["views"], 40);
    assert_eq!(updated["author"], "Kim");
    assert_eq!(updated["createdAt"], "2023-05-01");

    let output = run(tmp.path(), &["update", id.as_str(), "--rating", "9"]);
    assert!(!output.status.success());

    let fetched = json_of(&run(tmp.path(), &["get", id.as_str(), "--json"]));
    assert_eq!(fetched["title"], "Soil Science");
    assert!(fetched.get("rating").is_none());
}

#[test]
fn test_update_tags_can_be_cleared() {
    let tmp = init_catalog();

    let created = json_of(&run(
        tmp.path(),
        &["add", "essential", "Lavender oil", "-c", "Herbs", "-t", "fragrant", "-t", "calming", "--json"],
    ));
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["tags"].as_array().unwrap().len(), 2);

    let output = run(tmp.path(), &["update", id.as_str(), "--clear-tags", "--tag", "dry"]);
    assert!(!output.status.success());

    let output = run(tmp.path(), &["update", id.as_str(), "--clear-tags"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("tags"));

    let fetched = json_of(&run(tmp.path(), &["get", id.as_str(), "--json"]));
    let tags = fetched.get("tags").and_then(|t| t.as_array()).map_or(0, |t| t.len());
    assert_eq!(tags, 0);
    assert_eq!(fetched["title"], "Lavender oil");
}

#[test]
fn test_delete_requires_force_when_not_interactive() {
    let tmp = init_catalog();

    let created = json_of(&run(tmp.path(), &["add", "pot", "Clay pot", "-c", "Terracotta", "--json"]));
    let id = created["id"].as_str().unwrap().to_string();

    let output = run(tmp.path(), &["delete", id.as_str()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--force"));

    let list = json_of(&run(tmp.path(), &["list", "--json"]));
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[test]
fn test_delete_nonexistent_fails() {
    let tmp = init_catalog();

    let output = run(tmp.path(), &["delete", "doesnotexist", "--force"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not found"));
}

#[test]
fn test_import_transforms_backend_records() {
    let tmp = init_catalog();
    let file = tmp.path().join("articles.json");
    std::fs::write(
        &file,
        r#"{
            "data": [
                {
                    "_id": "65a1f0c2",
                    "title": "Composting 101",
                    "category": { "name": "Soil" },
                    "author": { "name": "Ana Lima" },
                    "isPublished": false,
                    "views": "12",
                    "createdAt": "2024-04-02T09:30:00Z",
                    "tags": "compost, soil"
                },
                { "_id": "65a1f0c3", "title": "???", "category": "Soil" },
                { "_id": "65a1f0c4", "title": "Mulching" },
                { "_id": "65a1f0c5", "category": "Soil" }
            ]
        }"#,
    )
    .unwrap();

    let output = run(tmp.path(), &["import", "article", file.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Imported 2 articles"));
    assert!(stdout.contains("2 skipped"));

    let item = json_of(&run(tmp.path(), &["get", "65a1f0c2", "--json"]));
    assert_eq!(item["title"], "Composting 101");
    assert_eq!(item["category"], "Soil");
    assert_eq!(item["author"], "Ana Lima");
    assert_eq!(item["status"], "draft");
    assert_eq!(item["views"], 12);
    assert_eq!(item["createdAt"], "2024-04-02");
    assert_eq!(item["tags"][1], "soil");

    let mulching = json_of(&run(tmp.path(), &["get", "65a1f0c4", "--json"]));
    assert_eq!(mulching["category"], "Uncategorized");

    let untitled = run(tmp.path(), &["get", "65a1f0c5"]);
    assert!(!untitled.status.success());

    // Re-importing replaces by id instead of duplicating.
    let output = run(tmp.path(), &["import", "article", file.to_str().unwrap()]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("2 updated"));
    let list = json_of(&run(tmp.path(), &["list", "--json"]));
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[test]
fn test_categories_and_stats() {
    let tmp = init_catalog();

    run(tmp.path(), &["add", "article", "A", "-c", "Beginner", "--rating", "4"]);
    run(tmp.path(), &["add", "article", "B", "-c", "Advanced", "--rating", "5", "--status", "draft"]);
    run(tmp.path(), &["add", "video", "C", "-c", "Beginner"]);

    let categories = json_of(&run(tmp.path(), &["categories", "article", "--json"]));
    assert_eq!(categories, serde_json::json!(["Beginner", "Advanced"]));

    let stats = json_of(&run(tmp.path(), &["stats", "--json"]));
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["published"], 2);
    assert_eq!(stats["drafts"], 1);
    assert_eq!(stats["per_kind"]["article"], 2);
    assert_eq!(stats["per_kind"]["video"], 1);
    assert_eq!(stats["average_rating"], 4.5);

    let output = run(tmp.path(), &["stats"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Catalog: 3 items"));
    assert!(stdout.contains("Recent:"));
}

#[test]
fn test_slug() {
    let tmp = TempDir::new().unwrap();

    let output = run(tmp.path(), &["slug", "  Don't Overwater Your Ferns! "]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "dont-overwater-your-ferns");
}

#[test]
fn test_viewer_role_cannot_mutate() {
    let tmp = init_catalog();
    std::fs::write(tmp.path().join(".greengroves/config.yaml"), "role: viewer\n").unwrap();

    let output = run(tmp.path(), &["add", "article", "Roses", "-c", "Beginner"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Permission denied"));

    let output = run(tmp.path(), &["list"]);
    assert!(output.status.success());
}

#[test]
fn test_editor_role_cannot_manage_users() {
    let tmp = init_catalog();
    std::fs::write(tmp.path().join(".greengroves/config.yaml"), "role: editor\n").unwrap();

    let output = run(tmp.path(), &["add", "article", "Roses", "-c", "Beginner"]);
    assert!(output.status.success());

    let output = run(tmp.path(), &["user", "add", "Ana", "ana@example.com"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Permission denied"));
}

#[test]
fn test_user_workflow() {
    let tmp = init_catalog();

    let ana = json_of(&run(
        tmp.path(),
        &["user", "add", "Ana Lima", "ana@example.com", "--role", "editor", "--json"],
    ));
    assert_eq!(ana["role"], "editor");
    run(tmp.path(), &["user", "add", "Ben Ode", "ben@example.com"]);

    let output = run(tmp.path(), &["user", "add", "Ana Again", "ANA@example.com"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));

    let output = run(tmp.path(), &["user", "add", "Cy", "not-an-email"]);
    assert!(!output.status.success());

    let editors = json_of(&run(tmp.path(), &["user", "list", "--role", "editor", "--json"]));
    let names: Vec<&str> = editors
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ana Lima"]);

    let output = run(tmp.path(), &["user", "delete", "ben@example.com", "--force"]);
    assert!(output.status.success());

    let all = json_of(&run(tmp.path(), &["user", "list", "--json"]));
    assert_eq!(all.as_array().unwrap().len(), 1);
}
