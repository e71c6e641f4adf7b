use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "greengroves")]
#[command(version, about = "Content catalog admin for the Green Groves site")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new catalog in the current directory
    Init,

    /// Add a content item
    Add(AddArgs),

    /// Import raw backend records from a JSON file
    Import {
        /// Content kind of the records (article, video, book, tool, ...)
        kind: String,

        /// JSON file holding an array of records
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List content items
    List {
        /// Content kind to list; all kinds when omitted
        #[arg(value_name = "KIND")]
        kind: Option<String>,

        /// Case-insensitive search over title and author/instructor
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Only this category ("all" for every category)
        #[arg(long, short = 'c')]
        category: Option<String>,

        /// Only this status (published, draft)
        #[arg(long)]
        status: Option<String>,

        /// Sort order (latest, oldest, views, title)
        #[arg(long)]
        sort: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search with inline filters, e.g. "category:Beginner sort:title roses"
    Search {
        query: String,

        /// Restrict to one content kind
        #[arg(long, short = 'k')]
        kind: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single item by id or id prefix
    Get {
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit an item. The stored item is replaced as a whole.
    Update(UpdateArgs),

    /// Delete an item
    Delete {
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// List distinct categories
    Categories {
        #[arg(value_name = "KIND")]
        kind: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dashboard counters
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the URL slug for a title
    Slug { title: String },

    /// Manage admin users
    User(UserCommand),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Content kind (article, video, book, tool, essential, pot, accessory, suggestion)
    pub kind: String,

    /// Title (or product name)
    pub title: String,

    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// published or draft
    #[arg(long, default_value = "published")]
    pub status: String,

    /// Author (articles, books)
    #[arg(long)]
    pub author: Option<String>,

    /// Instructor (videos)
    #[arg(long)]
    pub instructor: Option<String>,

    /// Duration (videos)
    #[arg(long)]
    pub duration: Option<String>,

    /// Season (suggestions)
    #[arg(long)]
    pub season: Option<String>,

    /// Tags (can be specified multiple times)
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,

    #[arg(long)]
    pub rating: Option<f64>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Creation date (YYYY-MM-DD); today when omitted
    #[arg(long)]
    pub created: Option<String>,

    /// Files to upload (can be specified multiple times)
    #[arg(long = "attach", short = 'a')]
    pub attachments: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Item id or id prefix
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<String>,

    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub views: Option<u64>,

    #[arg(long)]
    pub likes: Option<u64>,

    #[arg(long)]
    pub rating: Option<f64>,

    /// Replace all tags (can be specified multiple times)
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,

    /// Remove all tags
    #[arg(long, conflicts_with = "tags")]
    pub clear_tags: bool,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct UserCommand {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Add a user
    Add {
        name: String,
        email: String,

        /// admin, editor or viewer
        #[arg(long, default_value = "viewer")]
        role: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List users
    List {
        /// Search over name and email
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Only this role
        #[arg(long)]
        role: Option<String>,

        /// Sort order (latest, oldest, title)
        #[arg(long)]
        sort: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a user by id, id prefix or email
    Delete {
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}
