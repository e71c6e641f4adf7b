mod commands;
mod handlers;

pub use commands::{AddArgs, Cli, Commands, UpdateArgs, UserAction, UserCommand};
pub use handlers::{
    handle_add, handle_categories, handle_delete, handle_get, handle_import, handle_init,
    handle_list, handle_search, handle_slug, handle_stats, handle_update, handle_user_add,
    handle_user_delete, handle_user_list,
};
