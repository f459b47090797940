//! # recipe-lists
//!
//! Browse recipes and manage your lists from the terminal.
//!
//! ```bash
//! # Configure the backend (or put it in .env)
//! export RECIPE_LISTS_BASE_API_URL=http://localhost:3000/api
//!
//! recipe-lists recipes
//! recipe-lists recipe lemon-tart
//! recipe-lists add-list Desserts --recipe lemon-tart
//! recipe-lists my-list
//! ```

mod render;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use recipe_lists::{
    HttpApi, ListId, ListResponse, ListsApi, ListsConfig, ListsResponse, ListsStore, RecipesApi,
    Settlement,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long to wait for in-flight requests on exit
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "recipe-lists", version, about = "Browse recipes and curate lists")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every recipe
    Recipes,
    /// Show a single recipe
    Recipe {
        /// Recipe slug, as shown by `recipes`
        slug: String,
    },
    /// Show your lists
    MyList,
    /// Create a list
    AddList {
        /// Title of the new list
        title: String,
        /// Slug of a recipe to start the list with
        #[arg(long)]
        recipe: Option<String>,
    },
    /// Add a recipe to a list
    AddRecipe {
        /// Target list id
        list_id: ListId,
        /// Recipe slug
        slug: String,
    },
    /// Remove a recipe from a list
    RemoveRecipe {
        /// Target list id
        list_id: ListId,
        /// Recipe slug
        slug: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,recipe_lists=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = ListsConfig::from_env()?;
    tracing::info!(base_api_url = %config.base_api_url, "Configuration loaded");

    let api = Arc::new(HttpApi::new(&config)?);

    match cli.command {
        Command::Recipes => {
            let recipes = api.fetch_recipes().await?;
            print(cli.json, recipes.as_slice(), render::recipes)?;
        },
        Command::Recipe { slug } => {
            let recipe = api
                .fetch_recipe(slug.clone())
                .await
                .with_context(|| format!("could not load recipe {slug}"))?;
            let store = open_store(&api).await?;
            let lists = store.lists().await;
            if cli.json {
                println!("{}", render::json(&recipe)?);
            } else {
                println!("{}", render::recipe(&recipe, &lists));
            }
            close_store(&store).await;
        },
        Command::MyList => {
            let store = open_store(&api).await?;
            let state = store.snapshot().await;
            if let Some(error) = &state.fetch_lists.error {
                bail!("could not load lists: {error}");
            }
            print(cli.json, &state.lists, |lists| render::lists(lists))?;
            close_store(&store).await;
        },
        Command::AddList { title, recipe } => {
            let recipe = match recipe {
                Some(slug) => Some(api.fetch_recipe(slug).await?),
                None => None,
            };
            let store = open_store(&api).await?;
            let response = completed(store.add_list(title, recipe).await?)?;
            let list = accepted_list(&response)?;
            tracing::info!(list_id = %list.list_id, "List created");
            print(cli.json, list, render::list)?;
            close_store(&store).await;
        },
        Command::AddRecipe { list_id, slug } => {
            let recipe = api.fetch_recipe(slug).await?;
            let store = open_store(&api).await?;
            let response = completed(store.add_recipe_to_list(list_id, recipe).await?)?;
            print(cli.json, accepted_list(&response)?, render::list)?;
            close_store(&store).await;
        },
        Command::RemoveRecipe { list_id, slug } => {
            let store = open_store(&api).await?;
            let response = completed(store.delete_recipe_from_list(list_id, slug).await?)?;
            let lists = accepted_lists(&response)?;
            match lists.iter().find(|list| list.list_id == list_id) {
                Some(list) => print(cli.json, list, render::list)?,
                None => print(cli.json, lists, |lists| render::lists(lists))?,
            }
            close_store(&store).await;
        },
    }

    Ok(())
}

/// Create the store and wait for the initial list fetch
async fn open_store(api: &Arc<HttpApi>) -> anyhow::Result<ListsStore> {
    let api: Arc<dyn ListsApi> = Arc::<HttpApi>::clone(api);
    let store = ListsStore::with_api(api).await?;
    store.loaded().await;
    Ok(store)
}

async fn close_store(store: &ListsStore) {
    if let Err(error) = store.shutdown(SHUTDOWN_TIMEOUT).await {
        tracing::warn!(%error, "Store did not shut down cleanly");
    }
}

fn completed<T>(settlement: Settlement<T>) -> anyhow::Result<T> {
    match settlement {
        Settlement::Completed(response) => Ok(response),
        Settlement::Failed(error) => bail!("request failed: {error}"),
    }
}

fn accepted_list(response: &ListResponse) -> anyhow::Result<&recipe_lists::List> {
    if let Some(rejection) = response.rejection() {
        bail!("{rejection}");
    }
    response
        .list
        .as_ref()
        .context("backend answered without a list")
}

fn accepted_lists(response: &ListsResponse) -> anyhow::Result<&[recipe_lists::List]> {
    if let Some(rejection) = response.rejection() {
        bail!("{rejection}");
    }
    response
        .lists
        .as_deref()
        .context("backend answered without lists")
}

/// Print `value` as JSON or through its text renderer
fn print<T, F>(json: bool, value: &T, text: F) -> anyhow::Result<()>
where
    T: serde::Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    if json {
        println!("{}", render::json(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_id_arguments() {
        let cli = Cli::try_parse_from(["recipe-lists", "add-recipe", "7", "lemon-tart"]).unwrap();
        let Command::AddRecipe { list_id, slug } = cli.command else {
            panic!("expected add-recipe");
        };
        assert_eq!(list_id, ListId(7));
        assert_eq!(slug, "lemon-tart");
    }

    #[test]
    fn rejects_non_numeric_list_id() {
        assert!(Cli::try_parse_from(["recipe-lists", "remove-recipe", "abc", "x"]).is_err());
    }

    #[test]
    fn json_flag_is_global() {
        let cli = Cli::try_parse_from(["recipe-lists", "my-list", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::MyList));
    }

    #[test]
    fn command_tree_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
