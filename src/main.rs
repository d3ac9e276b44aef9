use clap::{Parser, Subcommand};
use log::debug;
use recetario::{AppConfig, NewRecipe, Recetario, RecipeFilter, RecipeId, Result};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "recetario")]
#[command(about = "Browse recipes with nutrition estimates, keep favorites and a pantry")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recipes matching the given filters
    List {
        /// Text contained in the recipe name
        #[arg(short, long)]
        text: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        region: Option<String>,

        #[arg(short, long)]
        difficulty: Option<String>,

        #[arg(short, long)]
        portions: Option<u32>,
    },

    /// Show one recipe with its ingredients and steps
    Show { id: String },

    /// Manage favorite recipes
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },

    /// Manage the pantry
    Pantry {
        #[command(subcommand)]
        action: Option<PantryAction>,
    },

    /// Suggest a recipe from the pantry contents
    Suggest {
        /// Extra wishes for the suggestion, e.g. "sin horno"
        #[arg(short, long)]
        instructions: Option<String>,
    },

    /// List selectable values (categoria, dificultad, unidad, region)
    Options {
        kind: String,

        #[arg(long)]
        subkind: Option<String>,
    },

    /// Submit a new recipe from a JSON file
    Submit { file: String },
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// Show favorite recipes (default)
    List,
    /// Add or remove a recipe from favorites
    Toggle { id: String },
}

#[derive(Subcommand)]
enum PantryAction {
    /// Show every pantry item (default)
    List,
    Add {
        name: String,

        #[arg(short, long, default_value = "1")]
        quantity: String,

        #[arg(short, long, default_value = "")]
        unit: String,
    },
    Remove {
        id: String,
    },
    Edit {
        id: String,
        name: String,

        #[arg(short, long, default_value = "")]
        quantity: String,
    },
    Search {
        term: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    debug!("Loaded configuration: {:?}", config.source);
    let app = Recetario::from_config(&config)?;

    match cli.command {
        Commands::List {
            text,
            category,
            region,
            difficulty,
            portions,
        } => {
            let filter = RecipeFilter {
                text,
                category,
                region,
                difficulty,
                portions,
            };
            print_json(&app.list_recipes(&filter).await)?;
        }
        Commands::Show { id } => match app.recipe(&RecipeId::new(id.as_str())).await {
            Some(recipe) => print_json(&recipe)?,
            None => eprintln!("Recipe {} not found", id),
        },
        Commands::Favorites { action } => match action.unwrap_or(FavoritesAction::List) {
            FavoritesAction::List => print_json(&app.favorite_recipes().await)?,
            FavoritesAction::Toggle { id } => {
                let now_favorite = app.favorites().toggle(&RecipeId::new(id));
                print_json(&serde_json::json!({ "favorite": now_favorite }))?;
            }
        },
        Commands::Pantry { action } => match action.unwrap_or(PantryAction::List) {
            PantryAction::List => print_json(&app.pantry().items())?,
            PantryAction::Add {
                name,
                quantity,
                unit,
            } => print_json(&app.pantry().add(&name, &quantity, &unit))?,
            PantryAction::Remove { id } => {
                print_json(&serde_json::json!({ "removed": app.pantry().remove(&id) }))?
            }
            PantryAction::Edit { id, name, quantity } => {
                print_json(&app.pantry().edit(&id, &name, &quantity))?
            }
            PantryAction::Search { term } => print_json(&app.pantry().search(&term))?,
        },
        Commands::Suggest { instructions } => {
            let suggestion = app.suggest(instructions.as_deref()).await;
            print_json(&suggestion)?;
        }
        Commands::Options { kind, subkind } => {
            print_json(&app.options(&kind, subkind.as_deref()).await)?;
        }
        Commands::Submit { file } => {
            let contents = tokio::fs::read_to_string(&file).await?;
            let recipe: NewRecipe = serde_json::from_str(&contents)?;
            match app.submit(&recipe).await {
                Ok(outcome) => print_json(&outcome)?,
                Err(e) => {
                    eprintln!("{}", e);
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
