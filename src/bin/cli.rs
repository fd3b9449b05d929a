use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use nutridb::{
    filter_recipes, load_catalog, parse_include_terms, Dashboard, Gender, IndexCache, Intensity,
    Ledger, MacroBounds, Nutrient, Params, ProfileInput, Range, Session, UserStore,
    WeightGoal,
};

#[derive(Parser)]
#[command(name = "nutridb")]
struct Cli {
    /// Recipe catalog CSV
    #[arg(long, global = true, default_value = "recipes_updated.csv")]
    recipes: PathBuf,

    /// User profiles CSV
    #[arg(long, global = true, default_value = "userdatafinal.csv")]
    users: PathBuf,

    /// Consumption tracking CSV
    #[arg(long, global = true, default_value = "nutrition_tracking.csv")]
    ledger: PathBuf,

    /// Persist the feature index here and reuse it while the catalog is unchanged
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recipes within macro ranges, optionally containing any of the given ingredients
    Filter {
        #[arg(long, value_parser = parse_range)]
        calories: Option<Range>,
        #[arg(long, value_parser = parse_range)]
        proteins: Option<Range>,
        #[arg(long, value_parser = parse_range)]
        fats: Option<Range>,
        #[arg(long, value_parser = parse_range)]
        carbs: Option<Range>,
        /// Comma-separated ingredient terms
        #[arg(long, default_value = "")]
        include: String,
    },
    /// Show one recipe
    Show { id: u64 },
    /// Recipes with the most similar ingredients
    Similar {
        id: u64,
        #[arg(short, long)]
        k: Option<usize>,
    },
    Register {
        user_id: String,
        name: String,
        #[arg(long)]
        age: u32,
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        height: f64,
        #[arg(long, default_value = "Male")]
        gender: Gender,
        #[arg(long)]
        muscle_gain: bool,
        #[arg(long, default_value = "Maintain Weight")]
        weight_goal: WeightGoal,
        #[arg(long, default_value_t = 3)]
        workout_days: u8,
        #[arg(long, default_value = "Medium")]
        intensity: Intensity,
    },
    /// Record one serving of a recipe for a user
    Consume { user_id: String, recipe_id: u64 },
    Dashboard { user_id: String },
}

fn parse_range(s: &str) -> Result<Range, String> {
    let (lo, hi) = s
        .split_once(':')
        .ok_or_else(|| format!("expected LO:HI, got {s:?}"))?;
    let lo = lo.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let hi = hi.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok(Range::new(lo, hi))
}

fn init_logging(level: &str) {
    let level = match level {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    let params = Params::default();

    match cli.command {
        Commands::Filter {
            calories,
            proteins,
            fats,
            carbs,
            include,
        } => {
            let catalog = load_catalog(&cli.recipes)?;
            let mut bounds = MacroBounds::full_range(&catalog);
            for (nutrient, range) in [
                (Nutrient::Calories, calories),
                (Nutrient::Proteins, proteins),
                (Nutrient::Fats, fats),
                (Nutrient::Carbs, carbs),
            ] {
                if let Some(range) = range {
                    bounds = bounds.with(nutrient, range);
                }
            }
            let terms = parse_include_terms(&include);
            let filtered = filter_recipes(&catalog, &bounds, &terms);
            info!(matched = filtered.len(), total = catalog.len(), "filtered recipes");
            for r in filtered {
                println!(
                    "{}\t{}\tP {:.1}\tC {:.1}\tF {:.1}\tCarb {:.1}",
                    r.id,
                    r.label,
                    r.proteins_per_serving,
                    r.calories_per_serving,
                    r.fats_per_serving,
                    r.carbs_per_serving
                );
            }
        }
        Commands::Show { id } => {
            let catalog = load_catalog(&cli.recipes)?;
            let recipe = catalog
                .iter()
                .find(|r| r.id == id)
                .ok_or(nutridb::Error::UnknownRecipeId(id))?;
            println!("{}\n\nIngredients:\n{}\n\n{}", recipe.label, recipe.ingredient_lines, recipe.url);
        }
        Commands::Similar { id, k } => {
            let catalog = load_catalog(&cli.recipes)?;
            let mut cache = IndexCache::new(params);
            let db = match &cli.snapshot {
                Some(path) => cache.get_or_load(&catalog, path)?,
                None => cache.get_or_build(&catalog)?,
            };
            for r in db.top_similar(id, k.unwrap_or(params.top_k))? {
                println!("{}\t{:.4}\t{}", r.id, r.score, r.label);
            }
        }
        Commands::Register {
            user_id,
            name,
            age,
            weight,
            height,
            gender,
            muscle_gain,
            weight_goal,
            workout_days,
            intensity,
        } => {
            let store = UserStore::open(&cli.users);
            let profile = store.register(ProfileInput {
                user_id,
                name,
                age,
                weight,
                height,
                gender,
                muscle_gain,
                weight_goal,
                workout_days_per_week: workout_days,
                workload_intensity: intensity,
            })?;
            println!(
                "BMI {:.1}\nBMR {:.0}\nCalories {:.0}\nProteins (g) {:.0}\nCarbs (g) {:.0}\nFats (g) {:.0}",
                profile.bmi, profile.bmr, profile.tdee, profile.protein, profile.carb, profile.fat
            );
        }
        Commands::Consume { user_id, recipe_id } => {
            UserStore::open(&cli.users).get(&user_id)?;
            let catalog = load_catalog(&cli.recipes)?;
            let mut session = Session::new(user_id);
            let recipe = session.select(&catalog, recipe_id)?;
            println!("Recipe {} selected to consume today: {}", recipe.id, recipe.label);
            if let Some(row) = session.consume_selected(&catalog, &Ledger::open(&cli.ledger))? {
                println!("Calories consumed today: {:.0}", row.calories_left);
            }
        }
        Commands::Dashboard { user_id } => {
            let profile = UserStore::open(&cli.users).get(&user_id)?;
            let row = Ledger::open(&cli.ledger).get(&user_id)?;
            print!("{}", Dashboard::new(&profile, &row));
        }
    }
    Ok(())
}
