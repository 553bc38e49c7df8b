mod api;
mod commands;
mod entities;
mod forms;
mod model;
mod query;
mod session;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::commands::crud::EntityAction;
use crate::entities::EntityKey;
use crate::session::{AppContext, SessionStore};

// ==========================================
// CLI Surface
// ==========================================

#[derive(Parser)]
#[command(
    name = "consty",
    version,
    about = "Admin console for the Consty construction management API"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and open the dashboard
    Login,
    /// Create a new account
    Signup,
    /// Clear the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Configure the API base URL
    Config,
    /// Show summary cards, the task chart and budgets
    Dashboard,
    /// View or update your profile
    Profile,
    /// Change your password
    Settings,
    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Manage employees
    Employees {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Manage architects
    Architects {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Manage machines
    Machines {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Manage expenses
    Expenses {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Manage budget categories
    BudgetCategories {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Manage project budgets
    ProjectBudgets {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Manage tasks
    Tasks {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Manage project team members
    TeamMembers {
        #[command(subcommand)]
        action: EntityAction,
    },
    /// Manage project documents
    Documents {
        #[command(subcommand)]
        action: EntityAction,
    },
}

// ==========================================
// Main Function
// ==========================================

fn main() {
    if let Err(err) = run() {
        eprintln!("❌ {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // 1. Diagnostics go to stderr, controlled by RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    let store = SessionStore::open()?;

    // 2. The config screen must work before any settings exist
    if matches!(command, Commands::Config) {
        let current = store.load_settings();
        commands::account::config_wizard(&store, current.as_ref())?;
        return Ok(());
    }

    // 3. Initialize configuration (first run goes through the wizard)
    let settings = match store.load_settings() {
        Some(settings) => settings,
        None => {
            println!("⚠️ No configuration found yet.");
            commands::account::config_wizard(&store, None)?
        }
    };
    let api = ApiClient::over_http(&settings.api_url)?;
    let ctx = AppContext { settings, store, api };

    // 4. Dispatch
    match command {
        Commands::Login => commands::auth::login(&ctx),
        Commands::Signup => commands::auth::signup(&ctx),
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Whoami => commands::auth::whoami(&ctx),
        Commands::Config => Ok(()),
        Commands::Dashboard => commands::dashboard::run(&ctx),
        Commands::Profile => commands::account::profile(&ctx),
        Commands::Settings => commands::account::settings(&ctx),
        Commands::Projects { action } => entity(&ctx, EntityKey::Projects, &action),
        Commands::Employees { action } => entity(&ctx, EntityKey::Employees, &action),
        Commands::Architects { action } => entity(&ctx, EntityKey::Architects, &action),
        Commands::Machines { action } => entity(&ctx, EntityKey::Machines, &action),
        Commands::Expenses { action } => entity(&ctx, EntityKey::Expenses, &action),
        Commands::BudgetCategories { action } => entity(&ctx, EntityKey::BudgetCategories, &action),
        Commands::ProjectBudgets { action } => entity(&ctx, EntityKey::ProjectBudgets, &action),
        Commands::Tasks { action } => entity(&ctx, EntityKey::Tasks, &action),
        Commands::TeamMembers { action } => entity(&ctx, EntityKey::TeamMembers, &action),
        Commands::Documents { action } => entity(&ctx, EntityKey::Documents, &action),
    }
}

fn entity(ctx: &AppContext, key: EntityKey, action: &EntityAction) -> Result<()> {
    commands::crud::run(ctx, entities::descriptor(key), action)
}
