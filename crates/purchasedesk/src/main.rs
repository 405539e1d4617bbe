use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use purchasedesk::auth::SessionStore;
use purchasedesk::render;
use purchasedesk::routes::login::{self, LoginForm};
use purchasedesk::routes::users::{LoadState, UserListView};
use purchasedesk::{AppState, Config, Route};

#[derive(Parser)]
#[command(name = "purchasedesk")]
#[command(about = "Manage users and their purchases")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL (overrides PURCHASEDESK_API_URL)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Session file (overrides PURCHASEDESK_TOKEN_PATH)
    #[arg(long, value_name = "PATH")]
    token_path: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PURCHASEDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session token
    Logout,
    /// Show all users and the most recent purchases
    Users,
    /// Manage one user's purchases
    Purchases {
        #[command(subcommand)]
        command: PurchaseCommands,
    },
}

#[derive(Subcommand)]
enum PurchaseCommands {
    List {
        #[arg(long)]
        user: i64,
    },
    Add {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: String,
    },
    Edit {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: String,
    },
    Delete {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file (from repo root)
    dotenvy::from_filename("../../.env").ok();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.log_json);

    let mut config = Config::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url)?;
    }
    if let Some(token_path) = cli.token_path.clone() {
        config.token_path = token_path;
    }

    let session = SessionStore::open(&config.token_path).with_context(|| {
        format!("Failed to open session file {}", config.token_path.display())
    })?;

    let ok = match cli.command {
        Commands::Login { email, password } => {
            let mut state = AppState::new(config, session, Route::Login);
            let ok = LoginForm::new(email, password).submit(&mut state).await;
            finish(&mut state, ok)
        }
        Commands::Logout => {
            let mut state = AppState::new(config, session, Route::Users);
            let ok = login::logout(&mut state);
            finish(&mut state, ok)
        }
        Commands::Users => {
            let mut state = AppState::new(config, session, Route::Users);
            let mut view = UserListView::mount(&state);
            view.load(&mut state).await;
            print_list(&view);
            let ok = view.load_state() == LoadState::Loaded;
            finish(&mut state, ok)
        }
        Commands::Purchases { command } => {
            let mut state = AppState::new(config, session, Route::Users);
            run_purchases(&mut state, command).await
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn run_purchases(state: &mut AppState, command: PurchaseCommands) -> bool {
    let user_id = match &command {
        PurchaseCommands::List { user }
        | PurchaseCommands::Add { user, .. }
        | PurchaseCommands::Edit { user, .. }
        | PurchaseCommands::Delete { user, .. } => *user,
    };

    let mut view = UserListView::mount(state);
    view.load(state).await;
    if view.load_state() != LoadState::Loaded {
        return finish(state, false);
    }
    if !view.open_editor(user_id) {
        eprintln!("No user with id {user_id}");
        return finish(state, false);
    }

    let ok = match command {
        PurchaseCommands::List { .. } => true,
        PurchaseCommands::Add { name, price, .. } => {
            if let Some(editor) = view.editor_mut() {
                editor.set_draft(name, price);
            }
            view.create_purchase(state).await
        }
        PurchaseCommands::Edit { id, name, price, .. } => {
            let editing = view
                .editor_mut()
                .is_some_and(|editor| editor.begin_edit(id) && editor.set_edit_fields(name, price));
            if editing {
                view.confirm_edit(state).await
            } else {
                eprintln!("User {user_id} has no purchase {id}");
                false
            }
        }
        PurchaseCommands::Delete { id, .. } => view.delete_purchase(state, id).await,
    };

    if view.is_mounted() {
        if let Some(editor) = view.editor() {
            println!("{}", render::editor(editor));
        }
        println!("{}", render::history_panel(view.history()));
    }
    finish(state, ok)
}

fn print_list(view: &UserListView) {
    if !view.is_mounted() {
        return;
    }
    println!("{}", render::users_table(view.users()));
    println!("{}", render::history_panel(view.history()));
}

/// Report the visible toast and where the app ended up.
fn finish(state: &mut AppState, ok: bool) -> bool {
    for toast in state.take_toasts(Instant::now()) {
        eprintln!("error: {}", render::toast(&toast));
    }
    eprintln!("-> {}", state.navigator.current());
    ok
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("purchasedesk=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
