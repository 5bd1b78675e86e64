use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use labtime::cli::{
    AdminCommands, AuthCommands, WeekendCommands, run_auth_login, run_auth_logout, run_block,
    run_book, run_info, run_init, run_labs, run_release, run_timetable, run_weekend_default,
    run_weekend_override, run_weekend_show,
};
use labtime::config::ServerConfig;
use labtime::server::{AppState, create_router};
use labtime::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "labtime")]
#[command(about = "Lab timetable and booking server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Log in to or out of a server
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Start the server
    Serve {
        /// TOML config file; flags override its values
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// List labs
    Labs,

    /// Show a lab's timetable for the coming seven days
    Timetable {
        /// Lab id
        lab: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Book a free slot for a date
    Book {
        /// Slot id (shown as #id in the timetable)
        slot: i64,

        /// Date as YYYY-MM-DD
        date: String,

        /// What the slot is booked for
        #[arg(long)]
        class_info: Option<String>,
    },

    /// Release a booking
    Release {
        /// Slot id
        slot: i64,

        /// Date as YYYY-MM-DD
        date: String,
    },

    /// Mark a slot Regular or Free (admin)
    Block {
        /// Slot id
        slot: i64,

        /// Free or Regular
        #[arg(long)]
        status: String,

        /// Class shown on a Regular slot
        #[arg(long)]
        class_info: Option<String>,
    },

    /// Weekend defaults and overrides
    Weekend {
        #[command(subcommand)]
        command: WeekendCommands,
    },
}

async fn serve(
    config_file: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = match config_file {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(data_dir) = data_dir {
        config.data_dir = data_dir;
    }

    let db_path = config.db_path();
    if !db_path.exists() {
        bail!("Server not initialized. Run 'labtime admin init' first to create the database.");
    }

    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;
    if store.count_admins()? == 0 {
        bail!("No admin user found. Run 'labtime admin init' first.");
    }

    let state = Arc::new(AppState::new(
        Arc::new(store),
        Arc::new(mockable::DefaultClock),
        config.session_ttl_hours,
    ));

    let sweep = state.timetable.purge_expired()?;
    info!(
        "Startup sweep removed {} bookings and {} overrides",
        sweep.bookings, sweep.overrides
    );

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Client commands use blocking reqwest, which must not run inside a runtime,
// so only `serve` gets one.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("labtime=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                admin_password,
                labs,
                non_interactive,
            } => run_init(
                data_dir,
                admin_password,
                labs.unwrap_or(ServerConfig::default().seed_labs),
                non_interactive,
            )?,
            AdminCommands::Info { data_dir, json } => run_info(data_dir, json)?,
        },
        Commands::Auth { command } => match command {
            AuthCommands::Login {
                server,
                faculty_id,
                password,
                non_interactive,
            } => run_auth_login(server, faculty_id, password, non_interactive)?,
            AuthCommands::Logout => run_auth_logout()?,
        },
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
        } => tokio::runtime::Runtime::new()?.block_on(serve(config, host, port, data_dir))?,
        Commands::Labs => run_labs()?,
        Commands::Timetable { lab, json } => run_timetable(lab, json)?,
        Commands::Book {
            slot,
            date,
            class_info,
        } => run_book(slot, date, class_info)?,
        Commands::Release { slot, date } => run_release(slot, date)?,
        Commands::Block {
            slot,
            status,
            class_info,
        } => run_block(slot, status, class_info)?,
        Commands::Weekend { command } => match command {
            WeekendCommands::Show { target } => run_weekend_show(target)?,
            WeekendCommands::Default { target, day, text } => {
                run_weekend_default(target, day, text)?
            }
            WeekendCommands::Override { lab, day, source } => {
                run_weekend_override(lab, day, source)?
            }
        },
    }

    Ok(())
}
