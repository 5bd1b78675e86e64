use clap::Subcommand;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Initialize the server (create database, labs and the admin user)
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Password for the admin user (generated when omitted non-interactively)
        #[arg(long)]
        admin_password: Option<String>,

        /// Number of labs to create, named "Lab 1" to "Lab N" [default: 10]
        #[arg(long)]
        labs: Option<u32>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Show server status information
    Info {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Log in to a server and store the session token
    Login {
        /// Server URL (e.g., "http://localhost:8080")
        #[arg(long)]
        server: Option<String>,

        /// Faculty id to log in as
        #[arg(long)]
        faculty_id: Option<String>,

        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// End the session and remove stored credentials
    Logout,
}

#[derive(Subcommand)]
pub enum WeekendCommands {
    /// Show weekend defaults and overrides
    Show {
        /// Lab id, or "global"
        target: String,
    },

    /// Set the default text for a weekend day (empty text unblocks it)
    Default {
        /// Lab id, or "global"
        target: String,

        /// Saturday or Sunday
        day: String,

        /// Blocking text, e.g. "Seminar"
        #[arg(long)]
        text: Option<String>,
    },

    /// Make this week's Saturday or Sunday follow a weekday timetable
    Override {
        /// Lab id
        lab: i64,

        /// Saturday or Sunday
        day: String,

        /// Weekday to follow; omit to clear the override
        #[arg(long)]
        source: Option<String>,
    },
}
