use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use createathon::config::Config;
use createathon::models::Difficulty;
use createathon::views::StatusFilter;

mod cli;

use cli::app::App;
use cli::auth::{ProfileArgs, RegisterArgs};
use cli::challenges::ListArgs;

#[derive(Parser)]
#[command(name = "createathon")]
#[command(about = "Createathon coding challenges from the terminal")]
#[command(version)]
struct Cli {
    /// Backend API root (overrides config and CREATEATHON_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to the config file (defaults to ~/.createathon/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the token pair
    Login {
        #[arg(short, long)]
        username: Option<String>,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account and log in
    Register {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },

    /// Forget the stored tokens
    Logout,

    /// Show who is logged in
    Whoami,

    /// Show your profile, or update it when any field is given
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        github: Option<String>,
        #[arg(long)]
        linkedin: Option<String>,
        #[arg(long)]
        website: Option<String>,
    },

    /// Progress summary, recent challenges and top users
    Dashboard,

    /// List challenges
    Challenges {
        /// Match against title and description
        #[arg(short, long)]
        search: Option<String>,
        /// beginner, intermediate or advanced
        #[arg(short, long)]
        difficulty: Option<Difficulty>,
        /// Category id
        #[arg(long)]
        category: Option<u64>,
        /// all, completed, in-progress or not-started
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Only bookmarked challenges
        #[arg(long)]
        bookmarked: bool,
    },

    /// List challenge categories
    Categories,

    /// Show a challenge and start its timer
    Challenge { id: u64 },

    /// Submit a solution
    Submit {
        id: u64,
        /// Solution text
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        /// Read the solution from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Toggle the bookmark on a challenge
    Bookmark { id: u64 },

    /// List your submissions
    Submissions {
        /// Only submissions for this challenge
        #[arg(long)]
        challenge: Option<u64>,
    },

    /// Show your progress, overall or for one challenge
    Progress { id: Option<u64> },

    /// Show the leaderboard
    Leaderboard {
        /// Match against username and name
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show earned achievements
    Achievements,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let mut app = App::new(&config, cli.api_url.as_deref(), cli.json);
    app.start().await?;

    let result = run(&mut app, cli.command).await;
    app.close();
    result
}

async fn run(app: &mut App, command: Commands) -> Result<()> {
    match command {
        Commands::Login { username, password } => {
            cli::auth::login_command(app, username, password).await
        }
        Commands::Register {
            username,
            email,
            password,
            confirm_password,
            first_name,
            last_name,
        } => {
            let args = RegisterArgs {
                username,
                email,
                password,
                confirm_password,
                first_name,
                last_name,
            };
            cli::auth::register_command(app, args).await
        }
        Commands::Logout => cli::auth::logout_command(app),
        Commands::Whoami => cli::auth::whoami_command(app),
        Commands::Profile {
            first_name,
            last_name,
            bio,
            github,
            linkedin,
            website,
        } => {
            let args = ProfileArgs {
                first_name,
                last_name,
                bio,
                github,
                linkedin,
                website,
            };
            cli::auth::profile_command(app, args).await
        }
        Commands::Dashboard => cli::progress::dashboard_command(app).await,
        Commands::Challenges {
            search,
            difficulty,
            category,
            status,
            page,
            bookmarked,
        } => {
            let args = ListArgs {
                search,
                difficulty,
                category,
                status,
                page,
                bookmarked,
            };
            cli::challenges::list_command(app, args).await
        }
        Commands::Categories => cli::challenges::categories_command(app).await,
        Commands::Challenge { id } => cli::challenges::show_command(app, id).await,
        Commands::Submit { id, content, file } => {
            cli::challenges::submit_command(app, id, content, file).await
        }
        Commands::Bookmark { id } => cli::challenges::bookmark_command(app, id),
        Commands::Submissions { challenge } => {
            cli::challenges::submissions_command(app, challenge).await
        }
        Commands::Progress { id } => cli::progress::progress_command(app, id).await,
        Commands::Leaderboard { search } => {
            cli::progress::leaderboard_command(app, search).await
        }
        Commands::Achievements => cli::progress::achievements_command(app).await,
    }
}
