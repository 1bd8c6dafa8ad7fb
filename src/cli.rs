use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stylefeed")]
#[command(about = "Personalised fashion feed, search and virtual try-on", long_about = None)]
pub struct Cli {
    /// Base URL of the recommendation service (overrides settings.toml)
    #[arg(long, env = "STYLEFEED_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Custom config directory (default: ~/.config/stylefeed)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Enable verbose logging (prints log path, sets DEBUG level)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse your feed (Enter: more, r: retry, q: quit)
    Feed {
        /// Print this many batches and exit instead of browsing
        #[arg(long, value_name = "N")]
        pages: Option<usize>,
    },
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "STYLEFEED_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Create an account
    Register(RegisterArgs),
    /// Ask the service to generate fresh recommendations
    Recommend {
        #[arg(short, long, default_value = "Not provided")]
        location: String,
    },
    /// Show generated recommendations
    Recommendations {
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Search products by type, model and colour
    Search(SearchArgs),
    /// Upload a profile picture for style analysis
    Analyze {
        /// Image file (jpg, png, webp)
        image: PathBuf,
    },
    /// Try a product on a photo of yourself
    TryOn {
        /// Image file (jpg, png, webp)
        image: PathBuf,
        #[arg(short, long)]
        product: String,
    },
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "STYLEFEED_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub skin_tone: String,
    #[arg(long)]
    pub body_type: String,
    /// Weight in kg
    #[arg(long)]
    pub weight: f64,
    /// Height in cm
    #[arg(long)]
    pub height: f64,
    #[arg(long)]
    pub age: u32,
    #[arg(long, default_value = "")]
    pub style_preference: String,
    #[arg(long, default_value = "")]
    pub additional_info: String,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    #[arg(long)]
    pub product_type: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,
}
