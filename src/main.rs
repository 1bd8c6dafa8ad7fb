mod api;
mod browse;
mod cli;
mod feed;
mod logging;
mod session;
mod settings;
mod storage;

#[cfg(test)]
mod test_utils;

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use api::{Registration, SearchFilters, StyleClient, UserProfile};
use browse::Pager;
use cli::{Cli, Commands, RegisterArgs, SearchArgs};
use feed::{ApiFeedProvider, FeedController};
use session::AppState;
use settings::Settings;
use storage::{Storage, StorageLocation};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = settings::config_dir(cli.config_dir.as_ref())
        .context("Could not determine config directory, pass --config-dir")?;
    let settings_path = settings::settings_path(&config_dir);
    let mut settings = Settings::load(&settings_path).unwrap_or_else(|e| {
        eprintln!("Warning: {}", e);
        Settings::default()
    });
    if !settings_path.exists()
        && let Err(e) = settings.save(&settings_path)
    {
        eprintln!("Warning: {}", e);
    }
    // Priority: CLI/env > settings file > default
    if let Some(url) = &cli.api_url {
        settings.api_url = url.clone();
    }

    let (_log_guard, log_path) = logging::init(&settings::log_dir(&config_dir), cli.verbose)?;
    if cli.verbose {
        eprintln!("Logging to {}", log_path.display());
    }

    let storage = Storage::open(StorageLocation::Path(settings::db_path(&config_dir)))
        .context("Failed to open session store")?;
    let mut state = AppState::restore(storage)
        .await
        .context("Failed to restore session")?;
    let client = StyleClient::new(&settings.api_url, settings.fetch_timeout())
        .context("Failed to create HTTP client")?;
    info!(api = client.base_url(), "starting");

    match cli.command.unwrap_or(Commands::Feed { pages: None }) {
        Commands::Feed { pages } => {
            let user = state.require_user()?;
            let provider = ApiFeedProvider::new(client, user.id.clone());
            let mut feed = FeedController::new(provider, settings.feed_config());
            match pages {
                Some(n) => browse::print_batches(&mut feed, n).await?,
                None => {
                    let mut pager = Pager::new(settings.viewport_rows, settings.near_bottom_rows);
                    browse::run(&mut feed, &mut pager).await?;
                }
            }
        }
        Commands::Login { username, password } => {
            let profile = client.login(&username, &password).await?;
            println!("Logged in as {}", profile.username);
            state.login(profile).await?;
        }
        Commands::Logout => {
            state.logout().await?;
            println!("Logged out.");
        }
        Commands::Whoami => match state.user() {
            Some(user) => print_profile(user),
            None => println!("Not logged in."),
        },
        Commands::Register(args) => register(&client, &mut state, args).await?,
        Commands::Recommend { location } => {
            let user = state.require_user()?;
            let out = client.generate_recommendations(&user.id, &location).await?;
            print_json(&out)?;
        }
        Commands::Recommendations { page } => {
            let user = state.require_user()?;
            let Some(recs) = client.recommendations(&user.id, page).await? else {
                println!("No recommendations yet. Run `stylefeed recommend` first.");
                return Ok(());
            };
            if let Some(analysis) = &recs.user_analysis {
                println!("Your analysis: {analysis}\n");
            }
            for rec in &recs.recommendations {
                print_json(rec)?;
            }
            if recs.has_next_page {
                println!(
                    "-- page {}, next: --page {}",
                    recs.current_page,
                    recs.current_page + 1
                );
            }
        }
        Commands::Search(args) => search(&client, &state, args).await?,
        Commands::Analyze { image } => {
            let user = state.require_user()?;
            let (name, bytes) = read_image(&image).await?;
            let out = client.analyze_profile_picture(&user.id, &name, bytes).await?;
            print_json(&out)?;
        }
        Commands::TryOn { image, product } => {
            state.require_user()?;
            let (name, bytes) = read_image(&image).await?;
            let out = client.virtual_try_on(&name, &bytes, &product).await?;
            print_json(&out)?;
        }
    }

    Ok(())
}

async fn register(
    client: &StyleClient,
    state: &mut AppState<Storage>,
    args: RegisterArgs,
) -> Result<()> {
    let registration = Registration {
        username: args.username,
        email: args.email,
        password: args.password,
        skin_tone: args.skin_tone,
        body_type: args.body_type,
        weight: args.weight,
        height: args.height,
        age: args.age,
        style_preference: args.style_preference,
        additional_info: args.additional_info,
    };
    registration.validate().map_err(|e| anyhow!(e))?;

    let profile = client.register(&registration).await?;
    println!("Welcome, {}!", profile.username);
    state.login(profile).await?;
    Ok(())
}

async fn search(client: &StyleClient, state: &AppState<Storage>, args: SearchArgs) -> Result<()> {
    let user = state.require_user()?;
    let filters = SearchFilters {
        product_type: args.product_type,
        model: args.model,
        color: args.color,
    };
    if filters.is_empty() {
        bail!("Select at least one filter: --product-type, --model or --color");
    }
    let results = client.advanced_search(&user.id, &filters, args.page).await?;
    print_json(&results)
}

async fn read_image(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("photo.jpg")
        .to_string();
    Ok((name, bytes))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to format response")?;
    println!("{}", json);
    Ok(())
}

fn print_profile(user: &UserProfile) {
    println!("{} <{}>", user.username, user.email);
    println!("  skin tone:  {}", user.skin_tone);
    println!("  body type:  {}", user.body_type);
    println!("  height:     {} cm", user.height);
    println!("  weight:     {} kg", user.weight);
    println!("  age:        {}", user.age);
    if !user.style_preference.is_empty() {
        println!("  style:      {}", user.style_preference);
    }
}
