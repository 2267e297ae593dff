use clap::{Parser, Subcommand};
use spotiviz::{AuthConfig, AuthSession, Dashboard, Playlist};

#[derive(Parser)]
#[command(name = "spotiviz-cli")]
#[command(about = "CLI for Spotiviz - Spotify playlist analytics", long_about = None)]
struct Cli {
    /// Spotify access token (can also be set via SPOTIFY_TOKEN env var)
    #[arg(long, env = "SPOTIFY_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the URL the user visits to authorize the application
    AuthUrl {
        /// OAuth client ID
        #[arg(long, env = "SPOTIFY_CLIENT_ID")]
        client_id: String,

        /// OAuth client secret
        #[arg(long, env = "SPOTIFY_CLIENT_SECRET")]
        client_secret: String,

        /// Redirect URI registered with the application
        #[arg(long, env = "SPOTIFY_REDIRECT_URI")]
        redirect_uri: String,
    },
    /// Show the signed-in user
    Me,
    /// List the user's playlists
    Playlists,
    /// Load and normalize tracks for one or more playlists
    Tracks {
        /// Playlist IDs to load
        ids: Vec<String>,

        /// Print the normalized rows as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::AuthUrl {
        client_id,
        client_secret,
        redirect_uri,
    } = &cli.command
    {
        let config = AuthConfig::new(client_id, client_secret, redirect_uri);
        println!("{}", AuthSession::authorize_url(&config));
        return Ok(());
    }

    let token = cli
        .token
        .ok_or("missing access token: pass --token or set SPOTIFY_TOKEN")?;
    let dashboard = Dashboard::with_token(token);

    match &cli.command {
        Commands::AuthUrl { .. } => unreachable!("handled above"),
        Commands::Me => {
            let user = dashboard.current_user().await?;
            println!("Hello, {} (id: {}).", user.display_name, user.id);
        }
        Commands::Playlists => {
            let playlists = dashboard.playlists().await?;
            for (i, playlist) in playlists.iter().enumerate() {
                println!("{}. {} (ID: {})", i + 1, playlist.display_name, playlist.id);
            }
        }
        Commands::Tracks { ids, json } => {
            // Resolve the display names the rows get tagged with.
            let known = dashboard.playlists().await?;
            let selected: Vec<Playlist> = ids
                .iter()
                .map(|id| {
                    known
                        .iter()
                        .find(|p| &p.id == id)
                        .cloned()
                        .unwrap_or_else(|| Playlist::new(id.clone(), id.clone()))
                })
                .collect();

            let outcome = dashboard.load_tracks(&selected).await?;

            if *json {
                println!("{}", serde_json::to_string_pretty(outcome.table.rows())?);
            } else {
                let views = dashboard.classify_columns(&outcome.table);
                println!(
                    "{} row(s), {} column(s) ({} hidden by default)",
                    outcome.table.len(),
                    views.all.len(),
                    views.hidden.len()
                );
                for descriptor in &views.all {
                    let marker = if views.hidden.contains(&descriptor.name) {
                        " (hidden)"
                    } else {
                        ""
                    };
                    println!("  {}{}", descriptor.name, marker);
                }
            }

            if !outcome.diagnostics.is_empty() {
                eprintln!("{} diagnostic(s):", outcome.diagnostics.entries().len());
                for diagnostic in outcome.diagnostics.entries() {
                    eprintln!("  [{:?}] {}", diagnostic.kind, diagnostic.message);
                }
            }
        }
    }

    Ok(())
}
