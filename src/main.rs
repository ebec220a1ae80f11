use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};

use gallery::guard::{self, GuardDecision};
use gallery::images::UploadFile;
use gallery::net::transport::{HttpTransport, TransportError};
use gallery::net::types::{LoginRequest, RegistrationRequest, Resize, TransformationRequest};
use gallery::{ClientConfig, ClientError, Gallery, SessionError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("http client setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error("--width and --height must be given together")]
    PartialResize,
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "gallery", about = "Image gallery session and API client")]
struct Cli {
    #[arg(long, env = "GALLERY_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "GALLERY_SESSION_DIR")]
    session_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account. Does not sign in.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        last_name: String,
    },
    /// End the session.
    Logout,
    /// Show what each session view holds.
    Status,
    /// Show where the route guard would send a request for `path`.
    Route { path: String },
    Images(ImagesCommand),
}

#[derive(Args, Debug)]
struct ImagesCommand {
    #[command(subcommand)]
    command: ImagesSubcommand,
}

#[derive(Subcommand, Debug)]
enum ImagesSubcommand {
    List,
    Upload(UploadArgs),
    Delete { id: String },
}

#[derive(Args, Debug)]
struct UploadArgs {
    path: PathBuf,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    #[arg(long, default_value_t = 0)]
    rotate: u16,
    #[arg(long)]
    flip: bool,
    #[arg(long)]
    flop: bool,
    #[arg(long)]
    grayscale: bool,
}

impl UploadArgs {
    fn transformations(&self) -> Result<TransformationRequest, CliError> {
        let resize = match (self.width, self.height) {
            (Some(width), Some(height)) => Some(Resize { width, height }),
            (None, None) => None,
            _ => return Err(CliError::PartialResize),
        };
        Ok(TransformationRequest {
            resize,
            rotate: self.rotate,
            flip: self.flip,
            flop: self.flop,
            grayscale: self.grayscale,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url);
    }
    if let Some(session_dir) = cli.session_dir {
        config = config.with_session_dir(session_dir);
    }

    let session = config.open_session()?;
    let transport = Arc::new(HttpTransport::new(&config.api_url)?);
    let gallery = Gallery::new(session, transport);

    match cli.command {
        Command::Login { email, password } => run_login(&gallery, LoginRequest { email, password }).await,
        Command::Register { email, password, name, last_name } => {
            let user = gallery.register(&RegistrationRequest { email, password, name, last_name }).await?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::Logout => {
            gallery.logout()?;
            print_json(&json!({ "signedIn": false }))
        }
        Command::Status => run_status(&gallery),
        Command::Route { path } => run_route(&gallery, &path),
        Command::Images(images) => run_images(&gallery, images.command).await,
    }
}

async fn run_login(gallery: &Gallery, credentials: LoginRequest) -> Result<(), CliError> {
    let outcome = gallery.login(&credentials).await?;
    print_json(&json!({ "user": outcome.user, "landing": outcome.landing, "message": outcome.message }))
}

fn run_status(gallery: &Gallery) -> Result<(), CliError> {
    let session = gallery.session();
    print_json(&json!({
        "signedIn": session.has_token(),
        "persistent": session.stored_token()?.is_some(),
        "cookie": session.cookie_token()?.is_some(),
    }))
}

fn run_route(gallery: &Gallery, path: &str) -> Result<(), CliError> {
    let cookie = gallery.session().cookie_token()?;
    let guarded = guard::is_guarded(path);
    let rendered = match guard::evaluate(cookie.as_deref(), path) {
        GuardDecision::Allow => json!({ "path": path, "guarded": guarded, "decision": "allow" }),
        GuardDecision::Redirect(target) => {
            json!({ "path": path, "guarded": guarded, "decision": "redirect", "location": target })
        }
    };
    print_json(&rendered)
}

async fn run_images(gallery: &Gallery, command: ImagesSubcommand) -> Result<(), CliError> {
    match command {
        ImagesSubcommand::List => {
            let images = gallery.refresh().await?;
            print_json(&serde_json::to_value(images)?)
        }
        ImagesSubcommand::Upload(args) => {
            let transformations = args.transformations()?;
            let file = UploadFile::from_path(&args.path).await?;
            let image = gallery.upload(&file, &transformations).await?;
            print_json(&serde_json::to_value(image)?)
        }
        ImagesSubcommand::Delete { id } => {
            gallery.delete(&id).await?;
            print_json(&json!({ "deleted": id }))
        }
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
