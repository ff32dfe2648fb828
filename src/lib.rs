use structopt::StructOpt;

pub mod admin;
pub mod api;
pub mod auth;
pub mod client;
mod commands;
pub mod error;
pub mod gallery;
pub mod lightbox;
pub mod likes;
pub mod multipart;
pub mod pending;
pub mod session;
pub mod telemetry;

pub use client::{AuthMode, Client};

#[derive(Debug)]
pub enum Error {
    TelemetryInitError(anyhow::Error),
    Io(std::io::Error),
    Request(error::Error),
}

impl From<Error> for u8 {
    fn from(error: Error) -> u8 {
        match error {
            Error::TelemetryInitError(_) => 4,
            Error::Io(_) => 5,
            Error::Request(error::Error::Unauthorized) => 6,
            Error::Request(error::Error::Validation(_)) => 7,
            Error::Request(_) => 8,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TelemetryInitError(err) => {
                write!(f, "Failed to init telemetry: {}", err)
            },
            Error::Io(err) => {
                write!(f, "I/O error: {}", err)
            },
            Error::Request(err) => {
                write!(f, "{}", err)
            },
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<error::Error> for Error {
    fn from(err: error::Error) -> Self {
        Error::Request(err)
    }
}

#[derive(Debug, StructOpt)]
pub struct Args {
    /// Gallery API base URL.
    #[structopt(long, env = "LUMINA_API_ENDPOINT")]
    endpoint: url::Url,

    /// File the admin session token is kept in between runs.
    #[structopt(
        long,
        parse(from_os_str),
        default_value = ".lumina-admin-token",
        env = "LUMINA_TOKEN_FILE"
    )]
    token_file: std::path::PathBuf,

    #[structopt(subcommand)]
    command: commands::Command,
}

pub async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    let args = Args::from_args();

    telemetry::init().map_err(Error::TelemetryInitError)?;

    let session = session::SessionStore::open(session::FileStorage::new(&args.token_file));
    let client = std::sync::Arc::new(Client::new(api::HttpApi::new(args.endpoint), session));

    let result = commands::run(client, args.command).await;
    telemetry::shutdown();
    result
}
