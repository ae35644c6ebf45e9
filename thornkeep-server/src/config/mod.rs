mod mud_config;

pub use mud_config::{GametimerConfig, MudConfig};

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PersistenceBackendKind {
    File,
    Sqlite,
    Postgres,
}

/// Startup configuration, mirroring the CLI surface in §6: ports, data
/// directory, per-collection overrides, direct-JSON injection, auto-admin
/// session, forced session takeover, and debug/test toggles.
#[derive(Parser, Debug)]
#[command(name = "thornkeepd", about = "Thornkeep MUD server")]
pub struct Cli {
    #[arg(long, default_value_t = 8023)]
    pub telnet_port: u16,

    #[arg(long, default_value_t = 8080)]
    pub websocket_port: u16,

    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = PersistenceBackendKind::File)]
    pub persistence_backend: PersistenceBackendKind,

    #[arg(long)]
    pub database_url: Option<String>,

    #[arg(long)]
    pub rooms_file: Option<PathBuf>,

    #[arg(long)]
    pub users_file: Option<PathBuf>,

    #[arg(long)]
    pub items_file: Option<PathBuf>,

    #[arg(long)]
    pub npcs_file: Option<PathBuf>,

    /// Inject one room/user/item/npc record directly as a JSON literal
    /// rather than from a file, for scripted test setup.
    #[arg(long)]
    pub inject_json: Vec<String>,

    #[arg(long)]
    pub auto_admin_session: bool,

    #[arg(long)]
    pub auto_user_session: Option<String>,

    /// Forces a session for this username into AUTHENTICATED without a
    /// login round-trip, for scripted smoke tests.
    #[arg(long)]
    pub force_session: Option<String>,

    #[arg(long)]
    pub force_admin_create: bool,

    #[arg(long)]
    pub disable_remote_admin: bool,

    #[arg(long)]
    pub silent: bool,

    #[arg(long)]
    pub no_console: bool,

    #[arg(long)]
    pub no_color: bool,

    #[arg(long)]
    pub debug: bool,

    /// Pauses the tick; tests advance it manually.
    #[arg(long)]
    pub test_mode: bool,

    #[arg(long)]
    pub shutdown_minutes: Option<u32>,

    #[arg(long, default_value_t = 9090)]
    pub admin_port: u16,

    /// Bearer token required on every `/admin` request; a missing token
    /// disables the admin API entirely rather than leaving it open.
    #[arg(long)]
    pub admin_token: Option<String>,
}
