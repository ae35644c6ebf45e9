mod admin;
mod command;
mod config;
mod content;
mod control;
mod error;
mod listener;
mod logging;
mod session;
mod storage;
mod world;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn};

use command::CommandDispatcher;
use config::Cli;
use control::ControlMessage;
use session::machine::{self, MachineContext};
use session::SessionManager;
use storage::PersistenceStore;
use world::{TickEngine, WorldRegistry};

const IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli)?;
    info!("thornkeepd starting");

    let main_rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let store = main_rt.block_on(PersistenceStore::from_cli(&cli))?;
    info!("persistence backend: {}", store.backend_name());

    let (control_tx, control_rx) = crossbeam_channel::unbounded::<ControlMessage>();

    let telnet_port = cli.telnet_port;
    let websocket_port = cli.websocket_port;
    let admin_port = cli.admin_port;
    let admin_token = Arc::new(cli.admin_token.clone());
    let tick_interval = Duration::from_millis(2000);
    let test_mode = cli.test_mode;

    let world_thread_tx = control_tx.clone();
    let world_thread = std::thread::Builder::new()
        .name("thornkeep-world".to_string())
        .spawn(move || run_world_thread(cli, store, control_rx))?;

    main_rt.block_on(async move {
        let tick_tx = world_thread_tx.clone();
        if !test_mode {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(tick_interval);
                loop {
                    interval.tick().await;
                    if tick_tx.send(ControlMessage::Tick).is_err() {
                        break;
                    }
                }
            });
        }

        let admin_state = admin::AdminState {
            control_tx: world_thread_tx.clone(),
            token: admin_token,
        };
        let admin_router = admin::router(admin_state);
        let admin_addr = std::net::SocketAddr::from(([0, 0, 0, 0], admin_port));
        tokio::spawn(async move {
            if let Err(error) = axum::Server::bind(&admin_addr).serve(admin_router.into_make_service()).await {
                error!("admin HTTP server exited: {error}");
            }
        });

        tokio::select! {
            result = listener::run_telnet(telnet_port, world_thread_tx.clone()) => result,
            result = listener::run_websocket(websocket_port, world_thread_tx.clone()) => result,
        }
    })?;

    let _ = world_thread.join();
    Ok(())
}

/// Owns the `World`/`SessionManager`/`CommandDispatcher` and the dedicated
/// current-thread runtime persistence calls block on (§5 "single-writer").
/// Nothing outside this function ever touches `WorldRegistry` directly.
fn run_world_thread(cli: Cli, store: PersistenceStore, control_rx: crossbeam_channel::Receiver<ControlMessage>) {
    let blocking_rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(error) => {
            error!("failed to start world-thread persistence runtime: {error}");
            return;
        }
    };

    let mut registry = WorldRegistry::new();
    let game_data = match content::load(&cli, &mut registry) {
        Ok(data) => data,
        Err(error) => {
            error!("failed to load game content: {error}");
            return;
        }
    };
    registry.world.insert_resource(game_data);

    let mut sessions = SessionManager::new();
    let dispatcher = CommandDispatcher::new();
    let mut tick_engine = TickEngine::new();
    let transfer_timeout = Duration::from_secs(30);
    let mut last_idle_sweep = std::time::Instant::now();

    loop {
        let message = match control_rx.recv() {
            Ok(message) => message,
            Err(_) => break,
        };

        let mut ctx = MachineContext {
            registry: &mut registry,
            sessions: &mut sessions,
            store: &store,
            rt: &blocking_rt,
            dispatcher: &dispatcher,
        };

        match message {
            ControlMessage::Connect { remote, output, reply } => {
                let session_id = ctx.sessions.connect(remote, output);
                let _ = reply.send(session_id);
                machine::handle_connect(&mut ctx, session_id);
            }
            ControlMessage::Line { session, line } => {
                if machine::handle_line(&mut ctx, session, line) {
                    ctx.sessions.disconnect(session);
                }
            }
            ControlMessage::Disconnect { session } => {
                machine::handle_disconnect(&mut ctx, session);
            }
            ControlMessage::Admin { request, reply } => {
                let response = admin::service::handle(&mut ctx, request);
                let _ = reply.send(response);
            }
            ControlMessage::Tick => {
                machine::sweep_expired_transfers(&mut ctx, transfer_timeout);
                tick_engine.advance(&mut registry.world);

                let mut tick_ctx = MachineContext {
                    registry: &mut registry,
                    sessions: &mut sessions,
                    store: &store,
                    rt: &blocking_rt,
                    dispatcher: &dispatcher,
                };
                machine::drain_outbox(&mut tick_ctx);

                if last_idle_sweep.elapsed() >= IDLE_SWEEP_INTERVAL {
                    last_idle_sweep = std::time::Instant::now();
                    for session_id in tick_ctx.sessions.idle_candidates(Duration::from_secs(15 * 60)) {
                        warn!("disconnecting idle session {}", session_id.0);
                        if let Some(client) = tick_ctx.sessions.client(session_id) {
                            client.send(thornkeep_common::messages::OutputKind::System, "Disconnected for inactivity.");
                            client.disconnect();
                        }
                    }
                }

                if registry.world.resource::<world::ShutdownRequested>().is_requested() {
                    info!("shutdown requested, stopping world thread");
                    break;
                }
            }
        }
    }
}
