use thornkeep_common::components::{AuthFlags, Location, Stats};
use thornkeep_common::messages::OutputKind;
use thornkeep_common::password::{generate_salt, PasswordHash};
use thornkeep_common::UserRecord;
use thornkeep_data::{ClassId, RaceId, ResourceKind, RoomId, UserId};

use crate::command::{CommandContext, CommandDispatcher, CommandOutcome, DispatchOutcome, StateTransition};
use crate::content::STARTING_ROOM_ID;
use crate::control::SessionId;
use crate::session::{ClientState, SessionManager};
use crate::storage::{collections, PersistenceStore};
use crate::world::registry::WorldRegistry;
use crate::world::systems::autosave::{snapshot_user, user_bundle};
use crate::world::GameData;

const LOGIN_ATTEMPTS: u32 = 3;
const CONFIRMATION_ATTEMPTS: u32 = 3;

/// Everything [`handle_line`]/[`handle_connect`]/[`handle_disconnect`] need,
/// bundled so the world thread's driver loop doesn't have to pass five
/// separate arguments through every call (§4.3).
pub struct MachineContext<'a> {
    pub registry: &'a mut WorldRegistry,
    pub sessions: &'a mut SessionManager,
    pub store: &'a PersistenceStore,
    pub rt: &'a tokio::runtime::Runtime,
    pub dispatcher: &'a CommandDispatcher,
}

impl MachineContext<'_> {
    fn tell(&self, session_id: SessionId, kind: OutputKind, text: impl Into<String>) {
        self.sessions.send_to(session_id, kind, text);
    }

    fn load_user(&self, username: &str) -> Option<UserRecord> {
        self.rt
            .block_on(self.store.load_one_typed::<UserRecord>(collections::USERS, username))
            .ok()
            .flatten()
    }

    pub(crate) fn save_user(&self, record: &UserRecord) {
        if let Err(error) = self
            .rt
            .block_on(self.store.save_one_typed(collections::USERS, record.user_id.as_str(), record))
        {
            log::error!("failed to save user {}: {error}", record.user_id);
        }
    }
}

/// §4.3 CONNECTING entry: send the banner and fall straight through to
/// LOGIN, since CONNECTING accepts no input of its own.
pub fn handle_connect(ctx: &mut MachineContext, session_id: SessionId) {
    ctx.tell(session_id, OutputKind::System, "Welcome to Thornkeep.");
    enter_login(ctx, session_id, 0);
}

fn enter_login(ctx: &mut MachineContext, session_id: SessionId, attempts: u32) {
    if let Some(client) = ctx.sessions.client_mut(session_id) {
        client.state = ClientState::Login { attempts };
        client.set_mask(false);
    }
    ctx.tell(session_id, OutputKind::Prompt, "Username:");
}

/// Dispatches one input line according to the session's current state
/// (§4.3's per-state `handle`). Returns `true` if the session should be
/// dropped by the caller (quit or a fatal protocol condition).
pub fn handle_line(ctx: &mut MachineContext, session_id: SessionId, line: String) -> bool {
    ctx.sessions.touch(session_id);
    let Some(client) = ctx.sessions.client(session_id) else {
        return true;
    };
    if client.taken_over_by.is_some() {
        return false;
    }

    match client.state {
        ClientState::Connecting => false,
        ClientState::Login { attempts } => handle_login(ctx, session_id, attempts, &line),
        ClientState::Signup { .. } => handle_signup(ctx, session_id, &line),
        ClientState::Confirmation { .. } => handle_confirmation(ctx, session_id, &line),
        ClientState::Game { .. } => handle_game(ctx, session_id, &line),
        ClientState::TransferRequest { .. } => handle_transfer_request(ctx, session_id, &line),
        ClientState::Editor { .. } => handle_editor(ctx, session_id, &line),
        ClientState::SnakeGame { .. } => handle_snake_game(ctx, session_id, &line),
    }
}

fn handle_login(ctx: &mut MachineContext, session_id: SessionId, attempts: u32, line: &str) -> bool {
    let username = line.trim();
    if username.is_empty() || username.len() > 24 {
        return reject_login_attempt(ctx, session_id, attempts, "Enter a valid username.");
    }

    match ctx.load_user(UserId::new(username).as_str()) {
        Some(record) if record.is_banned() => {
            ctx.tell(session_id, OutputKind::System, "That account has been banned.");
            if let Some(client) = ctx.sessions.client(session_id) {
                client.disconnect();
            }
            true
        }
        Some(_) => {
            if let Some(client) = ctx.sessions.client_mut(session_id) {
                client.state = ClientState::Confirmation {
                    username: username.to_string(),
                    is_new_account: false,
                    attempts: CONFIRMATION_ATTEMPTS,
                    pending_password: None,
                };
                client.set_mask(true);
            }
            ctx.tell(session_id, OutputKind::Prompt, "Password:");
            false
        }
        None => {
            if let Some(client) = ctx.sessions.client_mut(session_id) {
                client.state = ClientState::Signup {
                    username: username.to_string(),
                };
            }
            ctx.tell(
                session_id,
                OutputKind::Prompt,
                format!("No account named '{username}' exists. Create it? (y/n)"),
            );
            false
        }
    }
}

fn reject_login_attempt(ctx: &mut MachineContext, session_id: SessionId, attempts: u32, message: &str) -> bool {
    ctx.tell(session_id, OutputKind::System, message);
    if attempts + 1 >= LOGIN_ATTEMPTS {
        ctx.tell(session_id, OutputKind::System, "Too many attempts.");
        if let Some(client) = ctx.sessions.client(session_id) {
            client.disconnect();
        }
        return true;
    }
    enter_login(ctx, session_id, attempts + 1);
    false
}

fn handle_signup(ctx: &mut MachineContext, session_id: SessionId, line: &str) -> bool {
    let Some(ClientState::Signup { username }) = ctx.sessions.client(session_id).map(|c| c.state.clone()) else {
        return false;
    };
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => {
            if let Some(client) = ctx.sessions.client_mut(session_id) {
                client.state = ClientState::Confirmation {
                    username,
                    is_new_account: true,
                    attempts: CONFIRMATION_ATTEMPTS,
                    pending_password: None,
                };
                client.set_mask(true);
            }
            ctx.tell(session_id, OutputKind::Prompt, "Choose a password:");
            false
        }
        _ => {
            enter_login(ctx, session_id, 0);
            false
        }
    }
}

fn handle_confirmation(ctx: &mut MachineContext, session_id: SessionId, line: &str) -> bool {
    let Some(ClientState::Confirmation {
        username,
        is_new_account,
        attempts,
        pending_password,
    }) = ctx.sessions.client(session_id).map(|c| c.state.clone())
    else {
        return false;
    };

    if is_new_account {
        handle_signup_password(ctx, session_id, username, attempts, pending_password, line.to_string())
    } else {
        handle_login_password(ctx, session_id, username, attempts, line)
    }
}

fn handle_signup_password(
    ctx: &mut MachineContext,
    session_id: SessionId,
    username: String,
    attempts: u32,
    pending_password: Option<String>,
    entered: String,
) -> bool {
    match pending_password {
        None => {
            if let Some(client) = ctx.sessions.client_mut(session_id) {
                client.state = ClientState::Confirmation {
                    username,
                    is_new_account: true,
                    attempts,
                    pending_password: Some(entered),
                };
            }
            ctx.tell(session_id, OutputKind::Prompt, "Confirm password:");
            false
        }
        Some(first) if first == entered => {
            let user_id = create_user(ctx, &username, &entered);
            enter_game(ctx, session_id, user_id, true);
            false
        }
        Some(_) => {
            let remaining = attempts.saturating_sub(1);
            if remaining == 0 {
                ctx.tell(session_id, OutputKind::System, "Passwords didn't match. Goodbye.");
                if let Some(client) = ctx.sessions.client(session_id) {
                    client.disconnect();
                }
                return true;
            }
            ctx.tell(session_id, OutputKind::System, "Passwords didn't match. Try again.");
            if let Some(client) = ctx.sessions.client_mut(session_id) {
                client.state = ClientState::Confirmation {
                    username,
                    is_new_account: true,
                    attempts: remaining,
                    pending_password: None,
                };
            }
            ctx.tell(session_id, OutputKind::Prompt, "Choose a password:");
            false
        }
    }
}

fn handle_login_password(ctx: &mut MachineContext, session_id: SessionId, username: String, attempts: u32, entered: &str) -> bool {
    let Some(record) = ctx.load_user(UserId::new(&username).as_str()) else {
        enter_login(ctx, session_id, 0);
        return false;
    };
    if record.password.verify(entered) {
        authenticate_existing(ctx, session_id, record);
        return false;
    }

    let remaining = attempts.saturating_sub(1);
    if remaining == 0 {
        ctx.tell(session_id, OutputKind::System, "Too many failed attempts. Goodbye.");
        if let Some(client) = ctx.sessions.client(session_id) {
            client.disconnect();
        }
        return true;
    }
    ctx.tell(session_id, OutputKind::System, "Incorrect password.");
    if let Some(client) = ctx.sessions.client_mut(session_id) {
        client.state = ClientState::Confirmation {
            username,
            is_new_account: false,
            attempts: remaining,
            pending_password: None,
        };
    }
    ctx.tell(session_id, OutputKind::Prompt, "Password:");
    false
}

/// §4.3's session-transfer protocol: if the user is already logged in on
/// another session, that session is parked in TRANSFER_REQUEST awaiting
/// y/n rather than letting two sessions own the same character.
fn authenticate_existing(ctx: &mut MachineContext, session_id: SessionId, record: UserRecord) {
    let user_id = record.user_id.clone();
    if let Some(existing) = ctx.sessions.session_for_user(&user_id) {
        if existing != session_id {
            if !ctx.sessions.begin_transfer(user_id.clone(), session_id) {
                ctx.tell(session_id, OutputKind::System, "A transfer for that account is already pending.");
                enter_login(ctx, session_id, 0);
                return;
            }
            if let Some(client) = ctx.sessions.client_mut(existing) {
                client.state = ClientState::TransferRequest {
                    user_id: user_id.clone(),
                    incoming_session: session_id,
                };
                client.is_input_blocked = true;
            }
            ctx.tell(
                existing,
                OutputKind::System,
                format!("Another session is trying to log in as {user_id}. Allow? (y/n)"),
            );
            if let Some(client) = ctx.sessions.client_mut(session_id) {
                client.is_input_blocked = true;
            }
            ctx.tell(session_id, OutputKind::System, "Waiting for the existing session to respond...");
            return;
        }
    }
    enter_game(ctx, session_id, user_id, false);
}

fn create_user(ctx: &mut MachineContext, username: &str, password: &str) -> UserId {
    let user_id = UserId::new(username);
    let salt = generate_salt();
    let stats = Stats::new();
    let class_id = ctx
        .registry
        .world
        .resource::<GameData>()
        .classes
        .keys()
        .next()
        .cloned()
        .unwrap_or_else(|| ClassId::from("warrior"));
    let resource_kind = ctx
        .registry
        .world
        .resource::<GameData>()
        .classes
        .get(&class_id)
        .map(|class| class.resource_kind)
        .unwrap_or(ResourceKind::None);
    let max_health = 50 + 5 * stats.constitution;
    let record = UserRecord::new(
        user_id.clone(),
        PasswordHash::new(password, salt),
        RoomId::from(STARTING_ROOM_ID),
        class_id,
        RaceId::from("human"),
        max_health,
        thornkeep_common::components::ManaPoints::new(20 + 3 * stats.intelligence),
        thornkeep_common::components::ResourcePoints::new(resource_kind, 1),
        stats,
    );
    ctx.save_user(&record);
    user_id
}

fn enter_game(ctx: &mut MachineContext, session_id: SessionId, user_id: UserId, is_new_account: bool) {
    let record = match ctx.load_user(user_id.as_str()) {
        Some(record) => record,
        None => {
            ctx.tell(session_id, OutputKind::System, "Account data could not be loaded.");
            enter_login(ctx, session_id, 0);
            return;
        }
    };

    let is_admin = record.is_admin();
    let mut pending_messages = record.pending_admin_messages.clone();
    let entity = match ctx.registry.spawn_user(user_id.clone(), user_bundle(record)) {
        Ok(entity) => entity,
        Err(_) => {
            // Already in the world from an in-flight transfer race; reuse it.
            ctx.registry
                .world
                .resource::<crate::world::registry::WorldIndex>()
                .user_entity(&user_id)
                .expect("race only drops the spawn, never the index entry")
        }
    };
    let room_id = ctx
        .registry
        .world
        .get::<Location>(entity)
        .map(|location| location.current_room_id.clone())
        .unwrap_or_else(|| RoomId::from(STARTING_ROOM_ID));
    let _ = ctx.registry.move_user(&user_id, room_id);

    ctx.sessions.claim_username(user_id.clone(), session_id);
    if let Some(client) = ctx.sessions.client_mut(session_id) {
        client.state = ClientState::Game {
            user_id: user_id.clone(),
            move_blocked_until: None,
        };
        client.set_mask(false);
    }

    if is_new_account {
        ctx.tell(session_id, OutputKind::System, format!("Welcome, {user_id}! Your account has been created."));
    } else {
        ctx.tell(session_id, OutputKind::System, format!("Welcome back, {user_id}."));
    }
    for message in pending_messages.drain() {
        ctx.tell(session_id, OutputKind::System, format!("[admin] {message}"));
    }

    let mut dispatch_ctx = CommandContext {
        registry: &mut *ctx.registry,
        user_id: user_id.clone(),
        entity,
        is_admin,
    };
    let _ = ctx.dispatcher.dispatch(&mut dispatch_ctx, "look");
    drain_outbox(ctx);
}

fn finalize_transfer(ctx: &mut MachineContext, user_id: &UserId, incoming: SessionId, allowed: bool) {
    let Some(existing) = ctx.sessions.session_for_user(user_id) else {
        return;
    };
    if allowed {
        if let Some(client) = ctx.sessions.client(existing) {
            client.send(OutputKind::System, "Another session has taken over your character.");
            client.disconnect();
        }
        ctx.sessions.disconnect(existing);
        ctx.sessions.claim_username(user_id.clone(), incoming);
        if let Some(client) = ctx.sessions.client_mut(incoming) {
            client.state = ClientState::Game {
                user_id: user_id.clone(),
                move_blocked_until: None,
            };
            client.is_input_blocked = false;
            client.set_mask(false);
        }
        ctx.tell(incoming, OutputKind::System, "You have taken over the existing session.");
    } else {
        if let Some(client) = ctx.sessions.client_mut(existing) {
            client.state = ClientState::Game {
                user_id: user_id.clone(),
                move_blocked_until: None,
            };
            client.is_input_blocked = false;
        }
        ctx.tell(incoming, OutputKind::System, "Login request was refused.");
        enter_login(ctx, incoming, 0);
    }
}

fn handle_transfer_request(ctx: &mut MachineContext, session_id: SessionId, line: &str) -> bool {
    let Some(ClientState::TransferRequest { user_id, incoming_session }) =
        ctx.sessions.client(session_id).map(|c| c.state.clone())
    else {
        return false;
    };
    ctx.sessions.take_transfer(&user_id);
    let allowed = matches!(line.trim().to_lowercase().as_str(), "y" | "yes");
    finalize_transfer(ctx, &user_id, incoming_session, allowed);
    false
}

/// Expired transfer requests (§4.3 "at most T seconds") are resolved as an
/// implicit "y", called once per tick from the world driver.
pub fn sweep_expired_transfers(ctx: &mut MachineContext, timeout: std::time::Duration) {
    for user_id in ctx.sessions.expired_transfers(timeout) {
        if let Some(incoming) = ctx.sessions.take_transfer(&user_id) {
            finalize_transfer(ctx, &user_id, incoming, true);
        }
    }
}

fn handle_game(ctx: &mut MachineContext, session_id: SessionId, line: &str) -> bool {
    let Some(ClientState::Game { user_id, move_blocked_until }) =
        ctx.sessions.client(session_id).map(|c| c.state.clone())
    else {
        return false;
    };

    if let Some(blocked_until) = move_blocked_until {
        if std::time::Instant::now() < blocked_until && is_movement_line(line) {
            ctx.tell(session_id, OutputKind::System, "You are still moving.");
            return false;
        }
    }

    let Some(entity) = ctx
        .registry
        .world
        .resource::<crate::world::registry::WorldIndex>()
        .user_entity(&user_id)
    else {
        return false;
    };
    let is_admin = ctx
        .registry
        .world
        .get::<AuthFlags>(entity)
        .map(|flags| flags.contains(AuthFlags::ADMIN))
        .unwrap_or(false);

    if is_admin {
        if let Some(outcome) = handle_admin_session_verb(ctx, session_id, &user_id, line) {
            return outcome;
        }
    }

    if let Some(mut history) = ctx.registry.world.get_mut::<thornkeep_common::components::CommandHistory>(entity) {
        history.push(line.to_string());
    }

    let mut dispatch_ctx = CommandContext {
        registry: &mut *ctx.registry,
        user_id: user_id.clone(),
        entity,
        is_admin,
    };
    let outcome = ctx.dispatcher.dispatch(&mut dispatch_ctx, line);

    let quit = match outcome {
        None => false,
        Some(DispatchOutcome::Unknown) => {
            ctx.tell(session_id, OutputKind::System, "Unknown command.");
            false
        }
        Some(DispatchOutcome::Ambiguous(candidates)) => {
            ctx.tell(session_id, OutputKind::System, format!("Ambiguous command: {}", candidates.join(", ")));
            false
        }
        Some(DispatchOutcome::Ran(result)) => apply_command_outcome(ctx, session_id, &user_id, result),
    };

    drain_outbox(ctx);
    quit
}

fn is_movement_line(line: &str) -> bool {
    matches!(
        line.trim().split_whitespace().next().unwrap_or("").to_lowercase().as_str(),
        "north" | "south" | "east" | "west" | "up" | "down" | "n" | "s" | "e" | "w" | "u" | "d"
    )
}

fn apply_command_outcome(ctx: &mut MachineContext, session_id: SessionId, user_id: &UserId, outcome: CommandOutcome) -> bool {
    if let Some(delay_ms) = outcome.movement_delay_ms {
        let until = std::time::Instant::now() + std::time::Duration::from_millis(delay_ms);
        if let Some(client) = ctx.sessions.client_mut(session_id) {
            if let ClientState::Game { move_blocked_until, .. } = &mut client.state {
                *move_blocked_until = Some(until);
            }
        }
    }

    match outcome.transition {
        Some(StateTransition::Quit) => {
            logout_user(ctx, user_id);
            if let Some(client) = ctx.sessions.client(session_id) {
                client.disconnect();
            }
            true
        }
        Some(StateTransition::EnterEditor) => {
            if let Some(client) = ctx.sessions.client_mut(session_id) {
                client.state = ClientState::Editor { user_id: user_id.clone() };
            }
            false
        }
        Some(StateTransition::EnterSnake) => {
            if let Some(client) = ctx.sessions.client_mut(session_id) {
                client.state = ClientState::SnakeGame {
                    user_id: user_id.clone(),
                    score: 0,
                };
            }
            false
        }
        Some(StateTransition::ExitSubstate) | None => false,
    }
}

/// `monitor`/`takeover`/`release` need live [`SessionManager`] access a
/// [`CommandContext`] doesn't carry, so they're intercepted here instead of
/// registered on the [`CommandDispatcher`] (§4.3 admin monitoring).
fn handle_admin_session_verb(ctx: &mut MachineContext, session_id: SessionId, _user_id: &UserId, line: &str) -> Option<bool> {
    let (verb, args) = line.trim().split_once(char::is_whitespace).unwrap_or((line.trim(), ""));
    match verb.to_lowercase().as_str() {
        "monitor" => {
            let target = UserId::new(args.trim());
            match ctx.sessions.session_for_user(&target) {
                Some(target_session) => {
                    ctx.sessions.attach_monitor(target_session, session_id);
                    ctx.tell(session_id, OutputKind::System, format!("Now monitoring {target}."));
                }
                None => ctx.tell(session_id, OutputKind::System, format!("{target} is not online.")),
            }
            Some(false)
        }
        "takeover" => {
            let target = UserId::new(args.trim());
            match ctx.sessions.session_for_user(&target) {
                Some(target_session) => {
                    if let Some(client) = ctx.sessions.client_mut(target_session) {
                        client.is_input_blocked = true;
                        client.taken_over_by = Some(session_id);
                    }
                    ctx.tell(session_id, OutputKind::System, format!("Now controlling {target}."));
                }
                None => ctx.tell(session_id, OutputKind::System, format!("{target} is not online.")),
            }
            Some(false)
        }
        "release" => {
            for (id, client) in ctx.sessions.clients_mut() {
                if client.taken_over_by == Some(session_id) {
                    client.taken_over_by = None;
                    client.is_input_blocked = false;
                    let _ = id;
                }
            }
            ctx.tell(session_id, OutputKind::System, "Released control.");
            Some(false)
        }
        _ => None,
    }
}

fn logout_user(ctx: &mut MachineContext, user_id: &UserId) {
    if let Some(entity) = ctx
        .registry
        .world
        .resource::<crate::world::registry::WorldIndex>()
        .user_entity(user_id)
    {
        if let Some(record) = snapshot_user(&ctx.registry.world, entity) {
            ctx.save_user(&record);
        }
    }
    ctx.registry.remove_user(user_id);
}

pub fn handle_disconnect(ctx: &mut MachineContext, session_id: SessionId) {
    if let Some(user_id) = ctx.sessions.client(session_id).and_then(|c| c.state.user_id().cloned()) {
        if matches!(ctx.sessions.client(session_id).map(|c| &c.state), Some(ClientState::Game { .. })) {
            logout_user(ctx, &user_id);
        }
    }
    ctx.sessions.disconnect(session_id);
}

fn handle_editor(ctx: &mut MachineContext, session_id: SessionId, line: &str) -> bool {
    let Some(ClientState::Editor { user_id }) = ctx.sessions.client(session_id).map(|c| c.state.clone()) else {
        return false;
    };
    if matches!(line.trim().to_lowercase().as_str(), "quit" | "exit") {
        if let Some(client) = ctx.sessions.client_mut(session_id) {
            client.state = ClientState::Game {
                user_id,
                move_blocked_until: None,
            };
        }
        ctx.tell(session_id, OutputKind::System, "Leaving the editor.");
    } else {
        ctx.tell(session_id, OutputKind::System, "(editor) type 'quit' to leave.");
    }
    false
}

fn handle_snake_game(ctx: &mut MachineContext, session_id: SessionId, line: &str) -> bool {
    let Some(ClientState::SnakeGame { user_id, score }) = ctx.sessions.client(session_id).map(|c| c.state.clone()) else {
        return false;
    };
    if matches!(line.trim().to_lowercase().as_str(), "quit" | "exit") {
        ctx.tell(session_id, OutputKind::System, format!("Game over. Final score: {score}."));
        if let Some(client) = ctx.sessions.client_mut(session_id) {
            client.state = ClientState::Game {
                user_id,
                move_blocked_until: None,
            };
        }
    } else if let Some(client) = ctx.sessions.client_mut(session_id) {
        if let ClientState::SnakeGame { score, .. } = &mut client.state {
            *score += 1;
        }
        client.send_text(format!("score: {score}"));
    }
    false
}

/// Delivers every queued [`OutboundEvent`] to its recipient session(s) and
/// clears the [`Outbox`] (§5 "no command handler observes a partial tick").
pub fn drain_outbox(ctx: &mut MachineContext) {
    use crate::world::outbox::{Outbox, OutboundEvent};

    let events = ctx.registry.world.resource_mut::<Outbox>().drain();
    for event in events {
        match event {
            OutboundEvent::ToUser(user_id, text) => {
                if let Some(session_id) = ctx.sessions.session_for_user(&user_id) {
                    ctx.tell(session_id, OutputKind::Text, text);
                }
            }
            OutboundEvent::ToRoom(room_id, text) => {
                deliver_to_room(ctx, &room_id, None, &text);
            }
            OutboundEvent::ToRoomExcept(room_id, except, text) => {
                deliver_to_room(ctx, &room_id, Some(&except), &text);
            }
        }
    }
}

fn deliver_to_room(ctx: &mut MachineContext, room_id: &RoomId, except: Option<&UserId>, text: &str) {
    let Some(room_entity) = ctx
        .registry
        .world
        .resource::<crate::world::registry::WorldIndex>()
        .room_entity(room_id)
    else {
        return;
    };
    let Some(room_state) = ctx
        .registry
        .world
        .get::<thornkeep_common::components::RoomState>(room_entity)
    else {
        return;
    };
    let recipients: Vec<UserId> = room_state
        .players
        .iter()
        .filter(|id| except != Some(*id))
        .cloned()
        .collect();
    for user_id in recipients {
        if let Some(session_id) = ctx.sessions.session_for_user(&user_id) {
            ctx.tell(session_id, OutputKind::Text, text.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use thornkeep_common::components::Stats;
    use thornkeep_common::password::{generate_salt, PasswordHash};
    use thornkeep_common::UserRecord;
    use thornkeep_common::components::{
        ActiveEffects, AggressionTable, HealthPoints, ManaPoints, NpcInstance, Progression,
        ResourcePoints, RoomState,
    };
    use thornkeep_data::{ClassId, NpcInstanceId, NpcTemplate, NpcTemplateId, RaceId, ResourceKind, RoomId};

    use crate::command::CommandDispatcher;
    use crate::config::Cli;
    use crate::content;
    use crate::control::ServerMessage;
    use crate::session::SessionManager;
    use crate::storage::PersistenceStore;
    use crate::world::registry::WorldRegistry;
    use crate::world::{GameData, TickEngine, WorldIndex};

    use super::*;

    struct Harness {
        registry: WorldRegistry,
        sessions: SessionManager,
        store: PersistenceStore,
        rt: tokio::runtime::Runtime,
        dispatcher: CommandDispatcher,
        _data_dir: tempfile::TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let data_dir = tempfile::tempdir().unwrap();
            let cli = Cli::parse_from(["thornkeepd", "--data-dir", data_dir.path().to_str().unwrap()]);
            let rt = tokio::runtime::Runtime::new().unwrap();
            let store = rt.block_on(PersistenceStore::from_cli(&cli)).unwrap();
            let mut registry = WorldRegistry::new();
            let game_data = content::load(&cli, &mut registry).unwrap();
            registry.world.insert_resource(game_data);
            Self {
                registry,
                sessions: SessionManager::default(),
                store,
                rt,
                dispatcher: CommandDispatcher::new(),
                _data_dir: data_dir,
            }
        }

        fn ctx(&mut self) -> MachineContext<'_> {
            MachineContext {
                registry: &mut self.registry,
                sessions: &mut self.sessions,
                store: &self.store,
                rt: &self.rt,
                dispatcher: &self.dispatcher,
            }
        }

        fn connect(&mut self) -> (SessionId, tokio::sync::mpsc::UnboundedReceiver<ServerMessage>) {
            let (output, rx) = tokio::sync::mpsc::unbounded_channel();
            let session_id = self.sessions.connect("127.0.0.1:0".to_string(), output);
            let mut ctx = self.ctx();
            handle_connect(&mut ctx, session_id);
            (session_id, rx)
        }

        fn line(&mut self, session_id: SessionId, text: &str) -> bool {
            let mut ctx = self.ctx();
            handle_line(&mut ctx, session_id, text.to_string())
        }
    }

    fn drain_text(rx: &mut tokio::sync::mpsc::UnboundedReceiver<ServerMessage>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let ServerMessage::Line(_, text) = message {
                out.push(text);
            }
        }
        out
    }

    #[test]
    fn new_account_signup_reaches_game_state() {
        let mut harness = Harness::new();
        let (session_id, mut rx) = harness.connect();

        harness.line(session_id, "newplayer");
        let prompts = drain_text(&mut rx);
        assert!(prompts.iter().any(|line| line.contains("Create it?")));

        harness.line(session_id, "y");
        harness.line(session_id, "hunter2");
        harness.line(session_id, "hunter2");

        let state = harness.sessions.client(session_id).map(|c| c.state.clone());
        assert!(matches!(state, Some(ClientState::Game { .. })));
    }

    #[test]
    fn existing_account_rejects_wrong_password_until_disconnect() {
        let mut harness = Harness::new();

        let stats = Stats::new();
        let record = UserRecord::new(
            thornkeep_data::UserId::new("oldtimer"),
            PasswordHash::new("correcthorse", generate_salt()),
            RoomId::from(STARTING_ROOM_ID),
            ClassId::from("warrior"),
            RaceId::from("human"),
            75,
            ManaPoints::new(30),
            ResourcePoints::new(ResourceKind::Rage, 0),
            stats,
        );
        harness.ctx().save_user(&record);

        let (session_id, mut rx) = harness.connect();
        harness.line(session_id, "oldtimer");
        drain_text(&mut rx);

        assert!(!harness.line(session_id, "wrongpass"));
        assert!(!harness.line(session_id, "stillwrong"));
        let disconnected = harness.line(session_id, "nope");
        assert!(disconnected, "third wrong password should drop the session");
    }

    #[test]
    fn quit_from_game_state_disconnects() {
        let mut harness = Harness::new();
        let (session_id, _rx) = harness.connect();

        harness.line(session_id, "questor");
        harness.line(session_id, "y");
        harness.line(session_id, "s3cret");
        harness.line(session_id, "s3cret");

        assert!(harness.line(session_id, "quit"));
    }

    fn signup(harness: &mut Harness, session_id: SessionId, username: &str, password: &str) {
        harness.line(session_id, username);
        harness.line(session_id, "y");
        harness.line(session_id, password);
        harness.line(session_id, password);
    }

    /// §4.3 session transfer: a second login for an already-connected
    /// account parks the existing session awaiting y/n, then hands the
    /// character over to the new connection on approval.
    #[test]
    fn second_login_transfers_character_to_new_session() {
        let mut harness = Harness::new();

        let (first_session, mut first_rx) = harness.connect();
        signup(&mut harness, first_session, "wanderer", "hunter2x");
        drain_text(&mut first_rx);

        let (second_session, mut second_rx) = harness.connect();
        harness.line(second_session, "wanderer");
        harness.line(second_session, "hunter2x");

        let first_prompts = drain_text(&mut first_rx);
        assert!(first_prompts.iter().any(|line| line.contains("Allow?")));

        harness.line(first_session, "y");

        let second_prompts = drain_text(&mut second_rx);
        assert!(second_prompts.iter().any(|line| line.contains("taken over the existing session")));
        let second_state = harness.sessions.client(second_session).map(|c| c.state.clone());
        assert!(matches!(second_state, Some(ClientState::Game { .. })));

        let user_id = thornkeep_data::UserId::new("wanderer");
        assert_eq!(harness.sessions.session_for_user(&user_id), Some(second_session));
    }

    /// §4.5/§4.6: an NPC reduced to 0 HP despawns, is swept out of its
    /// room's `spawned_npcs` and its inverse index entry, and its
    /// attacker gains experience (§8.3).
    #[test]
    fn combat_to_death_despawns_npc_and_awards_experience() {
        let mut harness = Harness::new();

        let room_id = RoomId::from(STARTING_ROOM_ID);
        let template_id = NpcTemplateId::from("goblin");
        let template = NpcTemplate {
            id: template_id.clone(),
            name: "Goblin".to_string(),
            description: "A snarling goblin.".to_string(),
            home_room_id: room_id.clone(),
            max_health: 1,
            damage_min: 0,
            damage_max: 0,
            defense: 0,
            is_hostile: false,
            is_passive_retaliator: false,
            xp_value: 25,
            attack_texts: Vec::new(),
            death_messages: vec!["The goblin falls dead.".to_string()],
            is_merchant: false,
            stock: Vec::new(),
            respawn_ticks: 5,
        };
        harness
            .registry
            .world
            .resource_mut::<GameData>()
            .npc_templates
            .insert(template_id.clone(), template);

        let instance_id = NpcInstanceId::from("goblin-test-0");
        let room_entity = harness.registry.world.resource::<WorldIndex>().room_entity(&room_id).unwrap();
        let instance = NpcInstance::new(instance_id.clone(), template_id.clone(), room_id.clone());
        harness
            .registry
            .spawn_npc_instance(
                instance_id.clone(),
                (instance, HealthPoints::new(1), AggressionTable::default(), ActiveEffects::default()),
            )
            .unwrap();
        harness
            .registry
            .world
            .get_mut::<RoomState>(room_entity)
            .unwrap()
            .spawned_npcs
            .push(instance_id.clone());

        let (session_id, mut rx) = harness.connect();
        signup(&mut harness, session_id, "fighter", "sw0rdfish");
        drain_text(&mut rx);

        harness.line(session_id, "attack goblin");
        drain_text(&mut rx);

        let mut tick_engine = TickEngine::new();
        tick_engine.advance(&mut harness.registry.world);

        assert!(harness.registry.world.resource::<WorldIndex>().npc_instance_entity(&instance_id).is_none());
        let room_state = harness.registry.world.get::<RoomState>(room_entity).unwrap();
        assert!(!room_state.spawned_npcs.contains(&instance_id));

        let user_id = thornkeep_data::UserId::new("fighter");
        let entity = harness.registry.world.resource::<WorldIndex>().user_entity(&user_id).unwrap();
        let progression = harness.registry.world.get::<Progression>(entity).unwrap();
        assert!(progression.experience >= 25);
    }

    /// §4.5 step 7 / disconnect-time save: a player's live health diverges
    /// from their record, disconnecting snapshots it, and logging back in
    /// reads the damaged value back rather than the original default.
    #[test]
    fn disconnect_autosaves_damage_and_reload_restores_it() {
        let mut harness = Harness::new();
        let (session_id, mut rx) = harness.connect();
        signup(&mut harness, session_id, "healer", "p0tion99");
        drain_text(&mut rx);

        let user_id = thornkeep_data::UserId::new("healer");
        let entity = harness.registry.world.resource::<WorldIndex>().user_entity(&user_id).unwrap();
        harness.registry.world.get_mut::<HealthPoints>(entity).unwrap().apply_delta(-20);
        let damaged_health = harness.registry.world.get::<HealthPoints>(entity).unwrap().current;

        let mut ctx = harness.ctx();
        handle_disconnect(&mut ctx, session_id);
        assert!(harness.registry.world.resource::<WorldIndex>().user_entity(&user_id).is_none());

        let record = harness.ctx().load_user("healer").expect("record should have been saved on disconnect");
        assert_eq!(record.health, damaged_health);
    }
}
