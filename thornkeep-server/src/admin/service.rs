//! Resolves one [`AdminRequest`] against live world/session state. Runs on
//! the world thread inside the same control loop that drains
//! [`ControlMessage::Line`], so it sees a consistent snapshot between two
//! ticks the same way a command handler does.

use serde_json::{json, Value};
use thornkeep_common::components::{AuthFlags, HealthPoints, Location, Progression};
use thornkeep_data::UserId;

use crate::config::{GametimerConfig, MudConfig};
use crate::control::{AdminRequest, AdminResponse};
use crate::session::machine::MachineContext;
use crate::world::registry::WorldIndex;
use crate::world::{GameTick, TickEngine};

pub fn handle(ctx: &mut MachineContext, request: AdminRequest) -> AdminResponse {
    match request {
        AdminRequest::Stats => stats(ctx),
        AdminRequest::Players => players(ctx),
        AdminRequest::PlayerDetails { user_id } => player_details(ctx, &user_id),
        AdminRequest::UpdatePlayer { user_id, patch } => update_player(ctx, &user_id, patch),
        AdminRequest::DeletePlayer { user_id } => delete_player(ctx, &user_id),
        AdminRequest::Kick { target } => kick(ctx, &target),
        AdminRequest::Monitor { admin, target } => monitor(ctx, &admin, &target),
        AdminRequest::Takeover { admin, target } => takeover(ctx, &admin, &target),
        AdminRequest::Release { admin } => release(ctx, &admin),
        AdminRequest::ForceSave => force_save(ctx),
        AdminRequest::Shutdown { minutes } => shutdown(ctx, minutes),
        AdminRequest::GetMudConfig => get_mud_config(ctx),
        AdminRequest::SetMudConfig(config) => set_mud_config(ctx, config),
        AdminRequest::GetGametimerConfig => get_gametimer_config(ctx),
        AdminRequest::SetGametimerConfig(config) => set_gametimer_config(ctx, config),
        AdminRequest::PipelineMetrics => pipeline_metrics(ctx),
    }
}

fn stats(ctx: &mut MachineContext) -> AdminResponse {
    let tick = TickEngine::current_tick(&ctx.registry.world);
    let index = ctx.registry.world.resource::<WorldIndex>();
    AdminResponse::Json(json!({
        "tick": tick,
        "players_online": index.user_ids().count(),
        "rooms": index.room_ids().count(),
        "npc_instances": index.npc_instance_ids().count(),
    }))
}

fn players(ctx: &mut MachineContext) -> AdminResponse {
    let index = ctx.registry.world.resource::<WorldIndex>();
    let online: Vec<String> = index.user_ids().map(|id| id.as_str().to_string()).collect();
    AdminResponse::Json(json!({ "online": online }))
}

fn player_details(ctx: &mut MachineContext, user_id: &UserId) -> AdminResponse {
    let Some(entity) = ctx.registry.world.resource::<WorldIndex>().user_entity(user_id) else {
        return AdminResponse::Error(format!("{user_id} is not online"));
    };
    let world = &ctx.registry.world;
    let health = world.get::<HealthPoints>(entity);
    let location = world.get::<Location>(entity);
    let progression = world.get::<Progression>(entity);
    AdminResponse::Json(json!({
        "user_id": user_id.as_str(),
        "health": health.map(|h| h.current),
        "max_health": health.map(|h| h.max),
        "room": location.map(|l| l.current_room_id.to_string()),
        "level": progression.map(|p| p.level),
    }))
}

/// Applies a partial JSON patch to an online player's auth flags — the
/// only field the admin API is specced to mutate live (§6 `POST
/// /players/update/:u`); anything else requires editing the saved record
/// directly.
fn update_player(ctx: &mut MachineContext, user_id: &UserId, patch: Value) -> AdminResponse {
    let Some(entity) = ctx.registry.world.resource::<WorldIndex>().user_entity(user_id) else {
        return AdminResponse::Error(format!("{user_id} is not online"));
    };
    if let Some(is_admin) = patch.get("is_admin").and_then(Value::as_bool) {
        if let Some(mut flags) = ctx.registry.world.get_mut::<AuthFlags>(entity) {
            flags.set(AuthFlags::ADMIN, is_admin);
        }
    }
    if let Some(banned) = patch.get("is_banned").and_then(Value::as_bool) {
        if let Some(mut flags) = ctx.registry.world.get_mut::<AuthFlags>(entity) {
            flags.set(AuthFlags::BANNED, banned);
        }
    }
    AdminResponse::Ok
}

fn delete_player(ctx: &mut MachineContext, user_id: &UserId) -> AdminResponse {
    if let Some(session_id) = ctx.sessions.session_for_user(user_id) {
        if let Some(client) = ctx.sessions.client(session_id) {
            client.disconnect();
        }
    }
    ctx.registry.remove_user(user_id);
    let outcome = ctx.rt.block_on(ctx.store.delete_one(crate::storage::collections::USERS, user_id.as_str()));
    match outcome {
        Ok(()) => AdminResponse::Ok,
        Err(error) => AdminResponse::Error(error.to_string()),
    }
}

fn kick(ctx: &mut MachineContext, target: &UserId) -> AdminResponse {
    let Some(session_id) = ctx.sessions.session_for_user(target) else {
        return AdminResponse::Error(format!("{target} is not online"));
    };
    if let Some(client) = ctx.sessions.client(session_id) {
        client.send(thornkeep_common::messages::OutputKind::System, "You have been disconnected by an administrator.");
        client.disconnect();
    }
    AdminResponse::Ok
}

fn monitor(ctx: &mut MachineContext, admin: &UserId, target: &UserId) -> AdminResponse {
    let (Some(admin_session), Some(target_session)) =
        (ctx.sessions.session_for_user(admin), ctx.sessions.session_for_user(target))
    else {
        return AdminResponse::Error("both accounts must be online".to_string());
    };
    ctx.sessions.attach_monitor(target_session, admin_session);
    AdminResponse::Ok
}

fn takeover(ctx: &mut MachineContext, admin: &UserId, target: &UserId) -> AdminResponse {
    let (Some(admin_session), Some(target_session)) =
        (ctx.sessions.session_for_user(admin), ctx.sessions.session_for_user(target))
    else {
        return AdminResponse::Error("both accounts must be online".to_string());
    };
    if let Some(client) = ctx.sessions.client_mut(target_session) {
        client.is_input_blocked = true;
        client.taken_over_by = Some(admin_session);
    }
    AdminResponse::Ok
}

fn release(ctx: &mut MachineContext, admin: &UserId) -> AdminResponse {
    let Some(admin_session) = ctx.sessions.session_for_user(admin) else {
        return AdminResponse::Error(format!("{admin} is not online"));
    };
    for (_, client) in ctx.sessions.clients_mut() {
        if client.taken_over_by == Some(admin_session) {
            client.taken_over_by = None;
            client.is_input_blocked = false;
        }
    }
    AdminResponse::Ok
}

fn force_save(ctx: &mut MachineContext) -> AdminResponse {
    let user_ids: Vec<UserId> = ctx.registry.world.resource::<WorldIndex>().user_ids().cloned().collect();
    for user_id in user_ids {
        if let Some(entity) = ctx.registry.world.resource::<WorldIndex>().user_entity(&user_id) {
            if let Some(record) = crate::world::systems::autosave::snapshot_user(&ctx.registry.world, entity) {
                ctx.save_user(&record);
            }
        }
    }
    AdminResponse::Ok
}

fn shutdown(ctx: &mut MachineContext, minutes: Option<u32>) -> AdminResponse {
    ctx.registry
        .world
        .resource_mut::<crate::world::ShutdownRequested>()
        .request(minutes);
    AdminResponse::Ok
}

fn get_mud_config(ctx: &mut MachineContext) -> AdminResponse {
    let config = ctx.registry.world.resource::<MudConfig>().clone();
    AdminResponse::Json(serde_json::to_value(config).unwrap_or(Value::Null))
}

fn set_mud_config(ctx: &mut MachineContext, config: MudConfig) -> AdminResponse {
    *ctx.registry.world.resource_mut::<MudConfig>() = config;
    AdminResponse::Ok
}

fn get_gametimer_config(ctx: &mut MachineContext) -> AdminResponse {
    let config = *ctx.registry.world.resource::<GametimerConfig>();
    AdminResponse::Json(serde_json::to_value(config).unwrap_or(Value::Null))
}

fn set_gametimer_config(ctx: &mut MachineContext, config: GametimerConfig) -> AdminResponse {
    *ctx.registry.world.resource_mut::<GametimerConfig>() = config;
    AdminResponse::Ok
}

fn pipeline_metrics(ctx: &mut MachineContext) -> AdminResponse {
    let tick = GameTick(TickEngine::current_tick(&ctx.registry.world));
    AdminResponse::Json(json!({ "tick": tick.0 }))
}
