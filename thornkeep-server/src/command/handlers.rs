use thornkeep_common::components::{
    Combatant, CombatTarget, Equipment, HealthPoints, Inventory, Location, ResourcePoints,
    StateFlags, Stats,
};
use thornkeep_data::{Direction, ItemInstanceId, NpcTemplateId, RoomId, UserId};

use crate::error::GameError;
use crate::world::outbox::{Outbox, OutboundEvent};
use crate::world::GameData;

use super::{movement_delay_ms, CommandContext, CommandDispatcher, CommandOutcome, StateTransition};

/// Registers every verb and alias in the surface from §6. Grouped in the
/// same order the section lists them so the table is easy to diff against.
pub fn register(dispatcher: &mut CommandDispatcher) {
    dispatcher.add("look", false, look);
    dispatcher.alias("l", "look");

    dispatcher.add("north", false, |ctx, _| go(ctx, Direction::North));
    dispatcher.add("south", false, |ctx, _| go(ctx, Direction::South));
    dispatcher.add("east", false, |ctx, _| go(ctx, Direction::East));
    dispatcher.add("west", false, |ctx, _| go(ctx, Direction::West));
    dispatcher.add("up", false, |ctx, _| go(ctx, Direction::Up));
    dispatcher.add("down", false, |ctx, _| go(ctx, Direction::Down));
    dispatcher.alias("n", "north");
    dispatcher.alias("s", "south");
    dispatcher.alias("e", "east");
    dispatcher.alias("w", "west");
    dispatcher.alias("u", "up");
    dispatcher.alias("d", "down");

    dispatcher.add("say", false, say);
    dispatcher.add("tell", false, tell);
    dispatcher.add("who", false, who);
    dispatcher.add("inventory", false, inventory);
    dispatcher.alias("i", "inventory");

    dispatcher.add("get", false, get);
    dispatcher.add("drop", false, drop_item);
    dispatcher.add("wear", false, wear);
    dispatcher.alias("wield", "wear");
    dispatcher.add("remove", false, unequip);

    dispatcher.add("attack", false, attack);
    dispatcher.add("flee", false, flee);
    dispatcher.add("rest", false, rest);
    dispatcher.add("meditate", false, meditate);
    dispatcher.add("stand", false, stand);

    dispatcher.add("cast", false, cast);
    dispatcher.add("use", false, use_item);

    dispatcher.add("help", false, help);
    dispatcher.add("bug", false, bug);
    dispatcher.add("quit", false, quit);

    dispatcher.add("shutdown", true, shutdown);
    dispatcher.add("kick", true, kick);
    dispatcher.add("spawn", true, spawn_npc);
    dispatcher.add("tp", true, teleport);
    dispatcher.add("setflag", true, setflag);
}

fn current_room_id(ctx: &CommandContext) -> Option<RoomId> {
    ctx.world().get::<Location>(ctx.entity).map(|l| l.current_room_id.clone())
}

fn require_conscious(ctx: &CommandContext) -> Result<(), GameError> {
    let unconscious = ctx
        .world()
        .get::<StateFlags>(ctx.entity)
        .map(|flags| flags.is_unconscious)
        .unwrap_or(false);
    if unconscious {
        return Err(GameError::State("You are unconscious.".to_string()));
    }
    Ok(())
}

fn look(ctx: &mut CommandContext, _args: &str) -> Result<CommandOutcome, GameError> {
    let room_id = current_room_id(ctx).ok_or_else(|| GameError::Internal("missing location".to_string()))?;
    let game_data = ctx.world().resource::<GameData>();
    let template = game_data
        .rooms
        .get(&room_id)
        .ok_or_else(|| GameError::NotFound(format!("room {room_id} has no template")))?;

    let mut lines = vec![template.name.clone(), template.description.clone()];
    if template.exits.is_empty() {
        lines.push("There are no obvious exits.".to_string());
    } else {
        let names: Vec<&str> = template.exits.iter().map(|exit| exit.direction.name()).collect();
        lines.push(format!("Exits: {}", names.join(", ")));
    }

    if let Some(room_state) = ctx
        .world()
        .resource::<crate::world::registry::WorldIndex>()
        .room_entity(&room_id)
        .and_then(|entity| ctx.world().get::<thornkeep_common::components::RoomState>(entity))
    {
        let others: Vec<&str> = room_state
            .players
            .iter()
            .filter(|id| **id != ctx.user_id)
            .map(|id| id.as_str())
            .collect();
        if !others.is_empty() {
            lines.push(format!("Also here: {}", others.join(", ")));
        }
    }

    ctx.tell_self(lines.join("\n"));
    Ok(CommandOutcome::default())
}

fn go(ctx: &mut CommandContext, direction: Direction) -> Result<CommandOutcome, GameError> {
    require_conscious(ctx)?;
    let blocked = ctx
        .world()
        .get::<StateFlags>(ctx.entity)
        .map(|flags| !flags.can_move())
        .unwrap_or(false);
    if blocked {
        return Err(GameError::State("You can't move right now.".to_string()));
    }

    let room_id = current_room_id(ctx).ok_or_else(|| GameError::Internal("missing location".to_string()))?;
    let target_room = ctx
        .world()
        .resource::<GameData>()
        .rooms
        .get(&room_id)
        .and_then(|template| template.exit(direction))
        .filter(|exit| !exit.locked)
        .map(|exit| exit.target_room_id.clone());

    let Some(target_room) = target_room else {
        return Err(GameError::User(format!("You can't go {}.", direction.name())));
    };

    let agility = ctx.world().get::<Stats>(ctx.entity).map(|s| s.agility).unwrap_or(10);
    let delay_ms = movement_delay_ms(agility);

    ctx.tell_room_except_self(&format!("{} leaves {}.", ctx.user_id, direction.name()));
    ctx.registry
        .move_user(&ctx.user_id, target_room)
        .map_err(|error| GameError::Internal(error.to_string()))?;
    ctx.tell_room_except_self(&format!("{} arrives.", ctx.user_id));
    look(ctx, "")?;

    Ok(CommandOutcome {
        movement_delay_ms: Some(delay_ms),
        ..Default::default()
    })
}

fn say(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    if args.is_empty() {
        return Err(GameError::User("Say what?".to_string()));
    }
    ctx.tell_self(format!("You say, \"{args}\""));
    ctx.tell_room_except_self(&format!("{} says, \"{args}\"", ctx.user_id));
    Ok(CommandOutcome::default())
}

fn tell(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    let (target, message) = args
        .split_once(char::is_whitespace)
        .ok_or_else(|| GameError::User("Tell whom what?".to_string()))?;
    let message = message.trim();
    if message.is_empty() {
        return Err(GameError::User("Tell whom what?".to_string()));
    }
    let target_id = UserId::new(target);
    if ctx
        .world()
        .resource::<crate::world::registry::WorldIndex>()
        .user_entity(&target_id)
        .is_none()
    {
        return Err(GameError::NotFound(format!("{target} is not online.")));
    }
    ctx.tell_self(format!("You tell {target}, \"{message}\""));
    let sender_id = ctx.user_id.clone();
    ctx.world_mut()
        .resource_mut::<Outbox>()
        .push(OutboundEvent::ToUser(target_id, format!("{} tells you, \"{message}\"", sender_id)));
    Ok(CommandOutcome::default())
}

fn who(ctx: &mut CommandContext, _args: &str) -> Result<CommandOutcome, GameError> {
    let names: Vec<String> = ctx
        .world()
        .resource::<crate::world::registry::WorldIndex>()
        .user_ids()
        .map(|id| id.to_string())
        .collect();
    ctx.tell_self(format!("Online ({}): {}", names.len(), names.join(", ")));
    Ok(CommandOutcome::default())
}

fn inventory(ctx: &mut CommandContext, _args: &str) -> Result<CommandOutcome, GameError> {
    let Some(inventory) = ctx.world().get::<Inventory>(ctx.entity) else {
        return Err(GameError::Internal("missing inventory".to_string()));
    };
    let items_empty = inventory.items().is_empty();
    let items: Vec<String> = inventory.items().iter().map(|id| id.to_string()).collect();
    let purse_display = inventory.purse.display();
    if items_empty {
        ctx.tell_self("You are carrying nothing.".to_string());
    } else {
        ctx.tell_self(format!("You are carrying: {}", items.join(", ")));
    }
    ctx.tell_self(format!("Purse: {}", purse_display));
    Ok(CommandOutcome::default())
}

fn get(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    if args.is_empty() {
        return Err(GameError::User("Get what?".to_string()));
    }
    let room_id = current_room_id(ctx).ok_or_else(|| GameError::Internal("missing location".to_string()))?;
    let room_entity = ctx
        .world()
        .resource::<crate::world::registry::WorldIndex>()
        .room_entity(&room_id)
        .ok_or_else(|| GameError::Internal("room not spawned".to_string()))?;

    let instance_id = {
        let room_state = ctx
            .world()
            .get::<thornkeep_common::components::RoomState>(room_entity)
            .ok_or_else(|| GameError::Internal("missing room state".to_string()))?;
        find_item_by_name(ctx, &room_state.floor_items, args)
            .ok_or_else(|| GameError::NotFound(format!("There is no {args} here.")))?
    };

    let entity = ctx.entity;
    ctx.world_mut()
        .get_mut::<thornkeep_common::components::RoomState>(room_entity)
        .unwrap()
        .floor_items
        .retain(|id| *id != instance_id);
    ctx.world_mut()
        .get_mut::<Inventory>(entity)
        .ok_or_else(|| GameError::Internal("missing inventory".to_string()))?
        .add(instance_id.clone());

    ctx.tell_self(format!("You pick up {instance_id}."));
    ctx.tell_room_except_self(&format!("{} picks something up.", ctx.user_id));
    Ok(CommandOutcome::default())
}

fn drop_item(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    if args.is_empty() {
        return Err(GameError::User("Drop what?".to_string()));
    }
    let room_id = current_room_id(ctx).ok_or_else(|| GameError::Internal("missing location".to_string()))?;
    let room_entity = ctx
        .world()
        .resource::<crate::world::registry::WorldIndex>()
        .room_entity(&room_id)
        .ok_or_else(|| GameError::Internal("room not spawned".to_string()))?;

    let instance_id = {
        let inventory = ctx
            .world()
            .get::<Inventory>(ctx.entity)
            .ok_or_else(|| GameError::Internal("missing inventory".to_string()))?;
        find_item_by_name(ctx, inventory.items(), args)
            .ok_or_else(|| GameError::NotFound(format!("You aren't carrying a {args}.")))?
    };

    let entity = ctx.entity;
    ctx.world_mut()
        .get_mut::<Inventory>(entity)
        .unwrap()
        .remove(&instance_id);
    ctx.world_mut()
        .get_mut::<thornkeep_common::components::RoomState>(room_entity)
        .unwrap()
        .floor_items
        .push(instance_id.clone());

    ctx.tell_self(format!("You drop {instance_id}."));
    ctx.tell_room_except_self(&format!("{} drops something.", ctx.user_id));
    Ok(CommandOutcome::default())
}

fn find_item_by_name(ctx: &CommandContext, items: &[ItemInstanceId], needle: &str) -> Option<ItemInstanceId> {
    let world = ctx.world();
    let game_data = world.resource::<GameData>();
    let index = world.resource::<crate::world::registry::WorldIndex>();
    let needle = needle.to_lowercase();
    items
        .iter()
        .find(|instance_id| {
            index
                .item_instance_entity(instance_id)
                .and_then(|entity| world.get::<thornkeep_common::components::ItemInstance>(entity))
                .and_then(|item| game_data.item_templates.get(&item.template_id))
                .map(|template| template.name.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .cloned()
}

fn wear(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    if args.is_empty() {
        return Err(GameError::User("Wear what?".to_string()));
    }
    let instance_id = {
        let inventory = ctx
            .world()
            .get::<Inventory>(ctx.entity)
            .ok_or_else(|| GameError::Internal("missing inventory".to_string()))?;
        find_item_by_name(ctx, inventory.items(), args)
            .ok_or_else(|| GameError::NotFound(format!("You aren't carrying a {args}.")))?
    };

    let index = ctx.world().resource::<crate::world::registry::WorldIndex>();
    let item_entity = index
        .item_instance_entity(&instance_id)
        .ok_or_else(|| GameError::Internal("item instance missing".to_string()))?;
    let template_id = ctx
        .world()
        .get::<thornkeep_common::components::ItemInstance>(item_entity)
        .map(|item| item.template_id.clone())
        .ok_or_else(|| GameError::Internal("item instance missing".to_string()))?;
    let slot = ctx
        .world()
        .resource::<GameData>()
        .item_templates
        .get(&template_id)
        .and_then(|template| template.slot)
        .ok_or_else(|| GameError::User("That can't be worn.".to_string()))?;

    let entity = ctx.entity;
    let previous = ctx
        .world_mut()
        .get_mut::<Equipment>(entity)
        .ok_or_else(|| GameError::Internal("missing equipment".to_string()))?
        .equip(slot, instance_id.clone());
    ctx.world_mut().get_mut::<Inventory>(entity).unwrap().remove(&instance_id);
    if let Some(previous) = previous {
        ctx.world_mut().get_mut::<Inventory>(entity).unwrap().add(previous);
    }

    ctx.tell_self(format!("You wear {instance_id}."));
    Ok(CommandOutcome::default())
}

fn unequip(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    if args.is_empty() {
        return Err(GameError::User("Remove what?".to_string()));
    }
    let slot = {
        let world = ctx.world();
        let game_data = world.resource::<GameData>();
        let index = world.resource::<crate::world::registry::WorldIndex>();
        let equipment = world
            .get::<Equipment>(ctx.entity)
            .ok_or_else(|| GameError::Internal("missing equipment".to_string()))?;
        let needle = args.to_lowercase();
        equipment
            .iter()
            .find(|(_, instance_id)| {
                index
                    .item_instance_entity(instance_id)
                    .and_then(|entity| world.get::<thornkeep_common::components::ItemInstance>(entity))
                    .and_then(|item| game_data.item_templates.get(&item.template_id))
                    .map(|template| template.name.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .map(|(slot, _)| slot)
            .ok_or_else(|| GameError::User(format!("You aren't wearing a {args}.")))?
    };

    let entity = ctx.entity;
    let removed = ctx.world_mut().get_mut::<Equipment>(entity).unwrap().unequip(slot);
    let Some(removed) = removed else {
        return Err(GameError::Internal("equipment slot emptied concurrently".to_string()));
    };
    ctx.world_mut().get_mut::<Inventory>(entity).unwrap().add(removed.clone());
    ctx.tell_self(format!("You remove {removed}."));
    Ok(CommandOutcome::default())
}

fn attack(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    require_conscious(ctx)?;
    if args.is_empty() {
        return Err(GameError::User("Attack what?".to_string()));
    }
    let room_id = current_room_id(ctx).ok_or_else(|| GameError::Internal("missing location".to_string()))?;
    let room_entity = ctx
        .world()
        .resource::<crate::world::registry::WorldIndex>()
        .room_entity(&room_id)
        .ok_or_else(|| GameError::Internal("room not spawned".to_string()))?;
    let needle = args.to_lowercase();

    let target = {
        let game_data = ctx.world().resource::<GameData>();
        let index = ctx.world().resource::<crate::world::registry::WorldIndex>();
        let room_state = ctx
            .world()
            .get::<thornkeep_common::components::RoomState>(room_entity)
            .ok_or_else(|| GameError::Internal("missing room state".to_string()))?;
        room_state
            .spawned_npcs
            .iter()
            .find(|instance_id| {
                index
                    .npc_instance_entity(instance_id)
                    .and_then(|entity| ctx.world().get::<thornkeep_common::components::NpcInstance>(entity))
                    .and_then(|npc| game_data.npc_templates.get(&npc.template_id))
                    .map(|template| template.name.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .cloned()
    };

    let Some(instance_id) = target else {
        return Err(GameError::NotFound(format!("There is no {args} here.")));
    };
    let npc_entity = ctx
        .world()
        .resource::<crate::world::registry::WorldIndex>()
        .npc_instance_entity(&instance_id)
        .ok_or_else(|| GameError::Internal("npc instance missing".to_string()))?;

    let entity = ctx.entity;
    let user_id = ctx.user_id.clone();
    ctx.world_mut().entity_mut(entity).insert(Combatant {
        opponent: CombatTarget::Npc(instance_id.clone()),
    });
    ctx.world_mut().entity_mut(npc_entity).insert(Combatant {
        opponent: CombatTarget::User(user_id),
    });
    if let Some(mut flags) = ctx.world_mut().get_mut::<StateFlags>(entity) {
        flags.break_rest();
        flags.in_combat = true;
    }

    ctx.tell_self(format!("You attack {instance_id}!"));
    Ok(CommandOutcome::default())
}

fn flee(ctx: &mut CommandContext, _args: &str) -> Result<CommandOutcome, GameError> {
    let had_combatant = ctx.world().get::<Combatant>(ctx.entity).is_some();
    if !had_combatant {
        return Err(GameError::State("You aren't fighting anyone.".to_string()));
    }
    let entity = ctx.entity;
    ctx.world_mut().entity_mut(entity).remove::<Combatant>();
    if let Some(mut flags) = ctx.world_mut().get_mut::<StateFlags>(entity) {
        flags.in_combat = false;
    }
    ctx.tell_self("You flee from combat!".to_string());
    ctx.tell_room_except_self(&format!("{} flees!", ctx.user_id));
    Ok(CommandOutcome::default())
}

fn rest(ctx: &mut CommandContext, _args: &str) -> Result<CommandOutcome, GameError> {
    require_conscious(ctx)?;
    let in_combat = ctx
        .world()
        .get::<StateFlags>(ctx.entity)
        .map(|flags| flags.in_combat)
        .unwrap_or(false);
    if in_combat {
        return Err(GameError::State("You can't rest while fighting.".to_string()));
    }
    let entity = ctx.entity;
    if let Some(mut flags) = ctx.world_mut().get_mut::<StateFlags>(entity) {
        flags.is_resting = true;
        flags.is_meditating = false;
    }
    ctx.tell_self("You sit down to rest.".to_string());
    Ok(CommandOutcome::default())
}

fn meditate(ctx: &mut CommandContext, _args: &str) -> Result<CommandOutcome, GameError> {
    require_conscious(ctx)?;
    let in_combat = ctx
        .world()
        .get::<StateFlags>(ctx.entity)
        .map(|flags| flags.in_combat)
        .unwrap_or(false);
    if in_combat {
        return Err(GameError::State("You can't meditate while fighting.".to_string()));
    }
    if let Some(mut flags) = ctx.world_mut().get_mut::<StateFlags>(ctx.entity) {
        flags.is_meditating = true;
        flags.is_resting = false;
    }
    ctx.tell_self("You close your eyes and meditate.".to_string());
    Ok(CommandOutcome::default())
}

fn stand(ctx: &mut CommandContext, _args: &str) -> Result<CommandOutcome, GameError> {
    if let Some(mut flags) = ctx.world_mut().get_mut::<StateFlags>(ctx.entity) {
        flags.break_rest();
    }
    ctx.tell_self("You stand up.".to_string());
    Ok(CommandOutcome::default())
}

/// No content-level ability table exists yet (§9 open question), so every
/// cast channels the same self-targeted haste effect rather than a
/// fabricated spell catalogue. The cooldown, resource spend and effect
/// application are all real, so the surface exercises the registry
/// end to end instead of being a flavor-text no-op.
fn cast(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    require_conscious(ctx)?;
    if args.is_empty() {
        return Err(GameError::User("Cast what?".to_string()));
    }
    let ability_id = thornkeep_data::AbilityId::from(args.split_whitespace().next().unwrap_or(args));

    let ready = ctx
        .world()
        .get::<thornkeep_common::components::Cooldowns>(ctx.entity)
        .map(|cooldowns| cooldowns.is_ready(&ability_id))
        .unwrap_or(true);
    if !ready {
        return Err(GameError::State("That ability is not ready yet.".to_string()));
    }

    let spent = ctx
        .world_mut()
        .get_mut::<ResourcePoints>(ctx.entity)
        .map(|mut resource| resource.try_spend(10))
        .unwrap_or(true);
    if !spent {
        return Err(GameError::User("You don't have enough resource for that.".to_string()));
    }

    ctx.world_mut()
        .get_mut::<thornkeep_common::components::Cooldowns>(ctx.entity)
        .ok_or_else(|| GameError::Internal("missing cooldowns".to_string()))?
        .start(ability_id.clone(), 3);

    let proc = thornkeep_data::EffectProc {
        effect_type: thornkeep_data::EffectType::Haste,
        name: ability_id.to_string(),
        duration_ticks: 5,
        tick_interval: 1,
        magnitude: 0,
        stacking_behaviour: thornkeep_data::EffectStackingBehaviour::Refresh,
    };
    let user_id = ctx.user_id.to_string();
    let active_effect = {
        let mut allocator = ctx.world_mut().resource_mut::<crate::world::effects::EffectIdAllocator>();
        crate::world::effects::instantiate_proc(&mut allocator, &proc, user_id.clone(), Some(user_id), true)
    };
    if let Some(mut effects) = ctx.world_mut().get_mut::<thornkeep_common::components::ActiveEffects>(ctx.entity) {
        crate::world::effects::apply_effect(&mut effects, active_effect);
    }

    ctx.tell_self(format!("You cast {ability_id}."));
    ctx.tell_room_except_self(&format!("{} gestures and channels {ability_id}.", ctx.user_id));
    Ok(CommandOutcome::default())
}

fn use_item(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    if args.is_empty() {
        return Err(GameError::User("Use what?".to_string()));
    }
    let instance_id = {
        let inventory = ctx
            .world()
            .get::<Inventory>(ctx.entity)
            .ok_or_else(|| GameError::Internal("missing inventory".to_string()))?;
        find_item_by_name(ctx, inventory.items(), args)
            .ok_or_else(|| GameError::NotFound(format!("You aren't carrying a {args}.")))?
    };

    let proc_effect = ctx
        .world()
        .resource::<crate::world::registry::WorldIndex>()
        .item_instance_entity(&instance_id)
        .and_then(|entity| ctx.world().get::<thornkeep_common::components::ItemInstance>(entity))
        .and_then(|item| {
            ctx.world()
                .resource::<GameData>()
                .item_templates
                .get(&item.template_id)
                .and_then(|template| template.proc_effect.clone())
        });

    ctx.world_mut().get_mut::<Inventory>(ctx.entity).unwrap().remove(&instance_id);

    match proc_effect {
        Some(proc) => {
            let user_id = ctx.user_id.to_string();
            let active_effect = {
                let mut allocator = ctx.world_mut().resource_mut::<crate::world::effects::EffectIdAllocator>();
                crate::world::effects::instantiate_proc(&mut allocator, &proc, user_id.clone(), Some(user_id), true)
            };
            if let Some(mut effects) = ctx.world_mut().get_mut::<thornkeep_common::components::ActiveEffects>(ctx.entity) {
                crate::world::effects::apply_effect(&mut effects, active_effect);
            }
        }
        None => {
            if let Some(mut hp) = ctx.world_mut().get_mut::<HealthPoints>(ctx.entity) {
                hp.apply_delta(10);
            }
        }
    }

    ctx.tell_self(format!("You use {instance_id}."));
    Ok(CommandOutcome::default())
}

fn help(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    if args.is_empty() {
        ctx.tell_self(
            "Commands: look, north/south/east/west/up/down, say, tell, who, inventory, get, \
             drop, wear, remove, attack, flee, rest, meditate, stand, cast, use, bug, quit."
                .to_string(),
        );
    } else {
        ctx.tell_self(format!("No help is available for '{args}'."));
    }
    Ok(CommandOutcome::default())
}

fn bug(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    if args.is_empty() {
        return Err(GameError::User("Describe the bug you want to report.".to_string()));
    }
    ctx.world_mut()
        .resource_mut::<crate::world::BugReports>()
        .push(format!("[{}] {args}", ctx.user_id));
    ctx.tell_self("Thanks, your report has been logged.".to_string());
    Ok(CommandOutcome::default())
}

fn quit(ctx: &mut CommandContext, _args: &str) -> Result<CommandOutcome, GameError> {
    ctx.tell_self("Goodbye!".to_string());
    Ok(CommandOutcome::transition(StateTransition::Quit))
}

fn shutdown(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    let minutes = args.trim().parse::<u32>().ok();
    ctx.world_mut()
        .resource_mut::<crate::world::ShutdownRequested>()
        .request(minutes);
    ctx.tell_self("Shutdown sequence initiated.".to_string());
    Ok(CommandOutcome::default())
}

fn kick(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    if args.is_empty() {
        return Err(GameError::User("Kick whom?".to_string()));
    }
    let target = UserId::new(args.trim());
    ctx.world_mut().resource_mut::<crate::world::KickRequests>().push(target.clone());
    ctx.tell_self(format!("Kicking {target}."));
    Ok(CommandOutcome::default())
}

fn spawn_npc(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    if args.is_empty() {
        return Err(GameError::User("Spawn which template?".to_string()));
    }
    let room_id = current_room_id(ctx).ok_or_else(|| GameError::Internal("missing location".to_string()))?;
    let template_id = NpcTemplateId::from(args.trim());
    if !ctx.world().resource::<GameData>().npc_templates.contains_key(&template_id) {
        return Err(GameError::NotFound(format!("No NPC template named {template_id}.")));
    }

    let instance_id = thornkeep_data::NpcInstanceId::from(format!("{template_id}-admin-{}", ctx.user_id));
    let instance = thornkeep_common::components::NpcInstance::new(instance_id.clone(), template_id.clone(), room_id.clone());
    let max_health = ctx
        .world()
        .resource::<GameData>()
        .npc_templates
        .get(&template_id)
        .map(|template| template.max_health)
        .unwrap_or(1);

    ctx.registry
        .spawn_npc_instance(
            instance_id.clone(),
            (
                instance,
                HealthPoints::new(max_health),
                thornkeep_common::components::AggressionTable::default(),
                thornkeep_common::components::ActiveEffects::default(),
            ),
        )
        .map_err(|error| GameError::Internal(error.to_string()))?;
    let room_entity = ctx
        .world()
        .resource::<crate::world::registry::WorldIndex>()
        .room_entity(&room_id)
        .unwrap();
    ctx.world_mut()
        .get_mut::<thornkeep_common::components::RoomState>(room_entity)
        .unwrap()
        .spawned_npcs
        .push(instance_id.clone());

    ctx.tell_self(format!("Spawned {instance_id}."));
    ctx.tell_room_except_self(&format!("{} appears.", instance_id));
    Ok(CommandOutcome::default())
}

fn teleport(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    let (user, room) = args
        .split_once(char::is_whitespace)
        .ok_or_else(|| GameError::User("Usage: tp <user> <roomId>".to_string()))?;
    let target = UserId::new(user.trim());
    let room_id = RoomId::from(room.trim());
    ctx.registry
        .move_user(&target, room_id.clone())
        .map_err(|error| GameError::NotFound(error.to_string()))?;
    ctx.world_mut()
        .resource_mut::<Outbox>()
        .push(OutboundEvent::ToUser(target.clone(), format!("You are teleported to {room_id}.")));
    ctx.tell_self(format!("Teleported {target} to {room_id}."));
    Ok(CommandOutcome::default())
}

fn setflag(ctx: &mut CommandContext, args: &str) -> Result<CommandOutcome, GameError> {
    let (user, flag) = args
        .split_once(char::is_whitespace)
        .ok_or_else(|| GameError::User("Usage: setflag <user> <flag>".to_string()))?;
    let target = UserId::new(user.trim());
    let target_entity = ctx
        .world()
        .resource::<crate::world::registry::WorldIndex>()
        .user_entity(&target)
        .ok_or_else(|| GameError::NotFound(format!("{target} is not online.")))?;
    let Some(mut flags) = ctx.world_mut().get_mut::<StateFlags>(target_entity) else {
        return Err(GameError::Internal("missing state flags".to_string()));
    };
    match flag.trim().to_lowercase().as_str() {
        "sneaking" => flags.is_sneaking = !flags.is_sneaking,
        "hiding" => flags.is_hiding = !flags.is_hiding,
        "unconscious" => flags.is_unconscious = !flags.is_unconscious,
        other => return Err(GameError::User(format!("Unknown flag '{other}'."))),
    }
    ctx.tell_self(format!("Toggled {flag} on {target}."));
    Ok(CommandOutcome::default())
}
