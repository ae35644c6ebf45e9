//! Loads the static [`GameData`] tables at startup from the `--rooms-file`/
//! `--items-file`/`--npcs-file` JSON documents and `--inject-json` literals
//! (§6), falling back to a minimal built-in room so the server always has
//! somewhere to place a freshly created character.

use std::path::Path;

use thornkeep_common::components::{ActiveEffects, AggressionTable, HealthPoints, NpcInstance, RoomState};
use thornkeep_data::{
    ClassDefinition, ClassId, ItemTemplate, NpcInstanceId, NpcTemplate, ResourceKind, RoomFlags,
    RoomId, RoomTemplate,
};

use crate::config::Cli;
use crate::world::GameData;
use crate::world::registry::WorldRegistry;

pub const STARTING_ROOM_ID: &str = "town_square";

fn fallback_room() -> RoomTemplate {
    RoomTemplate {
        id: RoomId::from(STARTING_ROOM_ID),
        name: "Town Square".to_string(),
        description: "A worn stone square at the heart of Thornkeep.".to_string(),
        exits: Vec::new(),
        flags: RoomFlags::SAFE,
        area_id: thornkeep_data::AreaId::from("thornkeep"),
        grid_x: 0,
        grid_y: 0,
    }
}

fn fallback_classes() -> Vec<ClassDefinition> {
    vec![
        ClassDefinition {
            id: ClassId::from("warrior"),
            name: "Warrior".to_string(),
            resource_kind: ResourceKind::Rage,
        },
        ClassDefinition {
            id: ClassId::from("mage"),
            name: "Mage".to_string(),
            resource_kind: ResourceKind::Mana,
        },
    ]
}

fn read_json_list<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Loads every template table, spawns the rooms into `registry`, then
/// instantiates one `NpcInstance` per `NpcTemplate` into its
/// `home_room_id` (§4.5 step 5), so a fresh boot already has live NPCs
/// instead of requiring an admin `spawn` first.
pub fn load(cli: &Cli, registry: &mut WorldRegistry) -> anyhow::Result<GameData> {
    let mut data = GameData::new();

    let mut rooms: Vec<RoomTemplate> = match &cli.rooms_file {
        Some(path) => read_json_list(path)?,
        None => Vec::new(),
    };
    if rooms.is_empty() {
        rooms.push(fallback_room());
    }

    let items: Vec<ItemTemplate> = match &cli.items_file {
        Some(path) => read_json_list(path)?,
        None => Vec::new(),
    };

    let npcs: Vec<NpcTemplate> = match &cli.npcs_file {
        Some(path) => read_json_list(path)?,
        None => Vec::new(),
    };

    for literal in &cli.inject_json {
        apply_injection(&mut rooms, literal)?;
    }

    for room in rooms {
        registry.spawn_room(room.id.clone()).ok();
        data.rooms.insert(room.id.clone(), room);
    }
    for item in items {
        data.item_templates.insert(item.id.clone(), item);
    }
    for npc in npcs {
        data.npc_templates.insert(npc.id.clone(), npc);
    }

    for class in fallback_classes() {
        data.classes.insert(class.id.clone(), class);
    }

    if !data.rooms.contains_key(&RoomId::from(STARTING_ROOM_ID)) {
        let room = fallback_room();
        registry.spawn_room(room.id.clone()).ok();
        data.rooms.insert(room.id.clone(), room);
    }

    spawn_initial_npcs(registry, &data);

    Ok(data)
}

/// Instantiates one `NpcInstance` per template into its home room, mirroring
/// the bundle `spawn_npc`/`respawn_system` build so a startup-populated NPC
/// is indistinguishable from an admin-spawned or respawned one. Templates
/// whose `home_room_id` was never spawned are skipped rather than failing
/// the whole load.
fn spawn_initial_npcs(registry: &mut WorldRegistry, data: &GameData) {
    for template in data.npc_templates.values() {
        let Some(room_entity) = registry.world.resource::<crate::world::registry::WorldIndex>().room_entity(&template.home_room_id) else {
            continue;
        };

        let instance_id = NpcInstanceId::from(format!("{}-spawn-0", template.id));
        let instance = NpcInstance::new(instance_id.clone(), template.id.clone(), template.home_room_id.clone());
        let spawned = registry.spawn_npc_instance(
            instance_id.clone(),
            (
                instance,
                HealthPoints::new(template.max_health),
                AggressionTable::default(),
                ActiveEffects::default(),
            ),
        );
        if spawned.is_err() {
            continue;
        }

        if let Some(mut room_state) = registry.world.get_mut::<RoomState>(room_entity) {
            room_state.spawned_npcs.push(instance_id);
        }
    }
}

/// `--inject-json` accepts a single `RoomTemplate` JSON literal per flag,
/// appended to whatever `--rooms-file` already loaded (§6 "scripted test
/// setup").
fn apply_injection(rooms: &mut Vec<RoomTemplate>, literal: &str) -> anyhow::Result<()> {
    let room: RoomTemplate = serde_json::from_str(literal)?;
    rooms.push(room);
    Ok(())
}
