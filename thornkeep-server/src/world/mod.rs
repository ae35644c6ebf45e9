pub mod effects;
pub mod outbox;
pub mod registry;
pub mod systems;
pub mod tick;

pub use outbox::{Outbox, OutboundEvent};
pub use registry::{WorldIndex, WorldRegistry};
pub use tick::{GameTick, TickEngine};

use std::collections::HashMap;

use bevy_ecs::prelude::Resource;

use thornkeep_data::{ClassDefinition, ClassId, ItemTemplate, ItemTemplateId, NpcTemplate, NpcTemplateId, RoomTemplate, RoomId};

/// Static content loaded once at startup, grounded on the teacher's
/// `GameData` resource aggregating every `rose-data` table behind one
/// handle.
#[derive(Resource, Default)]
pub struct GameData {
    pub rooms: HashMap<RoomId, RoomTemplate>,
    pub item_templates: HashMap<ItemTemplateId, ItemTemplate>,
    pub npc_templates: HashMap<NpcTemplateId, NpcTemplate>,
    pub classes: HashMap<ClassId, ClassDefinition>,
}

impl GameData {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reports filed by the `bug` command, drained by the persistence layer on
/// the next autosave (§2 PersistenceStore collections).
#[derive(Resource, Default)]
pub struct BugReports(Vec<String>);

impl BugReports {
    pub fn push(&mut self, report: String) {
        self.0.push(report);
    }

    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.0)
    }
}

/// Set by the `shutdown` admin command; polled by the world-thread driver
/// once per tick (§5 "graceful shutdown").
#[derive(Resource, Default)]
pub struct ShutdownRequested {
    requested: bool,
    minutes: Option<u32>,
}

impl ShutdownRequested {
    pub fn request(&mut self, minutes: Option<u32>) {
        self.requested = true;
        self.minutes = minutes;
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    pub fn minutes(&self) -> Option<u32> {
        self.minutes
    }
}

/// Users the `kick` admin command has flagged for disconnection, drained by
/// the world-thread driver after each command/tick pass.
#[derive(Resource, Default)]
pub struct KickRequests(Vec<thornkeep_data::UserId>);

impl KickRequests {
    pub fn push(&mut self, user_id: thornkeep_data::UserId) {
        self.0.push(user_id);
    }

    pub fn drain(&mut self) -> Vec<thornkeep_data::UserId> {
        std::mem::take(&mut self.0)
    }
}
