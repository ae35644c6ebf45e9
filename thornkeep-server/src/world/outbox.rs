use bevy_ecs::prelude::Resource;

use thornkeep_data::{RoomId, UserId};

/// A message produced by a tick-engine system, queued for delivery after the
/// tick's critical section ends (§5 "no command handler observes a partial
/// tick"). Drained by the world-thread driver into each session's outbound
/// channel.
#[derive(Clone, Debug)]
pub enum OutboundEvent {
    ToUser(UserId, String),
    ToRoom(RoomId, String),
    ToRoomExcept(RoomId, UserId, String),
}

#[derive(Resource, Default)]
pub struct Outbox(pub Vec<OutboundEvent>);

impl Outbox {
    pub fn push(&mut self, event: OutboundEvent) {
        self.0.push(event);
    }

    pub fn drain(&mut self) -> Vec<OutboundEvent> {
        std::mem::take(&mut self.0)
    }
}
