mod handlers;
mod movement;

use std::collections::HashMap;

use bevy_ecs::prelude::Entity;
use thornkeep_data::UserId;

use crate::error::GameError;
use crate::world::registry::WorldRegistry;
pub use movement::movement_delay_ms;

/// What a handler asks the session layer to do after it returns, beyond
/// the output lines it has already pushed onto the world's `Outbox`
/// (§4.4 "a result containing output lines and optional state transition").
#[derive(Debug, PartialEq, Eq)]
pub enum StateTransition {
    Quit,
    EnterEditor,
    EnterSnake,
    ExitSubstate,
}

#[derive(Default)]
pub struct CommandOutcome {
    pub transition: Option<StateTransition>,
    pub movement_delay_ms: Option<u64>,
}

impl CommandOutcome {
    fn transition(transition: StateTransition) -> Self {
        Self {
            transition: Some(transition),
            ..Default::default()
        }
    }
}

/// Everything a handler needs to read/mutate world state for one command,
/// grounded on the teacher's `(session, user, args, world)` handler
/// signature (§4.4 point 6).
pub struct CommandContext<'w> {
    pub registry: &'w mut WorldRegistry,
    pub user_id: UserId,
    pub entity: Entity,
    pub is_admin: bool,
}

impl CommandContext<'_> {
    pub fn world(&self) -> &bevy_ecs::world::World {
        &self.registry.world
    }

    pub fn world_mut(&mut self) -> &mut bevy_ecs::world::World {
        &mut self.registry.world
    }

    pub fn tell_self(&mut self, text: impl Into<String>) {
        use crate::world::outbox::{Outbox, OutboundEvent};
        let user_id = self.user_id.clone();
        self.world_mut()
            .resource_mut::<Outbox>()
            .push(OutboundEvent::ToUser(user_id, text.into()));
    }

    pub fn tell_room(&mut self, text: impl Into<String>) {
        use crate::world::outbox::{Outbox, OutboundEvent};
        use thornkeep_common::components::Location;
        let Some(room_id) = self.world().get::<Location>(self.entity).map(|l| l.current_room_id.clone()) else {
            return;
        };
        self.world_mut()
            .resource_mut::<Outbox>()
            .push(OutboundEvent::ToRoom(room_id, text.into()));
    }

    pub fn tell_room_except_self(&mut self, text: impl Into<String>) {
        use crate::world::outbox::{Outbox, OutboundEvent};
        use thornkeep_common::components::Location;
        let Some(room_id) = self.world().get::<Location>(self.entity).map(|l| l.current_room_id.clone()) else {
            return;
        };
        let user_id = self.user_id.clone();
        self.world_mut().resource_mut::<Outbox>().push(OutboundEvent::ToRoomExcept(
            room_id,
            user_id,
            text.into(),
        ));
    }
}

type Handler = fn(&mut CommandContext, &str) -> Result<CommandOutcome, GameError>;

struct CommandSpec {
    admin_only: bool,
    handler: Handler,
}

/// §4.4: trim → extract verb → alias lookup (non-recursive) → unique-prefix
/// resolution → permission check → invoke. Grounded on the teacher's
/// `chat_commands_system`, which runs the same pipeline over a flat verb
/// table instead of a client-side menu tree.
pub struct CommandDispatcher {
    commands: HashMap<&'static str, CommandSpec>,
    aliases: HashMap<&'static str, &'static str>,
}

pub enum DispatchOutcome {
    Ran(CommandOutcome),
    Unknown,
    Ambiguous(Vec<&'static str>),
}

impl CommandDispatcher {
    pub fn new() -> Self {
        let mut dispatcher = Self {
            commands: HashMap::new(),
            aliases: HashMap::new(),
        };
        dispatcher.register();
        dispatcher
    }

    fn add(&mut self, verb: &'static str, admin_only: bool, handler: Handler) {
        self.commands.insert(verb, CommandSpec { admin_only, handler });
    }

    fn alias(&mut self, short: &'static str, verb: &'static str) {
        self.aliases.insert(short, verb);
    }

    fn register(&mut self) {
        handlers::register(self);
    }

    /// Returns `None` for a blank line (ignored per §4.4 point 1).
    pub fn dispatch(&self, ctx: &mut CommandContext, line: &str) -> Option<DispatchOutcome> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let verb = verb.to_lowercase();
        let args = rest.trim();

        let resolved = self.resolve_verb(&verb);
        Some(match resolved {
            Resolved::One(verb) => {
                let spec = &self.commands[verb];
                if spec.admin_only && !ctx.is_admin {
                    ctx.tell_self("You don't have permission to do that.");
                    DispatchOutcome::Ran(CommandOutcome::default())
                } else {
                    match (spec.handler)(ctx, args) {
                        Ok(outcome) => DispatchOutcome::Ran(outcome),
                        Err(error) => {
                            ctx.tell_self(error.user_message());
                            DispatchOutcome::Ran(CommandOutcome::default())
                        }
                    }
                }
            }
            Resolved::Ambiguous(candidates) => DispatchOutcome::Ambiguous(candidates),
            Resolved::None => DispatchOutcome::Unknown,
        })
    }

    fn resolve_verb(&self, verb: &str) -> Resolved {
        if let Some(&canonical) = self.aliases.get(verb) {
            return Resolved::One(canonical);
        }
        if let Some((&canonical, _)) = self.commands.get_key_value(verb) {
            return Resolved::One(canonical);
        }
        let candidates: Vec<&'static str> = self
            .commands
            .keys()
            .copied()
            .filter(|candidate| candidate.starts_with(verb))
            .collect();
        match candidates.len() {
            0 => Resolved::None,
            1 => Resolved::One(candidates[0]),
            _ => Resolved::Ambiguous(candidates),
        }
    }
}

enum Resolved {
    One(&'static str),
    Ambiguous(Vec<&'static str>),
    None,
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
