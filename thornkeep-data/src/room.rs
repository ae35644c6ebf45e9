use serde::{Deserialize, Serialize};

use crate::{AreaId, ItemTemplateId, RoomId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Direction::North => "n",
            Direction::South => "s",
            Direction::East => "e",
            Direction::West => "w",
            Direction::Up => "u",
            Direction::Down => "d",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomExit {
    pub direction: Direction,
    pub target_room_id: RoomId,
    pub locked: bool,
    pub key_id: Option<ItemTemplateId>,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RoomFlags: u32 {
        const SAFE          = 0b0001;
        const NO_RECALL     = 0b0010;
        const PVP_ENABLED   = 0b0100;
        const INDOOR        = 0b1000;
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub id: RoomId,
    pub name: String,
    pub description: String,
    pub exits: Vec<RoomExit>,
    pub flags: RoomFlags,
    pub area_id: AreaId,
    pub grid_x: i32,
    pub grid_y: i32,
}

impl RoomTemplate {
    pub fn is_safe(&self) -> bool {
        self.flags.contains(RoomFlags::SAFE)
    }

    pub fn exit(&self, direction: Direction) -> Option<&RoomExit> {
        self.exits.iter().find(|exit| exit.direction == direction)
    }
}
