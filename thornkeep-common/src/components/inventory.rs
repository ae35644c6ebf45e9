use bevy_ecs::prelude::Component;
use enum_map::EnumMap;
use serde::{Deserialize, Serialize};

use thornkeep_data::{EquipmentSlot, ItemInstanceId};

use crate::components::Currency;

#[derive(Component, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<ItemInstanceId>,
    pub purse: Currency,
    pub bank_purse: Option<Currency>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ItemInstanceId] {
        &self.items
    }

    pub fn contains(&self, instance_id: &ItemInstanceId) -> bool {
        self.items.contains(instance_id)
    }

    pub fn add(&mut self, instance_id: ItemInstanceId) {
        self.items.push(instance_id);
    }

    /// Removes the instance, returning whether it was present.
    pub fn remove(&mut self, instance_id: &ItemInstanceId) -> bool {
        if let Some(index) = self.items.iter().position(|item| item == instance_id) {
            self.items.remove(index);
            true
        } else {
            false
        }
    }
}

#[derive(Component, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Equipment {
    slots: EnumMap<EquipmentSlot, Option<ItemInstanceId>>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: EquipmentSlot) -> Option<&ItemInstanceId> {
        self.slots[slot].as_ref()
    }

    /// Equips `instance_id` into `slot`, returning whatever was previously
    /// equipped there. Callers are responsible for ensuring the instance is
    /// inventory-owned beforehand so equipping never duplicates a reference.
    pub fn equip(
        &mut self,
        slot: EquipmentSlot,
        instance_id: ItemInstanceId,
    ) -> Option<ItemInstanceId> {
        self.slots[slot].replace(instance_id)
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<ItemInstanceId> {
        self.slots[slot].take()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EquipmentSlot, &ItemInstanceId)> {
        self.slots
            .iter()
            .filter_map(|(slot, item)| item.as_ref().map(|item| (slot, item)))
    }
}
