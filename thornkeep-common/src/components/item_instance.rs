use std::collections::HashMap;

use bevy_ecs::prelude::Component;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use thornkeep_data::{ItemInstanceId, ItemTemplateId, UserId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    pub action: String,
    pub actor: Option<UserId>,
}

#[derive(Component, Clone, Debug, Serialize, Deserialize)]
pub struct ItemInstance {
    pub instance_id: ItemInstanceId,
    pub template_id: ItemTemplateId,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub custom_name: Option<String>,
    pub durability_current: u32,
    pub durability_max: u32,
    pub quality: u8,
    pub soulbound: bool,
    pub bound_to: Option<UserId>,
    pub charges: Option<u32>,
    pub enchantments: HashMap<String, i32>,
    pub audit_history: Vec<AuditEntry>,
}

impl ItemInstance {
    pub fn new(
        instance_id: ItemInstanceId,
        template_id: ItemTemplateId,
        durability_max: u32,
        created_by: Option<UserId>,
    ) -> Self {
        Self {
            instance_id,
            template_id,
            created_at: Utc::now(),
            created_by,
            custom_name: None,
            durability_current: durability_max,
            durability_max,
            quality: 100,
            soulbound: false,
            bound_to: None,
            charges: None,
            enchantments: HashMap::new(),
            audit_history: Vec::new(),
        }
    }

    pub fn record(&mut self, action: impl Into<String>, actor: Option<UserId>) {
        self.audit_history.push(AuditEntry {
            at: Utc::now(),
            action: action.into(),
            actor,
        });
    }
}
