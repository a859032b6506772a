//! Learnable skills and their randomized debuffs.
//!
//! Skills are stored on the character and persisted, but combat resolution
//! does not consume them yet.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::constants::{SKILL_DEBUFF_MAX, SKILL_DEBUFF_MIN};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    #[default]
    Normal,
    /// Gated behind a minimum character level.
    Intent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebuffTarget {
    Health,
    Mana,
    Stamina,
}

impl DebuffTarget {
    pub const ALL: [Self; 3] = [Self::Health, Self::Mana, Self::Stamina];
}

/// Signed change applied to a target stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debuff {
    pub target: DebuffTarget,
    pub delta: i32,
}

pub type DebuffList = SmallVec<[Debuff; 1]>;

/// What a caller asks for when learning a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSpec {
    pub name: String,
    pub required_level: u32,
    #[serde(default)]
    pub damage_attributes: Vec<String>,
    pub damage_amount: u32,
    pub cooldown: u32,
    #[serde(default)]
    pub kind: SkillKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub required_level: u32,
    #[serde(default)]
    pub damage_attributes: Vec<String>,
    pub damage_amount: u32,
    pub cooldown: u32,
    #[serde(default)]
    pub kind: SkillKind,
    #[serde(default)]
    pub debuffs: DebuffList,
}

impl Skill {
    /// Build a skill from `spec`, attaching one random debuff.
    pub fn learn<R: Rng + ?Sized>(spec: SkillSpec, rng: &mut R) -> Self {
        Self {
            name: spec.name,
            required_level: spec.required_level,
            damage_attributes: spec.damage_attributes,
            damage_amount: spec.damage_amount,
            cooldown: spec.cooldown,
            kind: spec.kind,
            debuffs: smallvec![roll_debuff(rng)],
        }
    }
}

/// Uniform target, magnitude in `1..=100`, always a reduction.
pub fn roll_debuff<R: Rng + ?Sized>(rng: &mut R) -> Debuff {
    let target = DebuffTarget::ALL
        .choose(rng)
        .copied()
        .unwrap_or(DebuffTarget::Health);
    let magnitude = rng.gen_range(SKILL_DEBUFF_MIN..=SKILL_DEBUFF_MAX);
    Debuff {
        target,
        delta: -i32::try_from(magnitude).unwrap_or(i32::MAX),
    }
}
