//! Load game content from TOML

use ahash::AHashMap;
use std::fs;
use std::path::Path;

use crate::combat::stats::PlayerRecord;
use crate::core::config::BattleConfig;
use crate::core::error::{ForgeError, Result};
use crate::logic::effects::Effect;
use crate::logic::gates::{Gate, GateKind};
use crate::logic::node::{Behavior, BehaviorId, Forest, NodeId};
use crate::mask::material::{MaterialDef, MaterialRegistry};
use crate::rules::schema::{ContentFile, EffectDef, EnemyDef, GateDef, MaterialSchema, NodeDef};

/// Content ready for a game session
#[derive(Debug, Clone)]
pub struct Content {
    pub battle: BattleConfig,
    pub player: PlayerRecord,
    pub registry: MaterialRegistry,
    pub enemies: Vec<EnemyDef>,
    pub starting_materials: Vec<String>,
}

impl Content {
    pub fn enemy(&self, name: &str) -> Option<&EnemyDef> {
        self.enemies.iter().find(|e| e.stats.name == name)
    }
}

/// Read and parse a content file
pub fn load_content(path: &Path) -> Result<Content> {
    let text = fs::read_to_string(path)?;
    let content = parse_content(&text)?;
    tracing::info!(
        path = %path.display(),
        materials = content.registry.len(),
        enemies = content.enemies.len(),
        "Content loaded"
    );
    Ok(content)
}

pub fn parse_content(text: &str) -> Result<Content> {
    let file: ContentFile = toml::from_str(text)?;
    file.battle.validate().map_err(ForgeError::Config)?;

    let mut registry = MaterialRegistry::new();
    for schema in &file.materials {
        registry.register(build_material(schema)?)?;
    }

    let referenced = file
        .starting_materials
        .iter()
        .chain(file.enemies.iter().flat_map(|e| e.rewards.iter()));
    for id in referenced {
        if registry.get(id).is_none() {
            return Err(ForgeError::UnknownMaterial(id.clone()));
        }
    }

    Ok(Content {
        battle: file.battle,
        player: PlayerRecord::new(file.player.name, file.player.stats),
        registry,
        enemies: file.enemies,
        starting_materials: file.starting_materials,
    })
}

pub fn build_material(schema: &MaterialSchema) -> Result<MaterialDef> {
    let mut forest = Forest::new(schema.name.as_str());

    let mut shared = AHashMap::new();
    for (name, def) in &schema.shared {
        let behavior = to_behavior(def.gate, def.effect.as_ref(), def.invert)
            .map_err(|e| ForgeError::Config(format!("{}: shared '{}': {}", schema.id, name, e)))?;
        if let Some(behavior) = behavior {
            shared.insert(name.as_str(), forest.add_behavior(behavior));
        }
    }

    for node in &schema.nodes {
        add_node(&mut forest, None, node, &shared, &schema.id)?;
    }

    Ok(MaterialDef {
        id: schema.id.clone(),
        name: schema.name.clone(),
        mana_cost: schema.mana_cost,
        quality: schema.quality,
        shelf_life_turns: schema.shelf_life_turns.max(1),
        forest,
    })
}

fn add_node(
    forest: &mut Forest,
    parent: Option<NodeId>,
    def: &NodeDef,
    shared: &AHashMap<&str, BehaviorId>,
    material: &str,
) -> Result<()> {
    let named = [def.gate.is_some(), def.effect.is_some(), def.shared.is_some()]
        .iter()
        .filter(|&&set| set)
        .count();
    if named > 1 {
        return Err(ForgeError::Config(format!(
            "{}: a node may name only one of gate, effect or use",
            material
        )));
    }

    let behavior = match &def.shared {
        Some(name) => {
            let found = shared.get(name.as_str()).copied();
            if found.is_none() {
                tracing::warn!(material, behavior = %name, "Unknown shared behavior, node becomes a group");
            }
            found
        }
        None => to_behavior(def.gate, def.effect.as_ref(), def.invert)
            .map_err(|e| ForgeError::Config(format!("{}: {}", material, e)))?
            .map(|behavior| forest.add_behavior(behavior)),
    };

    let id = forest.add_node(parent, behavior)?;
    if let Some(title) = &def.title {
        forest.set_title(id, title)?;
    }
    forest.set_side(id, def.side)?;

    for child in &def.children {
        add_node(forest, Some(id), child, shared, material)?;
    }
    Ok(())
}

fn to_behavior(
    gate: Option<GateDef>,
    effect: Option<&EffectDef>,
    invert: bool,
) -> std::result::Result<Option<Behavior>, String> {
    match (gate, effect) {
        (Some(_), Some(_)) => Err("gate and effect on the same behavior".to_string()),
        (Some(gate), None) => {
            let mut gate = Gate::new(GateKind::from(gate));
            if invert {
                gate = gate.inverted();
            }
            Ok(Some(Behavior::Gate(gate)))
        }
        (None, Some(_)) if invert => Err("invert only applies to gates".to_string()),
        (None, Some(effect)) => Ok(Some(Behavior::Effect(Effect::from(effect.clone())))),
        (None, None) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::description::describe;

    const CONTENT: &str = r#"
        starting_materials = ["ember"]

        [battle]
        seed = 7

        [player]
        name = "Kit"
        attack = 15

        [[enemy]]
        name = "Slime"
        max_hp = 30
        attack = 3
        rewards = ["ember"]

        [[material]]
        id = "ember"
        name = "Ember Shard"
        mana_cost = 2
        quality = "rare"
        shelf_life_turns = 2

        [material.shared.sharp]
        effect = { kind = "attack_field", field = "raw_attack", amount = 1 }

        [[material.nodes]]
        gate = { kind = "phase", phase = "attack_modify" }
        side = "player"

        [[material.nodes.children]]
        use = "sharp"

        [[material.nodes.children]]
        gate = { kind = "nth_attack", n = 2 }
        invert = true
        children = [{ use = "sharp" }]
    "#;

    #[test]
    fn test_parse_content() {
        let content = parse_content(CONTENT).unwrap();
        assert_eq!(content.battle.seed, 7);
        assert_eq!(content.player.name, "Kit");
        assert_eq!(content.player.actual.attack, 15.0);
        assert_eq!(content.enemy("Slime").unwrap().stats.max_hp, 30.0);
        assert_eq!(content.starting_materials, vec!["ember".to_string()]);

        let ember = content.registry.get("ember").unwrap();
        assert_eq!(ember.mana_cost, 2);
        assert_eq!(ember.shelf_life_turns, 2);
        // root, two children, one grandchild
        assert_eq!(ember.forest.len(), 4);
    }

    #[test]
    fn test_shared_behavior_described_at_each_use() {
        let content = parse_content(CONTENT).unwrap();
        let text = describe(&content.registry.get("ember").unwrap().forest);
        assert_eq!(text.matches("Raw attack +1").count(), 2);
        assert!(text.contains("Unless: "));
    }

    #[test]
    fn test_two_behaviors_on_one_node_rejected() {
        let text = r#"
            [[material]]
            id = "bad"
            name = "Bad"
            [[material.nodes]]
            gate = { kind = "battle_start" }
            effect = { kind = "restore_mana", amount = 1 }
        "#;
        assert!(matches!(parse_content(text), Err(ForgeError::Config(_))));
    }

    #[test]
    fn test_unknown_reward_rejected() {
        let text = r#"
            [[enemy]]
            name = "Bat"
            rewards = ["ghost"]
        "#;
        assert!(matches!(
            parse_content(text),
            Err(ForgeError::UnknownMaterial(id)) if id == "ghost"
        ));
    }

    #[test]
    fn test_unknown_shared_name_becomes_group() {
        let text = r#"
            [[material]]
            id = "odd"
            name = "Odd"
            [[material.nodes]]
            use = "missing"
            children = [{ effect = { kind = "restore_mana", amount = 1 } }]
        "#;
        let content = parse_content(text).unwrap();
        let forest = &content.registry.get("odd").unwrap().forest;
        let root = forest.node(forest.roots()[0]).unwrap();
        assert!(root.behavior().is_none());
        assert_eq!(root.children().len(), 1);
    }

    #[test]
    fn test_invalid_battle_config_rejected() {
        let text = r#"
            [battle]
            tick_secs = 0.0
        "#;
        assert!(matches!(parse_content(text), Err(ForgeError::Config(_))));
    }
}
