use delve_game::{
    CharacterRecord, CharacterStore, FightOutcome, GameConfig, GameEngine, GameError, GameMode,
    JsonFileStore, LevelUp, MemoryStore, Reward, SkillKind, SkillSpec, StatChoice,
};
use rand::SeedableRng;
use rand::rngs::mock::StepRng;
use rand_chacha::ChaCha20Rng;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "delve-engine-{label}-{}.json",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn engine(store: MemoryStore) -> GameEngine<MemoryStore> {
    GameEngine::with_seed(GameConfig::default(), store, 2024).unwrap()
}

fn never_zero() -> StepRng {
    StepRng::new(1 << 31, 0)
}

/// Seed a level 1 character already fighting a rat with the given numbers.
fn seed_battle(store: &MemoryStore, user_id: &str, defense: u32, rat: (u32, u32, u32, u32)) {
    let (hp, attack, xp, gold) = rat;
    let record: CharacterRecord = serde_json::from_value(serde_json::json!({
        "name": "Ayla",
        "hp": 10,
        "max_hp": 10,
        "attack": 2,
        "defense": defense,
        "mana": 0,
        "max_mana": 10,
        "stamina": 8,
        "max_stamina": 8,
        "xp": 0,
        "level": 1,
        "gold": 0,
        "inventory": [],
        "mode": 2,
        "battling": {
            "enemy": "GiantRat",
            "name": "Giant Rat",
            "hp": hp,
            "max_hp": hp,
            "attack": attack,
            "defense": 0,
            "xp": xp,
            "gold": gold
        },
        "user_id": user_id
    }))
    .unwrap();
    store.write(user_id, &record).unwrap();
}

#[test]
fn victory_awards_experience_and_gold() {
    let store = MemoryStore::new();
    seed_battle(&store, "a", 1, (2, 1, 15, 5));
    let engine = engine(store);

    let outcome = engine.fight("a", &mut never_zero()).unwrap();
    let FightOutcome::Victory { reward, .. } = outcome else {
        panic!("expected victory");
    };
    assert_eq!(
        reward,
        Reward {
            experience: 15,
            gold: 5,
            ready_to_level_up: true
        }
    );

    let stored = engine.load_character("a").unwrap();
    assert_eq!((stored.experience, stored.gold), (15, 5));
    assert_eq!(stored.mode(), GameMode::Adventure);
    assert!(engine.ready_to_level_up("a").unwrap().ready);
}

#[test]
fn failed_flee_costs_half_enemy_attack() {
    let store = MemoryStore::new();
    seed_battle(&store, "b", 5, (20, 10, 1, 1));
    let engine = engine(store);

    let outcome = engine.flee("b", &mut StepRng::new(0, 0)).unwrap();
    assert!(!outcome.escaped);
    assert_eq!(outcome.damage, 5);
    assert!(!outcome.fatal);

    let stored = engine.load_character("b").unwrap();
    assert_eq!(stored.stats.health, 5);
    assert_eq!(stored.mode(), GameMode::Adventure);
    assert!(stored.battling().is_none());
}

#[test]
fn missing_user_is_not_found() {
    let engine = engine(MemoryStore::new());
    assert!(matches!(
        engine.load_character("ghost"),
        Err(GameError::NotFound { user_id }) if user_id == "ghost"
    ));
    assert!(matches!(
        engine.progress("ghost"),
        Err(GameError::NotFound { .. })
    ));
}

#[test]
fn hunting_twice_is_rejected_without_side_effects() {
    let store = MemoryStore::new();
    seed_battle(&store, "d", 1, (9, 3, 4, 2));
    let engine = engine(store.clone());
    let before = store.read("d").unwrap();

    let err = engine
        .hunt("d", &mut ChaCha20Rng::seed_from_u64(1))
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(store.read("d").unwrap(), before);
}

#[test]
fn slain_character_is_deleted() {
    let store = MemoryStore::new();
    seed_battle(&store, "e", 0, (50, 40, 1, 1));
    let engine = engine(store.clone());

    let outcome = engine.fight("e", &mut never_zero()).unwrap();
    assert!(outcome.character_died());
    assert!(store.is_empty());
    assert!(matches!(
        engine.load_character("e"),
        Err(GameError::NotFound { .. })
    ));
}

#[test]
fn level_up_persists_chosen_stat() {
    let store = MemoryStore::new();
    seed_battle(&store, "f", 1, (2, 1, 25, 0));
    let engine = engine(store);
    engine.fight("f", &mut never_zero()).unwrap();

    assert_eq!(
        engine.level_up("f", "DEF").unwrap(),
        LevelUp {
            leveled: true,
            level: 2
        }
    );
    let stored = engine.load_character("f").unwrap();
    assert_eq!(stored.stats.defense, 2);
    assert_eq!(stored.stats.health, stored.stats.max_health);

    let progress = engine.progress("f").unwrap();
    assert_eq!(progress.next_threshold, Some(20));
    assert_eq!(progress.experience_needed, -5);
    assert_eq!(
        engine.level_up("f", &StatChoice::Health.to_string()).unwrap(),
        LevelUp {
            leveled: true,
            level: 3
        }
    );
}

#[test]
fn learned_skills_survive_reload() {
    let engine = engine(MemoryStore::new());
    engine.create_character("g", "Cato").unwrap();
    let spec = SkillSpec {
        name: "Cleave".into(),
        required_level: 1,
        damage_attributes: vec!["physical".into()],
        damage_amount: 12,
        cooldown: 2,
        kind: SkillKind::Normal,
    };
    let skill = engine
        .learn_skill("g", spec, &mut ChaCha20Rng::seed_from_u64(8))
        .unwrap();
    assert_eq!(skill.debuffs.len(), 1);
    assert!(skill.debuffs[0].delta < 0);

    let stored = engine.load_character("g").unwrap();
    assert_eq!(stored.skills, vec![skill]);
}

#[test]
fn seeded_campaigns_keep_invariants() {
    let rules = GameConfig::default().progression();
    for seed in 0..20_u64 {
        let engine = GameEngine::with_seed(GameConfig::default(), MemoryStore::new(), seed).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(seed ^ 0x5EED);
        let user = format!("user-{seed}");
        engine.create_character(&user, "Sweep").unwrap();

        'turns: for _ in 0..300 {
            let enemy = engine.hunt(&user, &mut rng).unwrap();
            let level = engine.load_character(&user).unwrap().level;
            assert!(engine.registry().get(enemy.tag()).unwrap().min_level() <= level);

            loop {
                let outcome = engine.fight(&user, &mut rng).unwrap();
                if outcome.character_died() {
                    break 'turns;
                }
                let character = engine.load_character(&user).unwrap();
                assert!(character.stats.health <= character.stats.max_health);
                assert!(character.stats.health > 0);
                assert_eq!(character.battling().is_some(), character.mode() == GameMode::Battle);
                if outcome.battle_over() {
                    break;
                }
            }

            if engine.ready_to_level_up(&user).unwrap().ready {
                engine.level_up(&user, "hp").unwrap();
            }
            let character = engine.load_character(&user).unwrap();
            assert!(character.level <= rules.level_cap);
            assert_eq!(character.mode(), GameMode::Adventure);
        }
    }
}

#[test]
fn file_store_backs_the_engine() {
    let path = temp_path("file");
    let engine =
        GameEngine::with_seed(GameConfig::default(), JsonFileStore::new(&path), 11).unwrap();
    engine.create_character("h", "Dara").unwrap();
    engine
        .hunt("h", &mut ChaCha20Rng::seed_from_u64(12))
        .unwrap();

    let reopened =
        GameEngine::with_seed(GameConfig::default(), JsonFileStore::new(&path), 11).unwrap();
    let character = reopened.load_character("h").unwrap();
    assert_eq!(character.mode(), GameMode::Battle);
    assert_eq!(character.battling().map(|e| e.tag()), Some("GiantRat"));

    assert!(reopened.die("h").unwrap());
    assert!(matches!(
        engine.load_character("h"),
        Err(GameError::NotFound { .. })
    ));
    let _ = std::fs::remove_file(path);
}
