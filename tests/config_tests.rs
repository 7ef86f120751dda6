use broadside::{ConfigError, GameConfig, ShipKind, TurnRule};

#[test]
fn test_default_config() {
    let config = GameConfig::default();
    assert_eq!((config.width, config.height), (15, 10));
    assert_eq!(config.delimiter, ';');
    assert_eq!(config.total_ship_cells(), 63);
    assert_eq!(config.total_ships(), 28);
    assert_eq!(config.amount_of(ShipKind::SuperPatrol), 8);
    assert_eq!(config.turn_rule, TurnRule::ExtraTurnOnHit);
    assert!(config.allow_touching);
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config = GameConfig::from_json_str(
        r#"{
            "width": 10,
            "height": 8,
            "fleet": [{"kind": "super_patrol", "amount": 2}, {"kind": "carrier", "amount": 1}],
            "turn_rule": "extra_turn_on_sink",
            "allow_touching": false
        }"#,
    )
    .unwrap();
    assert_eq!((config.width, config.height), (10, 8));
    assert_eq!(config.delimiter, ';');
    assert_eq!(config.alphabet, "abcdefghijklmno");
    assert_eq!(config.amount_of(ShipKind::SuperPatrol), 2);
    assert_eq!(config.amount_of(ShipKind::Patrol), 0);
    assert_eq!(config.total_ship_cells(), 9);
    assert_eq!(config.turn_rule, TurnRule::ExtraTurnOnSink);
    assert!(!config.allow_touching);
}

#[test]
fn test_invalid_json_rejected() {
    assert!(GameConfig::from_json_str("{\"width\": -1}").is_err());
    assert!(GameConfig::from_json_str("{\"turn_rule\": \"sometimes\"}").is_err());
    assert!(GameConfig::from_json_str("{\"width\": 20}").is_err());
    assert!(GameConfig::from_json_str("{\"height\": 18446744073709551615}").is_err());
    assert!(GameConfig::from_json_str(
        r#"{"fleet": [{"kind": "carrier", "amount": 18446744073709551615}]}"#
    )
    .is_err());
    assert!(GameConfig::from_json_file("/definitely/not/here.json").is_err());
}

#[test]
fn test_validate_reasons() {
    assert_eq!(
        GameConfig::default().with_size(0, 5).validate(),
        Err(ConfigError::EmptyGrid)
    );
    assert_eq!(
        GameConfig::default().with_size(16, 10).validate(),
        Err(ConfigError::AlphabetTooShort {
            letters: 15,
            width: 16
        })
    );
    assert_eq!(
        GameConfig {
            delimiter: 'x',
            ..GameConfig::default()
        }
        .validate(),
        Err(ConfigError::BadDelimiter('x'))
    );
    assert_eq!(
        GameConfig {
            alphabet: "abcA".into(),
            ..GameConfig::default().with_size(4, 4).with_fleet(&[(ShipKind::Patrol, 1)])
        }
        .validate(),
        Err(ConfigError::BadAlphabet('A'))
    );
    assert_eq!(
        GameConfig::default().with_fleet(&[]).validate(),
        Err(ConfigError::EmptyFleet)
    );
    assert_eq!(
        GameConfig::default().with_size(10, usize::MAX).validate(),
        Err(ConfigError::GridTooLarge {
            width: 10,
            height: usize::MAX
        })
    );
    assert_eq!(
        GameConfig::default().with_size(5, 5).validate(),
        Err(ConfigError::FleetTooLarge { cells: 63, grid: 25 })
    );
}
