use broadside::{ComputerPlayer, GameConfig, LocalGame, ShipKind, TurnRule};
use rand::{rngs::SmallRng, SeedableRng};

#[tokio::test]
async fn test_computer_match_has_one_winner() {
    let config = GameConfig::default().with_turn_rule(TurnRule::Alternate);
    let mut one = ComputerPlayer::new("one", SmallRng::seed_from_u64(1));
    let mut two = ComputerPlayer::new("two", SmallRng::seed_from_u64(2));
    let report = LocalGame::new(config, SmallRng::seed_from_u64(3))
        .run(&mut one, &mut two)
        .await
        .unwrap();

    let winner = report.winner.clone().expect("local match was aborted");
    let w = if winner == "one" { 0 } else { 1 };
    assert_eq!(report.scores[w], 63 + 28);
    assert!(report.scores[1 - w] < 63 + 28);
    // the side that moved first fires at most one shot more
    let f = if report.first == "one" { 0 } else { 1 };
    assert!(report.shots[f] == report.shots[1 - f] || report.shots[f] == report.shots[1 - f] + 1);
}

#[tokio::test]
async fn test_same_seeds_same_report() {
    let config = GameConfig::default()
        .with_size(8, 8)
        .with_fleet(&[(ShipKind::Destroyer, 2), (ShipKind::Patrol, 3)])
        .with_turn_rule(TurnRule::ExtraTurnOnHit);
    let mut reports = Vec::new();
    for _ in 0..2 {
        let mut one = ComputerPlayer::new("one", SmallRng::seed_from_u64(7));
        let mut two = ComputerPlayer::new("two", SmallRng::seed_from_u64(8));
        let report = LocalGame::new(config.clone(), SmallRng::seed_from_u64(9))
            .run(&mut one, &mut two)
            .await
            .unwrap();
        reports.push(report);
    }
    assert_eq!(reports[0], reports[1]);
    let json = serde_json::to_value(&reports[0]).unwrap();
    assert!(json["winner"].is_string());
    assert_eq!(json["scores"][0].as_u64(), Some(u64::from(reports[0].scores[0])));
}
