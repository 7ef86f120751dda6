use std::sync::Arc;
use std::time::Duration;

use broadside::{
    play, Board, ComputerPlayer, Coordinate, FogBoard, GameConfig, GameOutcome,
    InMemoryTransport, Match, MatchStatus, Message, MoveRejection, Orientation, PlacedShip, Player,
    ProtocolCodec, Server, ShipKind, ShotNotice, Side, Transport, Turn, TurnRule,
};
use rand::{rngs::SmallRng, SeedableRng};
use tokio::time::timeout;

fn destroyer_config() -> GameConfig {
    GameConfig::default()
        .with_size(10, 10)
        .with_fleet(&[(ShipKind::Destroyer, 1)])
        .with_turn_rule(TurnRule::Alternate)
}

fn board_line(config: &GameConfig, x: usize, y: usize) -> String {
    let board = Board::with_layout(
        config,
        &[PlacedShip::new(ShipKind::Destroyer, x, y, Orientation::Horizontal)],
    )
    .unwrap();
    ProtocolCodec::default()
        .encode(&Message::ClientBoard {
            fields: board.encode_fields(),
        })
        .unwrap()
}

async fn next_line(t: &mut InMemoryTransport) -> Option<String> {
    timeout(Duration::from_secs(5), t.recv_line())
        .await
        .expect("timed out waiting for the server")
        .unwrap()
}

async fn expect(t: &mut InMemoryTransport, line: &str) {
    assert_eq!(next_line(t).await.as_deref(), Some(line));
}

async fn connect(server: &Arc<Server>) -> InMemoryTransport {
    let (server_end, client_end) = InMemoryTransport::pair();
    let server = Arc::clone(server);
    tokio::spawn(async move { server.accept(Box::new(server_end)).await });
    client_end
}

async fn join(server: &Arc<Server>, name: &str) -> InMemoryTransport {
    let mut t = connect(server).await;
    t.send_line(&format!("HANDSHAKE;{}", name)).await.unwrap();
    expect(&mut t, "HANDSHAKE").await;
    t
}

/// Pair alice (moves first) with bob and get both boards accepted.
async fn started_game(config: &GameConfig) -> (Arc<Server>, InMemoryTransport, InMemoryTransport) {
    let server = Server::new(config.clone());
    let mut alice = join(&server, "alice").await;
    let mut bob = join(&server, "bob").await;
    expect(&mut alice, "ENEMYNAME;bob").await;
    expect(&mut bob, "ENEMYNAME;alice").await;
    alice.send_line(&board_line(config, 0, 0)).await.unwrap();
    bob.send_line(&board_line(config, 0, 5)).await.unwrap();
    expect(&mut alice, "SETUP;alice").await;
    expect(&mut bob, "SETUP;alice").await;
    (server, alice, bob)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_name_collision_blocks_pairing() {
    let server = Server::new(destroyer_config());
    let mut alice = join(&server, "alice").await;

    let mut other = connect(&server).await;
    other.send_line("HANDSHAKE;alice").await.unwrap();
    expect(&mut other, "NAME_EXISTS").await;
    assert!(timeout(Duration::from_millis(100), alice.recv_line())
        .await
        .is_err());

    other.send_line("HANDSHAKE;bob").await.unwrap();
    expect(&mut other, "HANDSHAKE").await;
    expect(&mut alice, "ENEMYNAME;bob").await;
    expect(&mut other, "ENEMYNAME;alice").await;
    assert!(server.lobby().is_registered("alice").await);
    assert!(server.lobby().is_registered("bob").await);
}

async fn wait_until_free(server: &Arc<Server>, name: &str) {
    timeout(Duration::from_secs(5), async {
        while server.lobby().is_registered(name).await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("name was never released");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_waiting_client_disconnect_frees_name_and_slot() {
    let server = Server::new(destroyer_config());
    let alice = join(&server, "alice").await;
    timeout(Duration::from_secs(5), async {
        while server.lobby().waiting().await.is_none() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("alice was never parked");
    assert_eq!(server.lobby().waiting().await.as_deref(), Some("alice"));
    drop(alice);
    wait_until_free(&server, "alice").await;
    assert_eq!(server.lobby().waiting().await, None);

    let mut again = join(&server, "alice").await;
    let mut bob = join(&server, "bob").await;
    expect(&mut again, "ENEMYNAME;bob").await;
    expect(&mut bob, "ENEMYNAME;alice").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_waiting_client_can_exit() {
    let server = Server::new(destroyer_config());
    let mut alice = join(&server, "alice").await;

    alice.send_line("MOVE;A1").await.unwrap();
    assert!(next_line(&mut alice).await.unwrap().starts_with("ERROR;"));
    assert_eq!(server.lobby().waiting().await.as_deref(), Some("alice"));

    alice.send_line("EXIT").await.unwrap();
    assert_eq!(next_line(&mut alice).await, None);
    wait_until_free(&server, "alice").await;
    assert_eq!(server.lobby().waiting().await, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_handshake_recovers_from_bad_lines() {
    let server = Server::new(destroyer_config());
    let mut t = connect(&server).await;
    t.send_line("HELLO;there").await.unwrap();
    assert!(next_line(&mut t).await.unwrap().starts_with("ERROR;"));
    t.send_line("MOVE;A1").await.unwrap();
    assert!(next_line(&mut t).await.unwrap().starts_with("ERROR;"));
    t.send_line("HANDSHAKE;carol").await.unwrap();
    expect(&mut t, "HANDSHAKE").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_game_over_the_wire() {
    let config = destroyer_config();
    let (server, mut alice, mut bob) = started_game(&config).await;

    // bob is not on turn yet
    bob.send_line("MOVE;A1").await.unwrap();
    expect(&mut bob, "LATE_MOVE").await;

    let rounds = [("J10", "A1"), ("J9", "B1")];
    for (alice_move, bob_move) in rounds {
        alice
            .send_line(&format!("MOVE;{}", alice_move))
            .await
            .unwrap();
        let update = next_line(&mut alice).await.unwrap();
        assert!(update.starts_with("UPDATE;9;"), "{}", update);
        assert!(update.ends_with(";false;false;false;alice;bob"), "{}", update);
        assert_eq!(next_line(&mut bob).await.unwrap(), update);

        bob.send_line(&format!("MOVE;{}", bob_move)).await.unwrap();
        let update = next_line(&mut bob).await.unwrap();
        assert!(update.ends_with(";0;true;false;false;bob;alice"), "{}", update);
        assert_eq!(next_line(&mut alice).await.unwrap(), update);
    }

    alice.send_line("MOVE;J8").await.unwrap();
    expect(&mut alice, "UPDATE;9;7;false;false;false;alice;bob").await;
    expect(&mut bob, "UPDATE;9;7;false;false;false;alice;bob").await;

    bob.send_line("MOVE;C1").await.unwrap();
    expect(&mut alice, "UPDATE;2;0;true;true;true;bob;alice").await;
    expect(&mut bob, "UPDATE;2;0;true;true;true;bob;alice").await;
    expect(&mut alice, "GAMEOVER;bob;false").await;
    expect(&mut bob, "GAMEOVER;bob;true").await;
    assert_eq!(next_line(&mut alice).await, None);
    assert_eq!(next_line(&mut bob).await, None);

    // names are free again once the session is gone
    let _carol = join(&server, "alice").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_hit_keeps_the_turn_by_default() {
    let config = GameConfig::default()
        .with_size(10, 10)
        .with_fleet(&[(ShipKind::Destroyer, 1)]);
    assert_eq!(config.turn_rule, TurnRule::ExtraTurnOnHit);
    let (_server, mut alice, mut bob) = started_game(&config).await;

    alice.send_line("MOVE;A6").await.unwrap();
    expect(&mut alice, "UPDATE;0;5;true;false;false;alice;alice").await;
    expect(&mut bob, "UPDATE;0;5;true;false;false;alice;alice").await;

    bob.send_line("MOVE;A1").await.unwrap();
    expect(&mut bob, "LATE_MOVE").await;

    alice.send_line("MOVE;J10").await.unwrap();
    expect(&mut alice, "UPDATE;9;9;false;false;false;alice;bob").await;
    expect(&mut bob, "UPDATE;9;9;false;false;false;alice;bob").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_disconnect_aborts_for_survivor() {
    let config = destroyer_config();
    let (_server, mut alice, bob) = started_game(&config).await;
    drop(bob);
    expect(&mut alice, "GAMEOVER;;false").await;
    assert_eq!(next_line(&mut alice).await, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_exit_during_play_aborts() {
    let config = destroyer_config();
    let (_server, mut alice, mut bob) = started_game(&config).await;
    alice.send_line("EXIT").await.unwrap();
    expect(&mut bob, "GAMEOVER;;false").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bad_move_is_fatal() {
    let config = destroyer_config();
    let (_server, mut alice, mut bob) = started_game(&config).await;
    alice.send_line("MOVE;Z99").await.unwrap();
    assert!(next_line(&mut alice).await.unwrap().starts_with("ERROR;"));
    expect(&mut alice, "GAMEOVER;;false").await;
    expect(&mut bob, "GAMEOVER;;false").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_repeated_shot_is_fatal() {
    let config = destroyer_config();
    let (_server, mut alice, mut bob) = started_game(&config).await;
    alice.send_line("MOVE;E5").await.unwrap();
    next_line(&mut alice).await.unwrap();
    next_line(&mut bob).await.unwrap();
    bob.send_line("MOVE;E5").await.unwrap();
    next_line(&mut alice).await.unwrap();
    next_line(&mut bob).await.unwrap();

    alice.send_line("MOVE;E5").await.unwrap();
    assert!(next_line(&mut alice).await.unwrap().starts_with("ERROR;"));
    expect(&mut alice, "GAMEOVER;;false").await;
    expect(&mut bob, "GAMEOVER;;false").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_board_can_be_resubmitted() {
    let config = destroyer_config();
    let server = Server::new(config.clone());
    let mut alice = join(&server, "alice").await;
    let mut bob = join(&server, "bob").await;
    expect(&mut alice, "ENEMYNAME;bob").await;
    expect(&mut bob, "ENEMYNAME;alice").await;

    let water = vec!["WATER"; 100].join(";");
    alice
        .send_line(&format!("CLIENTBOARD;{}", water))
        .await
        .unwrap();
    let reply = next_line(&mut alice).await.unwrap();
    assert!(reply.starts_with("ERROR;"), "{}", reply);

    alice.send_line(&board_line(&config, 0, 0)).await.unwrap();
    bob.send_line(&board_line(&config, 0, 5)).await.unwrap();
    expect(&mut alice, "SETUP;alice").await;
    expect(&mut bob, "SETUP;alice").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_exit_during_setup_aborts() {
    let config = destroyer_config();
    let server = Server::new(config.clone());
    let mut alice = join(&server, "alice").await;
    let mut bob = join(&server, "bob").await;
    expect(&mut alice, "ENEMYNAME;bob").await;
    expect(&mut bob, "ENEMYNAME;alice").await;
    alice.send_line(&board_line(&config, 0, 0)).await.unwrap();
    bob.send_line("EXIT").await.unwrap();
    expect(&mut alice, "GAMEOVER;;false").await;
}

/// Fires a fixed list of shots and records everything it is told.
struct Scripted {
    name: String,
    moves: Vec<Coordinate>,
    notices: Vec<ShotNotice>,
    rejections: Vec<MoveRejection>,
    outcome: Option<GameOutcome>,
}

impl Scripted {
    fn new(name: &str, moves: &[(usize, usize)]) -> Self {
        Self {
            name: name.to_string(),
            moves: moves.iter().rev().map(|&(x, y)| Coordinate::new(x, y)).collect(),
            notices: Vec::new(),
            rejections: Vec::new(),
            outcome: None,
        }
    }
}

#[async_trait::async_trait]
impl Player for Scripted {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_move(&mut self, _view: &FogBoard) -> anyhow::Result<Turn> {
        Ok(self.moves.pop().map(Turn::Fire).unwrap_or(Turn::Exit))
    }

    async fn shot_resolved(&mut self, notice: &ShotNotice) -> anyhow::Result<()> {
        self.notices.push(notice.clone());
        Ok(())
    }

    async fn move_rejected(&mut self, reason: &MoveRejection) -> anyhow::Result<()> {
        self.rejections.push(*reason);
        Ok(())
    }

    async fn game_over(&mut self, outcome: &GameOutcome) -> anyhow::Result<()> {
        self.outcome = Some(outcome.clone());
        Ok(())
    }
}

fn local_match(config: &GameConfig) -> Match {
    let board = |x, y| {
        Board::with_layout(
            config,
            &[PlacedShip::new(ShipKind::Destroyer, x, y, Orientation::Horizontal)],
        )
        .unwrap()
    };
    Match::new(board(0, 0), board(0, 5), Side::First, config.turn_rule)
}

#[tokio::test]
async fn test_play_with_local_players() {
    let config = destroyer_config();
    let mut game = local_match(&config);
    let mut a = Scripted::new("a", &[(9, 9), (9, 8), (9, 7)]);
    let mut b = Scripted::new("b", &[(0, 0), (1, 0), (2, 0)]);

    let status = play(&mut game, &mut a, &mut b).await.unwrap();
    assert_eq!(status, MatchStatus::Won(Side::Second));

    let hits: Vec<(bool, bool)> = b
        .notices
        .iter()
        .filter(|n| n.own_shot)
        .map(|n| (n.hit, n.sunk))
        .collect();
    assert_eq!(hits, vec![(true, false), (true, false), (true, true)]);
    assert_eq!(a.notices.len(), 6);
    assert_eq!(a.notices, b.notices.iter().map(|n| ShotNotice {
        own_shot: !n.own_shot,
        my_turn: !n.my_turn,
        ..n.clone()
    }).collect::<Vec<_>>());
    assert!(a.notices.last().unwrap().game_over);
    assert_eq!(
        a.outcome,
        Some(GameOutcome {
            winner: Some("b".into()),
            won: false
        })
    );
    assert_eq!(
        b.outcome,
        Some(GameOutcome {
            winner: Some("b".into()),
            won: true
        })
    );
}

#[tokio::test]
async fn test_play_aborts_when_player_exits() {
    let config = destroyer_config();
    let mut game = local_match(&config);
    let mut a = Scripted::new("a", &[(9, 9)]);
    let mut b = Scripted::new("b", &[(9, 9)]);

    let status = play(&mut game, &mut a, &mut b).await.unwrap();
    assert_eq!(status, MatchStatus::Aborted);
    assert_eq!(a.outcome, Some(GameOutcome::aborted()));
    assert_eq!(b.outcome, Some(GameOutcome::aborted()));
}

#[tokio::test]
async fn test_play_aborts_on_repeated_shot() {
    let config = destroyer_config();
    let mut game = local_match(&config);
    let mut a = Scripted::new("a", &[(9, 9), (9, 9)]);
    let mut b = Scripted::new("b", &[(5, 5)]);

    let status = play(&mut game, &mut a, &mut b).await.unwrap();
    assert_eq!(status, MatchStatus::Aborted);
    assert_eq!(
        a.rejections,
        vec![MoveRejection::AlreadyShot(Coordinate::new(9, 9))]
    );
    assert_eq!(game.view(Side::First).shots_fired(), 1);
}

#[tokio::test]
async fn test_play_with_mixed_players() {
    let config = destroyer_config();
    let mut game = local_match(&config);
    let mut computer = ComputerPlayer::new("computer", SmallRng::seed_from_u64(5));
    let mut scripted = Scripted::new("scripted", &[(0, 0), (1, 0), (2, 0)]);

    let status = play(&mut game, &mut computer, &mut scripted).await.unwrap();
    assert!(matches!(status, MatchStatus::Won(_)));
    let outcome = scripted.outcome.expect("no game over");
    assert_eq!(outcome.won, status == MatchStatus::Won(Side::Second));
}
