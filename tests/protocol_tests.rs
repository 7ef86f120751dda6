use broadside::{Command, Message, ProtocolCodec, ProtocolError, Update};

#[test]
fn test_decode_move() {
    let codec = ProtocolCodec::default();
    assert_eq!(
        codec.decode("MOVE;C5").unwrap(),
        Message::Move {
            token: "C5".to_string()
        }
    );
    assert_eq!(codec.decode("MOVE;C5\r\n").unwrap().command(), Command::Move);
}

#[test]
fn test_encode_examples() {
    let codec = ProtocolCodec::default();
    let update = Message::Update(Update {
        x: 2,
        y: 4,
        hit: true,
        sunk: false,
        game_over: false,
        shooter: "alice".into(),
        next: "bob".into(),
    });
    assert_eq!(
        codec.encode(&update).unwrap(),
        "UPDATE;2;4;true;false;false;alice;bob"
    );
    assert_eq!(codec.decode("UPDATE;2;4;true;false;false;alice;bob").unwrap(), update);

    assert_eq!(
        codec.encode(&Message::Handshake { name: None }).unwrap(),
        "HANDSHAKE"
    );
    assert_eq!(
        codec
            .encode(&Message::Handshake {
                name: Some("alice".into())
            })
            .unwrap(),
        "HANDSHAKE;alice"
    );
    assert_eq!(
        codec
            .encode(&Message::GameOver {
                winner: None,
                won: false
            })
            .unwrap(),
        "GAMEOVER;;false"
    );
    assert_eq!(codec.encode(&Message::LateMove).unwrap(), "LATE_MOVE");
    assert_eq!(codec.encode(&Message::NameExists).unwrap(), "NAME_EXISTS");
}

#[test]
fn test_decode_game_over_and_setup() {
    let codec = ProtocolCodec::default();
    assert_eq!(
        codec.decode("GAMEOVER;;false").unwrap(),
        Message::GameOver {
            winner: None,
            won: false
        }
    );
    assert_eq!(
        codec.decode("GAMEOVER;bob;true").unwrap(),
        Message::GameOver {
            winner: Some("bob".into()),
            won: true
        }
    );
    assert_eq!(
        codec.decode("SETUP;alice").unwrap(),
        Message::Setup {
            first: "alice".into()
        }
    );
    assert_eq!(
        codec.decode("CLIENTBOARD;WATER;PATROL;WATER").unwrap(),
        Message::ClientBoard {
            fields: vec!["WATER".into(), "PATROL".into(), "WATER".into()]
        }
    );
}

#[test]
fn test_decode_errors_name_the_line() {
    let codec = ProtocolCodec::default();
    assert_eq!(codec.decode("").unwrap_err(), ProtocolError::Empty);
    assert_eq!(
        codec.decode("FIRE;C5").unwrap_err(),
        ProtocolError::UnknownCommand {
            line: "FIRE;C5".into()
        }
    );
    assert_eq!(
        codec.decode("MOVE").unwrap_err(),
        ProtocolError::Arity {
            command: Command::Move,
            expected: 1,
            found: 0,
            line: "MOVE".into()
        }
    );
    assert_eq!(
        codec.decode("MOVE;C5;D6").unwrap_err(),
        ProtocolError::Arity {
            command: Command::Move,
            expected: 1,
            found: 2,
            line: "MOVE;C5;D6".into()
        }
    );
    assert!(matches!(
        codec.decode("UPDATE;2;4;yes;false;false;alice;bob").unwrap_err(),
        ProtocolError::BadArgument {
            command: Command::Update,
            ..
        }
    ));
    assert!(matches!(
        codec.decode("UPDATE;-2;4;true;false;false;alice;bob").unwrap_err(),
        ProtocolError::BadArgument { .. }
    ));
    assert!(matches!(
        codec.decode("HANDSHAKE;").unwrap_err(),
        ProtocolError::BadArgument { .. }
    ));
    assert!(matches!(
        codec.decode("CLIENTBOARD").unwrap_err(),
        ProtocolError::Arity { .. }
    ));
    assert!(matches!(
        codec.decode("EXIT;now").unwrap_err(),
        ProtocolError::Arity { .. }
    ));
}

#[test]
fn test_encode_rejects_reserved_characters() {
    let codec = ProtocolCodec::default();
    assert_eq!(
        codec
            .encode(&Message::Handshake {
                name: Some("al;ice".into())
            })
            .unwrap_err(),
        ProtocolError::IllegalCharacter {
            value: "al;ice".into()
        }
    );
    assert!(codec
        .encode(&Message::EnemyName {
            name: "bob\nMOVE;A1".into()
        })
        .is_err());

    // free-text reasons are cleaned instead of refused
    let line = codec
        .encode(&Message::Error {
            reason: "bad;thing\nhappened".into(),
        })
        .unwrap();
    assert_eq!(line, "ERROR;bad thing happened");
}

#[test]
fn test_custom_delimiter() {
    let codec = ProtocolCodec::new('|');
    assert_eq!(
        codec.encode(&Message::Move { token: "A1".into() }).unwrap(),
        "MOVE|A1"
    );
    assert_eq!(
        codec.decode("ENEMYNAME|a;b").unwrap(),
        Message::EnemyName { name: "a;b".into() }
    );
}

#[test]
fn test_every_keyword_resolves() {
    for command in Command::ALL {
        assert_eq!(Command::from_keyword(command.keyword()), Some(command));
    }
    assert_eq!(Command::from_keyword("move"), None);
}
