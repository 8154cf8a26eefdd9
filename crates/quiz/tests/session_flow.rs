use proptest::prelude::*;

use quizroom::{
    ClientCommand, Input, Intent, QuestionPayload, ResultEntry, Role, RoomCode, ServerEvent,
    Session, SessionError, SessionState,
};

fn question(index: u32) -> ServerEvent {
    ServerEvent::Question(QuestionPayload {
        text: "2+2?".to_string(),
        options: vec!["3".to_string(), "4".to_string(), "5".to_string()],
        question: index,
        total: 5,
    })
}

fn results() -> Vec<ResultEntry> {
    vec![
        ResultEntry {
            name: "Alice".to_string(),
            score: 300,
        },
        ResultEntry {
            name: "Bob".to_string(),
            score: 150,
        },
    ]
}

fn created() -> ServerEvent {
    ServerEvent::Created {
        pin: RoomCode::new("4821"),
    }
}

fn submit(pin: &str, name: &str) -> Input {
    Input::Intent(Intent::SubmitJoin {
        pin: pin.to_string(),
        name: name.to_string(),
    })
}

fn drive(inputs: Vec<Input>) -> Session {
    let mut session = Session::new();
    for input in inputs {
        session.apply(input).unwrap();
    }
    session
}

/// One session per state, each reached through real inputs.
fn session_in(state: SessionState) -> Session {
    use SessionState as S;

    let host = || -> Vec<Input> { vec![Intent::Host.into(), created().into()] };
    let player = || -> Vec<Input> {
        vec![
            Intent::Join.into(),
            submit("4821", "Bob"),
            ServerEvent::Joined.into(),
        ]
    };

    let session = match state {
        S::Start => Session::new(),
        S::AwaitingRoomPin => drive(vec![Intent::Join.into(), submit("4821", "Bob")]),
        S::HostWaiting => drive(vec![Intent::Host.into()]),
        S::HostWaitingWithRoster => drive(host()),
        S::InGameHost => drive([host(), vec![question(0).into()]].concat()),
        S::GameOverHost => drive(
            [
                host(),
                vec![question(0).into(), ServerEvent::GameOver { results: results() }.into()],
            ]
            .concat(),
        ),
        S::PlayerWaitingForStart => drive(player()),
        S::InGamePlayer => drive([player(), vec![question(0).into()]].concat()),
        S::GameOverPlayer => drive(
            [
                player(),
                vec![question(0).into(), ServerEvent::GameOver { results: results() }.into()],
            ]
            .concat(),
        ),
    };
    assert_eq!(session.state(), state);
    session
}

fn accepts(state: SessionState, event: &ServerEvent) -> bool {
    use SessionState as S;

    matches!(
        (state, event),
        (S::HostWaiting, ServerEvent::Created { .. })
            | (S::HostWaitingWithRoster, ServerEvent::PlayerJoined { .. })
            | (S::AwaitingRoomPin, ServerEvent::Joined)
            | (
                S::HostWaitingWithRoster
                    | S::InGameHost
                    | S::PlayerWaitingForStart
                    | S::InGamePlayer,
                ServerEvent::Question(_)
            )
            | (S::InGameHost | S::InGamePlayer, ServerEvent::GameOver { .. })
    )
}

#[test]
fn test_host_flow() {
    let mut session = Session::new();

    let commands = session.apply(Intent::Host.into()).unwrap();
    assert_eq!(commands, vec![ClientCommand::Create]);

    session.apply(created().into()).unwrap();
    assert_eq!(session.state(), SessionState::HostWaitingWithRoster);
    assert_eq!(session.room_code(), Some(&RoomCode::new("4821")));

    session
        .apply(
            ServerEvent::PlayerJoined {
                name: "Alice".to_string(),
            }
            .into(),
        )
        .unwrap();
    assert_eq!(session.roster().to_vec(), vec!["Alice".to_string()]);

    let commands = session.apply(Intent::StartGame.into()).unwrap();
    assert_eq!(
        serde_json::to_value(&commands[0]).unwrap(),
        serde_json::json!({"type": "start", "pin": "4821"})
    );

    session.apply(question(0).into()).unwrap();
    assert_eq!(session.state(), SessionState::InGameHost);
    assert_eq!(session.question_index(), 0);
    assert_eq!(session.question().unwrap().text, "2+2?");
}

#[test]
fn test_player_flow() {
    let mut session = Session::new();

    assert!(session.apply(Intent::Join.into()).unwrap().is_empty());
    assert_eq!(session.state(), SessionState::AwaitingRoomPin);

    let commands = session.apply(submit("4821", "Bob")).unwrap();
    assert_eq!(
        serde_json::to_value(&commands[0]).unwrap(),
        serde_json::json!({"type": "join", "pin": "4821", "name": "Bob"})
    );
    assert_eq!(session.state(), SessionState::AwaitingRoomPin);

    session.apply(ServerEvent::Joined.into()).unwrap();
    assert_eq!(session.state(), SessionState::PlayerWaitingForStart);

    session.apply(question(0).into()).unwrap();
    assert_eq!(session.state(), SessionState::InGamePlayer);

    let commands = session.apply(Intent::SelectOption(2).into()).unwrap();
    assert_eq!(
        serde_json::to_value(&commands[0]).unwrap(),
        serde_json::json!({"type": "answer", "pin": "4821", "answer": 2})
    );
}

#[test]
fn test_game_over_preserves_result_order() {
    let mut session = session_in(SessionState::InGameHost);

    session
        .apply(ServerEvent::GameOver { results: results() }.into())
        .unwrap();

    assert_eq!(session.state(), SessionState::GameOverHost);
    let names: Vec<&str> = session
        .results()
        .unwrap()
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, ["Alice", "Bob"]);
}

#[test]
fn test_unlisted_events_leave_session_unchanged() {
    let events = [
        created(),
        ServerEvent::PlayerJoined {
            name: "Zed".to_string(),
        },
        ServerEvent::Joined,
        question(3),
        ServerEvent::GameOver {
            results: Vec::new(),
        },
        ServerEvent::Unknown,
    ];

    for state in SessionState::ALL {
        for event in &events {
            let mut session = session_in(state);
            let before = session.clone();
            let result = session.apply(event.clone().into());

            if accepts(state, event) {
                assert!(result.is_ok(), "{:?} should accept {:?}", state, event);
            } else {
                assert!(
                    matches!(result, Err(SessionError::InvalidTransition { .. })),
                    "{:?} should reject {:?}",
                    state,
                    event
                );
                assert_eq!(session, before);
            }
        }
    }
}

#[test]
fn test_empty_join_never_sends() {
    let mut session = session_in(SessionState::Start);
    session.apply(Intent::Join.into()).unwrap();
    let before = session.clone();

    for (pin, name) in [("", "Bob"), ("4821", ""), ("", "")] {
        assert!(session.apply(submit(pin, name)).is_err());
        assert_eq!(session, before);
    }
}

fn input_strategy() -> impl Strategy<Value = Input> {
    prop_oneof![
        Just(Input::Intent(Intent::Host)),
        Just(Input::Intent(Intent::Join)),
        (
            prop::sample::select(vec!["", "4821"]),
            prop::sample::select(vec!["", "Bob"])
        )
            .prop_map(|(pin, name)| submit(pin, name)),
        Just(Input::Intent(Intent::StartGame)),
        Just(Input::Intent(Intent::NextQuestion)),
        (0usize..4).prop_map(|i| Input::Intent(Intent::SelectOption(i))),
        Just(Input::Event(created())),
        Just(Input::Event(ServerEvent::PlayerJoined {
            name: "Alice".to_string()
        })),
        Just(Input::Event(ServerEvent::Joined)),
        (0u32..4).prop_map(|i| Input::Event(question(i))),
        Just(Input::Event(ServerEvent::GameOver { results: results() })),
        Just(Input::Event(ServerEvent::Unknown)),
    ]
}

proptest! {
    #[test]
    fn test_invariants_hold_for_any_input_sequence(
        inputs in prop::collection::vec(input_strategy(), 0..48)
    ) {
        let mut session = Session::new();

        for input in inputs {
            let before = session.clone();
            let empty_join = matches!(
                &input,
                Input::Intent(Intent::SubmitJoin { pin, name }) if pin.is_empty() || name.is_empty()
            );

            match session.apply(input) {
                Ok(commands) => {
                    prop_assert!(!empty_join);
                    if !commands.is_empty() && commands != vec![ClientCommand::Create] {
                        prop_assert!(session.room_code().is_some());
                    }
                }
                Err(_) => {
                    prop_assert_eq!(&session, &before);
                }
            }

            if before.role() != Role::Undetermined {
                prop_assert_eq!(session.role(), before.role());
            }
            prop_assert!(session.question_index() >= before.question_index());
            if let Some(results) = before.results() {
                prop_assert_eq!(session.results(), Some(results));
            }
        }
    }
}
