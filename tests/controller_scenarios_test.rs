//! Scenario tests for the game controller.

use vanishing_tictactoe::{
    Board, BoardInvariants, BoardSnapshot, Cell, ConnectionId, Dispatch, GameController,
    InvariantSet, MAX_STONES_ON_BOARD, PLAYER_LEFT, Phase, Placement, Position, RawIndex,
    ServerEvent, Symbol, WinReport,
};

use proptest::prelude::*;

const A: u64 = 1;
const B: u64 = 2;

fn conn(n: u64) -> ConnectionId {
    ConnectionId::from(n)
}

fn at(index: usize) -> Position {
    Position::from_index(index).expect("index in range")
}

fn broadcasts(out: &[Dispatch]) -> Vec<ServerEvent> {
    out.iter()
        .filter_map(|d| match d {
            Dispatch::Broadcast(event) => Some(event.clone()),
            _ => None,
        })
        .collect()
}

fn assert_invariants(controller: &GameController) {
    assert!(
        BoardInvariants::check_all(controller.state()).is_ok(),
        "invariants violated: {:?}",
        BoardInvariants::check_all(controller.state())
    );
}

fn seated_pair() -> GameController {
    let mut controller = GameController::new();
    controller.on_connect(conn(A));
    controller.on_connect(conn(B));
    controller
}

fn play(controller: &mut GameController, moves: &[(u64, i64)]) -> Vec<Dispatch> {
    let mut last = Vec::new();
    for &(who, index) in moves {
        last = controller.on_move(conn(who), &RawIndex::from(index));
        assert!(!last.is_empty(), "move {index} by {who} was rejected");
        assert_invariants(controller);
    }
    last
}

fn reset_events() -> Vec<ServerEvent> {
    vec![
        ServerEvent::ClearMarks,
        ServerEvent::Reset(BoardSnapshot {
            board: Board::new(),
            current: Symbol::First,
        }),
    ]
}

#[test]
fn test_two_players_join_and_trade_moves() {
    let mut controller = GameController::new();

    let out = controller.on_connect(conn(A));
    assert_eq!(
        out,
        vec![
            Dispatch::Unicast(conn(A), ServerEvent::Assigned(Symbol::First)),
            Dispatch::Unicast(conn(A), ServerEvent::Board(controller.snapshot())),
        ]
    );

    let out = controller.on_connect(conn(B));
    assert_eq!(
        out,
        vec![
            Dispatch::Unicast(conn(B), ServerEvent::Assigned(Symbol::Second)),
            Dispatch::Unicast(conn(B), ServerEvent::Board(controller.snapshot())),
            Dispatch::Broadcast(ServerEvent::Turn(Symbol::First)),
        ]
    );
    assert_eq!(controller.phase(), Phase::InProgress);

    let out = controller.on_move(conn(A), &RawIndex::from(4));
    assert_eq!(
        broadcasts(&out),
        vec![
            ServerEvent::Update(Placement {
                index: Position::Center,
                player: Symbol::First,
            }),
            ServerEvent::ClearMarks,
            ServerEvent::Turn(Symbol::Second),
        ]
    );

    let out = controller.on_move(conn(B), &RawIndex::from("0"));
    assert_eq!(
        broadcasts(&out),
        vec![
            ServerEvent::Update(Placement {
                index: Position::TopLeft,
                player: Symbol::Second,
            }),
            ServerEvent::ClearMarks,
            ServerEvent::Turn(Symbol::First),
        ]
    );
    assert_invariants(&controller);
}

#[test]
fn test_eighth_move_evicts_oldest() {
    let mut controller = seated_pair();
    // First holds 0,1,4,5 and Second holds 2,3,6: no line for either.
    let seventh = play(
        &mut controller,
        &[(A, 0), (B, 2), (A, 1), (B, 3), (A, 4), (B, 6), (A, 5)],
    );
    assert_eq!(
        broadcasts(&seventh),
        vec![
            ServerEvent::Update(Placement {
                index: at(5),
                player: Symbol::First,
            }),
            ServerEvent::MarkOldest(Cell { index: at(0) }),
            ServerEvent::Turn(Symbol::Second),
        ]
    );

    let eighth = play(&mut controller, &[(B, 7)]);
    assert_eq!(
        broadcasts(&eighth),
        vec![
            ServerEvent::Update(Placement {
                index: at(7),
                player: Symbol::Second,
            }),
            ServerEvent::MarkOldest(Cell { index: at(0) }),
            ServerEvent::Remove(Cell { index: at(0) }),
            ServerEvent::MarkOldest(Cell { index: at(2) }),
            ServerEvent::Turn(Symbol::First),
        ]
    );
    assert!(controller.state().board().is_empty(at(0)));
    assert_eq!(
        controller.move_queue().iter().map(Position::to_index).collect::<Vec<_>>(),
        vec![2, 1, 3, 4, 6, 5, 7]
    );
}

#[test]
fn test_win_on_eviction_move_follows_remove() {
    let mut controller = seated_pair();
    // Second's 6 completes 2,4,6 on the eighth placement, which also evicts First's 0.
    let out = play(
        &mut controller,
        &[(A, 0), (B, 1), (A, 3), (B, 2), (A, 5), (B, 4), (A, 7), (B, 6)],
    );

    let mut expected = vec![
        ServerEvent::Update(Placement {
            index: at(6),
            player: Symbol::Second,
        }),
        ServerEvent::MarkOldest(Cell { index: at(0) }),
        ServerEvent::Remove(Cell { index: at(0) }),
        ServerEvent::MarkOldest(Cell { index: at(1) }),
        ServerEvent::Win(WinReport {
            winner: Symbol::Second,
            line: [at(2), at(4), at(6)],
        }),
    ];
    expected.extend(reset_events());
    assert_eq!(broadcasts(&out), expected);
    assert!(controller.move_queue().is_empty());
}

#[test]
fn test_diagonal_win_resets_round_but_keeps_seats() {
    let mut controller = seated_pair();
    let out = play(&mut controller, &[(A, 0), (B, 1), (A, 4), (B, 2), (A, 8)]);

    let mut expected = vec![
        ServerEvent::Update(Placement {
            index: at(8),
            player: Symbol::First,
        }),
        ServerEvent::ClearMarks,
        ServerEvent::Win(WinReport {
            winner: Symbol::First,
            line: [at(0), at(4), at(8)],
        }),
    ];
    expected.extend(reset_events());
    assert_eq!(broadcasts(&out), expected);

    assert_eq!(controller.registry().symbol_of(conn(A)), Some(Symbol::First));
    assert_eq!(controller.registry().symbol_of(conn(B)), Some(Symbol::Second));
    assert_eq!(controller.current_turn(), Symbol::First);
    assert!(controller.move_queue().is_empty());
    assert_eq!(controller.phase(), Phase::InProgress);
}

#[test]
fn test_disconnect_mid_game_frees_seat() {
    let mut controller = seated_pair();
    play(&mut controller, &[(A, 4), (B, 0)]);

    let out = controller.on_disconnect(conn(B));
    let mut expected = vec![ServerEvent::System(PLAYER_LEFT.to_string())];
    expected.extend(reset_events());
    assert_eq!(broadcasts(&out), expected);
    assert_eq!(controller.phase(), Phase::WaitingForPlayers);

    let out = controller.on_connect(conn(3));
    assert_eq!(out[0], Dispatch::Unicast(conn(3), ServerEvent::Assigned(Symbol::Second)));
    assert_eq!(out[2], Dispatch::Broadcast(ServerEvent::Turn(Symbol::First)));
}

#[test]
fn test_third_connection_never_assigned() {
    let mut controller = seated_pair();
    let out = controller.on_connect(conn(3));
    assert!(out.iter().all(|d| !matches!(
        d,
        Dispatch::Unicast(_, ServerEvent::Assigned(_)) | Dispatch::Broadcast(_)
    )));
    assert_eq!(out.first(), Some(&Dispatch::Unicast(conn(3), ServerEvent::RoomFull)));
    assert_eq!(out.last(), Some(&Dispatch::Close(conn(3))));
}

#[test]
fn test_rejected_moves_change_nothing() {
    let mut controller = seated_pair();
    play(&mut controller, &[(A, 4)]);
    let before = controller.state().clone();

    for (who, raw) in [
        (B, RawIndex::from(4)),    // occupied
        (A, RawIndex::from(0)),    // out of turn
        (B, RawIndex::from(9)),    // out of range
        (B, RawIndex::from(-1)),   // out of range
        (B, RawIndex::from("zz")), // unparseable
        (7, RawIndex::from(0)),    // unseated
    ] {
        assert!(controller.on_move(conn(who), &raw).is_empty());
        assert_eq!(controller.state(), &before);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_random_play_keeps_invariants(
        moves in prop::collection::vec((any::<bool>(), -1i64..=9), 1..400)
    ) {
        let mut controller = seated_pair();
        let mut placed: Vec<Position> = Vec::new();
        let mut evicted: Vec<Position> = Vec::new();
        let mut accepted_this_round = 0usize;

        for (first_seat, index) in moves {
            let who = if first_seat { A } else { B };
            let out = controller.on_move(conn(who), &RawIndex::from(index));

            for event in broadcasts(&out) {
                match event {
                    ServerEvent::Update(p) => {
                        placed.push(p.index);
                        accepted_this_round += 1;
                    }
                    ServerEvent::Remove(c) => evicted.push(c.index),
                    ServerEvent::Reset(_) => {
                        placed.clear();
                        evicted.clear();
                        accepted_this_round = 0;
                    }
                    _ => {}
                }
            }

            let check = BoardInvariants::check_all(controller.state());
            prop_assert!(check.is_ok(), "invariants violated: {:?}", check);
            prop_assert!(controller.move_queue().len() <= MAX_STONES_ON_BOARD);
            // Evictions replay placements oldest first.
            prop_assert_eq!(evicted.as_slice(), &placed[..evicted.len()]);
            let expected_turn = if accepted_this_round % 2 == 0 {
                Symbol::First
            } else {
                Symbol::Second
            };
            prop_assert_eq!(controller.current_turn(), expected_turn);
        }
    }
}
