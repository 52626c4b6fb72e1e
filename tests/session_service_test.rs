//! Tests for the session service lifecycle.

use strictly_rows::{
    BOARD_SIZE_LIMIT, GameError, GameSnapshot, GameStatus, Line, SessionRegistry, SessionService,
};

fn ids(game: &GameSnapshot) -> Vec<&str> {
    game.players.iter().map(|p| p.id().as_str()).collect()
}

fn marks(game: &GameSnapshot) -> Vec<&str> {
    game.players.iter().map(|p| p.mark().symbol()).collect()
}

fn turn(game: &GameSnapshot) -> &str {
    game.current_turn
        .as_ref()
        .map(|p| p.id().as_str())
        .expect("Turn pointer set")
}

/// Creates a game for `players` (first one founds it) and seats the rest.
fn started(service: &SessionService, size: usize, players: &[&str]) -> GameSnapshot {
    let game = service
        .create_game(size, players[0].into(), players[0].into(), players.len())
        .expect("Create failed");
    let mut last = game;
    for p in &players[1..] {
        last = service
            .join_game(&last.id, (*p).into(), (*p).into())
            .expect("Join failed");
    }
    last
}

#[test]
fn test_create_game_waiting_with_founder() {
    let service = SessionService::new();
    let game = service
        .create_game(5, "alice".into(), "Alice".into(), 3)
        .expect("Create failed");

    assert_eq!(game.status, GameStatus::Waiting);
    assert_eq!(game.board_size, 5);
    assert_eq!(game.target_players, 3);
    assert_eq!(ids(&game), vec!["alice"]);
    assert_eq!(marks(&game), vec!["X"]);
    assert_eq!(turn(&game), "alice");
    assert!(game.winner.is_none());
    assert_eq!(service.get_game(&game.id), Ok(game));
}

#[test]
fn test_create_game_ids_unique() {
    let service = SessionService::new();
    let a = service.create_game(3, "a".into(), "A".into(), 2).unwrap();
    let b = service.create_game(3, "a".into(), "A".into(), 2).unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(service.list_games().len(), 2);
}

#[test]
fn test_create_game_rejects_invalid_arguments() {
    let service = SessionService::new();
    for (size, count) in [(0, 2), (3, 1), (3, 0), (3, 10), (service.max_board_size() + 1, 2)] {
        let result = service.create_game(size, "a".into(), "A".into(), count);
        assert!(
            matches!(result, Err(GameError::InvalidArgument(_))),
            "size {size}, count {count}: {result:?}"
        );
    }
    assert!(service.list_games().is_empty());
}

#[test]
fn test_board_limit_clamped_for_huge_settings() {
    let service = SessionService::with_registry(SessionRegistry::new(), usize::MAX);
    assert_eq!(service.max_board_size(), BOARD_SIZE_LIMIT);

    for size in [1 << 33, BOARD_SIZE_LIMIT + 1] {
        let result = service.create_game(size, "a".into(), "A".into(), 2);
        assert!(
            matches!(result, Err(GameError::InvalidArgument(_))),
            "size {size}: {result:?}"
        );
    }
    let game = service
        .create_game(BOARD_SIZE_LIMIT, "a".into(), "A".into(), 2)
        .expect("Largest board accepted");
    assert_eq!(game.board.occupied(), 0);
}

#[test]
fn test_join_assigns_marks_in_order_and_activates_when_full() {
    let service = SessionService::new();
    let game = service
        .create_game(4, "a".into(), "A".into(), 3)
        .unwrap();

    let game = service.join_game(&game.id, "b".into(), "B".into()).unwrap();
    assert_eq!(game.status, GameStatus::Waiting);
    assert_eq!(marks(&game), vec!["X", "O"]);

    let game = service.join_game(&game.id, "c".into(), "C".into()).unwrap();
    assert_eq!(game.status, GameStatus::Active);
    assert_eq!(marks(&game), vec!["X", "O", "△"]);
    assert_eq!(turn(&game), "a");
}

#[test]
fn test_join_failures_do_not_mutate() {
    let service = SessionService::new();
    let game = started(&service, 3, &["a", "b"]);

    assert_eq!(
        service.join_game(&game.id, "c".into(), "C".into()),
        Err(GameError::SessionFull(game.id.clone()))
    );
    assert_eq!(
        service.join_game("missing", "c".into(), "C".into()),
        Err(GameError::NotFound("missing".into()))
    );
    assert_eq!(service.get_game(&game.id), Ok(game));
}

#[test]
fn test_duplicate_join_rejected() {
    let service = SessionService::new();
    let game = service.create_game(3, "a".into(), "A".into(), 3).unwrap();
    assert_eq!(
        service.join_game(&game.id, "a".into(), "A".into()),
        Err(GameError::DuplicateMember("a".into()))
    );
    assert_eq!(service.get_game(&game.id).unwrap().players.len(), 1);
}

#[test]
fn test_move_rejected_while_waiting() {
    let service = SessionService::new();
    let game = service.create_game(3, "a".into(), "A".into(), 2).unwrap();
    assert_eq!(
        service.make_move(&game.id, "a", 0, 0),
        Err(GameError::NotActive(GameStatus::Waiting))
    );
}

#[test]
fn test_illegal_moves_are_no_ops() {
    let service = SessionService::new();
    let game = started(&service, 3, &["a", "b"]);
    service.make_move(&game.id, "a", 1, 1).expect("Valid move");
    let before = service.get_game(&game.id).unwrap();

    let attempts = [
        ("a", 0, 0, GameError::OutOfTurn("b".into())),
        ("b", 1, 1, GameError::OccupiedCell { x: 1, y: 1 }),
        ("b", 3, 0, GameError::OutOfBounds { x: 3, y: 0, size: 3 }),
        ("b", 0, 7, GameError::OutOfBounds { x: 0, y: 7, size: 3 }),
        ("zed", 0, 0, GameError::NotMember("zed".into())),
    ];
    for (player, x, y, expected) in attempts {
        assert_eq!(service.make_move(&game.id, player, x, y), Err(expected));
        assert_eq!(service.get_game(&game.id).unwrap(), before);
    }
}

#[test]
fn test_turn_rotates_cyclically() {
    let service = SessionService::new();
    let game = started(&service, 5, &["a", "b", "c"]);

    let expected_next = ["b", "c", "a", "b", "c", "a"];
    let cells = [(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)];
    let mut mover = "a";
    for ((x, y), next) in cells.into_iter().zip(expected_next) {
        let outcome = service.make_move(&game.id, mover, x, y).expect("Valid move");
        assert_eq!(turn(&outcome.snapshot), next);
        assert_eq!(outcome.snapshot.status, GameStatus::Active);
        mover = next;
    }
}

#[test]
fn test_row_win_example() {
    let service = SessionService::new();
    let game = started(&service, 3, &["x", "o"]);

    let moves = [("x", 0, 0), ("o", 1, 1), ("x", 0, 1), ("o", 2, 2)];
    for (player, x, y) in moves {
        let outcome = service.make_move(&game.id, player, x, y).expect("Valid move");
        assert!(!outcome.finished());
    }

    let outcome = service.make_move(&game.id, "x", 0, 2).expect("Winning move");
    assert_eq!(outcome.snapshot.status, GameStatus::Finished);
    assert_eq!(outcome.line, Some(Line::Row(0)));
    let winner = outcome.snapshot.winner.as_ref().expect("Winner set");
    assert_eq!(winner.id(), "x");
    assert_eq!(winner.mark().symbol(), "X");

    assert_eq!(
        service.make_move(&game.id, "o", 2, 0),
        Err(GameError::NotActive(GameStatus::Finished))
    );
}

#[test]
fn test_full_board_is_draw() {
    let service = SessionService::new();
    let game = started(&service, 3, &["x", "o"]);

    // X O X / X O O / O X X
    let moves = [
        ("x", 0, 0),
        ("o", 0, 1),
        ("x", 0, 2),
        ("o", 1, 1),
        ("x", 1, 0),
        ("o", 2, 0),
        ("x", 2, 1),
        ("o", 1, 2),
    ];
    for (player, x, y) in moves {
        let outcome = service.make_move(&game.id, player, x, y).expect("Valid move");
        assert!(!outcome.finished(), "finished early at ({x}, {y})");
    }

    let outcome = service.make_move(&game.id, "x", 2, 2).expect("Last move");
    assert_eq!(outcome.snapshot.status, GameStatus::Finished);
    assert!(outcome.snapshot.winner.is_none());
    assert!(outcome.snapshot.is_draw());
    assert_eq!(outcome.line, None);
}

#[test]
fn test_three_player_diagonal_win() {
    let service = SessionService::new();
    let game = started(&service, 3, &["a", "b", "c"]);

    let moves = [
        ("a", 0, 2),
        ("b", 0, 0),
        ("c", 0, 1),
        ("a", 1, 1),
        ("b", 1, 0),
        ("c", 2, 2),
    ];
    for (player, x, y) in moves {
        service.make_move(&game.id, player, x, y).expect("Valid move");
    }
    let outcome = service.make_move(&game.id, "a", 2, 0).expect("Winning move");
    assert_eq!(outcome.line, Some(Line::AntiDiagonal));
    assert_eq!(outcome.snapshot.winner.unwrap().id(), "a");
}

#[test]
fn test_leave_active_game_drops_it() {
    for leaver in ["a", "b"] {
        let service = SessionService::new();
        let game = started(&service, 3, &["a", "b"]);

        let outcome = service.leave_game(&game.id, leaver).expect("Leave failed");
        assert!(outcome.dropped);
        assert_eq!(outcome.notify, vec!["a".to_string(), "b".to_string()]);
        // Final state is reported as it was when abandoned.
        assert_eq!(outcome.snapshot.status, GameStatus::Active);
        assert_eq!(outcome.snapshot.players.len(), 2);
        assert_eq!(
            service.get_game(&game.id),
            Err(GameError::NotFound(game.id.clone()))
        );
        assert!(service.registry().get(&game.id).is_none());
    }
}

#[test]
fn test_leave_waiting_game_keeps_it_until_empty() {
    let service = SessionService::new();
    let game = service.create_game(3, "a".into(), "A".into(), 3).unwrap();
    service.join_game(&game.id, "b".into(), "B".into()).unwrap();

    let outcome = service.leave_game(&game.id, "a").expect("Leave failed");
    assert!(!outcome.dropped);
    assert_eq!(ids(&outcome.snapshot), vec!["b"]);
    assert_eq!(turn(&outcome.snapshot), "b");
    assert_eq!(outcome.snapshot.status, GameStatus::Waiting);

    let outcome = service.leave_game(&game.id, "b").expect("Leave failed");
    assert!(outcome.dropped);
    assert!(service.get_game(&game.id).is_err());
}

#[test]
fn test_freed_mark_is_reused_without_duplicates() {
    let service = SessionService::new();
    let game = service.create_game(3, "a".into(), "A".into(), 4).unwrap();
    service.join_game(&game.id, "b".into(), "B".into()).unwrap();
    service.join_game(&game.id, "c".into(), "C".into()).unwrap();
    service.leave_game(&game.id, "b").unwrap();

    let game = service.join_game(&game.id, "d".into(), "D".into()).unwrap();
    assert_eq!(marks(&game), vec!["X", "△", "O"]);
    assert_eq!(game.status, GameStatus::Waiting);
}

#[test]
fn test_leave_finished_game_is_bookkeeping() {
    let service = SessionService::new();
    let game = started(&service, 1, &["a", "b"]);
    let outcome = service.make_move(&game.id, "a", 0, 0).unwrap();
    assert!(outcome.finished());

    let outcome = service.leave_game(&game.id, "a").unwrap();
    assert!(!outcome.dropped);
    assert_eq!(ids(&outcome.snapshot), vec!["b"]);
    assert_eq!(outcome.snapshot.winner.unwrap().id(), "a");

    let outcome = service.leave_game(&game.id, "b").unwrap();
    assert!(outcome.dropped);
    assert!(service.list_games().is_empty());
}

#[test]
fn test_leave_errors() {
    let service = SessionService::new();
    let game = started(&service, 3, &["a", "b"]);
    assert_eq!(
        service.leave_game("missing", "a"),
        Err(GameError::NotFound("missing".into()))
    );
    assert_eq!(
        service.leave_game(&game.id, "zed"),
        Err(GameError::NotMember("zed".into()))
    );
    assert_eq!(service.get_game(&game.id).unwrap().status, GameStatus::Active);
}

#[test]
fn test_disconnect_leaves_every_seat() {
    let service = SessionService::new();
    let active = started(&service, 3, &["p", "q"]);
    let waiting = service.create_game(3, "r".into(), "R".into(), 3).unwrap();
    service.join_game(&waiting.id, "p".into(), "P".into()).unwrap();
    let untouched = started(&service, 3, &["s", "t"]);

    let mut outcomes = service.disconnect("p");
    outcomes.sort_by_key(|o| o.dropped);
    assert_eq!(outcomes.len(), 2);

    assert!(!outcomes[0].dropped);
    assert_eq!(outcomes[0].snapshot.id, waiting.id);
    assert_eq!(ids(&outcomes[0].snapshot), vec!["r"]);

    assert!(outcomes[1].dropped);
    assert_eq!(outcomes[1].snapshot.id, active.id);

    assert!(service.get_game(&active.id).is_err());
    assert!(service.get_game(&untouched.id).is_ok());
    assert!(service.disconnect("nobody").is_empty());
}

#[test]
fn test_drop_game_is_idempotent() {
    let service = SessionService::new();
    let game = started(&service, 3, &["a", "b"]);
    assert!(service.drop_game(&game.id));
    assert!(!service.drop_game(&game.id));
    assert_eq!(
        service.join_game(&game.id, "c".into(), "C".into()),
        Err(GameError::NotFound(game.id.clone()))
    );
}
