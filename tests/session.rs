use quadtris::board::{BOARD_HEIGHT, BOARD_WIDTH, Cell, Position};
use quadtris::game::{Action, Game, GameState};
use quadtris::piece::{ActivePiece, Direction};
use quadtris::scheduler::Driver;
use quadtris::tetromino::TetrominoType;

use proptest::prelude::*;
use std::time::{Duration, Instant};

fn started(seed: u64, quad: bool) -> Game {
    let mut game = Game::with_options(seed, quad);
    game.apply(Action::Pause);
    game
}

/// The active piece must always sit in free space on its own board
fn assert_consistent(game: &Game) {
    match game.state {
        GameState::Running | GameState::Paused => {
            let piece = game.active.expect("running or paused game has a piece");
            assert!(
                !game
                    .mode
                    .board_for(piece.direction)
                    .collides(piece.position, &piece.shape)
            );
            assert_eq!(piece.direction.is_some(), game.is_quad());
        }
        GameState::NotStarted | GameState::GameOver | GameState::Abandoned => {
            assert!(game.active.is_none());
        }
    }
    assert_eq!(game.is_paused(), game.state != GameState::Running);
    assert!(game.level() >= 1);
}

#[test]
fn horizontal_i_drops_to_the_floor() {
    let mut game = started(7, false);
    game.active = Some(ActivePiece::spawn(TetrominoType::I, TetrominoType::I.shape()));

    for _ in 0..20 {
        game.apply(Action::Down);
    }

    let bottom = BOARD_HEIGHT as i32 - 1;
    for x in 4..8 {
        assert_eq!(game.board().get(x, bottom), Some(Cell::Filled(TetrominoType::I)));
    }
    assert_eq!(game.board().get(3, bottom), Some(Cell::Empty));
    assert_eq!(game.lines_cleared(), 0);
    assert_eq!(game.score(), 0);
    assert!(!game.is_over());
}

#[test]
fn restart_from_any_state_is_a_clean_slate() {
    let setups: [fn(&mut Game); 4] = [
        |_| {},
        |g| g.apply(Action::Pause),
        |g| {
            g.apply(Action::Pause);
            g.apply(Action::Pause);
        },
        |g| {
            g.apply(Action::Pause);
            g.apply(Action::Quit);
        },
    ];

    for setup in setups {
        for quad in [false, true] {
            let mut game = Game::with_options(31, quad);
            setup(&mut game);
            game.mode
                .board_for_mut(Some(Direction::Down))
                .set(0, 19, Cell::Filled(TetrominoType::S));
            game.progress.lines = 27;
            game.progress.level = 3;

            game.apply(Action::Restart);

            assert_eq!(game.score(), 0);
            assert_eq!(game.level(), 1);
            assert_eq!(game.lines_cleared(), 0);
            assert!(!game.is_over());
            assert_eq!(game.is_quad(), quad);
            for d in Direction::all() {
                assert!(game.mode.board_for(Some(d)).is_empty());
            }
            assert_consistent(&game);
        }
    }
}

#[test]
fn stacking_to_the_top_ends_the_game() {
    let mut game = started(99, false);
    let mut locks = 0;
    // Hard-drop every piece in place until the column overflows
    while !game.is_over() && locks < 200 {
        for _ in 0..BOARD_HEIGHT + 4 {
            game.apply(Action::Down);
        }
        locks += 1;
    }

    assert_eq!(game.state, GameState::GameOver);
    assert!(game.active.is_none());
    assert!(game.is_paused());
    // Moves after game over change nothing
    let before = game.snapshot();
    game.apply(Action::Left);
    game.apply(Action::Rotate);
    game.drop_tick();
    assert_eq!(game.snapshot(), before);
}

#[test]
fn same_seed_same_game() {
    let script = [
        Action::Left,
        Action::Rotate,
        Action::Down,
        Action::Right,
        Action::Right,
        Action::Down,
    ];
    let play = |seed| {
        let mut game = started(seed, true);
        for _ in 0..40 {
            for action in script {
                game.apply(action);
            }
            game.drop_tick();
        }
        game.snapshot()
    };
    assert_eq!(play(2024), play(2024));
}

#[test]
fn quad_arms_clear_independently() {
    let mut game = started(3, true);
    let bottom = BOARD_HEIGHT as i32 - 1;
    {
        let right = game.mode.board_for_mut(Some(Direction::Right));
        for x in 2..BOARD_WIDTH as i32 {
            right.set(x, bottom, Cell::Filled(TetrominoType::J));
        }
    }
    {
        let down = game.mode.board_for_mut(Some(Direction::Down));
        for x in 2..BOARD_WIDTH as i32 {
            down.set(x, bottom, Cell::Filled(TetrominoType::J));
        }
    }
    game.active = Some(ActivePiece {
        kind: TetrominoType::O,
        position: Position::new(0, bottom - 1),
        shape: TetrominoType::O.shape(),
        direction: Some(Direction::Right),
    });

    game.drop_tick();

    assert_eq!(game.lines_cleared(), 1);
    assert_eq!(game.score(), 100);
    assert_eq!(game.snapshot().quad_scores.right, 100);
    // The DOWN arm's identical row is untouched
    assert_eq!(
        game.mode.board_for(Some(Direction::Down)).get(9, bottom),
        Some(Cell::Filled(TetrominoType::J))
    );
}

#[test]
fn driver_speeds_up_with_level() {
    let start = Instant::now();
    let mut driver = Driver::new(Game::with_seed(12), start);
    driver.dispatch(Action::Pause, start);
    assert_eq!(driver.scheduler().interval(), Some(Duration::from_millis(800)));

    driver.game.progress.level = 3;
    driver.advance(start + Duration::from_millis(10));
    assert_eq!(driver.scheduler().interval(), Some(Duration::from_millis(600)));
    assert_eq!(
        driver.time_until_due(start + Duration::from_millis(10)),
        Some(Duration::from_millis(600))
    );
}

#[test]
fn quit_then_toggle_keeps_final_board() {
    let mut game = started(17, false);
    game.mode.board_for_mut(None).set(5, 19, Cell::Filled(TetrominoType::T));
    game.apply(Action::Quit);
    game.apply(Action::ToggleQuadMode);

    assert!(game.is_quad());
    assert!(game.is_over());
    assert_eq!(
        game.mode.board_for(Some(Direction::Down)).get(5, 19),
        Some(Cell::Filled(TetrominoType::T))
    );
}

fn any_action() -> impl Strategy<Value = Option<Action>> {
    prop_oneof![
        8 => Just(None),
        4 => Just(Some(Action::Left)),
        4 => Just(Some(Action::Right)),
        6 => Just(Some(Action::Down)),
        3 => Just(Some(Action::Rotate)),
        1 => Just(Some(Action::Pause)),
        1 => Just(Some(Action::Restart)),
        1 => Just(Some(Action::Quit)),
        1 => Just(Some(Action::ToggleQuadMode)),
    ]
}

proptest! {
    /// `None` stands for a drop tick
    #[test]
    fn prop_any_input_keeps_session_consistent(
        seed in any::<u64>(),
        quad in any::<bool>(),
        inputs in proptest::collection::vec(any_action(), 0..300),
    ) {
        let mut game = Game::with_options(seed, quad);
        for input in inputs {
            match input {
                Some(action) => game.apply(action),
                None => game.drop_tick(),
            }
            assert_consistent(&game);
        }
    }
}
