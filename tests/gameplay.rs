//! End-to-end stage flows through the public tick/command API

use std::collections::HashSet;

use glam::IVec2;

use block_shredder::levels::{BlockSpec, LevelData, level_1, load_levels_json};
use block_shredder::sim::{
    BlockColor, BlockState, CellKind, GamePhase, GameState, Side, TickInput, WinMessage,
    bounding_size, tick, try_start_shred,
};
use block_shredder::{EngineConfig, is_interior};

fn domino_level(name: &str, x: i32, y: i32, color: BlockColor) -> LevelData {
    LevelData::new(name, vec![BlockSpec::new(x, y, &[(0, 0), (1, 0)], color)])
}

fn step(state: &mut GameState, dir: IVec2) {
    let input = TickInput {
        move_dir: Some(dir),
        ..Default::default()
    };
    tick(state, &input).unwrap();
}

fn idle(state: &mut GameState, ticks: u32) {
    for _ in 0..ticks {
        tick(state, &TickInput::default()).unwrap();
    }
}

/// First seed whose stage 1 board satisfies `want`
fn find_state(levels: &[LevelData], config: &EngineConfig, want: impl Fn(&GameState) -> bool) -> GameState {
    (0..20_000u64)
        .map(|seed| GameState::new(levels.to_vec(), config.clone(), seed).unwrap())
        .find(|state| want(state))
        .expect("a seed with the wanted layout exists")
}

/// Seed where the red block's exit sits at (0, 5), straight left of row 5
fn red_left_exit(levels: &[LevelData]) -> GameState {
    find_state(levels, &EngineConfig::default(), |s| {
        s.board().get(IVec2::new(0, 5)) == Some(CellKind::Exit(BlockColor::Red))
    })
}

/// Slide the selected block (alone on the board) out through its exit
fn drive_out(state: &mut GameState) {
    let block = state.selected_block().unwrap().clone();
    let exits: Vec<_> = state
        .exits()
        .iter()
        .filter(|e| e.color == block.color)
        .copied()
        .collect();
    let dir = exits[0].direction;
    let min = exits.iter().fold(exits[0].pos, |m, e| m.min(e.pos));

    // Line up across the exit axis, then head for the wall
    let target = if dir.y != 0 {
        IVec2::new(min.x, block.anchor.y)
    } else {
        IVec2::new(block.anchor.x, min.y)
    };
    let mut guard = 0;
    while state.selected_block().unwrap().anchor != target {
        let gap = target - state.selected_block().unwrap().anchor;
        let delta = if gap.x != 0 {
            IVec2::new(gap.x.signum(), 0)
        } else {
            IVec2::new(0, gap.y.signum())
        };
        step(state, delta);
        guard += 1;
        assert!(guard < 40, "block stuck lining up");
    }
    let id = block.id;
    while state.block(id).unwrap().is_active() {
        step(state, dir);
        guard += 1;
        assert!(guard < 80, "block never reached its exit");
    }
}

fn assert_exit_invariants(state: &GameState) {
    let mut seen = HashSet::new();
    for exit in state.exits() {
        assert!(seen.insert(exit.pos), "exit cell carved twice");
        assert!(!is_interior(exit.pos));
        assert_eq!(state.board().get(exit.pos), Some(CellKind::Exit(exit.color)));
    }
    for block in state.blocks() {
        let cells: Vec<_> = state.exits().iter().filter(|e| e.color == block.color).collect();
        let side = Side::ALL
            .into_iter()
            .find(|s| s.direction() == cells[0].direction)
            .unwrap();
        assert_eq!(cells.len() as i32, side.segment_len(bounding_size(&block.shape)));
    }
}

#[test]
fn test_left_exit_scenario() {
    let levels = vec![domino_level("red", 2, 5, BlockColor::Red)];
    let config = EngineConfig::default();
    let mut state = red_left_exit(&levels);
    let exit = state.board().exit_at(IVec2::new(0, 5)).unwrap();
    assert_eq!(exit.direction, IVec2::NEG_X);

    // (2,5) -> (1,5): leftmost cell at x=1, still on the floor
    step(&mut state, IVec2::NEG_X);
    assert_eq!(state.blocks()[0].anchor, IVec2::new(1, 5));
    assert_eq!(state.blocks()[0].state(), BlockState::Active);

    // Sitting on the exit but moving any other way does not shred
    let mut on_exit = state.blocks()[0].clone();
    on_exit.anchor = IVec2::new(0, 5);
    for dir in [IVec2::X, IVec2::NEG_Y, IVec2::Y] {
        assert!(!try_start_shred(state.board(), &config.palette, &mut on_exit, dir));
    }
    assert!(on_exit.is_active());

    // One more left move carries it out
    step(&mut state, IVec2::NEG_X);
    let block = &state.blocks()[0];
    assert_eq!(block.anchor, IVec2::new(0, 5));
    assert_eq!(block.state(), BlockState::Shredding);
    assert_eq!(block.shred_direction(), Some(IVec2::NEG_X));
    assert!(state.selected_block().is_none());
}

#[test]
fn test_shred_scores_once() {
    let levels = vec![
        domino_level("one", 2, 5, BlockColor::Red),
        domino_level("two", 6, 6, BlockColor::Blue),
    ];
    let mut state = GameState::new(levels, EngineConfig::default(), 77).unwrap();
    drive_out(&mut state);

    // The move tick already advanced the animation once
    let block = &state.blocks()[0];
    assert_eq!(block.state(), BlockState::Shredding);
    assert_eq!(block.shred_progress(), 0.5);
    assert_eq!(state.score(), 0);
    assert_eq!(state.win_message(), None);

    idle(&mut state, 30);
    assert_eq!(state.blocks()[0].state(), BlockState::Shredding);
    assert_eq!(state.score(), 0);

    idle(&mut state, 1);
    assert!(state.blocks()[0].is_done());
    assert_eq!(state.score(), 1);
    assert_eq!(state.win_message(), Some(WinMessage::StageClear));
    assert!(matches!(state.phase(), GamePhase::StageClear { .. }));

    idle(&mut state, 5);
    assert_eq!(state.score(), 1);
}

#[test]
fn test_stage_progression_and_all_clear() {
    let levels = vec![
        domino_level("one", 2, 5, BlockColor::Red),
        domino_level("two", 6, 6, BlockColor::Green),
    ];
    let config = EngineConfig {
        stage_clear_ticks: 3,
        ..EngineConfig::default()
    };
    let mut state = GameState::new(levels, config, 5).unwrap();

    drive_out(&mut state);
    idle(&mut state, 31);
    assert_eq!(state.phase(), GamePhase::StageClear { remaining_ticks: 3 });
    assert!(!state.win_text().is_empty());

    // Input is frozen while the clear message shows
    assert!(state.input_frozen());
    assert!(!state.select_next());
    assert!(!state.move_selected(IVec2::X));

    idle(&mut state, 2);
    assert_eq!(state.stage_number(), 1);
    idle(&mut state, 1);
    assert_eq!(state.stage_number(), 2);
    assert_eq!(state.phase(), GamePhase::Playing);
    assert_eq!(state.win_text(), "");
    assert_eq!(state.score(), 1);
    assert_eq!(state.blocks()[0].color, BlockColor::Green);
    assert!(state.blocks()[0].is_active());

    drive_out(&mut state);
    idle(&mut state, 31);
    assert_eq!(state.phase(), GamePhase::AllCleared);
    assert_eq!(state.win_message(), Some(WinMessage::AllCleared));
    assert_eq!(state.score(), 2);

    // Terminal: ticks change nothing
    idle(&mut state, 10);
    assert_eq!(state.phase(), GamePhase::AllCleared);

    // Restart from the end goes back to stage 1 with a fresh score
    let restart = TickInput {
        restart: true,
        ..Default::default()
    };
    tick(&mut state, &restart).unwrap();
    assert_eq!(state.stage_number(), 1);
    assert_eq!(state.score(), 0);
    assert_eq!(state.phase(), GamePhase::Playing);
}

#[test]
fn test_explicit_advance_skips_wait() {
    let levels = vec![
        domino_level("one", 2, 5, BlockColor::Red),
        domino_level("two", 6, 6, BlockColor::Blue),
    ];
    let config = EngineConfig {
        stage_clear_ticks: 0,
        ..EngineConfig::default()
    };
    let mut state = GameState::new(levels, config, 8).unwrap();
    drive_out(&mut state);
    idle(&mut state, 31);

    // With no timer the clear state waits for an explicit advance
    idle(&mut state, 500);
    assert!(matches!(state.phase(), GamePhase::StageClear { .. }));

    let advance = TickInput {
        advance: true,
        ..Default::default()
    };
    tick(&mut state, &advance).unwrap();
    assert_eq!(state.stage_number(), 2);
}

#[test]
fn test_restart_later_stage_keeps_score() {
    let levels = vec![
        domino_level("one", 2, 5, BlockColor::Red),
        domino_level("two", 6, 6, BlockColor::Blue),
    ];
    let mut state = GameState::new(levels, EngineConfig::default(), 21).unwrap();
    drive_out(&mut state);
    idle(&mut state, 31);
    state.advance_stage().unwrap();
    assert_eq!(state.stage_number(), 2);

    step(&mut state, IVec2::Y);
    state.restart().unwrap();
    assert_eq!(state.stage_number(), 2);
    assert_eq!(state.score(), 1);
    assert_eq!(state.blocks()[0].anchor, IVec2::new(6, 6));
}

#[test]
fn test_restart_after_partial_progress() {
    let mut state = GameState::new(vec![level_1()], EngineConfig::default(), 1234).unwrap();
    assert_exit_invariants(&state);

    // Shuffle a couple of blocks around
    state.move_selected(IVec2::Y);
    state.select_next();
    state.move_selected(IVec2::NEG_X);
    let moved: Vec<_> = state.blocks().iter().map(|b| b.anchor).collect();
    let spawned: Vec<_> = level_1().blocks.iter().map(BlockSpec::anchor).collect();
    assert_ne!(moved, spawned);

    state.restart().unwrap();
    for (block, spec) in state.blocks().iter().zip(&level_1().blocks) {
        assert_eq!(block.state(), BlockState::Active);
        assert_eq!(block.shred_progress(), 0.0);
        assert_eq!(block.anchor, spec.anchor());
    }
    assert_eq!(state.selected_block().map(|b| b.id), Some(1));
    assert_exit_invariants(&state);
}

#[test]
fn test_restart_resets_shredding_blocks() {
    let levels = vec![LevelData::new(
        "two",
        vec![
            BlockSpec::new(2, 5, &[(0, 0), (1, 0)], BlockColor::Red),
            BlockSpec::new(8, 8, &[(0, 0)], BlockColor::Yellow),
        ],
    )];
    let mut state = red_left_exit(&levels);
    step(&mut state, IVec2::NEG_X);
    step(&mut state, IVec2::NEG_X);
    assert_eq!(state.blocks()[0].state(), BlockState::Shredding);

    state.restart().unwrap();
    let block = &state.blocks()[0];
    assert_eq!(block.state(), BlockState::Active);
    assert_eq!(block.shred_progress(), 0.0);
    assert_eq!(block.shred_direction(), None);
    assert_eq!(block.anchor, IVec2::new(2, 5));
    assert_eq!(state.selected_block().map(|b| b.id), Some(1));
    assert_eq!(state.score(), 0);
}

#[test]
fn test_adjacent_blocks_cannot_swap() {
    let levels = vec![LevelData::new(
        "pair",
        vec![
            BlockSpec::new(3, 5, &[(0, 0), (1, 0)], BlockColor::Red),
            BlockSpec::new(5, 5, &[(0, 0), (1, 0)], BlockColor::Blue),
        ],
    )];
    let mut state = GameState::new(levels, EngineConfig::default(), 3).unwrap();

    step(&mut state, IVec2::X);
    assert_eq!(state.blocks()[0].anchor, IVec2::new(3, 5));

    state.select_next();
    step(&mut state, IVec2::NEG_X);
    assert_eq!(state.blocks()[1].anchor, IVec2::new(5, 5));
}

#[test]
fn test_selection_skips_finished_blocks() {
    let levels = vec![LevelData::new(
        "two",
        vec![
            BlockSpec::new(2, 5, &[(0, 0), (1, 0)], BlockColor::Red),
            BlockSpec::new(8, 8, &[(0, 0)], BlockColor::Yellow),
        ],
    )];
    let mut state = red_left_exit(&levels);
    step(&mut state, IVec2::NEG_X);
    step(&mut state, IVec2::NEG_X);

    // Selection hops to the remaining active block
    assert_eq!(state.selected_block().map(|b| b.id), Some(2));
    // Clicking the shredding block does nothing
    let red_cell = state.blocks()[0].cells()[0];
    assert!(!state.select_at(red_cell));
    assert!(state.select_next());
    assert_eq!(state.selected_block().map(|b| b.id), Some(2));
}

#[test]
fn test_levels_from_json() {
    let json = r#"[
        { "name": "json", "blocks": [
            { "x": 4, "y": 4, "shape": [[0, 0], [0, 1], [1, 1]], "color": "Green" }
        ] }
    ]"#;
    let levels = load_levels_json(json).unwrap();
    let mut state = GameState::new(levels, EngineConfig::default(), 9).unwrap();
    assert_exit_invariants(&state);
    drive_out(&mut state);
    idle(&mut state, 40);
    assert_eq!(state.phase(), GamePhase::AllCleared);
    assert_eq!(state.score(), 1);
}

#[test]
fn test_snapshot_round_trips_through_json() {
    let state = GameState::with_builtin_levels(42).unwrap();
    let json = serde_json::to_string(&state).unwrap();
    let restored: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.board(), state.board());
    assert_eq!(restored.blocks().len(), 4);
    assert_eq!(restored.selected_block().map(|b| b.id), Some(1));
}
