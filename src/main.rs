//! Block Shredder entry point
//!
//! Native headless driver: draws the board as text and reads one command per
//! line from stdin. Useful for playing and debugging the engine without a
//! graphical front end.
//!
//! Commands: `a`/`d`/`w`/`s` move, `n` next block, `c X Y` select cell,
//! `r` restart, `q` quit, empty line waits a tick.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;
    use std::io::{self, BufRead, Write};

    use glam::IVec2;

    use block_shredder::levels::{builtin_levels, load_levels_json};
    use block_shredder::sim::{BlockState, CellKind, GamePhase, GameState, TickInput, tick};
    use block_shredder::EngineConfig;

    /// Cap on idle ticks spent finishing animations after a command
    const MAX_SETTLE_TICKS: u32 = 1_000;

    struct Args {
        seed: u64,
        levels: Option<String>,
        config: Option<String>,
    }

    fn parse_args() -> Result<Args, Box<dyn Error>> {
        let mut args = Args {
            seed: default_seed(),
            levels: None,
            config: None,
        };
        let mut it = std::env::args().skip(1);
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--seed" => args.seed = it.next().ok_or("--seed needs a value")?.parse()?,
                "--levels" => args.levels = Some(it.next().ok_or("--levels needs a path")?),
                "--config" => args.config = Some(it.next().ok_or("--config needs a path")?),
                other => return Err(format!("unknown argument: {other}").into()),
            }
        }
        Ok(args)
    }

    fn default_seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }

    fn parse_command(line: &str) -> Option<TickInput> {
        let mut words = line.split_whitespace();
        let mut input = TickInput::default();
        match words.next() {
            None => {}
            Some("a") => input.move_dir = Some(IVec2::NEG_X),
            Some("d") => input.move_dir = Some(IVec2::X),
            Some("w") => input.move_dir = Some(IVec2::NEG_Y),
            Some("s") => input.move_dir = Some(IVec2::Y),
            Some("n") => input.select_next = true,
            Some("r") => input.restart = true,
            Some("c") => {
                let x = words.next()?.parse().ok()?;
                let y = words.next()?.parse().ok()?;
                input.select_cell = Some(IVec2::new(x, y));
            }
            Some(_) => return None,
        }
        Some(input)
    }

    fn color_char(kind: CellKind) -> char {
        match kind {
            CellKind::Wall => '#',
            CellKind::Floor => '.',
            CellKind::Exit(color) => color.as_str().to_ascii_lowercase().chars().next().unwrap_or('?'),
        }
    }

    fn draw(state: &GameState, out: &mut impl Write) -> io::Result<()> {
        let selected = state.selected_block().map(|b| b.id);
        for (y, row) in state.board().rows().enumerate() {
            let line: String = row
                .iter()
                .enumerate()
                .map(|(x, &kind)| {
                    let cell = IVec2::new(x as i32, y as i32);
                    let block = state
                        .blocks()
                        .iter()
                        .find(|b| b.state() != BlockState::Done && b.covers(cell));
                    match block {
                        Some(b) if Some(b.id) == selected => '@',
                        Some(b) => b.color.as_str().chars().next().unwrap_or('?'),
                        None => color_char(kind),
                    }
                })
                .collect();
            writeln!(out, "{line}")?;
        }
        let selected_name = state.selected_block().map(|b| b.color.as_str()).unwrap_or("-");
        writeln!(
            out,
            "stage {}/{}  score {}  selected {}  {}",
            state.stage_number(),
            state.stage_count(),
            state.score(),
            selected_name,
            state.win_text()
        )
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        env_logger::init();
        let args = parse_args()?;

        let config = match &args.config {
            Some(path) => EngineConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => EngineConfig::default(),
        };
        let levels = match &args.levels {
            Some(path) => load_levels_json(&std::fs::read_to_string(path)?)?,
            None => builtin_levels(),
        };

        log::info!("Block Shredder starting with seed {}", args.seed);
        let mut state = GameState::new(levels, config, args.seed)?;

        let stdin = io::stdin();
        let mut out = io::stdout().lock();
        draw(&state, &mut out)?;

        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim() == "q" {
                break;
            }
            let Some(input) = parse_command(&line) else {
                writeln!(out, "?")?;
                continue;
            };
            tick(&mut state, &input)?;

            // Play out shred animations; show the clear message before moving on
            let idle = TickInput::default();
            let mut settle = 0;
            while settle < MAX_SETTLE_TICKS
                && state.blocks().iter().any(|b| b.state() == BlockState::Shredding)
            {
                tick(&mut state, &idle)?;
                settle += 1;
            }
            if matches!(state.phase(), GamePhase::StageClear { .. }) {
                draw(&state, &mut out)?;
                let advance = TickInput {
                    advance: true,
                    ..Default::default()
                };
                tick(&mut state, &advance)?;
            }

            draw(&state, &mut out)?;
            if state.phase() == GamePhase::AllCleared {
                writeln!(out, "r to play again, q to quit")?;
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = native::run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
