//! Terminal presenter.
//!
//! Draws the board as an ASCII grid after every state change and prints
//! notifications as they arrive. Choice prompts are answered with digit
//! keys routed by [`crate::keyboard`].

use std::time::Duration;

use outpost_agents::Board;
use outpost_core::Presenter;
use outpost_types::{Position, Role, Snapshot};
use tokio::sync::{Mutex, mpsc};
use tracing::warn;

/// Cell legend printed under the grid.
pub const LEGEND: &str = "# hidden  . revealed  $ resource  X hazard  x cleared";

/// Presenter writing to stdout and stderr.
#[derive(Debug)]
pub struct ConsolePresenter {
    choices: Mutex<mpsc::UnboundedReceiver<usize>>,
}

impl ConsolePresenter {
    /// Create a presenter reading choice answers from `choices`.
    pub fn new(choices: mpsc::UnboundedReceiver<usize>) -> Self {
        Self {
            choices: Mutex::new(choices),
        }
    }
}

impl Presenter for ConsolePresenter {
    fn render_now(&self, board: &Board, snapshot: &Snapshot) {
        println!("\n{}\n{}", render_header(snapshot), render_grid(board));
    }

    async fn show_message(&self, text: &str, subtext: &str, duration: Duration) {
        if subtext.is_empty() {
            println!(">> {text}");
        } else {
            println!(">> {text} ({subtext})");
        }
        tokio::time::sleep(duration).await;
    }

    fn flash(&self, text: &str, _duration: Duration) {
        println!("-- {text}");
    }

    async fn show_choice_modal(&self, title: &str, body: &str, options: &[String]) -> usize {
        println!("\n== {title} ==\n{body}");
        for (n, option) in (1_u32..).zip(options) {
            println!("  {n}) {option}");
        }

        let mut choices = self.choices.lock().await;
        while choices.try_recv().is_ok() {}
        loop {
            match choices.recv().await {
                Some(index) if index < options.len() => return index,
                Some(_) => println!("Pick a number from 1 to {}", options.len()),
                None => {
                    warn!("Keyboard closed during choice, taking the first option");
                    return 0;
                }
            }
        }
    }

    fn show_error(&self, message: &str) {
        eprintln!("!! The session stopped: {message}");
    }
}

/// Counters line shown above the grid.
pub fn render_header(snapshot: &Snapshot) -> String {
    let mut line = format!("Round {}/{}", snapshot.round, snapshot.rounds_total);
    if let (Some(rep), Some(total)) = (snapshot.repetition, snapshot.repetitions_total) {
        line.push_str(&format!("  Rep {rep}/{total}"));
    }
    line.push_str(&format!(
        "  Gold {}  Moves {}/{}",
        snapshot.gold, snapshot.moves_used, snapshot.max_moves
    ));
    if snapshot.stun_turns > 0 {
        line.push_str(&format!("  Stunned {}", snapshot.stun_turns));
    }
    if let Some(role) = snapshot.human_role {
        line.push_str(&format!("  You are {}", role.label()));
    }
    line
}

/// The grid, one three-character cell per tile, agents drawn by tag.
pub fn render_grid(board: &Board) -> String {
    let forager = board.position(Role::Forager);
    let security = board.position(Role::Security);
    let size = board.world.size();
    let mut out = String::new();
    for y in 0..size {
        for x in 0..size {
            let at = Position::new(x, y);
            let cell = if at == forager && at == security {
                String::from("<>")
            } else if at == forager {
                String::from(board.crew.agent(Role::Forager).tag())
            } else if at == security {
                String::from(board.crew.agent(Role::Security).tag())
            } else {
                String::from(tile_glyph(board, at))
            };
            out.push_str(&format!("{cell:^3}"));
        }
        out.push('\n');
    }
    let forager_agent = board.crew.agent(Role::Forager);
    let security_agent = board.crew.agent(Role::Security);
    out.push_str(&format!(
        "F {} [{}]  S {} [{}]\n{LEGEND}",
        forager_agent.display_name(),
        forager_agent.tag(),
        security_agent.display_name(),
        security_agent.tag(),
    ));
    out
}

fn tile_glyph(board: &Board, at: Position) -> char {
    if let Some(hazard) = board.world.hazard_at(at).filter(|h| h.discovered()) {
        return if hazard.removed() { 'x' } else { 'X' };
    }
    match board.world.tile_at(at) {
        Some(tile) if tile.has_revealed_resource() => '$',
        Some(tile) if tile.revealed => '.',
        _ => '#',
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_types::{Controller, HazardId, PolicyId, ResourceKind};
    use outpost_world::{HazardCenter, Tile, WorldMap};

    use super::*;

    fn board() -> Board {
        let mut world = WorldMap::empty(3).unwrap();
        world
            .set_tile(
                Position::new(1, 0),
                Tile {
                    revealed: true,
                    ..Tile::with_resource(ResourceKind::A)
                },
            )
            .unwrap();
        world
            .add_hazard(HazardCenter::new(HazardId(1), Position::new(0, 2)))
            .unwrap();
        world
            .add_hazard(HazardCenter::new(HazardId(2), Position::new(1, 2)))
            .unwrap();
        world.discover_hazard(HazardId(1)).unwrap();
        world.reveal_tile(Position::new(2, 1)).unwrap();
        let (board, _) = Board::spawn(
            world,
            Position::new(0, 0),
            Position::new(2, 2),
            Controller::Policy(PolicyId::Miner),
            Controller::Human,
        )
        .unwrap();
        board
    }

    #[test]
    fn grid_draws_tiles_and_agents() {
        let grid = render_grid(&board());
        let rows: Vec<&str> = grid.lines().collect();
        assert_eq!(rows.first().copied(), Some("F1  $  # "));
        assert_eq!(rows.get(1).copied(), Some(" #  #  . "));
        assert_eq!(rows.get(2).copied(), Some(" X  #  P "));
        assert_eq!(rows.get(3).copied(), Some("F Digger [F1]  S You [P]"));
        assert_eq!(rows.get(4).copied(), Some(LEGEND));
    }

    #[test]
    fn shared_tile_draws_one_marker() {
        let mut board = board();
        board.crew.relocate(Role::Security, Position::new(0, 0));
        let grid = render_grid(&board);
        assert!(grid.starts_with("<> "));
    }

    #[test]
    fn header_shows_main_phase_counters() {
        let snapshot = Snapshot {
            forager: Position::new(0, 0),
            security: Position::new(1, 1),
            forager_controller: Controller::Policy(PolicyId::Miner),
            security_controller: Controller::Human,
            stun_turns: 2,
            gold: 7,
            turn_index: 4,
            moves_used: 1,
            max_moves: 5,
            round: 2,
            rounds_total: 3,
            repetition: Some(1),
            repetitions_total: Some(6),
            human_role: Some(Role::Security),
            partner: Some(PolicyId::Miner),
        };
        assert_eq!(
            render_header(&snapshot),
            "Round 2/3  Rep 1/6  Gold 7  Moves 1/5  Stunned 2  You are Security"
        );
    }

    #[test]
    fn header_omits_main_phase_fields_in_demos() {
        let snapshot = Snapshot {
            forager: Position::new(0, 0),
            security: Position::new(1, 0),
            forager_controller: Controller::Policy(PolicyId::Escort),
            security_controller: Controller::Policy(PolicyId::Scout),
            stun_turns: 0,
            gold: 0,
            turn_index: 0,
            moves_used: 0,
            max_moves: 5,
            round: 1,
            rounds_total: 3,
            repetition: None,
            repetitions_total: None,
            human_role: None,
            partner: None,
        };
        assert_eq!(render_header(&snapshot), "Round 1/3  Gold 0  Moves 0/5");
    }

    #[tokio::test]
    async fn choice_skips_out_of_range_answers() {
        let (tx, rx) = mpsc::unbounded_channel();
        let presenter = ConsolePresenter::new(rx);
        let options = vec![String::from("a"), String::from("b")];
        let pick = async {
            tokio::task::yield_now().await;
            tx.send(5).unwrap();
            tx.send(1).unwrap();
        };
        let (index, ()) = tokio::join!(presenter.show_choice_modal("t", "b", &options), pick);
        assert_eq!(index, 1);
    }
}
