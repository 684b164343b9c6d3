use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    EngineError, ReplayMismatch,
    core::{Direction, Grid, Position},
};

use super::{
    replay::{EpisodeReplay, MoveRecord},
    snake::Snake,
};

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum TerminalCause {
    /// Reversed onto its own neck.
    #[display("suicide")]
    Suicide,
    #[display("hit wall")]
    HitWall,
    #[display("hit self")]
    HitSelf,
    /// Went too long without eating.
    #[display("starved")]
    Starved,
    /// Filled the whole board.
    #[display("won")]
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum EpisodeState {
    Running,
    Terminal(TerminalCause),
}

impl EpisodeState {
    #[must_use]
    pub fn terminal_cause(self) -> Option<TerminalCause> {
        match self {
            Self::Running => None,
            Self::Terminal(cause) => Some(cause),
        }
    }
}

/// Initial placement of an episode, kept for building its replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    head: Position,
    heading: Direction,
    food: Position,
}

/// Where food placed during a step comes from.
#[derive(Debug, Clone, Copy)]
enum FoodSource {
    Random,
    Recorded(MoveRecord),
}

/// Returns how many moves without food end the episode.
///
/// Short snakes (below 20% of the board) get half the board size, snakes up
/// to half of the board get the board size, longer snakes twice the board
/// size.
#[must_use]
pub fn starvation_threshold(length: usize, cells: usize) -> usize {
    if length * 5 < cells {
        cells.div_ceil(2)
    } else if length * 2 <= cells {
        cells
    } else {
        cells * 2
    }
}

/// Deterministic single-agent snake episode.
///
/// A simulation is created once and [`reset`](Self::reset) between episodes
/// so its buffers can be reused. Every step appends one [`MoveRecord`] to the
/// move log; [`to_replay`](Self::to_replay) packages the log with the
/// initial placement.
///
/// # Example
///
/// ```
/// use neurosnake_engine::{Direction, Grid, Simulation};
///
/// let mut sim = Simulation::with_seed(Grid::new(10, 10).unwrap(), 7);
/// while !sim.is_terminal() {
///     let heading = sim.snake().heading();
///     sim.step(heading).unwrap();
/// }
/// let replay = sim.to_replay();
/// let replayed = replay.replay_to_end().unwrap();
/// assert_eq!(replayed.snake(), sim.snake());
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    grid: Grid,
    rng: Pcg32,
    snake: Snake,
    food: Position,
    moves: usize,
    moves_since_food: usize,
    starvation_threshold: usize,
    state: EpisodeState,
    initial: Placement,
    move_log: Vec<MoveRecord>,
    occupancy: Vec<bool>,
}

impl Simulation {
    /// Creates a simulation with a randomly seeded generator and a fresh
    /// random placement.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self::with_rng(grid, Pcg32::from_rng(&mut rand::rng()))
    }

    /// Creates a simulation whose placements are reproducible from `seed`.
    #[must_use]
    pub fn with_seed(grid: Grid, seed: u64) -> Self {
        Self::with_rng(grid, Pcg32::seed_from_u64(seed))
    }

    fn with_rng(grid: Grid, rng: Pcg32) -> Self {
        let origin = Position::new(0, 0);
        let mut sim = Self {
            grid,
            rng,
            snake: Snake::new(origin, Direction::Up),
            food: origin,
            moves: 0,
            moves_since_food: 0,
            starvation_threshold: 0,
            state: EpisodeState::Running,
            initial: Placement {
                head: origin,
                heading: Direction::Up,
                food: origin,
            },
            move_log: Vec::new(),
            occupancy: vec![false; grid.cells()],
        };
        sim.reset();
        sim
    }

    /// Rebuilds the initial state recorded in `replay`.
    ///
    /// Steps must then be fed back with [`replay`](Self::replay).
    pub fn from_replay(replay: &EpisodeReplay) -> Result<Self, EngineError> {
        let grid = Grid::new(replay.world_width, replay.world_height)?;
        let placement = Placement {
            head: replay.initial_agent_position,
            heading: replay.initial_heading,
            food: replay.initial_food_position,
        };
        if !grid.contains(placement.head)
            || !grid.contains(placement.food)
            || placement.head == placement.food
        {
            return Err(EngineError::InvalidReplayStart);
        }
        let mut sim = Self::new(grid);
        sim.start(placement);
        Ok(sim)
    }

    /// Starts a new episode at a random head, heading and food cell.
    ///
    /// Counters and the move log are cleared. Resetting is allowed in any
    /// state, including after the episode ended.
    pub fn reset(&mut self) {
        let cells = self.grid.cells();
        let head = self
            .grid
            .position_of(self.rng.random_range(0..cells))
            .unwrap_or_default();
        let heading = Direction::ALL[self.rng.random_range(0..Direction::COUNT)];
        self.snake = Snake::new(head, heading);
        let food = self.random_free_cell();
        self.start(Placement {
            head,
            heading,
            food,
        });
    }

    fn start(&mut self, placement: Placement) {
        self.snake = Snake::new(placement.head, placement.heading);
        self.food = placement.food;
        self.moves = 0;
        self.moves_since_food = 0;
        self.starvation_threshold = starvation_threshold(self.snake.len(), self.grid.cells());
        self.state = EpisodeState::Running;
        self.initial = placement;
        self.move_log.clear();
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    /// Current food cell. After a win this is the last eaten cell.
    #[must_use]
    pub fn food(&self) -> Position {
        self.food
    }

    /// Food cell, or `None` once the board is full.
    #[must_use]
    pub fn visible_food(&self) -> Option<Position> {
        (self.state != EpisodeState::Terminal(TerminalCause::Won)).then_some(self.food)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snake.len()
    }

    /// Always `false`; see [`Snake::is_empty`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snake.is_empty()
    }

    #[must_use]
    pub fn moves(&self) -> usize {
        self.moves
    }

    #[must_use]
    pub fn moves_since_food(&self) -> usize {
        self.moves_since_food
    }

    #[must_use]
    pub fn starvation_threshold(&self) -> usize {
        self.starvation_threshold
    }

    #[must_use]
    pub fn state(&self) -> EpisodeState {
        self.state
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    #[must_use]
    pub fn terminal_cause(&self) -> Option<TerminalCause> {
        self.state.terminal_cause()
    }

    #[must_use]
    pub fn move_log(&self) -> &[MoveRecord] {
        &self.move_log
    }

    /// Packages the initial placement and the move log so far.
    #[must_use]
    pub fn to_replay(&self) -> EpisodeReplay {
        EpisodeReplay {
            world_width: self.grid.width(),
            world_height: self.grid.height(),
            initial_agent_position: self.initial.head,
            initial_heading: self.initial.heading,
            initial_food_position: self.initial.food,
            move_log: self.move_log.clone(),
        }
    }

    /// Advances the episode by one move towards `direction`.
    ///
    /// Returns the record appended to the move log.
    pub fn step(&mut self, direction: Direction) -> Result<MoveRecord, EngineError> {
        self.advance(direction, FoodSource::Random)
    }

    /// Re-applies one recorded step, placing food where the record says.
    pub fn replay(&mut self, record: MoveRecord) -> Result<(), EngineError> {
        let direction = record.direction().ok_or(EngineError::InvalidReplay {
            step: self.moves,
            record,
            reason: ReplayMismatch::InvalidDirection,
        })?;
        let produced = self.advance(direction, FoodSource::Recorded(record))?;
        debug_assert_eq!(produced, record);
        Ok(())
    }

    fn advance(
        &mut self,
        direction: Direction,
        source: FoodSource,
    ) -> Result<MoveRecord, EngineError> {
        if self.is_terminal() {
            return Err(EngineError::InvalidState);
        }

        let reversing = direction == self.snake.heading().opposite();
        let new_head = self.snake.head().moved(direction);
        let eats = !reversing && new_head == self.food;
        let wins = eats && self.snake.len() + 1 == self.grid.cells();
        let recorded_food = self.check_recorded_food(source, new_head, eats && !wins)?;

        self.moves += 1;

        if reversing {
            return Ok(self.finish(direction, TerminalCause::Suicide));
        }
        if !self.grid.contains(new_head) {
            return Ok(self.finish(direction, TerminalCause::HitWall));
        }

        if eats {
            self.snake.advance(new_head, direction, true);
            self.moves_since_food = 0;
            if wins {
                self.state = EpisodeState::Terminal(TerminalCause::Won);
                return Ok(self.log(MoveRecord::direction_only(direction)));
            }
            self.food = match recorded_food {
                Some(food) => food,
                None => self.random_free_cell(),
            };
            self.starvation_threshold = starvation_threshold(self.snake.len(), self.grid.cells());
            let index = self.grid.index_of(self.food).unwrap_or_default();
            return Ok(self.log(MoveRecord::with_food(direction, index)));
        }

        if self.snake.bites_itself_at(new_head) {
            return Ok(self.finish(direction, TerminalCause::HitSelf));
        }

        self.snake.advance(new_head, direction, false);
        self.moves_since_food += 1;
        if self.moves_since_food >= self.starvation_threshold {
            self.state = EpisodeState::Terminal(TerminalCause::Starved);
        }
        Ok(self.log(MoveRecord::direction_only(direction)))
    }

    /// Validates a recorded food index against what this step does.
    fn check_recorded_food(
        &self,
        source: FoodSource,
        new_head: Position,
        places_food: bool,
    ) -> Result<Option<Position>, EngineError> {
        let FoodSource::Recorded(record) = source else {
            return Ok(None);
        };
        let reason = match (places_food, record.food_index()) {
            (false, None) => return Ok(None),
            (false, Some(_)) => ReplayMismatch::UnexpectedFood,
            (true, None) => ReplayMismatch::MissingFood,
            (true, Some(index)) => match self.grid.position_of(index) {
                None => ReplayMismatch::FoodOutOfRange { index },
                Some(p) if p == new_head || self.snake.contains(p) => {
                    ReplayMismatch::FoodOnAgent { index }
                }
                Some(p) => return Ok(Some(p)),
            },
        };
        Err(EngineError::InvalidReplay {
            step: self.moves,
            record,
            reason,
        })
    }

    fn finish(&mut self, direction: Direction, cause: TerminalCause) -> MoveRecord {
        self.moves_since_food += 1;
        self.state = EpisodeState::Terminal(cause);
        self.log(MoveRecord::direction_only(direction))
    }

    fn log(&mut self, record: MoveRecord) -> MoveRecord {
        self.move_log.push(record);
        record
    }

    /// Picks a uniformly random cell not covered by the snake.
    ///
    /// The caller guarantees at least one free cell.
    fn random_free_cell(&mut self) -> Position {
        self.occupancy.fill(false);
        for p in self.snake.body() {
            if let Some(i) = self.grid.index_of(p) {
                self.occupancy[i] = true;
            }
        }
        let free = self.grid.cells() - self.snake.len();
        let mut nth = self.rng.random_range(0..free);
        for (index, occupied) in self.occupancy.iter().enumerate() {
            if *occupied {
                continue;
            }
            if nth == 0 {
                return self.grid.position_of(index).unwrap_or_default();
            }
            nth -= 1;
        }
        unreachable!("free cell count is positive");
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;

    use super::*;

    fn replay_start(
        width: usize,
        height: usize,
        head: Position,
        heading: Direction,
        food: Position,
    ) -> Simulation {
        Simulation::from_replay(&EpisodeReplay {
            world_width: width,
            world_height: height,
            initial_agent_position: head,
            initial_heading: heading,
            initial_food_position: food,
            move_log: vec![],
        })
        .unwrap()
    }

    #[test]
    fn test_reset_places_food_off_the_snake() {
        let mut sim = Simulation::with_seed(Grid::new(5, 5).unwrap(), 1);
        for _ in 0..100 {
            sim.reset();
            assert_eq!(sim.len(), 1);
            assert_ne!(sim.food(), sim.snake().head());
            assert!(sim.grid().contains(sim.food()));
            assert_eq!(sim.moves(), 0);
            assert!(sim.move_log().is_empty());
            assert!(!sim.is_terminal());
        }
    }

    #[test]
    fn test_starvation_threshold_bands() {
        assert_eq!(starvation_threshold(1, 400), 200);
        assert_eq!(starvation_threshold(79, 400), 200);
        assert_eq!(starvation_threshold(80, 400), 400);
        assert_eq!(starvation_threshold(200, 400), 400);
        assert_eq!(starvation_threshold(201, 400), 800);
        assert_eq!(starvation_threshold(1, 9), 5);
    }

    #[test]
    fn test_reverse_is_suicide() {
        let mut sim = replay_start(5, 5, Position::new(2, 2), Direction::Up, Position::new(0, 0));
        let record = sim.step(Direction::Down).unwrap();
        assert_eq!(record, MoveRecord::direction_only(Direction::Down));
        assert_eq!(sim.terminal_cause(), Some(TerminalCause::Suicide));
        assert_eq!(sim.snake().head(), Position::new(2, 2));
        assert_eq!(sim.moves(), 1);
        assert_eq!(sim.moves_since_food(), 1);
    }

    #[test]
    fn test_leaving_the_board_ends_episode() {
        let mut sim = replay_start(3, 3, Position::new(0, 0), Direction::Up, Position::new(2, 2));
        sim.step(Direction::Left).unwrap();
        assert_eq!(sim.terminal_cause(), Some(TerminalCause::HitWall));
        assert_eq!(sim.move_log(), [MoveRecord::direction_only(Direction::Left)]);
    }

    #[test]
    fn test_step_after_terminal_is_invalid_state() {
        let mut sim = replay_start(3, 3, Position::new(0, 0), Direction::Up, Position::new(2, 2));
        sim.step(Direction::Up).unwrap();
        assert!(sim.is_terminal());
        assert_eq!(sim.step(Direction::Right), Err(EngineError::InvalidState));
        assert_eq!(
            sim.replay(MoveRecord::direction_only(Direction::Right)),
            Err(EngineError::InvalidState)
        );
        sim.reset();
        assert!(!sim.is_terminal());
    }

    #[test]
    fn test_eating_grows_and_logs_food_index() {
        let mut sim = replay_start(
            4,
            4,
            Position::new(1, 1),
            Direction::Right,
            Position::new(2, 1),
        );
        let record = sim.step(Direction::Right).unwrap();
        assert_eq!(sim.len(), 2);
        assert_eq!(sim.moves_since_food(), 0);
        let index = sim.grid().index_of(sim.food()).unwrap();
        assert_eq!(record, MoveRecord::with_food(Direction::Right, index));
        assert!(!sim.snake().contains(sim.food()));
    }

    #[test]
    fn test_self_collision() {
        // Build a length-5 snake by replaying recorded food placements.
        let mut sim = replay_start(
            5,
            5,
            Position::new(0, 0),
            Direction::Right,
            Position::new(1, 0),
        );
        sim.replay(MoveRecord::with_food(Direction::Right, 2)).unwrap();
        sim.replay(MoveRecord::with_food(Direction::Right, 3)).unwrap();
        sim.replay(MoveRecord::with_food(Direction::Right, 8)).unwrap();
        sim.replay(MoveRecord::with_food(Direction::Down, 24)).unwrap();
        // body: (3,1) (3,0) (2,0) (1,0) (0,0)
        assert_eq!(sim.len(), 5);
        sim.step(Direction::Left).unwrap();
        assert!(!sim.is_terminal());
        sim.step(Direction::Up).unwrap();
        assert_eq!(sim.terminal_cause(), Some(TerminalCause::HitSelf));
    }

    #[test]
    fn test_starvation() {
        let mut sim = replay_start(
            4,
            4,
            Position::new(0, 0),
            Direction::Right,
            Position::new(3, 3),
        );
        assert_eq!(sim.starvation_threshold(), 8);
        let path = [
            Direction::Right,
            Direction::Right,
            Direction::Down,
            Direction::Left,
            Direction::Left,
            Direction::Down,
            Direction::Right,
        ];
        for dir in path {
            sim.step(dir).unwrap();
            assert!(!sim.is_terminal());
        }
        sim.step(Direction::Up).unwrap();
        assert_eq!(sim.terminal_cause(), Some(TerminalCause::Starved));
        assert_eq!(sim.moves(), 8);
    }

    #[test]
    fn test_filling_the_board_wins() {
        let mut sim = replay_start(
            2,
            1,
            Position::new(0, 0),
            Direction::Right,
            Position::new(1, 0),
        );
        let record = sim.step(Direction::Right).unwrap();
        assert_eq!(sim.terminal_cause(), Some(TerminalCause::Won));
        assert_eq!(record, MoveRecord::direction_only(Direction::Right));
        assert_eq!(sim.len(), 2);
        assert_eq!(sim.visible_food(), None);
    }

    #[test]
    fn test_replay_rejects_inconsistent_records() {
        let mut sim = replay_start(
            4,
            4,
            Position::new(1, 1),
            Direction::Right,
            Position::new(2, 1),
        );
        let err = sim
            .replay(MoveRecord::direction_only(Direction::Right))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidReplay {
                reason: ReplayMismatch::MissingFood,
                ..
            }
        ));

        let err = sim.replay(MoveRecord::with_food(Direction::Down, 3)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidReplay {
                reason: ReplayMismatch::UnexpectedFood,
                ..
            }
        ));

        let err = sim.replay(MoveRecord::with_food(Direction::Right, 6)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidReplay {
                reason: ReplayMismatch::FoodOnAgent { index: 6 },
                ..
            }
        ));
        assert_eq!(sim.moves(), 0);
    }

    #[test]
    fn test_random_episodes_replay_exactly() {
        let grid = Grid::new(8, 6).unwrap();
        let mut sim = Simulation::with_seed(grid, 42);
        let mut rng = Pcg32::seed_from_u64(99);
        for _ in 0..50 {
            sim.reset();
            let mut bodies = vec![sim.snake().body().collect::<Vec<_>>()];
            let mut foods = vec![sim.food()];
            while !sim.is_terminal() {
                // Avoid immediate reversals most of the time to get longer episodes.
                let heading = sim.snake().heading();
                let mut dir = Direction::ALL[rng.random_range(0..4)];
                if dir == heading.opposite() && rng.random_bool(0.9) {
                    dir = heading;
                }
                sim.step(dir).unwrap();
                bodies.push(sim.snake().body().collect());
                foods.push(sim.food());
            }

            let replay = sim.to_replay();
            let mut replayed = Simulation::from_replay(&replay).unwrap();
            assert_eq!(replayed.snake().body().collect::<Vec<_>>(), bodies[0]);
            for (i, record) in replay.move_log.iter().enumerate() {
                replayed.replay(*record).unwrap();
                assert_eq!(replayed.snake().body().collect::<Vec<_>>(), bodies[i + 1]);
                assert_eq!(replayed.food(), foods[i + 1]);
            }
            assert_eq!(replayed.terminal_cause(), sim.terminal_cause());
            assert_eq!(replayed.moves(), sim.moves());
        }
    }

    #[test]
    fn test_same_seed_same_episode() {
        let grid = Grid::new(6, 6).unwrap();
        let a = Simulation::with_seed(grid, 5);
        let b = Simulation::with_seed(grid, 5);
        assert_eq!(a.to_replay(), b.to_replay());
    }
}
