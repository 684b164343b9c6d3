//! Sensory input of the controller.
//!
//! [`FeatureEncoder::encode`] turns the simulation state into a fixed vector
//! of [`FEATURE_COUNT`] values. This vector is everything the network sees.
//!
//! # Layout
//!
//! | index  | meaning                                                         |
//! |--------|-----------------------------------------------------------------|
//! | 0..12  | for up, down, left, right of the head: food / body / off-board  |
//! | 12..16 | one-hot heading (up, down, left, right)                         |
//! | 16..20 | `1 / distance` to food along each side, 0 if not on that side   |
//! | 20..24 | body cells above / below / left / right of the head, / area     |
//! | 24     | snake length / area                                             |

use neurosnake_engine::{Direction, Grid, Simulation};

/// Number of values produced per query.
pub const FEATURE_COUNT: usize = 25;

pub type Features = [f32; FEATURE_COUNT];

const NEIGHBOUR_OFFSET: usize = 0;
const HEADING_OFFSET: usize = 12;
const FOOD_DISTANCE_OFFSET: usize = 16;
const BODY_COUNT_OFFSET: usize = 20;
const LENGTH_OFFSET: usize = 24;

/// Encoder sized for one board.
///
/// Holds no episode state; a worker keeps one per board size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureEncoder {
    grid: Grid,
    area: f32,
}

impl FeatureEncoder {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            area: grid.cells() as f32,
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn encode(&self, sim: &Simulation) -> Features {
        let mut features = [0.0; FEATURE_COUNT];
        self.encode_into(sim, &mut features);
        features
    }

    /// Writes the features of `sim` into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `sim` runs on a different grid than this encoder.
    #[expect(clippy::cast_precision_loss)]
    pub fn encode_into(&self, sim: &Simulation, out: &mut Features) {
        assert_eq!(sim.grid(), &self.grid, "encoder grid mismatch");
        out.fill(0.0);

        let snake = sim.snake();
        let head = snake.head();
        let food = sim.visible_food();

        for dir in Direction::ALL {
            let cell = head.moved(dir);
            let base = NEIGHBOUR_OFFSET + dir.index() * 3;
            out[base] = flag(food == Some(cell));
            out[base + 1] = flag(snake.contains(cell));
            out[base + 2] = flag(!self.grid.contains(cell));
        }

        out[HEADING_OFFSET + snake.heading().index()] = 1.0;

        if let Some(food) = food {
            let dy = food.y - head.y;
            let dx = food.x - head.x;
            let inverse = |d: i32| 1.0 / d.unsigned_abs() as f32;
            if dy < 0 {
                out[FOOD_DISTANCE_OFFSET + Direction::Up.index()] = inverse(dy);
            }
            if dy > 0 {
                out[FOOD_DISTANCE_OFFSET + Direction::Down.index()] = inverse(dy);
            }
            if dx < 0 {
                out[FOOD_DISTANCE_OFFSET + Direction::Left.index()] = inverse(dx);
            }
            if dx > 0 {
                out[FOOD_DISTANCE_OFFSET + Direction::Right.index()] = inverse(dx);
            }
        }

        let mut counts = [0usize; Direction::COUNT];
        for p in snake.body() {
            if p.y < head.y {
                counts[Direction::Up.index()] += 1;
            }
            if p.y > head.y {
                counts[Direction::Down.index()] += 1;
            }
            if p.x < head.x {
                counts[Direction::Left.index()] += 1;
            }
            if p.x > head.x {
                counts[Direction::Right.index()] += 1;
            }
        }
        for (i, count) in counts.into_iter().enumerate() {
            out[BODY_COUNT_OFFSET + i] = count as f32 / self.area;
        }

        out[LENGTH_OFFSET] = snake.len() as f32 / self.area;
    }
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}
