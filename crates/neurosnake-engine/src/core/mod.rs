//! Board geometry: positions, directions and the grid addressing scheme.

pub use self::{grid::*, position::*};

pub(crate) mod grid;
pub(crate) mod position;
