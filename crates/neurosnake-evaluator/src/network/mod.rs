//! Fixed-topology feed-forward controller and its genetic operators.
//!
//! - [`Network`] - Validated weights and biases with forward pass, crossover
//!   and mutation
//! - [`NetworkModel`] - Plain-data export used on disk and by workers
//! - [`Activation`] - Hidden layer activation selector
//! - [`linalg`] - Dense kernels used by the forward pass

pub use self::{activation::*, controller::*, model::*};

mod activation;
mod controller;
pub mod linalg;
mod model;

/// Number of network outputs, one per direction.
pub const OUTPUT_LENGTH: usize = neurosnake_engine::Direction::COUNT;

/// Layer shapes that do not form a valid chain.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TopologyError {
    #[display("network has no layers")]
    NoLayers,
    #[display("layer {layer} has a zero-sized dimension")]
    ZeroSized { layer: usize },
    #[display("first layer takes {actual} inputs, expected {expected}")]
    InputMismatch { expected: usize, actual: usize },
    #[display("layer {layer} takes {actual} inputs, previous layer produces {expected}")]
    ChainBreak {
        layer: usize,
        expected: usize,
        actual: usize,
    },
    #[display("last layer produces {actual} outputs, expected {expected}")]
    OutputMismatch { expected: usize, actual: usize },
}

/// Explicit weights or biases that do not fit the declared layer shapes.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParameterError {
    #[display("{actual} {kind} tensors for {expected} layers")]
    LayerCount {
        kind: TensorKind,
        expected: usize,
        actual: usize,
    },
    #[display("layer {layer} weights have {actual} rows, expected {expected}")]
    WeightRows {
        layer: usize,
        expected: usize,
        actual: usize,
    },
    #[display("layer {layer} weight row {row} has {actual} columns, expected {expected}")]
    WeightColumns {
        layer: usize,
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("layer {layer} has {actual} biases, expected {expected}")]
    BiasLength {
        layer: usize,
        expected: usize,
        actual: usize,
    },
    #[display("layer {layer} {kind} hold a value outside [-1, 1]")]
    OutOfRange { layer: usize, kind: TensorKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum TensorKind {
    #[display("weight")]
    Weight,
    #[display("bias")]
    Bias,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum NetworkError {
    #[display("invalid topology: {_0}")]
    InvalidTopology(TopologyError),
    #[display("invalid parameters: {_0}")]
    InvalidParameters(ParameterError),
}
