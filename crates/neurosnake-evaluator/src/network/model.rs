use serde::{Deserialize, Serialize};

use super::activation::Activation;

/// Shape of one dense layer, serialized as `[outputs, inputs]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct LayerShape {
    pub outputs: usize,
    pub inputs: usize,
}

impl LayerShape {
    #[must_use]
    pub const fn new(outputs: usize, inputs: usize) -> Self {
        Self { outputs, inputs }
    }

    /// Number of weights plus biases in the layer.
    #[must_use]
    pub const fn parameter_count(self) -> usize {
        self.outputs * self.inputs + self.outputs
    }
}

impl From<[usize; 2]> for LayerShape {
    fn from([outputs, inputs]: [usize; 2]) -> Self {
        Self { outputs, inputs }
    }
}

impl From<LayerShape> for [usize; 2] {
    fn from(shape: LayerShape) -> Self {
        [shape.outputs, shape.inputs]
    }
}

/// Builds the layer chain `input_length → hidden[0] → … → outputs`.
///
/// # Examples
///
/// ```
/// use neurosnake_evaluator::network::{LayerShape, layer_chain};
///
/// let shapes = layer_chain(25, &[16, 8], 4);
/// assert_eq!(
///     shapes,
///     [LayerShape::new(16, 25), LayerShape::new(8, 16), LayerShape::new(4, 8)]
/// );
/// ```
#[must_use]
pub fn layer_chain(input_length: usize, hidden: &[usize], outputs: usize) -> Vec<LayerShape> {
    let mut shapes = Vec::with_capacity(hidden.len() + 1);
    let mut inputs = input_length;
    for &size in hidden.iter().chain([&outputs]) {
        shapes.push(LayerShape::new(size, inputs));
        inputs = size;
    }
    shapes
}

/// Plain-data export of a [`Network`](super::Network).
///
/// This is the format stored on disk and sent to evaluation workers:
///
/// ```json
/// {
///   "inputLength": 25,
///   "layerShapes": [[8, 25], [4, 8]],
///   "activation": "TANH",
///   "weights": [[[...25 values...], ...8 rows], [[...8 values...], ...4 rows]],
///   "biases": [[...8 values...], [...4 values...]]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkModel {
    pub input_length: usize,
    pub layer_shapes: Vec<LayerShape>,
    pub activation: Activation,
    pub weights: Vec<Vec<Vec<f32>>>,
    pub biases: Vec<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_shape_json() {
        let shape = LayerShape::new(4, 8);
        assert_eq!(serde_json::to_string(&shape).unwrap(), "[4,8]");
        let parsed: LayerShape = serde_json::from_str("[16,25]").unwrap();
        assert_eq!(parsed, LayerShape::new(16, 25));
    }

    #[test]
    fn test_layer_chain_without_hidden_layers() {
        assert_eq!(layer_chain(25, &[], 4), [LayerShape::new(4, 25)]);
    }

    #[test]
    fn test_parameter_count() {
        assert_eq!(LayerShape::new(4, 8).parameter_count(), 36);
    }
}
