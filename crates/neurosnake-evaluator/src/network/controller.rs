use neurosnake_engine::Direction;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    NetworkError, OUTPUT_LENGTH, ParameterError, TensorKind, TopologyError,
    activation::Activation,
    linalg,
    model::{LayerShape, NetworkModel},
};

const WEIGHT_MIN: f32 = -1.0;
const WEIGHT_MAX: f32 = 1.0;

/// Feed-forward network mapping a feature vector to a direction.
///
/// The topology is fixed at construction; genetic operators only rewrite
/// weights and biases, which always stay within `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkModel", into = "NetworkModel")]
pub struct Network {
    input_length: usize,
    layer_shapes: Vec<LayerShape>,
    activation: Activation,
    weights: Vec<Vec<Vec<f32>>>,
    biases: Vec<Vec<f32>>,
}

/// Checks that `layer_shapes` chain from `input_length` to the four outputs.
pub fn validate_topology(
    input_length: usize,
    layer_shapes: &[LayerShape],
) -> Result<(), TopologyError> {
    let (first, last) = match (layer_shapes.first(), layer_shapes.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(TopologyError::NoLayers),
    };
    if let Some(layer) = layer_shapes
        .iter()
        .position(|s| s.inputs == 0 || s.outputs == 0)
    {
        return Err(TopologyError::ZeroSized { layer });
    }
    if first.inputs != input_length {
        return Err(TopologyError::InputMismatch {
            expected: input_length,
            actual: first.inputs,
        });
    }
    for (i, pair) in layer_shapes.windows(2).enumerate() {
        if pair[1].inputs != pair[0].outputs {
            return Err(TopologyError::ChainBreak {
                layer: i + 1,
                expected: pair[0].outputs,
                actual: pair[1].inputs,
            });
        }
    }
    if last.outputs != OUTPUT_LENGTH {
        return Err(TopologyError::OutputMismatch {
            expected: OUTPUT_LENGTH,
            actual: last.outputs,
        });
    }
    Ok(())
}

fn validate_parameters(
    layer_shapes: &[LayerShape],
    weights: &[Vec<Vec<f32>>],
    biases: &[Vec<f32>],
) -> Result<(), ParameterError> {
    let in_range = |v: &f32| (WEIGHT_MIN..=WEIGHT_MAX).contains(v);

    for (kind, actual) in [
        (TensorKind::Weight, weights.len()),
        (TensorKind::Bias, biases.len()),
    ] {
        if actual != layer_shapes.len() {
            return Err(ParameterError::LayerCount {
                kind,
                expected: layer_shapes.len(),
                actual,
            });
        }
    }

    for (layer, ((shape, w), b)) in layer_shapes.iter().zip(weights).zip(biases).enumerate() {
        if w.len() != shape.outputs {
            return Err(ParameterError::WeightRows {
                layer,
                expected: shape.outputs,
                actual: w.len(),
            });
        }
        if let Some((row, r)) = w.iter().enumerate().find(|(_, r)| r.len() != shape.inputs) {
            return Err(ParameterError::WeightColumns {
                layer,
                row,
                expected: shape.inputs,
                actual: r.len(),
            });
        }
        if b.len() != shape.outputs {
            return Err(ParameterError::BiasLength {
                layer,
                expected: shape.outputs,
                actual: b.len(),
            });
        }
        if !w.iter().flatten().all(in_range) {
            return Err(ParameterError::OutOfRange {
                layer,
                kind: TensorKind::Weight,
            });
        }
        if !b.iter().all(in_range) {
            return Err(ParameterError::OutOfRange {
                layer,
                kind: TensorKind::Bias,
            });
        }
    }
    Ok(())
}

impl Network {
    /// Creates a network with every weight and bias drawn uniformly from
    /// `[-1, 1]`.
    pub fn random<R>(
        input_length: usize,
        layer_shapes: Vec<LayerShape>,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self, TopologyError>
    where
        R: Rng + ?Sized,
    {
        validate_topology(input_length, &layer_shapes)?;
        let weights: Vec<Vec<Vec<f32>>> = layer_shapes
            .iter()
            .map(|shape| {
                (0..shape.outputs)
                    .map(|_| {
                        (0..shape.inputs)
                            .map(|_| rng.random_range(WEIGHT_MIN..=WEIGHT_MAX))
                            .collect()
                    })
                    .collect()
            })
            .collect();
        let biases: Vec<Vec<f32>> = layer_shapes
            .iter()
            .map(|shape| {
                (0..shape.outputs)
                    .map(|_| rng.random_range(WEIGHT_MIN..=WEIGHT_MAX))
                    .collect()
            })
            .collect();
        Ok(Self {
            input_length,
            layer_shapes,
            activation,
            weights,
            biases,
        })
    }

    /// Creates a network from explicit tensors.
    ///
    /// `weights[layer][out][in]` and `biases[layer][out]` must match
    /// `layer_shapes` exactly and every value must lie in `[-1, 1]`.
    pub fn from_parts(
        input_length: usize,
        layer_shapes: Vec<LayerShape>,
        activation: Activation,
        weights: Vec<Vec<Vec<f32>>>,
        biases: Vec<Vec<f32>>,
    ) -> Result<Self, NetworkError> {
        validate_topology(input_length, &layer_shapes)?;
        validate_parameters(&layer_shapes, &weights, &biases)?;
        Ok(Self {
            input_length,
            layer_shapes,
            activation,
            weights,
            biases,
        })
    }

    pub fn from_model(model: NetworkModel) -> Result<Self, NetworkError> {
        let NetworkModel {
            input_length,
            layer_shapes,
            activation,
            weights,
            biases,
        } = model;
        Self::from_parts(input_length, layer_shapes, activation, weights, biases)
    }

    #[must_use]
    pub fn to_model(&self) -> NetworkModel {
        NetworkModel {
            input_length: self.input_length,
            layer_shapes: self.layer_shapes.clone(),
            activation: self.activation,
            weights: self.weights.clone(),
            biases: self.biases.clone(),
        }
    }

    #[must_use]
    pub fn input_length(&self) -> usize {
        self.input_length
    }

    #[must_use]
    pub fn layer_shapes(&self) -> &[LayerShape] {
        &self.layer_shapes
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[must_use]
    pub fn weights(&self) -> &[Vec<Vec<f32>>] {
        &self.weights
    }

    #[must_use]
    pub fn biases(&self) -> &[Vec<f32>] {
        &self.biases
    }

    /// Whether `other` has the same input length and layer shapes.
    #[must_use]
    pub fn same_topology(&self, other: &Self) -> bool {
        self.input_length == other.input_length && self.layer_shapes == other.layer_shapes
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.layer_shapes
            .iter()
            .map(|s| s.parameter_count())
            .sum()
    }

    /// Every weight then every bias, layer by layer.
    pub fn parameters(&self) -> impl Iterator<Item = f32> + '_ {
        self.weights
            .iter()
            .zip(&self.biases)
            .flat_map(|(w, b)| w.iter().flatten().chain(b))
            .copied()
    }

    fn parameters_mut(&mut self) -> impl Iterator<Item = &mut f32> {
        self.weights
            .iter_mut()
            .zip(&mut self.biases)
            .flat_map(|(w, b)| w.iter_mut().flatten().chain(b))
    }

    /// Weight rows and bias vectors, in the same order as the parameters.
    fn tensors_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.weights
            .iter_mut()
            .zip(&mut self.biases)
            .flat_map(|(w, b)| {
                w.iter_mut()
                    .map(Vec::as_mut_slice)
                    .chain(std::iter::once(b.as_mut_slice()))
            })
    }

    /// Raw output layer values for `input`.
    ///
    /// # Panics
    ///
    /// Panics if `input.len()` differs from the network's input length.
    #[must_use]
    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        assert_eq!(input.len(), self.input_length, "network input length mismatch");
        let last = self.layer_shapes.len() - 1;
        let mut current = input.to_vec();
        let mut next = Vec::new();
        for (i, (w, b)) in self.weights.iter().zip(&self.biases).enumerate() {
            linalg::mat_vec_mul_into(w, &current, &mut next);
            linalg::add_assign(&mut next, b);
            if i != last {
                self.activation.apply_all(&mut next);
            }
            std::mem::swap(&mut current, &mut next);
        }
        current
    }

    /// Picks the direction with the largest output.
    ///
    /// # Panics
    ///
    /// Panics if `input.len()` differs from the network's input length.
    #[must_use]
    pub fn compute(&self, input: &[f32]) -> Direction {
        let outputs = self.forward(input);
        linalg::argmax(&outputs)
            .and_then(Direction::from_index)
            .unwrap_or(Direction::Up)
    }

    /// Overwrites every scalar with the one at the same position in `a` or
    /// `b`, chosen independently with equal probability.
    ///
    /// # Panics
    ///
    /// Panics if the three networks do not share one topology.
    pub fn crossover<R>(&mut self, a: &Self, b: &Self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        assert!(
            self.same_topology(a) && self.same_topology(b),
            "crossover between different topologies"
        );
        for (dst, (x, y)) in self.parameters_mut().zip(a.parameters().zip(b.parameters())) {
            *dst = if rng.random_bool(0.5) { y } else { x };
        }
    }

    /// Creates a child of `a` and `b` by uniform crossover.
    ///
    /// # Panics
    ///
    /// Panics if `a` and `b` have different topologies.
    #[must_use]
    pub fn crossed<R>(a: &Self, b: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut child = a.clone();
        child.crossover(a, b, rng);
        child
    }

    /// Perturbs each scalar with probability `rate` by a uniform value in
    /// `[-amount, amount]`, then clamps it back into `[-1, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is outside `[0, 1]` or `amount` is negative.
    pub fn mutate<R>(&mut self, rate: f64, amount: f32, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        assert!(amount >= 0.0, "mutation amount must be non-negative");
        for tensor in self.tensors_mut() {
            for v in tensor.iter_mut() {
                if rng.random_bool(rate) {
                    *v += rng.random_range(-amount..=amount);
                }
            }
            linalg::clamp_all(tensor, WEIGHT_MIN, WEIGHT_MAX);
        }
    }
}

impl TryFrom<NetworkModel> for Network {
    type Error = NetworkError;

    fn try_from(model: NetworkModel) -> Result<Self, Self::Error> {
        Self::from_model(model)
    }
}

impl From<Network> for NetworkModel {
    fn from(network: Network) -> Self {
        let Network {
            input_length,
            layer_shapes,
            activation,
            weights,
            biases,
        } = network;
        Self {
            input_length,
            layer_shapes,
            activation,
            weights,
            biases,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::network::layer_chain;

    const INPUT: usize = 25;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    fn shapes(pairs: &[[usize; 2]]) -> Vec<LayerShape> {
        pairs.iter().copied().map(LayerShape::from).collect()
    }

    fn random_network(hidden: &[usize], activation: Activation, rng: &mut Pcg32) -> Network {
        Network::random(INPUT, layer_chain(INPUT, hidden, 4), activation, rng).unwrap()
    }

    fn relu_parts(
        layer_shapes: &[LayerShape],
        weights: Vec<Vec<Vec<f32>>>,
        biases: Vec<Vec<f32>>,
    ) -> Result<Network, NetworkError> {
        Network::from_parts(INPUT, layer_shapes.to_vec(), Activation::Relu, weights, biases)
    }

    #[test]
    fn test_topology_validation() {
        let cases = [
            (shapes(&[]), TopologyError::NoLayers),
            (
                shapes(&[[4, 24]]),
                TopologyError::InputMismatch {
                    expected: 25,
                    actual: 24,
                },
            ),
            (
                shapes(&[[8, 25], [3, 8]]),
                TopologyError::OutputMismatch {
                    expected: 4,
                    actual: 3,
                },
            ),
            (
                shapes(&[[8, 25], [4, 7]]),
                TopologyError::ChainBreak {
                    layer: 1,
                    expected: 8,
                    actual: 7,
                },
            ),
            (
                shapes(&[[0, 25], [4, 0]]),
                TopologyError::ZeroSized { layer: 0 },
            ),
        ];
        for (layer_shapes, expected) in cases {
            let err =
                Network::random(INPUT, layer_shapes, Activation::Tanh, &mut rng()).unwrap_err();
            assert_eq!(err, expected);
        }
        assert!(Network::random(INPUT, shapes(&[[4, 25]]), Activation::Tanh, &mut rng()).is_ok());
    }

    #[test]
    fn test_from_parts_rejects_bad_tensors() {
        let layer_shapes = shapes(&[[2, 25], [4, 2]]);
        let good_w = vec![vec![vec![0.5; 25]; 2], vec![vec![-0.5; 2]; 4]];
        let good_b = vec![vec![0.0; 2], vec![0.0; 4]];
        assert!(relu_parts(&layer_shapes, good_w.clone(), good_b.clone()).is_ok());

        let mut w = good_w.clone();
        w[1][3][1] = 1.5;
        let err = relu_parts(&layer_shapes, w, good_b.clone()).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::InvalidParameters(ParameterError::OutOfRange {
                layer: 1,
                kind: TensorKind::Weight
            })
        ));

        let mut b = good_b.clone();
        b[0][0] = f32::NAN;
        let err = relu_parts(&layer_shapes, good_w.clone(), b).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::InvalidParameters(ParameterError::OutOfRange {
                layer: 0,
                kind: TensorKind::Bias
            })
        ));

        let mut w = good_w.clone();
        w[0][1].pop();
        let err = relu_parts(&layer_shapes, w, good_b.clone()).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::InvalidParameters(ParameterError::WeightColumns { layer: 0, row: 1, .. })
        ));

        let err = relu_parts(&layer_shapes, good_w, vec![vec![0.0; 2]]).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::InvalidParameters(ParameterError::LayerCount {
                kind: TensorKind::Bias,
                ..
            })
        ));
    }

    #[test]
    fn test_compute_picks_largest_output() {
        // Single linear layer: output i copies input i.
        let mut weights = vec![vec![0.0; INPUT]; 4];
        for (i, row) in weights.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        let network = Network::from_parts(
            INPUT,
            shapes(&[[4, 25]]),
            Activation::Tanh,
            vec![weights],
            vec![vec![0.0; 4]],
        )
        .unwrap();

        let mut input = [0.0; INPUT];
        input[2] = 0.9;
        assert_eq!(network.compute(&input), Direction::Left);
        input[3] = 1.0;
        assert_eq!(network.compute(&input), Direction::Right);
    }

    #[test]
    fn test_hidden_activation_is_applied() {
        // Hidden ReLU zeroes the negative input, so the bias decides.
        let network = Network::from_parts(
            INPUT,
            shapes(&[[1, 25], [4, 1]]),
            Activation::Relu,
            vec![
                vec![{
                    let mut row = vec![0.0; INPUT];
                    row[0] = 1.0;
                    row
                }],
                vec![vec![1.0], vec![-1.0], vec![0.0], vec![0.0]],
            ],
            vec![vec![0.0], vec![0.0, 0.0, 0.1, 0.0]],
        )
        .unwrap();
        let mut input = [0.0; INPUT];
        input[0] = -1.0;
        assert_eq!(network.forward(&input), vec![0.0, 0.0, 0.1, 0.0]);
        assert_eq!(network.compute(&input), Direction::Left);
        input[0] = 1.0;
        assert_eq!(network.compute(&input), Direction::Up);
    }

    #[test]
    fn test_crossover_copies_parent_values() {
        let mut rng = rng();
        let layer_shapes = layer_chain(INPUT, &[16], 4);
        let a = Network::random(INPUT, layer_shapes.clone(), Activation::Tanh, &mut rng).unwrap();
        let b = Network::random(INPUT, layer_shapes.clone(), Activation::Tanh, &mut rng).unwrap();
        let mut child = Network::random(INPUT, layer_shapes, Activation::Tanh, &mut rng).unwrap();
        child.crossover(&a, &b, &mut rng);

        let mut from_a = 0;
        let mut from_b = 0;
        for ((c, x), y) in child.parameters().zip(a.parameters()).zip(b.parameters()) {
            assert!(c == x || c == y);
            from_a += usize::from(c == x);
            from_b += usize::from(c == y);
        }
        // Both parents contribute.
        assert!(from_a > 0 && from_b > 0);
    }

    #[test]
    #[should_panic(expected = "crossover between different topologies")]
    fn test_crossover_rejects_mismatched_topologies() {
        let mut rng = rng();
        let a = random_network(&[8], Activation::Tanh, &mut rng);
        let b = random_network(&[9], Activation::Tanh, &mut rng);
        let _ = Network::crossed(&a, &b, &mut rng);
    }

    #[test]
    fn test_mutation_bound_and_rate() {
        let mut rng = rng();
        let rate = 0.1;
        let amount = 0.3;
        let mut changed = 0;
        let mut total = 0;
        for _ in 0..5 {
            let before = random_network(&[128, 128], Activation::Tanh, &mut rng);
            let mut after = before.clone();
            after.mutate(rate, amount, &mut rng);
            for (x, y) in before.parameters().zip(after.parameters()) {
                assert!((-1.0..=1.0).contains(&y));
                assert!((x - y).abs() <= amount + f32::EPSILON);
                changed += usize::from(x != y);
                total += 1;
            }
        }
        assert!(total >= 10_000);
        #[expect(clippy::cast_precision_loss)]
        let fraction = changed as f64 / total as f64;
        assert!((fraction - rate).abs() < 0.01, "fraction {fraction}");
    }

    #[test]
    fn test_mutation_with_zero_rate_keeps_network() {
        let mut rng = rng();
        let before = random_network(&[8], Activation::Tanh, &mut rng);
        let mut after = before.clone();
        after.mutate(0.0, 0.5, &mut rng);
        assert_eq!(before, after);
    }

    #[test]
    fn test_model_json_roundtrip_validates() {
        let mut rng = rng();
        let network = random_network(&[3], Activation::Relu, &mut rng);
        let json = serde_json::to_value(&network).unwrap();
        assert_eq!(json["inputLength"], 25);
        assert_eq!(json["layerShapes"], serde_json::json!([[3, 25], [4, 3]]));
        assert_eq!(json["activation"], "RELU");
        let parsed: Network = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(parsed, network);

        let mut broken = json;
        broken["layerShapes"] = serde_json::json!([[3, 25], [5, 3]]);
        assert!(serde_json::from_value::<Network>(broken).is_err());
    }
}
