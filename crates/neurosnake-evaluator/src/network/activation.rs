use serde::{Deserialize, Serialize};

/// Activation applied to every hidden layer's output.
///
/// The output layer is never activated; its raw values go to the argmax.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Activation {
    /// Identity.
    #[display("LINEAR")]
    Linear,
    #[default]
    #[display("TANH")]
    Tanh,
    /// `max(0, x)`.
    #[display("RELU")]
    Relu,
}

impl Activation {
    #[inline]
    #[must_use]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Linear => x,
            Self::Tanh => x.tanh(),
            Self::Relu => x.max(0.0),
        }
    }

    pub fn apply_all(self, values: &mut [f32]) {
        if self == Self::Linear {
            return;
        }
        for v in values {
            *v = self.apply(*v);
        }
    }
}
