//! Linear value function over [`crate::features`], squashed into `[-1, 1]`.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chess_core::Position;

use crate::features::{self, Features, MATERIAL, NUM_FEATURES};

/// Starting weights for P, N, B, R, Q. A queen up reads as about +0.7.
const BASELINE_MATERIAL: [f32; 5] = [0.1, 0.3, 0.32, 0.5, 0.9];

/// A source of position values for the side to move.
///
/// `freeze` hands out a consistent view for one search iteration, so the
/// search never mixes weights from before and after a training update.
pub trait Evaluate {
    type Frozen: Evaluate;

    /// Value in `[-1, 1]` for the side to move.
    fn value(&self, pos: &Position) -> f32;

    fn freeze(&self) -> Self::Frozen;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluator {
    weights: Vec<f32>,
    updates: u64,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::baseline()
    }
}

impl Evaluator {
    /// Material-only weights; everything else starts at zero.
    pub fn baseline() -> Self {
        let mut weights = vec![0.0; NUM_FEATURES];
        weights[MATERIAL..MATERIAL + 5].copy_from_slice(&BASELINE_MATERIAL);
        Self { weights, updates: 0 }
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Number of update steps applied since the baseline.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Raw linear score before squashing.
    pub fn linear(&self, x: &Features) -> f32 {
        x.entries().iter().map(|&(i, v)| self.weights[i] * v).sum()
    }

    pub fn value_of(&self, x: &Features) -> f32 {
        self.linear(x).tanh()
    }

    /// One gradient step on `(target - value)^2 / 2`, normalised by
    /// `1 + |x|^2`. Returns the value after the step.
    ///
    /// With `learning_rate` in `(0, 1]` the new value lies between the old
    /// value and the target.
    pub fn update(&mut self, pos: &Position, target: f32, learning_rate: f32) -> f32 {
        let x = features::extract(pos);
        self.update_features(&x, target, learning_rate)
    }

    pub fn update_features(&mut self, x: &Features, target: f32, learning_rate: f32) -> f32 {
        let target = target.clamp(-1.0, 1.0);
        let v = self.value_of(x);
        let step = learning_rate * (target - v) * (1.0 - v * v) / (1.0 + x.norm_sq());
        for &(i, xi) in x.entries() {
            self.weights[i] += step * xi;
        }
        self.updates += 1;
        self.value_of(x)
    }
}

impl Evaluate for Evaluator {
    type Frozen = Evaluator;

    fn value(&self, pos: &Position) -> f32 {
        self.value_of(&features::extract(pos))
    }

    fn freeze(&self) -> Evaluator {
        self.clone()
    }
}

/// The evaluator of one game, shared by the trainer (writer) and the search
/// (reader). Each call holds the lock for that call only.
#[derive(Debug, Clone, Default)]
pub struct SharedEvaluator {
    inner: Arc<RwLock<Evaluator>>,
}

impl SharedEvaluator {
    pub fn new(evaluator: Evaluator) -> Self {
        Self {
            inner: Arc::new(RwLock::new(evaluator)),
        }
    }

    pub fn baseline() -> Self {
        Self::new(Evaluator::baseline())
    }

    /// Feature extraction happens outside the lock.
    pub fn update(&self, pos: &Position, target: f32, learning_rate: f32) -> f32 {
        let x = features::extract(pos);
        self.write().update_features(&x, target, learning_rate)
    }

    /// Copy of the current weights.
    pub fn snapshot(&self) -> Evaluator {
        self.read().clone()
    }

    /// Back to the material baseline.
    pub fn reset(&self) {
        *self.write() = Evaluator::baseline();
    }

    pub fn updates(&self) -> u64 {
        self.read().updates()
    }

    fn read(&self) -> RwLockReadGuard<'_, Evaluator> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Evaluator> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Evaluate for SharedEvaluator {
    type Frozen = Evaluator;

    fn value(&self, pos: &Position) -> f32 {
        let x = features::extract(pos);
        self.read().value_of(&x)
    }

    fn freeze(&self) -> Evaluator {
        self.snapshot()
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod evaluator_tests;
