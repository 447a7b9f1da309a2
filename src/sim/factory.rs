//! Randomized brick-behavior assignment
//!
//! The level builder draws one behavior per brick from a seeded factory:
//! half the bricks are plain, each augmenting behavior gets a 10% slice,
//! and the last 10% builds a dual that stacks two behaviors - occasionally
//! nesting further duals, under a hard whole-tree bound so construction
//! always terminates.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use super::behavior::BrickBehavior;

/// One draw in ten builds a dual; four single draws pick augmenting kinds
const DRAW_RANGE: u32 = 10;
const DUAL_ROLL: u32 = 4;
/// 1-in-this chance that a dual slot recurses into another dual
const NESTED_DUAL_IN: u32 = 5;
/// Nested duals allowed below a top-level dual, shared across its whole tree
pub const MAX_NESTED_DUALS: u32 = 2;

/// Errors from level/behavior construction
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("level has no bricks to assign behaviors to")]
    NoBricks,
}

/// Hands out one behavior per brick at level-build time
#[derive(Debug, Clone)]
pub struct BehaviorFactory {
    rng: Pcg32,
    total: u32,
    issued: u32,
}

impl BehaviorFactory {
    /// `total` is the brick count of the level being built. Degenerate empty
    /// levels are refused up front.
    pub fn new(total: u32, seed: u64) -> Result<Self, LevelError> {
        if total == 0 {
            return Err(LevelError::NoBricks);
        }
        Ok(Self {
            rng: Pcg32::seed_from_u64(seed),
            total,
            issued: 0,
        })
    }

    /// Draw the next brick's behavior.
    ///
    /// Panics when drawn more often than the brick count declared at
    /// construction - that is a level-builder bug, not a runtime condition.
    pub fn next_behavior(&mut self) -> BrickBehavior {
        assert!(
            self.issued < self.total,
            "behavior factory exhausted after {} draws",
            self.total
        );
        self.issued += 1;

        match self.rng.random_range(0..DRAW_RANGE) {
            0 => BrickBehavior::SplitBalls,
            1 => BrickBehavior::ExtraPaddle,
            2 => BrickBehavior::CameraFocus,
            3 => BrickBehavior::DropHeart,
            DUAL_ROLL => self.dual_behavior(MAX_NESTED_DUALS).0,
            _ => BrickBehavior::Plain,
        }
    }

    /// Build a dual. `budget` is how many more nested duals the whole tree
    /// may still contain; the leftover flows back out so sibling slots share
    /// one bound instead of each getting their own.
    fn dual_behavior(&mut self, budget: u32) -> (BrickBehavior, u32) {
        let (first, budget) = self.dual_slot(budget);
        let (second, budget) = self.dual_slot(budget);
        (
            BrickBehavior::Dual(Box::new(first), Box::new(second)),
            budget,
        )
    }

    /// Fill one slot of a dual: usually an augmenting behavior, sometimes
    /// (budget permitting) another dual. Plain never appears inside a dual.
    fn dual_slot(&mut self, budget: u32) -> (BrickBehavior, u32) {
        if budget > 0 && self.rng.random_range(0..NESTED_DUAL_IN) == 0 {
            self.dual_behavior(budget - 1)
        } else {
            (self.augmenting(), budget)
        }
    }

    /// Uniform pick among the four augmenting behaviors
    fn augmenting(&mut self) -> BrickBehavior {
        match self.rng.random_range(0..4) {
            0 => BrickBehavior::SplitBalls,
            1 => BrickBehavior::ExtraPaddle,
            2 => BrickBehavior::CameraFocus,
            _ => BrickBehavior::DropHeart,
        }
    }
}
