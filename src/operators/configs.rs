//! Operator configuration enums
//!
//! Load-balancing strategies, advance input/output kinds and directions. The
//! enums list every option the framework names; operators reject the ones
//! they have no kernel for with an `EngineError`.

use crate::EngineError;
use serde::{Deserialize, Serialize};

/// Load-balancing technique used by advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalance {
    /// One input element per thread
    ThreadMapped,
    /// Equal number of elements per warp (reserved)
    WarpMapped,
    /// Equal number of elements per block, cooperative expansion
    BlockMapped,
    /// Davidson et al. SSSP bucketing (reserved)
    Bucketing,
    /// Merrill & Garland merge-path partitioning
    MergePath,
    /// Work stealing (reserved)
    WorkStealing,
}

impl LoadBalance {
    /// True if advance has a kernel for this strategy
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::ThreadMapped | Self::BlockMapped | Self::MergePath)
    }
}

/// Kind of input and output frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceType {
    /// Vertex input, neighboring vertices out
    VertexToVertex,
    /// Vertex input, traversed edge ids out
    VertexToEdge,
    /// Edge input, edge output (reserved)
    EdgeToEdge,
    /// Edge input, vertex output (reserved)
    EdgeToVertex,
}

/// Direction of traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceDirection {
    /// Push-based
    Forward,
    /// Pull-based (reserved)
    Backward,
    /// Push-pull switching (reserved)
    Optimized,
}

/// Per-call advance configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvanceConfig {
    /// Load-balancing strategy
    pub load_balance: LoadBalance,
    /// Input/output frontier kinds
    pub advance_type: AdvanceType,
    /// Traversal direction
    pub direction: AdvanceDirection,
}

impl Default for AdvanceConfig {
    fn default() -> Self {
        Self {
            load_balance: LoadBalance::MergePath,
            advance_type: AdvanceType::VertexToVertex,
            direction: AdvanceDirection::Forward,
        }
    }
}

impl AdvanceConfig {
    /// Default configuration with the given strategy
    #[must_use]
    pub fn with_load_balance(load_balance: LoadBalance) -> Self {
        Self {
            load_balance,
            ..Self::default()
        }
    }

    /// Replace the advance type
    #[must_use]
    pub const fn advance_type(mut self, advance_type: AdvanceType) -> Self {
        self.advance_type = advance_type;
        self
    }

    /// Replace the direction
    #[must_use]
    pub const fn direction(mut self, direction: AdvanceDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Reject combinations without a kernel
    ///
    /// # Errors
    ///
    /// Returns the matching `Unsupported*` error
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.load_balance.is_supported() {
            return Err(EngineError::UnsupportedLoadBalance(self.load_balance));
        }
        if !matches!(
            self.advance_type,
            AdvanceType::VertexToVertex | AdvanceType::VertexToEdge
        ) {
            return Err(EngineError::UnsupportedAdvanceType(self.advance_type));
        }
        if self.direction != AdvanceDirection::Forward {
            return Err(EngineError::UnsupportedDirection(self.direction));
        }
        Ok(())
    }
}
