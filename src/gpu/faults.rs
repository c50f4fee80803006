use std::fmt;

use anyhow::{Result, bail};
use tracing::warn;

/// Classified reason behind a GPU error reported after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuFault {
    /// Invalid value, enum or operation rejected by validation.
    Validation,
    OutOfMemory,
    /// Driver or backend failure, or anything unclassified.
    Internal,
}

impl GpuFault {
    #[allow(unreachable_patterns)]
    pub fn classify(err: &wgpu::Error) -> Self {
        match err {
            wgpu::Error::Validation { .. } => Self::Validation,
            wgpu::Error::OutOfMemory { .. } => Self::OutOfMemory,
            _ => Self::Internal,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::OutOfMemory => "out-of-memory",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for GpuFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts consecutive frames that reported GPU errors.
///
/// Faults are logged and tolerated; with a limit configured, the viewer gives
/// up once that many frames in a row have failed.
#[derive(Debug, Clone, Default)]
pub struct FaultTracker {
    limit: Option<u32>,
    consecutive: u32,
    total: u64,
}

impl FaultTracker {
    pub fn new(limit: Option<u32>) -> Self {
        Self {
            limit,
            consecutive: 0,
            total: 0,
        }
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Record the outcome of one frame.
    pub fn record(&mut self, faults: &[(GpuFault, String)]) -> Result<()> {
        if faults.is_empty() {
            self.consecutive = 0;
            return Ok(());
        }
        for (kind, detail) in faults {
            warn!(kind = %kind, error = %detail, "gpu error");
        }
        self.consecutive += 1;
        self.total += faults.len() as u64;
        if let Some(limit) = self.limit
            && self.consecutive >= limit
        {
            bail!("{} consecutive frames reported gpu errors", self.consecutive);
        }
        Ok(())
    }
}
