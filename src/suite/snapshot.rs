use crate::chain::{ChainBackend, HeadId, SnapshotId};
use crate::error::ChainError;
use std::fmt;

/// Head id a fork reports for its initial state.
pub const FALLBACK_HEAD: &str = "0x1";

/// Which primitive pair isolates groups. Chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStrategy {
    /// `evm_snapshot` / `evm_revert` on a local node.
    LocalSnapshot,
    /// Head pointer get/set on a remote simulated fork.
    ForkHead,
}

impl SnapshotStrategy {
    pub fn from_fork_flag(fork_head: bool) -> Self {
        if fork_head {
            Self::ForkHead
        } else {
            Self::LocalSnapshot
        }
    }

    pub async fn capture(self, chain: &dyn ChainBackend) -> Result<Checkpoint, ChainError> {
        match self {
            Self::LocalSnapshot => chain.snapshot().await.map(Checkpoint::Snapshot),
            Self::ForkHead => {
                let head = chain
                    .head()
                    .await?
                    .unwrap_or_else(|| HeadId(FALLBACK_HEAD.to_string()));
                Ok(Checkpoint::Head(head))
            }
        }
    }
}

/// Chain state captured at group start. Restoring consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checkpoint {
    Snapshot(SnapshotId),
    Head(HeadId),
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot(id) => write!(f, "snapshot {id}"),
            Self::Head(head) => write!(f, "head {head}"),
        }
    }
}

impl Checkpoint {
    /// Roll the chain back. `Ok(false)` means the node no longer knew the snapshot.
    pub async fn restore(self, chain: &dyn ChainBackend) -> Result<bool, ChainError> {
        match self {
            Self::Snapshot(id) => chain.revert(&id).await,
            Self::Head(head) => chain.set_head(&head).await.map(|()| true),
        }
    }
}
