use derive_more::derive::{Display, IsVariant};

/// The role of the driver, fixed for its whole lifetime.
///
/// ```text
///                  | block production | derivation steps |
///   Sequencer      |       yes        |     ignored      |
///   Follower       |     ignored      |       yes        |
/// ```
///
/// Both roles track the L1 head and recover from L1 reorgs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, IsVariant)]
pub enum Role {
    /// Produces new unsafe L2 blocks on a timer and submits them as batches.
    Sequencer,
    /// Derives safe L2 blocks from L1 sequencing windows.
    #[default]
    Follower,
}

impl Role {
    /// Create a role from the sequencer CLI flag.
    pub const fn from_sequencer_flag(sequencer: bool) -> Self {
        if sequencer { Self::Sequencer } else { Self::Follower }
    }

    /// Returns true if the driver runs the block production path.
    pub const fn can_sequence(&self) -> bool {
        matches!(self, Self::Sequencer)
    }

    /// Returns true if the driver runs derivation steps on L1 progress.
    pub const fn can_derive(&self) -> bool {
        matches!(self, Self::Follower)
    }

    /// Returns an iterable slice of the enum variants.
    pub(crate) const fn variant_names() -> &'static [&'static str; 2] {
        &["Sequencer", "Follower"]
    }
}
