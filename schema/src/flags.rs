//! Receiver capability flags.

use bitflags::bitflags;

bitflags! {
    /// Relationship of a receiver to the entity being serialized.
    ///
    /// Computed by the world layer per `(subject, receiver)` pair. A slot
    /// declared with a non-empty visibility is sent only to receivers holding
    /// at least one of its flags; an empty visibility means "everyone".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct UpdateFieldFlags: u8 {
        /// The receiver owns (controls) the entity.
        const OWNER = 0x01;
        /// The receiver is in the owner's party or raid.
        const PARTY_MEMBER = 0x02;
        /// Extended unit information shared with every receiver.
        const UNIT_ALL = 0x04;
        /// The receiver has long-range inspection rights on the entity.
        const EMPATH = 0x08;
    }
}

impl UpdateFieldFlags {
    /// No special relationship.
    pub const NONE: Self = Self::empty();

    /// Returns `true` if a slot declared with `visibility` may be sent to a
    /// receiver holding `self`.
    #[must_use]
    pub const fn admits(self, visibility: Self) -> bool {
        visibility.is_empty() || self.intersects(visibility)
    }
}
