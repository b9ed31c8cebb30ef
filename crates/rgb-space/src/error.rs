//! Space error types.

use thiserror::Error;

use crate::entity::EntityId;

/// Space error type.
///
/// Variants flagged by [`SpaceError::is_fatal`] are invariant violations:
/// shared containment state can no longer be trusted and the hosting
/// runtime is expected to stop the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpaceError {
    /// A second space with kind 0 was created or restored.
    #[error("duplicate nil space: {existing} && {duplicate}")]
    DuplicateNilSpace {
        existing: EntityId,
        duplicate: EntityId,
    },

    /// The null space was used before it was established.
    #[error("nil space is not created yet")]
    NilSpaceMissing,

    /// The null space lives as long as the process.
    #[error("nil space {0} cannot be destroyed")]
    NilSpaceIndestructible(EntityId),

    /// The spatial index of a space was configured twice.
    #[error("space {0} is already using AOI")]
    AoiAlreadyConfigured(EntityId),

    /// The spatial index was configured after entities entered.
    #[error("space {space} already contains {count} entities, AOI must be configured first")]
    AoiAfterEntered { space: EntityId, count: usize },

    /// An entity entered a space while still placed in another real space.
    #[error("space {space}: enter({entity}): current space {current} is not nil")]
    NotInNilSpace {
        space: EntityId,
        entity: EntityId,
        current: EntityId,
    },

    /// An entity left a space it is not a member of.
    #[error("space {space}: leave({entity}): entity is not in this space")]
    NotInSpace { space: EntityId, entity: EntityId },

    /// An id is already registered.
    #[error("duplicate id: {0}")]
    DuplicateId(EntityId),

    /// No entity with this id is alive.
    #[error("entity not found: {0}")]
    UnknownEntity(EntityId),

    /// No space with this id is registered.
    #[error("space not found: {0}")]
    UnknownSpace(EntityId),

    /// AOI bounds must be finite and ordered, the radius finite and positive.
    #[error("space {space}: invalid AOI settings")]
    InvalidAoiSettings { space: EntityId },

    /// The entity type name was never registered.
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    /// Space kinds cannot be registered twice, and kind 0 is reserved.
    #[error("invalid space kind registration: {0}")]
    InvalidSpaceKind(i32),
}

impl SpaceError {
    /// Check if this error is an invariant violation.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DuplicateNilSpace { .. }
                | Self::NilSpaceMissing
                | Self::NilSpaceIndestructible(_)
                | Self::AoiAlreadyConfigured(_)
                | Self::AoiAfterEntered { .. }
                | Self::NotInNilSpace { .. }
                | Self::NotInSpace { .. }
        )
    }
}

/// Result type for space operations.
pub type SpaceResult<T> = Result<T, SpaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let id = EntityId::new(7);

        assert!(SpaceError::AoiAlreadyConfigured(id).is_fatal());
        assert!(
            SpaceError::NotInSpace {
                space: id,
                entity: EntityId::new(8),
            }
            .is_fatal()
        );
        assert!(!SpaceError::DuplicateId(id).is_fatal());
        assert!(!SpaceError::UnknownEntityType("Monster".into()).is_fatal());
        assert!(!SpaceError::InvalidAoiSettings { space: id }.is_fatal());
        assert!(!SpaceError::InvalidSpaceKind(0).is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = SpaceError::DuplicateNilSpace {
            existing: EntityId::new(1),
            duplicate: EntityId::new(2),
        };
        assert_eq!(err.to_string(), "duplicate nil space: 1 && 2");
    }
}
