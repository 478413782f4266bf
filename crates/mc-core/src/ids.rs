use core::fmt;
use core::num::NonZeroU32;

/// Position of a component in one of the model's sets.
///
/// Stored off by one in a `NonZeroU32` so `Option<Id>` costs nothing extra.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Indices past `u32::MAX - 1` saturate.
    pub const fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    pub const fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

pub type BodyId = Id;
pub type JointId = Id;
pub type CoordId = Id;
pub type ActuatorId = Id;

/// Engine index of a kinematic constraint.
///
/// Indices count every constraint in the model, enabled or not, so a
/// disabled constraint leaves a gap in the enabled set.
pub type ConstraintIndex = Id;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_survives_storage() {
        for i in [0_u32, 7, 1_000, u32::MAX - 1] {
            assert_eq!(Id::from_index(i).index(), i);
        }
    }

    #[test]
    fn optional_ids_need_no_tag() {
        assert_eq!(size_of::<Option<CoordId>>(), size_of::<u32>());
    }

    #[test]
    fn printed_zero_based() {
        assert_eq!(ConstraintIndex::from_index(3).to_string(), "3");
        assert_eq!(format!("{:?}", BodyId::from_index(0)), "#0");
    }
}
