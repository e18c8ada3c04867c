use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// Handle to a decision-diagram node, possibly complemented.
///
/// The sign carries the complement bit: `-r` denotes the negation of the
/// function referenced by `r`. Index `1` is the terminal node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Ref(i32);

impl Ref {
    pub const fn positive(index: u32) -> Self {
        assert!(index != 0, "Node index should not be zero");
        Self(index as i32)
    }

    pub const fn is_negated(self) -> bool {
        self.0 < 0
    }

    pub const fn negate(self) -> Self {
        Self(-self.0)
    }

    /// Index of the referenced node, ignoring the complement bit.
    pub const fn id(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// Non-negative encoding of the reference, used for hashing.
    pub(crate) const fn unsigned(self) -> u32 {
        (self.0.unsigned_abs() << 1) + (self.0 < 0) as u32
    }
}

impl Neg for Ref {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", if self.is_negated() { "~" } else { "" }, self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negate() {
        let r = Ref::positive(5);
        assert!(!r.is_negated());
        assert!((-r).is_negated());
        assert_eq!(-(-r), r);
        assert_eq!((-r).id(), 5);
    }

    #[test]
    fn test_unsigned_is_injective() {
        let a = Ref::positive(3);
        assert_ne!(a.unsigned(), (-a).unsigned());
        assert_eq!(a.unsigned(), 6);
        assert_eq!((-a).unsigned(), 7);
    }

    #[test]
    fn test_display() {
        let r = Ref::positive(2);
        assert_eq!(r.to_string(), "@2");
        assert_eq!((-r).to_string(), "~@2");
    }
}
