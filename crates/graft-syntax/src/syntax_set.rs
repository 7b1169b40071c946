use crate::SyntaxKind;

const _: () = assert!((SyntaxKind::TOMBSTONE as u32) < u128::BITS, "kinds must fit in one word");

/// A set of kinds usable in `const` position, e.g. the tokens that may start
/// an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyntaxSet(u128);

impl SyntaxSet {
    pub const EMPTY: Self = Self(0);

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < N {
            bits |= 1 << kinds[i] as u32;
            i += 1;
        }
        Self(bits)
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, kind: SyntaxKind) -> bool {
        self.0 & (1 << kind as u32) != 0
    }
}
