//! Message tags for the four flows of a halo exchange.

use crate::algs::communicator::CommTag;
use crate::decomposition::Direction;

/// One tag per direction of data flow, so the two messages crossing a shared
/// face can never be confused with each other.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HaloCommTags {
    /// Data moving toward +x.
    pub x_l2r: CommTag,
    /// Data moving toward -x.
    pub x_r2l: CommTag,
    /// Data moving toward +y.
    pub y_b2t: CommTag,
    /// Data moving toward -y.
    pub y_t2b: CommTag,
}

impl HaloCommTags {
    /// Four consecutive tags starting at `base`.
    pub const fn from_base(base: CommTag) -> Self {
        Self {
            x_l2r: base,
            x_r2l: base.offset(1),
            y_b2t: base.offset(2),
            y_t2b: base.offset(3),
        }
    }

    /// `(send_tag, recv_tag)` for the exchange with the neighbor in `dir`.
    pub fn pair(&self, dir: Direction) -> (CommTag, CommTag) {
        match dir {
            Direction::Left => (self.x_r2l, self.x_l2r),
            Direction::Right => (self.x_l2r, self.x_r2l),
            Direction::Up => (self.y_b2t, self.y_t2b),
            Direction::Down => (self.y_t2b, self.y_b2t),
        }
    }
}

impl Default for HaloCommTags {
    fn default() -> Self {
        Self::from_base(CommTag::new(10))
    }
}
