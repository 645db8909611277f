// src/outcome.rs
//
// Classification of raw at-bat outcome tokens. Pure functions, no I/O.
//
// The box-score source records outcomes as short Japanese markers, usually
// fused with a fielding direction ("右安" = single to right field), so hit
// and walk categories match by substring containment. Hit-by-pitch
// ("死　球") and strikeout ("三　振") must match the exact literal: their
// characters also occur inside unrelated tokens (e.g. "三" in a groundout
// to third). The asymmetry is part of the source encoding.

pub const SINGLE: &str = "安";
pub const DOUBLE: &str = "２";
pub const TRIPLE: &str = "３";
pub const HOME_RUN: &str = "本";
pub const WALK: &str = "四";
pub const HIT_BY_PITCH: &str = "死　球";
pub const SACRIFICE_HIT: &str = "犠打";
pub const SACRIFICE_FLY: &str = "犠飛";
pub const STRIKEOUT: &str = "三　振";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutcomeFacts {
    /// 0 = not a hit, otherwise 1..=4 bases.
    pub hit_bases: u8,
    pub is_walk: bool,
    pub is_hit_by_pitch: bool,
    pub is_sacrifice_hit: bool,
    pub is_sacrifice_fly: bool,
    pub is_strikeout: bool,
}

impl OutcomeFacts {
    pub fn is_hit(&self) -> bool {
        self.hit_bases > 0
    }
}

pub fn classify(token: &str) -> OutcomeFacts {
    OutcomeFacts {
        hit_bases: hit_bases(token),
        is_walk: token.contains(WALK),
        is_hit_by_pitch: token == HIT_BY_PITCH,
        is_sacrifice_hit: token == SACRIFICE_HIT,
        is_sacrifice_fly: token == SACRIFICE_FLY,
        is_strikeout: token == STRIKEOUT,
    }
}

fn hit_bases(token: &str) -> u8 {
    if token.contains(HOME_RUN) {
        4
    } else if token.contains(TRIPLE) {
        3
    } else if token.contains(DOUBLE) {
        2
    } else if token.contains(SINGLE) {
        1
    } else {
        0
    }
}

/// Whether the token counts toward official at-bats. Walks and both
/// sacrifices are excluded by containment, hit-by-pitch by exact match,
/// following how the source writes these tokens.
pub fn counts_as_at_bat(token: &str) -> bool {
    !(token.contains(WALK)
        || token == HIT_BY_PITCH
        || token.contains(SACRIFICE_HIT)
        || token.contains(SACRIFICE_FLY))
}
