//! Tactical pattern library
//!
//! Every pattern describes what playing one cell (the *anchor*) creates on
//! a single line: five, open four, four, open three, closed three or open
//! two. Patterns are written as short templates and compiled into bit
//! masks at compile time:
//!
//! | char | meaning                                   |
//! |------|-------------------------------------------|
//! | `X`  | own stone                                 |
//! | `*`  | the anchor, must be empty, defence cell   |
//! | `.`  | must be empty                             |
//! | `#`  | must be empty, defence cell               |
//! | `O`  | enemy stone or board edge                 |
//!
//! Templates read in the direction bit positions grow along a line (see
//! [`Direction`](crate::board::Direction)). The table is sorted by
//! descending priority, so the first match on a line is the strongest.
//!
//! # Example
//!
//! ```
//! use gomoku::eval::patterns::{find_match, LineView, Priority};
//!
//! // Own stones at bits 3..=5, candidate at bit 6, everything else empty.
//! let view = LineView::new(0b0011_1000, 0, (1 << 19) - 1, 6);
//! let pattern = find_match(&view).unwrap();
//! assert_eq!(pattern.priority, Priority::URGENT);
//! ```

/// Priority levels shared by attack and defence scores.
///
/// Levels index the ranking buckets, so they must stay below
/// [`Priority::LEVELS`].
pub struct Priority;

impl Priority {
    pub const NONE: u8 = 0;
    /// Open two, closed three
    pub const LOW: u8 = 2;
    /// Four (closed or broken), open three
    pub const HIGH: u8 = 4;
    /// Two independent threats at once
    pub const VITAL: u8 = 5;
    /// Open four
    pub const URGENT: u8 = 6;
    /// Five
    pub const IMMEDIATE: u8 = 8;
    pub const MAX: u8 = Priority::IMMEDIATE;
    pub const LEVELS: usize = Priority::MAX as usize + 1;
}

/// Threat families used to collapse equivalent defence entries.
pub struct Miai;

impl Miai {
    pub const FIVE: u8 = 1;
    pub const OPEN_FOUR: u8 = 2;
    pub const FOUR: u8 = 3;
    pub const OPEN_THREE: u8 = 4;
    pub const CLOSED_THREE: u8 = 5;
    pub const OPEN_TWO: u8 = 6;
}

/// Zero bits below a line so that templates reaching past the board edge
/// never shift out of range.
pub const PAD: u32 = 8;

/// Maximum distance from an anchor to any template cell.
const REACH: u32 = 4;

const MAX_DEFENCE: usize = 4;

/// One template component: a bit mask plus the offset of its lowest bit
/// relative to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub mask: u16,
    pub shift: i8,
}

impl Component {
    const NONE: Component = Component { mask: 0, shift: 0 };

    const fn from_bits(bits: u16, anchor: usize) -> Self {
        if bits == 0 {
            return Component::NONE;
        }
        let low = bits.trailing_zeros();
        Component {
            mask: bits >> low,
            shift: low as i8 - anchor as i8,
        }
    }

    #[inline]
    fn matches(self, line: u64, at: u32) -> bool {
        let mask = self.mask as u64;
        let offset = (at as i32 + self.shift as i32) as u32;
        (line >> offset) & mask == mask
    }
}

/// A compiled pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub id: u8,
    pub priority: u8,
    pub miai: u8,
    pub stones: Component,
    pub empty: Component,
    pub enemy: Component,
    defence: [i8; MAX_DEFENCE],
    defence_len: u8,
}

impl Pattern {
    const PLACEHOLDER: Pattern = Pattern {
        id: 0,
        priority: Priority::NONE,
        miai: 0,
        stones: Component::NONE,
        empty: Component::NONE,
        enemy: Component::NONE,
        defence: [0; MAX_DEFENCE],
        defence_len: 0,
    };

    const fn compile(id: u8, template: &str, priority: u8, miai: u8) -> Pattern {
        let bytes = template.as_bytes();
        assert!(bytes.len() <= 2 * REACH as usize + 1, "pattern template too long");

        let mut anchor = usize::MAX;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'*' {
                anchor = i;
            }
            i += 1;
        }
        assert!(anchor != usize::MAX, "pattern template without anchor");

        let mut stones = 0u16;
        let mut empty = 0u16;
        let mut enemy = 0u16;
        let mut defence = [0i8; MAX_DEFENCE];
        let mut defence_len = 0usize;
        i = 0;
        while i < bytes.len() {
            let bit = 1u16 << i;
            match bytes[i] {
                b'X' => stones |= bit,
                b'O' => enemy |= bit,
                b'.' => empty |= bit,
                b'*' | b'#' => {
                    empty |= bit;
                    assert!(defence_len < MAX_DEFENCE, "too many defence cells");
                    defence[defence_len] = i as i8 - anchor as i8;
                    defence_len += 1;
                }
                _ => panic!("unknown pattern template character"),
            }
            i += 1;
        }

        Pattern {
            id,
            priority,
            miai,
            stones: Component::from_bits(stones, anchor),
            empty: Component::from_bits(empty, anchor),
            enemy: Component::from_bits(enemy, anchor),
            defence,
            defence_len: defence_len as u8,
        }
    }

    /// Offsets (in line steps from the anchor) of the cells that neutralize
    /// this pattern.
    #[inline]
    pub fn defence_offsets(&self) -> &[i8] {
        &self.defence[..self.defence_len as usize]
    }

    #[inline]
    pub fn matches(&self, view: &LineView) -> bool {
        self.stones.matches(view.own, view.at)
            && self.empty.matches(view.empty, view.at)
            && self.enemy.matches(view.blocker, view.at)
    }
}

// =============================================================================
// Pattern table
// =============================================================================

const TEMPLATES: &[(&str, u8, u8)] = &[
    // Five
    ("XXXX*", Priority::IMMEDIATE, Miai::FIVE),
    ("XXX*X", Priority::IMMEDIATE, Miai::FIVE),
    ("XX*XX", Priority::IMMEDIATE, Miai::FIVE),
    ("X*XXX", Priority::IMMEDIATE, Miai::FIVE),
    ("*XXXX", Priority::IMMEDIATE, Miai::FIVE),
    // Open four
    (".*XXX#", Priority::URGENT, Miai::OPEN_FOUR),
    ("#XXX*.", Priority::URGENT, Miai::OPEN_FOUR),
    ("#X*XX#", Priority::URGENT, Miai::OPEN_FOUR),
    ("#XX*X#", Priority::URGENT, Miai::OPEN_FOUR),
    // Four: anchor plus three stones inside a five-cell window
    ("*#XXX", Priority::HIGH, Miai::FOUR),
    ("*X#XX", Priority::HIGH, Miai::FOUR),
    ("*XX#X", Priority::HIGH, Miai::FOUR),
    ("*XXX#", Priority::HIGH, Miai::FOUR),
    ("#*XXX", Priority::HIGH, Miai::FOUR),
    ("X*#XX", Priority::HIGH, Miai::FOUR),
    ("X*X#X", Priority::HIGH, Miai::FOUR),
    ("X*XX#", Priority::HIGH, Miai::FOUR),
    ("#X*XX", Priority::HIGH, Miai::FOUR),
    ("X#*XX", Priority::HIGH, Miai::FOUR),
    ("XX*#X", Priority::HIGH, Miai::FOUR),
    ("XX*X#", Priority::HIGH, Miai::FOUR),
    ("#XX*X", Priority::HIGH, Miai::FOUR),
    ("X#X*X", Priority::HIGH, Miai::FOUR),
    ("XX#*X", Priority::HIGH, Miai::FOUR),
    ("XXX*#", Priority::HIGH, Miai::FOUR),
    ("#XXX*", Priority::HIGH, Miai::FOUR),
    ("X#XX*", Priority::HIGH, Miai::FOUR),
    ("XX#X*", Priority::HIGH, Miai::FOUR),
    ("XXX#*", Priority::HIGH, Miai::FOUR),
    // Open three: three stones in the middle four cells of an empty-ended six
    ("#*XX##", Priority::HIGH, Miai::OPEN_THREE),
    ("#X*X##", Priority::HIGH, Miai::OPEN_THREE),
    ("#XX*##", Priority::HIGH, Miai::OPEN_THREE),
    ("##*XX#", Priority::HIGH, Miai::OPEN_THREE),
    ("##X*X#", Priority::HIGH, Miai::OPEN_THREE),
    ("##XX*#", Priority::HIGH, Miai::OPEN_THREE),
    ("#*X#X#", Priority::HIGH, Miai::OPEN_THREE),
    ("#X*#X#", Priority::HIGH, Miai::OPEN_THREE),
    ("#XX#*#", Priority::HIGH, Miai::OPEN_THREE),
    ("#*#XX#", Priority::HIGH, Miai::OPEN_THREE),
    ("#X#*X#", Priority::HIGH, Miai::OPEN_THREE),
    ("#X#X*#", Priority::HIGH, Miai::OPEN_THREE),
    // Closed three: blocked on one side, room for a four on the other
    ("OXX*##", Priority::LOW, Miai::CLOSED_THREE),
    ("OX*X##", Priority::LOW, Miai::CLOSED_THREE),
    ("O*XX##", Priority::LOW, Miai::CLOSED_THREE),
    ("##*XXO", Priority::LOW, Miai::CLOSED_THREE),
    ("##X*XO", Priority::LOW, Miai::CLOSED_THREE),
    ("##XX*O", Priority::LOW, Miai::CLOSED_THREE),
    // Open two
    (".*X...", Priority::LOW, Miai::OPEN_TWO),
    (".X*...", Priority::LOW, Miai::OPEN_TWO),
    ("..*X..", Priority::LOW, Miai::OPEN_TWO),
    ("..X*..", Priority::LOW, Miai::OPEN_TWO),
    ("...*X.", Priority::LOW, Miai::OPEN_TWO),
    ("...X*.", Priority::LOW, Miai::OPEN_TWO),
    (".*.X..", Priority::LOW, Miai::OPEN_TWO),
    (".X.*..", Priority::LOW, Miai::OPEN_TWO),
    ("..*.X.", Priority::LOW, Miai::OPEN_TWO),
    ("..X.*.", Priority::LOW, Miai::OPEN_TWO),
];

pub const PATTERN_COUNT: usize = TEMPLATES.len();

const fn build_table() -> [Pattern; PATTERN_COUNT] {
    let mut table = [Pattern::PLACEHOLDER; PATTERN_COUNT];
    let mut i = 0;
    while i < PATTERN_COUNT {
        let (template, priority, miai) = TEMPLATES[i];
        table[i] = Pattern::compile(i as u8, template, priority, miai);
        i += 1;
    }
    table
}

/// All patterns, strongest first. `PATTERNS[i].id == i`.
pub static PATTERNS: [Pattern; PATTERN_COUNT] = build_table();

// =============================================================================
// Line views
// =============================================================================

/// One line around a candidate cell, from one color's point of view.
///
/// Off-board cells are never empty and always count as blockers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineView {
    own: u64,
    empty: u64,
    blocker: u64,
    at: u32,
}

impl LineView {
    /// Build a view from raw line words: `own`/`opp` occupancy,
    /// `on_board` mask and the candidate's bit index.
    #[inline]
    pub fn new(own: u32, opp: u32, on_board: u32, bit: u32) -> Self {
        let own = (own as u64) << PAD;
        let opp = (opp as u64) << PAD;
        let on_board = (on_board as u64) << PAD;
        Self {
            own,
            empty: on_board & !(own | opp),
            blocker: opp | !on_board,
            at: bit + PAD,
        }
    }

    /// Whether any own stone lies within pattern reach of the candidate.
    #[inline]
    fn has_support(&self) -> bool {
        (self.own >> (self.at - REACH)) & ((1 << (2 * REACH + 1)) - 1) != 0
    }
}

/// First (strongest) pattern whose anchor is the view's candidate cell.
#[inline]
pub fn find_match(view: &LineView) -> Option<&'static Pattern> {
    if !view.has_support() {
        return None;
    }
    PATTERNS.iter().find(|p| p.matches(view))
}

// =============================================================================
// Packed pattern references
// =============================================================================

/// Reference to one defence cell of one matched pattern:
/// `id | defence_index << 7 | direction << 9 | miai << 16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternRef(u32);

impl PatternRef {
    #[inline]
    pub fn pack(id: u8, defence_index: u8, direction: u8, miai: u8) -> Self {
        debug_assert!(id < 128 && defence_index < 4 && direction < 4 && miai < 64);
        Self(id as u32 | (defence_index as u32) << 7 | (direction as u32) << 9 | (miai as u32) << 16)
    }

    #[inline]
    pub fn id(self) -> u8 {
        (self.0 & 0x7F) as u8
    }

    #[inline]
    pub fn defence_index(self) -> u8 {
        ((self.0 >> 7) & 0x3) as u8
    }

    #[inline]
    pub fn direction(self) -> u8 {
        ((self.0 >> 9) & 0x3) as u8
    }

    #[inline]
    pub fn miai(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Key under which equivalent threats collapse into one.
    #[inline]
    pub fn group(self) -> (u8, u8) {
        (self.direction(), self.miai())
    }

    #[inline]
    pub fn pattern(self) -> &'static Pattern {
        &PATTERNS[self.id() as usize]
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: u32 = (1 << 19) - 1;

    fn bits(cells: &[u32]) -> u32 {
        cells.iter().fold(0, |acc, b| acc | 1 << b)
    }

    #[test]
    fn test_table_ids_and_order() {
        assert!(PATTERN_COUNT < 128);
        for (i, p) in PATTERNS.iter().enumerate() {
            assert_eq!(p.id as usize, i);
            assert!(p.miai < 64);
            assert!(!p.defence_offsets().is_empty());
            assert!(p.defence_offsets().contains(&0), "anchor is always a defence cell");
        }
        for pair in PATTERNS.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
    }

    #[test]
    fn test_compile_masks() {
        // ".*XXX#": empty at -1, 0, 4; stones at 1..=3
        let p = PATTERNS.iter().find(|p| p.priority == Priority::URGENT).unwrap();
        assert_eq!(p.stones, Component { mask: 0b111, shift: 1 });
        assert_eq!(p.empty, Component { mask: 0b100011, shift: -1 });
        assert_eq!(p.enemy, Component::NONE);
        assert_eq!(p.defence_offsets(), &[0, 4]);
    }

    #[test]
    fn test_five_completion() {
        let view = LineView::new(bits(&[2, 3, 4, 5]), 0, FULL, 6);
        assert_eq!(find_match(&view).unwrap().priority, Priority::IMMEDIATE);

        let gap = LineView::new(bits(&[2, 3, 5, 6]), 0, FULL, 4);
        assert_eq!(find_match(&gap).unwrap().priority, Priority::IMMEDIATE);
    }

    #[test]
    fn test_open_four_needs_both_ends() {
        let open = LineView::new(bits(&[5, 6, 7]), 0, FULL, 4);
        assert_eq!(find_match(&open).unwrap().priority, Priority::URGENT);

        // Enemy on the far side turns it into a plain four
        let blocked = LineView::new(bits(&[5, 6, 7]), bits(&[8]), FULL, 4);
        assert_eq!(find_match(&blocked).unwrap().priority, Priority::HIGH);
    }

    #[test]
    fn test_board_edge_blocks() {
        // Stones at 0..=2, candidate at 3: the edge closes the left side
        let view = LineView::new(bits(&[0, 1, 2]), 0, FULL, 3);
        assert_eq!(find_match(&view).unwrap().priority, Priority::HIGH);

        // Diagonal of length 3 cannot hold any pattern
        let short = LineView::new(bits(&[0, 1]), 0, 0b111, 2);
        assert!(find_match(&short).is_none());
    }

    #[test]
    fn test_open_three_and_two() {
        let three = LineView::new(bits(&[9, 10]), 0, FULL, 8);
        let p = find_match(&three).unwrap();
        assert_eq!((p.priority, p.miai), (Priority::HIGH, Miai::OPEN_THREE));

        let two = LineView::new(bits(&[9]), 0, FULL, 8);
        let p = find_match(&two).unwrap();
        assert_eq!((p.priority, p.miai), (Priority::LOW, Miai::OPEN_TWO));
    }

    #[test]
    fn test_closed_three() {
        let view = LineView::new(bits(&[5, 6]), bits(&[4]), FULL, 7);
        let p = find_match(&view).unwrap();
        assert_eq!((p.priority, p.miai), (Priority::LOW, Miai::CLOSED_THREE));
    }

    #[test]
    fn test_isolated_cell_has_no_pattern() {
        let view = LineView::new(bits(&[1]), 0, FULL, 12);
        assert!(find_match(&view).is_none());
    }

    #[test]
    fn test_pattern_ref_packing() {
        let r = PatternRef::pack(42, 3, 2, 17);
        assert_eq!(r.id(), 42);
        assert_eq!(r.defence_index(), 3);
        assert_eq!(r.direction(), 2);
        assert_eq!(r.miai(), 17);
        assert_eq!(r.raw(), 42 | 3 << 7 | 2 << 9 | 17 << 16);
        assert_eq!(r.group(), (2, 17));

        // Full fields stay inside their bit ranges
        let r = PatternRef::pack(127, 3, 3, 63);
        assert_eq!((r.id(), r.defence_index(), r.direction(), r.miai()), (127, 3, 3, 63));
    }
}
