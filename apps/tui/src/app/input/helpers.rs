/// Longest top-N entry the filter bar accepts.
pub const MAX_TOP_N_INPUT: usize = 6;

/// Next position in a ring of `len` items. With nothing selected yet the
/// ring starts at its first (forward) or last (backward) item.
pub const fn cycle(current: Option<usize>, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }

    match (current, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(index), true) => (index + 1) % len,
        (Some(0), false) => len - 1,
        (Some(index), false) => (index - 1) % len,
    }
}

/// Appends `c` unless the entry is full or `c` is a control character.
pub fn push_bounded(input: &mut String, c: char, max: usize) -> bool {
    if c.is_control() || input.chars().count() >= max {
        return false;
    }
    input.push(c);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_both_ways() {
        assert_eq!(cycle(Some(2), 3, true), 0);
        assert_eq!(cycle(Some(0), 3, false), 2);
        assert_eq!(cycle(Some(1), 3, false), 0);
        assert_eq!(cycle(None, 3, true), 0);
        assert_eq!(cycle(None, 3, false), 2);
        assert_eq!(cycle(Some(4), 0, true), 0);
    }

    #[test]
    fn bounded_push_stops_at_the_limit() {
        let mut input = String::from("12345");
        assert!(push_bounded(&mut input, 'x', MAX_TOP_N_INPUT));
        assert!(!push_bounded(&mut input, '7', MAX_TOP_N_INPUT));
        assert!(!push_bounded(&mut String::new(), '\n', MAX_TOP_N_INPUT));
        assert_eq!(input, "12345x");
    }
}
