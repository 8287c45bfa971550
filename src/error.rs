use derive_more::{Display, Error};

/// Error type for contract violations in the puzzle model. Rejected moves
/// are not errors; `Grid::do_move` reports those through its return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum Error {
    /// Malformed input: a negative coordinate, an out-of-bounds lookup, a
    /// degenerate grid size, or restore data that does not tile a board.
    #[display("invalid argument: {}", reason)]
    InvalidArgument { reason: &'static str },
    /// An operation that would leave an existing entity in an impossible
    /// state, such as displacing a piece off the board or popping an empty
    /// history.
    #[display("invalid state: {}", reason)]
    InvalidState { reason: &'static str },
}

impl Error {
    pub const fn invalid_argument(reason: &'static str) -> Self {
        Error::InvalidArgument { reason }
    }

    pub const fn invalid_state(reason: &'static str) -> Self {
        Error::InvalidState { reason }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Error::InvalidArgument { reason } => reason,
            Error::InvalidState { reason } => reason,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display_includes_the_reason() {
        let e = Error::invalid_argument("coordinates must be non-negative");
        assert_eq!(e.to_string(), "invalid argument: coordinates must be non-negative");
        let e = Error::invalid_state("pop on an empty moves stack");
        assert_eq!(e.to_string(), "invalid state: pop on an empty moves stack");
    }

    #[test]
    fn test_reason_is_preserved() {
        let e = Error::invalid_argument("bad");
        assert_eq!(e.reason(), "bad");
        assert_eq!(e, Error::InvalidArgument { reason: "bad" });
        assert_ne!(e, Error::invalid_state("bad"));
    }
}
