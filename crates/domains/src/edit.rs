//! Message edit resolution.

/// What an edit request does to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOutcome<'a> {
    pub message: &'a str,
    pub is_edited: bool,
}

/// An empty candidate or one equal to the stored message keeps the stored
/// message and clears `is_edited`; anything else replaces it.
pub fn resolve_edit<'a>(current: &'a str, candidate: &'a str) -> EditOutcome<'a> {
    if candidate.is_empty() || candidate == current {
        EditOutcome {
            message: current,
            is_edited: false,
        }
    } else {
        EditOutcome {
            message: candidate,
            is_edited: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_candidate_keeps_message() {
        let outcome = resolve_edit("hello", "");
        assert_eq!(outcome.message, "hello");
        assert!(!outcome.is_edited);
    }

    #[test]
    fn same_message_is_not_an_edit() {
        let outcome = resolve_edit("hello", "hello");
        assert_eq!(outcome.message, "hello");
        assert!(!outcome.is_edited);
    }

    #[test]
    fn different_message_replaces() {
        let outcome = resolve_edit("hello", "bye");
        assert_eq!(outcome.message, "bye");
        assert!(outcome.is_edited);
    }
}
