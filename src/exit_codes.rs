//! Exit code constants for the stencil CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable files, invalid config)
//! - 2: Render failure (missing variables, syntax errors, bad comparisons)
//! - 3: Template not found

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable input, or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Render failure: missing required variables, malformed template syntax,
/// or a relational comparison on non-numeric operands.
pub const RENDER_FAILURE: i32 = 2;

/// The requested template id is not registered for any usable locale.
pub const NOT_FOUND: i32 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, RENDER_FAILURE, NOT_FOUND];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn success_is_zero() {
        assert_eq!(SUCCESS, 0);
    }
}
