//! Exit code constants for the tbgen CLI.
//!
//! - 0: Success (including runs with some failed units)
//! - 1: User error (bad args, invalid configuration)
//! - 2: Data source failure (missing sheet, unreadable plan)
//! - 3: Generation failure (no usable output from the service)
//! - 4: Output failure (filesystem errors outside a unit of work)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Data source failure: the verification plan could not be loaded.
pub const DATA_SOURCE_FAILURE: i32 = 2;

/// Generation failure: the service produced nothing usable for the run.
pub const GENERATION_FAILURE: i32 = 3;

/// Output failure: files could not be written.
pub const OUTPUT_FAILURE: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            USER_ERROR,
            DATA_SOURCE_FAILURE,
            GENERATION_FAILURE,
            OUTPUT_FAILURE,
        ];
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
