//! CLI Exit Code Registry
//!
//! Single source of truth for `innbot` exit codes. Scripts and service
//! supervisors rely on them.
//!
//! | Code | Meaning                                           |
//! |------|---------------------------------------------------|
//! | 0    | Success                                           |
//! | 1    | General error (unspecified)                       |
//! | 2    | Usage error (bad args, missing file)              |
//! | 3    | Configuration error (bad file, missing secret)    |
//! | 4    | Spreadsheet could not be read or merged           |
//! | 5    | Name lookup failed or returned an unusable answer |
//! | 6    | Bot transport failed at startup                   |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing input file.
pub const EXIT_USAGE: u8 = 2;

/// Config file unreadable or invalid, or a required secret is not set.
pub const EXIT_CONFIG: u8 = 3;

/// Input spreadsheet missing, unreadable, or the two inputs do not line up.
pub const EXIT_READ: u8 = 4;

/// Lookup service error, or a candidate without the expected fields.
pub const EXIT_LOOKUP: u8 = 5;

/// Bot API unreachable or rejected the token.
pub const EXIT_TRANSPORT: u8 = 6;
