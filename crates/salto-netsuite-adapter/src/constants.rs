//! NetSuite names

/// Adapter name
pub const NETSUITE: &str = "netsuite";

/// Workspace directory holding type definitions
pub const TYPES_PATH: &str = "Types";

/// File cabinet paths are absolute
pub const PATH_REGEX: &str = "^/.+";

/// File cabinet file type
pub const FILE: &str = "file";

/// File cabinet folder type
pub const FOLDER: &str = "folder";
