/// The `config` module holds operator settings (archive extension, loader tokens,
/// historical platform versions, report names) and the `TargetVersion` type.
///
/// Settings load from an optional JSON file and fall back to defaults.
pub mod config;

/// The `version_token` module finds platform-version tokens such as `mc1.21.1` or
/// `1.20.1-1.21` inside filenames so they can be stripped or checked.
pub mod version_token;

/// The `mod_parser` module turns a loosely formatted mod archive filename into a
/// `(name, version)` pair.
pub mod mod_parser;

/// The `version_compare` module orders version strings token by token, comparing digit
/// runs numerically.
pub mod version_compare;

/// The `filesystem` module provides the directory listing, report writing and deletion
/// used by the operations.
pub mod filesystem;

/// The `operations` module implements the directory-level operations: update diff,
/// duplicate removal, client/server diff and the stale-version purge.
pub mod operations;

/// The `menu` module drives the numbered console menu over any input and output stream.
pub mod menu;
