//! Built-in defaults for the transform.
//!
//! These mirror the conventional layout of a React codebase: components live
//! in `.jsx`/`.tsx` files, third-party code under `node_modules` is never
//! rewritten, and `prop-types` is the module being stripped unless the caller
//! adds more.

/// Include patterns applied when the caller provides none
pub const DEFAULT_INCLUDE: &[&str] = &["**/*.jsx", "**/*.tsx"];

/// Exclude patterns applied when the caller provides none
pub const DEFAULT_EXCLUDE: &[&str] = &["node_modules/**"];

/// Module names stripped in every configuration
pub const DEFAULT_TARGETS: &[&str] = &["prop-types"];

/// Property names whose assignments are removed regardless of the
/// left-hand object's origin
pub const STRIPPED_PROPERTIES: &[&str] = &["propTypes", "defaultProps"];

/// Minimum `(major, minor)` host pipeline version the transform accepts
pub const MIN_HOST_VERSION: (u32, u32) = (0, 1);

/// File extensions for JavaScript/TypeScript files worth feeding to the transform
pub const JS_TS_EXTENSIONS: &[&str] = &[
    "ts",  // TypeScript
    "tsx", // TypeScript with JSX
    "mts", // TypeScript module
    "cts", // TypeScript CommonJS
    "js",  // JavaScript
    "jsx", // JavaScript with JSX
    "mjs", // JavaScript module
    "cjs", // JavaScript CommonJS
];
