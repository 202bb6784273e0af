//! Core transform for stripping `prop-types` from JavaScript/TypeScript.
//!
//! Given a file's source text, this crate removes:
//! - `import` declarations referencing a tracked module,
//! - `require('...')` statements referencing a tracked module,
//! - `X.propTypes = ...` / `X.defaultProps = ...` assignments,
//!
//! leaving every other byte untouched, and optionally renders a source map
//! for the edits. Files are admitted by an include/exclude path filter; a
//! filtered-out file is passed through unchanged.
//!
//! # Examples
//!
//! ```
//! use propstrip_core::{Options, Stripper};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let stripper = Stripper::new("propstrip", &Options::default(), "0.1.0")?;
//!
//! let source = "import PropTypes from 'prop-types';\n\
//!     const Hello = ({ name }) => <div>{name}</div>;\n\
//!     Hello.propTypes = { name: PropTypes.string };\n\
//!     export default Hello;\n";
//!
//! let output = stripper.transform("src/Hello.jsx", source)?.expect("eligible");
//! assert!(!output.code.contains("prop-types"));
//! assert!(output.code.contains("export default Hello;"));
//! # Ok(())
//! # }
//! ```

mod config;
mod constants;
mod editor;
mod filter;
mod matcher;
mod transform;
mod types;

// Re-export public API
pub use config::{ConfigError, FilterPattern, Options};
pub use constants::{
    DEFAULT_EXCLUDE, DEFAULT_INCLUDE, DEFAULT_TARGETS, JS_TS_EXTENSIONS, MIN_HOST_VERSION,
    STRIPPED_PROPERTIES,
};
pub use editor::{EditError, Editor};
pub use filter::PathFilter;
pub use matcher::{Removal, classify};
pub use transform::{BuildError, Stripper, TransformError};
pub use types::{TargetModules, TransformOutput};
