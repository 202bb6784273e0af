use std::path::Path;

use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::Statement;
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser, ParserReturn};
use oxc_span::SourceType;
use thiserror::Error;

use crate::config::{ConfigError, Options};
use crate::constants::MIN_HOST_VERSION;
use crate::editor::{EditError, Editor};
use crate::filter::PathFilter;
use crate::matcher::{Removal, classify};
use crate::types::{TargetModules, TransformOutput};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(
        "\"{component}\" requires a host pipeline version {required_major}.{required_minor}.0 or higher, got \"{found}\""
    )]
    Compatibility {
        component: String,
        required_major: u32,
        required_minor: u32,
        found: String,
    },
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("{path}: parse error: {message}")]
    Parse { path: String, message: String },

    #[error(transparent)]
    Edit(#[from] EditError),
}

/// The per-file transform: strips imports, requires, and
/// propTypes/defaultProps assignments referencing the target modules.
///
/// Holds only immutable configuration, so one instance can serve any number
/// of concurrent file transforms.
#[derive(Debug)]
pub struct Stripper {
    name: String,
    targets: TargetModules,
    filter: PathFilter,
    source_map: bool,
}

impl Stripper {
    /// Build a stripper from validated options.
    ///
    /// `name` labels this component in error messages. `host_version` is the
    /// embedding pipeline's reported version, rejected below
    /// [`MIN_HOST_VERSION`](crate::constants::MIN_HOST_VERSION).
    pub fn new(name: &str, options: &Options, host_version: &str) -> Result<Self, BuildError> {
        check_host_version(name, host_version)?;

        let targets = TargetModules::new(&options.imports);
        debug!("Stripping {} target module(s)", targets.len());
        let filter = PathFilter::new(options.include.as_deref(), options.exclude.as_deref())?;

        Ok(Self { name: name.to_string(), targets, filter, source_map: options.source_map })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn targets(&self) -> &TargetModules {
        &self.targets
    }

    /// Transform one file. `Ok(None)` means the path was filtered out and the
    /// file passes through unchanged.
    pub fn transform(
        &self,
        path: &str,
        code: &str,
    ) -> Result<Option<TransformOutput>, TransformError> {
        if !self.filter.is_eligible(path) {
            debug!("Skipping filtered-out file: {}", path);
            return Ok(None);
        }

        trace!("Parsing {}", path);
        let allocator = Allocator::default();
        let ParserReturn { program, errors, panicked, .. } =
            Parser::new(&allocator, code, source_type_for(path)).parse();
        if panicked || !errors.is_empty() {
            let message = if errors.is_empty() {
                "parser panicked".to_string()
            } else {
                errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
            };
            return Err(TransformError::Parse { path: path.to_string(), message });
        }

        let mut collector = Collector { targets: &self.targets, removals: Vec::new() };
        collector.visit_program(&program);
        debug!("{}: {} removable statement(s)", path, collector.removals.len());

        let mut editor = Editor::new(code, self.source_map);
        for removal in &collector.removals {
            trace!("{}: removing {:?}", path, removal);
            editor.remove(removal.span());
        }

        Ok(Some(editor.finish(path)?))
    }
}

/// Collects removable statements during the walk. A matched statement is not
/// descended into, so recorded spans can never nest.
struct Collector<'t> {
    targets: &'t TargetModules,
    removals: Vec<Removal>,
}

impl<'a> Visit<'a> for Collector<'_> {
    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        match classify(stmt, self.targets) {
            Some(removal) => self.removals.push(removal),
            None => walk::walk_statement(self, stmt),
        }
    }
}

fn check_host_version(component: &str, host_version: &str) -> Result<(), BuildError> {
    let mut parts = host_version.split('.').map(|part| part.parse::<u32>().unwrap_or(0));
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);

    let (required_major, required_minor) = MIN_HOST_VERSION;
    if major == required_major && minor < required_minor {
        return Err(BuildError::Compatibility {
            component: component.to_string(),
            required_major,
            required_minor,
            found: host_version.to_string(),
        });
    }
    Ok(())
}

fn source_type_for(path: &str) -> SourceType {
    let ext = Path::new(path).extension().and_then(|e| e.to_str());
    SourceType::default()
        .with_module(true)
        .with_jsx(matches!(ext, Some("jsx") | Some("tsx")))
        .with_typescript(matches!(ext, Some("ts") | Some("tsx") | Some("mts") | Some("cts")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterPattern;
    use serde_json::json;

    const HOST_VERSION: &str = "0.1.0";
    const COMPONENT: &str = "propstrip";

    const COMPONENT_JSX: &str = "import React from 'react';\n\
        import PropTypes from 'prop-types';\n\
        \n\
        const ExampleComponent = ({ name }) => <div>Hello, {name}!</div>;\n\
        \n\
        ExampleComponent.propTypes = {\n\
        \x20   name: PropTypes.string.isRequired\n\
        };\n\
        \n\
        export default ExampleComponent;\n";

    fn stripper(options: Options) -> Stripper {
        Stripper::new(COMPONENT, &options, HOST_VERSION).unwrap()
    }

    fn include_all() -> Option<Vec<FilterPattern>> {
        Some(vec![FilterPattern::Glob("**/*".to_string())])
    }

    #[test]
    fn test_strips_import_and_prop_types_assignment() {
        let out = stripper(Options::default())
            .transform("test/fixtures/component.jsx", COMPONENT_JSX)
            .unwrap()
            .expect("file should be eligible");

        assert!(!out.code.contains("prop-types"));
        assert!(!out.code.contains("propTypes"));
        // The component itself survives
        assert!(out.code.contains("const ExampleComponent"));
        assert!(out.code.contains("export default ExampleComponent;"));
        // Untracked imports survive
        assert!(out.code.contains("import React from 'react';"));
    }

    #[test]
    fn test_filtered_out_file_passes_through() {
        let options = Options {
            exclude: Some(vec![FilterPattern::Glob("test/fixtures/component.jsx".to_string())]),
            ..Options::default()
        };
        let result = stripper(options).transform("test/fixtures/component.jsx", COMPONENT_JSX).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_file_matching_no_include_passes_through() {
        let result = stripper(Options::default()).transform("src/index.ts", "const x = 1;").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_require_statement_is_stripped_like_an_import() {
        let source = "const PropTypes = require('prop-types');\nconst A = () => null;\nA.propTypes = { x: PropTypes.string };\n";
        let options = Options { include: include_all(), ..Options::default() };
        let out = stripper(options).transform("src/a.js", source).unwrap().unwrap();
        assert!(!out.code.contains("prop-types"));
        assert!(!out.code.contains("propTypes"));
        assert!(out.code.contains("const A = () => null;"));
    }

    #[test]
    fn test_default_props_assignment_is_stripped() {
        let source = "const A = () => null;\nA.defaultProps = { x: 1 };\nexport default A;\n";
        let options = Options { include: include_all(), ..Options::default() };
        let out = stripper(options).transform("src/a.js", source).unwrap().unwrap();
        assert!(!out.code.contains("defaultProps"));
        assert!(out.code.contains("export default A;"));
    }

    #[test]
    fn test_extra_imports_widen_the_target_set() {
        let options = Options { imports: vec!["react".to_string()], ..Options::default() };
        let out = stripper(options)
            .transform("test/fixtures/component.jsx", COMPONENT_JSX)
            .unwrap()
            .unwrap();
        assert!(!out.code.contains("prop-types"));
        assert!(!out.code.contains("propTypes"));
        assert!(!out.code.contains("react"));
    }

    #[test]
    fn test_transform_is_idempotent() {
        let stripper = stripper(Options::default());
        let first = stripper
            .transform("test/fixtures/component.jsx", COMPONENT_JSX)
            .unwrap()
            .unwrap();
        let second = stripper
            .transform("test/fixtures/component.jsx", &first.code)
            .unwrap()
            .unwrap();
        assert_eq!(first.code, second.code);
    }

    #[test]
    fn test_untouched_eligible_file_is_returned_verbatim() {
        let source = "const x = 1;\nexport default x;\n";
        let options = Options { include: include_all(), ..Options::default() };
        let out = stripper(options).transform("src/x.js", source).unwrap().unwrap();
        assert_eq!(out.code, source);
    }

    #[test]
    fn test_nested_require_statement_is_stripped() {
        let source = "function load() {\n    const PropTypes = require('prop-types');\n    return PropTypes;\n}\n";
        let options = Options { include: include_all(), ..Options::default() };
        let out = stripper(options).transform("src/a.js", source).unwrap().unwrap();
        assert!(!out.code.contains("require('prop-types')"));
        assert!(out.code.contains("function load()"));
    }

    #[test]
    fn test_matched_statements_are_not_descended_into() {
        // The assignment removal must swallow the nested require with it,
        // without recording a second, nested range.
        let source = "A.propTypes = makeTypes(require('prop-types'));\nconst keep = 1;\n";
        let options = Options { include: include_all(), ..Options::default() };
        let out = stripper(options).transform("src/a.js", source).unwrap().unwrap();
        assert!(!out.code.contains("propTypes"));
        assert!(!out.code.contains("require"));
        assert!(out.code.contains("const keep = 1;"));
    }

    #[test]
    fn test_tsx_fixture_is_parsed_and_stripped() {
        let source = "import React from 'react';\n\
            import PropTypes from 'prop-types';\n\
            const C: React.FC<{ name: string }> = ({ name }) => <div>{name}</div>;\n\
            C.propTypes = { name: PropTypes.string.isRequired };\n\
            export default C;\n";
        let out = stripper(Options::default())
            .transform("test/fixtures/component.tsx", source)
            .unwrap()
            .unwrap();
        assert!(!out.code.contains("prop-types"));
        assert!(!out.code.contains("propTypes"));
        assert!(out.code.contains("export default C;"));
    }

    #[test]
    fn test_parse_failure_is_surfaced_for_that_file() {
        let options = Options { include: include_all(), ..Options::default() };
        let err = stripper(options).transform("src/bad.js", "const = ;").unwrap_err();
        assert!(matches!(err, TransformError::Parse { ref path, .. } if path == "src/bad.js"));
    }

    #[test]
    fn test_source_map_is_emitted_only_on_request() {
        let source = "import PropTypes from 'prop-types';\nconst A = 1;\n";
        let with_map = Options { include: include_all(), source_map: true, ..Options::default() };
        let out = stripper(with_map).transform("src/a.js", source).unwrap().unwrap();
        let map = out.map.expect("map requested but absent");
        assert_eq!(map.get_source(0), Some("src/a.js"));

        let without_map = Options { include: include_all(), ..Options::default() };
        let out = stripper(without_map).transform("src/a.js", source).unwrap().unwrap();
        assert!(out.map.is_none());
    }

    #[test]
    fn test_map_tracks_the_removed_import() {
        let source = "import PropTypes from 'prop-types';\nconst A = 1;\n";
        let options = Options { include: include_all(), source_map: true, ..Options::default() };
        let out = stripper(options).transform("src/a.js", source).unwrap().unwrap();
        assert!(out.code.ends_with("\nconst A = 1;\n"));
        assert!(!out.code.contains("import"));

        let map = out.map.unwrap();
        // The second output line maps back to the original second line.
        let token = map
            .tokens()
            .find(|t| t.get_dst_line() == 1 && t.get_dst_col() == 0)
            .expect("no token for the surviving line");
        assert_eq!(token.get_src_line(), 1);
        assert_eq!(token.get_src_col(), 0);
    }

    #[test]
    fn test_old_host_version_is_rejected() {
        let err = Stripper::new(COMPONENT, &Options::default(), "0.0.9").unwrap_err();
        assert!(matches!(err, BuildError::Compatibility { .. }));
        assert!(err.to_string().contains(COMPONENT));
    }

    #[test]
    fn test_newer_host_versions_are_accepted() {
        for version in ["0.1.0", "0.12.3", "1.0.0", "2.5"] {
            assert!(Stripper::new(COMPONENT, &Options::default(), version).is_ok(), "{}", version);
        }
    }

    #[test]
    fn test_garbage_host_version_is_rejected() {
        let err = Stripper::new(COMPONENT, &Options::default(), "not-a-version").unwrap_err();
        assert!(matches!(err, BuildError::Compatibility { .. }));
    }

    #[test]
    fn test_invalid_pattern_fails_at_construction() {
        let options = Options {
            include: Some(vec![FilterPattern::Glob("a{b".to_string())]),
            ..Options::default()
        };
        let err = Stripper::new(COMPONENT, &options, HOST_VERSION).unwrap_err();
        assert!(matches!(err, BuildError::Config(ConfigError::InvalidGlob { .. })));
    }

    #[test]
    fn test_json_options_round_trip_through_the_stripper() {
        let value = json!({
            "include": ["test/fixtures/*.jsx"],
            "imports": ["react"],
            "sourceMap": true
        });
        let options = Options::from_json(COMPONENT, &value).unwrap();
        let stripper = Stripper::new(COMPONENT, &options, HOST_VERSION).unwrap();
        let out = stripper
            .transform("test/fixtures/component.jsx", COMPONENT_JSX)
            .unwrap()
            .unwrap();
        assert!(!out.code.contains("react"));
        assert!(!out.code.contains("prop-types"));
        assert!(out.map.is_some());
    }
}
