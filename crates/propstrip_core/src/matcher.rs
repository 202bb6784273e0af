use oxc_ast::ast::*;
use oxc_span::Span;

use crate::constants::STRIPPED_PROPERTIES;
use crate::types::TargetModules;

/// Why a statement is being removed, carrying the whole statement's span.
///
/// Removal always covers a complete statement or declaration, so spans from
/// one classification pass can never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// `import ... from 'tracked-module'`
    Import(Span),
    /// `require('tracked-module')` as a bare statement or as the sole kind
    /// of initializer in a variable declaration
    Require(Span),
    /// `X.propTypes = ...` / `X.defaultProps = ...`, whatever `X` is
    StaticPropAssignment(Span),
}

impl Removal {
    pub fn span(&self) -> Span {
        match self {
            Removal::Import(span) | Removal::Require(span) | Removal::StaticPropAssignment(span) => {
                *span
            }
        }
    }
}

/// Classify one statement. Returns the removal kind when the statement should
/// be stripped, `None` otherwise.
pub fn classify(stmt: &Statement<'_>, targets: &TargetModules) -> Option<Removal> {
    match stmt {
        Statement::ImportDeclaration(decl) if targets.contains(decl.source.value.as_str()) => {
            Some(Removal::Import(decl.span))
        }
        Statement::ExpressionStatement(es) => {
            if is_tracked_require(&es.expression, targets) {
                Some(Removal::Require(es.span))
            } else if is_stripped_prop_assignment(&es.expression) {
                Some(Removal::StaticPropAssignment(es.span))
            } else {
                None
            }
        }
        Statement::VariableDeclaration(decl) => {
            let all_tracked = !decl.declarations.is_empty()
                && decl.declarations.iter().all(|d| {
                    d.init.as_ref().is_some_and(|init| is_tracked_require(init, targets))
                });
            all_tracked.then(|| Removal::Require(decl.span))
        }
        _ => None,
    }
}

/// `require('name')` with exactly one string-literal argument naming a
/// tracked module.
fn is_tracked_require(expr: &Expression<'_>, targets: &TargetModules) -> bool {
    if let Expression::CallExpression(call) = expr
        && let Expression::Identifier(callee) = &call.callee
        && callee.name.as_str() == "require"
        && call.arguments.len() == 1
        && let Some(Expression::StringLiteral(literal)) = call.arguments[0].as_expression()
    {
        return targets.contains(literal.value.as_str());
    }
    false
}

/// Assignment to a static member named `propTypes` or `defaultProps`.
/// Deliberately blind to the object's binding origin and to the operator.
fn is_stripped_prop_assignment(expr: &Expression<'_>) -> bool {
    if let Expression::AssignmentExpression(assign) = expr
        && let AssignmentTarget::StaticMemberExpression(member) = &assign.left
    {
        return STRIPPED_PROPERTIES.contains(&member.property.name.as_str());
    }
    false
}
