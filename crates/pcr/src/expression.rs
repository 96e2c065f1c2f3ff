//! Construction of `pcrcalc` statements.
//!
//! Only the small subset needed to express a single operator invocation is supported:
//! map and table operands, numeric literals, function calls and the infix/prefix operators.

use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A raster or table file on disk
    File(PathBuf),
    Number(f64),
    Call { function: String, args: Vec<Expression> },
    Infix { op: &'static str, lhs: Box<Expression>, rhs: Box<Expression> },
    Prefix { op: &'static str, operand: Box<Expression> },
}

impl Expression {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Expression::File(path.into())
    }

    pub fn call(function: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Call {
            function: function.into(),
            args,
        }
    }

    pub fn infix(op: &'static str, lhs: Expression, rhs: Expression) -> Self {
        Expression::Infix {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn prefix(op: &'static str, operand: Expression) -> Self {
        Expression::Prefix {
            op,
            operand: Box::new(operand),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::File(path) => write!(f, "{}", FileName(path)),
            Expression::Number(value) => write!(f, "{value}"),
            Expression::Call { function, args } => {
                write!(f, "{function}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Expression::Infix { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            Expression::Prefix { op, operand } => write!(f, "{op} {operand}"),
        }
    }
}

/// `target = expression`, the statement passed to pcrcalc
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: PathBuf,
    pub expression: Expression,
}

impl Assignment {
    pub fn new(target: impl Into<PathBuf>, expression: Expression) -> Self {
        Assignment {
            target: target.into(),
            expression,
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", FileName(&self.target), self.expression)
    }
}

struct FileName<'a>(&'a Path);

impl fmt::Display for FileName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.0.to_string_lossy();
        let plain = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '\\' | ':' | '-'));

        if plain {
            write!(f, "{name}")
        } else {
            write!(f, "\"{name}\"")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_call() {
        let assignment = Assignment::new("/tmp/slope.map", Expression::call("slope", vec![Expression::file("/data/dem.map")]));
        assert_eq!(assignment.to_string(), "/tmp/slope.map = slope(/data/dem.map)");
    }

    #[test]
    fn numeric_arguments() {
        let expr = Expression::call(
            "lddcreate",
            vec![
                Expression::file("dem.map"),
                Expression::Number(9999999.0),
                Expression::Number(1e31),
                Expression::Number(0.5),
            ],
        );
        assert_eq!(expr.to_string(), "lddcreate(dem.map, 9999999, 10000000000000000000000000000000, 0.5)");
    }

    #[test]
    fn operators() {
        let cmp = Expression::infix(">=", Expression::file("a.map"), Expression::file("b.map"));
        assert_eq!(cmp.to_string(), "(a.map >= b.map)");

        let not = Expression::prefix("not", Expression::file("a.map"));
        assert_eq!(not.to_string(), "not a.map");
    }

    #[test]
    fn nested_calls() {
        let expr = Expression::call("spatial", vec![Expression::call("scalar", vec![Expression::Number(5.0)])]);
        assert_eq!(expr.to_string(), "spatial(scalar(5))");
    }

    #[test]
    fn file_names_with_spaces_are_quoted() {
        let assignment = Assignment::new(
            "/tmp/my output/result.map",
            Expression::call("abs", vec![Expression::file("C:\\data\\dem.map")]),
        );
        assert_eq!(assignment.to_string(), "\"/tmp/my output/result.map\" = abs(C:\\data\\dem.map)");
    }
}
