//! Expression evaluation over the complex plane.
//!
//! Parsing and evaluation are delegated to `exmex` with a custom operator
//! set over `num_complex::Complex64`. An expression is compiled once per
//! run and then evaluated per grid point; every evaluation error is
//! catchable on its own, so one bad point never poisons the session.
//!
//! The only variable an expression may reference is `x`. Literals are
//! plain real numbers; the imaginary unit is available as the constant
//! `i` (e.g. `x^2 + 3*i`).

use exmex::prelude::*;
use exmex::{BinOp, FlatEx, MakeOperators, Operator, ops_factory};
use num_complex::Complex64;

use crate::error::ExpressionError;

ops_factory!(
    ComplexOpsFactory,
    Complex64,
    Operator::make_bin(
        "+",
        BinOp {
            apply: |a, b| a + b,
            prio: 0,
            is_commutative: true,
        }
    ),
    Operator::make_bin_unary(
        "-",
        BinOp {
            apply: |a, b| a - b,
            prio: 0,
            is_commutative: false,
        },
        |a| -a
    ),
    Operator::make_bin(
        "*",
        BinOp {
            apply: |a, b| a * b,
            prio: 1,
            is_commutative: true,
        }
    ),
    Operator::make_bin(
        "/",
        BinOp {
            apply: |a, b| a / b,
            prio: 1,
            is_commutative: false,
        }
    ),
    Operator::make_bin(
        "^",
        BinOp {
            apply: |a, b| a.powc(b),
            prio: 3,
            is_commutative: false,
        }
    ),
    Operator::make_unary("sin", |a| a.sin()),
    Operator::make_unary("cos", |a| a.cos()),
    Operator::make_unary("tan", |a| a.tan()),
    Operator::make_unary("exp", |a| a.exp()),
    Operator::make_unary("ln", |a| a.ln()),
    Operator::make_unary("log", |a| a.ln()),
    Operator::make_unary("sqrt", |a| a.sqrt()),
    Operator::make_unary("abs", |a| Complex64::new(a.norm(), 0.0)),
    Operator::make_unary("arg", |a| Complex64::new(a.arg(), 0.0)),
    Operator::make_unary("re", |a| Complex64::new(a.re, 0.0)),
    Operator::make_unary("im", |a| Complex64::new(a.im, 0.0)),
    Operator::make_unary("conj", |a| a.conj()),
    Operator::make_constant("i", Complex64::new(0.0, 1.0)),
    Operator::make_constant("pi", Complex64::new(std::f64::consts::PI, 0.0)),
    Operator::make_constant("e", Complex64::new(std::f64::consts::E, 0.0))
);

/// A parsed expression ready to be evaluated against bindings of `x`.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    expr: FlatEx<Complex64, ComplexOpsFactory>,
    /// Whether the expression actually references `x`. Constant
    /// expressions are evaluated with an empty binding slice.
    takes_x: bool,
}

impl CompiledExpression {
    /// Parse `source` once. Rejects any variable other than `x`.
    pub fn compile(source: &str) -> Result<Self, ExpressionError> {
        let expr =
            FlatEx::<Complex64, ComplexOpsFactory>::parse(source).map_err(|e| {
                ExpressionError::Parse {
                    message: e.to_string(),
                }
            })?;

        for name in expr.var_names() {
            if name.as_str() != "x" {
                return Err(ExpressionError::UnknownVariable { name: name.clone() });
            }
        }

        let takes_x = !expr.var_names().is_empty();
        Ok(CompiledExpression { expr, takes_x })
    }

    /// Evaluate with `x` bound to the given complex value.
    ///
    /// Note that complex division by zero is not an error: it produces
    /// non-finite components, which the sampler turns into a sentinel.
    pub fn eval(&self, x: Complex64) -> Result<Complex64, ExpressionError> {
        let result = if self.takes_x {
            self.expr.eval(&[x])
        } else {
            self.expr.eval(&[])
        };
        result.map_err(|e| ExpressionError::Eval {
            message: e.to_string(),
        })
    }
}
