//! Structured cost formulas and their Clarity rendering.
//!
//! Synthesis produces [`CostFormula`] values; text only appears when a
//! [`FunctionDefinition`] is displayed.

use std::fmt;

use crate::growth_kind::GrowthKind;
use crate::scaling::ScaledCoefficients;

/// Definitions of the primitives every generated formula is written in.
pub const PREAMBLE: &str = "\
(define-read-only (runtime (r uint))
    {
        runtime: r,
        write_length: u0,
        write_count: u0,
        read_count: u0,
        read_length: u0
    })

(define-read-only (linear (n uint) (a uint) (b uint))
    (+ (* a n) b))

(define-read-only (logn (n uint) (a uint) (b uint))
    (+ (* a (log2 n)) b))

(define-read-only (nlogn (n uint) (a uint) (b uint))
    (+ (* a (* n (log2 n))) b))
";

/// A single dimension of a fixed-shape formula.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CostExpr {
    Constant(u64),
    /// `a * n + b`
    Linear(ScaledCoefficients),
}

impl fmt::Display for CostExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostExpr::Constant(value) => write!(f, "u{value}"),
            CostExpr::Linear(ScaledCoefficients { a, b }) => write!(f, "(linear n u{a} u{b})"),
        }
    }
}

/// A formula that charges storage as well as runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FixedShape {
    pub runtime: CostExpr,
    pub write_length: CostExpr,
    pub write_count: CostExpr,
    pub read_count: CostExpr,
    pub read_length: CostExpr,
}

impl FixedShape {
    /// All dimensions in output order.
    pub fn dimensions(&self) -> [(&'static str, CostExpr); 5] {
        [
            ("runtime", self.runtime),
            ("write_length", self.write_length),
            ("write_count", self.write_count),
            ("read_count", self.read_count),
            ("read_length", self.read_length),
        ]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CostFormula {
    /// Runtime only, independent of size.
    RuntimeOnly(u64),
    Linear(ScaledCoefficients),
    LogN(ScaledCoefficients),
    NLogN(ScaledCoefficients),
    FixedShape(FixedShape),
}

impl CostFormula {
    /// Growth of the runtime dimension.
    pub fn growth_kind(&self) -> GrowthKind {
        match self {
            CostFormula::RuntimeOnly(_) => GrowthKind::Constant,
            CostFormula::Linear(_) => GrowthKind::Linear,
            CostFormula::LogN(_) => GrowthKind::LogN,
            CostFormula::NLogN(_) => GrowthKind::NLogN,
            CostFormula::FixedShape(shape) => match shape.runtime {
                CostExpr::Constant(_) => GrowthKind::Constant,
                CostExpr::Linear(_) => GrowthKind::Linear,
            },
        }
    }

    /// Coefficients of the runtime dimension.
    pub fn runtime_coefficients(&self) -> ScaledCoefficients {
        match *self {
            CostFormula::RuntimeOnly(b) => ScaledCoefficients { a: 0, b },
            CostFormula::Linear(c) | CostFormula::LogN(c) | CostFormula::NLogN(c) => c,
            CostFormula::FixedShape(shape) => match shape.runtime {
                CostExpr::Constant(b) => ScaledCoefficients { a: 0, b },
                CostExpr::Linear(c) => c,
            },
        }
    }

    /// Runtime dimension in closed algebraic form, e.g. `3*log2(n) + 12`.
    pub fn closed_form(&self) -> String {
        closed_form(self.growth_kind(), self.runtime_coefficients())
    }
}

/// Renders `coefficients` in the closed form of `kind`.
pub fn closed_form(kind: GrowthKind, coefficients: ScaledCoefficients) -> String {
    let ScaledCoefficients { a, b } = coefficients;
    match kind {
        GrowthKind::Constant => b.to_string(),
        GrowthKind::Linear => format!("{a}*n + {b}"),
        GrowthKind::LogN => format!("{a}*log2(n) + {b}"),
        GrowthKind::NLogN => format!("{a}*n*log2(n) + {b}"),
    }
}

/// A named formula, displayed as a Clarity read-only function of `n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDefinition {
    pub name: String,
    pub formula: CostFormula,
}

impl fmt::Display for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(define-read-only ({} (n uint))", self.name)?;
        match self.formula {
            CostFormula::RuntimeOnly(b) => write!(f, "    (runtime u{b}))"),
            CostFormula::Linear(ScaledCoefficients { a, b }) => {
                write!(f, "    (runtime (linear n u{a} u{b})))")
            }
            CostFormula::LogN(ScaledCoefficients { a, b }) => {
                write!(f, "    (runtime (logn n u{a} u{b})))")
            }
            CostFormula::NLogN(ScaledCoefficients { a, b }) => {
                write!(f, "    (runtime (nlogn n u{a} u{b})))")
            }
            CostFormula::FixedShape(shape) => {
                writeln!(f, "    {{")?;
                let dimensions = shape.dimensions();
                let last = dimensions.len() - 1;
                for (i, (name, expr)) in dimensions.into_iter().enumerate() {
                    let separator = if i == last { "" } else { "," };
                    writeln!(f, "        {name}: {expr}{separator}")?;
                }
                write!(f, "    }})")
            }
        }
    }
}
