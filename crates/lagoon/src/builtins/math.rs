//! Numeric-only wrappers over the standard math functions.
//!
//! Math builtins do not coerce: every argument must already be a number.
//! That check lives in the dispatcher; this module only maps names to
//! signatures and evaluates them.

/// A math builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum MathFn {
    Sqrt,
    Cbrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Exp,
    Expm1,
    Log,
    Log1p,
    Log2,
    Log10,
    Floor,
    Ceil,
    Trunc,
    Fabs,
    Pow,
    Fmod,
    Remainder,
    Hypot,
    Degrees,
    Radians,
    Copysign,
}

impl MathFn {
    /// Every math builtin, for root-namespace preloading.
    pub const ALL: &'static [Self] = &[
        Self::Sqrt,
        Self::Cbrt,
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Asin,
        Self::Acos,
        Self::Atan,
        Self::Atan2,
        Self::Sinh,
        Self::Cosh,
        Self::Tanh,
        Self::Asinh,
        Self::Acosh,
        Self::Atanh,
        Self::Exp,
        Self::Expm1,
        Self::Log,
        Self::Log1p,
        Self::Log2,
        Self::Log10,
        Self::Floor,
        Self::Ceil,
        Self::Trunc,
        Self::Fabs,
        Self::Pow,
        Self::Fmod,
        Self::Remainder,
        Self::Hypot,
        Self::Degrees,
        Self::Radians,
        Self::Copysign,
    ];

    /// The identifier this builtin is bound to.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Cbrt => "cbrt",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Atan2 => "atan2",
            Self::Sinh => "sinh",
            Self::Cosh => "cosh",
            Self::Tanh => "tanh",
            Self::Asinh => "asinh",
            Self::Acosh => "acosh",
            Self::Atanh => "atanh",
            Self::Exp => "exp",
            Self::Expm1 => "expm1",
            Self::Log => "log",
            Self::Log1p => "log1p",
            Self::Log2 => "log2",
            Self::Log10 => "log10",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Trunc => "trunc",
            Self::Fabs => "fabs",
            Self::Pow => "pow",
            Self::Fmod => "fmod",
            Self::Remainder => "remainder",
            Self::Hypot => "hypot",
            Self::Degrees => "degrees",
            Self::Radians => "radians",
            Self::Copysign => "copysign",
        }
    }

    /// Number of arguments the function takes.
    pub fn arity(self) -> usize {
        match self {
            Self::Atan2 | Self::Pow | Self::Fmod | Self::Remainder | Self::Hypot | Self::Copysign => 2,
            _ => 1,
        }
    }

    /// Evaluates with exactly `arity` arguments.
    pub fn eval(self, args: &[f64]) -> f64 {
        let x = args[0];
        match self {
            Self::Sqrt => x.sqrt(),
            Self::Cbrt => x.cbrt(),
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Asin => x.asin(),
            Self::Acos => x.acos(),
            Self::Atan => x.atan(),
            Self::Atan2 => x.atan2(args[1]),
            Self::Sinh => x.sinh(),
            Self::Cosh => x.cosh(),
            Self::Tanh => x.tanh(),
            Self::Asinh => x.asinh(),
            Self::Acosh => x.acosh(),
            Self::Atanh => x.atanh(),
            Self::Exp => x.exp(),
            Self::Expm1 => x.exp_m1(),
            Self::Log => x.ln(),
            Self::Log1p => x.ln_1p(),
            Self::Log2 => x.log2(),
            Self::Log10 => x.log10(),
            Self::Floor => x.floor(),
            Self::Ceil => x.ceil(),
            Self::Trunc => x.trunc(),
            Self::Fabs => x.abs(),
            Self::Pow => x.powf(args[1]),
            Self::Fmod => x % args[1],
            Self::Remainder => {
                let q = (x / args[1]).round();
                x - q * args[1]
            }
            Self::Hypot => x.hypot(args[1]),
            Self::Degrees => x.to_degrees(),
            Self::Radians => x.to_radians(),
            Self::Copysign => x.copysign(args[1]),
        }
    }
}

/// Constants bound alongside the math functions.
pub(crate) const MATH_CONSTANTS: &[(&str, f64)] = &[
    ("pi", std::f64::consts::PI),
    ("e", std::f64::consts::E),
    ("tau", std::f64::consts::TAU),
    ("inf", f64::INFINITY),
    ("nan", f64::NAN),
];
