//! The static builtin roster. Each entry is grounded in its
//! own submodule; `runtime::eval` consults [`TABLE`] both for direct-call
//! dispatch and to pre-bind every name as a first-class value in the
//! global frame.

mod arithmetic;
mod comparison;
mod control;
mod include;
mod io;
mod logic;
mod macro_time;
mod math;
mod pairs;
mod predicates;
mod strings;

use crate::runtime::eval::BuiltinSpec;

macro_rules! spec {
    ($name:expr, $min:expr, $variadic:expr, $pn_arity:expr, $func:expr) => {
        BuiltinSpec {
            name: $name,
            min_arity: $min,
            variadic: $variadic,
            pn_arity: $pn_arity,
            func: $func,
        }
    };
}

/// `min_arity`/`variadic` govern direct application; `pn_arity` (the 4th
/// column) governs use as an operator inside a PN block's reduction and is
/// independent of the former two — binary operators take 2 regardless of
/// how many extra operands direct-call form would accept, unary operators
/// take 1, niladic ones take 0.
pub static TABLE: &[BuiltinSpec] = &[
    spec!("display", 1, true, 1, io::display),
    spec!("=", 1, true, 2, comparison::eq),
    spec!("<", 2, false, 2, comparison::lt),
    spec!("<=", 2, false, 2, comparison::le),
    spec!(">", 2, false, 2, comparison::gt),
    spec!(">=", 2, false, 2, comparison::ge),
    spec!("void?", 1, false, 1, predicates::is_void),
    spec!("boolean?", 1, false, 1, predicates::is_boolean),
    spec!("integer?", 1, false, 1, predicates::is_integer),
    spec!("real?", 1, false, 1, predicates::is_real),
    spec!("number?", 1, false, 1, predicates::is_number),
    spec!("symbol?", 1, false, 1, predicates::is_symbol),
    spec!("pair?", 1, false, 1, predicates::is_pair),
    spec!("procedure?", 1, false, 1, predicates::is_procedure),
    spec!("+", 0, true, 2, arithmetic::add),
    spec!("*", 0, true, 2, arithmetic::mul),
    spec!("-", 1, true, 2, arithmetic::sub),
    spec!("/", 1, true, 2, arithmetic::div),
    spec!("modulo", 2, false, 2, arithmetic::modulo),
    spec!("and", 0, true, 2, logic::and),
    spec!("or", 0, true, 2, logic::or),
    spec!("xor", 0, true, 2, logic::xor),
    spec!("not", 1, false, 1, logic::not),
    spec!("cons", 2, false, 2, pairs::cons),
    spec!("car", 1, false, 1, pairs::car),
    spec!("cdr", 1, false, 1, pairs::cdr),
    spec!("list", 0, true, 1, pairs::list),
    spec!("strlen", 1, false, 1, strings::strlen),
    spec!("strcat", 1, true, 2, strings::strcat),
    spec!("charat", 2, false, 2, strings::charat),
    spec!("substr", 3, false, 3, strings::substr),
    spec!("strcar", 1, false, 1, strings::strcar),
    spec!("strcdr", 1, false, 1, strings::strcdr),
    spec!("sin", 1, false, 1, math::sin),
    spec!("cos", 1, false, 1, math::cos),
    spec!("tan", 1, false, 1, math::tan),
    spec!("asin", 1, false, 1, math::asin),
    spec!("acos", 1, false, 1, math::acos),
    spec!("atan", 1, false, 1, math::atan),
    spec!("atan2", 2, false, 2, math::atan2),
    spec!("sinh", 1, false, 1, math::sinh),
    spec!("cosh", 1, false, 1, math::cosh),
    spec!("tanh", 1, false, 1, math::tanh),
    spec!("exp", 1, false, 1, math::exp),
    spec!("log", 1, false, 1, math::log),
    spec!("pow", 2, false, 2, math::pow),
    spec!("sqrt", 1, false, 1, math::sqrt),
    spec!("cbrt", 1, false, 1, math::cbrt),
    spec!("hypot", 2, false, 2, math::hypot),
    spec!("erf", 1, false, 1, math::erf),
    spec!("gamma", 1, false, 1, math::gamma),
    spec!("floor", 1, false, 1, math::floor),
    spec!("ceil", 1, false, 1, math::ceil),
    spec!("round", 1, false, 1, math::round),
    spec!("truncate", 1, false, 1, math::truncate),
    spec!("isfinite", 1, false, 1, predicates::is_finite),
    spec!("isinf", 1, false, 1, predicates::is_inf),
    spec!("isnan", 1, false, 1, predicates::is_nan),
    spec!("isnormal", 1, false, 1, predicates::is_normal),
    spec!("random", 0, true, 0, math::random),
    spec!("system", 1, false, 1, io::system),
    spec!("getchar", 0, false, 0, io::getchar),
    spec!("putchar", 1, false, 1, io::putchar),
    spec!("current-seconds", 0, false, 0, io::current_seconds),
    spec!("error", 1, false, 1, control::error),
    spec!("exit", 0, true, 0, control::exit),
    spec!("eval", 1, false, 1, control::eval),
    spec!("defined?", 1, false, 1, predicates::is_defined),
    spec!("peek-tkn", 1, false, 1, macro_time::peek_tkn),
    spec!("pop-tkn", 1, false, 1, macro_time::pop_tkn),
    spec!("parse", 1, false, 1, macro_time::parse),
    spec!("include", 1, false, 1, include::include),
];
