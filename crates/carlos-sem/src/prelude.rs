//! The standard-library bindings installed into the root context before
//! a program is analyzed (§4.5). Carlos's own grammar/parser is out of
//! scope here, and so is an actual runtime for these functions — this
//! module only supplies their *names and types*, which is all the
//! analyzer needs to type-check calls against them.

use crate::entity::Entity;
use crate::types::{FunctionType, Types};
use carlos_util::{DefIdGenerator, Symbol};
use std::rc::Rc;

/// Builds the prelude bindings as an ordered list, so installing them
/// into a root [`crate::scope::Context`] is deterministic (§5).
pub struct Prelude {
    bindings: Vec<(Symbol, Entity)>,
}

impl Prelude {
    /// The standard prelude: `\u{3c0}` (float), and the `print`/`sin`/
    /// `cos`/`hypot`/`sqrt`/`exp`/`ln` functions.
    pub fn standard(types: &Types, ids: &DefIdGenerator) -> Self {
        let mut bindings = Vec::new();

        bindings.push((
            Symbol::intern("\u{3c0}"),
            Entity::variable(ids.next(), Symbol::intern("\u{3c0}"), true, types.float()),
        ));

        let print_sig = Rc::new(FunctionType {
            params: vec![types.any()],
            return_type: types.void(),
            variadic: true,
        });
        bindings.push((
            Symbol::intern("print"),
            Entity::function(ids.next(), Symbol::intern("print"), print_sig),
        ));

        for name in ["sin", "cos", "sqrt", "exp", "ln"] {
            let sig = Rc::new(FunctionType {
                params: vec![types.float()],
                return_type: types.float(),
                variadic: false,
            });
            bindings.push((
                Symbol::intern(name),
                Entity::function(ids.next(), Symbol::intern(name), sig),
            ));
        }

        let hypot = Rc::new(FunctionType {
            params: vec![types.float(), types.float()],
            return_type: types.float(),
            variadic: false,
        });
        bindings.push((
            Symbol::intern("hypot"),
            Entity::function(ids.next(), Symbol::intern("hypot"), hypot),
        ));

        Self { bindings }
    }

    /// No standard-library names at all, for tests that want a bare root.
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    pub fn bindings(&self) -> &[(Symbol, Entity)] {
        &self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_prelude_binds_pi_as_float() {
        let types = Types::new();
        let ids = DefIdGenerator::new();
        let prelude = Prelude::standard(&types, &ids);
        let (_, pi) = prelude
            .bindings()
            .iter()
            .find(|(name, _)| name.eq_str("\u{3c0}"))
            .unwrap();
        assert!(pi.as_variable().unwrap().var_type.equivalent_to(&types.float()));
        assert!(pi.as_variable().unwrap().read_only);
    }

    #[test]
    fn print_accepts_any() {
        let types = Types::new();
        let ids = DefIdGenerator::new();
        let prelude = Prelude::standard(&types, &ids);
        let (_, print) = prelude
            .bindings()
            .iter()
            .find(|(name, _)| name.eq_str("print"))
            .unwrap();
        let f = print.as_function().unwrap();
        assert_eq!(f.func_type.params.len(), 1);
        assert!(f.func_type.params[0].equivalent_to(&types.any()));
        assert!(f.func_type.variadic);
    }

    #[test]
    fn empty_prelude_has_no_bindings() {
        assert!(Prelude::empty().bindings().is_empty());
    }

    #[test]
    fn hypot_takes_two_floats() {
        let types = Types::new();
        let ids = DefIdGenerator::new();
        let prelude = Prelude::standard(&types, &ids);
        let (_, hypot) = prelude
            .bindings()
            .iter()
            .find(|(name, _)| name.eq_str("hypot"))
            .unwrap();
        assert_eq!(hypot.as_function().unwrap().func_type.params.len(), 2);
    }
}
