//! Resolved program entities: the things an identifier can be bound to.

use crate::types::{FunctionType, Type};
use carlos_util::{DefId, Symbol};
use std::rc::Rc;

/// A `let`/`const` binding, or a function parameter (which is always
/// read-only within its own body).
#[derive(Debug)]
pub struct VariableData {
    pub id: DefId,
    pub name: Symbol,
    pub read_only: bool,
    pub var_type: Type,
}

/// A function declaration. `func_type` is fully known before the body is
/// analyzed (no forward-declaration is needed the way struct fields
/// need it, since a function's signature doesn't depend on its own body).
#[derive(Debug)]
pub struct FunctionData {
    pub id: DefId,
    pub name: Symbol,
    pub func_type: Rc<FunctionType>,
}

/// What a name in scope resolves to.
#[derive(Debug, Clone)]
pub enum Entity {
    Variable(Rc<VariableData>),
    Function(Rc<FunctionData>),
    /// A type name: either a primitive (bound once, in the root context)
    /// or a user struct type (bound when its declaration is analyzed).
    Type(Type),
}

impl Entity {
    pub fn variable(id: DefId, name: Symbol, read_only: bool, var_type: Type) -> Self {
        Entity::Variable(Rc::new(VariableData {
            id,
            name,
            read_only,
            var_type,
        }))
    }

    pub fn function(id: DefId, name: Symbol, func_type: Rc<FunctionType>) -> Self {
        Entity::Function(Rc::new(FunctionData {
            id,
            name,
            func_type,
        }))
    }

    pub fn as_variable(&self) -> Option<&Rc<VariableData>> {
        match self {
            Entity::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<FunctionData>> {
        match self {
            Entity::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&Type> {
        match self {
            Entity::Type(t) => Some(t),
            _ => None,
        }
    }

    /// The type a value-position reference to this entity carries: a
    /// variable's declared type, a function's own function type, or
    /// `type` itself for a type name used as a value (§4.4 "Type
    /// expressions used in value position").
    pub fn value_type(&self, types: &crate::types::Types) -> Type {
        match self {
            Entity::Variable(v) => v.var_type.clone(),
            Entity::Function(f) => Type::Function(f.func_type.clone()),
            Entity::Type(_) => types.type_of_types(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Types;
    use carlos_util::DefIdGenerator;

    #[test]
    fn variable_value_type_is_its_declared_type() {
        let types = Types::new();
        let gen = DefIdGenerator::new();
        let v = Entity::variable(gen.next(), Symbol::intern("x"), false, types.int());
        assert!(v.value_type(&types).equivalent_to(&types.int()));
        assert!(v.as_variable().is_some());
        assert!(v.as_function().is_none());
    }

    #[test]
    fn function_value_type_is_a_function_type() {
        let types = Types::new();
        let gen = DefIdGenerator::new();
        let ft = Rc::new(FunctionType {
            params: vec![types.int()],
            return_type: types.boolean(),
            variadic: false,
        });
        let f = Entity::function(gen.next(), Symbol::intern("isEven"), ft);
        assert_eq!(f.value_type(&types).description(), "(int)->boolean");
    }

    #[test]
    fn type_entity_value_type_is_type_of_types() {
        let types = Types::new();
        let e = Entity::Type(types.int());
        assert!(e.value_type(&types).equivalent_to(&types.type_of_types()));
        assert!(e.as_type().is_some());
    }
}
