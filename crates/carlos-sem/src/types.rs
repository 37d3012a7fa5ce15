//! The resolved type model: the five `Type` variants, their equivalence
//! and assignability relations, and the canonical primitive objects.

use carlos_util::{DefId, Symbol};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// One of the seven canonical primitives. There is exactly one `Type`
/// value in circulation for each variant (see [`Types`]); this enum only
/// needs `PartialEq` because the single-instance discipline is enforced
/// by construction, not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Int,
    Float,
    String,
    Void,
    /// The type-of-types: the type carried by struct-type entities when
    /// referenced as values.
    Type,
    /// Accepts any source type on assignment; never produced as the type
    /// of an expression other than as a target in a standard-library
    /// signature.
    Any,
}

impl Primitive {
    fn description(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::String => "string",
            Primitive::Void => "void",
            Primitive::Type => "type",
            Primitive::Any => "any",
        }
    }
}

/// A resolved type. Compound variants are `Rc`-wrapped so cloning a type
/// (done constantly while threading types through expressions) is a
/// refcount bump, not a deep copy.
#[derive(Debug, Clone)]
pub enum Type {
    Primitive(Rc<Primitive>),
    Array(Rc<Type>),
    Optional(Rc<Type>),
    Function(Rc<FunctionType>),
    Struct(Rc<StructTypeData>),
}

/// `(paramTypes) -> returnType`. A variadic signature (only the prelude's
/// `print` uses one, per §4.5 "variadic-any") has exactly one entry in
/// `params`: the type every call argument, however many are passed, must
/// be assignable to. Carlos's own grammar has no syntax for declaring a
/// variadic function, so this only ever arises for a builtin.
#[derive(Debug)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub return_type: Type,
    pub variadic: bool,
}

/// A user-declared struct type. `fields` starts empty at construction and
/// is filled in once, after the declaration binds its own name in scope
/// (§4.4 "Struct type declaration") — this is what lets a field's type
/// expression refer back to the struct through an array/optional wrapper.
#[derive(Debug)]
pub struct StructTypeData {
    pub id: DefId,
    pub name: Symbol,
    pub fields: RefCell<Vec<Field>>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: Symbol,
    pub field_type: Type,
}

impl StructTypeData {
    pub fn field(&self, name: Symbol) -> Option<Field> {
        self.fields.borrow().iter().find(|f| f.name == name).cloned()
    }

    /// Fills in the field list once the declared field types are resolved.
    /// Called exactly once, after construction and binding.
    pub fn set_fields(&self, fields: Vec<Field>) {
        *self.fields.borrow_mut() = fields;
    }
}

impl Type {
    /// Structural-or-identity sameness per §3.1. Primitives and structs
    /// compare by object identity (`Rc::ptr_eq`); arrays, optionals, and
    /// functions recurse structurally.
    pub fn equivalent_to(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Primitive(a), Type::Primitive(b)) => Rc::ptr_eq(a, b),
            (Type::Array(a), Type::Array(b)) => a.equivalent_to(b),
            (Type::Optional(a), Type::Optional(b)) => a.equivalent_to(b),
            (Type::Function(a), Type::Function(b)) => {
                a.variadic == b.variadic
                    && a.params.len() == b.params.len()
                    && a.return_type.equivalent_to(&b.return_type)
                    && a.params
                        .iter()
                        .zip(b.params.iter())
                        .all(|(p, q)| p.equivalent_to(q))
            }
            (Type::Struct(a), Type::Struct(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `self ↝ other`: may a value of type `self` flow into a slot of
    /// type `other`? Invariant for everything except functions
    /// (covariant return, contravariant parameters) and the `any` target.
    pub fn assignable_to(&self, other: &Type) -> bool {
        if let Type::Primitive(p) = other {
            if **p == Primitive::Any {
                return true;
            }
        }
        match (self, other) {
            (Type::Function(a), Type::Function(b)) => {
                a.variadic == b.variadic
                    && a.params.len() == b.params.len()
                    && a.return_type.assignable_to(&b.return_type)
                    && b.params
                        .iter()
                        .zip(a.params.iter())
                        .all(|(b_param, a_param)| b_param.assignable_to(a_param))
            }
            _ => self.equivalent_to(other),
        }
    }

    pub fn is_primitive(&self, p: Primitive) -> bool {
        matches!(self, Type::Primitive(inner) if **inner == p)
    }

    pub fn is_int(&self) -> bool {
        self.is_primitive(Primitive::Int)
    }

    pub fn is_boolean(&self) -> bool {
        self.is_primitive(Primitive::Boolean)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_primitive(Primitive::Int) || self.is_primitive(Primitive::Float)
    }

    pub fn is_numeric_or_string(&self) -> bool {
        self.is_numeric() || self.is_primitive(Primitive::String)
    }

    pub fn as_array_base(&self) -> Option<&Type> {
        match self {
            Type::Array(base) => Some(base),
            _ => None,
        }
    }

    pub fn as_optional_base(&self) -> Option<&Type> {
        match self {
            Type::Optional(base) => Some(base),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Rc<StructTypeData>> {
        match self {
            Type::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<FunctionType>> {
        match self {
            Type::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn description(&self) -> String {
        match self {
            Type::Primitive(p) => p.description().to_string(),
            Type::Array(base) => format!("[{}]", base.description()),
            Type::Optional(base) => format!("{}?", base.description()),
            Type::Function(f) => {
                let mut params = f
                    .params
                    .iter()
                    .map(Type::description)
                    .collect::<Vec<_>>()
                    .join(",");
                if f.variadic {
                    params.push_str("...");
                }
                format!("({})->{}", params, f.return_type.description())
            }
            Type::Struct(s) => s.name.as_str().to_string(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Factory for the seven canonical primitive [`Type`]s. One `Types`
/// instance is owned by each [`crate::analysis::Analyzer`]; every call to
/// e.g. [`Types::int`] clones the same `Rc<Primitive>`, so `equivalent_to`
/// on two primitive types is always a pointer comparison.
pub struct Types {
    boolean: Type,
    int: Type,
    float: Type,
    string: Type,
    void: Type,
    type_: Type,
    any: Type,
}

impl Types {
    pub fn new() -> Self {
        Self {
            boolean: Type::Primitive(Rc::new(Primitive::Boolean)),
            int: Type::Primitive(Rc::new(Primitive::Int)),
            float: Type::Primitive(Rc::new(Primitive::Float)),
            string: Type::Primitive(Rc::new(Primitive::String)),
            void: Type::Primitive(Rc::new(Primitive::Void)),
            type_: Type::Primitive(Rc::new(Primitive::Type)),
            any: Type::Primitive(Rc::new(Primitive::Any)),
        }
    }

    pub fn boolean(&self) -> Type {
        self.boolean.clone()
    }
    pub fn int(&self) -> Type {
        self.int.clone()
    }
    pub fn float(&self) -> Type {
        self.float.clone()
    }
    pub fn string(&self) -> Type {
        self.string.clone()
    }
    pub fn void(&self) -> Type {
        self.void.clone()
    }
    pub fn type_of_types(&self) -> Type {
        self.type_.clone()
    }
    pub fn any(&self) -> Type {
        self.any.clone()
    }

    pub fn array(&self, base: Type) -> Type {
        Type::Array(Rc::new(base))
    }

    pub fn optional(&self, base: Type) -> Type {
        Type::Optional(Rc::new(base))
    }

    pub fn function(&self, params: Vec<Type>, return_type: Type) -> Type {
        Type::Function(Rc::new(FunctionType {
            params,
            return_type,
            variadic: false,
        }))
    }

    /// A variadic-any signature: any number of arguments, each assignable
    /// to `param`. Only the prelude's `print` (§4.5) needs this.
    pub fn variadic_function(&self, param: Type, return_type: Type) -> Type {
        Type::Function(Rc::new(FunctionType {
            params: vec![param],
            return_type,
            variadic: true,
        }))
    }

    /// Looks up a primitive by its Carlos spelling, used when resolving a
    /// bare-identifier type expression (§4.4 "Type expressions").
    pub fn by_name(&self, name: &str) -> Option<Type> {
        match name {
            "boolean" => Some(self.boolean()),
            "int" => Some(self.int()),
            "float" => Some(self.float()),
            "string" => Some(self.string()),
            "void" => Some(self.void()),
            "type" => Some(self.type_of_types()),
            "any" => Some(self.any()),
            _ => None,
        }
    }

    pub fn new_struct(&self, id: DefId, name: Symbol) -> Type {
        Type::Struct(Rc::new(StructTypeData {
            id,
            name,
            fields: RefCell::new(Vec::new()),
        }))
    }
}

impl Default for Types {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carlos_util::DefIdGenerator;

    // ========================================================================
    // Primitive identity / equivalence
    // ========================================================================

    #[test]
    fn same_primitive_is_equivalent() {
        let types = Types::new();
        assert!(types.int().equivalent_to(&types.int()));
    }

    #[test]
    fn different_primitives_are_not_equivalent() {
        let types = Types::new();
        assert!(!types.int().equivalent_to(&types.boolean()));
    }

    #[test]
    fn two_types_factories_do_not_share_identity() {
        // Each Types instance mints its own canonical Rc<Primitive> set;
        // only clones of the *same* factory's primitives are identity-equal.
        let a = Types::new();
        let b = Types::new();
        assert!(!a.int().equivalent_to(&b.int()));
    }

    // ========================================================================
    // Array / Optional
    // ========================================================================

    #[test]
    fn arrays_of_equivalent_base_are_equivalent() {
        let types = Types::new();
        let a = types.array(types.int());
        let b = types.array(types.int());
        assert!(a.equivalent_to(&b));
    }

    #[test]
    fn arrays_of_different_base_are_not_equivalent() {
        let types = Types::new();
        let a = types.array(types.int());
        let b = types.array(types.boolean());
        assert!(!a.equivalent_to(&b));
    }

    #[test]
    fn array_not_assignable_to_array_of_optional() {
        // [int] is not assignable to [int?] even though int ↝ int?.
        let types = Types::new();
        let int_array = types.array(types.int());
        let optional_int_array = types.array(types.optional(types.int()));
        assert!(!int_array.assignable_to(&optional_int_array));
    }

    #[test]
    fn optionals_of_equivalent_base_are_equivalent() {
        let types = Types::new();
        assert!(types
            .optional(types.int())
            .equivalent_to(&types.optional(types.int())));
    }

    // ========================================================================
    // Function equivalence and assignability (variance)
    // ========================================================================

    #[test]
    fn structurally_identical_function_types_are_equivalent() {
        let types = Types::new();
        let f1 = types.function(vec![types.int()], types.boolean());
        let f2 = types.function(vec![types.int()], types.boolean());
        assert!(f1.equivalent_to(&f2));
    }

    #[test]
    fn function_arity_mismatch_is_not_equivalent() {
        let types = Types::new();
        let f1 = types.function(vec![types.int()], types.boolean());
        let f2 = types.function(vec![types.int(), types.int()], types.boolean());
        assert!(!f1.equivalent_to(&f2));
    }

    #[test]
    fn covariant_return_is_assignable() {
        // (boolean)->int assignable to (boolean)->any isn't meaningful here;
        // use a case within the rule: equal params, return type equivalent.
        let types = Types::new();
        let f1 = types.function(vec![types.boolean()], types.int());
        let f2 = types.function(vec![types.boolean()], types.int());
        assert!(f1.assignable_to(&f2));
    }

    #[test]
    fn mismatched_return_type_is_not_assignable() {
        // (boolean)->int should not be assignable to (boolean)->void.
        let types = Types::new();
        let source = types.function(vec![types.boolean()], types.int());
        let target = types.function(vec![types.boolean()], types.void());
        assert!(!source.assignable_to(&target));
    }

    #[test]
    fn variadic_function_is_not_equivalent_to_fixed_arity_function_of_same_shape() {
        let types = Types::new();
        let variadic = types.variadic_function(types.any(), types.void());
        let fixed = types.function(vec![types.any()], types.void());
        assert!(!variadic.equivalent_to(&fixed));
    }

    #[test]
    fn variadic_function_description_shows_ellipsis() {
        let types = Types::new();
        let print_ty = types.variadic_function(types.any(), types.void());
        assert_eq!(print_ty.description(), "(any...)->void");
    }

    // ========================================================================
    // Struct identity
    // ========================================================================

    #[test]
    fn distinct_struct_declarations_are_not_equivalent() {
        let types = Types::new();
        let gen = DefIdGenerator::new();
        let name = Symbol::intern("S");
        let s1 = types.new_struct(gen.next(), name);
        let s2 = types.new_struct(gen.next(), name);
        assert!(!s1.equivalent_to(&s2));
    }

    #[test]
    fn same_struct_handle_is_equivalent_to_itself() {
        let types = Types::new();
        let gen = DefIdGenerator::new();
        let s = types.new_struct(gen.next(), Symbol::intern("S"));
        assert!(s.equivalent_to(&s.clone()));
    }

    #[test]
    fn struct_recursion_through_optional_is_not_direct_recursion() {
        let types = Types::new();
        let gen = DefIdGenerator::new();
        let s = types.new_struct(gen.next(), Symbol::intern("S"));
        let wrapped = types.optional(s.clone());
        // the field type (S?) is not identity-equal to S itself.
        assert!(!wrapped.equivalent_to(&s));
    }

    // ========================================================================
    // Any
    // ========================================================================

    #[test]
    fn any_target_accepts_anything() {
        let types = Types::new();
        assert!(types.int().assignable_to(&types.any()));
        assert!(types.boolean().assignable_to(&types.any()));
        assert!(types
            .function(vec![], types.void())
            .assignable_to(&types.any()));
    }

    // ========================================================================
    // Descriptions
    // ========================================================================

    #[test]
    fn description_of_primitive() {
        let types = Types::new();
        assert_eq!(types.int().description(), "int");
    }

    #[test]
    fn description_of_array() {
        let types = Types::new();
        assert_eq!(types.array(types.int()).description(), "[int]");
    }

    #[test]
    fn description_of_optional() {
        let types = Types::new();
        assert_eq!(types.optional(types.int()).description(), "int?");
    }

    #[test]
    fn description_of_function() {
        let types = Types::new();
        let f = types.function(vec![types.boolean()], types.void());
        assert_eq!(f.description(), "(boolean)->void");
    }

    #[test]
    fn description_of_struct() {
        let types = Types::new();
        let gen = DefIdGenerator::new();
        let s = types.new_struct(gen.next(), Symbol::intern("Point"));
        assert_eq!(s.description(), "Point");
    }

    #[test]
    fn struct_fields_start_empty_and_fill_in_once() {
        let types = Types::new();
        let gen = DefIdGenerator::new();
        let s = types.new_struct(gen.next(), Symbol::intern("S"));
        let data = s.as_struct().unwrap();
        assert!(data.fields.borrow().is_empty());

        data.set_fields(vec![Field {
            name: Symbol::intern("x"),
            field_type: types.int(),
        }]);
        assert_eq!(data.fields.borrow().len(), 1);
        assert!(data.field(Symbol::intern("x")).is_some());
        assert!(data.field(Symbol::intern("y")).is_none());
    }
}
