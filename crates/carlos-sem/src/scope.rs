//! The context stack: nested, no-shadowing scopes threaded through the
//! analysis, each tracking whether it is within a loop and which
//! function (if any) encloses it.

use crate::entity::Entity;
use carlos_util::Symbol;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Failure to bind a name that is already bound in the *same* context.
/// Carlos has no shadowing: a name may only be declared once per scope.
#[derive(Debug, Clone, Copy)]
pub struct NameAlreadyDeclared;

/// Failure to resolve a name anywhere in the enclosing chain.
#[derive(Debug, Clone, Copy)]
pub struct NameNotDeclared;

/// One nested scope. Root contexts enclose no function and are not
/// inside a loop; every other context is produced by [`Context::new_child`]
/// from a parent, inheriting `in_loop`/`function` unless overridden.
pub struct Context {
    parent: Option<Rc<Context>>,
    bindings: RefCell<IndexMap<Symbol, Entity>>,
    in_loop: bool,
    function: Option<Rc<crate::entity::FunctionData>>,
}

impl Context {
    /// The outermost context: no parent, not in a loop, no enclosing function.
    pub fn root() -> Rc<Context> {
        Rc::new(Context {
            parent: None,
            bindings: RefCell::new(IndexMap::new()),
            in_loop: false,
            function: None,
        })
    }

    /// A root context pre-seeded with `prelude`'s bindings (§4.5). Binding
    /// order follows `prelude`'s own order, keeping analysis deterministic.
    ///
    /// # Panics
    ///
    /// Panics if the prelude itself declares the same name twice — that
    /// indicates a bug in the prelude builder, not a rejected Carlos
    /// program, so it is not surfaced as an `AnalysisError`.
    pub fn root_with_prelude(prelude: &crate::prelude::Prelude) -> Rc<Context> {
        let root = Self::root();
        for (name, entity) in prelude.bindings() {
            root.add(*name, entity.clone())
                .expect("prelude must not declare a name twice");
        }
        root
    }

    /// Opens a nested scope under `self`. `in_loop`/`function` default to
    /// the parent's (a block nested inside a loop is still "in a loop";
    /// a block nested inside a function body still has that enclosing
    /// function), overridden only where the caller passes `Some`.
    pub fn new_child(
        self: &Rc<Self>,
        in_loop: Option<bool>,
        function: Option<Option<Rc<crate::entity::FunctionData>>>,
    ) -> Rc<Context> {
        Rc::new(Context {
            parent: Some(Rc::clone(self)),
            bindings: RefCell::new(IndexMap::new()),
            in_loop: in_loop.unwrap_or(self.in_loop),
            function: function.unwrap_or_else(|| self.function.clone()),
        })
    }

    pub fn in_loop(&self) -> bool {
        self.in_loop
    }

    pub fn enclosing_function(&self) -> Option<Rc<crate::entity::FunctionData>> {
        self.function.clone()
    }

    /// Declares `name` in this context. Fails if `name` is already visible
    /// *anywhere in the scope chain* — Carlos permits no shadowing, so a
    /// nested scope may not reuse a name bound in an enclosing one either.
    pub fn add(&self, name: Symbol, entity: Entity) -> Result<(), NameAlreadyDeclared> {
        if self.sees(name) {
            return Err(NameAlreadyDeclared);
        }
        self.bindings.borrow_mut().insert(name, entity);
        Ok(())
    }

    /// Does this context, or any of its ancestors, declare `name`?
    pub fn sees(&self, name: Symbol) -> bool {
        if self.bindings.borrow().contains_key(&name) {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.sees(name),
            None => false,
        }
    }

    /// Resolves `name` by walking outward from this context.
    pub fn lookup(&self, name: Symbol) -> Result<Entity, NameNotDeclared> {
        if let Some(entity) = self.bindings.borrow().get(&name) {
            return Ok(entity.clone());
        }
        match &self.parent {
            Some(parent) => parent.lookup(name),
            None => Err(NameNotDeclared),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Types;
    use carlos_util::DefIdGenerator;

    fn var(types: &Types, gen: &DefIdGenerator, name: &str) -> Entity {
        Entity::variable(gen.next(), Symbol::intern(name), false, types.int())
    }

    #[test]
    fn lookup_finds_binding_in_same_context() {
        let types = Types::new();
        let gen = DefIdGenerator::new();
        let root = Context::root();
        root.add(Symbol::intern("x"), var(&types, &gen, "x")).unwrap();
        assert!(root.lookup(Symbol::intern("x")).is_ok());
    }

    #[test]
    fn lookup_walks_up_to_parent() {
        let types = Types::new();
        let gen = DefIdGenerator::new();
        let root = Context::root();
        root.add(Symbol::intern("x"), var(&types, &gen, "x")).unwrap();
        let child = root.new_child(None, None);
        assert!(child.lookup(Symbol::intern("x")).is_ok());
    }

    #[test]
    fn lookup_fails_for_undeclared_name() {
        let root = Context::root();
        assert!(root.lookup(Symbol::intern("missing")).is_err());
    }

    #[test]
    fn redeclaring_in_same_context_fails() {
        let types = Types::new();
        let gen = DefIdGenerator::new();
        let root = Context::root();
        root.add(Symbol::intern("x"), var(&types, &gen, "x")).unwrap();
        let result = root.add(Symbol::intern("x"), var(&types, &gen, "x"));
        assert!(result.is_err());
    }

    #[test]
    fn reusing_a_name_from_an_enclosing_scope_is_rejected() {
        // No-shadowing is a conservation law over the whole chain: a
        // nested scope may not reuse a name bound further out either.
        let types = Types::new();
        let gen = DefIdGenerator::new();
        let root = Context::root();
        root.add(Symbol::intern("x"), var(&types, &gen, "x")).unwrap();
        let child = root.new_child(None, None);
        assert!(child.add(Symbol::intern("x"), var(&types, &gen, "x")).is_err());
    }

    #[test]
    fn child_inherits_in_loop_by_default() {
        let root = Context::root();
        let loop_ctx = root.new_child(Some(true), None);
        assert!(loop_ctx.in_loop());

        let block_inside_loop = loop_ctx.new_child(None, None);
        assert!(block_inside_loop.in_loop());
    }

    #[test]
    fn root_is_not_in_loop_and_has_no_enclosing_function() {
        let root = Context::root();
        assert!(!root.in_loop());
        assert!(root.enclosing_function().is_none());
    }

    #[test]
    fn root_with_prelude_binds_every_prelude_name() {
        let types = Types::new();
        let ids = DefIdGenerator::new();
        let prelude = crate::prelude::Prelude::standard(&types, &ids);
        let root = Context::root_with_prelude(&prelude);
        assert!(root.lookup(Symbol::intern("print")).is_ok());
        assert!(root.lookup(Symbol::intern("\u{3c0}")).is_ok());
    }

    #[test]
    fn sees_checks_whole_chain_without_returning_the_entity() {
        let types = Types::new();
        let gen = DefIdGenerator::new();
        let root = Context::root();
        root.add(Symbol::intern("x"), var(&types, &gen, "x")).unwrap();
        let child = root.new_child(None, None);
        assert!(child.sees(Symbol::intern("x")));
        assert!(!child.sees(Symbol::intern("y")));
    }
}
