//! Change sets: the unit of applied-tracking.

use crate::dialect::Dialect;
use crate::errors::SchevoResult;
use crate::refactor::Refactoring;
use crate::script::Script;

/// A named, ordered group of refactorings scoped to one module.
///
/// Identity for applied-tracking purposes is the explicit, author-supplied
/// `id` (unique within the owning module). The sequence number is assigned
/// when an [`EvolutionHistory`](crate::history::EvolutionHistory) registers
/// the change set and only fixes execution order within the module.
///
/// A change set never executes anything itself; it only produces a
/// [`Script`].
#[derive(Debug, Clone)]
pub struct ChangeSet {
    id: String,
    sequence_number: usize,
    module_name: String,
    refactorings: Vec<Refactoring>,
}

impl ChangeSet {
    /// Creates a change set with the given explicit id. The sequence
    /// number and owning module are assigned at registration.
    pub fn new(id: &str, refactorings: Vec<Refactoring>) -> Self {
        ChangeSet {
            id: id.to_string(),
            sequence_number: 0,
            module_name: String::new(),
            refactorings,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Execution order within the owning module; equals the registration
    /// index.
    pub fn sequence_number(&self) -> usize {
        self.sequence_number
    }

    /// Name of the module this change set belongs to.
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn refactorings(&self) -> &[Refactoring] {
        &self.refactorings
    }

    /// Binds this change set to its owning module. Called exactly once by
    /// the history during registration.
    pub(crate) fn attach(&mut self, module_name: &str, sequence_number: usize) {
        self.module_name = module_name.to_string();
        self.sequence_number = sequence_number;
    }

    /// Ordered concatenation of each contained refactoring's script.
    pub fn to_script(&self, dialect: &dyn Dialect) -> SchevoResult<Script> {
        let mut script = Script::new();
        for refactoring in &self.refactorings {
            script.append(refactoring.to_script(dialect)?);
        }
        Ok(script)
    }
}
