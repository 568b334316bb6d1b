use crate::solve::SolveResult;
use std::collections::HashMap;

/// Expression → answer pairs sent back to the solver with every request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariableBindings {
    values: HashMap<String, String>,
}

impl VariableBindings {
    pub fn reset(&mut self) {
        self.values.clear();
    }

    /// Stores the result only when the service flagged it as an assignment.
    pub fn apply(&mut self, result: &SolveResult) -> bool {
        if !result.assign {
            return false;
        }
        tracing::debug!(expression = %result.expression, answer = %result.answer, "binding variable");
        self.values
            .insert(result.expression.clone(), result.answer.clone());
        true
    }

    pub fn get(&self, expression: &str) -> Option<&str> {
        self.values.get(expression).map(String::as_str)
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values.clone()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
