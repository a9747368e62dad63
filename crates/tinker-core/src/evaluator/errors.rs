use thiserror::Error;

/// Evaluator-specific error types for better error handling
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluatorError {
    #[error("Type error: {operation} requires {expected}, got {actual}")]
    TypeError {
        operation: String,
        expected: String,
        actual: String,
    },

    #[error("Type error: cannot {operation} {left_type} and {right_type}")]
    BinaryTypeError {
        operation: String,
        left_type: String,
        right_type: String,
    },

    #[error("Function '{name}' not found")]
    FunctionNotFound { name: String },

    #[error("Variable '{name}' not found")]
    VariableNotFound { name: String },

    #[error("Function '{name}' takes {expected} arguments, got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Maximum evaluation depth exceeded")]
    DepthExceeded,

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl EvaluatorError {
    /// Create a type error for unary operations
    pub fn unary_type_error(operation: &str, expected: &str, actual: &str) -> Self {
        Self::TypeError {
            operation: operation.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a type error for binary operations
    pub fn binary_type_error(operation: &str, left_type: &str, right_type: &str) -> Self {
        Self::BinaryTypeError {
            operation: operation.to_string(),
            left_type: left_type.to_string(),
            right_type: right_type.to_string(),
        }
    }

    /// Create a function not found error
    pub fn function_not_found(name: &str) -> Self {
        Self::FunctionNotFound {
            name: name.to_string(),
        }
    }

    /// Create a variable not found error
    pub fn variable_not_found(name: &str) -> Self {
        Self::VariableNotFound {
            name: name.to_string(),
        }
    }
}
