// Tree-walking evaluator for the Tinker mini-language.

use std::{collections::HashMap, sync::Arc};

use crate::{
    ast::{BinOp, Expr, Function, Stmt},
    runtime::{FuncId, Module, Runtime},
};

pub mod errors;
pub use errors::EvaluatorError;

#[cfg(test)]
mod tests;

/// Runtime values
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
    /// Handle to a registered script function
    Function(FuncId),
    /// Handle to a runtime module
    Module(Arc<Module>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                *a as f64 == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Module(a), Value::Module(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
            Value::Module(_) => "module",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.is_empty(),
            Value::Function(_) | Value::Module(_) => true,
        }
    }
}

/// Local variable bindings for one function activation
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub variables: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Statement outcome used to thread `return` through nested blocks
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    Normal,
    Return(Value),
}

/// Tree-walking evaluator bound to a runtime's function registry.
pub struct Evaluator<'rt> {
    runtime: &'rt Runtime,
    max_depth: usize,
}

impl<'rt> Evaluator<'rt> {
    pub fn new(runtime: &'rt Runtime) -> Self {
        let max_depth = runtime.config().max_eval_depth;
        Self { runtime, max_depth }
    }

    /// Call a function AST with positional arguments.
    pub fn call_function(
        &self,
        func: &Function,
        args: &[Value],
        depth: usize,
    ) -> Result<Value, EvaluatorError> {
        if depth > self.max_depth {
            return Err(EvaluatorError::DepthExceeded);
        }
        if args.len() != func.params.len() {
            return Err(EvaluatorError::Arity {
                name: func.name.clone(),
                expected: func.params.len(),
                got: args.len(),
            });
        }

        let mut env = Environment::new();
        for (param, arg) in func.params.iter().zip(args) {
            env.variables.insert(param.clone(), arg.clone());
        }

        match self.exec_block(&mut env, &func.body, depth)? {
            ControlFlow::Return(v) => Ok(v),
            ControlFlow::Normal => Ok(Value::Null),
        }
    }

    fn exec_block(
        &self,
        env: &mut Environment,
        stmts: &[Stmt],
        depth: usize,
    ) -> Result<ControlFlow, EvaluatorError> {
        for stmt in stmts {
            match self.exec_stmt(env, stmt, depth)? {
                ControlFlow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(ControlFlow::Normal)
    }

    fn exec_stmt(
        &self,
        env: &mut Environment,
        stmt: &Stmt,
        depth: usize,
    ) -> Result<ControlFlow, EvaluatorError> {
        match stmt {
            Stmt::Pass => Ok(ControlFlow::Normal),
            Stmt::Return { value } => {
                let v = match value {
                    Some(expr) => self.eval_expr(env, expr, depth)?,
                    None => Value::Null,
                };
                Ok(ControlFlow::Return(v))
            }
            Stmt::Assign { name, value } => {
                let v = self.eval_expr(env, value, depth)?;
                env.variables.insert(name.clone(), v);
                Ok(ControlFlow::Normal)
            }
            Stmt::If { arms, otherwise } => {
                for (cond, body) in arms {
                    if self.eval_expr(env, cond, depth)?.is_truthy() {
                        return self.exec_block(env, body, depth);
                    }
                }
                self.exec_block(env, otherwise, depth)
            }
            Stmt::While { condition, body } => {
                while self.eval_expr(env, condition, depth)?.is_truthy() {
                    match self.exec_block(env, body, depth)? {
                        ControlFlow::Normal => {}
                        flow => return Ok(flow),
                    }
                }
                Ok(ControlFlow::Normal)
            }
            Stmt::Expr(expr) => {
                self.eval_expr(env, expr, depth)?;
                Ok(ControlFlow::Normal)
            }
        }
    }

    fn eval_expr(
        &self,
        env: &mut Environment,
        expr: &Expr,
        depth: usize,
    ) -> Result<Value, EvaluatorError> {
        match expr {
            Expr::Int(v) => Ok(Value::Integer(*v)),
            Expr::Float(v) => Ok(Value::Float(*v)),
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Bool(b) => Ok(Value::Boolean(*b)),
            Expr::None => Ok(Value::Null),
            Expr::Identifier(name) => env
                .variables
                .get(name)
                .cloned()
                .ok_or_else(|| EvaluatorError::variable_not_found(name)),
            Expr::Not(operand) => {
                let v = self.eval_expr(env, operand, depth)?;
                Ok(Value::Boolean(!v.is_truthy()))
            }
            Expr::Neg(operand) => match self.eval_expr(env, operand, depth)? {
                Value::Integer(n) => Ok(Value::Integer(-n)),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(EvaluatorError::unary_type_error(
                    "negate",
                    "number",
                    other.type_name(),
                )),
            },
            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(env, arg, depth)?);
                }
                // local variables holding a function handle shadow globals
                let target = match env.variables.get(name) {
                    Some(Value::Function(id)) => Some(*id),
                    _ => self.runtime.lookup(name),
                };
                let id = target.ok_or_else(|| EvaluatorError::function_not_found(name))?;
                let func = self
                    .runtime
                    .function(id)
                    .ok_or_else(|| EvaluatorError::function_not_found(name))?;
                self.call_function(&func.ast, &values, depth + 1)
            }
            Expr::Binary { op, left, right } => {
                // short-circuit logical operators before evaluating the rhs
                if matches!(op, BinOp::And | BinOp::Or) {
                    let lhs = self.eval_expr(env, left, depth)?;
                    return match op {
                        BinOp::And if !lhs.is_truthy() => Ok(lhs),
                        BinOp::Or if lhs.is_truthy() => Ok(lhs),
                        _ => self.eval_expr(env, right, depth),
                    };
                }
                let lhs = self.eval_expr(env, left, depth)?;
                let rhs = self.eval_expr(env, right, depth)?;
                eval_binary(*op, lhs, rhs)
            }
        }
    }
}

fn eval_binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, EvaluatorError> {
    use BinOp::*;
    match op {
        Eq => Ok(Value::Boolean(lhs == rhs)),
        Ne => Ok(Value::Boolean(lhs != rhs)),
        Lt | Le | Gt | Ge => compare(op, lhs, rhs),
        Add => match (lhs, rhs) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            (Value::List(mut a), Value::List(b)) => {
                a.extend(b);
                Ok(Value::List(a))
            }
            (a, b) => arith(op, a, b),
        },
        Sub | Mul | Div | Mod | Pow => arith(op, lhs, rhs),
        And | Or => unreachable!("logical operators are short-circuited"),
    }
}

fn compare(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, EvaluatorError> {
    let ordering = match (&lhs, &rhs) {
        (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => a.partial_cmp(b),
        (a, b) => match (numeric(a), numeric(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    };
    let ordering = ordering.ok_or_else(|| {
        EvaluatorError::binary_type_error(op.symbol(), lhs.type_name(), rhs.type_name())
    })?;
    let result = match op {
        BinOp::Lt => ordering.is_lt(),
        BinOp::Le => ordering.is_le(),
        BinOp::Gt => ordering.is_gt(),
        BinOp::Ge => ordering.is_ge(),
        _ => unreachable!(),
    };
    Ok(Value::Boolean(result))
}

fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Integer(n) => Some(*n as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn arith(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, EvaluatorError> {
    use BinOp::*;
    match (&lhs, &rhs) {
        (Value::Integer(a), Value::Integer(b)) => {
            let (a, b) = (*a, *b);
            match op {
                Add => Ok(Value::Integer(a.wrapping_add(b))),
                Sub => Ok(Value::Integer(a.wrapping_sub(b))),
                Mul => Ok(Value::Integer(a.wrapping_mul(b))),
                Div => {
                    if b == 0 {
                        return Err(EvaluatorError::DivisionByZero);
                    }
                    // true division, like the source language
                    Ok(Value::Float(a as f64 / b as f64))
                }
                Mod => {
                    if b == 0 {
                        return Err(EvaluatorError::DivisionByZero);
                    }
                    Ok(Value::Integer(a.rem_euclid(b)))
                }
                Pow => {
                    if b >= 0 {
                        match a.checked_pow(b.min(u32::MAX as i64) as u32) {
                            Some(v) => Ok(Value::Integer(v)),
                            None => Ok(Value::Float((a as f64).powf(b as f64))),
                        }
                    } else {
                        Ok(Value::Float((a as f64).powf(b as f64)))
                    }
                }
                _ => unreachable!(),
            }
        }
        _ => {
            let (a, b) = match (numeric(&lhs), numeric(&rhs)) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    return Err(EvaluatorError::binary_type_error(
                        op.symbol(),
                        lhs.type_name(),
                        rhs.type_name(),
                    ))
                }
            };
            match op {
                Add => Ok(Value::Float(a + b)),
                Sub => Ok(Value::Float(a - b)),
                Mul => Ok(Value::Float(a * b)),
                Div => {
                    if b == 0.0 {
                        return Err(EvaluatorError::DivisionByZero);
                    }
                    Ok(Value::Float(a / b))
                }
                Mod => {
                    if b == 0.0 {
                        return Err(EvaluatorError::DivisionByZero);
                    }
                    Ok(Value::Float(a.rem_euclid(b)))
                }
                Pow => Ok(Value::Float(a.powf(b))),
                _ => unreachable!(),
            }
        }
    }
}
