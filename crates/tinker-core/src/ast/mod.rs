// Unified AST for the Tinker mini-language.
// Comments and blank lines exist only in the stored source text, never here;
// the patch engine relies on structural equality of this tree.

use serde::{Deserialize, Serialize};

/// A parsed function definition: `def name(params):` plus its body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

/// Statements of the mini-language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `return` or `return expr`
    Return { value: Option<Expr> },
    /// `name = expr` (plain rebinding, no declaration form)
    Assign { name: String, value: Expr },
    /// `if`/`elif` arms in order, with an optional `else` suite
    If {
        arms: Vec<(Expr, Vec<Stmt>)>,
        otherwise: Vec<Stmt>,
    },
    /// `while expr:` loop
    While { condition: Expr, body: Vec<Stmt> },
    /// `pass`
    Pass,
    /// Bare expression statement
    Expr(Expr),
}

/// Expressions of the mini-language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,

    /// Variable reference
    Identifier(String),

    /// Call of a registered function by name
    Call { name: String, args: Vec<Expr> },

    /// Binary operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Logical negation: `not expr`
    Not(Box<Expr>),

    /// Arithmetic negation: `-expr`
    Neg(Box<Expr>),
}

/// Binary operators, in source notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    /// Source-level spelling, used in error messages
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}
