#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
    Float,
    Double,
    Long,
    Bool,
    Char,
    String,
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Double => write!(f, "double"),
            Type::Long => write!(f, "long"),
            Type::Bool => write!(f, "bool"),
            Type::Char => write!(f, "char"),
            Type::String => write!(f, "string"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    // Literals
    IntLit(i64),
    FloatLit(f64),
    BoolLit(bool),
    CharLit(char),
    StringLit(String),

    // Variable and array access
    Var(String),
    ArrayRef(String, Vec<Expr>),

    // Binary operations
    BinOp(Box<Expr>, BinOp, Box<Expr>),

    // Unary operations; `postfix` is meaningful for Inc/Dec only
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
        postfix: bool,
    },

    // Function call
    Call(String, Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Inc,
    Dec,
    Neg,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    // Variable declaration with optional initializer
    VarDecl(Type, String, Option<Expr>),

    // Array declaration: type name[size]... with one size per dimension
    ArrayDecl(Type, String, Vec<usize>),

    // Assignment
    Assign(String, Expr),
    ArrayAssign(String, Vec<Expr>, Expr),

    // Control flow
    If(Expr, Block, Option<Block>),
    While(Expr, Block),
    For(Option<Box<Stmt>>, Option<Expr>, Option<Box<Stmt>>, Block),
    Break,
    Continue,
    Switch(Expr, Vec<Case>, Option<Block>),

    // Expression statement
    Expr(Expr),

    // Print (built-in)
    Print(Expr),

    // Return
    Return(Option<Expr>),
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct Case {
    pub value: Expr,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub params: Vec<(Type, String)>,
    pub return_type: Type,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct Program {
    pub functions: Vec<Function>,
}
