use crate::ast::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Variable '{0}' is not declared")]
    UndeclaredVariable(String),
    #[error("Variable '{0}' is already declared")]
    Redeclared(String),
    #[error("Function '{0}' is not defined")]
    UndefinedFunction(String),
    #[error("Function '{name}' expects {expected} arguments, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("Array index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds { index: i64, size: usize },
    #[error("'{0}' is not an array")]
    NotAnArray(String),
    #[error("Invalid operands for '{op}': {left} and {right}")]
    InvalidOperands {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("Invalid operand for '{op}': {operand}")]
    InvalidOperand {
        op: &'static str,
        operand: &'static str,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("'break' outside of a loop or switch")]
    BreakOutsideLoop,
    #[error("'continue' outside of a loop")]
    ContinueOutsideLoop,
    #[error("No main() function found")]
    MissingMain,
    #[error("{source} (in {context})")]
    InStatement {
        context: &'static str,
        #[source]
        source: Box<RuntimeError>,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    // Tag an error with the statement it surfaced in; the innermost
    // statement wins.
    fn in_stmt(self, stmt: &Stmt) -> RuntimeError {
        match self {
            RuntimeError::InStatement { .. } | RuntimeError::Io(_) => self,
            other => RuntimeError::InStatement {
                context: stmt_kind(stmt),
                source: Box::new(other),
            },
        }
    }
}

fn stmt_kind(stmt: &Stmt) -> &'static str {
    match stmt {
        Stmt::VarDecl(..) => "variable declaration",
        Stmt::ArrayDecl(..) => "array declaration",
        Stmt::Assign(..) => "assignment",
        Stmt::ArrayAssign(..) => "array assignment",
        Stmt::If(..) => "if statement",
        Stmt::While(..) => "while loop",
        Stmt::For(..) => "for loop",
        Stmt::Break => "break statement",
        Stmt::Continue => "continue statement",
        Stmt::Switch(..) => "switch statement",
        Stmt::Expr(_) => "expression statement",
        Stmt::Print(_) => "print statement",
        Stmt::Return(_) => "return statement",
    }
}

/// Runtime value; arrays nest one level per declared dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    String(String),
    Array(Vec<Value>),
    Void,
}

impl Value {
    pub fn truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Bool(b) => *b,
            Value::Char(c) => *c != '\0',
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Void => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Void => "void",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Void => write!(f, "void"),
        }
    }
}

/// One flat binding environment, created per function call and
/// discarded at return. Keys are unique; the declared type tag
/// survives reassignment.
#[derive(Debug, Default)]
pub struct Env {
    vars: HashMap<String, (Type, Value)>,
}

impl Env {
    pub fn new() -> Self {
        Env {
            vars: HashMap::new(),
        }
    }

    fn declare(&mut self, name: &str, var_type: Type, value: Value) -> Result<(), RuntimeError> {
        if self.vars.contains_key(name) {
            return Err(RuntimeError::Redeclared(name.to_string()));
        }
        self.vars.insert(name.to_string(), (var_type, value));
        Ok(())
    }

    fn get(&self, name: &str) -> Result<&Value, RuntimeError> {
        self.vars
            .get(name)
            .map(|(_, value)| value)
            .ok_or_else(|| RuntimeError::UndeclaredVariable(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Value, RuntimeError> {
        self.vars
            .get_mut(name)
            .map(|(_, value)| value)
            .ok_or_else(|| RuntimeError::UndeclaredVariable(name.to_string()))
    }

    fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        match self.vars.get_mut(name) {
            Some(slot) => {
                slot.1 = value;
                Ok(())
            }
            None => Err(RuntimeError::UndeclaredVariable(name.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &(Type, Value))> {
        self.vars.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// How a statement finished; threaded back up through enclosing
/// blocks instead of unwinding.
#[derive(Debug)]
pub enum ControlFlow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

/// Tree-walking evaluator. Print output goes to the injected writer,
/// one line per print statement, in program order.
pub struct Interpreter<'a> {
    pub functions: HashMap<String, Function>,
    out: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Interpreter {
            functions: HashMap::new(),
            out,
        }
    }

    /// Register every function of a parsed program.
    pub fn load(&mut self, program: &Program) {
        for func in &program.functions {
            self.functions.insert(func.name.clone(), func.clone());
        }
    }

    /// Run a program by invoking its `main` function.
    pub fn run(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        self.load(program);
        if !self.functions.contains_key("main") {
            return Err(RuntimeError::MissingMain);
        }
        self.call("main", Vec::new())
    }

    /// Call a function by name with already-evaluated arguments.
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let func = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedFunction(name.to_string()))?;
        if args.len() != func.params.len() {
            return Err(RuntimeError::ArityMismatch {
                name: name.to_string(),
                expected: func.params.len(),
                got: args.len(),
            });
        }

        // Fresh environment holding only the bound parameters; callees
        // never see caller locals.
        let mut env = Env::new();
        for ((param_type, param_name), value) in func.params.iter().zip(args) {
            env.declare(param_name, *param_type, value)?;
        }

        match self.exec_block(&func.body, &mut env)? {
            ControlFlow::Return(value) => Ok(value),
            ControlFlow::Break => Err(RuntimeError::BreakOutsideLoop),
            ControlFlow::Continue => Err(RuntimeError::ContinueOutsideLoop),
            ControlFlow::Normal => Ok(Value::Void),
        }
    }

    fn exec_block(&mut self, block: &Block, env: &mut Env) -> Result<ControlFlow, RuntimeError> {
        for stmt in &block.stmts {
            match self.exec_stmt(stmt, env)? {
                ControlFlow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(ControlFlow::Normal)
    }

    pub fn exec_stmt(&mut self, stmt: &Stmt, env: &mut Env) -> Result<ControlFlow, RuntimeError> {
        self.dispatch_stmt(stmt, env).map_err(|e| e.in_stmt(stmt))
    }

    fn dispatch_stmt(&mut self, stmt: &Stmt, env: &mut Env) -> Result<ControlFlow, RuntimeError> {
        match stmt {
            Stmt::VarDecl(var_type, name, init) => {
                let value = match init {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => default_value(*var_type),
                };
                env.declare(name, *var_type, value)?;
                Ok(ControlFlow::Normal)
            }

            Stmt::ArrayDecl(var_type, name, dims) => {
                env.declare(name, *var_type, zero_array(dims))?;
                Ok(ControlFlow::Normal)
            }

            Stmt::Assign(name, expr) => {
                let value = self.eval_expr(expr, env)?;
                env.assign(name, value)?;
                Ok(ControlFlow::Normal)
            }

            Stmt::ArrayAssign(name, indices, expr) => {
                let indices = self.eval_indices(indices, env)?;
                let value = self.eval_expr(expr, env)?;
                let slot = element_slot(env.get_mut(name)?, &indices, name)?;
                *slot = value;
                Ok(ControlFlow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.eval_expr(expr, env)?;
                writeln!(self.out, "{}", value)?;
                Ok(ControlFlow::Normal)
            }

            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Void,
                };
                Ok(ControlFlow::Return(value))
            }

            Stmt::Expr(expr) => {
                self.eval_expr(expr, env)?;
                Ok(ControlFlow::Normal)
            }

            Stmt::If(cond, then_block, else_block) => {
                if self.eval_expr(cond, env)?.truthy() {
                    self.exec_block(then_block, env)
                } else if let Some(else_block) = else_block {
                    self.exec_block(else_block, env)
                } else {
                    Ok(ControlFlow::Normal)
                }
            }

            Stmt::While(cond, body) => {
                while self.eval_expr(cond, env)?.truthy() {
                    match self.exec_block(body, env)? {
                        ControlFlow::Return(value) => return Ok(ControlFlow::Return(value)),
                        ControlFlow::Break => break,
                        ControlFlow::Normal | ControlFlow::Continue => {}
                    }
                }
                Ok(ControlFlow::Normal)
            }

            Stmt::For(init, cond, update, body) => {
                if let Some(init) = init {
                    self.exec_stmt(init, env)?;
                }
                loop {
                    if let Some(cond) = cond {
                        if !self.eval_expr(cond, env)?.truthy() {
                            break;
                        }
                    }
                    match self.exec_block(body, env)? {
                        ControlFlow::Return(value) => return Ok(ControlFlow::Return(value)),
                        ControlFlow::Break => break,
                        // continue still runs the update
                        ControlFlow::Normal | ControlFlow::Continue => {}
                    }
                    if let Some(update) = update {
                        self.exec_stmt(update, env)?;
                    }
                }
                Ok(ControlFlow::Normal)
            }

            Stmt::Break => Ok(ControlFlow::Break),
            Stmt::Continue => Ok(ControlFlow::Continue),

            Stmt::Switch(subject, cases, default) => {
                let subject = self.eval_expr(subject, env)?;
                let mut matched = false;
                for case in cases {
                    if !matched {
                        let value = self.eval_expr(&case.value, env)?;
                        matched = values_equal(&subject, &value);
                    }
                    if matched {
                        match self.exec_block(&case.body, env)? {
                            ControlFlow::Break => return Ok(ControlFlow::Normal),
                            ControlFlow::Normal => {} // fall through
                            other => return Ok(other),
                        }
                    }
                }
                // Reached with no match, or by falling through the last
                // matched case; the default runs in both situations.
                if let Some(default) = default {
                    match self.exec_block(default, env)? {
                        ControlFlow::Break => return Ok(ControlFlow::Normal),
                        ControlFlow::Normal => {}
                        other => return Ok(other),
                    }
                }
                Ok(ControlFlow::Normal)
            }
        }
    }

    pub fn eval_expr(&mut self, expr: &Expr, env: &mut Env) -> Result<Value, RuntimeError> {
        match expr {
            Expr::IntLit(n) => Ok(Value::Int(*n)),
            Expr::FloatLit(n) => Ok(Value::Float(*n)),
            Expr::BoolLit(b) => Ok(Value::Bool(*b)),
            Expr::CharLit(c) => Ok(Value::Char(*c)),
            Expr::StringLit(s) => Ok(Value::String(s.clone())),

            Expr::Var(name) => Ok(env.get(name)?.clone()),

            Expr::ArrayRef(name, indices) => {
                let indices = self.eval_indices(indices, env)?;
                let slot = element_slot(env.get_mut(name)?, &indices, name)?;
                Ok(slot.clone())
            }

            Expr::BinOp(left, op, right) => {
                let left = self.eval_expr(left, env)?;
                let right = self.eval_expr(right, env)?;
                binary_op(*op, left, right)
            }

            Expr::UnaryOp {
                op: UnaryOp::Neg,
                operand,
                ..
            } => match self.eval_expr(operand, env)? {
                Value::Int(n) => Ok(Value::Int(-n)),
                Value::Float(f) => Ok(Value::Float(-f)),
                value => Err(RuntimeError::InvalidOperand {
                    op: "-",
                    operand: value.type_name(),
                }),
            },

            Expr::UnaryOp {
                op,
                operand,
                postfix,
            } => {
                let delta = if *op == UnaryOp::Inc { 1 } else { -1 };
                self.eval_step(operand, delta, *postfix, env)
            }

            Expr::Call(name, args) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg, env)?);
                }
                self.call(name, values)
            }
        }
    }

    // ++/-- on a variable or array element; postfix yields the prior
    // value, prefix the updated one.
    fn eval_step(
        &mut self,
        operand: &Expr,
        delta: i64,
        postfix: bool,
        env: &mut Env,
    ) -> Result<Value, RuntimeError> {
        let op = if delta > 0 { "++" } else { "--" };
        match operand {
            Expr::Var(name) => {
                let old = env.get(name)?.clone();
                let new = stepped(&old, delta, op)?;
                env.assign(name, new.clone())?;
                Ok(if postfix { old } else { new })
            }
            Expr::ArrayRef(name, indices) => {
                let indices = self.eval_indices(indices, env)?;
                let slot = element_slot(env.get_mut(name)?, &indices, name)?;
                let old = slot.clone();
                let new = stepped(&old, delta, op)?;
                *slot = new.clone();
                Ok(if postfix { old } else { new })
            }
            _ => Err(RuntimeError::InvalidOperand {
                op,
                operand: "expression",
            }),
        }
    }

    fn eval_indices(&mut self, indices: &[Expr], env: &mut Env) -> Result<Vec<i64>, RuntimeError> {
        let mut out = Vec::with_capacity(indices.len());
        for index in indices {
            match self.eval_expr(index, env)? {
                Value::Int(n) => out.push(n),
                value => {
                    return Err(RuntimeError::InvalidOperand {
                        op: "[]",
                        operand: value.type_name(),
                    })
                }
            }
        }
        Ok(out)
    }
}

fn default_value(var_type: Type) -> Value {
    match var_type {
        Type::Int | Type::Long => Value::Int(0),
        Type::Float | Type::Double => Value::Float(0.0),
        Type::Bool => Value::Bool(false),
        Type::Char => Value::Char('\0'),
        Type::String => Value::String(String::new()),
    }
}

// Nested zero-filled array mirroring the dimension list.
fn zero_array(dims: &[usize]) -> Value {
    match dims.split_first() {
        None => Value::Int(0),
        Some((&len, rest)) => Value::Array((0..len).map(|_| zero_array(rest)).collect()),
    }
}

// Walk an index list down to one element, bounds-checking every
// dimension against its length.
fn element_slot<'v>(
    mut slot: &'v mut Value,
    indices: &[i64],
    name: &str,
) -> Result<&'v mut Value, RuntimeError> {
    for &index in indices {
        match slot {
            Value::Array(items) => {
                if index < 0 || index as usize >= items.len() {
                    return Err(RuntimeError::IndexOutOfBounds {
                        index,
                        size: items.len(),
                    });
                }
                slot = &mut items[index as usize];
            }
            _ => return Err(RuntimeError::NotAnArray(name.to_string())),
        }
    }
    Ok(slot)
}

fn stepped(value: &Value, delta: i64, op: &'static str) -> Result<Value, RuntimeError> {
    match value {
        Value::Int(n) => Ok(Value::Int(n + delta)),
        Value::Float(f) => Ok(Value::Float(f + delta as f64)),
        value => Err(RuntimeError::InvalidOperand {
            op,
            operand: value.type_name(),
        }),
    }
}

#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(f) => f,
        }
    }
}

// Bools count as 0/1 wherever a number is expected.
fn numeric(value: &Value) -> Option<Num> {
    match value {
        Value::Int(n) => Some(Num::Int(*n)),
        Value::Float(f) => Some(Num::Float(*f)),
        Value::Bool(b) => Some(Num::Int(*b as i64)),
        _ => None,
    }
}

fn binary_op(op: BinOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add => match (left, right) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            (left, right) => match (numeric(&left), numeric(&right)) {
                (Some(a), Some(b)) => Ok(arith(BinOp::Add, a, b)),
                _ => Err(invalid_operands("+", &left, &right)),
            },
        },
        BinOp::Sub | BinOp::Mul => match (numeric(&left), numeric(&right)) {
            (Some(a), Some(b)) => Ok(arith(op, a, b)),
            _ => Err(invalid_operands(
                if op == BinOp::Sub { "-" } else { "*" },
                &left,
                &right,
            )),
        },
        BinOp::Div => {
            let (a, b) = match (numeric(&left), numeric(&right)) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(invalid_operands("/", &left, &right)),
            };
            if b.as_f64() == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            // Two integer operands divide truncating toward zero; any
            // float operand makes the division exact.
            match (a, b) {
                (Num::Int(x), Num::Int(y)) => Ok(Value::Int(x / y)),
                _ => Ok(Value::Float(a.as_f64() / b.as_f64())),
            }
        }
        BinOp::Eq => Ok(Value::Int(values_equal(&left, &right) as i64)),
        BinOp::Ne => Ok(Value::Int(!values_equal(&left, &right) as i64)),
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => relational(op, &left, &right),
        BinOp::And => Ok(Value::Int((left.truthy() && right.truthy()) as i64)),
        BinOp::Or => Ok(Value::Int((left.truthy() || right.truthy()) as i64)),
    }
}

fn invalid_operands(op: &'static str, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::InvalidOperands {
        op,
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn arith(op: BinOp, a: Num, b: Num) -> Value {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => Value::Int(match op {
            BinOp::Add => x + y,
            BinOp::Sub => x - y,
            _ => x * y,
        }),
        _ => {
            let (x, y) = (a.as_f64(), b.as_f64());
            Value::Float(match op {
                BinOp::Add => x + y,
                BinOp::Sub => x - y,
                _ => x * y,
            })
        }
    }
}

// Equality across incomparable kinds is false rather than an error,
// which keeps switch matching total.
fn values_equal(left: &Value, right: &Value) -> bool {
    if let (Some(a), Some(b)) = (numeric(left), numeric(right)) {
        return match (a, b) {
            (Num::Int(x), Num::Int(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        };
    }
    match (left, right) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Char(a), Value::Char(b)) => a == b,
        _ => false,
    }
}

fn relational(op: BinOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    let ordering = if let (Some(a), Some(b)) = (numeric(left), numeric(right)) {
        match (a, b) {
            (Num::Int(x), Num::Int(y)) => x.cmp(&y),
            _ => a
                .as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(Ordering::Equal),
        }
    } else {
        match (left, right) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Char(a), Value::Char(b)) => a.cmp(b),
            _ => {
                let sym = match op {
                    BinOp::Lt => "<",
                    BinOp::Gt => ">",
                    BinOp::Le => "<=",
                    _ => ">=",
                };
                return Err(invalid_operands(sym, left, right));
            }
        }
    };
    let holds = match op {
        BinOp::Lt => ordering == Ordering::Less,
        BinOp::Gt => ordering == Ordering::Greater,
        BinOp::Le => ordering != Ordering::Greater,
        _ => ordering != Ordering::Less,
    };
    Ok(Value::Int(holds as i64))
}
