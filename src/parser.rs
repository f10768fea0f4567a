use crate::ast::*;
use crate::lexer::{SpannedToken, Token};
use std::mem;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Expected {expected}, found {found} at line {line}")]
    Expected {
        expected: String,
        found: String,
        line: usize,
    },
    #[error("Unexpected token {found} at line {line}")]
    UnexpectedToken { found: String, line: usize },
    #[error("Unexpected end of input")]
    UnexpectedEof,
}

pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|t| t.token.clone());
        self.pos += 1;
        token
    }

    // Line of the current token, or of the last one once input runs out.
    fn current_line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn check(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(t) if mem::discriminant(t) == mem::discriminant(expected))
    }

    fn expect(&mut self, expected: Token) -> Result<Token, ParseError> {
        match self.peek() {
            Some(t) if mem::discriminant(t) == mem::discriminant(&expected) => {
                Ok(self.advance().unwrap())
            }
            Some(t) => Err(ParseError::Expected {
                expected: expected.to_string(),
                found: t.to_string(),
                line: self.current_line(),
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        let line = self.current_line();
        match self.advance() {
            Some(Token::Identifier(name)) => Ok(name),
            Some(t) => Err(ParseError::Expected {
                expected: "identifier".to_string(),
                found: t.to_string(),
                line,
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn is_type(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Int
                    | Token::Float
                    | Token::Double
                    | Token::Long
                    | Token::Bool
                    | Token::Char
                    | Token::StringType
            )
        )
    }

    fn parse_type(&mut self) -> Result<Type, ParseError> {
        let line = self.current_line();
        match self.advance() {
            Some(Token::Int) => Ok(Type::Int),
            Some(Token::Float) => Ok(Type::Float),
            Some(Token::Double) => Ok(Type::Double),
            Some(Token::Long) => Ok(Type::Long),
            Some(Token::Bool) => Ok(Type::Bool),
            Some(Token::Char) => Ok(Type::Char),
            Some(Token::StringType) => Ok(Type::String),
            Some(t) => Err(ParseError::Expected {
                expected: "type name".to_string(),
                found: t.to_string(),
                line,
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut functions = Vec::new();
        while self.peek().is_some() {
            functions.push(self.parse_function()?);
        }
        Ok(Program { functions })
    }

    fn parse_function(&mut self) -> Result<Function, ParseError> {
        let return_type = self.parse_type()?;
        let name = self.expect_identifier()?;

        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                let param_type = self.parse_type()?;
                let param_name = self.expect_identifier()?;
                params.push((param_type, param_name));
                if !self.check(&Token::Comma) {
                    break;
                }
                self.advance();
            }
        }
        self.expect(Token::RParen)?;

        let body = self.parse_block()?;
        Ok(Function {
            name,
            params,
            return_type,
            body,
        })
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect(Token::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.peek().is_none() {
                return Err(ParseError::UnexpectedEof);
            }
            stmts.push(self.parse_stmt()?);
        }
        self.expect(Token::RBrace)?;
        Ok(Block { stmts })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        if self.is_type() {
            return self.parse_declaration();
        }

        match self.peek() {
            Some(Token::If) => self.parse_if_stmt(),
            Some(Token::While) => self.parse_while_stmt(),
            Some(Token::For) => self.parse_for_stmt(),
            Some(Token::Switch) => self.parse_switch_stmt(),
            Some(Token::Print) => self.parse_print_stmt(),
            Some(Token::Return) => self.parse_return_stmt(),
            Some(Token::Break) => {
                self.advance();
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Break)
            }
            Some(Token::Continue) => {
                self.advance();
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Continue)
            }
            Some(Token::Identifier(_)) => self.parse_ident_stmt(),
            _ => {
                let expr = self.parse_expr()?;
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_declaration(&mut self) -> Result<Stmt, ParseError> {
        let var_type = self.parse_type()?;
        let name = self.expect_identifier()?;

        if self.check(&Token::LBracket) {
            let mut dims = Vec::new();
            while self.check(&Token::LBracket) {
                self.advance();
                let line = self.current_line();
                match self.advance() {
                    Some(Token::IntLiteral(n)) => dims.push(n as usize),
                    Some(t) => {
                        return Err(ParseError::Expected {
                            expected: "array size".to_string(),
                            found: t.to_string(),
                            line,
                        })
                    }
                    None => return Err(ParseError::UnexpectedEof),
                }
                self.expect(Token::RBracket)?;
            }
            self.expect(Token::Semicolon)?;
            return Ok(Stmt::ArrayDecl(var_type, name, dims));
        }

        let init = if self.check(&Token::Assign) {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(Token::Semicolon)?;
        Ok(Stmt::VarDecl(var_type, name, init))
    }

    // Statements led by an identifier: assignment, array-element
    // assignment, postfix step, or a plain expression statement.
    fn parse_ident_stmt(&mut self) -> Result<Stmt, ParseError> {
        let name = self.expect_identifier()?;

        if self.check(&Token::Assign) {
            self.advance();
            let value = self.parse_expr()?;
            self.expect(Token::Semicolon)?;
            return Ok(Stmt::Assign(name, value));
        }

        if self.check(&Token::LBracket) {
            let indices = self.parse_indices()?;

            if self.check(&Token::Assign) {
                self.advance();
                let value = self.parse_expr()?;
                self.expect(Token::Semicolon)?;
                return Ok(Stmt::ArrayAssign(name, indices, value));
            }
            if let Some(op) = self.try_parse_step_op() {
                self.expect(Token::Semicolon)?;
                return Ok(Stmt::Expr(Expr::UnaryOp {
                    op,
                    operand: Box::new(Expr::ArrayRef(name, indices)),
                    postfix: true,
                }));
            }
            return Err(ParseError::Expected {
                expected: "=".to_string(),
                found: self
                    .peek()
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "end of input".to_string()),
                line: self.current_line(),
            });
        }

        if let Some(op) = self.try_parse_step_op() {
            self.expect(Token::Semicolon)?;
            return Ok(Stmt::Expr(Expr::UnaryOp {
                op,
                operand: Box::new(Expr::Var(name)),
                postfix: true,
            }));
        }

        if self.check(&Token::LParen) {
            self.advance();
            let args = self.parse_args()?;
            self.expect(Token::Semicolon)?;
            return Ok(Stmt::Expr(Expr::Call(name, args)));
        }

        self.expect(Token::Semicolon)?;
        Ok(Stmt::Expr(Expr::Var(name)))
    }

    fn try_parse_step_op(&mut self) -> Option<UnaryOp> {
        let op = match self.peek() {
            Some(Token::PlusPlus) => Some(UnaryOp::Inc),
            Some(Token::MinusMinus) => Some(UnaryOp::Dec),
            _ => None,
        };
        if op.is_some() {
            self.advance();
        }
        op
    }

    fn parse_print_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::Print)?;
        self.expect(Token::LParen)?;
        let expr = self.parse_expr()?;
        self.expect(Token::RParen)?;
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Print(expr))
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::Return)?;
        let value = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Return(value))
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(Token::RParen)?;
        let then_block = self.parse_block()?;

        let else_block = if self.check(&Token::Else) {
            self.advance();
            if self.check(&Token::If) {
                // else-if chain: the else branch is a block holding the
                // nested if
                let nested = self.parse_if_stmt()?;
                Some(Block {
                    stmts: vec![nested],
                })
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Stmt::If(cond, then_block, else_block))
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::While)?;
        self.expect(Token::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(Token::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::While(cond, body))
    }

    fn parse_for_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::For)?;
        self.expect(Token::LParen)?;

        // Init: typed declaration, bare assignment, or empty
        let init = if self.check(&Token::Semicolon) {
            self.advance();
            None
        } else if self.is_type() {
            let var_type = self.parse_type()?;
            let name = self.expect_identifier()?;
            let value = if self.check(&Token::Assign) {
                self.advance();
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.expect(Token::Semicolon)?;
            Some(Box::new(Stmt::VarDecl(var_type, name, value)))
        } else {
            let stmt = self.parse_assignment_no_semi()?;
            self.expect(Token::Semicolon)?;
            Some(Box::new(stmt))
        };

        // Condition: empty means always true
        let cond = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(Token::Semicolon)?;

        // Update: bare assignment or expression, or empty
        let update = if self.check(&Token::RParen) {
            None
        } else if matches!(self.peek(), Some(Token::Identifier(_)))
            && matches!(self.peek_at(1), Some(Token::Assign))
        {
            Some(Box::new(self.parse_assignment_no_semi()?))
        } else {
            Some(Box::new(Stmt::Expr(self.parse_expr()?)))
        };
        self.expect(Token::RParen)?;

        let body = self.parse_block()?;
        Ok(Stmt::For(init, cond, update, body))
    }

    fn parse_assignment_no_semi(&mut self) -> Result<Stmt, ParseError> {
        let name = self.expect_identifier()?;
        self.expect(Token::Assign)?;
        let value = self.parse_expr()?;
        Ok(Stmt::Assign(name, value))
    }

    fn parse_switch_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::Switch)?;
        self.expect(Token::LParen)?;
        let subject = self.parse_expr()?;
        self.expect(Token::RParen)?;
        self.expect(Token::LBrace)?;

        let mut cases = Vec::new();
        let mut default = None;

        while !self.check(&Token::RBrace) {
            if self.check(&Token::Case) {
                self.advance();
                let value = self.parse_expr()?;
                self.expect(Token::Colon)?;
                let mut stmts = Vec::new();
                while !matches!(
                    self.peek(),
                    Some(Token::Case | Token::Default | Token::RBrace) | None
                ) {
                    stmts.push(self.parse_stmt()?);
                }
                cases.push(Case {
                    value,
                    body: Block { stmts },
                });
            } else if self.check(&Token::Default) {
                self.advance();
                self.expect(Token::Colon)?;
                let mut stmts = Vec::new();
                while !self.check(&Token::RBrace) {
                    if self.peek().is_none() {
                        return Err(ParseError::UnexpectedEof);
                    }
                    stmts.push(self.parse_stmt()?);
                }
                default = Some(Block { stmts });
            } else {
                return Err(match self.peek() {
                    Some(t) => ParseError::Expected {
                        expected: "case or default".to_string(),
                        found: t.to_string(),
                        line: self.current_line(),
                    },
                    None => ParseError::UnexpectedEof,
                });
            }
        }
        self.expect(Token::RBrace)?;

        Ok(Stmt::Switch(subject, cases, default))
    }

    fn parse_indices(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut indices = Vec::new();
        while self.check(&Token::LBracket) {
            self.advance();
            indices.push(self.parse_expr()?);
            self.expect(Token::RBracket)?;
        }
        Ok(indices)
    }

    // Arguments after the opening paren has been consumed.
    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.check(&Token::Comma) {
                    break;
                }
                self.advance();
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.check(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::BinOp(Box::new(left), BinOp::Or, Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.check(&Token::And) {
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::BinOp(Box::new(left), BinOp::And, Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::Equal) => BinOp::Eq,
                Some(Token::NotEqual) => BinOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = Expr::BinOp(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Less) => BinOp::Lt,
                Some(Token::Greater) => BinOp::Gt,
                Some(Token::LessEqual) => BinOp::Le,
                Some(Token::GreaterEqual) => BinOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::BinOp(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::BinOp(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::BinOp(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::Minus) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::UnaryOp {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
                postfix: false,
            });
        }
        if let Some(op) = self.try_parse_step_op() {
            return self.parse_prefix_step(op);
        }
        self.parse_primary()
    }

    // Prefix ++/-- binds to a variable or array element.
    fn parse_prefix_step(&mut self, op: UnaryOp) -> Result<Expr, ParseError> {
        let name = self.expect_identifier()?;
        let operand = if self.check(&Token::LBracket) {
            let indices = self.parse_indices()?;
            Expr::ArrayRef(name, indices)
        } else {
            Expr::Var(name)
        };
        Ok(Expr::UnaryOp {
            op,
            operand: Box::new(operand),
            postfix: false,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().cloned() {
            Some(Token::IntLiteral(n)) => {
                self.advance();
                Ok(Expr::IntLit(n))
            }
            Some(Token::FloatLiteral(n)) => {
                self.advance();
                Ok(Expr::FloatLit(n))
            }
            Some(Token::True) => {
                self.advance();
                Ok(Expr::BoolLit(true))
            }
            Some(Token::False) => {
                self.advance();
                Ok(Expr::BoolLit(false))
            }
            Some(Token::CharLiteral(c)) => {
                self.advance();
                Ok(Expr::CharLit(c))
            }
            Some(Token::StringLiteral(s)) => {
                self.advance();
                Ok(Expr::StringLit(s))
            }
            Some(Token::Identifier(name)) => {
                self.advance();
                if self.check(&Token::LParen) {
                    self.advance();
                    let args = self.parse_args()?;
                    return Ok(Expr::Call(name, args));
                }
                if self.check(&Token::LBracket) {
                    let indices = self.parse_indices()?;
                    if let Some(op) = self.try_parse_step_op() {
                        return Ok(Expr::UnaryOp {
                            op,
                            operand: Box::new(Expr::ArrayRef(name, indices)),
                            postfix: true,
                        });
                    }
                    return Ok(Expr::ArrayRef(name, indices));
                }
                if let Some(op) = self.try_parse_step_op() {
                    return Ok(Expr::UnaryOp {
                        op,
                        operand: Box::new(Expr::Var(name)),
                        postfix: true,
                    });
                }
                Ok(Expr::Var(name))
            }
            Some(Token::LParen) => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Some(t) => Err(ParseError::UnexpectedToken {
                found: t.to_string(),
                line: self.current_line(),
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }
}
