//! Integrand expressions: a tokenizer, a recursive-descent parser, a compiler
//! to stack bytecode and a small VM generic over [`Scalar`].
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := unary (('*' | '/') unary)*
//! unary      := ('+' | '-') unary | power
//! power      := primary (('^' | '**') unary)?
//! primary    := number | name | name '(' expression ')' | '(' expression ')'
//! ```
//!
//! Numeric literals are kept as text until compilation so that they are read
//! at the precision of the target arithmetic.

use crate::error::{DomainError, ExpressionError};
use crate::traits::{Integrand, Scalar};
use std::cell::RefCell;
use std::fmt;

/// Built-in functions of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    /// Natural logarithm; `log` is an alias.
    Ln,
    Sqrt,
    Abs,
    Floor,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            "exp" => Function::Exp,
            "ln" | "log" => Function::Ln,
            "sqrt" => Function::Sqrt,
            "abs" => Function::Abs,
            "floor" => Function::Floor,
            _ => return None,
        };
        Some(function)
    }

    fn apply<T: Scalar>(self, a: T) -> Result<T, DomainError> {
        let value = match self {
            Function::Sin => a.sin(),
            Function::Cos => a.cos(),
            Function::Tan => a.tan(),
            Function::Asin | Function::Acos if a.abs() > T::one() => {
                return Err(DomainError::InverseTrigRange)
            }
            Function::Asin => a.asin(),
            Function::Acos => a.acos(),
            Function::Atan => a.atan(),
            Function::Sinh => a.sinh(),
            Function::Cosh => a.cosh(),
            Function::Tanh => a.tanh(),
            Function::Exp => a.exp(),
            Function::Ln if a < T::zero() => return Err(DomainError::LogOfNegative),
            Function::Ln => a.ln(),
            Function::Sqrt if a < T::zero() => return Err(DomainError::SqrtOfNegative),
            Function::Sqrt => a.sqrt(),
            Function::Abs => a.abs(),
            Function::Floor => a.floor(),
        };
        Ok(value)
    }
}

/// Instructions of the stack VM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpCode<T> {
    /// Pushes a constant.
    LoadConst(T),
    /// Pushes the integration variable.
    LoadVar,
    /// Pops b, a; pushes a + b.
    Add,
    /// Pops b, a; pushes a - b.
    Sub,
    /// Pops b, a; pushes a * b.
    Mul,
    /// Pops b, a; pushes a / b.
    Div,
    /// Pops b, a; pushes a ^ b.
    Pow,
    /// Pops a; pushes a ^ n for a literal integer exponent.
    PowI(i32),
    /// Pops a; pushes -a.
    Neg,
    /// Pops a; pushes f(a).
    Call(Function),
}

/// A compiled sequence of operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Bytecode<T> {
    pub ops: Vec<OpCode<T>>,
}

/// Stack-based virtual machine.
///
/// Stateless; the caller lends the stack so repeated evaluations reuse one
/// allocation.
pub struct VM;

impl VM {
    pub fn execute<T: Scalar>(
        bytecode: &Bytecode<T>,
        x: T,
        stack: &mut Vec<T>,
    ) -> Result<T, DomainError> {
        stack.clear();

        for op in &bytecode.ops {
            match *op {
                OpCode::LoadConst(value) => stack.push(value),
                OpCode::LoadVar => stack.push(x),
                OpCode::Add => {
                    let (a, b) = pop_pair(stack)?;
                    stack.push(a + b);
                }
                OpCode::Sub => {
                    let (a, b) = pop_pair(stack)?;
                    stack.push(a - b);
                }
                OpCode::Mul => {
                    let (a, b) = pop_pair(stack)?;
                    stack.push(a * b);
                }
                OpCode::Div => {
                    let (a, b) = pop_pair(stack)?;
                    if b.is_zero() {
                        return Err(DomainError::DivisionByZero);
                    }
                    stack.push(a / b);
                }
                OpCode::Pow => {
                    let (a, b) = pop_pair(stack)?;
                    stack.push(power(a, b)?);
                }
                OpCode::PowI(n) => {
                    let a = pop(stack)?;
                    if n < 0 && a.is_zero() {
                        return Err(DomainError::DivisionByZero);
                    }
                    stack.push(a.powi(n));
                }
                OpCode::Neg => {
                    let a = pop(stack)?;
                    stack.push(-a);
                }
                OpCode::Call(function) => {
                    let a = pop(stack)?;
                    stack.push(function.apply(a)?);
                }
            }
        }

        pop(stack)
    }
}

fn pop<T>(stack: &mut Vec<T>) -> Result<T, DomainError> {
    stack.pop().ok_or(DomainError::StackUnderflow)
}

fn pop_pair<T>(stack: &mut Vec<T>) -> Result<(T, T), DomainError> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    Ok((a, b))
}

fn power<T: Scalar>(base: T, exponent: T) -> Result<T, DomainError> {
    if exponent.fract().is_zero() {
        if let Some(n) = exponent.to_i32() {
            if n < 0 && base.is_zero() {
                return Err(DomainError::DivisionByZero);
            }
            return Ok(base.powi(n));
        }
    }
    if base < T::zero() && exponent.is_finite() {
        return Err(DomainError::FractionalPowerOfNegative);
    }
    if base.is_zero() && exponent < T::zero() {
        return Err(DomainError::DivisionByZero);
    }
    Ok(base.powf(exponent))
}

// --- AST & Parser ---

/// Abstract syntax tree of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal text, converted at compile time.
    Number(String),
    Variable(String),
    Binary(Box<Expr>, char, Box<Expr>), // '+', '-', '*', '/', '^'
    Unary(char, Box<Expr>),             // '-'
    Call(String, Box<Expr>),
}

/// Resolves names and lowers an [`Expr`] into [`Bytecode`].
pub struct Compiler {
    variable: Option<String>,
}

impl Compiler {
    /// A compiler for functions of `variable`.
    pub fn new(variable: &str) -> Self {
        Self {
            variable: Some(variable.to_string()),
        }
    }

    /// A compiler for expressions without a free variable.
    pub fn constant() -> Self {
        Self { variable: None }
    }

    pub fn compile<T: Scalar>(&self, expr: &Expr) -> Result<Bytecode<T>, ExpressionError> {
        let mut ops = Vec::new();
        self.compile_recursive(expr, &mut ops)?;
        Ok(Bytecode { ops })
    }

    fn compile_recursive<T: Scalar>(
        &self,
        expr: &Expr,
        ops: &mut Vec<OpCode<T>>,
    ) -> Result<(), ExpressionError> {
        match expr {
            Expr::Number(text) => ops.push(OpCode::LoadConst(literal(text)?)),
            Expr::Variable(name) => {
                if self.variable.as_deref() == Some(name.as_str()) {
                    ops.push(OpCode::LoadVar);
                } else {
                    let value = match name.as_str() {
                        "pi" => T::PI(),
                        "e" => T::E(),
                        "inf" => T::infinity(),
                        "nan" => T::nan(),
                        _ => return Err(ExpressionError::UnknownVariable(name.clone())),
                    };
                    ops.push(OpCode::LoadConst(value));
                }
            }
            Expr::Binary(left, '^', right) => {
                self.compile_recursive(left, ops)?;
                match integer_literal(right) {
                    Some(n) => ops.push(OpCode::PowI(n)),
                    None => {
                        self.compile_recursive(right, ops)?;
                        ops.push(OpCode::Pow);
                    }
                }
            }
            Expr::Binary(left, op, right) => {
                self.compile_recursive(left, ops)?;
                self.compile_recursive(right, ops)?;
                let op = match op {
                    '+' => OpCode::Add,
                    '-' => OpCode::Sub,
                    '*' => OpCode::Mul,
                    '/' => OpCode::Div,
                    other => return Err(ExpressionError::UnexpectedToken(other.to_string())),
                };
                ops.push(op);
            }
            Expr::Unary(op, operand) => {
                self.compile_recursive(operand, ops)?;
                match op {
                    '-' => ops.push(OpCode::Neg),
                    other => return Err(ExpressionError::UnexpectedToken(other.to_string())),
                }
            }
            Expr::Call(name, arg) => {
                let function = Function::from_name(name)
                    .ok_or_else(|| ExpressionError::UnknownFunction(name.clone()))?;
                self.compile_recursive(arg, ops)?;
                ops.push(OpCode::Call(function));
            }
        }
        Ok(())
    }
}

fn literal<T: Scalar>(text: &str) -> Result<T, ExpressionError> {
    T::from_str_radix(text, 10).map_err(|_| ExpressionError::InvalidNumber(text.to_string()))
}

// Small non-negative or negated integer literals, e.g. `2` or `-1`.
fn integer_literal(expr: &Expr) -> Option<i32> {
    match expr {
        Expr::Number(text) if text.bytes().all(|b| b.is_ascii_digit()) => text.parse().ok(),
        Expr::Unary('-', inner) => integer_literal(inner).map(|n| -n),
        _ => None,
    }
}

/// Parses an expression into an AST.
pub fn parse(input: &str) -> Result<Expr, ExpressionError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expression()?;
    match parser.consume() {
        None => Ok(expr),
        Some(token) => Err(ExpressionError::UnexpectedToken(token.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(text) | Token::Identifier(text) => write!(f, "'{text}'"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::Caret => f.write_str("'^'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '.' {
            let mut text = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    text.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            // Exponent only when digits follow, so `2*e` style input still lexes.
            let rest = &input[offset + text.len()..];
            if let Some(len) = exponent_len(rest) {
                text.push_str(&rest[..len]);
                for _ in 0..len {
                    chars.next();
                }
            }
            tokens.push(Token::Number(text));
        } else if c.is_alphabetic() || c == '_' {
            let mut ident = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    ident.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Identifier(ident));
        } else {
            chars.next();
            let token = match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' if matches!(chars.peek(), Some(&(_, '*'))) => {
                    chars.next();
                    Token::Caret
                }
                '*' => Token::Star,
                '/' => Token::Slash,
                '^' => Token::Caret,
                '(' => Token::LParen,
                ')' => Token::RParen,
                character => {
                    return Err(ExpressionError::UnexpectedCharacter { character, offset })
                }
            };
            tokens.push(token);
        }
    }
    Ok(tokens)
}

// Length of an `e[+-]digits` suffix at the start of `rest`, if any.
fn exponent_len(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    if !matches!(bytes.first(), Some(b'e' | b'E')) {
        return None;
    }
    let mut len = 1;
    if matches!(bytes.get(1), Some(b'+' | b'-')) {
        len += 1;
    }
    let digits = bytes[len..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    Some(len + digits)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_expression(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_term()?;

        while let Some(token) = self.peek() {
            let op = match token {
                Token::Plus => '+',
                Token::Minus => '-',
                _ => break,
            };
            self.consume();
            let right = self.parse_term()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_unary()?;

        while let Some(token) = self.peek() {
            let op = match token {
                Token::Star => '*',
                Token::Slash => '/',
                _ => break,
            };
            self.consume();
            let right = self.parse_unary()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExpressionError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.consume();
                let expr = self.parse_unary()?;
                Ok(Expr::Unary('-', Box::new(expr)))
            }
            Some(Token::Plus) => {
                self.consume();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, ExpressionError> {
        let base = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.consume();
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary(Box::new(base), '^', Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExpressionError> {
        match self.consume() {
            Some(Token::Number(text)) => Ok(Expr::Number(text)),
            Some(Token::Identifier(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.consume();
                    let arg = self.parse_expression()?;
                    self.expect_closing()?;
                    Ok(Expr::Call(name, Box::new(arg)))
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Some(Token::LParen) => {
                let expr = self.parse_expression()?;
                self.expect_closing()?;
                Ok(expr)
            }
            Some(token) => Err(ExpressionError::UnexpectedToken(token.to_string())),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }

    fn expect_closing(&mut self) -> Result<(), ExpressionError> {
        match self.consume() {
            Some(Token::RParen) => Ok(()),
            Some(token) => Err(ExpressionError::UnclosedParenthesis(token.to_string())),
            None => Err(ExpressionError::UnclosedParenthesis("end of input".to_string())),
        }
    }
}

// --- Expression ---

/// A compiled function of `x`, usable as an integrand.
pub struct Expression<T: Scalar> {
    source: String,
    bytecode: Bytecode<T>,
    // Reused VM stack; makes the expression !Sync.
    stack: RefCell<Vec<T>>,
}

impl<T: Scalar> Expression<T> {
    /// Parses and compiles `source` as a function of `x`.
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        Self::with_variable(source, "x")
    }

    pub fn with_variable(source: &str, variable: &str) -> Result<Self, ExpressionError> {
        let expr = parse(source)?;
        let bytecode = Compiler::new(variable).compile(&expr)?;
        Ok(Self {
            source: source.to_string(),
            bytecode,
            stack: RefCell::new(Vec::with_capacity(32)),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bytecode(&self) -> &Bytecode<T> {
        &self.bytecode
    }

    pub fn eval(&self, x: T) -> Result<T, DomainError> {
        let mut stack = self.stack.borrow_mut();
        VM::execute(&self.bytecode, x, &mut stack)
    }
}

impl<T: Scalar> Integrand<T> for Expression<T> {
    type Error = DomainError;

    fn evaluate(&self, x: T) -> Result<T, DomainError> {
        self.eval(x)
    }
}

impl<T: Scalar> fmt::Debug for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("source", &self.source)
            .field("ops", &self.bytecode.ops.len())
            .finish()
    }
}

/// Evaluates a closed expression such as `-inf`, `pi/2` or `1e-3`, e.g. an
/// interval endpoint.
pub fn parse_constant<T: Scalar>(source: &str) -> Result<T, ExpressionError> {
    let expr = parse(source)?;
    let bytecode = Compiler::constant().compile(&expr)?;
    let mut stack = Vec::new();
    Ok(VM::execute(&bytecode, T::nan(), &mut stack)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::double_double::DoubleDouble;
    use approx::assert_relative_eq;
    use num_traits::Float;
    use std::f64::consts::PI;

    fn eval(source: &str, x: f64) -> f64 {
        Expression::<f64>::parse(source)
            .expect("valid expression")
            .eval(x)
            .expect("defined at x")
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(eval("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval("(1 + 2) * 3", 0.0), 9.0);
        assert_eq!(eval("8 / 4 / 2", 0.0), 1.0);
        assert_eq!(eval("10 - 4 - 3", 0.0), 3.0);
        assert_eq!(eval("2 * x + 1", 3.0), 7.0);
    }

    #[test]
    fn power_is_right_associative_and_binds_tighter_than_sign() {
        assert_eq!(eval("2 ^ 3 ^ 2", 0.0), 512.0);
        assert_eq!(eval("2 ** 3", 0.0), 8.0);
        assert_eq!(eval("-x^2", 3.0), -9.0);
        assert_eq!(eval("(-x)^2", 3.0), 9.0);
        assert_eq!(eval("2^-1", 0.0), 0.5);
        assert_eq!(eval("+x", 4.0), 4.0);
    }

    #[test]
    fn integer_exponents_accept_negative_bases() {
        assert_eq!(eval("x^3", -2.0), -8.0);
        assert_eq!(eval("x^(1+1)", -3.0), 9.0);
        let expr = Expression::<f64>::parse("x^2").expect("valid expression");
        assert_eq!(expr.bytecode().ops, vec![OpCode::LoadVar, OpCode::PowI(2)]);
    }

    #[test]
    fn scientific_literals_and_named_constants() {
        assert_eq!(eval("1e3 + 2.5E-1", 0.0), 1000.25);
        assert_eq!(eval("2*e", 0.0), 2.0 * std::f64::consts::E);
        assert_relative_eq!(eval("sin(pi/6)", 0.0), 0.5, max_relative = 1e-15);
        assert!(eval("inf", 0.0).is_infinite());
        assert!(eval("nan", 0.0).is_nan());
    }

    #[test]
    fn functions_match_the_standard_library() {
        let x: f64 = 0.3;
        let cases: [(&str, f64); 14] = [
            ("sin(x)", x.sin()),
            ("cos(x)", x.cos()),
            ("tan(x)", x.tan()),
            ("asin(x)", x.asin()),
            ("acos(x)", x.acos()),
            ("atan(x)", x.atan()),
            ("sinh(x)", x.sinh()),
            ("cosh(x)", x.cosh()),
            ("tanh(x)", x.tanh()),
            ("exp(x)", x.exp()),
            ("ln(x)", x.ln()),
            ("log(x)", x.ln()),
            ("sqrt(x)", x.sqrt()),
            ("abs(-x) + floor(x)", x),
        ];
        for (source, expected) in cases {
            assert_relative_eq!(eval(source, x), expected, max_relative = 1e-15);
        }
    }

    #[test]
    fn domain_errors_are_reported() {
        let cases = [
            ("1/x", 0.0, DomainError::DivisionByZero),
            ("x^-1", 0.0, DomainError::DivisionByZero),
            ("ln(x)", -1.0, DomainError::LogOfNegative),
            ("sqrt(x)", -1.0, DomainError::SqrtOfNegative),
            ("x^0.5", -4.0, DomainError::FractionalPowerOfNegative),
            ("asin(x)", 1.5, DomainError::InverseTrigRange),
            ("acos(x)", -2.0, DomainError::InverseTrigRange),
        ];
        for (source, x, expected) in cases {
            let expr = Expression::<f64>::parse(source).expect("valid expression");
            assert_eq!(expr.eval(x), Err(expected), "{source} at {x}");
        }
        assert_eq!(eval("ln(x)", 0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn parse_errors_are_typed() {
        let err = |source: &str| Expression::<f64>::parse(source).expect_err("invalid");
        assert_eq!(
            err("x $ 2"),
            ExpressionError::UnexpectedCharacter {
                character: '$',
                offset: 2
            }
        );
        assert_eq!(err("1 +"), ExpressionError::UnexpectedEnd);
        assert_eq!(err("(x + 1"), ExpressionError::UnclosedParenthesis("end of input".into()));
        assert_eq!(err("y + 1"), ExpressionError::UnknownVariable("y".into()));
        assert_eq!(err("gamma(x)"), ExpressionError::UnknownFunction("gamma".into()));
        assert_eq!(err("1.2.3"), ExpressionError::InvalidNumber("1.2.3".into()));
        assert!(matches!(err("x x"), ExpressionError::UnexpectedToken(_)));
        assert!(matches!(err(")"), ExpressionError::UnexpectedToken(_)));
    }

    #[test]
    fn constants_parse_as_endpoints() {
        assert_eq!(parse_constant::<f64>("-inf"), Ok(f64::NEG_INFINITY));
        assert_eq!(parse_constant::<f64>("+inf"), Ok(f64::INFINITY));
        assert_eq!(parse_constant::<f64>("pi/2"), Ok(PI / 2.0));
        assert_eq!(parse_constant::<f64>("1e-3"), Ok(1e-3));
        assert_eq!(
            parse_constant::<f64>("x"),
            Err(ExpressionError::UnknownVariable("x".into()))
        );
        assert_eq!(
            parse_constant::<f64>("1/0"),
            Err(ExpressionError::Undefined(DomainError::DivisionByZero))
        );
    }

    #[test]
    fn literals_are_read_at_working_precision() {
        let tenth: DoubleDouble = parse_constant("0.1").expect("valid literal");
        let expected = DoubleDouble::from(1.0) / DoubleDouble::from(10.0);
        assert!(f64::from((tenth - expected).abs()) < 1e-31);
        assert!(tenth.lo() != 0.0);
    }

    #[test]
    fn expressions_are_integrands() {
        let expr = Expression::<f64>::parse("2/(1 + x^2)").expect("valid expression");
        let result = crate::quadrature::integrate(&expr, -f64::INFINITY, f64::INFINITY);
        assert_relative_eq!(result.value, 2.0 * PI, max_relative = 1e-10);
        assert_eq!(expr.source(), "2/(1 + x^2)");
    }
}
