use log::{debug, trace};

use crate::bytecode::{CodeBuffer, Op};
use crate::config::Config;
use crate::error::Error;
use crate::lang::value::Value;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::runtime::runtime_error::{
    RuntimeError, RuntimeErrorKind, identifier_expected, illegal_operands, scope_full,
    scope_overflow, stack_empty, stack_overflow, undefined_variable,
};
use crate::runtime::scope::{Scope, Variable};

/// Stack machine that runs Poly bytecode against a fixed set of scopes.
///
/// Scope `n` belongs to statements indented `n` levels deep. Variables stay in
/// their scopes across [`Vm::interpret`] calls; everything is released when the
/// VM is dropped.
pub struct Vm {
    config: Config,
    stack: Vec<Value>,
    scopes: Vec<Scope>,
    current: usize,
}

impl Vm {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let scopes = (0..config.max_scopes.max(1))
            .map(|_| Scope::new(config.locals_per_scope))
            .collect();

        Vm {
            stack: Vec::with_capacity(config.max_stack),
            scopes,
            current: 0,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Index of the scope the last run ended in.
    pub fn current_scope(&self) -> usize {
        self.current
    }

    /// Lexes and parses `source` into bytecode without running it.
    pub fn compile(&self, source: &str) -> Result<CodeBuffer, Error> {
        let tokens = Lexer::with_capacity(source, self.config.initial_capacity).tokenize()?;
        let code = Parser::with_config(&tokens, &self.config).parse()?;
        Ok(code)
    }

    /// Runs `source` to completion: lex, parse, then evaluate.
    pub fn interpret(&mut self, source: &str) -> Result<(), Error> {
        let code = self.compile(source)?;
        self.run(&code)?;
        Ok(())
    }

    /// Runs postcard-encoded bytecode produced by [`CodeBuffer::encode`].
    pub fn run_encoded(&mut self, bytes: &[u8]) -> Result<(), RuntimeError> {
        let code = CodeBuffer::decode(bytes)
            .map_err(|e| RuntimeError::new(RuntimeErrorKind::Decode, e.to_string()))?;
        self.run(&code)
    }

    pub fn run(&mut self, code: &CodeBuffer) -> Result<(), RuntimeError> {
        self.stack.clear();
        self.enter_scope(0)?;

        for (ip, op) in code.ops().iter().enumerate() {
            trace!("{:04} {:?} stack={:?}", ip, op, self.stack);

            if *op == Op::End {
                break;
            }
            self.exec(op).map_err(|e| e.with_line(code.line(ip)))?;
        }

        debug!(
            "run finished in scope {} with {} variable(s) visible",
            self.current,
            self.visible().count()
        );
        Ok(())
    }

    fn exec(&mut self, op: &Op) -> Result<(), RuntimeError> {
        match op {
            Op::Literal(v) => self.push(v.clone()),

            Op::Add
            | Op::Sub
            | Op::Mul
            | Op::Div
            | Op::Mod
            | Op::Pow
            | Op::Eq
            | Op::Neq
            | Op::Lt
            | Op::Gt
            | Op::LtEq
            | Op::GtEq
            | Op::And
            | Op::Or => self.binary(op),

            Op::Neg => {
                let a = self.pop_resolved()?;
                match a {
                    Value::Number(n) => self.push(Value::Number(-n)),
                    other => Err(illegal_operands(op, &[&other])),
                }
            }
            Op::Not => {
                let a = self.pop_resolved()?;
                match a {
                    Value::Boolean(b) => self.push(Value::Boolean(!b)),
                    other => Err(illegal_operands(op, &[&other])),
                }
            }

            Op::Assign(count) => self.assign(*count),
            Op::Scope(level) => self.enter_scope(*level),
            Op::End => Ok(()),
        }
    }

    fn binary(&mut self, op: &Op) -> Result<(), RuntimeError> {
        let right = self.pop_resolved()?;
        let left = self.pop_resolved()?;

        use Value::{Boolean as B, Number as N};
        let result = match (op, &left, &right) {
            (Op::Add, N(a), N(b)) => N(a + b),
            (Op::Sub, N(a), N(b)) => N(a - b),
            (Op::Mul, N(a), N(b)) => N(a * b),
            (Op::Div, N(a), N(b)) => N(a / b),
            (Op::Mod, N(a), N(b)) => N(a % b),
            (Op::Pow, N(a), N(b)) => N(a.powf(*b)),

            (Op::Lt, N(a), N(b)) => B(a < b),
            (Op::Gt, N(a), N(b)) => B(a > b),
            (Op::LtEq, N(a), N(b)) => B(a <= b),
            (Op::GtEq, N(a), N(b)) => B(a >= b),

            (Op::Eq, N(a), N(b)) => B(a == b),
            (Op::Eq, B(a), B(b)) => B(a == b),
            (Op::Neq, N(a), N(b)) => B(a != b),
            (Op::Neq, B(a), B(b)) => B(a != b),

            (Op::And, B(a), B(b)) => B(*a && *b),
            (Op::Or, B(a), B(b)) => B(*a || *b),

            _ => return Err(illegal_operands(op, &[&left, &right])),
        };

        self.push(result)
    }

    /// Binds `count` identifiers to `count` values.
    ///
    /// Every value is resolved before anything is stored, so `a, b = b, a`
    /// swaps. Nothing is stored unless every target fits in the scope.
    fn assign(&mut self, count: usize) -> Result<(), RuntimeError> {
        match count.checked_mul(2) {
            Some(needed) if needed <= self.stack.len() => {}
            _ => return Err(stack_empty()),
        }

        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.pop_resolved()?);
        }

        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            match self.pop()? {
                Value::Identifier(name) => names.push(name),
                other => return Err(identifier_expected(&other)),
            }
        }
        names.reverse();
        values.reverse();

        let slots = self.config.locals_per_scope;
        let scope = &mut self.scopes[self.current];

        let mut fresh: Vec<&str> = Vec::new();
        for name in &names {
            if !scope.contains(name) && !fresh.contains(&name.as_str()) {
                fresh.push(name);
            }
        }
        if let Some(name) = fresh.get(scope.free_slots()) {
            return Err(scope_full(name, slots));
        }

        for (name, value) in names.iter().zip(values) {
            trace!("{} = {}", name, value);
            scope
                .set(name, value)
                .map_err(|_| scope_full(name, slots))?;
        }

        Ok(())
    }

    fn enter_scope(&mut self, level: usize) -> Result<(), RuntimeError> {
        if level >= self.scopes.len() {
            return Err(scope_overflow(level, self.scopes.len()));
        }

        // Leaving a block forgets everything declared inside it.
        for scope in &mut self.scopes[level + 1..] {
            scope.clear();
        }

        self.current = level;
        Ok(())
    }

    fn push(&mut self, value: Value) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.config.max_stack {
            return Err(stack_overflow(self.config.max_stack));
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or_else(stack_empty)
    }

    fn pop_resolved(&mut self) -> Result<Value, RuntimeError> {
        let value = self.pop()?;
        match value {
            Value::Identifier(_) => self.get_value(&value),
            other => Ok(other),
        }
    }

    /// Looks up `name`, starting in the current scope and moving outwards.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes[..=self.current]
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }

    /// Resolves an identifier value to the value of its variable.
    pub fn get_value(&self, value: &Value) -> Result<Value, RuntimeError> {
        let name = value
            .as_identifier()
            .ok_or_else(|| identifier_expected(value))?;
        self.get(name)
            .cloned()
            .ok_or_else(|| undefined_variable(name))
    }

    /// Variables stored directly in scope `level`.
    pub fn variables(&self, level: usize) -> impl Iterator<Item = &Variable> {
        self.scopes.get(level).into_iter().flat_map(|s| s.variables())
    }

    /// Every variable visible from the current scope, innermost first.
    fn visible(&self) -> impl Iterator<Item = &Variable> {
        self.scopes[..=self.current]
            .iter()
            .rev()
            .flat_map(|s| s.variables())
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}
