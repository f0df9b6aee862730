//! The stack-based interpreter.
//!
//! Owns the runtime value stack, the globals table, and the string intern
//! set. The intern set is the same `Table` the compiler fills in during
//! `interpret`, never a second table kept in sync by hand.

use std::io::{self, Write};

use slorp_core::{Chunk, OpCode, Table, Value};

use crate::config::VmConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretResult {
    Ok,
    CompileError,
    RuntimeError,
}

/// A stack-based bytecode interpreter. Generic over its output sink so
/// tests can capture `print` output into an in-memory buffer instead of
/// real stdout.
pub struct Vm<W: Write> {
    stack: Vec<Value>,
    stack_limit: usize,
    globals: Table,
    strings: Table,
    out: W,
    config: VmConfig,
}

impl Vm<io::Stdout> {
    pub fn new() -> Self {
        Self::with_writer(VmConfig::default(), io::stdout())
    }

    pub fn with_config(config: VmConfig) -> Self {
        Self::with_writer(config, io::stdout())
    }
}

impl Default for Vm<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Vm<W> {
    pub fn with_writer(config: VmConfig, out: W) -> Self {
        Vm {
            stack: Vec::with_capacity(config.stack_size),
            stack_limit: config.stack_size,
            globals: Table::new(),
            strings: Table::new(),
            out,
            config,
        }
    }

    /// Compile `source` and, on success, execute it. Mirrors the
    /// embedding API's `interpret`: a chunk is created, filled, run, and
    /// dropped within this one call regardless of outcome.
    pub fn interpret(&mut self, source: &str) -> InterpretResult {
        tracing::debug!(source_len = source.len(), "interpret: compiling");
        let outcome = slorp_compiler::compile(source, &mut self.strings);
        if !outcome.ok() {
            for diagnostic in &outcome.errors {
                eprintln!("{diagnostic}");
            }
            tracing::debug!(result = ?InterpretResult::CompileError, "interpret: done");
            return InterpretResult::CompileError;
        }
        let result = self.run(&outcome.chunk);
        tracing::debug!(?result, "interpret: done");
        result
    }

    fn push(&mut self, value: Value) -> Result<(), String> {
        if self.stack.len() >= self.stack_limit {
            return Err("Stack overflow.".to_string());
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Value {
        self.stack
            .pop()
            .expect("stack underflow: compiler stack-balance accounting is broken")
    }

    fn peek(&self, distance: usize) -> &Value {
        &self.stack[self.stack.len() - 1 - distance]
    }

    fn run(&mut self, chunk: &Chunk) -> InterpretResult {
        let mut ip = 0usize;
        loop {
            let instr_offset = ip;
            let byte = chunk.read(ip);
            ip += 1;

            let Some(op) = OpCode::from_u8(byte) else {
                self.runtime_error(chunk, instr_offset, "Corrupted bytecode.");
                return InterpretResult::RuntimeError;
            };

            if self.config.trace_execution {
                tracing::debug!(?op, offset = instr_offset, "dispatch");
            }

            let step = self.dispatch(op, chunk, &mut ip);
            match step {
                Ok(true) => return InterpretResult::Ok,
                Ok(false) => {}
                Err(message) => {
                    self.runtime_error(chunk, instr_offset, &message);
                    return InterpretResult::RuntimeError;
                }
            }
        }
    }

    /// Execute one instruction. Returns `Ok(true)` on `OP_RETURN` (halt),
    /// `Ok(false)` to keep looping, or `Err(message)` on a runtime error.
    fn dispatch(&mut self, op: OpCode, chunk: &Chunk, ip: &mut usize) -> Result<bool, String> {
        use OpCode::*;
        match op {
            Constant => {
                let idx = chunk.read(*ip) as usize;
                *ip += 1;
                self.push(chunk.constant(idx).clone())?;
            }
            Nil => self.push(Value::Nil)?,
            True => self.push(Value::Bool(true))?,
            False => self.push(Value::Bool(false))?,
            Pop => {
                self.pop();
            }
            GetLocal => {
                let slot = chunk.read(*ip) as usize;
                *ip += 1;
                let value = self.stack[slot].clone();
                self.push(value)?;
            }
            SetLocal => {
                let slot = chunk.read(*ip) as usize;
                *ip += 1;
                self.stack[slot] = self.peek(0).clone();
            }
            GetGlobal => {
                let idx = chunk.read(*ip) as usize;
                *ip += 1;
                let name = self.constant_name(chunk, idx);
                match self.globals.get(&name) {
                    Some(value) => self.push(value)?,
                    None => return Err(format!("Undefined variable '{}'.", name.as_str())),
                }
            }
            DefineGlobal => {
                let idx = chunk.read(*ip) as usize;
                *ip += 1;
                let name = self.constant_name(chunk, idx);
                let value = self.peek(0).clone();
                self.globals.set(name, value);
                self.pop();
            }
            SetGlobal => {
                let idx = chunk.read(*ip) as usize;
                *ip += 1;
                let name = self.constant_name(chunk, idx);
                if self.globals.get(&name).is_none() {
                    // Report before mutating anything. The source's
                    // variant deletes the key first, which is a latent
                    // bug with no observable effect; we simply don't
                    // reproduce it.
                    return Err(format!("Undefined variable '{}'.", name.as_str()));
                }
                let value = self.peek(0).clone();
                self.globals.set(name, value);
            }
            Equal => {
                let b = self.pop();
                let a = self.pop();
                self.push(Value::Bool(Value::values_equal(&a, &b)))?;
            }
            Greater => self.numeric_binary(|a, b| Value::Bool(a > b))?,
            Less => self.numeric_binary(|a, b| Value::Bool(a < b))?,
            Add => self.add()?,
            Subtract => self.numeric_binary(|a, b| Value::Number(a - b))?,
            Multiply => self.numeric_binary(|a, b| Value::Number(a * b))?,
            Divide => self.numeric_binary(|a, b| Value::Number(a / b))?,
            Not => {
                let value = self.pop();
                self.push(Value::Bool(value.is_falsey()))?;
            }
            Negate => {
                let value = self.peek(0).as_number();
                match value {
                    Some(n) => {
                        self.pop();
                        self.push(Value::Number(-n))?;
                    }
                    None => return Err("Operand must be a number.".to_string()),
                }
            }
            Print => {
                let value = self.pop();
                writeln!(self.out, "{value}").map_err(|e| e.to_string())?;
            }
            Return => return Ok(true),
        }
        Ok(false)
    }

    fn constant_name(&self, chunk: &Chunk, idx: usize) -> std::rc::Rc<slorp_core::ObjString> {
        chunk
            .constant(idx)
            .as_string()
            .expect("identifier constants are always interned strings")
            .clone()
    }

    fn numeric_binary(&mut self, op: impl Fn(f64, f64) -> Value) -> Result<(), String> {
        let b = self.peek(0).as_number();
        let a = self.peek(1).as_number();
        match (a, b) {
            (Some(a), Some(b)) => {
                self.pop();
                self.pop();
                self.push(op(a, b))
            }
            _ => Err("Operands must be numbers.".to_string()),
        }
    }

    fn add(&mut self) -> Result<(), String> {
        let both_numbers = self.peek(0).is_number() && self.peek(1).is_number();
        let both_strings = self.peek(0).is_string() && self.peek(1).is_string();
        if both_numbers {
            let b = self.pop().as_number().unwrap();
            let a = self.pop().as_number().unwrap();
            self.push(Value::Number(a + b))
        } else if both_strings {
            let b = self.pop();
            let a = self.pop();
            let concatenated = format!("{}{}", a.as_string().unwrap(), b.as_string().unwrap());
            let interned = self.strings.intern(&concatenated);
            self.push(Value::Object(interned))
        } else {
            Err("Operands must be two numbers or two strings.".to_string())
        }
    }

    fn runtime_error(&mut self, chunk: &Chunk, offset: usize, message: &str) {
        eprintln!("{message}");
        let line = chunk.line_at(offset);
        eprintln!("[line {line}] in script");
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> (InterpretResult, String) {
        let mut buf = Vec::new();
        let mut vm = Vm::with_writer(VmConfig::default(), &mut buf);
        let result = vm.interpret(source);
        (result, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn arithmetic_precedence() {
        let (result, out) = run("print 1 + 2 * 3;");
        assert_eq!(result, InterpretResult::Ok);
        assert_eq!(out, "7\n");
    }

    #[test]
    fn string_concatenation() {
        let (result, out) = run("print \"foo\" + \"bar\";");
        assert_eq!(result, InterpretResult::Ok);
        assert_eq!(out, "foobar\n");
    }

    #[test]
    fn global_variables_add() {
        let (result, out) = run("dat a = 1; dat b = 2; print a + b;");
        assert_eq!(result, InterpretResult::Ok);
        assert_eq!(out, "3\n");
    }

    #[test]
    fn nested_scopes_shadow_correctly() {
        let (result, out) = run("{ dat x = 10; { dat x = 20; print x; } print x; }");
        assert_eq!(result, InterpretResult::Ok);
        assert_eq!(out, "20\n10\n");
    }

    #[test]
    fn global_reassignment() {
        let (result, out) = run("dat a = 1; a = a + 41; print a;");
        assert_eq!(result, InterpretResult::Ok);
        assert_eq!(out, "42\n");
    }

    #[test]
    fn self_referential_local_initializer_is_a_compile_error() {
        let (result, _) = run("dat a = 1; { dat a = a; }");
        assert_eq!(result, InterpretResult::CompileError);
    }

    #[test]
    fn comparison_and_equality_chain() {
        let (result, out) = run("print (1 < 2) == !nil;");
        assert_eq!(result, InterpretResult::Ok);
        assert_eq!(out, "true\n");
    }

    #[test]
    fn undefined_global_read_is_a_runtime_error() {
        let (result, out) = run("print undefined_name;");
        assert_eq!(result, InterpretResult::RuntimeError);
        assert_eq!(out, "");
    }

    #[test]
    fn mixed_type_addition_is_a_runtime_error() {
        let (result, _) = run("print \"a\" + 1;");
        assert_eq!(result, InterpretResult::RuntimeError);
    }

    #[test]
    fn nan_is_not_equal_to_itself() {
        let (result, out) = run("print (0/0) == (0/0);");
        assert_eq!(result, InterpretResult::Ok);
        assert_eq!(out, "false\n");
    }

    #[test]
    fn undefined_global_assignment_does_not_create_the_key() {
        // Reported-before-delete: an assignment to a name that was never
        // declared is a runtime error and leaves no trace in globals.
        let (result, _) = run("x = 1;");
        assert_eq!(result, InterpretResult::RuntimeError);
    }
}
