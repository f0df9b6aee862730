//! Single-pass Pratt parser. Consumes tokens from a [`Scanner`] and emits
//! bytecode straight into a [`Chunk`]. There is no intermediate AST node
//! anywhere in this file.
//!
//! Dispatch uses a `match` on token kind inside `parse_precedence` rather
//! than a table of boxed closures indexed by token kind. The rule set is
//! fixed and known at compile time, so a `match` is both simpler and lets
//! the borrow checker see straight through it.

use slorp_core::{Chunk, OpCode, Table, Value};

use crate::scanner::{Scanner, Token, TokenKind};

/// One compiler-reported problem, with the source line it occurred on.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub line: u32,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[line {}] Error: {}", self.line, self.message)
    }
}

pub struct CompileOutcome {
    pub chunk: Chunk,
    pub errors: Vec<Diagnostic>,
}

impl CompileOutcome {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    Assignment,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

impl Precedence {
    fn next(self) -> Precedence {
        use Precedence::*;
        match self {
            None => Assignment,
            Assignment => Or,
            Or => And,
            And => Equality,
            Equality => Comparison,
            Comparison => Term,
            Term => Factor,
            Factor => Unary,
            Unary => Call,
            Call => Primary,
            Primary => Primary,
        }
    }
}

fn infix_precedence(kind: TokenKind) -> Precedence {
    use TokenKind::*;
    match kind {
        Minus | Plus => Precedence::Term,
        Slash | Star => Precedence::Factor,
        BangEqual | EqualEqual => Precedence::Equality,
        Greater | GreaterEqual | Less | LessEqual => Precedence::Comparison,
        _ => Precedence::None,
    }
}

struct Local<'src> {
    name: &'src str,
    /// -1 marks "declared but its initializer hasn't compiled yet".
    depth: i32,
}

const MAX_LOCALS: usize = 256;
const MAX_CONSTANTS: usize = 256;

struct Parser<'src, 'tab> {
    scanner: Scanner<'src>,
    previous: Token<'src>,
    current: Token<'src>,
    had_error: bool,
    panic_mode: bool,
    errors: Vec<Diagnostic>,
    chunk: Chunk,
    interner: &'tab mut Table,
    locals: Vec<Local<'src>>,
    scope_depth: i32,
}

impl<'src, 'tab> Parser<'src, 'tab> {
    fn new(source: &'src str, interner: &'tab mut Table) -> Self {
        let mut scanner = Scanner::new(source);
        let first = scanner.scan_token();
        Parser {
            scanner,
            previous: first,
            current: first,
            had_error: false,
            panic_mode: false,
            errors: Vec::new(),
            chunk: Chunk::new(),
            interner,
            locals: Vec::new(),
            scope_depth: 0,
        }
    }

    // ---- token plumbing ----------------------------------------------

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.scanner.scan_token();
            if self.current.kind != TokenKind::Error {
                break;
            }
            let message = self.current.lexeme.to_string();
            self.error_at_current(&message);
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.current.kind == kind {
            self.advance();
            return;
        }
        self.error_at_current(message);
    }

    fn error_at_current(&mut self, message: &str) {
        self.error_at(self.current, message);
    }

    fn error(&mut self, message: &str) {
        self.error_at(self.previous, message);
    }

    fn error_at(&mut self, token: Token<'src>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;
        let prefix = match token.kind {
            TokenKind::Eof => " at end".to_string(),
            TokenKind::Error => String::new(),
            _ => format!(" at '{}'", token.lexeme),
        };
        let diagnostic = Diagnostic {
            message: format!("{message}{prefix}"),
            line: token.line,
        };
        tracing::debug!(line = diagnostic.line, message = %diagnostic.message, "compile error");
        self.errors.push(diagnostic);
    }

    // ---- emission ------------------------------------------------------

    fn emit_byte(&mut self, byte: u8) {
        let line = self.previous.line;
        self.chunk.write(byte, line);
    }

    fn emit_op(&mut self, op: OpCode) {
        self.emit_byte(op as u8);
    }

    fn emit_op_byte(&mut self, op: OpCode, operand: u8) {
        self.emit_op(op);
        self.emit_byte(operand);
    }

    fn make_constant(&mut self, value: Value) -> u8 {
        let index = self.chunk.add_constant(value);
        if index >= MAX_CONSTANTS {
            self.error("Too many constants in one chunk.");
            return 0;
        }
        index as u8
    }

    fn emit_constant(&mut self, value: Value) {
        let index = self.make_constant(value);
        self.emit_op_byte(OpCode::Constant, index);
    }

    fn identifier_constant(&mut self, name: &str) -> u8 {
        let interned = self.interner.intern(name);
        self.make_constant(Value::Object(interned))
    }

    // ---- Pratt core -----------------------------------------------------

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();
        let can_assign = precedence <= Precedence::Assignment;
        if !self.prefix(self.previous.kind, can_assign) {
            self.error("Expect expression.");
            return;
        }

        while infix_precedence(self.current.kind) >= precedence {
            self.advance();
            self.infix(self.previous.kind, can_assign);
        }

        if can_assign && self.matches(TokenKind::Equal) {
            self.error("Invalid assignment target.");
        }
    }

    fn prefix(&mut self, kind: TokenKind, can_assign: bool) -> bool {
        use TokenKind::*;
        match kind {
            LeftParen => self.grouping(),
            Minus | Bang => self.unary(),
            Number => self.number(),
            String => self.string(),
            Identifier => self.variable(can_assign),
            True | False | Nil => self.literal(),
            _ => return false,
        }
        true
    }

    fn infix(&mut self, kind: TokenKind, _can_assign: bool) {
        use TokenKind::*;
        match kind {
            Minus | Plus | Slash | Star | BangEqual | EqualEqual | Greater | GreaterEqual
            | Less | LessEqual => self.binary(kind),
            _ => {}
        }
    }

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn grouping(&mut self) {
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after expression.");
    }

    fn number(&mut self) {
        let value: f64 = self.previous.lexeme.parse().unwrap_or(f64::NAN);
        self.emit_constant(Value::Number(value));
    }

    fn string(&mut self) {
        let lexeme = self.previous.lexeme;
        let text = &lexeme[1..lexeme.len() - 1];
        let interned = self.interner.intern(text);
        self.emit_constant(Value::Object(interned));
    }

    fn literal(&mut self) {
        match self.previous.kind {
            TokenKind::True => self.emit_op(OpCode::True),
            TokenKind::False => self.emit_op(OpCode::False),
            TokenKind::Nil => self.emit_op(OpCode::Nil),
            _ => unreachable!(),
        }
    }

    fn unary(&mut self) {
        let operator = self.previous.kind;
        self.parse_precedence(Precedence::Unary);
        match operator {
            TokenKind::Minus => self.emit_op(OpCode::Negate),
            TokenKind::Bang => self.emit_op(OpCode::Not),
            _ => unreachable!(),
        }
    }

    fn binary(&mut self, operator: TokenKind) {
        let precedence = infix_precedence(operator);
        self.parse_precedence(precedence.next());
        use TokenKind::*;
        match operator {
            Plus => self.emit_op(OpCode::Add),
            Minus => self.emit_op(OpCode::Subtract),
            Star => self.emit_op(OpCode::Multiply),
            Slash => self.emit_op(OpCode::Divide),
            EqualEqual => self.emit_op(OpCode::Equal),
            BangEqual => {
                self.emit_op(OpCode::Equal);
                self.emit_op(OpCode::Not);
            }
            Greater => self.emit_op(OpCode::Greater),
            GreaterEqual => {
                self.emit_op(OpCode::Less);
                self.emit_op(OpCode::Not);
            }
            Less => self.emit_op(OpCode::Less),
            LessEqual => {
                self.emit_op(OpCode::Greater);
                self.emit_op(OpCode::Not);
            }
            _ => unreachable!(),
        }
    }

    fn variable(&mut self, can_assign: bool) {
        self.named_variable(self.previous, can_assign);
    }

    fn named_variable(&mut self, name: Token<'src>, can_assign: bool) {
        if let Some(slot) = self.resolve_local(name.lexeme) {
            if can_assign && self.matches(TokenKind::Equal) {
                self.expression();
                self.emit_op_byte(OpCode::SetLocal, slot);
            } else {
                self.emit_op_byte(OpCode::GetLocal, slot);
            }
            return;
        }

        let name_index = self.identifier_constant(name.lexeme);
        if can_assign && self.matches(TokenKind::Equal) {
            self.expression();
            self.emit_op_byte(OpCode::SetGlobal, name_index);
        } else {
            self.emit_op_byte(OpCode::GetGlobal, name_index);
        }
    }

    /// Walk the locals stack from the top down; the first name match is
    /// the innermost scope, which is the one that should win.
    fn resolve_local(&mut self, name: &str) -> Option<u8> {
        for (i, local) in self.locals.iter().enumerate().rev() {
            if local.name == name {
                if local.depth == -1 {
                    self.error("Can't read local variable in its own initializer.");
                }
                return Some(i as u8);
            }
        }
        None
    }

    // ---- scope -----------------------------------------------------------

    fn begin_scope(&mut self) {
        self.scope_depth += 1;
    }

    fn end_scope(&mut self) {
        self.scope_depth -= 1;
        while let Some(local) = self.locals.last() {
            if local.depth > self.scope_depth {
                self.emit_op(OpCode::Pop);
                self.locals.pop();
            } else {
                break;
            }
        }
    }

    fn declare_variable(&mut self, name: Token<'src>) {
        if self.scope_depth == 0 {
            return;
        }
        for local in self.locals.iter().rev() {
            if local.depth != -1 && local.depth < self.scope_depth {
                break;
            }
            if local.name == name.lexeme {
                self.error("Already a variable with this name in this scope.");
            }
        }
        self.add_local(name);
    }

    fn add_local(&mut self, name: Token<'src>) {
        if self.locals.len() >= MAX_LOCALS {
            self.error("Too many local variables in function.");
            return;
        }
        self.locals.push(Local {
            name: name.lexeme,
            depth: -1,
        });
    }

    fn mark_initialized(&mut self) {
        if let Some(local) = self.locals.last_mut() {
            local.depth = self.scope_depth;
        }
    }

    // ---- declarations & statements ----------------------------------------

    fn declaration(&mut self) {
        if self.matches(TokenKind::Dat) {
            self.var_declaration();
        } else {
            self.statement();
        }
        if self.panic_mode {
            self.synchronize();
        }
    }

    fn var_declaration(&mut self) {
        self.consume(TokenKind::Identifier, "Expect variable name.");
        let name = self.previous;
        self.declare_variable(name);

        let global_index = if self.scope_depth == 0 {
            self.identifier_constant(name.lexeme)
        } else {
            0
        };

        if self.matches(TokenKind::Equal) {
            self.expression();
        } else {
            self.emit_op(OpCode::Nil);
        }
        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.");

        if self.scope_depth > 0 {
            self.mark_initialized();
        } else {
            self.emit_op_byte(OpCode::DefineGlobal, global_index);
        }
    }

    fn statement(&mut self) {
        if self.matches(TokenKind::Print) {
            self.print_statement();
        } else if self.matches(TokenKind::LeftBrace) {
            self.begin_scope();
            self.block();
            self.end_scope();
        } else {
            self.expression_statement();
        }
    }

    fn print_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after value.");
        self.emit_op(OpCode::Print);
    }

    fn expression_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.");
        self.emit_op(OpCode::Pop);
    }

    fn block(&mut self) {
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            self.declaration();
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.");
    }

    fn synchronize(&mut self) {
        self.panic_mode = false;
        while self.current.kind != TokenKind::Eof {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            match self.current.kind {
                TokenKind::Class
                | TokenKind::Proc
                | TokenKind::Dat
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {}
            }
            self.advance();
        }
    }

    fn finish(mut self) -> CompileOutcome {
        self.emit_op(OpCode::Return);
        CompileOutcome {
            chunk: self.chunk,
            errors: self.errors,
        }
    }
}

/// Compile `source` into a [`Chunk`], interning every string literal and
/// identifier name through `interner` (the same table the VM uses for
/// its globals and its own runtime string interning).
pub fn compile(source: &str, interner: &mut Table) -> CompileOutcome {
    let mut parser = Parser::new(source, interner);
    while !parser.check(TokenKind::Eof) {
        parser.declaration();
    }
    parser.consume(TokenKind::Eof, "Expect end of expression.");
    parser.finish()
}
