//! Operator definitions and operator-token records.
//!
//! The front end hands the runtime a tree of [`OpToken`]s; each token names
//! its [`OpDef`] from [`OPERATORS`]. The flags on a definition are the
//! contract the wiring layer validates its builders against.

use std::fmt;

use crate::SourceSegment;

/// Syntactic position of an operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    Prefix,
    Postfix,
    Binary,
    Assignment,
}

impl OpKind {
    /// Number of operands an operator of this kind takes.
    pub const fn arity(self) -> usize {
        match self {
            OpKind::Prefix | OpKind::Postfix => 1,
            OpKind::Binary | OpKind::Assignment => 2,
        }
    }
}

/// Static description of one operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OpDef {
    /// Stable name, used as the node operation name and in type prediction.
    pub name: &'static str,
    pub symbol: &'static str,
    pub kind: OpKind,
    /// Builds a lazy node when true, an eagerly evaluated one when false.
    pub reactive: bool,
    /// Whether evaluation is confined to the operator's inputs.
    pub pure: bool,
    pub priority: u16,
}

macro_rules! op_defs {
    ($($id:ident = $name:literal, $sym:literal, $kind:ident, reactive: $r:literal, pure: $p:literal, $prio:literal;)*) => {
        impl OpDef {
            $(
                pub const $id: OpDef = OpDef {
                    name: $name,
                    symbol: $sym,
                    kind: OpKind::$kind,
                    reactive: $r,
                    pure: $p,
                    priority: $prio,
                };
            )*
        }

        /// Every operator the runtime knows about.
        pub static OPERATORS: &[OpDef] = &[$(OpDef::$id),*];
    };
}

op_defs! {
    NEGATE = "negate", "-", Prefix, reactive: true, pure: true, 900;
    NOT = "not", "!", Prefix, reactive: true, pure: true, 900;
    FIX = "fix", "&", Prefix, reactive: false, pure: true, 900;
    SIZE = "size", "#", Prefix, reactive: true, pure: true, 900;
    READ = "read", "<-", Prefix, reactive: true, pure: false, 900;
    INC = "inc", "++", Postfix, reactive: true, pure: true, 950;
    DEC = "dec", "--", Postfix, reactive: true, pure: true, 950;
    MULTIPLY = "multiply", "*", Binary, reactive: true, pure: true, 700;
    DIVIDE = "divide", "/", Binary, reactive: true, pure: true, 700;
    MODULUS = "modulus", "%", Binary, reactive: true, pure: true, 700;
    PLUS = "plus", "+", Binary, reactive: true, pure: true, 600;
    MINUS = "minus", "-", Binary, reactive: true, pure: true, 600;
    LESS_THAN = "less-than", "<", Binary, reactive: true, pure: true, 500;
    GREATER_THAN = "greater-than", ">", Binary, reactive: true, pure: true, 500;
    LESS_EQUAL = "less-than-equal", "<=", Binary, reactive: true, pure: true, 500;
    GREATER_EQUAL = "greater-than-equal", ">=", Binary, reactive: true, pure: true, 500;
    EQUALITY = "equal", "==", Binary, reactive: true, pure: true, 450;
    INEQUALITY = "not-equal", "!=", Binary, reactive: true, pure: true, 450;
    AND = "and", "&&", Binary, reactive: true, pure: true, 400;
    OR = "or", "||", Binary, reactive: true, pure: true, 350;
    PIPE = "pipe", "|", Binary, reactive: true, pure: true, 300;
    SUBSCRIBE = "subscribe", "<*", Binary, reactive: true, pure: false, 250;
    LISTEN = "listen", "=>", Binary, reactive: true, pure: false, 250;
    PUBLISH = "publish", ">>", Binary, reactive: true, pure: false, 250;
    WRITE = "write", "<<", Binary, reactive: true, pure: false, 250;
    DECLARATION = "declaration", ":=", Assignment, reactive: true, pure: false, 100;
    ASSIGNMENT = "assignment", "=", Assignment, reactive: true, pure: false, 100;
    WHEN_ASSIGN = "when-assign", "?=", Assignment, reactive: true, pure: false, 100;
    SUBSCRIBE_ASSIGN = "subscribe-assign", "*=", Assignment, reactive: true, pure: false, 100;
}

impl OpDef {
    /// Find an operator by its symbol and syntactic position.
    pub fn lookup(symbol: &str, kind: OpKind) -> Option<&'static OpDef> {
        OPERATORS
            .iter()
            .find(|op| op.symbol == symbol && op.kind == kind)
    }

    /// Find an operator by its stable name.
    pub fn by_name(name: &str) -> Option<&'static OpDef> {
        OPERATORS.iter().find(|op| op.name == name)
    }
}

impl fmt::Display for OpDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}

/// One parsed operator occurrence: the record the front end produces.
///
/// `reactive` and `pure` start from the operator's definition. The front
/// end may override them, but the wiring rejects a token whose request
/// disagrees with what the operator builds.
#[derive(Clone, Debug)]
pub struct OpToken<T> {
    pub op: &'static OpDef,
    pub operands: Vec<T>,
    pub source: SourceSegment,
    pub reactive: bool,
    pub pure: bool,
}

impl<T> OpToken<T> {
    pub fn new(op: &'static OpDef, operands: Vec<T>, source: SourceSegment) -> Self {
        OpToken {
            op,
            operands,
            source,
            reactive: op.reactive,
            pure: op.pure,
        }
    }

    #[must_use]
    pub fn with_reactive(mut self, reactive: bool) -> Self {
        self.reactive = reactive;
        self
    }

    #[must_use]
    pub fn with_pure(mut self, pure: bool) -> Self {
        self.pure = pure;
        self
    }

    pub fn operand(&self, index: usize) -> Option<&T> {
        self.operands.get(index)
    }

    pub fn lhs(&self) -> Option<&T> {
        self.operands.first()
    }

    pub fn rhs(&self) -> Option<&T> {
        self.operands.get(1)
    }

    /// Whether the operand count matches the operator's kind.
    pub fn has_expected_arity(&self) -> bool {
        self.operands.len() == self.op.kind.arity()
    }
}
