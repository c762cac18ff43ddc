//! Abstract Syntax Tree types for the schema DSL.
//!
//! Declarations and expressions are closed enums so every consumer has to
//! handle every variant. Nodes carry no source positions: two sources that
//! differ only in layout produce `==` trees.

/// Complete AST of one parsed schema file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// Top-level declarations in source order
    pub declarations: Vec<Declaration>,
}

impl Program {
    /// Create a new empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// All component declarations, in order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Component(c) => Some(c),
            _ => None,
        })
    }

    /// All relationship declarations, in order.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Relationship(r) => Some(r),
            _ => None,
        })
    }

    /// All system declarations, in order.
    pub fn systems(&self) -> impl Iterator<Item = &System> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::System(s) => Some(s),
            _ => None,
        })
    }
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// `component Name { ... }`
    Component(Component),
    /// `@tag relationship Name { ... }`
    Relationship(Relationship),
    /// `system Name { ... }`
    System(System),
}

impl Declaration {
    /// The declared name.
    pub fn name(&self) -> &str {
        match self {
            Self::Component(c) => &c.name,
            Self::Relationship(r) => &r.name,
            Self::System(s) => &s.name,
        }
    }

    /// The keyword that introduces this declaration.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Component(_) => "component",
            Self::Relationship(_) => "relationship",
            Self::System(_) => "system",
        }
    }
}

/// A component schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<Field>,
    /// Tags written as `@tag` before the `component` keyword
    pub attributes: Vec<String>,
}

/// A field of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub field_type: TypeRef,
    /// Marked with a `?` after the type
    pub optional: bool,
    pub default: Option<Expression>,
}

impl Field {
    /// Base type name; `"table"` for table types.
    pub fn type_name(&self) -> &str {
        self.field_type.name()
    }

    /// Key type of a `table<K, V>` field.
    pub fn map_key_type(&self) -> Option<&str> {
        match &self.field_type {
            TypeRef::Table { key, .. } => Some(key),
            TypeRef::Named(_) => None,
        }
    }

    /// Value type of a `table<K, V>` field.
    pub fn map_value_type(&self) -> Option<&str> {
        match &self.field_type {
            TypeRef::Table { value, .. } => Some(value),
            TypeRef::Named(_) => None,
        }
    }
}

/// The type written for a field or parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Any identifier; type names are open-world and not checked here
    Named(String),
    /// `table<key, value>`
    Table { key: String, value: String },
}

impl TypeRef {
    /// Base type name; `"table"` for table types.
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Table { .. } => "table",
        }
    }
}

/// A relationship between two entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub name: String,
    /// The leading `@tag`, e.g. `parent`
    pub kind: Option<String>,
    pub child: String,
    pub parent: String,
}

/// A system with its query, scheduling expressions and code payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct System {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub query: Option<Query>,
    pub frequency: Option<Expression>,
    pub priority: Option<Expression>,
    /// Raw source text between the code block's braces, byte for byte
    pub code: String,
}

/// A system parameter from a `params { ... }` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub param_type: TypeRef,
    pub default: Option<Expression>,
}

/// The entities a system runs over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Plain component names in source order
    pub components: Vec<String>,
    /// Relation terms in source order
    pub relations: Vec<Relation>,
}

/// A relation term inside a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// `pair(Relationship, Target)`
    Pair {
        relationship: String,
        target: PairTarget,
    },
    /// `relationship(Component)`
    Call {
        relationship: String,
        component: String,
    },
}

/// Second argument of `pair(...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairTarget {
    /// `*`
    Wildcard,
    Named(String),
}

/// An expression used for defaults, frequency and priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Identifier(String),
    Number(NumberLiteral),
    /// Number with a unit suffix, e.g. `60hz`
    Quantity(QuantityLiteral),
    /// Unescaped string value
    String(String),
    Boolean(bool),
    Nil,
    Prefix(PrefixExpression),
    Infix(InfixExpression),
    Call(CallExpression),
    MemberAccess(MemberAccessExpression),
    Table(TableConstructor),
    /// Raw text of a default value the grammar did not recognise
    Unparsed(String),
}

impl Expression {
    /// Shorthand for an identifier expression.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// Shorthand for a numeric literal expression.
    pub fn number(text: impl Into<String>) -> Self {
        Self::Number(NumberLiteral::new(text))
    }
}

/// A numeric literal, kept as its exact source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLiteral {
    pub text: String,
}

impl NumberLiteral {
    /// Create a literal from its source text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Whether the literal has a fractional part.
    pub fn is_float(&self) -> bool {
        self.text.contains('.')
    }

    /// Numeric value of the literal.
    pub fn value(&self) -> Option<f64> {
        self.text.parse().ok()
    }
}

/// A number with a unit suffix, split at the first letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityLiteral {
    /// Numeric part, e.g. `60`
    pub value: String,
    /// Unit suffix, e.g. `hz`
    pub unit: String,
}

impl QuantityLiteral {
    /// Split quantity text like `60hz` into value and unit.
    pub fn from_text(text: &str) -> Self {
        let split = text
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(text.len());
        Self {
            value: text[..split].to_string(),
            unit: text[split..].to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixExpression {
    pub operator: PrefixOperator,
    pub operand: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    /// `-`
    Negate,
    /// `!`
    Not,
}

impl PrefixOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfixExpression {
    pub left: Box<Expression>,
    pub operator: InfixOperator,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl InfixOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// `callee(arg, ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
}

/// `object.member`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberAccessExpression {
    pub object: Box<Expression>,
    pub member: String,
}

/// `{ ... }` table/record literal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableConstructor {
    pub fields: Vec<TableField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableField {
    pub key: TableKey,
    pub value: Expression,
}

/// How a table constructor entry is keyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableKey {
    /// Array-style entry with no key
    Positional,
    /// `name = value`
    Named(String),
    /// `[expr] = value`
    Computed(Expression),
}
