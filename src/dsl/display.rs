//! Canonical text rendering of the AST.
//!
//! The output is deterministic and re-parses to an equal tree. Layout is
//! normalised, fields use the `name: type` form, and operator expressions are
//! fully parenthesised.

use std::fmt::{self, Display, Formatter, Write};

use super::ast::*;

const INDENT: &str = "    ";

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, declaration) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }
            writeln!(f, "{declaration}")?;
        }
        Ok(())
    }
}

impl Display for Declaration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(c) => Display::fmt(c, f),
            Self::Relationship(r) => Display::fmt(r, f),
            Self::System(s) => Display::fmt(s, f),
        }
    }
}

impl Display for Component {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.attributes.is_empty() {
            let tags: Vec<String> = self.attributes.iter().map(|a| format!("@{a}")).collect();
            writeln!(f, "{}", tags.join(" "))?;
        }
        writeln!(f, "component {} {{", self.name)?;
        for field in &self.fields {
            writeln!(f, "{INDENT}{field}")?;
        }
        f.write_char('}')
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.field_type)?;
        if self.optional {
            f.write_char('?')?;
        }
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        f.write_char(';')
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Table { key, value } => write!(f, "table<{key}, {value}>"),
        }
    }
}

impl Display for Relationship {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(kind) = &self.kind {
            writeln!(f, "@{kind}")?;
        }
        writeln!(f, "relationship {} {{", self.name)?;
        writeln!(f, "{INDENT}child: {}", self.child)?;
        writeln!(f, "{INDENT}parent: {}", self.parent)?;
        f.write_char('}')
    }
}

impl Display for System {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "system {} {{", self.name)?;
        if let Some(query) = &self.query {
            writeln!(f, "{INDENT}{query}")?;
        }
        if !self.parameters.is_empty() {
            writeln!(f, "{INDENT}params {{")?;
            for param in &self.parameters {
                writeln!(f, "{INDENT}{INDENT}{param}")?;
            }
            writeln!(f, "{INDENT}}}")?;
        }
        if let Some(frequency) = &self.frequency {
            writeln!(f, "{INDENT}frequency: {frequency}")?;
        }
        if let Some(priority) = &self.priority {
            writeln!(f, "{INDENT}priority: {priority}")?;
        }
        writeln!(f, "{INDENT}{{{}}}", self.code)?;
        f.write_char('}')
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.param_type)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        f.write_char(';')
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self
            .components
            .iter()
            .cloned()
            .chain(self.relations.iter().map(ToString::to_string))
            .collect();
        write!(f, "query({})", terms.join(", "))
    }
}

impl Display for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pair {
                relationship,
                target,
            } => write!(f, "pair({relationship}, {target})"),
            Self::Call {
                relationship,
                component,
            } => write!(f, "{relationship}({component})"),
        }
    }
}

impl Display for PairTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_char('*'),
            Self::Named(name) => f.write_str(name),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => f.write_str(name),
            Self::Number(n) => f.write_str(&n.text),
            Self::Quantity(q) => write!(f, "{}{}", q.value, q.unit),
            Self::String(s) => write_quoted(f, s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Nil => f.write_str("nil"),
            Self::Prefix(p) => write!(f, "({}{})", p.operator.as_str(), p.operand),
            Self::Infix(i) => write!(f, "({} {} {})", i.left, i.operator.as_str(), i.right),
            Self::Call(c) => {
                write!(f, "{}(", c.callee)?;
                write_comma_separated(f, &c.arguments)?;
                f.write_char(')')
            }
            Self::MemberAccess(m) => write!(f, "{}.{}", m.object, m.member),
            Self::Table(t) => Display::fmt(t, f),
            Self::Unparsed(raw) => f.write_str(raw),
        }
    }
}

impl Display for TableConstructor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_char('{')?;
        write_comma_separated(f, &self.fields)?;
        f.write_char('}')
    }
}

impl Display for TableField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.key {
            TableKey::Positional => write!(f, "{}", self.value),
            TableKey::Named(name) => write!(f, "{name} = {}", self.value),
            TableKey::Computed(key) => write!(f, "[{key}] = {}", self.value),
        }
    }
}

fn write_comma_separated<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_quoted(f: &mut Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('"')?;
    for ch in value.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}
