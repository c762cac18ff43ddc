//! Declaration parsing: components, relationships and systems.

use tracing::warn;

use super::{error_at, ParseResult, Parser, Precedence};
use crate::dsl::ast::{
    Component, Declaration, Expression, Field, PairTarget, Parameter, Query, Relation,
    Relationship, System, TypeRef,
};
use crate::dsl::token::TokenKind;
use crate::error::ParseErrorKind;

impl Parser<'_> {
    /// `@tag ... component` or `@tag relationship`.
    pub(super) fn parse_tagged_declaration(&mut self) -> ParseResult<Declaration> {
        let mut tags = Vec::new();
        while self.eat(TokenKind::At) {
            tags.push(self.expect_ident("tag name after '@'")?);
        }

        match self.current.kind {
            TokenKind::Component => self.parse_component(tags).map(Declaration::Component),
            TokenKind::Relationship => self
                .parse_relationship(tags)
                .map(Declaration::Relationship),
            _ => Err(self.unexpected("'component' or 'relationship' after tags")),
        }
    }

    pub(super) fn parse_component(&mut self, attributes: Vec<String>) -> ParseResult<Component> {
        self.expect(TokenKind::Component)?;
        let name = self.expect_ident("component name")?;
        let open = self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    return Err(error_at(
                        &open,
                        ParseErrorKind::Unterminated {
                            construct: "component",
                        },
                    ))
                }
                _ => match self.parse_field() {
                    Ok(field) => fields.push(field),
                    Err(err) => {
                        self.errors.push(err);
                        self.synchronize();
                    }
                },
            }
        }

        Ok(Component {
            name,
            fields,
            attributes,
        })
    }

    fn parse_field(&mut self) -> ParseResult<Field> {
        let (name, field_type, optional) = self.parse_binding_head("field")?;
        let default = self.parse_default(&name)?;
        Ok(Field {
            name,
            field_type,
            optional,
            default,
        })
    }

    /// Name, type and optional flag of a field or parameter.
    ///
    /// Accepts both `name: Type?` and `Type? name`.
    fn parse_binding_head(&mut self, role: &str) -> ParseResult<(String, TypeRef, bool)> {
        if self.current.is(TokenKind::Ident) && self.peek.is(TokenKind::Colon) {
            let name = self.advance().literal;
            self.advance();
            let ty = self.parse_type(role)?;
            let optional = self.eat(TokenKind::Question);
            Ok((name, ty, optional))
        } else {
            let ty = self.parse_type(role)?;
            let optional = self.eat(TokenKind::Question);
            let name = self.expect_ident(&format!("{role} name"))?;
            Ok((name, ty, optional))
        }
    }

    fn parse_type(&mut self, role: &str) -> ParseResult<TypeRef> {
        match self.current.kind {
            TokenKind::Table => {
                self.advance();
                self.expect(TokenKind::Lt)?;
                let key = self.expect_ident("table key type")?;
                self.expect(TokenKind::Comma)?;
                let value = self.expect_ident("table value type")?;
                self.expect(TokenKind::Gt)?;
                Ok(TypeRef::Table { key, value })
            }
            TokenKind::Ident => Ok(TypeRef::Named(self.advance().literal)),
            _ => Err(self.unexpected(format!("{role} type (identifier or 'table')"))),
        }
    }

    /// Optional `= expr` followed by the terminating `;`.
    ///
    /// A default the expression grammar rejects, or one not directly followed
    /// by `;`, is kept as raw text when a `;` closes it before the enclosing
    /// `}`. Reaching that `}` or end of input first is a missing `;`.
    fn parse_default(&mut self, field: &str) -> ParseResult<Option<Expression>> {
        if !self.eat(TokenKind::Assign) {
            self.expect(TokenKind::Semicolon)?;
            return Ok(None);
        }

        let start = self.current.clone();
        let outcome = self.parse_expression(Precedence::Lowest);
        if outcome.is_ok() && self.current.is(TokenKind::Semicolon) {
            self.advance();
            return outcome.map(Some);
        }

        // Brackets opened while skipping must close before `;` or `}` count.
        let mut depth = 0usize;
        loop {
            match self.current.kind {
                TokenKind::Semicolon | TokenKind::RBrace if depth == 0 => break,
                TokenKind::Eof => break,
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.advance();
        }

        let raw = self.lexer.source()[start.span.start..self.current.span.start].trim();
        if raw.is_empty() {
            return Err(outcome
                .err()
                .unwrap_or_else(|| self.unexpected("default value")));
        }
        if !self.current.is(TokenKind::Semicolon) {
            return Err(self.error_here(ParseErrorKind::MissingSemicolon {
                field: field.to_string(),
            }));
        }

        warn!(
            field,
            line = start.line,
            column = start.column,
            raw,
            "keeping unrecognised default value as raw text"
        );
        let raw = raw.to_string();
        self.advance();
        Ok(Some(Expression::Unparsed(raw)))
    }

    pub(super) fn parse_relationship(&mut self, tags: Vec<String>) -> ParseResult<Relationship> {
        let keyword = self.expect(TokenKind::Relationship)?;
        let name = self.expect_ident("relationship name")?;
        if tags.len() > 1 {
            return Err(error_at(
                &keyword,
                ParseErrorKind::TooManyRelationshipTags {
                    name,
                    count: tags.len(),
                },
            ));
        }

        let open = self.expect(TokenKind::LBrace)?;
        let child = self.parse_endpoint("child")?;
        let parent = self.parse_endpoint("parent")?;
        if self.current.is(TokenKind::Eof) {
            return Err(error_at(
                &open,
                ParseErrorKind::Unterminated {
                    construct: "relationship",
                },
            ));
        }
        self.expect(TokenKind::RBrace)?;

        Ok(Relationship {
            name,
            kind: tags.into_iter().next(),
            child,
            parent,
        })
    }

    /// `label: Entity`
    fn parse_endpoint(&mut self, label: &str) -> ParseResult<String> {
        if !(self.current.is(TokenKind::Ident) && self.current.literal == label) {
            return Err(self.unexpected(format!("'{label}'")));
        }
        self.advance();
        self.expect(TokenKind::Colon)?;
        self.expect_ident(&format!("{label} entity name"))
    }

    pub(super) fn parse_system(&mut self) -> ParseResult<System> {
        self.expect(TokenKind::System)?;
        let name = self.expect_ident("system name")?;
        let open = self.expect(TokenKind::LBrace)?;

        let mut system = System {
            name,
            ..System::default()
        };
        let mut has_params = false;
        let mut has_code = false;

        loop {
            match self.current.kind {
                TokenKind::RBrace => {
                    if !has_code {
                        return Err(self.error_here(ParseErrorKind::MissingCodeBlock {
                            system: system.name,
                        }));
                    }
                    self.advance();
                    return Ok(system);
                }
                TokenKind::Eof => {
                    return Err(error_at(
                        &open,
                        ParseErrorKind::Unterminated {
                            construct: "system",
                        },
                    ))
                }
                TokenKind::Query => {
                    self.check_duplicate(system.query.is_some(), "query", &system.name)?;
                    system.query = Some(self.parse_query()?);
                    self.eat(TokenKind::Semicolon);
                }
                TokenKind::Ident if self.current.literal == "params" => {
                    self.check_duplicate(has_params, "params", &system.name)?;
                    system.parameters = self.parse_params()?;
                    has_params = true;
                }
                TokenKind::Frequency => {
                    self.check_duplicate(system.frequency.is_some(), "frequency", &system.name)?;
                    system.frequency = Some(self.parse_schedule_value()?);
                }
                TokenKind::Priority => {
                    self.check_duplicate(system.priority.is_some(), "priority", &system.name)?;
                    system.priority = Some(self.parse_schedule_value()?);
                }
                TokenKind::LBrace => {
                    self.check_duplicate(has_code, "code", &system.name)?;
                    system.code = self.parse_code_block()?;
                    has_code = true;
                }
                _ => {
                    return Err(self.unexpected(
                        "'query', 'params', 'frequency', 'priority', a code block or '}'",
                    ))
                }
            }
        }
    }

    fn check_duplicate(&self, seen: bool, block: &'static str, system: &str) -> ParseResult<()> {
        if seen {
            return Err(self.error_here(ParseErrorKind::DuplicateBlock {
                block,
                system: system.to_string(),
            }));
        }
        Ok(())
    }

    /// `frequency: expr` or `priority: expr`, with an optional trailing `;`.
    fn parse_schedule_value(&mut self) -> ParseResult<Expression> {
        self.advance();
        self.expect(TokenKind::Colon)?;
        let value = self.parse_expression(Precedence::Lowest)?;
        self.eat(TokenKind::Semicolon);
        Ok(value)
    }

    fn parse_query(&mut self) -> ParseResult<Query> {
        self.expect(TokenKind::Query)?;
        self.expect(TokenKind::LParen)?;

        let mut query = Query::default();
        if !self.current.is(TokenKind::RParen) {
            loop {
                self.parse_query_term(&mut query)?;
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        if !self.current.is(TokenKind::RParen) {
            return Err(self.unexpected("',' or ')' in query"));
        }
        self.advance();
        Ok(query)
    }

    fn parse_query_term(&mut self, query: &mut Query) -> ParseResult<()> {
        match self.current.kind {
            TokenKind::Pair => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let relationship = self.expect_ident("relationship name in pair")?;
                self.expect(TokenKind::Comma)?;
                let target = if self.eat(TokenKind::Asterisk) {
                    PairTarget::Wildcard
                } else {
                    PairTarget::Named(self.expect_ident("pair target or '*'")?)
                };
                self.expect(TokenKind::RParen)?;
                query.relations.push(Relation::Pair {
                    relationship,
                    target,
                });
            }
            TokenKind::Ident if self.peek.is(TokenKind::LParen) => {
                let relationship = self.advance().literal;
                self.advance();
                let component = self.expect_ident("component name in relation")?;
                self.expect(TokenKind::RParen)?;
                query.relations.push(Relation::Call {
                    relationship,
                    component,
                });
            }
            TokenKind::Ident => {
                query.components.push(self.advance().literal);
            }
            _ => return Err(self.unexpected("component name or relation in query")),
        }
        Ok(())
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Parameter>> {
        self.advance();
        let open = self.expect(TokenKind::LBrace)?;

        let mut params = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::RBrace => {
                    self.advance();
                    return Ok(params);
                }
                TokenKind::Eof => {
                    return Err(error_at(
                        &open,
                        ParseErrorKind::Unterminated {
                            construct: "params block",
                        },
                    ))
                }
                _ => match self.parse_parameter() {
                    Ok(param) => params.push(param),
                    Err(err) => {
                        self.errors.push(err);
                        self.synchronize();
                    }
                },
            }
        }
    }

    fn parse_parameter(&mut self) -> ParseResult<Parameter> {
        let start = self.current.clone();
        let (name, param_type, optional) = self.parse_binding_head("parameter")?;
        if optional {
            return Err(error_at(&start, ParseErrorKind::OptionalParameter { name }));
        }
        let default = self.parse_default(&name)?;
        Ok(Parameter {
            name,
            param_type,
            default,
        })
    }

    /// The raw source between a code block's braces.
    ///
    /// The body is scanned as raw text rather than tokens, so it may hold
    /// anything the target language allows.
    fn parse_code_block(&mut self) -> ParseResult<String> {
        if !self.current.is(TokenKind::LBrace) {
            return Err(self.unexpected("'{'"));
        }
        let open = self.current.clone();
        let source = self.lexer.source();
        let Some(close) = code_block_end(source, open.span.end) else {
            return Err(error_at(
                &open,
                ParseErrorKind::Unterminated {
                    construct: "code block",
                },
            ));
        };

        self.lexer.seek(&open, close);
        self.current = self.lexer.next_token();
        self.peek = self.lexer.next_token();
        self.expect(TokenKind::RBrace)?;
        Ok(source[open.span.end..close].to_string())
    }
}

/// Byte offset of the `}` closing a code block whose body starts at `start`.
///
/// Braces inside quoted strings, `--` and `//` line comments and `--[[ ]]`
/// block comments are not counted. Strings end at a newline.
fn code_block_end(source: &str, start: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(i),
            b'}' => depth -= 1,
            c @ (b'-' | b'/') if bytes.get(i + 1) == Some(&c) => {
                let rest = &source[i + 2..];
                let skipped = if c == b'-' && rest.starts_with("[[") {
                    rest.find("]]").map_or(rest.len(), |end| end + 2)
                } else {
                    rest.find('\n').unwrap_or(rest.len())
                };
                i += 2 + skipped;
                continue;
            }
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote && bytes[i] != b'\n' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use crate::dsl::ast::*;
    use crate::dsl::parse_program;
    use crate::error::ParseErrorKind;

    fn parse_ok(input: &str) -> Program {
        let (program, errors) = parse_program(input);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        program
    }

    fn only_component(program: &Program) -> &Component {
        let components: Vec<&Component> = program.components().collect();
        assert_eq!(components.len(), 1);
        components[0]
    }

    fn only_system(program: &Program) -> &System {
        let systems: Vec<&System> = program.systems().collect();
        assert_eq!(systems.len(), 1);
        systems[0]
    }

    #[test]
    fn test_parse_component() {
        let program = parse_ok("component Position { x: number; y: number = 10.5; }");
        let comp = only_component(&program);
        assert_eq!(comp.name, "Position");
        assert_eq!(comp.fields.len(), 2);
        assert_eq!(comp.fields[0].name, "x");
        assert_eq!(comp.fields[0].type_name(), "number");
        assert_eq!(comp.fields[0].default, None);
        assert_eq!(comp.fields[1].name, "y");
        assert_eq!(comp.fields[1].default, Some(Expression::number("10.5")));
    }

    #[test]
    fn test_parse_typed_first_fields() {
        let program = parse_ok("component Position {\n    number x;\n    number y = 10.5;\n}");
        let comp = only_component(&program);
        assert_eq!(comp.fields[0].name, "x");
        assert_eq!(comp.fields[1].type_name(), "number");
        assert_eq!(comp.fields[1].default, Some(Expression::number("10.5")));
    }

    #[test]
    fn test_parse_optional_fields() {
        let program = parse_ok("component Player { name: string?; Instance? model; }");
        let comp = only_component(&program);
        assert!(comp.fields[0].optional);
        assert_eq!(comp.fields[0].type_name(), "string");
        assert!(comp.fields[1].optional);
        assert_eq!(comp.fields[1].name, "model");
        assert_eq!(comp.fields[1].type_name(), "Instance");
    }

    #[test]
    fn test_parse_table_fields() {
        for (key, value) in [("string", "boolean"), ("number", "Vector3"), ("Entity", "any")] {
            let input = format!(
                "component Test {{ table<{key}, {value}> flags; lookup: table<{key},{value}>; }}"
            );
            let program = parse_ok(&input);
            let comp = only_component(&program);
            for field in &comp.fields {
                assert_eq!(field.type_name(), "table");
                assert_eq!(field.map_key_type(), Some(key));
                assert_eq!(field.map_value_type(), Some(value));
            }
            assert_eq!(comp.fields[0].name, "flags");
            assert_eq!(comp.fields[1].name, "lookup");
        }
    }

    #[test]
    fn test_parse_default_expressions() {
        let program = parse_ok(
            "component Test {\n\
                 CFrame camera = CFrame.new(0, 1, -5);\n\
                 tags: table<string, boolean> = { a = true, [\"b\"] = false };\n\
                 label: string = 'hi';\n\
             }",
        );
        let comp = only_component(&program);
        let defaults: Vec<String> = comp
            .fields
            .iter()
            .map(|f| f.default.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect();
        assert_eq!(
            defaults,
            vec![
                "CFrame.new(0, 1, (-5))",
                "{a = true, [\"b\"] = false}",
                "\"hi\""
            ]
        );
    }

    #[test]
    fn test_parse_attributes() {
        let program = parse_ok("@replicated @networked component Player { name: string; }");
        let comp = only_component(&program);
        assert_eq!(comp.attributes, vec!["replicated", "networked"]);
    }

    #[test]
    fn test_missing_semicolon_is_an_error() {
        let (program, errors) = parse_program("component Position { x: number y: number }");
        assert!(!errors.is_empty());
        assert_eq!(
            errors[0].to_string(),
            "line 1, column 32: expected ';', got identifier 'y'"
        );
        let comp = only_component(&program);
        assert!(comp.fields.len() < 2);
    }

    #[test]
    fn test_field_errors_recover() {
        let input = "component A {\n  x: ;\n  y: number;\n  : z;\n  w: number;\n}\ncomponent B {}";
        let (program, errors) = parse_program(input);
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert_eq!((errors[0].line, errors[0].column), (2, 6));
        assert_eq!((errors[1].line, errors[1].column), (4, 3));

        let names: Vec<&str> = program.components().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        let fields: Vec<&str> = program
            .components()
            .next()
            .map(|c| c.fields.iter().map(|f| f.name.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(fields, vec!["y", "w"]);
    }

    #[test]
    fn test_unrecognised_default_is_kept_raw() {
        let program = parse_ok("component A { x: number = 5 hz extra; y: string; }");
        let comp = only_component(&program);
        assert_eq!(
            comp.fields[0].default,
            Some(Expression::Unparsed("5 hz extra".to_string()))
        );
        assert_eq!(comp.fields[1].name, "y");
    }

    #[test]
    fn test_broken_default_expression_is_kept_raw() {
        let program = parse_ok("component A { x: number = (1 + ; }");
        let comp = only_component(&program);
        assert_eq!(
            comp.fields[0].default,
            Some(Expression::Unparsed("(1 +".to_string()))
        );
    }

    #[test]
    fn test_empty_default_is_an_error() {
        let (program, errors) = parse_program("component A { x: number = ; y: number; }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0].kind, ParseErrorKind::NoPrefixParse { .. }));
        assert_eq!(only_component(&program).fields.len(), 1);
    }

    #[test]
    fn test_default_without_semicolon_before_brace() {
        let (program, errors) = parse_program("component A { x: number = 1 + }");
        assert_eq!(
            errors,
            vec![crate::error::ParseError::new(
                ParseErrorKind::MissingSemicolon {
                    field: "x".to_string()
                },
                1,
                31
            )]
        );
        assert_eq!(only_component(&program).fields.len(), 0);
    }

    #[test]
    fn test_default_scan_stops_at_closing_brace() {
        let input = "component A { x: number = 5 }
component B { y: number; }
system S { {} }";
        let (program, errors) = parse_program(input);
        let names: Vec<&str> = program.declarations.iter().map(Declaration::name).collect();
        assert_eq!(names, vec!["A", "B", "S"]);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(errors[0].to_string(), "line 1, column 29: missing ';' after default value of 'x'");
        assert!(program.components().all(|c| c
            .fields
            .iter()
            .all(|f| !matches!(f.default, Some(Expression::Unparsed(_))))));

        let (program, errors) = parse_program("component A { x: number = }
component B { y: number; }");
        let names: Vec<&str> = program.declarations.iter().map(Declaration::name).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0].kind, ParseErrorKind::NoPrefixParse { .. }));
    }

    #[test]
    fn test_default_scan_skips_nested_braces() {
        let program = parse_ok("component A { x: T = make { a } b; y: number; }");
        let comp = only_component(&program);
        assert_eq!(
            comp.fields[0].default,
            Some(Expression::Unparsed("make { a } b".to_string()))
        );
        assert_eq!(comp.fields[1].name, "y");
    }

    #[test]
    fn test_default_cut_off_by_end_of_input() {
        let (_, errors) = parse_program("component A { x: number = foo(");
        assert_eq!(
            errors[0].kind,
            ParseErrorKind::MissingSemicolon {
                field: "x".to_string()
            }
        );
        assert_eq!((errors[0].line, errors[0].column), (1, 31));
    }

    #[test]
    fn test_unterminated_component() {
        let (program, errors) = parse_program("component A {\n  x: number;\n");
        assert!(program.declarations.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].kind,
            ParseErrorKind::Unterminated {
                construct: "component"
            }
        );
        assert_eq!((errors[0].line, errors[0].column), (1, 13));
    }

    #[test]
    fn test_parse_relationship() {
        let program = parse_ok("@parent relationship ChildOf {\n    child: A\n    parent: B\n}");
        let rel = program.relationships().next().cloned();
        assert_eq!(
            rel,
            Some(Relationship {
                name: "ChildOf".to_string(),
                kind: Some("parent".to_string()),
                child: "A".to_string(),
                parent: "B".to_string(),
            })
        );
    }

    #[test]
    fn test_relationship_without_tag() {
        let program = parse_ok("relationship Likes { child: Fan parent: Star }");
        let rel = program.relationships().next().cloned();
        assert_eq!(rel.and_then(|r| r.kind), None);
    }

    #[test]
    fn test_relationship_field_order_is_fixed() {
        let (program, errors) = parse_program("relationship R { parent: B child: A }");
        assert!(program.declarations.is_empty());
        assert_eq!(
            errors[0].to_string(),
            "line 1, column 18: expected 'child', got identifier 'parent'"
        );
    }

    #[test]
    fn test_relationship_rejects_many_tags() {
        let (_, errors) = parse_program("@a @b relationship R { child: A parent: B }");
        assert_eq!(
            errors[0].kind,
            ParseErrorKind::TooManyRelationshipTags {
                name: "R".to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn test_tags_need_a_declaration() {
        let (_, errors) = parse_program("@a system S { {} }");
        assert_eq!(
            errors[0].message(),
            "expected 'component' or 'relationship' after tags, got 'system'"
        );
    }

    #[test]
    fn test_parse_system() {
        let input = "system Movement {\n\
                     \tquery(Position, Velocity)\n\
                     \tpriority: 10\n\
                     \t{\n\
                     \t\tpos.x = pos.x + vel.x;\n\
                     \t\tpos.y = pos.y + vel.y;\n\
                     \t}\n\
                     }";
        let program = parse_ok(input);
        let sys = only_system(&program);
        assert_eq!(sys.name, "Movement");
        let query = sys.query.as_ref().map(|q| q.components.clone());
        assert_eq!(
            query,
            Some(vec!["Position".to_string(), "Velocity".to_string()])
        );
        assert_eq!(sys.priority.as_ref().map(ToString::to_string), Some("10".to_string()));
        assert_eq!(sys.frequency, None);
        assert_eq!(
            sys.code,
            "\n\t\tpos.x = pos.x + vel.x;\n\t\tpos.y = pos.y + vel.y;\n\t"
        );
    }

    #[test]
    fn test_code_block_is_verbatim() {
        let input = "system S {\n  {\n    local t = { a = \"}\" } -- keep\n    if x then\n      y()  // odd }\n    end\n  }\n}";
        let program = parse_ok(input);
        let sys = only_system(&program);
        assert_eq!(
            sys.code,
            "\n    local t = { a = \"}\" } -- keep\n    if x then\n      y()  // odd }\n    end\n  "
        );
    }

    #[test]
    fn test_code_block_lua_comments() {
        let input = "system S {\n  {\n    -- don't move\n    --[[ a } b ]]\n    x = 1\n  }\n}\ncomponent C {}";
        let (program, errors) = parse_program(input);
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(program.declarations.len(), 2);
        let sys = only_system(&program);
        assert_eq!(sys.code, "\n    -- don't move\n    --[[ a } b ]]\n    x = 1\n  ");
    }

    #[test]
    fn test_code_block_strings_end_at_newline() {
        let input = "system S {\n  { print('it)\n  }\n}";
        let program = parse_ok(input);
        assert_eq!(only_system(&program).code, " print('it)\n  ");

        let input = "system S { { s = \"a\\\"}\" } }";
        let program = parse_ok(input);
        assert_eq!(only_system(&program).code, " s = \"a\\\"}\" ");
    }

    #[test]
    fn test_code_block_positions_after_body() {
        let (_, errors) = parse_program("system S {\n  { -- it's }\n  }\n  oops\n}");
        assert_eq!(
            errors[0].to_string(),
            "line 4, column 3: expected 'query', 'params', 'frequency', 'priority', a code block or '}', got identifier 'oops'"
        );
    }

    #[test]
    fn test_parse_system_blocks_any_order() {
        let input = "system Physics {\n\
                     \tfrequency: fixed(60);\n\
                     \t{ step(dt) }\n\
                     \tparams { gravity: number = -9.81; number drag; }\n\
                     \tquery(RigidBody, pair(ChildOf, *), pair(Likes, Star), parent(Transform));\n\
                     \tpriority: -1\n\
                     }";
        let program = parse_ok(input);
        let sys = only_system(&program);
        assert_eq!(
            sys.frequency.as_ref().map(ToString::to_string),
            Some("fixed(60)".to_string())
        );
        assert_eq!(sys.priority.as_ref().map(ToString::to_string), Some("(-1)".to_string()));
        assert_eq!(sys.code, " step(dt) ");

        assert_eq!(sys.parameters.len(), 2);
        assert_eq!(sys.parameters[0].name, "gravity");
        assert_eq!(
            sys.parameters[0].default.as_ref().map(ToString::to_string),
            Some("(-9.81)".to_string())
        );
        assert_eq!(sys.parameters[1].name, "drag");
        assert_eq!(sys.parameters[1].param_type, TypeRef::Named("number".to_string()));

        let query = sys.query.clone().unwrap_or_default();
        assert_eq!(query.components, vec!["RigidBody"]);
        assert_eq!(
            query.relations,
            vec![
                Relation::Pair {
                    relationship: "ChildOf".to_string(),
                    target: PairTarget::Wildcard,
                },
                Relation::Pair {
                    relationship: "Likes".to_string(),
                    target: PairTarget::Named("Star".to_string()),
                },
                Relation::Call {
                    relationship: "parent".to_string(),
                    component: "Transform".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_quantity_frequency() {
        let program = parse_ok("system Tick { frequency: 60hz {} }");
        let sys = only_system(&program);
        assert_eq!(
            sys.frequency,
            Some(Expression::Quantity(QuantityLiteral {
                value: "60".to_string(),
                unit: "hz".to_string(),
            }))
        );
    }

    #[test]
    fn test_duplicate_blocks() {
        let cases = [
            ("system S { query(A) query(B) {} }", "query"),
            ("system S { params {} params {} {} }", "params"),
            ("system S { frequency: 1 frequency: 2 {} }", "frequency"),
            ("system S { priority: 1 priority: 2 {} }", "priority"),
            ("system S { {} {} }", "code"),
        ];
        for (input, block) in cases {
            let (program, errors) = parse_program(input);
            assert!(program.declarations.is_empty(), "{input}");
            assert_eq!(errors.len(), 1, "{input}");
            assert_eq!(
                errors[0].kind,
                ParseErrorKind::DuplicateBlock {
                    block,
                    system: "S".to_string()
                },
                "{input}"
            );
        }
    }

    #[test]
    fn test_missing_code_block() {
        let (_, errors) = parse_program("system S { query(A) }");
        assert_eq!(
            errors[0].kind,
            ParseErrorKind::MissingCodeBlock {
                system: "S".to_string()
            }
        );
    }

    #[test]
    fn test_unterminated_code_block() {
        let (_, errors) = parse_program("system S {\n  { if x then\n");
        assert_eq!(
            errors[0].to_string(),
            "line 2, column 3: unterminated code block: reached end of input before '}'"
        );
    }

    #[test]
    fn test_bad_query_term() {
        let (_, errors) = parse_program("system S { query(A, 3) {} }");
        assert_eq!(
            errors[0].message(),
            "expected component name or relation in query, got number '3'"
        );

        let (_, errors) = parse_program("system S { query(A B) {} }");
        assert_eq!(errors[0].message(), "expected ',' or ')' in query, got identifier 'B'");
    }

    #[test]
    fn test_optional_parameter_recovers() {
        let (program, errors) = parse_program("system S { params { speed: number?; n: number; } {} }");
        assert_eq!(
            errors,
            vec![crate::error::ParseError::new(
                ParseErrorKind::OptionalParameter {
                    name: "speed".to_string()
                },
                1,
                21
            )]
        );
        let sys = only_system(&program);
        assert_eq!(sys.parameters.len(), 1);
        assert_eq!(sys.parameters[0].name, "n");
    }

    #[test]
    fn test_unexpected_system_entry() {
        let (_, errors) = parse_program("system S { run {} }");
        assert_eq!(
            errors[0].message(),
            "expected 'query', 'params', 'frequency', 'priority', a code block or '}', got identifier 'run'"
        );
    }
}
