//! Recursive-descent parser for HQL statements
//!
//! Builds the arena syntax tree consumed by semantic analysis. The
//! grammar covers SELECT (select list, FROM with explicit association
//! joins, WHERE, GROUP BY, HAVING, ORDER BY), UPDATE ... SET and
//! DELETE statements, and the expression forms the translator
//! understands. INSERT is recognized only to be rejected with a clear
//! error.
//!
//! Positional parameters may be written `?` (numbered by occurrence,
//! starting at the first supplied value) or `?N` (explicit, 1-based).

use crate::query::ast::{Ast, JoinKind, NodeId, NodeKind};
use crate::query::param::ParameterSpecification;

use super::error::ParseError;
use super::lexer::Lexer;
use super::token::{Position, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    ast: Ast,
    next_positional: usize,
}

impl Parser {
    /// Parses one complete HQL statement.
    pub fn parse(input: &str) -> Result<Ast, ParseError> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            ast: Ast::new(),
            next_positional: 0,
        };
        let root = parser.parse_statement()?;
        if parser.peek().kind != TokenKind::Eof {
            let token = parser.peek().clone();
            return Err(ParseError::unexpected_token(&token, token.position())
                .with_hint("The statement already ended here"));
        }
        parser.ast.set_root(root);
        Ok(parser.ast)
    }

    fn parse_statement(&mut self) -> Result<NodeId, ParseError> {
        let kind = self.peek().kind;
        match kind {
            TokenKind::Select => self.parse_select_statement(),
            TokenKind::Update => self.parse_update_statement(),
            TokenKind::Delete => self.parse_delete_statement(),
            TokenKind::Insert => {
                let position = self.peek().position();
                Err(ParseError::unsupported_statement(
                    "INSERT statements are not supported",
                    position,
                )
                .with_hint("Supported statements are SELECT, UPDATE and DELETE"))
            }
            _ => {
                let token = self.peek().clone();
                Err(ParseError::unexpected_token(&token, token.position())
                    .with_expected_tokens(vec![
                        "SELECT".to_string(),
                        "UPDATE".to_string(),
                        "DELETE".to_string(),
                    ]))
            }
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_select_statement(&mut self) -> Result<NodeId, ParseError> {
        let select_tok = self.expect(TokenKind::Select, "SELECT")?;
        let stmt = self.add(NodeKind::SelectStatement, "select", select_tok.position());

        let select_clause = self.add(NodeKind::SelectClause, "", select_tok.position());
        if self.accept(TokenKind::Distinct).is_some() {
            self.ast.node_mut(select_clause).distinct = true;
        }
        loop {
            let item = self.parse_expression()?;
            self.ast.append_child(select_clause, item);
            if self.accept(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.ast.append_child(stmt, select_clause);

        let from_clause = self.parse_from_clause()?;
        self.ast.append_child(stmt, from_clause);

        if let Some(where_clause) = self.parse_optional_where()? {
            self.ast.append_child(stmt, where_clause);
        }

        if self.check(TokenKind::Group) {
            let group_tok = self.advance();
            self.expect(TokenKind::By, "BY")?;
            let group_clause = self.add(NodeKind::GroupClause, "", group_tok.position());
            loop {
                let expr = self.parse_expression()?;
                self.ast.append_child(group_clause, expr);
                if self.accept(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.ast.append_child(stmt, group_clause);

            if self.check(TokenKind::Having) {
                let having_tok = self.advance();
                let having_clause = self.add(NodeKind::HavingClause, "", having_tok.position());
                let expr = self.parse_expression()?;
                self.ast.append_child(having_clause, expr);
                self.ast.append_child(stmt, having_clause);
            }
        }

        if self.check(TokenKind::Order) {
            let order_tok = self.advance();
            self.expect(TokenKind::By, "BY")?;
            let order_clause = self.add(NodeKind::OrderClause, "", order_tok.position());
            loop {
                let expr = self.parse_expression()?;
                if self.accept(TokenKind::Asc).is_none() && self.accept(TokenKind::Desc).is_some() {
                    self.ast.node_mut(expr).descending = true;
                }
                self.ast.append_child(order_clause, expr);
                if self.accept(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.ast.append_child(stmt, order_clause);
        }

        Ok(stmt)
    }

    fn parse_update_statement(&mut self) -> Result<NodeId, ParseError> {
        let update_tok = self.expect(TokenKind::Update, "UPDATE")?;
        let stmt = self.add(NodeKind::UpdateStatement, "update", update_tok.position());

        let from_clause = self.parse_dml_target(update_tok.position())?;
        self.ast.append_child(stmt, from_clause);
        self.reject_dml_join()?;

        let set_tok = self.expect(TokenKind::Set, "SET")?;
        let set_clause = self.add(NodeKind::SetClause, "", set_tok.position());
        loop {
            let lhs = self.parse_path_primary()?;
            let eq_tok = self.expect(TokenKind::Eq, "=")?;
            let assignment = self.add(NodeKind::Eq, "=", eq_tok.position());
            let rhs = self.parse_expression()?;
            self.ast.append_child(assignment, lhs);
            self.ast.append_child(assignment, rhs);
            self.ast.append_child(set_clause, assignment);
            if self.accept(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.ast.append_child(stmt, set_clause);

        if let Some(where_clause) = self.parse_optional_where()? {
            self.ast.append_child(stmt, where_clause);
        }

        Ok(stmt)
    }

    fn parse_delete_statement(&mut self) -> Result<NodeId, ParseError> {
        let delete_tok = self.expect(TokenKind::Delete, "DELETE")?;
        let stmt = self.add(NodeKind::DeleteStatement, "delete", delete_tok.position());

        self.accept(TokenKind::From);
        let from_clause = self.parse_dml_target(delete_tok.position())?;
        self.ast.append_child(stmt, from_clause);
        self.reject_dml_join()?;

        if let Some(where_clause) = self.parse_optional_where()? {
            self.ast.append_child(stmt, where_clause);
        }

        Ok(stmt)
    }

    /// UPDATE/DELETE range: a single entity name with an optional alias,
    /// wrapped in a from clause so statements share one shape.
    fn parse_dml_target(&mut self, position: Position) -> Result<NodeId, ParseError> {
        let from_clause = self.add(NodeKind::FromClause, "", position);
        let range = self.parse_range()?;
        self.ast.append_child(from_clause, range);
        Ok(from_clause)
    }

    fn reject_dml_join(&mut self) -> Result<(), ParseError> {
        if self.at_join_start() {
            let token = self.peek().clone();
            return Err(ParseError::syntax_error(
                "joins are not allowed in UPDATE or DELETE statements",
                token.position(),
            ));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Clauses
    // ------------------------------------------------------------------

    fn parse_from_clause(&mut self) -> Result<NodeId, ParseError> {
        let from_tok = self.expect(TokenKind::From, "FROM")?;
        let from_clause = self.add(NodeKind::FromClause, "", from_tok.position());

        let range = self.parse_range()?;
        self.ast.append_child(from_clause, range);

        loop {
            if self.accept(TokenKind::Comma).is_some() {
                let range = self.parse_range()?;
                self.ast.append_child(from_clause, range);
            } else if self.at_join_start() {
                let join = self.parse_join()?;
                self.ast.append_child(from_clause, join);
            } else {
                break;
            }
        }

        Ok(from_clause)
    }

    fn parse_range(&mut self) -> Result<NodeId, ParseError> {
        let entity = self.expect(TokenKind::Ident, "entity name")?;
        let range = self.add(NodeKind::Range, entity.lexeme.clone(), entity.position());
        self.ast.node_mut(range).class_alias = self.parse_optional_alias()?;
        Ok(range)
    }

    fn at_join_start(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Join
                | TokenKind::Inner
                | TokenKind::Left
                | TokenKind::Right
                | TokenKind::Full
        )
    }

    fn parse_join(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek().position();
        let lead = self.peek().kind;
        let kind = match lead {
            TokenKind::Join => {
                self.advance();
                JoinKind::Inner
            }
            TokenKind::Inner => {
                self.advance();
                self.expect(TokenKind::Join, "JOIN")?;
                JoinKind::Inner
            }
            TokenKind::Left => {
                self.advance();
                self.accept(TokenKind::Outer);
                self.expect(TokenKind::Join, "JOIN")?;
                JoinKind::LeftOuter
            }
            TokenKind::Right => {
                self.advance();
                self.accept(TokenKind::Outer);
                self.expect(TokenKind::Join, "JOIN")?;
                JoinKind::RightOuter
            }
            TokenKind::Full => {
                self.advance();
                self.accept(TokenKind::Outer);
                self.expect(TokenKind::Join, "JOIN")?;
                JoinKind::FullOuter
            }
            _ => {
                let token = self.peek().clone();
                return Err(ParseError::unexpected_token(&token, token.position())
                    .with_expected_tokens(vec!["JOIN".to_string()]));
            }
        };

        let path = self.parse_dotted_path()?;
        let join = self.add(NodeKind::Join, "join", start);
        self.ast.node_mut(join).join_kind = Some(kind);
        self.ast.append_child(join, path);
        self.ast.node_mut(join).class_alias = self.parse_optional_alias()?;
        Ok(join)
    }

    /// Dotted identifier chain without index access or calls, as used
    /// for explicit join targets.
    fn parse_dotted_path(&mut self) -> Result<NodeId, ParseError> {
        let head = self.expect(TokenKind::Ident, "path")?;
        let mut current = self.add(NodeKind::Ident, head.lexeme.clone(), head.position());
        while self.check(TokenKind::Dot) {
            let dot_tok = self.advance();
            let prop = self.expect_property_name()?;
            let rhs = self.add(NodeKind::Ident, prop.lexeme.clone(), prop.position());
            let dot = self.add(NodeKind::Dot, ".", dot_tok.position());
            self.ast.append_child(dot, current);
            self.ast.append_child(dot, rhs);
            current = dot;
        }
        Ok(current)
    }

    fn parse_optional_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.accept(TokenKind::As).is_some() {
            let alias = self.expect(TokenKind::Ident, "alias")?;
            return Ok(Some(alias.lexeme));
        }
        if self.check(TokenKind::Ident) {
            let alias = self.advance();
            return Ok(Some(alias.lexeme));
        }
        Ok(None)
    }

    fn parse_optional_where(&mut self) -> Result<Option<NodeId>, ParseError> {
        if !self.check(TokenKind::Where) {
            return Ok(None);
        }
        let where_tok = self.advance();
        let where_clause = self.add(NodeKind::WhereClause, "", where_tok.position());
        let expr = self.parse_expression()?;
        self.ast.append_child(where_clause, expr);
        Ok(Some(where_clause))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expression(&mut self) -> Result<NodeId, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<NodeId, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.check(TokenKind::Or) {
            let tok = self.advance();
            let rhs = self.parse_and()?;
            let node = self.add(NodeKind::Or, "or", tok.position());
            self.ast.append_child(node, lhs);
            self.ast.append_child(node, rhs);
            lhs = node;
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<NodeId, ParseError> {
        let mut lhs = self.parse_negated()?;
        while self.check(TokenKind::And) {
            let tok = self.advance();
            let rhs = self.parse_negated()?;
            let node = self.add(NodeKind::And, "and", tok.position());
            self.ast.append_child(node, lhs);
            self.ast.append_child(node, rhs);
            lhs = node;
        }
        Ok(lhs)
    }

    fn parse_negated(&mut self) -> Result<NodeId, ParseError> {
        // Prefix NOT, but leave "x NOT LIKE/BETWEEN/IN" for the
        // relational level.
        if self.check(TokenKind::Not) {
            let tok = self.advance();
            let operand = self.parse_negated()?;
            let node = self.add(NodeKind::Not, "not", tok.position());
            self.ast.append_child(node, operand);
            return Ok(node);
        }
        self.parse_relational()
    }

    fn parse_relational(&mut self) -> Result<NodeId, ParseError> {
        let mut lhs = self.parse_additive()?;

        loop {
            let negated = self.check(TokenKind::Not)
                && matches!(
                    self.peek_next().kind,
                    TokenKind::Like | TokenKind::Between | TokenKind::In
                );
            if negated {
                self.advance();
            }

            let next = self.peek().kind;
            match next {
                kind @ (TokenKind::Eq
                | TokenKind::Ne
                | TokenKind::Lt
                | TokenKind::Le
                | TokenKind::Gt
                | TokenKind::Ge) => {
                    let tok = self.advance();
                    let node_kind = match kind {
                        TokenKind::Eq => NodeKind::Eq,
                        TokenKind::Ne => NodeKind::Ne,
                        TokenKind::Lt => NodeKind::Lt,
                        TokenKind::Le => NodeKind::Le,
                        TokenKind::Gt => NodeKind::Gt,
                        _ => NodeKind::Ge,
                    };
                    let rhs = self.parse_additive()?;
                    let node = self.add(node_kind, tok.lexeme.clone(), tok.position());
                    self.ast.append_child(node, lhs);
                    self.ast.append_child(node, rhs);
                    lhs = node;
                }
                TokenKind::Like => {
                    let tok = self.advance();
                    let rhs = self.parse_additive()?;
                    let (kind, text) = if negated {
                        (NodeKind::NotLike, "not like")
                    } else {
                        (NodeKind::Like, "like")
                    };
                    let node = self.add(kind, text, tok.position());
                    self.ast.append_child(node, lhs);
                    self.ast.append_child(node, rhs);
                    lhs = node;
                }
                TokenKind::Between => {
                    let tok = self.advance();
                    let low = self.parse_additive()?;
                    self.expect(TokenKind::And, "AND")?;
                    let high = self.parse_additive()?;
                    let (kind, text) = if negated {
                        (NodeKind::NotBetween, "not between")
                    } else {
                        (NodeKind::Between, "between")
                    };
                    let node = self.add(kind, text, tok.position());
                    self.ast.append_child(node, lhs);
                    self.ast.append_child(node, low);
                    self.ast.append_child(node, high);
                    lhs = node;
                }
                TokenKind::In => {
                    let tok = self.advance();
                    let rhs = self.parse_in_rhs()?;
                    let (kind, text) = if negated {
                        (NodeKind::NotIn, "not in")
                    } else {
                        (NodeKind::In, "in")
                    };
                    let node = self.add(kind, text, tok.position());
                    self.ast.append_child(node, lhs);
                    self.ast.append_child(node, rhs);
                    lhs = node;
                }
                TokenKind::Is => {
                    let tok = self.advance();
                    let negated_null = self.accept(TokenKind::Not).is_some();
                    self.expect(TokenKind::Null, "NULL")?;
                    let (kind, text) = if negated_null {
                        (NodeKind::IsNotNull, "is not null")
                    } else {
                        (NodeKind::IsNull, "is null")
                    };
                    let node = self.add(kind, text, tok.position());
                    self.ast.append_child(node, lhs);
                    lhs = node;
                }
                _ => {
                    if negated {
                        // NOT consumed without a following predicate.
                        let token = self.peek().clone();
                        return Err(ParseError::unexpected_token(&token, token.position())
                            .with_expected_tokens(vec![
                                "LIKE".to_string(),
                                "BETWEEN".to_string(),
                                "IN".to_string(),
                            ]));
                    }
                    break;
                }
            }
        }

        Ok(lhs)
    }

    fn parse_in_rhs(&mut self) -> Result<NodeId, ParseError> {
        let open = self.expect(TokenKind::LParen, "(")?;
        if self.check(TokenKind::Select) {
            let subquery = self.parse_select_statement()?;
            self.expect(TokenKind::RParen, ")")?;
            return Ok(subquery);
        }
        let list = self.add(NodeKind::ExprList, "", open.position());
        loop {
            let expr = self.parse_expression()?;
            self.ast.append_child(list, expr);
            if self.accept(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RParen, ")")?;
        Ok(list)
    }

    fn parse_additive(&mut self) -> Result<NodeId, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let kind = match self.peek().kind {
                TokenKind::Plus => NodeKind::Plus,
                TokenKind::Minus => NodeKind::Minus,
                _ => break,
            };
            let tok = self.advance();
            let rhs = self.parse_multiplicative()?;
            let node = self.add(kind, tok.lexeme.clone(), tok.position());
            self.ast.append_child(node, lhs);
            self.ast.append_child(node, rhs);
            lhs = node;
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<NodeId, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let kind = match self.peek().kind {
                TokenKind::Star => NodeKind::Mul,
                TokenKind::Slash => NodeKind::Div,
                _ => break,
            };
            let tok = self.advance();
            let rhs = self.parse_unary()?;
            let node = self.add(kind, tok.lexeme.clone(), tok.position());
            self.ast.append_child(node, lhs);
            self.ast.append_child(node, rhs);
            lhs = node;
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<NodeId, ParseError> {
        if self.check(TokenKind::Minus) {
            let tok = self.advance();
            let operand = self.parse_unary()?;
            let node = self.add(NodeKind::UnaryMinus, "-", tok.position());
            self.ast.append_child(node, operand);
            return Ok(node);
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<NodeId, ParseError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                let position = token.position();
                Ok(self.add(NodeKind::IntLiteral, token.lexeme, position))
            }
            TokenKind::FloatLiteral => {
                self.advance();
                let position = token.position();
                Ok(self.add(NodeKind::FloatLiteral, token.lexeme, position))
            }
            TokenKind::StringLiteral => {
                self.advance();
                let position = token.position();
                Ok(self.add(NodeKind::StringLiteral, token.lexeme, position))
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(self.add(
                    NodeKind::BoolLiteral,
                    token.lexeme.to_ascii_lowercase(),
                    token.position(),
                ))
            }
            TokenKind::Null => {
                self.advance();
                Ok(self.add(NodeKind::NullLiteral, "null", token.position()))
            }
            TokenKind::NamedParam => {
                self.advance();
                let node = self.add(
                    NodeKind::Param,
                    format!(":{}", token.lexeme),
                    token.position(),
                );
                self.ast.node_mut(node).param =
                    Some(ParameterSpecification::named(token.lexeme));
                Ok(node)
            }
            TokenKind::PositionalParam => {
                self.advance();
                let index = if token.lexeme.is_empty() {
                    let index = self.next_positional;
                    self.next_positional += 1;
                    index
                } else {
                    let ordinal: usize = token
                        .lexeme
                        .parse()
                        .map_err(|_| ParseError::invalid_number(&token.lexeme, token.position()))?;
                    if ordinal == 0 {
                        return Err(ParseError::invalid_number("?0", token.position())
                            .with_hint("Explicit positional parameters are numbered from ?1"));
                    }
                    ordinal - 1
                };
                let node = self.add(
                    NodeKind::Param,
                    format!("?{}", token.lexeme),
                    token.position(),
                );
                self.ast.node_mut(node).param =
                    Some(ParameterSpecification::positional(index));
                Ok(node)
            }
            TokenKind::Exists => {
                self.advance();
                self.expect(TokenKind::LParen, "(")?;
                let subquery = self.parse_select_statement()?;
                self.expect(TokenKind::RParen, ")")?;
                let node = self.add(NodeKind::Exists, "exists", token.position());
                self.ast.append_child(node, subquery);
                Ok(node)
            }
            TokenKind::LParen => {
                self.advance();
                if self.check(TokenKind::Select) {
                    let subquery = self.parse_select_statement()?;
                    self.expect(TokenKind::RParen, ")")?;
                    return Ok(subquery);
                }
                let first = self.parse_expression()?;
                if self.accept(TokenKind::Comma).is_none() {
                    self.expect(TokenKind::RParen, ")")?;
                    return Ok(first);
                }
                let list = self.add(NodeKind::ExprList, "", token.position());
                self.ast.append_child(list, first);
                loop {
                    let expr = self.parse_expression()?;
                    self.ast.append_child(list, expr);
                    if self.accept(TokenKind::Comma).is_none() {
                        break;
                    }
                }
                self.expect(TokenKind::RParen, ")")?;
                Ok(list)
            }
            TokenKind::Ident => self.parse_path_primary(),
            TokenKind::Eof => Err(ParseError::unexpected_end_of_input(token.position())),
            _ => Err(ParseError::unexpected_token(&token, token.position())
                .with_expected_tokens(vec!["an expression".to_string()])),
        }
    }

    /// Identifier followed by any number of `.property` and `[index]`
    /// steps, or a function call when the identifier is immediately
    /// followed by parentheses.
    fn parse_path_primary(&mut self) -> Result<NodeId, ParseError> {
        let head = self.expect(TokenKind::Ident, "identifier")?;

        let mut current = if self.check(TokenKind::LParen) {
            self.parse_method_call(&head)?
        } else {
            self.add(NodeKind::Ident, head.lexeme.clone(), head.position())
        };

        loop {
            if self.check(TokenKind::Dot) {
                let dot_tok = self.advance();
                let prop = self.expect_property_name()?;
                let rhs = self.add(NodeKind::Ident, prop.lexeme.clone(), prop.position());
                let dot = self.add(NodeKind::Dot, ".", dot_tok.position());
                self.ast.append_child(dot, current);
                self.ast.append_child(dot, rhs);
                current = dot;
            } else if self.check(TokenKind::LBracket) {
                let bracket_tok = self.advance();
                let selector = self.parse_expression()?;
                self.expect(TokenKind::RBracket, "]")?;
                let index = self.add(NodeKind::Index, "[]", bracket_tok.position());
                self.ast.append_child(index, current);
                self.ast.append_child(index, selector);
                current = index;
            } else {
                break;
            }
        }

        Ok(current)
    }

    fn parse_method_call(&mut self, name: &Token) -> Result<NodeId, ParseError> {
        self.expect(TokenKind::LParen, "(")?;
        let method = self.add(NodeKind::Method, name.lexeme.clone(), name.position());

        if self.accept(TokenKind::RParen).is_some() {
            return Ok(method);
        }

        if self.check(TokenKind::Star) {
            let star_tok = self.advance();
            let star = self.add(NodeKind::Star, "*", star_tok.position());
            self.ast.append_child(method, star);
            self.expect(TokenKind::RParen, ")")?;
            return Ok(method);
        }

        if self.accept(TokenKind::Distinct).is_some() {
            self.ast.node_mut(method).distinct = true;
        }
        loop {
            let arg = self.parse_expression()?;
            self.ast.append_child(method, arg);
            if self.accept(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RParen, ")")?;
        Ok(method)
    }

    // ------------------------------------------------------------------
    // Token handling
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_next(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + 1).min(last)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn accept(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Property position directly after a dot: keywords are acceptable
    /// identifiers here, so properties named like `order` or `group`
    /// still parse.
    fn expect_property_name(&mut self) -> Result<Token, ParseError> {
        let token = self.peek().clone();
        let ident_like = token.kind == TokenKind::Ident
            || TokenKind::from_keyword(&token.lexeme) == Some(token.kind);
        if ident_like {
            return Ok(self.advance());
        }
        if token.kind == TokenKind::Eof {
            return Err(ParseError::unexpected_end_of_input(token.position())
                .with_expected_tokens(vec!["property name".to_string()]));
        }
        Err(ParseError::unexpected_token(&token, token.position())
            .with_expected_tokens(vec!["property name".to_string()]))
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let token = self.peek().clone();
        if token.kind == TokenKind::Eof {
            return Err(ParseError::unexpected_end_of_input(token.position())
                .with_expected_tokens(vec![expected.to_string()]));
        }
        Err(ParseError::unexpected_token(&token, token.position())
            .with_expected_tokens(vec![expected.to_string()]))
    }

    fn add(&mut self, kind: NodeKind, text: impl Into<String>, pos: Position) -> NodeId {
        self.ast.add_node(kind, text, pos)
    }
}
