use super::*;

fn primitive(kind: &TokenKind) -> Option<TypeName> {
    match kind {
        TokenKind::IntType => Some(TypeName::Int),
        TokenKind::FloatType => Some(TypeName::Float),
        TokenKind::CharType => Some(TypeName::Char),
        TokenKind::BoolType => Some(TypeName::Bool),
        TokenKind::VoidType => Some(TypeName::Void),
        TokenKind::StringType => Some(TypeName::Str),
        _ => None,
    }
}

impl Parser {
    pub(super) fn at_primitive_type(&self) -> bool {
        primitive(&self.current().kind).is_some()
    }

    /// `Name ident` or `Name[..] ident`: a declaration with a user-defined type.
    pub(super) fn at_named_declaration(&self) -> bool {
        if !matches!(self.current().kind, TokenKind::Ident(_)) {
            return false;
        }
        let mut ahead = 1;
        while matches!(self.peek(ahead).kind, TokenKind::LBracket) {
            ahead += 1;
            while !matches!(self.peek(ahead).kind, TokenKind::RBracket | TokenKind::Eof) {
                ahead += 1;
            }
            if matches!(self.peek(ahead).kind, TokenKind::Eof) {
                return false;
            }
            ahead += 1;
        }
        matches!(self.peek(ahead).kind, TokenKind::Ident(_))
    }

    pub(super) fn parse_type_name(&mut self) -> Result<TypeName, ParseError> {
        if let Some(base) = primitive(&self.current().kind) {
            self.advance();
            return Ok(base);
        }
        match &self.current().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(TypeName::Named(name))
            }
            _ => Err(self.error(format!("Expected a type, found '{}'", self.current().lexeme))),
        }
    }

    /// `[]` is rank 1, `[,]` rank 2, `[,,]` rank 3.
    pub(super) fn parse_array_dims(&mut self) -> Result<usize, ParseError> {
        let mut dims = 0;
        while self.match_token(&TokenKind::LBracket) {
            let mut rank = 1;
            while self.match_token(&TokenKind::Comma) {
                rank += 1;
            }
            self.expect_exact(&TokenKind::RBracket, "Expected ']' after array type")?;
            if dims == 0 {
                dims = rank;
            }
        }
        if dims > 3 {
            return Err(self.error("Arrays support at most 3 dimensions"));
        }
        Ok(dims)
    }

    pub(super) fn parse_type_ref(&mut self) -> Result<TypeRef, ParseError> {
        let base = self.parse_type_name()?;
        let dims = self.parse_array_dims()?;
        Ok(TypeRef { base, dims })
    }

    /// Body of a `struct` or `class` declaration; the keyword is already consumed.
    pub(super) fn parse_type_body(
        &mut self,
        exported: bool,
        keyword: &str,
    ) -> Result<TypeDecl, ParseError> {
        let name = self.expect_ident(&format!("Expected {} name", keyword))?;
        self.expect_exact(
            &TokenKind::LBrace,
            &format!("Expected '{{' before {} body", keyword),
        )?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        let mut constructor: Option<Rc<FnDecl>> = None;

        while !self.check_exact(&TokenKind::RBrace) && !self.is_eof() {
            // Name(params) { ... }
            let is_bare_ctor = matches!(&self.current().kind, TokenKind::Ident(n) if *n == name)
                && matches!(self.peek(1).kind, TokenKind::LParen);
            if is_bare_ctor {
                self.advance();
                let ctor = self.parse_fn_rest(false, TypeRef::scalar(TypeName::Void), name.clone())?;
                self.set_constructor(&mut constructor, ctor, keyword, &name)?;
                continue;
            }

            let ty = self.parse_type_ref()?;
            let member = self.expect_ident("Expected member name after type")?;
            if self.check_exact(&TokenKind::LParen) {
                let is_ctor = member == name && ty == TypeRef::scalar(TypeName::Void);
                let method = self.parse_fn_rest(false, ty, member)?;
                if is_ctor {
                    self.set_constructor(&mut constructor, method, keyword, &name)?;
                } else {
                    methods.push(Rc::new(method));
                }
            } else {
                let init = if self.match_token(&TokenKind::Assign) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                self.expect_exact(&TokenKind::Semicolon, "Expected ';' after field declaration")?;
                fields.push(VarDecl {
                    exported: false,
                    ty,
                    name: member,
                    init,
                });
            }
        }

        self.expect_exact(
            &TokenKind::RBrace,
            &format!("Expected '}}' after {} body", keyword),
        )?;

        Ok(TypeDecl {
            exported,
            name,
            fields,
            methods,
            constructor,
        })
    }

    fn set_constructor(
        &self,
        slot: &mut Option<Rc<FnDecl>>,
        ctor: FnDecl,
        keyword: &str,
        name: &str,
    ) -> Result<(), ParseError> {
        if slot.is_some() {
            return Err(self.error(format!(
                "{} '{}' already has a constructor",
                capitalize(keyword),
                name
            )));
        }
        *slot = Some(Rc::new(ctor));
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
