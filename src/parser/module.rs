use super::*;

impl Parser {
    /// `import "path";` or `import as name from "path";`
    pub(super) fn parse_import(&mut self) -> Result<Stmt, ParseError> {
        self.expect_exact(&TokenKind::Import, "Expected 'import'")?;

        let alias = if self.match_token(&TokenKind::As) {
            let name = self.expect_ident("Expected module name after 'as'")?;
            self.expect_exact(&TokenKind::From, "Expected 'from' after module name")?;
            Some(name)
        } else {
            None
        };

        let path = match &self.current().kind {
            TokenKind::Str(path) => path.clone(),
            _ => return Err(self.error("Import path must be a string literal")),
        };
        self.advance();
        self.expect_exact(&TokenKind::Semicolon, "Expected ';' after import")?;

        Ok(Stmt::Import { path, alias })
    }

    pub(super) fn parse_export(&mut self) -> Result<Stmt, ParseError> {
        self.expect_exact(&TokenKind::Export, "Expected 'export'")?;

        match &self.current().kind {
            TokenKind::Struct => {
                self.advance();
                Ok(Stmt::StructDecl(Rc::new(self.parse_type_body(true, "struct")?)))
            }
            TokenKind::Class => {
                self.advance();
                Ok(Stmt::ClassDecl(Rc::new(self.parse_type_body(true, "class")?)))
            }
            TokenKind::Ident(_) => self.parse_typed_declaration(true),
            _ if self.at_primitive_type() => self.parse_typed_declaration(true),
            _ => Err(self.error(
                "Only variables, functions, structs, and classes can be exported",
            )),
        }
    }
}
