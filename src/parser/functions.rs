use super::*;

impl Parser {
    /// `T name ...` after `export` or at statement start: either a function
    /// or a variable declaration, decided by the token after the name.
    pub(super) fn parse_typed_declaration(&mut self, exported: bool) -> Result<Stmt, ParseError> {
        let ty = self.parse_type_ref()?;
        let name = self.expect_ident("Expected identifier after type")?;
        if self.check_exact(&TokenKind::LParen) {
            let decl = self.parse_fn_rest(exported, ty, name)?;
            Ok(Stmt::FunctionDecl(Rc::new(decl)))
        } else {
            self.parse_var_rest(exported, ty, name)
        }
    }

    pub(super) fn parse_var_rest(
        &mut self,
        exported: bool,
        ty: TypeRef,
        name: String,
    ) -> Result<Stmt, ParseError> {
        let init = if self.match_token(&TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect_exact(
            &TokenKind::Semicolon,
            "Expected ';' after variable declaration",
        )?;
        Ok(Stmt::VarDecl(VarDecl {
            exported,
            ty,
            name,
            init,
        }))
    }

    /// Parameter list and body; the name is already consumed.
    pub(super) fn parse_fn_rest(
        &mut self,
        exported: bool,
        ret: TypeRef,
        name: String,
    ) -> Result<FnDecl, ParseError> {
        self.expect_exact(&TokenKind::LParen, "Expected '(' after function name")?;
        let params = self.parse_params()?;
        self.expect_exact(&TokenKind::RParen, "Expected ')' after parameters")?;
        self.expect_exact(&TokenKind::LBrace, "Expected '{' before function body")?;
        let body = self.parse_block_body()?;

        Ok(FnDecl {
            exported,
            ret,
            name,
            params,
            body,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        if self.check_exact(&TokenKind::RParen) {
            return Ok(params);
        }

        loop {
            let ty = self.parse_type_ref()?;
            let name = self.expect_ident("Expected parameter name")?;
            params.push(Param { ty, name });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }
}
