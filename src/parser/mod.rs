use std::rc::Rc;

use crate::ast::*;
use crate::lexer::{Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("error[{line}:{col}]: {msg}")]
    Error {
        msg: String,
        line: usize,
        col: usize,
    },
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

mod blocks;
mod core;
mod expr;
mod functions;
mod module;
mod types;

impl Parser {
    pub fn parse(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();

        while !self.is_eof() {
            stmts.push(self.parse_declaration()?);
        }

        Ok(stmts)
    }

    /// Any statement, including declarations, imports and exports.
    pub(super) fn parse_declaration(&mut self) -> Result<Stmt, ParseError> {
        match &self.current().kind {
            TokenKind::Import => self.parse_import(),
            TokenKind::Export => self.parse_export(),
            TokenKind::Struct => {
                self.advance();
                Ok(Stmt::StructDecl(Rc::new(self.parse_type_body(false, "struct")?)))
            }
            TokenKind::Class => {
                self.advance();
                Ok(Stmt::ClassDecl(Rc::new(self.parse_type_body(false, "class")?)))
            }
            _ if self.at_primitive_type() || self.at_named_declaration() => {
                self.parse_typed_declaration(false)
            }
            _ => self.parse_statement(),
        }
    }
}
