use crate::ast::Stmt;
use crate::interpreter::InterpretError;
use crate::lexer::Lexer;
use crate::parser::Parser;

/// Lex and parse a whole program.
pub fn parse_source(source: &str) -> Result<Vec<Stmt>, InterpretError> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize()?;
    let mut parser = Parser::new(tokens);
    Ok(parser.parse()?)
}
