pub mod ast;
pub mod environment;
pub mod heap;
pub mod interpreter;
pub mod lexer;
pub mod modules;
pub mod parser;
pub mod source;
pub mod types;
pub mod value;
