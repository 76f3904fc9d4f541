pub(crate) mod ast;
pub(crate) mod bytecode;
pub(crate) mod compile;
pub(crate) mod compose;
pub(crate) mod display;
pub(crate) mod lambda;
pub(crate) mod lexer;
pub(crate) mod lower;
pub(crate) mod parser;
pub(crate) mod path;
pub(crate) mod rewrite;
pub(crate) mod vm;
