pub mod ast;
pub mod imports;
pub mod rewriter;
pub mod setup;
pub mod shadow;
pub mod state;
