pub mod assembler;
pub mod export;
pub mod rng;
pub mod template;
pub mod timeline;
