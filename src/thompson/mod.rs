pub mod bytecode;
pub mod pike_vm;
