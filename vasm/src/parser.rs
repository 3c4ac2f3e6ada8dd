use pest_derive::Parser;

/// Pest-generated parser for the VASM grammar (`vasm.pest`).
#[derive(Parser)]
#[grammar = "vasm.pest"]
pub struct VasmParser;
