//! Classifies a parsed `operand` pair into the operand-token shape the encoder keys the
//! addressing-mode table with.

use matches::debug_assert_matches;
use pest::iterators::Pair;
use pest::Span;
use util::EnumFromStr;
use vcpu::{OperandKind, RegisterId};

use crate::error::Error;
use crate::parser::Rule;

/// One tokenized operand. A bare name is already resolved to `Register` or `Label` here rather
/// than staying a transient "name, not yet classified" state — there is nothing left to decide
/// once the register table has been consulted once.
#[derive(Debug, Clone)]
pub enum RawOperand<'i> {
    Register(RegisterId),
    AddressInRegister(RegisterId),
    Number(u64),
    AddressLiteral(u64),
    Label(Span<'i>),
}

impl<'i> RawOperand<'i> {
    pub fn kind(&self) -> OperandKind {
        match self {
            RawOperand::Register(_) => OperandKind::Register,
            RawOperand::AddressInRegister(_) => OperandKind::AddressInRegister,
            RawOperand::Number(_) => OperandKind::Number,
            RawOperand::AddressLiteral(_) => OperandKind::AddressLiteral,
            RawOperand::Label(_) => OperandKind::Label,
        }
    }
}

fn line_of(span: &Span) -> usize {
    span.start_pos().line_col().0
}

/// Parses the decimal or `0x`-prefixed hexadecimal digit run backing `int`/`dec_int`/`hex_int`.
fn parse_int(pair: Pair<Rule>) -> Result<u64, Error> {
    let span = pair.as_span();
    let text = pair.as_str();
    let parsed = match text.strip_prefix("0x") {
        Some(digits) => u64::from_str_radix(digits, 16),
        None => text.parse::<u64>(),
    };
    parsed.map_err(|_| Error::MalformedNumber {
        line: line_of(&span),
        text: text.to_string(),
    })
}

fn register_of(pair: &Pair<Rule>) -> Result<RegisterId, Error> {
    RegisterId::from_str(pair.as_str()).map_err(|_| Error::NotARegister {
        line: line_of(&pair.as_span()),
        name: pair.as_str().to_string(),
    })
}

/// Tokenizes one `Rule::operand` pair (`[` `name` `]` | `[` `int` `]` | `int` | `name`).
pub fn tokenize_operand(pair: Pair<Rule>) -> Result<RawOperand, Error> {
    debug_assert_matches!(pair.as_rule(), Rule::operand);
    let inner = pair.into_inner().next().unwrap();

    Ok(match inner.as_rule() {
        Rule::addr_in_reg => {
            let name = inner.into_inner().next().unwrap();
            RawOperand::AddressInRegister(register_of(&name)?)
        }
        Rule::addr_literal => {
            let int_pair = inner.into_inner().next().unwrap();
            RawOperand::AddressLiteral(parse_int(int_pair)?)
        }
        Rule::int => RawOperand::Number(parse_int(inner)?),
        Rule::name => match RegisterId::from_str(inner.as_str()) {
            Ok(id) => RawOperand::Register(id),
            Err(_) => RawOperand::Label(inner.as_span()),
        },
        _ => unreachable!("operand can only contain addr_in_reg, addr_literal, int or name"),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::VasmParser;
    use pest::Parser;

    fn operand(text: &str) -> RawOperand {
        let pair = VasmParser::parse(Rule::operand, text).unwrap().next().unwrap();
        tokenize_operand(pair).unwrap()
    }

    #[test]
    fn bare_register_name_resolves_to_register() {
        assert!(matches!(operand("a"), RawOperand::Register(RegisterId::A)));
    }

    #[test]
    fn bare_non_register_name_resolves_to_label() {
        assert!(matches!(operand("top"), RawOperand::Label(_)));
    }

    #[test]
    fn bracketed_register_is_address_in_register() {
        assert!(matches!(
            operand("[sp]"),
            RawOperand::AddressInRegister(RegisterId::StackPointer)
        ));
    }

    #[test]
    fn bracketed_number_is_address_literal() {
        assert!(matches!(operand("[0x64]"), RawOperand::AddressLiteral(100)));
    }

    #[test]
    fn decimal_and_hex_numbers_both_parse() {
        assert!(matches!(operand("35"), RawOperand::Number(35)));
        assert!(matches!(operand("0xFF"), RawOperand::Number(255)));
    }
}
