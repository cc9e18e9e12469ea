//! Infix operator handling for the Pratt parser.

use crate::SyntaxKind;
use crate::parser::ast::{ArithmeticOp, Node, NodeKind, TokenSpan};
use crate::parser::grammar::Parser;

#[derive(Debug, Clone, Copy)]
struct InfixEntry {
    l_bp: u8,
    r_bp: u8,
    op: ArithmeticOp,
}

const INFIX_TABLE: &[(SyntaxKind, InfixEntry)] = &[
    (
        SyntaxKind::T_PLUS,
        InfixEntry {
            l_bp: 40,
            r_bp: 41,
            op: ArithmeticOp::Add,
        },
    ),
    (
        SyntaxKind::T_MINUS,
        InfixEntry {
            l_bp: 40,
            r_bp: 41,
            op: ArithmeticOp::Sub,
        },
    ),
    (
        SyntaxKind::T_STAR,
        InfixEntry {
            l_bp: 50,
            r_bp: 51,
            op: ArithmeticOp::Mul,
        },
    ),
    (
        SyntaxKind::T_SLASH,
        InfixEntry {
            l_bp: 50,
            r_bp: 51,
            op: ArithmeticOp::Div,
        },
    ),
];

/// Binding power of unary `+` and `-`.
pub(crate) const PREFIX_BP: u8 = 60;

fn infix_entry(kind: SyntaxKind) -> Option<InfixEntry> {
    INFIX_TABLE
        .iter()
        .find_map(|(k, entry)| (*k == kind).then_some(*entry))
}

/// Left and right binding power of an arithmetic operator.
pub(crate) fn binding_power(op: ArithmeticOp) -> (u8, u8) {
    INFIX_TABLE
        .iter()
        .find_map(|(_, e)| (e.op == op).then_some((e.l_bp, e.r_bp)))
        .unwrap_or((0, 0))
}

impl Parser<'_> {
    pub(super) fn infix(&mut self, mut lhs: Node, min_bp: u8) -> Option<Node> {
        while let Some(op_kind) = self.ts.peek_kind() {
            let Some(entry) = infix_entry(op_kind) else {
                break;
            };
            if entry.l_bp < min_bp {
                break;
            }
            let op_idx = self.ts.cursor();
            self.ts.advance();
            let rhs = self.scalar_bp(entry.r_bp)?;
            let first = lhs.span().map_or(op_idx, |s| s.first);
            lhs = Node::parsed(
                NodeKind::Arithmetic {
                    op: entry.op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                TokenSpan {
                    first,
                    last: self.ts.last_index(),
                },
            );
        }
        Some(lhs)
    }
}
