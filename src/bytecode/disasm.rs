use std::fmt::Write;

use crate::bytecode::{CodeBuffer, Op};
use crate::lang::value::Value;

/// Print disassembly of a code buffer
pub fn print_code(code: &CodeBuffer) {
    println!("════════════════════════════════════════");
    println!(" main");
    println!(" {} instructions", code.len());
    println!("════════════════════════════════════════");
    print!("{}", disassemble(code));
}

/// Return disassembly as a String, one instruction per line:
/// `ip  line  MNEMONIC  operand`.
pub fn disassemble(code: &CodeBuffer) -> String {
    let mut output = String::new();
    let mut last_line = None;

    for (ip, op) in code.ops().iter().enumerate() {
        let line = code.line(ip);
        let line_col = if line == last_line {
            "   |".to_string()
        } else {
            format!("{:4}", line.unwrap_or(0))
        };
        last_line = line;

        let _ = writeln!(output, "{:04} {} {}", ip, line_col, format_op(op));
    }

    output
}

fn format_op(op: &Op) -> String {
    match op {
        Op::Literal(v) => format!("{:<11} {}", op.name(), format_value(v)),
        Op::Assign(n) => format!("{:<11} {}    ; ( ids values -- )", op.name(), n),
        Op::Scope(level) => format!("{:<11} {}", op.name(), level),
        Op::Neg | Op::Not => format!("{:<11} ; ( a -- a )", op.name()),
        Op::End => op.name().to_string(),
        _ => format!("{:<11} ; ( a b -- c )", op.name()),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("{:?}", n),
        Value::Boolean(b) => format!("{}", b),
        Value::Identifier(name) => format!("'{}", name),
    }
}
