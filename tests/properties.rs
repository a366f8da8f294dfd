use poly::lexer::Lexer;
use poly::token::TokenKind;
use poly::{Value, Vm};
use proptest::prelude::*;

const MAX_INPUT_BYTES: usize = 256;

proptest! {
    #[test]
    fn tokenize_handles_lossy_utf8_inputs_without_panicking(
        bytes in proptest::collection::vec(any::<u8>(), 0..=MAX_INPUT_BYTES)
    ) {
        let input = String::from_utf8_lossy(&bytes).into_owned();
        let _ = Lexer::new(&input).tokenize();
    }

    #[test]
    fn interpret_handles_operator_soup_without_panicking(
        input in "[a-c0-9 ()+*/%^=,<>!.-]{0,64}(\n[ \t]{0,4}[a-c0-9 ()+*^=-]{0,32}){0,4}"
    ) {
        let mut vm = Vm::new();
        let _ = vm.interpret(&input);
        // The VM stays usable whatever happened before.
        prop_assert!(vm.interpret("ok = 1").is_ok());
    }

    #[test]
    fn finite_numbers_survive_lexing(x in 0.0f64..1e300) {
        let source = format!("{}", x);
        let tokens = Lexer::new(&source).tokenize().unwrap();
        let tokens = tokens.as_slice();

        prop_assert_eq!(tokens.len(), 2);
        prop_assert_eq!(tokens[0].kind, TokenKind::Number);
        prop_assert_eq!(tokens[0].literal.clone(), Some(Value::Number(x)));
        prop_assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn integer_arithmetic_matches_host(
        a in -1000i32..1000,
        b in -1000i32..1000,
        c in -1000i32..1000,
    ) {
        let mut vm = Vm::new();
        vm.interpret(&format!("x, y, z = {}, {}, {}", a, b, c)).unwrap();
        vm.interpret("r = x - y * z + (x + y) * -z").unwrap();

        let (a, b, c) = (a as f64, b as f64, c as f64);
        let expected = a - b * c + (a + b) * -c;
        prop_assert_eq!(vm.get("r"), Some(&Value::Number(expected)));
    }

    #[test]
    fn comparisons_match_host(a in -50i32..50, b in -50i32..50) {
        let mut vm = Vm::new();
        vm.interpret(&format!(
            "lt, gt, le, ge, eq, ne = {a} < {b}, {a} > {b}, {a} <= {b}, {a} >= {b}, {a} == {b}, {a} != {b}"
        ))
        .unwrap();

        prop_assert_eq!(vm.get("lt"), Some(&Value::Boolean(a < b)));
        prop_assert_eq!(vm.get("gt"), Some(&Value::Boolean(a > b)));
        prop_assert_eq!(vm.get("le"), Some(&Value::Boolean(a <= b)));
        prop_assert_eq!(vm.get("ge"), Some(&Value::Boolean(a >= b)));
        prop_assert_eq!(vm.get("eq"), Some(&Value::Boolean(a == b)));
        prop_assert_eq!(vm.get("ne"), Some(&Value::Boolean(a != b)));
    }
}
