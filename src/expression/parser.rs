//! Recursive-descent equation parser
//!
//! Precedence, lowest to highest:
//!
//! 1. `||` `|` `or`
//! 2. `&&` `&` `and`
//! 3. `<` `<=` `>` `>=` `==` `!=`
//! 4. `+` `-`
//! 5. `*` `/` `%` `mod`
//! 6. `^` (right-associative)
//! 7. unary `-` `!` `+`
//! 8. literals, variables, calls, parentheses

use super::ast::{BinaryOp, Expression, Function, UnaryOp};
use super::lexer::{TokenKind, TokenStream, tokenize};

/// Parse equation text into an expression tree
pub fn parse(source: &str) -> Result<Expression, String> {
    let mut tokens = TokenStream::new(tokenize(source)?);
    if tokens.is_at_end() {
        return Err("equation is empty".to_string());
    }
    let expr = parse_or_expr(&mut tokens)?;
    if !tokens.is_at_end() {
        let token = tokens.peek();
        return Err(format!(
            "unexpected {:?} at offset {}",
            token.kind, token.offset
        ));
    }
    Ok(expr)
}

fn parse_or_expr(tokens: &mut TokenStream) -> Result<Expression, String> {
    let mut left = parse_and_expr(tokens)?;

    while tokens.check(&TokenKind::Or) {
        tokens.advance();
        let right = parse_and_expr(tokens)?;
        left = Expression::binary(BinaryOp::Or, left, right);
    }

    Ok(left)
}

fn parse_and_expr(tokens: &mut TokenStream) -> Result<Expression, String> {
    let mut left = parse_relational_expr(tokens)?;

    while tokens.check(&TokenKind::And) {
        tokens.advance();
        let right = parse_relational_expr(tokens)?;
        left = Expression::binary(BinaryOp::And, left, right);
    }

    Ok(left)
}

fn parse_relational_expr(tokens: &mut TokenStream) -> Result<Expression, String> {
    let mut left = parse_additive_expr(tokens)?;

    loop {
        let op = match tokens.peek().kind {
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Ge => BinaryOp::Ge,
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::Ne => BinaryOp::Ne,
            _ => break,
        };
        tokens.advance();
        let right = parse_additive_expr(tokens)?;
        left = Expression::binary(op, left, right);
    }

    Ok(left)
}

fn parse_additive_expr(tokens: &mut TokenStream) -> Result<Expression, String> {
    let mut left = parse_multiplicative_expr(tokens)?;

    loop {
        let op = if tokens.check(&TokenKind::Plus) {
            BinaryOp::Add
        } else if tokens.check(&TokenKind::Minus) {
            BinaryOp::Sub
        } else {
            break;
        };
        tokens.advance();
        let right = parse_multiplicative_expr(tokens)?;
        left = Expression::binary(op, left, right);
    }

    Ok(left)
}

fn parse_multiplicative_expr(tokens: &mut TokenStream) -> Result<Expression, String> {
    let mut left = parse_power_expr(tokens)?;

    loop {
        let op = match tokens.peek().kind {
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            _ => break,
        };
        tokens.advance();
        let right = parse_power_expr(tokens)?;
        left = Expression::binary(op, left, right);
    }

    Ok(left)
}

/// `a ^ b ^ c` groups as `a ^ (b ^ c)`
fn parse_power_expr(tokens: &mut TokenStream) -> Result<Expression, String> {
    let base = parse_unary_expr(tokens)?;

    if tokens.check(&TokenKind::Caret) {
        tokens.advance();
        let exponent = parse_power_expr(tokens)?;
        return Ok(Expression::binary(BinaryOp::Pow, base, exponent));
    }

    Ok(base)
}

fn parse_unary_expr(tokens: &mut TokenStream) -> Result<Expression, String> {
    if tokens.check(&TokenKind::Minus) {
        tokens.advance();
        let operand = parse_unary_expr(tokens)?;
        return Ok(Expression::unary(UnaryOp::Neg, operand));
    }
    if tokens.check(&TokenKind::Not) {
        tokens.advance();
        let operand = parse_unary_expr(tokens)?;
        return Ok(Expression::unary(UnaryOp::Not, operand));
    }
    if tokens.check(&TokenKind::Plus) {
        tokens.advance();
        return parse_unary_expr(tokens);
    }

    parse_primary_expr(tokens)
}

fn parse_primary_expr(tokens: &mut TokenStream) -> Result<Expression, String> {
    let token = tokens.advance();
    match token.kind {
        TokenKind::Number(value) => Ok(Expression::Literal(value)),
        TokenKind::LParen => {
            let expr = parse_or_expr(tokens)?;
            expect_close(tokens)?;
            Ok(expr)
        }
        TokenKind::Ident(name) => match Function::from_name(&name) {
            Some(function) => parse_call(tokens, function, &name),
            None => Ok(Expression::Variable(name)),
        },
        TokenKind::Eof => Err("unexpected end of equation".to_string()),
        other => Err(format!("unexpected {other:?} at offset {}", token.offset)),
    }
}

/// Function names shadow attributes; constants may omit the parentheses
fn parse_call(
    tokens: &mut TokenStream,
    function: Function,
    name: &str,
) -> Result<Expression, String> {
    if !tokens.check(&TokenKind::LParen) {
        if function.is_constant() {
            return Ok(Expression::Call {
                function,
                args: Vec::new(),
            });
        }
        return Err(format!("function '{name}' requires arguments"));
    }
    tokens.advance();

    let mut args = Vec::new();
    if !tokens.check(&TokenKind::RParen) {
        args.push(parse_or_expr(tokens)?);
        while tokens.check(&TokenKind::Comma) {
            tokens.advance();
            args.push(parse_or_expr(tokens)?);
        }
    }
    expect_close(tokens)?;

    if args.len() != function.arity() {
        return Err(format!(
            "function '{name}' takes {} argument(s), found {}",
            function.arity(),
            args.len()
        ));
    }
    Ok(Expression::Call { function, args })
}

fn expect_close(tokens: &mut TokenStream) -> Result<(), String> {
    if tokens.check(&TokenKind::RParen) {
        tokens.advance();
        Ok(())
    } else {
        let token = tokens.peek();
        Err(format!(
            "expected ')' at offset {}, found {:?}",
            token.offset, token.kind
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expression {
        Expression::Variable(name.to_string())
    }

    #[test]
    fn test_power_binds_tighter_than_division() {
        let expr = parse("x - 4/2^3").unwrap();
        let expected = Expression::binary(
            BinaryOp::Sub,
            var("x"),
            Expression::binary(
                BinaryOp::Div,
                Expression::Literal(4.0),
                Expression::binary(BinaryOp::Pow, Expression::Literal(2.0), Expression::Literal(3.0)),
            ),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse("2^3^2").unwrap();
        let expected = Expression::binary(
            BinaryOp::Pow,
            Expression::Literal(2.0),
            Expression::binary(BinaryOp::Pow, Expression::Literal(3.0), Expression::Literal(2.0)),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_constants_without_parens() {
        let expr = parse("2*pi").unwrap();
        assert_eq!(
            expr,
            Expression::binary(
                BinaryOp::Mul,
                Expression::Literal(2.0),
                Expression::Call {
                    function: Function::Pi,
                    args: Vec::new()
                }
            )
        );
    }

    #[test]
    fn test_logical_precedence() {
        let expr = parse("a or b and c").unwrap();
        assert_eq!(
            expr,
            Expression::binary(
                BinaryOp::Or,
                var("a"),
                Expression::binary(BinaryOp::And, var("b"), var("c"))
            )
        );
    }

    #[test]
    fn test_variables_are_collected_once() {
        let expr = parse("max(a, b) + a * sqrt(c)").unwrap();
        assert_eq!(expr.variables(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("(1 + 2").is_err());
        assert!(parse("1 +").is_err());
        assert!(parse("atan2(1)").is_err());
        assert!(parse("sqrt").is_err());
        assert!(parse("1 2").is_err());
    }
}
