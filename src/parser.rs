//! 过滤表达式的语法分析器
//!
//! ## 语法
//!
//! ```text
//! expression := path operator value
//! path       := segment ("." segment)*
//! operator   := "=" | "!" | ">" | "<" | ")" | "(" | "~" | "%" | "*" | "@"
//! value      := 运算符之后的全部文本 (不能为空)
//! ```
//!
//! ## 运算符含义
//!
//! | 符号 | 含义 |
//! |------|------|
//! | `=`  | 等于 |
//! | `!`  | 不等于 |
//! | `>`  | 大于 |
//! | `<`  | 小于 |
//! | `)`  | 大于等于 |
//! | `(`  | 小于等于 |
//! | `~`  | 正则匹配 |
//! | `%`  | 不区分大小写的包含 |
//! | `*`  | 属于列表 (以 `;` 分隔) |
//! | `@`  | 字段存在 (非空) |
//!
//! ## 解析示例
//!
//! ```text
//! result=passed
//! duration>10
//! metadata.tags*tag1;tag2
//! env="staging"
//! metadata.assignee@true
//! ```

use crate::ast::{FieldPath, FilterExpression, Operator};
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind};
use thiserror::Error;

pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    position: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

impl ParseError {
    fn new(message: String, span: Option<Span>) -> Self {
        Self { message, span }
    }

    fn at_position(message: String, span: Span) -> Self {
        Self { message, span: Some(span) }
    }
}

/// 对单条表达式字符串完成分词和解析
pub fn parse_expression(input: &str) -> Result<FilterExpression, ParseError> {
    let tokens: Vec<_> = Lexer::new(input).collect();
    Parser::new(&tokens).parse()
}

/// 去掉一层成对的引号 (`"..."` 或 `'...'`)
pub fn strip_quotes(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        Self { tokens, position: 0 }
    }

    /// 返回当前 token，不推进位置
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.position)
    }

    /// 返回当前 token 并推进位置
    fn advance(&mut self) -> Option<&'a Token<'a>> {
        let tokens = self.tokens;
        let token = tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    pub fn parse(&mut self) -> Result<FilterExpression, ParseError> {
        let (field, op) = self.parse_path_and_operator()?;
        let value = self.parse_value()?;

        if let Some(token) = self.peek() {
            return Err(ParseError::at_position(
                format!("Unexpected token after value: {:?}", token.kind),
                token.span,
            ));
        }

        Ok(FilterExpression { field, op, value })
    }

    /// 解析字段路径直到遇到运算符
    fn parse_path_and_operator(&mut self) -> Result<(FieldPath, Operator), ParseError> {
        let mut segments = vec![self.parse_segment()?];

        loop {
            let Some(token) = self.advance() else {
                return Err(ParseError::new(
                    "Expected operator, but reached end of input".to_string(),
                    None,
                ));
            };
            match &token.kind {
                TokenKind::Dot => segments.push(self.parse_segment()?),
                TokenKind::Operator(op) => {
                    let op = *op;
                    let field = FieldPath::new(segments)
                        .ok_or_else(|| ParseError::new("Empty field path".to_string(), None))?;
                    return Ok((field, op));
                }
                other => {
                    return Err(ParseError::at_position(
                        format!("Expected '.' or operator, found {:?}", other),
                        token.span,
                    ));
                }
            }
        }
    }

    fn parse_segment(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            Some(Token { kind: TokenKind::Segment(name), .. }) => Ok(name.to_string()),
            Some(token) => Err(ParseError::at_position(
                format!("Expected field name, found {:?}", token.kind),
                token.span,
            )),
            None => Err(ParseError::new(
                "Expected field name, but reached end of input".to_string(),
                None,
            )),
        }
    }

    fn parse_value(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            Some(Token { kind: TokenKind::Value(raw), span }) => {
                if raw.is_empty() {
                    return Err(ParseError::at_position("Missing value".to_string(), *span));
                }
                Ok(strip_quotes(raw).to_string())
            }
            Some(token) => Err(ParseError::at_position(
                format!("Expected value, found {:?}", token.kind),
                token.span,
            )),
            None => Err(ParseError::new("Missing value".to_string(), None)),
        }
    }
}
