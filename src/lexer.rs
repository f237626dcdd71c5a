//! 过滤表达式的词法分析器
//!
//! 运算符之前按字段路径分词 (段、点号)；遇到第一个运算符之后,
//! 剩余的全部文本作为一个 `Value` token 原样输出, 不做任何转义或空白处理。

use crate::ast::Operator;
use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    /// 输入字符串中的当前位置（字节索引）
    position: usize,
    /// 是否已经读到运算符
    seen_operator: bool,
    /// 值 token 是否已经输出
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            seen_operator: false,
            done: false,
        }
    }

    /// 返回当前位置的字符，不推进位置
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// 推进位置一个字符并返回该字符
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    /// 读取字段路径中的一个段
    /// 段可以包含字母、数字、连字符和下划线
    fn read_segment(&mut self, start: usize) -> Token<'a> {
        while let Some(c) = self.peek() {
            if is_segment_char(c) {
                self.bump();
            } else {
                break;
            }
        }
        Token {
            kind: TokenKind::Segment(&self.input[start..self.position]),
            span: Span::new(start, self.position),
        }
    }

    /// 读取运算符之后的全部剩余文本
    fn read_value(&mut self) -> Token<'a> {
        let start = self.position;
        self.position = self.input.len();
        self.done = true;
        Token {
            kind: TokenKind::Value(&self.input[start..]),
            span: Span::new(start, self.position),
        }
    }
}

fn is_segment_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.seen_operator {
            return Some(self.read_value());
        }

        let start = self.position;
        let Some(c) = self.bump() else {
            return None; // 到达输入末尾
        };

        let token = match c {
            '.' => Token { kind: TokenKind::Dot, span: Span::new(start, self.position) },
            c if is_segment_char(c) => self.read_segment(start),
            c => match Operator::from_symbol(c) {
                Some(op) => {
                    self.seen_operator = true;
                    Token { kind: TokenKind::Operator(op), span: Span::new(start, self.position) }
                }
                None => Token { kind: TokenKind::Illegal, span: Span::new(start, self.position) },
            },
        };
        Some(token)
    }
}
