use std::fmt;

/// 一条已解析的过滤表达式, 例如：`metadata.jenkins.build>10`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpression {
    pub field: FieldPath,
    pub op: Operator,
    /// 去掉一层引号之后的原始值
    pub value: String,
}

/// 以 `.` 分隔的字段路径, 至少包含一个非空段
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// 从已经切分好的段构造路径, 空路径或空段返回 None
    pub fn new(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self(segments))
    }

    /// 解析点号路径, 例如 `"summary.passes"`
    pub fn parse(path: &str) -> Option<Self> {
        Self::new(path.split('.').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// 多段路径的第一段 (命名空间)；单段路径没有命名空间
    pub fn namespace(&self) -> Option<&str> {
        if self.0.len() > 1 {
            self.0.first().map(String::as_str)
        } else {
            None
        }
    }

    /// 规范形式：`data.` 前缀统一写作 `metadata.`
    pub fn canonical(&self) -> String {
        match self.namespace() {
            Some("data") => format!("metadata.{}", self.0[1..].join(".")),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// 过滤运算符, 每个运算符在 DSL 中都是单个字符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,     // =
    NotEq,  // !
    Gt,     // >
    Lt,     // <
    Gte,    // )
    Lte,    // (
    Regex,  // ~
    Like,   // %
    In,     // *
    Exists, // @
}

impl Operator {
    pub const ALL: [Operator; 10] = [
        Operator::Eq,
        Operator::NotEq,
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
        Operator::Regex,
        Operator::Like,
        Operator::In,
        Operator::Exists,
    ];

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '=' => Some(Operator::Eq),
            '!' => Some(Operator::NotEq),
            '>' => Some(Operator::Gt),
            '<' => Some(Operator::Lt),
            ')' => Some(Operator::Gte),
            '(' => Some(Operator::Lte),
            '~' => Some(Operator::Regex),
            '%' => Some(Operator::Like),
            '*' => Some(Operator::In),
            '@' => Some(Operator::Exists),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Eq => '=',
            Operator::NotEq => '!',
            Operator::Gt => '>',
            Operator::Lt => '<',
            Operator::Gte => ')',
            Operator::Lte => '(',
            Operator::Regex => '~',
            Operator::Like => '%',
            Operator::In => '*',
            Operator::Exists => '@',
        }
    }

    /// 是否为普通的标量比较 (`= ! > < ) (`)
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::NotEq | Operator::Gt | Operator::Lt | Operator::Gte | Operator::Lte
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_round_trip() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(Operator::from_symbol('&'), None);
    }

    #[test]
    fn test_field_path_rejects_empty_segments() {
        assert!(FieldPath::parse("metadata..tags").is_none());
        assert!(FieldPath::parse("").is_none());
        assert!(FieldPath::parse(".tags").is_none());
    }

    #[test]
    fn test_namespace_and_canonical() {
        let path = FieldPath::parse("data.tags").unwrap();
        assert_eq!(path.namespace(), Some("data"));
        assert_eq!(path.canonical(), "metadata.tags");

        let path = FieldPath::parse("result").unwrap();
        assert_eq!(path.namespace(), None);
        assert_eq!(path.canonical(), "result");

        let path = FieldPath::parse("summary.failures").unwrap();
        assert_eq!(path.canonical(), "summary.failures");
    }
}
