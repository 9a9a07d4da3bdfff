//! Rich-query parsing.
//!
//! A query is JSON: one object, or an array of objects. Each object is a
//! conjunction of field conditions and the array is a disjunction of its
//! objects. A field maps to one condition string or to an array of them.
//!
//! ```text
//! [ { "color": "eq red", "size": ["gte 2", "lt 5"] },
//!   { "owner.name": "cnt ann" } ]
//! ```
//!
//! A condition string is `<op> <operand>`. The operand is a string when
//! quoted, `true`/`false`/`null` as literals, a number when it parses as an
//! integer or a finite float, and a string otherwise. Integers keep their
//! exact value.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::value::{Num, Scalar};

/// Query parse failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("query is not valid JSON: {0}")]
    Malformed(String),

    #[error("query has no clauses")]
    Empty,

    #[error("query clause must be a JSON object")]
    ClauseNotObject,

    #[error("query clause {0} has no conditions")]
    EmptyClause(usize),

    #[error("field path {0:?} has an empty segment")]
    EmptyField(String),

    #[error("condition for {0:?} must be a string or an array of strings")]
    ConditionNotString(String),

    #[error("unknown operator {0:?}")]
    UnknownOperator(String),

    #[error("operator {0} needs an operand")]
    MissingOperand(Op),

    #[error("operator {op} cannot take operand {operand}")]
    OperandType { op: Op, operand: String },
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Substring match on strings.
    Cnt,
}

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Cnt => "cnt",
        }
    }

    /// True for `gt`, `gte`, `lt`, `lte`.
    pub fn is_range(self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(Self::Eq),
            "neq" => Ok(Self::Neq),
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Gte),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Lte),
            "cnt" => Ok(Self::Cnt),
            other => Err(QueryError::UnknownOperator(other.to_string())),
        }
    }
}

/// A typed operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Null,
    Bool(bool),
    Number(Num),
    String(String),
}

impl Operand {
    /// Type the raw operand text.
    pub fn parse(raw: &str) -> Self {
        for quote in ['\'', '"'] {
            if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
                return Self::String(raw[1..raw.len() - 1].to_string());
            }
        }
        match raw {
            "null" => Self::Null,
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => match parse_number(raw) {
                Some(n) => Self::Number(n),
                None => Self::String(raw.to_string()),
            },
        }
    }

    pub fn as_scalar(&self) -> Scalar<'_> {
        match self {
            Self::Null => Scalar::Null,
            Self::Bool(b) => Scalar::Bool(*b),
            Self::Number(n) => Scalar::Number(*n),
            Self::String(s) => Scalar::Str(s),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{:?}", s),
        }
    }
}

fn parse_number(raw: &str) -> Option<Num> {
    if let Ok(i) = raw.parse::<i64>() {
        return Some(Num::Int(i.into()));
    }
    if let Ok(u) = raw.parse::<u64>() {
        return Some(Num::Int(u.into()));
    }
    raw.parse::<f64>().ok().filter(|n| n.is_finite()).map(Num::Float)
}

/// One field condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Op,
    pub operand: Operand,
}

impl Condition {
    /// Parse `<op> <operand>` for `field`.
    pub fn parse(field: &str, text: &str) -> Result<Self, QueryError> {
        let text = text.trim();
        let (op, operand) = match text.split_once(char::is_whitespace) {
            Some((op, rest)) => (op.parse::<Op>()?, rest.trim()),
            None => (text.parse::<Op>()?, ""),
        };
        if operand.is_empty() {
            return Err(QueryError::MissingOperand(op));
        }
        let operand = Operand::parse(operand);

        let valid = match (&operand, op) {
            (Operand::String(_), _) => true,
            (Operand::Number(_), Op::Cnt) => false,
            (Operand::Number(_), _) => true,
            (Operand::Null | Operand::Bool(_), Op::Eq | Op::Neq) => true,
            (Operand::Null | Operand::Bool(_), _) => false,
        };
        if !valid {
            return Err(QueryError::OperandType {
                op,
                operand: operand.to_string(),
            });
        }

        Ok(Self {
            field: field.to_string(),
            op,
            operand,
        })
    }
}

/// A conjunction of conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub conditions: Vec<Condition>,
}

/// A disjunction of clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub clauses: Vec<Clause>,
}

impl Query {
    /// Parse a query string.
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| QueryError::Malformed(err.to_string()))?;
        let objects = match value {
            Value::Array(items) => items,
            obj @ Value::Object(_) => vec![obj],
            _ => return Err(QueryError::ClauseNotObject),
        };
        if objects.is_empty() {
            return Err(QueryError::Empty);
        }

        let clauses = objects
            .iter()
            .enumerate()
            .map(|(idx, obj)| match obj {
                Value::Object(map) => parse_clause(idx, map),
                _ => Err(QueryError::ClauseNotObject),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { clauses })
    }
}

impl FromStr for Query {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_clause(idx: usize, map: &Map<String, Value>) -> Result<Clause, QueryError> {
    if map.is_empty() {
        return Err(QueryError::EmptyClause(idx));
    }
    let mut conditions = Vec::with_capacity(map.len());
    for (field, condition) in map {
        if field.split('.').any(str::is_empty) {
            return Err(QueryError::EmptyField(field.clone()));
        }
        match condition {
            Value::String(text) => conditions.push(Condition::parse(field, text)?),
            Value::Array(items) if !items.is_empty() => {
                for item in items {
                    let text = item
                        .as_str()
                        .ok_or_else(|| QueryError::ConditionNotString(field.clone()))?;
                    conditions.push(Condition::parse(field, text)?);
                }
            }
            _ => return Err(QueryError::ConditionNotString(field.clone())),
        }
    }
    Ok(Clause { conditions })
}
