//! Evaluating parsed queries against JSON documents.
//!
//! A condition holds when any scalar reachable at its field path satisfies
//! it. Values only compare with operands of the same type, and a missing
//! field satisfies no condition, `neq` included.

use std::cmp::Ordering;

use serde_json::Value;

use super::parser::{Clause, Condition, Op, Query};
use crate::value::{lookup, Scalar};

impl Condition {
    /// Test one scalar against this condition.
    pub fn matches_scalar(&self, value: &Scalar<'_>) -> bool {
        let operand = self.operand.as_scalar();
        if self.op == Op::Cnt {
            return match (value, &operand) {
                (Scalar::Str(v), Scalar::Str(needle)) => v.contains(needle),
                _ => false,
            };
        }
        let Some(ord) = value.compare(&operand) else {
            return false;
        };
        match self.op {
            Op::Eq => ord == Ordering::Equal,
            Op::Neq => ord != Ordering::Equal,
            Op::Gt => ord == Ordering::Greater,
            Op::Gte => ord != Ordering::Less,
            Op::Lt => ord == Ordering::Less,
            Op::Lte => ord != Ordering::Greater,
            Op::Cnt => false,
        }
    }

    pub fn matches(&self, doc: &Value) -> bool {
        lookup(doc, &self.field)
            .iter()
            .any(|value| self.matches_scalar(value))
    }
}

impl Clause {
    pub fn matches(&self, doc: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}

impl Query {
    /// True if any clause matches `doc`.
    pub fn matches(&self, doc: &Value) -> bool {
        self.clauses.iter().any(|c| c.matches(doc))
    }
}
