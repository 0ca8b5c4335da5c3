use std::borrow::Cow;

/// Value of a single call argument as it was seen at capture time.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<ArgValue>),
    Map(Vec<(ArgValue, ArgValue)>),
    Object { type_name: String },
    Null,
    /// Value of a kind that has no summary (resources, handles, etc.).
    Opaque,
}

impl ArgValue {
    pub fn object(type_name: impl Into<String>) -> Self {
        ArgValue::Object {
            type_name: type_name.into(),
        }
    }

    /// One-word summary of the value, suitable for a call signature.
    pub fn summary(&self) -> Cow<'_, str> {
        match self {
            ArgValue::Bool(true) => Cow::Borrowed("true"),
            ArgValue::Bool(false) => Cow::Borrowed("false"),
            ArgValue::Int(i) => Cow::Owned(i.to_string()),
            ArgValue::Float(f) if f.is_nan() => Cow::Borrowed("NAN"),
            ArgValue::Float(f) if f.is_infinite() => {
                Cow::Borrowed(if f.is_sign_negative() { "-INF" } else { "INF" })
            }
            ArgValue::Float(f) => Cow::Owned(f.to_string()),
            ArgValue::Text(s) => Cow::Owned(format!("\"{s}\"")),
            ArgValue::List(_) | ArgValue::Map(_) => Cow::Borrowed("[Array]"),
            ArgValue::Object { type_name } => Cow::Owned(format!("[{type_name}]")),
            ArgValue::Null => Cow::Borrowed("NULL"),
            ArgValue::Opaque => Cow::Borrowed("[?]"),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        ArgValue::Int(value as i64)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Float(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(value: Vec<T>) -> Self {
        ArgValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ArgValue::Null)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_summary() {
        struct TestCase {
            value: ArgValue,
            expected: &'static str,
        }

        let cases = [
            TestCase {
                value: true.into(),
                expected: "true",
            },
            TestCase {
                value: false.into(),
                expected: "false",
            },
            TestCase {
                value: "hello".into(),
                expected: "\"hello\"",
            },
            TestCase {
                value: "say \"hi\"".into(),
                expected: "\"say \"hi\"\"",
            },
            TestCase {
                value: 42i64.into(),
                expected: "42",
            },
            TestCase {
                value: (-7i64).into(),
                expected: "-7",
            },
            TestCase {
                value: 1.5f64.into(),
                expected: "1.5",
            },
            TestCase {
                value: 2.0f64.into(),
                expected: "2",
            },
            TestCase {
                value: f64::NEG_INFINITY.into(),
                expected: "-INF",
            },
            TestCase {
                value: Vec::<ArgValue>::new().into(),
                expected: "[Array]",
            },
            TestCase {
                value: ArgValue::Map(vec![("k".into(), 1i64.into())]),
                expected: "[Array]",
            },
            TestCase {
                value: ArgValue::object("Foo"),
                expected: "[Foo]",
            },
            TestCase {
                value: None::<bool>.into(),
                expected: "NULL",
            },
            TestCase {
                value: ArgValue::Opaque,
                expected: "[?]",
            },
        ];

        for tc in cases {
            assert_eq!(tc.value.summary(), tc.expected);
        }
    }
}
