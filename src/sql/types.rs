//! SQL to target type mapping.

use std::fmt;
use std::str::FromStr;

/// Semantic type a column value takes in generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    Integer,
    Text,
    Binary,
    Floating,
    /// Integer or float, decided per value by the storage engine.
    Numeric,
    Boolean,
    Date,
    Time,
    DateTime,
    Decimal,
}

impl TargetType {
    pub const ALL: [TargetType; 10] = [
        TargetType::Integer,
        TargetType::Text,
        TargetType::Binary,
        TargetType::Floating,
        TargetType::Numeric,
        TargetType::Boolean,
        TargetType::Date,
        TargetType::Time,
        TargetType::DateTime,
        TargetType::Decimal,
    ];

    /// Name used in query placeholders, e.g. `{id int}`.
    pub fn name(self) -> &'static str {
        match self {
            TargetType::Integer => "int",
            TargetType::Text => "str",
            TargetType::Binary => "bytes",
            TargetType::Floating => "float",
            TargetType::Numeric => "numeric",
            TargetType::Boolean => "bool",
            TargetType::Date => "date",
            TargetType::Time => "time",
            TargetType::DateTime => "datetime",
            TargetType::Decimal => "decimal",
        }
    }

    /// Rust type in generated code.
    pub fn rust_type(self) -> &'static str {
        match self {
            TargetType::Integer => "i64",
            TargetType::Text => "String",
            TargetType::Binary => "Vec<u8>",
            TargetType::Floating => "f64",
            TargetType::Numeric => "Numeric",
            TargetType::Boolean => "bool",
            TargetType::Date => "NaiveDate",
            TargetType::Time => "NaiveTime",
            TargetType::DateTime => "NaiveDateTime",
            TargetType::Decimal => "Decimal",
        }
    }

    /// Conversion needed between the generated type and its stored form.
    pub fn conversion(self) -> Option<Conversion> {
        match self {
            TargetType::Date => Some(Conversion::Date),
            TargetType::Time => Some(Conversion::Time),
            TargetType::DateTime => Some(Conversion::DateTime),
            TargetType::Decimal => Some(Conversion::Decimal),
            _ => None,
        }
    }
}

/// A target type plus nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnType {
    pub base: TargetType,
    pub nullable: bool,
}

impl ColumnType {
    pub fn new(base: TargetType, nullable: bool) -> Self {
        Self { base, nullable }
    }

    pub fn rust_type(&self) -> String {
        if self.nullable {
            format!("Option<{}>", self.base.rust_type())
        } else {
            self.base.rust_type().to_string()
        }
    }

    pub fn conversion(&self) -> Option<Conversion> {
        self.base.conversion()
    }
}

/// Renders as a placeholder type: `int` or `Option<int>`.
impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "Option<{}>", self.base.name())
        } else {
            f.write_str(self.base.name())
        }
    }
}

impl FromStr for ColumnType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (inner, nullable) = match s.strip_prefix("Option<").and_then(|r| r.strip_suffix('>')) {
            Some(inner) => (inner.trim(), true),
            None => (s, false),
        };
        TargetType::ALL
            .into_iter()
            .find(|t| t.name() == inner)
            .map(|base| ColumnType::new(base, nullable))
            .ok_or(())
    }
}

/// Converter family applied when a value crosses the storage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    Date,
    Time,
    DateTime,
    Decimal,
}

impl Conversion {
    pub const ALL: [Conversion; 4] = [
        Conversion::Date,
        Conversion::Time,
        Conversion::DateTime,
        Conversion::Decimal,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Conversion::Date => "date",
            Conversion::Time => "time",
            Conversion::DateTime => "datetime",
            Conversion::Decimal => "decimal",
        }
    }

    /// `date_to_sql` or `optional_date_to_sql`.
    pub fn to_sql_fn(self, nullable: bool) -> String {
        converter_name(self.tag(), "to_sql", nullable)
    }

    /// `date_from_sql` or `optional_date_from_sql`.
    pub fn from_sql_fn(self, nullable: bool) -> String {
        converter_name(self.tag(), "from_sql", nullable)
    }
}

fn converter_name(tag: &str, direction: &str, nullable: bool) -> String {
    if nullable {
        format!("optional_{tag}_{direction}")
    } else {
        format!("{tag}_{direction}")
    }
}

const INTEGER_TYPES: &[&str] = &[
    "INT",
    "INTEGER",
    "TINYINT",
    "SMALLINT",
    "MEDIUMINT",
    "BIGINT",
    "INT2",
    "INT8",
    "UNSIGNED BIG INT",
];
const TEXT_TYPES: &[&str] = &[
    "CHAR",
    "CHARACTER",
    "NCHAR",
    "NVARCHAR",
    "VARCHAR",
    "TEXT",
    "CLOB",
    "VARYING CHARACTER",
    "NATIVE CHARACTER",
];
const BINARY_TYPES: &[&str] = &["BLOB", "VARBINARY", "BINARY"];
const FLOAT_TYPES: &[&str] = &["REAL", "DOUBLE", "DOUBLE PRECISION", "FLOAT"];

/// Map a declared SQL type to its target type, ignoring case and size
/// arguments. Returns `None` for unmapped types.
pub fn map_type(sql_type: &str) -> Option<TargetType> {
    let upper = sql_type.to_uppercase();
    let base = upper.split('(').next().unwrap_or(&upper);
    let base = base.split_whitespace().collect::<Vec<_>>().join(" ");
    let base = base.as_str();

    let target = match base {
        t if INTEGER_TYPES.contains(&t) => TargetType::Integer,
        t if TEXT_TYPES.contains(&t) => TargetType::Text,
        t if BINARY_TYPES.contains(&t) => TargetType::Binary,
        t if FLOAT_TYPES.contains(&t) => TargetType::Floating,
        "NUMERIC" => TargetType::Numeric,
        "BOOLEAN" | "BOOL" => TargetType::Boolean,
        "DATE" => TargetType::Date,
        "TIME" => TargetType::Time,
        "DATETIME" | "TIMESTAMP" => TargetType::DateTime,
        "DECIMAL" => TargetType::Decimal,
        _ => return None,
    };
    Some(target)
}

/// True when the declared type belongs to the integer family.
pub fn is_integer_type(sql_type: &str) -> bool {
    map_type(sql_type) == Some(TargetType::Integer)
}
