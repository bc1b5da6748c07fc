use std::fmt;

use serde::Serialize;

use crate::db::types::{Column as ResultColumn, Value};

/// Schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parse `schema.table` or a bare table name with a fallback schema.
    pub fn parse(input: &str, default_schema: &str) -> Self {
        match input.split_once('.') {
            Some((schema, name)) => Self::new(schema.trim(), name.trim()),
            None => Self::new(default_schema, input.trim()),
        }
    }

    /// Bracket-quoted two-part name for use in generated SQL.
    pub fn qualified(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

pub fn quote_ident(input: &str) -> String {
    format!("[{}]", input.replace(']', "]]"))
}

/// Semantic grouping of SQL Server data types, driving how (or whether) a
/// column participates in checksum expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Numeric,
    FixedString,
    VariableString,
    Binary,
    Temporal,
    Spatial,
    Xml,
    LargeObject,
    Other,
}

impl TypeClass {
    /// Classify a type by its catalog name. `max_length` of -1 marks the
    /// MAX variants, which behave like large objects.
    pub fn from_sql_type(data_type: &str, max_length: i64) -> Self {
        match data_type.to_ascii_lowercase().as_str() {
            "int" | "bigint" | "smallint" | "tinyint" | "bit" | "decimal" | "numeric"
            | "money" | "smallmoney" | "float" | "real" => TypeClass::Numeric,
            "char" | "nchar" => TypeClass::FixedString,
            "varchar" | "nvarchar" if max_length == -1 => TypeClass::LargeObject,
            "varchar" | "nvarchar" | "sysname" => TypeClass::VariableString,
            "varbinary" if max_length == -1 => TypeClass::LargeObject,
            "binary" | "varbinary" | "timestamp" | "rowversion" => TypeClass::Binary,
            "date" | "datetime" | "datetime2" | "smalldatetime" | "time" | "datetimeoffset" => {
                TypeClass::Temporal
            }
            "geography" | "geometry" => TypeClass::Spatial,
            "xml" => TypeClass::Xml,
            "text" | "ntext" | "image" => TypeClass::LargeObject,
            _ => TypeClass::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeClass::Numeric => "numeric",
            TypeClass::FixedString => "fixed-string",
            TypeClass::VariableString => "variable-string",
            TypeClass::Binary => "binary",
            TypeClass::Temporal => "temporal",
            TypeClass::Spatial => "spatial",
            TypeClass::Xml => "xml",
            TypeClass::LargeObject => "large-object",
            TypeClass::Other => "other",
        }
    }

    /// How CHECKSUM handles the class. Character data goes through an MD5
    /// digest first; large objects, xml and spatial values are left out of
    /// the fingerprint entirely because the engine cannot checksum them.
    pub fn checksum_role(self) -> ChecksumRole {
        match self {
            TypeClass::FixedString | TypeClass::VariableString => ChecksumRole::Digest,
            TypeClass::Spatial | TypeClass::Xml | TypeClass::LargeObject => ChecksumRole::Excluded,
            _ => ChecksumRole::Direct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumRole {
    Direct,
    Digest,
    Excluded,
}

impl ChecksumRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ChecksumRole::Direct => "checksum",
            ChecksumRole::Digest => "md5+checksum",
            ChecksumRole::Excluded => "excluded",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub ordinal: i64,
    pub data_type: String,
    pub max_length: i64,
    pub precision: i64,
    pub scale: i64,
    pub is_nullable: bool,
    pub is_identity: bool,
    pub is_computed: bool,
    pub in_primary_key: bool,
}

impl Column {
    pub fn type_class(&self) -> TypeClass {
        TypeClass::from_sql_type(&self.data_type, self.max_length)
    }

    pub fn checksum_role(&self) -> ChecksumRole {
        self.type_class().checksum_role()
    }
}

/// Table metadata as reported by the schema catalog. Columns are kept in
/// ordinal order; the struct is never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub table: TableRef,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(table: TableRef, mut columns: Vec<Column>) -> Self {
        columns.sort_by_key(|col| col.ordinal);
        Self { table, columns }
    }

    pub fn primary_key(&self) -> Vec<&Column> {
        self.columns.iter().filter(|col| col.in_primary_key).collect()
    }

    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|col| col.in_primary_key)
    }
}

/// One row's alignment key and content digest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFingerprint {
    pub key: String,
    pub fingerprint: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

/// Everything fetched for one table in a single round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintSet {
    pub table: TableRef,
    /// Names of the value columns carried per row (details mode only).
    pub columns: Vec<ResultColumn>,
    pub rows: Vec<RowFingerprint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataComparison {
    pub is_identical: bool,
    pub added: Vec<RowFingerprint>,
    pub deleted: Vec<RowFingerprint>,
    pub updated: Vec<RowFingerprint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_columns: Vec<ResultColumn>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_columns: Vec<ResultColumn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, data_type: &str, max_length: i64, pk: bool) -> Column {
        Column {
            name: name.to_string(),
            ordinal: 0,
            data_type: data_type.to_string(),
            max_length,
            precision: 0,
            scale: 0,
            is_nullable: false,
            is_identity: false,
            is_computed: false,
            in_primary_key: pk,
        }
    }

    #[test]
    fn parses_table_refs() {
        assert_eq!(
            TableRef::parse("web.Orders", "dbo"),
            TableRef::new("web", "Orders")
        );
        assert_eq!(
            TableRef::parse("Orders", "dbo"),
            TableRef::new("dbo", "Orders")
        );
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("Orders"), "[Orders]");
        assert_eq!(quote_ident("odd]name"), "[odd]]name]");
        assert_eq!(
            TableRef::new("dbo", "Orders").qualified(),
            "[dbo].[Orders]"
        );
    }

    #[test]
    fn classifies_types() {
        assert_eq!(TypeClass::from_sql_type("int", 4), TypeClass::Numeric);
        assert_eq!(TypeClass::from_sql_type("NVarChar", 100), TypeClass::VariableString);
        assert_eq!(TypeClass::from_sql_type("nvarchar", -1), TypeClass::LargeObject);
        assert_eq!(TypeClass::from_sql_type("varbinary", -1), TypeClass::LargeObject);
        assert_eq!(TypeClass::from_sql_type("varbinary", 16), TypeClass::Binary);
        assert_eq!(TypeClass::from_sql_type("datetime2", 8), TypeClass::Temporal);
        assert_eq!(TypeClass::from_sql_type("geography", -1), TypeClass::Spatial);
        assert_eq!(TypeClass::from_sql_type("ntext", 16), TypeClass::LargeObject);
        assert_eq!(TypeClass::from_sql_type("hierarchyid", 892), TypeClass::Other);
    }

    #[test]
    fn maps_classes_to_checksum_roles() {
        assert_eq!(TypeClass::Numeric.checksum_role(), ChecksumRole::Direct);
        assert_eq!(TypeClass::FixedString.checksum_role(), ChecksumRole::Digest);
        assert_eq!(TypeClass::Xml.checksum_role(), ChecksumRole::Excluded);
        assert_eq!(TypeClass::LargeObject.checksum_role(), ChecksumRole::Excluded);
    }

    #[test]
    fn orders_columns_by_ordinal() {
        let mut second = column("b", "int", 4, false);
        second.ordinal = 2;
        let mut first = column("a", "int", 4, true);
        first.ordinal = 1;
        let table = Table::new(TableRef::new("dbo", "t"), vec![second, first]);
        assert_eq!(table.columns[0].name, "a");
        assert!(table.has_primary_key());
        assert_eq!(table.primary_key().len(), 1);
    }
}
