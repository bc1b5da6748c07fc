use crate::compare::Column;

/// Render a column's declared type as it would appear in DDL, e.g.
/// `nvarchar(50)`, `decimal(18, 2)`, `varbinary(MAX)`.
pub fn render_sql_type(column: &Column) -> String {
    let name = column.data_type.to_ascii_lowercase();
    match name.as_str() {
        // max_length comes from the catalog in bytes.
        "char" | "varchar" | "binary" | "varbinary" => with_length(&name, column.max_length, 1),
        "nchar" | "nvarchar" => with_length(&name, column.max_length, 2),
        "decimal" | "numeric" => format!("{}({}, {})", name, column.precision, column.scale),
        "time" | "datetime2" | "datetimeoffset" => format!("{}({})", name, column.scale),
        _ => name,
    }
}

fn with_length(name: &str, max_length: i64, bytes_per_char: i64) -> String {
    if max_length < 0 {
        format!("{}(MAX)", name)
    } else {
        format!("{}({})", name, max_length / bytes_per_char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(data_type: &str, max_length: i64, precision: i64, scale: i64) -> Column {
        Column {
            name: "c".to_string(),
            ordinal: 1,
            data_type: data_type.to_string(),
            max_length,
            precision,
            scale,
            is_nullable: false,
            is_identity: false,
            is_computed: false,
            in_primary_key: false,
        }
    }

    #[test]
    fn renders_plain_types() {
        assert_eq!(render_sql_type(&column("int", 4, 10, 0)), "int");
        assert_eq!(render_sql_type(&column("uniqueidentifier", 16, 0, 0)), "uniqueidentifier");
    }

    #[test]
    fn renders_length_types() {
        assert_eq!(render_sql_type(&column("varchar", 50, 0, 0)), "varchar(50)");
        // nvarchar lengths are byte counts in the catalog
        assert_eq!(render_sql_type(&column("nvarchar", 100, 0, 0)), "nvarchar(50)");
        assert_eq!(render_sql_type(&column("nvarchar", -1, 0, 0)), "nvarchar(MAX)");
        assert_eq!(render_sql_type(&column("varbinary", -1, 0, 0)), "varbinary(MAX)");
    }

    #[test]
    fn renders_precision_and_scale_types() {
        assert_eq!(render_sql_type(&column("decimal", 9, 18, 2)), "decimal(18, 2)");
        assert_eq!(render_sql_type(&column("datetime2", 8, 27, 7)), "datetime2(7)");
    }
}
