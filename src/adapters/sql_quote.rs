// SQL識別子クォートユーティリティ
//
// MySQL用の識別子・リテラルのクォート関数を提供します。
// sql_generatorとサービス層の両方から使用される共有モジュールです。

/// MySQL用識別子クォート（バッククォート）
///
/// 識別子内のバッククォートは二重にエスケープします。
///
/// # Examples
/// ```
/// use lucid_schema::adapters::sql_quote::quote_identifier_mysql;
/// assert_eq!(quote_identifier_mysql("user"), "`user`");
/// assert_eq!(quote_identifier_mysql("table`name"), "`table``name`");
/// ```
pub fn quote_identifier_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// カラム名リストをクォートしてカンマ区切りで結合（区切りに空白なし）
///
/// `PRIMARY KEY (`a`,`b`)` の形式で使用します。
pub fn quote_columns_mysql(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier_mysql(c))
        .collect::<Vec<_>>()
        .join(",")
}

/// インデックス名を生成（IDX_<column>）
pub fn index_name(column: &str) -> String {
    format!("IDX_{}", column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_mysql_simple() {
        assert_eq!(quote_identifier_mysql("user"), "`user`");
        assert_eq!(quote_identifier_mysql("user_to_role"), "`user_to_role`");
    }

    #[test]
    fn test_quote_identifier_mysql_reserved_word() {
        assert_eq!(quote_identifier_mysql("order"), "`order`");
        assert_eq!(quote_identifier_mysql("group"), "`group`");
    }

    #[test]
    fn test_quote_identifier_mysql_with_embedded_backtick() {
        // バッククォートを含む識別子は二重にエスケープ
        assert_eq!(quote_identifier_mysql("table`name"), "`table``name`");
        assert_eq!(quote_identifier_mysql("`"), "````");
    }

    #[test]
    fn test_quote_identifier_mysql_empty() {
        assert_eq!(quote_identifier_mysql(""), "``");
    }

    #[test]
    fn test_quote_columns_mysql() {
        let columns = vec!["user_id".to_string(), "role_id".to_string()];
        assert_eq!(quote_columns_mysql(&columns), "`user_id`,`role_id`");
    }

    #[test]
    fn test_quote_columns_mysql_single() {
        assert_eq!(quote_columns_mysql(&["id".to_string()]), "`id`");
    }

    #[test]
    fn test_index_name() {
        assert_eq!(index_name("user_id"), "IDX_user_id");
    }
}
