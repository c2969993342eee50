// MySQL用SQLジェネレーター
//
// コンパイル済みのスキーマ要素からMySQL用のDDL文を生成します。

use crate::adapters::sql_generator::SqlGenerator;
use crate::adapters::sql_quote::{index_name, quote_columns_mysql, quote_identifier_mysql};
use crate::adapters::type_mapping::ResolvedType;
use crate::core::config::SchemaDefaults;
use crate::core::schema::ConstraintDefinition;

/// MySQL用SQLジェネレーター
#[derive(Debug, Clone, Default)]
pub struct MysqlSqlGenerator {}

impl MysqlSqlGenerator {
    /// 新しいMysqlSqlGeneratorを作成
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlGenerator for MysqlSqlGenerator {
    fn generate_column_definition(
        &self,
        name: &str,
        resolved: &ResolvedType,
        collate: &str,
    ) -> String {
        let definition = &resolved.definition;
        let mut sql = format!(
            "{} {}",
            quote_identifier_mysql(name),
            resolved.type_with_length()
        );

        // 文字列型のみ照合順序を付与
        if resolved.abstract_type.is_collatable() {
            sql.push_str(&format!(" COLLATE {}", collate));
        }

        if definition.unsigned == Some(true) {
            sql.push_str(" unsigned");
        }

        // true: DEFAULT NULL / false: NOT NULL
        match definition.null {
            Some(true) => sql.push_str(" DEFAULT NULL"),
            Some(false) => sql.push_str(" NOT NULL"),
            None => {}
        }

        if let Some(ref default) = definition.default {
            sql.push_str(&format!(" DEFAULT {}", default.to_sql_literal()));
        }

        if definition.is_autoinc() {
            sql.push_str(" AUTO_INCREMENT");
        }

        sql
    }

    fn generate_index(&self, column: &str, unique: bool) -> String {
        format!(
            "{} {} ({})",
            if unique { "UNIQUE KEY" } else { "KEY" },
            quote_identifier_mysql(&index_name(column)),
            quote_identifier_mysql(column)
        )
    }

    fn generate_primary_key(&self, columns: &[String]) -> String {
        format!("PRIMARY KEY ({})", quote_columns_mysql(columns))
    }

    fn generate_create_table(
        &self,
        table_name: &str,
        body: &[String],
        options: &SchemaDefaults,
        auto_increment: bool,
    ) -> String {
        let lines = body
            .iter()
            .map(|line| format!("  {}", line))
            .collect::<Vec<_>>()
            .join(",\n");

        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n) ENGINE={} DEFAULT CHARSET={} COLLATE={}",
            quote_identifier_mysql(table_name),
            lines,
            options.engine,
            options.charset,
            options.collate
        );

        if auto_increment {
            sql.push_str(" AUTO_INCREMENT=1");
        }

        sql.push_str(";\n");
        sql
    }

    fn generate_drop_table(&self, table_name: &str) -> String {
        format!("DROP TABLE IF EXISTS {};", quote_identifier_mysql(table_name))
    }

    fn generate_add_constraints(
        &self,
        table_name: &str,
        constraints: &[(&ConstraintDefinition, String)],
    ) -> String {
        let clauses = constraints
            .iter()
            .map(|(constraint, reference_table)| {
                format!(
                    "  ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {} ON UPDATE {}",
                    quote_identifier_mysql(&constraint.name),
                    quote_identifier_mysql(&constraint.fields),
                    quote_identifier_mysql(reference_table),
                    quote_identifier_mysql(&constraint.reference_fields),
                    constraint.on_delete,
                    constraint.on_update
                )
            })
            .collect::<Vec<_>>()
            .join(",\n");

        format!(
            "ALTER TABLE {}\n{};\n",
            quote_identifier_mysql(table_name),
            clauses
        )
    }

    fn generate_drop_constraints(&self, table_name: &str, constraint_names: &[String]) -> String {
        let clauses = constraint_names
            .iter()
            .map(|name| format!(" DROP FOREIGN KEY {}", quote_identifier_mysql(name)))
            .collect::<Vec<_>>()
            .join(",\n");

        format!("ALTER TABLE {}\n{};", quote_identifier_mysql(table_name), clauses)
    }

    fn generate_foreign_key_checks(&self, enabled: bool) -> String {
        format!("SET FOREIGN_KEY_CHECKS={};", u8::from(enabled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::type_mapping::TypeMappingService;
    use crate::core::schema::{FieldDefinition, LengthSpec, ReferentialAction};

    fn column(name: &str, field: FieldDefinition) -> String {
        let resolved = TypeMappingService::default().resolve(&field).unwrap();
        MysqlSqlGenerator::new().generate_column_definition(name, &resolved, "utf8_general_ci")
    }

    #[test]
    fn test_primary_key_column() {
        assert_eq!(
            column("id", FieldDefinition::primary_key_default()),
            "`id` INT(11) unsigned NOT NULL AUTO_INCREMENT"
        );
    }

    #[test]
    fn test_string_column_with_collation() {
        assert_eq!(
            column("title", FieldDefinition::new("string").nullable(false)),
            "`title` VARCHAR(255) COLLATE utf8_general_ci NOT NULL"
        );
    }

    #[test]
    fn test_boolean_column() {
        assert_eq!(
            column("active", FieldDefinition::new("boolean")),
            "`active` TINYINT(1) unsigned NOT NULL DEFAULT '0'"
        );
    }

    #[test]
    fn test_nullable_datetime_column() {
        assert_eq!(
            column("created", FieldDefinition::nullable_datetime()),
            "`created` DATETIME DEFAULT NULL"
        );
    }

    #[test]
    fn test_text_modifier_column() {
        assert_eq!(
            column(
                "body",
                FieldDefinition::new("text").with_length(LengthSpec::Modifier("long".to_string()))
            ),
            "`body` LONGTEXT COLLATE utf8_general_ci"
        );
    }

    #[test]
    fn test_generate_index() {
        let generator = MysqlSqlGenerator::new();

        assert_eq!(
            generator.generate_index("user_id", false),
            "KEY `IDX_user_id` (`user_id`)"
        );
        assert_eq!(
            generator.generate_index("email", true),
            "UNIQUE KEY `IDX_email` (`email`)"
        );
    }

    #[test]
    fn test_generate_create_table() {
        let generator = MysqlSqlGenerator::new();
        let body = vec![
            "`id` INT(11) unsigned NOT NULL AUTO_INCREMENT".to_string(),
            generator.generate_primary_key(&["id".to_string()]),
        ];

        let sql = generator.generate_create_table("user", &body, &SchemaDefaults::default(), true);

        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS `user` (\n\
             \x20 `id` INT(11) unsigned NOT NULL AUTO_INCREMENT,\n\
             \x20 PRIMARY KEY (`id`)\n\
             ) ENGINE=InnoDB DEFAULT CHARSET=utf8 COLLATE=utf8_general_ci AUTO_INCREMENT=1;\n"
        );
    }

    #[test]
    fn test_generate_add_constraints() {
        let generator = MysqlSqlGenerator::new();
        let constraint = ConstraintDefinition {
            name: "FK_ABC".to_string(),
            fields: "user_id".to_string(),
            reference_table: "user".to_string(),
            reference_fields: "id".to_string(),
            on_delete: ReferentialAction::Cascade,
            on_update: ReferentialAction::NoAction,
        };

        let sql = generator.generate_add_constraints("post", &[(&constraint, "user".to_string())]);

        assert_eq!(
            sql,
            "ALTER TABLE `post`\n  ADD CONSTRAINT `FK_ABC` FOREIGN KEY (`user_id`) REFERENCES `user` (`id`) ON DELETE CASCADE ON UPDATE NO ACTION;\n"
        );
    }

    #[test]
    fn test_generate_drop_constraints() {
        let generator = MysqlSqlGenerator::new();
        let sql = generator
            .generate_drop_constraints("post", &["FK_A".to_string(), "FK_B".to_string()]);

        assert_eq!(
            sql,
            "ALTER TABLE `post`\n DROP FOREIGN KEY `FK_A`,\n DROP FOREIGN KEY `FK_B`;"
        );
    }

    #[test]
    fn test_foreign_key_checks_and_banner() {
        let generator = MysqlSqlGenerator::new();

        assert_eq!(
            generator.generate_foreign_key_checks(false),
            "SET FOREIGN_KEY_CHECKS=0;"
        );
        assert_eq!(
            generator.generate_foreign_key_checks(true),
            "SET FOREIGN_KEY_CHECKS=1;"
        );
        assert_eq!(
            generator.generate_banner("Table structure for table `user`"),
            vec!["--", "-- Table structure for table `user`", "--"]
        );
    }
}
