/// スキーマコンパイラーのテスト
///
/// 宣言的なスキーマ定義から、PK・中間テーブル・外部キーを解決した
/// コンパイル済みスキーマとMySQLのDDLスクリプトが生成されることを確認します。

#[cfg(test)]
mod schema_compiler_tests {
    use lucid_schema::core::config::SchemaDefaults;
    use lucid_schema::core::error::CompileError;
    use lucid_schema::core::schema::{
        CascadePolicy, DefaultValue, FieldDefinition, LengthSpec, ReferentialAction,
        RelationDefinition, Schema, SchemaOptions, TableDefinition, TableOptions,
    };
    use lucid_schema::services::foreign_key_resolver::ConstraintNamer;
    use lucid_schema::services::schema_compiler::{is_comment, SchemaCompiler};

    fn compiler() -> SchemaCompiler {
        SchemaCompiler::new(SchemaDefaults::default())
            .with_constraint_namer(ConstraintNamer::seeded(42))
    }

    fn user_role_schema() -> Schema {
        let mut schema = Schema::new();
        schema.add_table(
            "user",
            TableDefinition::new()
                .with_field("name", FieldDefinition::new("string").with_length(LengthSpec::Size(100)))
                .many_to_many("role", RelationDefinition::new()),
        );
        schema.add_table(
            "role",
            TableDefinition::new()
                .with_field("name", FieldDefinition::new("string").with_length(LengthSpec::Size(50)))
                .many_to_many("user", RelationDefinition::new()),
        );
        schema
    }

    fn user_post_schema() -> Schema {
        let mut schema = Schema::new();
        schema.add_table(
            "user",
            TableDefinition::new()
                .with_field("name", FieldDefinition::new("string"))
                .has_many("post", RelationDefinition::new().cascade(CascadePolicy::Cascade)),
        );
        schema.add_table(
            "post",
            TableDefinition::new()
                .with_field("title", FieldDefinition::new("string"))
                .belongs_to("user"),
        );
        schema
    }

    /// 明示的なPKがないテーブルには既定のidが付与される
    #[test]
    fn test_default_primary_key() {
        let mut schema = Schema::new();
        schema.add_table(
            "category",
            TableDefinition::new().with_field("name", FieldDefinition::new("string")),
        );

        let compiled = compiler().compile(schema).unwrap();

        let pk = &compiled.schema.primary_keys()["category"];
        assert_eq!(pk.keys().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(pk["id"], FieldDefinition::primary_key_default());

        let table = &compiled.schema.tables["category"];
        assert_eq!(
            table.fields.keys().collect::<Vec<_>>(),
            vec!["id", "name", "created", "updated", "deleted"]
        );

        let create = compiled
            .statements
            .iter()
            .find(|sql| sql.starts_with("CREATE TABLE"))
            .unwrap();
        assert_eq!(
            create,
            "CREATE TABLE IF NOT EXISTS `category` (\n  \
             `id` INT(11) unsigned NOT NULL AUTO_INCREMENT,\n  \
             `name` VARCHAR(255) COLLATE utf8_general_ci,\n  \
             `created` DATETIME DEFAULT NULL,\n  \
             `updated` DATETIME DEFAULT NULL,\n  \
             `deleted` DATETIME DEFAULT NULL,\n  \
             PRIMARY KEY (`id`)\n\
             ) ENGINE=InnoDB DEFAULT CHARSET=utf8 COLLATE=utf8_general_ci AUTO_INCREMENT=1;\n"
        );
    }

    /// user/role の多対多から中間テーブル user_to_role が生成される
    #[test]
    fn test_user_role_pivot() {
        let compiled = compiler().compile(user_role_schema()).unwrap();
        let schema = &compiled.schema;

        assert!(schema.has_table("user_to_role"));
        assert!(!schema.has_table("role_to_user"));

        let pivot = &schema.tables["user_to_role"];
        assert!(pivot.is_pivot());
        assert_eq!(
            pivot.fields.keys().collect::<Vec<_>>(),
            vec!["user_id", "role_id"]
        );
        assert_eq!(
            schema.primary_keys()["user_to_role"]
                .keys()
                .collect::<Vec<_>>(),
            vec!["user_id", "role_id"]
        );

        let constraints = &schema.constraints()["user_to_role"];
        assert_eq!(constraints.len(), 2);
        for constraint in constraints.values() {
            assert_eq!(constraint.on_delete, ReferentialAction::Restrict);
            assert_eq!(constraint.on_update, ReferentialAction::NoAction);
            assert_eq!(constraint.reference_fields, "id");
            assert!(constraint.name.starts_with("FK_"));
            assert_eq!(constraint.name.len(), 18);
        }
        assert_eq!(constraints["user_id"].reference_table, "user");
        assert_eq!(constraints["role_id"].reference_table, "role");

        let create = compiled
            .statements
            .iter()
            .find(|sql| sql.starts_with("CREATE TABLE IF NOT EXISTS `user_to_role`"))
            .unwrap();
        assert!(create.contains("`user_id` INT(11) unsigned NOT NULL,\n"));
        assert!(create.contains("`role_id` INT(11) unsigned NOT NULL,\n"));
        assert!(create.contains("KEY `IDX_user_id` (`user_id`)"));
        assert!(create.contains("KEY `IDX_role_id` (`role_id`)"));
        assert!(create.contains("PRIMARY KEY (`user_id`,`role_id`)"));
        assert!(!create.contains("AUTO_INCREMENT"));
        assert!(!create.contains("`created`"));

        let alter = compiled
            .statements
            .iter()
            .find(|sql| sql.starts_with("ALTER TABLE `user_to_role`"))
            .unwrap();
        assert_eq!(
            alter.matches("ON DELETE RESTRICT ON UPDATE NO ACTION").count(),
            2
        );
    }

    /// 1:m cascade: true を持つ m:1 は ON DELETE CASCADE になる
    #[test]
    fn test_many_to_one_with_cascade() {
        let compiled = compiler().compile(user_post_schema()).unwrap();
        let schema = &compiled.schema;

        let user_id = &schema.tables["post"].fields["user_id"];
        assert_eq!(user_id.field_type, "int");
        assert_eq!(user_id.autoinc, None);
        assert_eq!(user_id.null, Some(true));
        assert_eq!(
            schema.tables["post"].fields.keys().collect::<Vec<_>>(),
            vec!["id", "user_id", "title", "created", "updated", "deleted"]
        );

        let constraint = &schema.constraints()["post"]["user_id"];
        assert_eq!(constraint.on_delete, ReferentialAction::Cascade);
        assert_eq!(constraint.reference_table, "user");

        let alter = compiled
            .statements
            .iter()
            .find(|sql| sql.starts_with("ALTER TABLE `post`"))
            .unwrap();
        assert!(alter.contains(
            "FOREIGN KEY (`user_id`) REFERENCES `user` (`id`) ON DELETE CASCADE ON UPDATE NO ACTION"
        ));

        let create = compiled
            .statements
            .iter()
            .find(|sql| sql.starts_with("CREATE TABLE IF NOT EXISTS `post`"))
            .unwrap();
        assert!(create.contains("`user_id` INT(11) unsigned DEFAULT NULL,\n"));
        assert!(create.contains("KEY `IDX_user_id` (`user_id`)"));
    }

    /// 既定値を持つ外部キーはNOT NULLになる
    #[test]
    fn test_foreign_key_with_default_is_not_null() {
        let mut schema = Schema::new();
        schema.add_table(
            "user",
            TableDefinition::new().with_field("name", FieldDefinition::new("string")),
        );
        schema.add_table(
            "profile",
            TableDefinition::new().has_one("user", RelationDefinition::new().with_default(1i64)),
        );

        let compiled = compiler().compile(schema).unwrap();

        let user_id = &compiled.schema.tables["profile"].fields["user_id"];
        assert_eq!(user_id.null, Some(false));
        assert_eq!(user_id.default, Some(DefaultValue::Integer(1)));
    }

    /// 外部キーかつユニークなフィールドはUNIQUE KEYが1行だけ出力される
    #[test]
    fn test_unique_foreign_key_has_single_index() {
        let mut schema = Schema::new();
        schema.add_table(
            "user",
            TableDefinition::new().with_field("name", FieldDefinition::new("string")),
        );
        schema.add_table(
            "profile",
            TableDefinition::new().has_one("user", RelationDefinition::new().unique()),
        );

        let compiled = compiler().compile(schema).unwrap();

        let create = compiled
            .statements
            .iter()
            .find(|sql| sql.starts_with("CREATE TABLE IF NOT EXISTS `profile`"))
            .unwrap();
        assert!(create.contains("  UNIQUE KEY `IDX_user_id` (`user_id`)"));
        assert_eq!(create.matches("`IDX_user_id`").count(), 1);
    }

    /// uniqueを宣言したカラムにはUNIQUE KEYが付く
    #[test]
    fn test_declared_unique_column_index() {
        let mut schema = Schema::new();
        schema.add_table(
            "account",
            TableDefinition::new()
                .with_field("email", FieldDefinition::new("string").unique())
                .with_field("nickname", FieldDefinition::new("string")),
        );

        let compiled = compiler().compile(schema).unwrap();

        let create = compiled
            .statements
            .iter()
            .find(|sql| sql.starts_with("CREATE TABLE IF NOT EXISTS `account`"))
            .unwrap();
        assert!(create.contains("  UNIQUE KEY `IDX_email` (`email`),\n"));
        assert!(!create.contains("IDX_nickname"));
    }

    /// 未対応の型のカラムだけを除いてCREATE TABLEを出力する
    #[test]
    fn test_unsupported_column_is_skipped() {
        let mut schema = Schema::new();
        schema.add_table(
            "place",
            TableDefinition::new()
                .with_field("name", FieldDefinition::new("string"))
                .with_field("shape", FieldDefinition::new("geometry").unique()),
        );
        schema.add_table(
            "zone",
            TableDefinition::new().with_field("code", FieldDefinition::new("char")),
        );

        let compiled = compiler().compile(schema).unwrap();

        let create = compiled
            .statements
            .iter()
            .find(|sql| sql.starts_with("CREATE TABLE IF NOT EXISTS `place`"))
            .unwrap();
        assert!(create.contains("`name` VARCHAR(255) COLLATE utf8_general_ci,\n"));
        assert!(!create.contains("shape"));
        assert!(create.contains("  PRIMARY KEY (`id`)\n"));
        assert!(compiled
            .statements
            .iter()
            .any(|sql| sql.starts_with("CREATE TABLE IF NOT EXISTS `zone`")));
    }

    /// 外部キーの型は参照先PKの型と一致し、自動増分は除去される
    #[test]
    fn test_foreign_key_matches_referenced_primary_key() {
        let mut schema = Schema::new();
        schema.add_table(
            "country",
            TableDefinition::new()
                .with_options(TableOptions {
                    pk: Some(vec!["code".to_string()]),
                    ..Default::default()
                })
                .with_field(
                    "code",
                    FieldDefinition::new("string").with_length(LengthSpec::Size(2)),
                )
                .has_many("city", RelationDefinition::new().named("country_code")),
        );
        schema.add_table(
            "city",
            TableDefinition::new()
                .with_field("name", FieldDefinition::new("string"))
                .belongs_to("country"),
        );

        let compiled = compiler().compile(schema).unwrap();
        let schema = &compiled.schema;

        let referenced = &schema.primary_keys()["country"]["code"];
        let foreign = &schema.tables["city"].fields["country_code"];
        assert_eq!(foreign.field_type, referenced.field_type);
        assert_eq!(foreign.length, referenced.length);
        assert!(!foreign.is_autoinc());

        let constraint = &schema.constraints()["city"]["country_code"];
        assert_eq!(constraint.reference_fields, "code");
    }

    /// booleanは TINYINT(1) unsigned NOT NULL DEFAULT '0' に変換される
    #[test]
    fn test_boolean_coercion() {
        let mut schema = Schema::with_options(SchemaOptions {
            timestamps: Some(false),
            ..Default::default()
        });
        schema.add_table(
            "setting",
            TableDefinition::new()
                .with_field("enabled", FieldDefinition::new("boolean"))
                .with_field("visible", FieldDefinition::new("boolean").with_default(true)),
        );

        let compiled = compiler().compile(schema).unwrap();

        let create = compiled
            .statements
            .iter()
            .find(|sql| sql.starts_with("CREATE TABLE"))
            .unwrap();
        assert!(create.contains("`enabled` TINYINT(1) unsigned NOT NULL DEFAULT '0'"));
        assert!(create.contains("`visible` TINYINT(1) unsigned NOT NULL DEFAULT '1'"));
        assert!(!create.contains("`created`"));
    }

    /// コンパイル済みスキーマの再コンパイルは同じ結果になる
    #[test]
    fn test_compile_is_idempotent() {
        let mut compiler = compiler();
        let first = compiler.compile(user_role_schema()).unwrap();
        let second = compiler.compile(first.schema.clone()).unwrap();

        assert_eq!(first, second);
    }

    /// 再コンパイルしても中間テーブルは重複しない
    #[test]
    fn test_pivot_is_never_duplicated() {
        let mut compiler = compiler();
        let first = compiler.compile(user_role_schema()).unwrap();
        let resolved = compiler.resolve(first.schema.clone());

        assert_eq!(resolved.table_count(), 3);
        assert!(!resolved.tables.contains_key("role_to_user"));
    }

    /// 逆順の中間テーブルが既に定義されていれば新たに合成しない
    #[test]
    fn test_existing_reverse_pivot_is_kept() {
        let mut schema = user_role_schema();
        schema.add_table(
            "role_to_user",
            TableDefinition::new().with_field("note", FieldDefinition::new("string")),
        );

        let compiled = compiler().compile(schema).unwrap();

        assert!(compiled.schema.has_table("role_to_user"));
        assert!(!compiled.schema.has_table("user_to_role"));
    }

    /// 片方向の m:m は無視される
    #[test]
    fn test_unidirectional_many_to_many_is_skipped() {
        let mut schema = Schema::new();
        schema.add_table(
            "user",
            TableDefinition::new().many_to_many("role", RelationDefinition::new()),
        );
        schema.add_table("role", TableDefinition::new());

        let compiled = compiler().compile(schema).unwrap();

        assert_eq!(compiled.schema.table_count(), 2);
    }

    /// オプションのみのスキーマはコンパイルに失敗する
    #[test]
    fn test_options_only_schema_fails() {
        let schema = Schema::with_options(SchemaOptions {
            constraints: Some(false),
            ..Default::default()
        });

        assert_eq!(compiler().compile(schema), Err(CompileError::EmptySchema));
    }

    /// constraints: false の場合は制約文を出力しない
    #[test]
    fn test_constraints_disabled() {
        let mut schema = user_post_schema();
        schema.options.constraints = Some(false);

        let compiled = compiler().compile(schema).unwrap();

        assert!(compiled.schema.constraints().is_empty());
        assert!(!compiled
            .statements
            .iter()
            .any(|sql| sql.starts_with("ALTER TABLE")));
    }

    /// スクリプトの順序: FKチェック無効化、テーブルごとのDROP/CREATE、制約、FKチェック有効化
    #[test]
    fn test_script_order() {
        let compiled = compiler().compile(user_post_schema()).unwrap();
        let executable: Vec<&String> = compiled
            .statements
            .iter()
            .filter(|sql| !is_comment(sql))
            .collect();

        assert_eq!(executable[0], "SET FOREIGN_KEY_CHECKS=0;");
        assert_eq!(executable[1], "DROP TABLE IF EXISTS `user`;");
        assert!(executable[2].starts_with("CREATE TABLE IF NOT EXISTS `user`"));
        assert_eq!(executable[3], "DROP TABLE IF EXISTS `post`;");
        assert!(executable[4].starts_with("CREATE TABLE IF NOT EXISTS `post`"));
        assert!(executable[5].starts_with("ALTER TABLE `post`"));
        assert_eq!(executable[6], "SET FOREIGN_KEY_CHECKS=1;");
        assert_eq!(executable.len(), 7);

        assert!(compiled
            .statements
            .contains(&"-- Table structure for table `post`".to_string()));
        assert!(compiled
            .statements
            .contains(&"-- Constraints for table `post`".to_string()));
    }

    /// 制約削除文は制約追加文と同じ制約名を使う
    #[test]
    fn test_drop_constraint_statements() {
        let mut compiler = compiler();
        let compiled = compiler.compile(user_post_schema()).unwrap();
        let name = &compiled.schema.constraints()["post"]["user_id"].name;

        let drops = compiler.drop_constraint_statements(&compiled.schema);

        assert_eq!(
            drops,
            vec![format!("ALTER TABLE `post`\n DROP FOREIGN KEY `{}`;", name)]
        );
        assert_eq!(compiler.constraint_statements(&compiled.schema).len(), 4);
    }
}
