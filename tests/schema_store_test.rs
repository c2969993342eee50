/// スキーマストアのテスト
///
/// コンパイル済みスキーマの成果物が保存・再読み込みで変化しないこと、
/// SQLダンプが所定の場所に書き出されることを確認します。

#[cfg(test)]
mod schema_store_tests {
    use lucid_schema::core::config::SchemaDefaults;
    use lucid_schema::core::schema::{
        CascadePolicy, FieldDefinition, LengthSpec, RelationDefinition, Schema, TableDefinition,
    };
    use lucid_schema::services::foreign_key_resolver::ConstraintNamer;
    use lucid_schema::services::schema_compiler::SchemaCompiler;
    use lucid_schema::services::schema_store::SchemaStore;
    use std::fs;
    use tempfile::TempDir;

    fn compiled_schema() -> Schema {
        let mut schema = Schema::new();
        schema.add_table(
            "user",
            TableDefinition::new()
                .with_field("name", FieldDefinition::new("string").with_length(LengthSpec::Size(100)))
                .with_field("active", FieldDefinition::new("boolean").with_default(true))
                .with_field("note", FieldDefinition::new("string").with_default("n/a"))
                .has_many("post", RelationDefinition::new().cascade(CascadePolicy::SetNull))
                .many_to_many("role", RelationDefinition::new()),
        );
        schema.add_table(
            "role",
            TableDefinition::new()
                .with_field(
                    "description",
                    FieldDefinition::new("text").with_length(LengthSpec::Modifier("medium".to_string())),
                )
                .many_to_many("user", RelationDefinition::new()),
        );
        schema.add_table(
            "post",
            TableDefinition::new()
                .with_field(
                    "score",
                    FieldDefinition::new("decimal").with_length(LengthSpec::PrecisionScale(5, 2)),
                )
                .belongs_to("user"),
        );

        SchemaCompiler::new(SchemaDefaults::default())
            .with_constraint_namer(ConstraintNamer::seeded(7))
            .compile(schema)
            .unwrap()
            .schema
    }

    /// 保存した成果物を読み込むと元のスキーマと一致する
    #[test]
    fn test_artifact_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = SchemaStore::new(temp_dir.path().join("build"), temp_dir.path().join("generated"));
        let schema = compiled_schema();

        store.save(&schema, "default", false).unwrap();
        let loaded = store.load("default").unwrap();

        assert_eq!(loaded, schema);
        assert!(loaded.is_compiled());
        assert!(!temp_dir.path().join("build/~schema.default.yaml").exists());
    }

    /// 予約キーは成果物のYAMLにそのままの名前で出力される
    #[test]
    fn test_artifact_uses_reserved_keys() {
        let yaml = SchemaStore::serialize(&compiled_schema()).unwrap();

        assert!(yaml.contains("_options"));
        assert!(yaml.contains("fkConstraints"));
        assert!(yaml.contains("user_to_role"));
    }

    /// バックアップは成果物と同じ内容
    #[test]
    fn test_backup_matches_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let store = SchemaStore::new(temp_dir.path(), temp_dir.path());

        let path = store.save(&compiled_schema(), "sample", true).unwrap();

        let artifact = fs::read_to_string(path).unwrap();
        let backup = fs::read_to_string(store.backup_path("sample")).unwrap();
        assert_eq!(artifact, backup);
    }

    /// SQLダンプは生成ディレクトリに書き出される
    #[test]
    fn test_write_dump() {
        let temp_dir = TempDir::new().unwrap();
        let store = SchemaStore::new(temp_dir.path().join("build"), temp_dir.path().join("generated"));
        let statements = vec![
            "SET FOREIGN_KEY_CHECKS=0;".to_string(),
            "SET FOREIGN_KEY_CHECKS=1;".to_string(),
        ];

        let path = store.write_dump("default", &statements).unwrap();

        assert_eq!(path, temp_dir.path().join("generated/schema.default.sql"));
        let dump = fs::read_to_string(path).unwrap();
        assert!(dump.starts_with("--\n-- Generated by lucid-schema "));
        assert!(dump.ends_with("\n--\n\nSET FOREIGN_KEY_CHECKS=0;\nSET FOREIGN_KEY_CHECKS=1;"));
    }
}
