// スキーマドメインモデル
//
// 宣言的なスキーマ定義を表現する型システム。
// 予約キー（_options, options, m:1, 1:m, 1:1, m:m）は型付きのメンバーとして保持し、
// 辞書形式はシリアライズ時のワイヤーフォーマットとしてのみ扱います。

use crate::core::config::SchemaDefaults;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// プライマリキーインデックス（テーブル名 -> (PKフィールド名 -> フィールド定義)）
pub type PrimaryKeyIndex = IndexMap<String, IndexMap<String, FieldDefinition>>;

/// 外部キー制約インデックス（テーブル名 -> (FKフィールド名 -> 制約定義)）
pub type ConstraintIndex = IndexMap<String, IndexMap<String, ConstraintDefinition>>;

/// スキーマ定義
///
/// グローバルオプションとテーブル定義のマップを保持します。
/// コンパイル済みのスキーマでは、オプションにPKインデックスと制約インデックスが格納されます。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// グローバルオプション（`_options`キー）
    #[serde(rename = "_options", default)]
    pub options: SchemaOptions,

    /// テーブル定義のマップ（宣言順）
    #[serde(flatten)]
    pub tables: IndexMap<String, TableDefinition>,
}

impl Schema {
    /// 空のスキーマを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// グローバルオプションを指定してスキーマを作成
    pub fn with_options(options: SchemaOptions) -> Self {
        Self {
            options,
            tables: IndexMap::new(),
        }
    }

    /// テーブルを追加
    pub fn add_table(&mut self, name: impl Into<String>, table: TableDefinition) {
        self.tables.insert(name.into(), table);
    }

    /// 指定されたテーブルを取得
    pub fn get_table(&self, table_name: &str) -> Option<&TableDefinition> {
        self.tables.get(table_name)
    }

    /// テーブル数を取得
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// コンパイル済みかどうか（PKインデックスが空でない場合のみコンパイル済み）
    pub fn is_compiled(&self) -> bool {
        !self.options.pk.is_empty()
    }

    /// 解決済みのプライマリキーインデックス
    pub fn primary_keys(&self) -> &PrimaryKeyIndex {
        &self.options.pk
    }

    /// 解決済みの外部キー制約インデックス
    pub fn constraints(&self) -> &ConstraintIndex {
        &self.options.fk_constraints
    }

    /// テーブルが存在するか確認（未コンパイルの場合は常にfalse）
    pub fn has_table(&self, table_name: &str) -> bool {
        self.is_compiled() && self.tables.contains_key(table_name)
    }

    /// フィールドが存在するか確認（未コンパイルの場合は常にfalse）
    pub fn has_field(&self, table_name: &str, field_name: &str) -> bool {
        self.is_compiled()
            && self
                .tables
                .get(table_name)
                .is_some_and(|table| table.fields.contains_key(field_name))
    }

    /// テーブルがタイムスタンプカラムを持つか確認
    pub fn has_timestamps(&self, table_name: &str) -> bool {
        self.is_compiled()
            && self
                .tables
                .get(table_name)
                .is_some_and(|table| table.options.timestamps == Some(true))
    }

    /// テーブルがslugフィールドを持つか確認
    pub fn has_slug(&self, table_name: &str) -> bool {
        self.has_field(table_name, "slug")
    }

    /// フィールドの抽象型名を取得
    pub fn field_type(&self, table_name: &str, field_name: &str) -> Option<&str> {
        if !self.has_field(table_name, field_name) {
            return None;
        }

        self.tables
            .get(table_name)
            .and_then(|table| table.fields.get(field_name))
            .map(|field| field.field_type.as_str())
    }
}

/// グローバルオプション
///
/// 未指定の項目は設定ファイルの`SchemaDefaults`で補完されます。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    /// 解決済みのプライマリキー（コンパイル後のみ）
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub pk: PrimaryKeyIndex,

    /// 解決済みの外部キー制約（コンパイル後のみ）
    #[serde(
        rename = "fkConstraints",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub fk_constraints: ConstraintIndex,
}

impl SchemaOptions {
    /// 既定値の上にグローバルオプションを重ねた実効値を返す
    pub fn overlay(&self, defaults: &SchemaDefaults) -> SchemaDefaults {
        SchemaDefaults {
            timestamps: self.timestamps.unwrap_or(defaults.timestamps),
            constraints: self.constraints.unwrap_or(defaults.constraints),
            charset: self
                .charset
                .clone()
                .unwrap_or_else(|| defaults.charset.clone()),
            collate: self
                .collate
                .clone()
                .unwrap_or_else(|| defaults.collate.clone()),
            engine: self
                .engine
                .clone()
                .unwrap_or_else(|| defaults.engine.clone()),
        }
    }
}

/// テーブル定義
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// テーブル単位のオプション
    #[serde(default, skip_serializing_if = "TableOptions::is_empty")]
    pub options: TableOptions,

    /// 多対一: 参照先テーブル名のリスト
    #[serde(rename = "m:1", default, skip_serializing_if = "Vec::is_empty")]
    pub many_to_one: Vec<String>,

    /// 一対多: 参照元テーブル名 -> リレーション定義
    #[serde(rename = "1:m", default, skip_serializing_if = "IndexMap::is_empty")]
    pub one_to_many: IndexMap<String, RelationDefinition>,

    /// 一対一: 参照先テーブル名 -> リレーション定義
    #[serde(rename = "1:1", default, skip_serializing_if = "IndexMap::is_empty")]
    pub one_to_one: IndexMap<String, RelationDefinition>,

    /// 多対多: 相手テーブル名 -> リレーション定義
    #[serde(rename = "m:m", default, skip_serializing_if = "IndexMap::is_empty")]
    pub many_to_many: IndexMap<String, RelationDefinition>,

    /// カラム定義（宣言順）
    #[serde(flatten)]
    pub fields: IndexMap<String, FieldDefinition>,
}

impl TableDefinition {
    /// 空のテーブル定義を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// フィールドを追加
    pub fn with_field(mut self, name: impl Into<String>, field: FieldDefinition) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// 多対一リレーションを追加
    pub fn belongs_to(mut self, table: impl Into<String>) -> Self {
        self.many_to_one.push(table.into());
        self
    }

    /// 一対多リレーションを追加
    pub fn has_many(mut self, table: impl Into<String>, relation: RelationDefinition) -> Self {
        self.one_to_many.insert(table.into(), relation);
        self
    }

    /// 一対一リレーションを追加
    pub fn has_one(mut self, table: impl Into<String>, relation: RelationDefinition) -> Self {
        self.one_to_one.insert(table.into(), relation);
        self
    }

    /// 多対多リレーションを追加
    pub fn many_to_many(mut self, table: impl Into<String>, relation: RelationDefinition) -> Self {
        self.many_to_many.insert(table.into(), relation);
        self
    }

    /// オプションを設定
    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// 指定されたフィールドを取得
    pub fn get_field(&self, field_name: &str) -> Option<&FieldDefinition> {
        self.fields.get(field_name)
    }

    /// 多対多の中間テーブルかどうか
    pub fn is_pivot(&self) -> bool {
        self.options.many_to_many == Some(true)
    }
}

/// テーブル単位のオプション
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableOptions {
    /// 明示的なプライマリキーのフィールド名リスト
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pk: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    /// 多対多の中間テーブルを示すマーカー
    #[serde(rename = "m:m", default, skip_serializing_if = "Option::is_none")]
    pub many_to_many: Option<bool>,
}

impl TableOptions {
    /// すべて未指定かどうか
    pub fn is_empty(&self) -> bool {
        *self == TableOptions::default()
    }

    /// グローバルの実効値の上にテーブルオプションを重ねた実効値を返す
    pub fn overlay(&self, base: &SchemaDefaults) -> SchemaDefaults {
        SchemaDefaults {
            timestamps: self.timestamps.unwrap_or(base.timestamps),
            constraints: self.constraints.unwrap_or(base.constraints),
            charset: self.charset.clone().unwrap_or_else(|| base.charset.clone()),
            collate: self.collate.clone().unwrap_or_else(|| base.collate.clone()),
            engine: self.engine.clone().unwrap_or_else(|| base.engine.clone()),
        }
    }

    /// 未指定の項目を実効値で埋める（pkとm:mマーカーはそのまま）
    pub fn fill_from(&mut self, effective: &SchemaDefaults) {
        self.timestamps.get_or_insert(effective.timestamps);
        self.constraints.get_or_insert(effective.constraints);
        self.charset.get_or_insert_with(|| effective.charset.clone());
        self.collate.get_or_insert_with(|| effective.collate.clone());
        self.engine.get_or_insert_with(|| effective.engine.clone());
    }
}

/// フィールド長の指定
///
/// 文字列系はスカラー値、decimal/floatは精度とスケールの組、
/// text系は`tiny`/`medium`/`long`の修飾子を受け付けます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LengthSpec {
    Size(u32),
    PrecisionScale(u32, u32),
    Modifier(String),
}

impl LengthSpec {
    /// 数値として解釈できる長さ（`"100"`のような数値文字列を含む）
    pub fn as_size(&self) -> Option<u32> {
        match self {
            LengthSpec::Size(size) => Some(*size),
            LengthSpec::Modifier(value) => value.trim().parse().ok(),
            LengthSpec::PrecisionScale(..) => None,
        }
    }
}

/// デフォルト値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl DefaultValue {
    /// SQLリテラルとして描画（シングルクォートで囲む）
    pub fn to_sql_literal(&self) -> String {
        match self {
            DefaultValue::Bool(value) => format!("'{}'", u8::from(*value)),
            DefaultValue::Integer(value) => format!("'{}'", value),
            DefaultValue::Float(value) => format!("'{}'", value),
            DefaultValue::Text(value) => format!("'{}'", value.replace('\'', "''")),
        }
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        DefaultValue::Bool(value)
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        DefaultValue::Integer(value)
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::Text(value.to_string())
    }
}

/// フィールド定義
///
/// すべての属性は任意指定です。「未指定」と「false/0を指定」は区別されます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// 抽象型名（int, string, decimal, boolean, datetime など）
    #[serde(rename = "type")]
    pub field_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<LengthSpec>,

    /// true: DEFAULT NULL / false: NOT NULL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsigned: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoinc: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
}

impl FieldDefinition {
    /// 型名だけを指定してフィールドを作成
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            length: None,
            null: None,
            unsigned: None,
            default: None,
            autoinc: None,
            unique: None,
        }
    }

    /// 既定のプライマリキー定義（int, 自動増分, unsigned, NOT NULL）
    pub fn primary_key_default() -> Self {
        Self {
            autoinc: Some(true),
            null: Some(false),
            unsigned: Some(true),
            ..Self::new("int")
        }
    }

    /// タイムスタンプ用のNULL許可datetime
    pub fn nullable_datetime() -> Self {
        Self::new("datetime").nullable(true)
    }

    pub fn with_length(mut self, length: LengthSpec) -> Self {
        self.length = Some(length);
        self
    }

    pub fn nullable(mut self, null: bool) -> Self {
        self.null = Some(null);
        self
    }

    pub fn unsigned(mut self) -> Self {
        self.unsigned = Some(true);
        self
    }

    pub fn with_default(mut self, default: impl Into<DefaultValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.autoinc = Some(true);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = Some(true);
        self
    }

    /// 自動増分フィールドかどうか
    pub fn is_autoinc(&self) -> bool {
        self.autoinc.unwrap_or(false)
    }

    /// ユニーク制約を持つかどうか
    pub fn is_unique(&self) -> bool {
        self.unique.unwrap_or(false)
    }

    /// boolean型の強制変換（unsigned, NOT NULL, 未指定ならdefault false）
    ///
    /// 何度適用しても結果は変わりません。
    pub fn coerce_boolean(&mut self) {
        if self.field_type != "boolean" {
            return;
        }

        self.unsigned = Some(true);
        self.null = Some(false);
        if self.default.is_none() {
            self.default = Some(DefaultValue::Bool(false));
        }
    }
}

/// 参照アクション
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferentialAction {
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "NO ACTION")]
    NoAction,
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferentialAction::Cascade => write!(f, "CASCADE"),
            ReferentialAction::SetNull => write!(f, "SET NULL"),
            ReferentialAction::Restrict => write!(f, "RESTRICT"),
            ReferentialAction::NoAction => write!(f, "NO ACTION"),
        }
    }
}

/// カスケードポリシー
///
/// ワイヤーフォーマット上は true / null / false の三値で表現されます。
/// キーが省略された場合は`Restrict`です。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CascadePolicy {
    /// true -> ON DELETE CASCADE
    Cascade,
    /// null -> ON DELETE SET NULL
    SetNull,
    /// false -> ON DELETE RESTRICT
    #[default]
    Restrict,
}

impl CascadePolicy {
    pub fn is_restrict(&self) -> bool {
        matches!(self, CascadePolicy::Restrict)
    }

    /// ON DELETE に使用する参照アクション
    pub fn on_delete(&self) -> ReferentialAction {
        match self {
            CascadePolicy::Cascade => ReferentialAction::Cascade,
            CascadePolicy::SetNull => ReferentialAction::SetNull,
            CascadePolicy::Restrict => ReferentialAction::Restrict,
        }
    }
}

impl Serialize for CascadePolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CascadePolicy::Cascade => serializer.serialize_bool(true),
            CascadePolicy::SetNull => serializer.serialize_none(),
            CascadePolicy::Restrict => serializer.serialize_bool(false),
        }
    }
}

impl<'de> Deserialize<'de> for CascadePolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<bool>::deserialize(deserializer)? {
            Some(true) => CascadePolicy::Cascade,
            None => CascadePolicy::SetNull,
            Some(false) => CascadePolicy::Restrict,
        })
    }
}

/// リレーション定義（宣言そのまま）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationDefinition {
    /// 生成する外部キーカラム名（省略時は `<参照先テーブル>_id`）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,

    #[serde(default, skip_serializing_if = "CascadePolicy::is_restrict")]
    pub cascade: CascadePolicy,

    /// 多対多の中間テーブル名（省略時は `<A>_to_<B>`）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl RelationDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = Some(true);
        self
    }

    pub fn with_default(mut self, default: impl Into<DefaultValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn cascade(mut self, cascade: CascadePolicy) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn joint_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// 既定値を補完したリレーションオプションを導出
    pub fn resolve(&self, referenced_table: &str) -> RelationOptions {
        RelationOptions {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| format!("{}_id", referenced_table)),
            unique: self.unique.unwrap_or(false),
            default: self.default.clone(),
            cascade: self.cascade,
        }
    }
}

/// 既定値補完済みのリレーションオプション
#[derive(Debug, Clone, PartialEq)]
pub struct RelationOptions {
    /// 外部キーカラム名
    pub name: String,
    pub unique: bool,
    pub default: Option<DefaultValue>,
    pub cascade: CascadePolicy,
}

/// 外部キー制約定義
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDefinition {
    /// 制約名（FK_ + ランダムな英大文字・数字）
    pub name: String,
    /// ローカルのフィールド名
    pub fields: String,
    /// 参照先テーブル名
    pub reference_table: String,
    /// 参照先のフィールド名
    pub reference_fields: String,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}
