// 型マッピングサービス
//
// スキーマ定義の抽象型名（int, string, decimal, boolean ...）を
// 方言固有のカラム型と既定長に変換します。

use crate::core::config::Dialect;
use crate::core::error::CompileError;
use crate::core::schema::{FieldDefinition, LengthSpec};
use std::str::FromStr;

/// text系の長さ修飾子
const TEXT_MODIFIERS: [&str; 3] = ["tiny", "medium", "long"];

/// 抽象型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractType {
    SmallInt,
    Int,
    BigInt,
    Decimal,
    Float,
    String,
    Char,
    Binary,
    Text,
    Blob,
    Array,
    Json,
    Boolean,
    Date,
    DateTime,
    Time,
}

impl AbstractType {
    /// text / blob / array / json（tiny, medium, long修飾子を受け付ける型）
    pub fn is_text_family(&self) -> bool {
        matches!(
            self,
            AbstractType::Text | AbstractType::Blob | AbstractType::Array | AbstractType::Json
        )
    }

    /// COLLATEを付与する文字列型かどうか
    pub fn is_collatable(&self) -> bool {
        matches!(
            self,
            AbstractType::String
                | AbstractType::Char
                | AbstractType::Text
                | AbstractType::Array
                | AbstractType::Json
        )
    }
}

impl FromStr for AbstractType {
    type Err = CompileError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "smallint" => Ok(AbstractType::SmallInt),
            "int" | "integer" => Ok(AbstractType::Int),
            "bigint" => Ok(AbstractType::BigInt),
            "decimal" => Ok(AbstractType::Decimal),
            "float" => Ok(AbstractType::Float),
            "string" => Ok(AbstractType::String),
            "char" => Ok(AbstractType::Char),
            "binary" => Ok(AbstractType::Binary),
            "text" => Ok(AbstractType::Text),
            "blob" => Ok(AbstractType::Blob),
            "array" => Ok(AbstractType::Array),
            "json" => Ok(AbstractType::Json),
            "boolean" => Ok(AbstractType::Boolean),
            "date" => Ok(AbstractType::Date),
            "datetime" => Ok(AbstractType::DateTime),
            "time" => Ok(AbstractType::Time),
            other => Err(CompileError::UnsupportedType {
                field_type: other.to_string(),
                field: None,
            }),
        }
    }
}

/// 型解決の結果
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
    /// 抽象型
    pub abstract_type: AbstractType,
    /// 方言固有の型名（例: VARCHAR, MEDIUMTEXT）
    pub sql_type: String,
    /// 括弧内に描画する長さ（なしの場合はNone）
    pub length: Option<String>,
    /// 強制変換（boolean）適用後のフィールド定義
    pub definition: FieldDefinition,
}

impl ResolvedType {
    /// 型名と長さを結合した文字列（例: VARCHAR(255)）
    pub fn type_with_length(&self) -> String {
        match &self.length {
            Some(length) => format!("{}({})", self.sql_type, length),
            None => self.sql_type.clone(),
        }
    }
}

/// 方言固有の型マッピング
pub trait TypeMapper: Send + Sync {
    /// 抽象型に対応する方言の基本型名
    fn base_type(&self, abstract_type: AbstractType) -> &'static str;

    /// 長さ指定を考慮した方言の型名
    fn sql_type(&self, abstract_type: AbstractType, length: Option<&LengthSpec>) -> String;

    /// 描画する長さ
    fn length(&self, abstract_type: AbstractType, length: Option<&LengthSpec>) -> Option<String>;
}

/// MySQL用型マッパー
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlTypeMapper;

impl TypeMapper for MySqlTypeMapper {
    fn base_type(&self, abstract_type: AbstractType) -> &'static str {
        match abstract_type {
            AbstractType::SmallInt => "SMALLINT",
            AbstractType::Int => "INT",
            AbstractType::BigInt => "BIGINT",
            AbstractType::Decimal => "NUMERIC",
            AbstractType::Float => "DOUBLE",
            AbstractType::String => "VARCHAR",
            AbstractType::Char => "CHAR",
            AbstractType::Binary => "VARBINARY",
            AbstractType::Text | AbstractType::Array | AbstractType::Json => "TEXT",
            AbstractType::Blob => "BLOB",
            AbstractType::Boolean => "TINYINT",
            AbstractType::Date => "DATE",
            AbstractType::DateTime => "DATETIME",
            AbstractType::Time => "TIME",
        }
    }

    fn sql_type(&self, abstract_type: AbstractType, length: Option<&LengthSpec>) -> String {
        let base = self.base_type(abstract_type);

        if !abstract_type.is_text_family() {
            return base.to_string();
        }

        // 未知の修飾子は基本型（TEXT / BLOB）にフォールバック
        match length {
            Some(LengthSpec::Modifier(modifier)) if TEXT_MODIFIERS.contains(&modifier.as_str()) => {
                format!("{}{}", modifier.to_uppercase(), base)
            }
            _ => base.to_string(),
        }
    }

    fn length(&self, abstract_type: AbstractType, length: Option<&LengthSpec>) -> Option<String> {
        // 明示的な数値指定は常に優先
        if let Some(size) = length.and_then(LengthSpec::as_size) {
            return (size > 0).then(|| size.to_string());
        }

        match abstract_type {
            AbstractType::String | AbstractType::Char => Some("255".to_string()),
            AbstractType::Int => Some("11".to_string()),
            AbstractType::Boolean => Some("1".to_string()),
            AbstractType::Decimal | AbstractType::Float => match length {
                Some(LengthSpec::PrecisionScale(precision, scale)) => {
                    Some(format!("{}, {}", precision, scale))
                }
                _ => Some("0, 0".to_string()),
            },
            _ => None,
        }
    }
}

/// 型マッピングサービス
///
/// フィールド定義を方言の型へ解決します。
pub struct TypeMappingService {
    dialect: Dialect,
    mapper: Box<dyn TypeMapper>,
}

impl Clone for TypeMappingService {
    fn clone(&self) -> Self {
        Self::new(self.dialect)
    }
}

impl std::fmt::Debug for TypeMappingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeMappingService")
            .field("dialect", &self.dialect)
            .finish()
    }
}

impl TypeMappingService {
    /// 新しいTypeMappingServiceを作成
    pub fn new(dialect: Dialect) -> Self {
        let mapper: Box<dyn TypeMapper> = match dialect {
            Dialect::MySQL => Box::new(MySqlTypeMapper),
        };
        Self { dialect, mapper }
    }

    /// 方言を取得
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// フィールド定義を方言の型に解決
    ///
    /// boolean型の強制変換（unsigned, NOT NULL, default false）は
    /// 返却する定義に一度だけ適用されます。
    ///
    /// # Errors
    ///
    /// 未知の抽象型の場合は`CompileError::UnsupportedType`
    pub fn resolve(&self, field: &FieldDefinition) -> Result<ResolvedType, CompileError> {
        let abstract_type: AbstractType = field.field_type.parse()?;

        let mut definition = field.clone();
        definition.coerce_boolean();

        let length = definition.length.as_ref();
        Ok(ResolvedType {
            abstract_type,
            sql_type: self.mapper.sql_type(abstract_type, length),
            length: self.mapper.length(abstract_type, length),
            definition,
        })
    }
}

impl Default for TypeMappingService {
    fn default() -> Self {
        Self::new(Dialect::MySQL)
    }
}
