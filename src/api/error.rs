// ==========================================
// 零件质检装箱系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户可理解的错误
// 说明: 前置条件不满足（重复ID、已封箱等）由引擎以结果结构返回,
//       此处只承载输入格式错误与持久化失败
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 输入错误 =====
    #[error("无效输入: field={field}, {message}")]
    InvalidInput { field: String, message: String },

    #[error("零件ID重复: {0}")]
    DuplicatePart(String),

    // ===== 持久化错误 =====
    #[error("持久化失败: {0}")]
    PersistenceError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        ApiError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::PersistenceError(format!("记录未找到: {}(id={})", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::PersistenceError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::InvalidData { table, message } => {
                ApiError::PersistenceError(format!("数据不合法 (table={}): {}", table, message))
            }
            RepositoryError::DecodeError { table, message } => {
                ApiError::PersistenceError(format!("数据解码失败 (table={}): {}", table, message))
            }
            RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::ForeignKeyViolation(msg) => ApiError::PersistenceError(msg),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(err, ApiError::PersistenceError(_)));

        let err: ApiError = RepositoryError::NotFound {
            entity: "Part".to_string(),
            id: "P1".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::PersistenceError(_)));

        let err: ApiError = RepositoryError::DecodeError {
            table: "caixas".to_string(),
            message: "invalid box id -1".to_string(),
        }
        .into();
        assert!(err.to_string().contains("invalid box id -1"));
    }

    #[test]
    fn test_invalid_input_display() {
        let err = ApiError::invalid_input("weight", "not a number: abc");
        assert_eq!(err.to_string(), "无效输入: field=weight, not a number: abc");
    }
}
