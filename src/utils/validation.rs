//! 输入验证工具函数
//!
//! 在调用存储层之前拒绝无效输入

/// 校验失败：指出缺失的必填字段
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// 字段名
    pub field: &'static str,
    /// 展示给用户的提示
    pub message: &'static str,
}

/// 新建分类时的提示
pub const ADD_NAME_REQUIRED: &str = "Enter name file";
/// 重命名分类时的提示
pub const EDIT_NAME_REQUIRED: &str = "Enter a new category name";

/// 验证分类名称：空串或全空白都视为缺失
///
/// # 参数
/// - `name`: 用户输入
/// - `message`: 校验失败时展示的提示
pub fn validate_category_name(name: &str, message: &'static str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError {
            field: "name",
            message,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_whitespace() {
        for input in ["", " ", "\t\n  "] {
            let err = validate_category_name(input, ADD_NAME_REQUIRED).unwrap_err();
            assert_eq!(err.field, "name");
            assert_eq!(err.to_string(), ADD_NAME_REQUIRED);
        }
    }

    #[test]
    fn test_accepts_padded_name() {
        assert!(validate_category_name("  stamp ", EDIT_NAME_REQUIRED).is_ok());
    }
}
