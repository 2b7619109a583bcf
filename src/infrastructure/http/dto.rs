//! Data Transfer Objects - 统一响应信封

use serde::Serialize;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 成功响应
///
/// `data` 总是序列化（删除接口返回 `null`），`message` 为空时省略
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    /// 带提示信息的成功响应
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

impl ApiResponse<()> {
    /// 成功但无数据（`data: null`）
    pub fn empty(message: impl Into<String>) -> Self {
        Self::with_message((), message)
    }
}

/// 错误响应
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    /// 仅开发模式下填充
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_omits_missing_message() {
        let body = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(body, json!({ "success": true, "data": [1, 2] }));
    }

    #[test]
    fn test_empty_envelope_keeps_null_data() {
        let body = serde_json::to_value(ApiResponse::empty("User deleted successfully")).unwrap();
        assert_eq!(
            body,
            json!({ "success": true, "message": "User deleted successfully", "data": null })
        );
    }

    #[test]
    fn test_error_envelope() {
        let body = serde_json::to_value(ErrorResponse::new("Route not found")).unwrap();
        assert_eq!(body, json!({ "success": false, "error": "Route not found" }));

        let body = serde_json::to_value(ErrorResponse::new("boom").with_stack("trace")).unwrap();
        assert_eq!(body["stack"], "trace");
    }
}
