use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// 外部データプロバイダ呼び出しのエラー
///
/// Query Service の境界を越えない。捕まえてログに残し、ローカルデータへ
/// フォールバックする。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider responded with status {0}")]
    Status(reqwest::StatusCode),
    #[error("provider record {id} could not be translated: {reason}")]
    Decode { id: i64, reason: String },
}

/// 設定読み込みのエラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be between 0 and 1, got {value}")]
    ProbabilityOutOfRange { key: &'static str, value: f64 },
    #[error("{key} must be greater than zero")]
    ZeroDuration { key: &'static str },
    #[error("invalid bind address {0}")]
    BindAddr(String),
}

/// REST ハンドラーが返すエラー
///
/// - NotFound: 404（例外ではなく通常の結果）
/// - Internal: 500。詳細は返さない
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{what} not found")).into_response()
            }
            ApiError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
