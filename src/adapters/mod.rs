// Adapters layer: concrete clients for the two external systems
// (chat completion service, Supabase/PostgREST store).

pub mod completion;
pub mod store;

use crate::utils::error::ErrorKind;

/// 把 reqwest 的傳輸層錯誤收斂成封閉的錯誤種類
pub(crate) fn kind_of_transport(err: &reqwest::Error) -> ErrorKind {
    if err.is_timeout() {
        ErrorKind::Timeout
    } else if err.is_decode() {
        ErrorKind::Invalid
    } else {
        // 連線被拒、DNS 失敗、傳輸中斷都算網路層
        ErrorKind::Network
    }
}

/// 非成功狀態碼的種類判定
pub(crate) fn kind_of_status(status: reqwest::StatusCode) -> ErrorKind {
    match status.as_u16() {
        401 | 403 => ErrorKind::Auth,
        429 => ErrorKind::RateLimited,
        _ => ErrorKind::Api,
    }
}
